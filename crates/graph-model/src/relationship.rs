// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{CustomQuery, ModelError, ParameterInfo};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipDirection {
    Out,
    In,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RelationshipInfo {
    pub field_name: String,
    pub relationship_type: String,
    pub target_type: String,
    pub direction: RelationshipDirection,
    /// A list of related entities (as opposed to at most one)
    pub multi: bool,
    pub non_null_depth: u8,
    pub description: Option<String>,
    pub custom_query: Option<CustomQuery>,
    pub parameters: IndexMap<String, ParameterInfo>,
}

impl RelationshipDirection {
    /// Parse a direction argument such as `"IN"` or `"out"`. Anything but `IN` means outgoing.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("in") {
            RelationshipDirection::In
        } else {
            RelationshipDirection::Out
        }
    }
}

impl RelationshipInfo {
    pub fn new(
        field_name: impl Into<String>,
        relationship_type: impl Into<String>,
        target_type: impl Into<String>,
        direction: RelationshipDirection,
        multi: bool,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            relationship_type: relationship_type.into(),
            target_type: target_type.into(),
            direction,
            multi,
            non_null_depth: 0,
            description: None,
            custom_query: None,
            parameters: IndexMap::new(),
        }
    }

    /// Merge another observation of the same field into this one. Cardinality accumulates (once
    /// seen as a list, always a list), but the shape of the relationship must agree.
    pub fn merge(&mut self, type_name: &str, other: &RelationshipInfo) -> Result<(), ModelError> {
        if self.relationship_type != other.relationship_type
            || self.target_type != other.target_type
            || self.direction != other.direction
        {
            return Err(ModelError::relationship_mismatch(
                type_name,
                &self.field_name,
                (&self.relationship_type, &self.target_type, self.direction),
                (&other.relationship_type, &other.target_type, other.direction),
            ));
        }

        self.multi |= other.multi;
        self.non_null_depth = self.non_null_depth.max(other.non_null_depth);
        if self.custom_query.is_none() {
            self.custom_query = other.custom_query.clone();
        }
        if self.description.is_none() {
            self.description = other.description.clone();
        }
        for (name, parameter) in &other.parameters {
            self.parameters
                .entry(name.clone())
                .or_insert_with(|| parameter.clone());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_accumulates_multiplicity() {
        let mut knows = RelationshipInfo::new(
            "KNOWS_Person",
            "KNOWS",
            "Person",
            RelationshipDirection::Out,
            false,
        );
        let observed = RelationshipInfo::new(
            "KNOWS_Person",
            "KNOWS",
            "Person",
            RelationshipDirection::Out,
            true,
        );

        knows.merge("Person", &observed).unwrap();
        assert!(knows.multi);

        // A later single observation doesn't turn it back
        let single = RelationshipInfo {
            multi: false,
            ..observed
        };
        knows.merge("Person", &single).unwrap();
        assert!(knows.multi);
    }

    #[test]
    fn merge_rejects_mismatch() {
        let mut knows = RelationshipInfo::new(
            "friends",
            "KNOWS",
            "Person",
            RelationshipDirection::Out,
            true,
        );
        let incoming = RelationshipInfo::new(
            "friends",
            "KNOWS",
            "Person",
            RelationshipDirection::In,
            true,
        );

        let error = knows.merge("Person", &incoming).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Conflicting definitions of relationship 'friends' in type 'Person': Out KNOWS to Person vs In KNOWS to Person"
        );
    }

    #[test]
    fn direction_parsing() {
        assert_eq!(RelationshipDirection::parse("IN"), RelationshipDirection::In);
        assert_eq!(RelationshipDirection::parse("in"), RelationshipDirection::In);
        assert_eq!(RelationshipDirection::parse("OUT"), RelationshipDirection::Out);
        assert_eq!(RelationshipDirection::parse("both"), RelationshipDirection::Out);
    }
}
