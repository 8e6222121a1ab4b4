// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

use crate::RelationshipDirection;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Field '{field_name}' is declared more than once in type '{type_name}'")]
    DuplicateField {
        type_name: String,
        field_name: String,
    },

    #[error(
        "Conflicting definitions of relationship '{field_name}' in type '{type_name}': {existing} vs {observed}"
    )]
    RelationshipMismatch {
        type_name: String,
        field_name: String,
        existing: String,
        observed: String,
    },

    #[error("Type '{0}' is declared more than once")]
    DuplicateType(String),
}

impl ModelError {
    pub(crate) fn relationship_mismatch(
        type_name: &str,
        field_name: &str,
        existing: (&str, &str, RelationshipDirection),
        observed: (&str, &str, RelationshipDirection),
    ) -> Self {
        let describe = |(rel_type, target, direction): (&str, &str, RelationshipDirection)| {
            format!("{direction:?} {rel_type} to {target}")
        };

        ModelError::RelationshipMismatch {
            type_name: type_name.to_string(),
            field_name: field_name.to_string(),
            existing: describe(existing),
            observed: describe(observed),
        }
    }
}
