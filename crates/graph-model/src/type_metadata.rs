// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::{ModelError, PropertyInfo, RelationshipInfo};

/// How a GraphQL object or interface type maps onto the graph.
///
/// Nodes of the type carry a label named after the type plus any additional `labels` (the
/// interfaces the type implements). Each field is either a property of the node or a
/// relationship to other nodes, never both.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TypeMetadata {
    pub type_name: String,
    pub labels: IndexSet<String>,
    pub is_interface: bool,
    pub properties: IndexMap<String, PropertyInfo>,
    pub relationships: IndexMap<String, RelationshipInfo>,
    pub id_property: Option<String>,
    pub description: Option<String>,
}

impl TypeMetadata {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            labels: IndexSet::new(),
            is_interface: false,
            properties: IndexMap::new(),
            relationships: IndexMap::new(),
            id_property: None,
            description: None,
        }
    }

    pub fn property(&self, field_name: &str) -> Option<&PropertyInfo> {
        self.properties.get(field_name)
    }

    pub fn relationship(&self, field_name: &str) -> Option<&RelationshipInfo> {
        self.relationships.get(field_name)
    }

    pub fn has_field(&self, field_name: &str) -> bool {
        self.properties.contains_key(field_name) || self.relationships.contains_key(field_name)
    }

    /// The primary label (the type name) followed by the additional labels
    pub fn all_labels(&self) -> IndexSet<&str> {
        std::iter::once(self.type_name.as_str())
            .chain(self.labels.iter().map(|label| label.as_str()))
            .collect()
    }

    /// Whether nodes of `other` may also be nodes of this type, that is, whether the two
    /// label sets intersect.
    pub fn is_compatible_with(&self, other: &TypeMetadata) -> bool {
        let labels = self.all_labels();
        other.all_labels().iter().any(|label| labels.contains(label))
    }

    pub fn add_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        if label != self.type_name {
            self.labels.insert(label);
        }
    }

    /// Add a property. Fails if the name is already used by a relationship (or another
    /// property).
    pub fn add_property(&mut self, property: PropertyInfo) -> Result<(), ModelError> {
        if self.has_field(&property.field_name) {
            return Err(ModelError::DuplicateField {
                type_name: self.type_name.clone(),
                field_name: property.field_name,
            });
        }
        self.properties
            .insert(property.field_name.clone(), property);
        Ok(())
    }

    /// Add a relationship, merging it with an earlier observation of the same field.
    pub fn merge_relationship(&mut self, relationship: RelationshipInfo) -> Result<(), ModelError> {
        if self.properties.contains_key(&relationship.field_name) {
            return Err(ModelError::DuplicateField {
                type_name: self.type_name.clone(),
                field_name: relationship.field_name,
            });
        }

        match self.relationships.get_mut(&relationship.field_name) {
            Some(existing) => existing.merge(&self.type_name, &relationship),
            None => {
                self.relationships
                    .insert(relationship.field_name.clone(), relationship);
                Ok(())
            }
        }
    }

    /// Register a candidate for the identity property. The first candidate wins; later ones
    /// are ignored. Returns whether the candidate was accepted.
    pub fn register_id_property(&mut self, field_name: &str) -> bool {
        if self.id_property.is_some() {
            return false;
        }
        self.id_property = Some(field_name.to_string());
        true
    }

    pub fn id_property_info(&self) -> Option<&PropertyInfo> {
        self.id_property
            .as_deref()
            .and_then(|name| self.properties.get(name))
    }
}
