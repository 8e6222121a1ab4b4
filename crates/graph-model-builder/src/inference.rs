// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Infer type metadata from the graph itself, for graphs without a schema document.
//!
//! Every label becomes a type. Properties are typed after the values found on sampled nodes;
//! relationships found on them become fields named `TYPE_Label` (outgoing) or `Label_TYPE`
//! (incoming).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use graph_model::{
    MetadataRegistry, ModelError, PropertyInfo, PropertyType, RelationshipDirection,
    RelationshipInfo, ScalarKind, TypeMetadata,
};

/// Number of nodes sampled per label
pub const SAMPLE_SIZE: usize = 10;

/// Nodes with more relationships than this are considered dense; samplers should skip
/// relationship types with at least this many relationships on such nodes.
pub const DENSE_NODE: usize = 50;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SampledRelationship {
    pub rel_type: String,
    pub direction: RelationshipDirection,
    /// Labels of the node at the other end of the (first) relationship
    pub other_labels: Vec<String>,
    /// Whether the node has more than one relationship of this type and direction
    pub multiple: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SampledNode {
    pub labels: Vec<String>,
    pub properties: IndexMap<String, serde_json::Value>,
    pub relationships: Vec<SampledRelationship>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LabelSample {
    pub label: String,
    /// Properties backed by a uniqueness constraint
    pub unique_properties: Vec<String>,
    pub nodes: Vec<SampledNode>,
}

pub fn infer_registry(samples: &[LabelSample]) -> Result<MetadataRegistry, ModelError> {
    let mut registry = MetadataRegistry::new();

    for sample in samples {
        registry.add_type(infer_type(sample)?)?;
    }

    Ok(registry)
}

fn infer_type(sample: &LabelSample) -> Result<TypeMetadata, ModelError> {
    let mut metadata = TypeMetadata::new(&sample.label);

    // Later values win, so that the type reflects the most recently sampled node
    let mut property_values: IndexMap<&str, &serde_json::Value> = IndexMap::new();
    for node in sample.nodes.iter().take(SAMPLE_SIZE) {
        for label in &node.labels {
            metadata.add_label(label);
        }
        for (key, value) in &node.properties {
            if !value.is_null() {
                property_values.insert(key, value);
            }
        }
    }

    for (key, value) in property_values {
        let mut property = PropertyInfo::new(key, infer_property_type(value));
        property.unique = sample.unique_properties.iter().any(|unique| unique == key);
        metadata.add_property(property)?;
    }
    for unique in &sample.unique_properties {
        if metadata.properties.contains_key(unique) {
            metadata.register_id_property(unique);
        }
    }

    for node in sample.nodes.iter().take(SAMPLE_SIZE) {
        for relationship in &node.relationships {
            for other_label in &relationship.other_labels {
                let field_name = match relationship.direction {
                    RelationshipDirection::Out => format!("{}_{other_label}", relationship.rel_type),
                    RelationshipDirection::In => format!("{other_label}_{}", relationship.rel_type),
                };
                metadata.merge_relationship(RelationshipInfo::new(
                    field_name,
                    &relationship.rel_type,
                    other_label,
                    relationship.direction,
                    relationship.multiple,
                ))?;
            }
        }
    }

    Ok(metadata)
}

fn infer_property_type(value: &serde_json::Value) -> PropertyType {
    match value {
        serde_json::Value::Bool(_) => PropertyType::new("Boolean", ScalarKind::Boolean),
        serde_json::Value::Number(number) if number.is_f64() => {
            PropertyType::new("Float", ScalarKind::Float)
        }
        serde_json::Value::Number(_) => PropertyType::new("Long", ScalarKind::Int),
        serde_json::Value::Array(elems) => match elems.first() {
            Some(first) => infer_property_type(first).list(),
            None => PropertyType::scalar("String").list(),
        },
        _ => PropertyType::scalar("String"),
    }
}
