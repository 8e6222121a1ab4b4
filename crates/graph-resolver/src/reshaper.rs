// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Shaping the rows returned by a statement into the value of a response field.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::Row;

/// A value as returned by the graph database.
///
/// Deserialized untagged, so plain JSON (as used by test fixtures) maps onto scalars, lists and
/// maps, while objects with the fields of a node, relationship, or path map onto those.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum GraphValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<GraphValue>),
    Node {
        id: i64,
        labels: Vec<String>,
        properties: IndexMap<String, GraphValue>,
    },
    Relationship {
        id: i64,
        #[serde(rename = "type")]
        rel_type: String,
        properties: IndexMap<String, GraphValue>,
    },
    Path {
        elements: Vec<GraphValue>,
    },
    Map(IndexMap<String, GraphValue>),
}

impl GraphValue {
    /// The value as it appears in a response. Nodes and relationships become maps of their
    /// properties, with the id and labels (or type) added under `_id` and `_labels` (`_type`).
    pub fn into_json(self) -> serde_json::Value {
        match self {
            GraphValue::Null => serde_json::Value::Null,
            GraphValue::Bool(value) => serde_json::Value::Bool(value),
            GraphValue::Int(value) => serde_json::Value::from(value),
            // Not representable in JSON
            GraphValue::Float(value) if !value.is_finite() => serde_json::Value::Null,
            GraphValue::Float(value) => serde_json::Value::from(value),
            GraphValue::String(value) => serde_json::Value::String(value),
            GraphValue::List(elements) | GraphValue::Path { elements } => {
                serde_json::Value::Array(elements.into_iter().map(Self::into_json).collect())
            }
            GraphValue::Node {
                id,
                labels,
                properties,
            } => {
                let mut map = json_map(properties);
                map.insert("_id".to_string(), id.into());
                map.insert("_labels".to_string(), labels.into());
                serde_json::Value::Object(map)
            }
            GraphValue::Relationship {
                id,
                rel_type,
                properties,
            } => {
                let mut map = json_map(properties);
                map.insert("_id".to_string(), id.into());
                map.insert("_type".to_string(), rel_type.into());
                serde_json::Value::Object(map)
            }
            GraphValue::Map(entries) => serde_json::Value::Object(json_map(entries)),
        }
    }
}

fn json_map(entries: IndexMap<String, GraphValue>) -> serde_json::Map<String, serde_json::Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key, value.into_json()))
        .collect()
}

/// Shape the rows of a statement into the value of its field: a list of rows, or the first row
/// (`null` without rows) for a single result. A row with a single column stands for its value;
/// a row with several columns becomes a map.
pub fn reshape(rows: Vec<Row>, result_is_list: bool) -> serde_json::Value {
    let mut values = rows.into_iter().map(reshape_row);

    if result_is_list {
        serde_json::Value::Array(values.collect())
    } else {
        values.next().unwrap_or(serde_json::Value::Null)
    }
}

fn reshape_row(row: Row) -> serde_json::Value {
    if row.len() == 1 {
        row.into_iter()
            .next()
            .map(|(_, value)| value.into_json())
            .unwrap_or(serde_json::Value::Null)
    } else {
        serde_json::Value::Object(json_map(row))
    }
}
