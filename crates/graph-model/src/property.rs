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

use crate::PropertyType;

/// A statement that replaces the default read of a field
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CustomQuery {
    pub statement: String,
    /// Parameters supplied to the statement in addition to the field's arguments
    pub static_params: IndexMap<String, serde_json::Value>,
    /// Return the statement's result as is, without projecting the selection onto it
    pub pass_through: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ParameterInfo {
    pub name: String,
    pub param_type: PropertyType,
    pub default_value: Option<serde_json::Value>,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PropertyInfo {
    pub field_name: String,
    pub property_type: PropertyType,
    pub unique: bool,
    pub default_value: Option<serde_json::Value>,
    pub description: Option<String>,
    pub custom_query: Option<CustomQuery>,
    pub parameters: IndexMap<String, ParameterInfo>,
}

impl CustomQuery {
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            static_params: IndexMap::new(),
            pass_through: false,
        }
    }
}

impl ParameterInfo {
    pub fn new(name: impl Into<String>, param_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            param_type,
            default_value: None,
            description: None,
        }
    }
}

impl PropertyInfo {
    pub fn new(field_name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            field_name: field_name.into(),
            property_type,
            unique: false,
            default_value: None,
            description: None,
            custom_query: None,
            parameters: IndexMap::new(),
        }
    }

    /// Whether reading this field is a plain property access (as opposed to a custom query)
    pub fn is_stored(&self) -> bool {
        self.custom_query.is_none()
    }
}
