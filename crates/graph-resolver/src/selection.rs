// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;
use serde::Serialize;

/// Variable values supplied with a request
pub type Variables = serde_json::Map<String, serde_json::Value>;

/// An argument value as written in the document. Variables stay unresolved until translation,
/// where they either become statement parameters or are substituted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Enum(String),
    List(Vec<Value>),
    Object(IndexMap<String, Value>),
    Variable(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Directive {
    pub name: String,
    pub arguments: IndexMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub alias: Option<String>,
    /// The arguments to the field, empty if no arguments are provided.
    pub arguments: IndexMap<String, Value>,
    pub directives: Vec<Directive>,
    /// Empty for scalar fields
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineFragment {
    pub type_condition: Option<String>,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Selection {
    Field(Field),
    InlineFragment(InlineFragment),
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            arguments: IndexMap::new(),
            directives: vec![],
            selection_set: vec![],
        }
    }

    /// The key of this field in the response
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn has_directive(&self, name: &str) -> bool {
        self.directives.iter().any(|directive| directive.name == name)
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_argument(mut self, name: impl Into<String>, value: Value) -> Self {
        self.arguments.insert(name.into(), value);
        self
    }

    pub fn with_directive(mut self, name: impl Into<String>) -> Self {
        self.directives.push(Directive {
            name: name.into(),
            arguments: IndexMap::new(),
        });
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.selection_set.push(Selection::Field(field));
        self
    }

    pub fn with_fragment(mut self, fragment: InlineFragment) -> Self {
        self.selection_set.push(Selection::InlineFragment(fragment));
        self
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}
