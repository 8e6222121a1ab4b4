// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use serde::{Deserialize, Serialize};

/// The kind of a scalar (or reference) type, which drives operator applicability.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Boolean,
    Int,
    Float,
    String,
    Id,
    Enum,
    /// A user-declared scalar (such as `DateTime`)
    Custom,
    /// A reference to an object or interface type
    Object,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PropertyType {
    pub name: String,
    pub array: bool,
    /// Number of non-null wrappers (`String!` is 1, `[String!]!` is 2)
    pub non_null_depth: u8,
    /// Whether the outermost type is non-null
    pub required: bool,
    pub kind: ScalarKind,
}

impl ScalarKind {
    /// The kind of a built-in scalar, if `name` is one
    pub fn builtin(name: &str) -> Option<ScalarKind> {
        match name {
            "Boolean" => Some(ScalarKind::Boolean),
            "Int" | "Long" => Some(ScalarKind::Int),
            "Float" => Some(ScalarKind::Float),
            "String" => Some(ScalarKind::String),
            "ID" => Some(ScalarKind::Id),
            _ => None,
        }
    }

    pub fn is_string_like(&self) -> bool {
        matches!(self, ScalarKind::String | ScalarKind::Id)
    }
}

impl PropertyType {
    pub fn new(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            array: false,
            non_null_depth: 0,
            required: false,
            kind,
        }
    }

    /// A nullable built-in scalar type (`String`, `Int`, ...), falling back to a custom scalar.
    pub fn scalar(name: &str) -> Self {
        Self::new(name, ScalarKind::builtin(name).unwrap_or(ScalarKind::Custom))
    }

    pub fn list(mut self) -> Self {
        self.array = true;
        self
    }

    pub fn non_null(mut self) -> Self {
        self.non_null_depth = self.non_null_depth.saturating_add(1).min(2);
        self.required = true;
        self
    }

    pub fn is_enum(&self) -> bool {
        self.kind == ScalarKind::Enum
    }

    /// A scalar or enum type (or a list of them), as opposed to a reference to another type
    pub fn is_basic(&self) -> bool {
        self.kind != ScalarKind::Object
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.array, self.non_null_depth, self.required) {
            (false, _, true) => write!(f, "{}!", self.name),
            (false, _, false) => write!(f, "{}", self.name),
            (true, 2, _) => write!(f, "[{}!]!", self.name),
            (true, 1, true) => write!(f, "[{}]!", self.name),
            (true, 1, false) => write!(f, "[{}!]", self.name),
            (true, _, _) => write!(f, "[{}]", self.name),
        }
    }
}
