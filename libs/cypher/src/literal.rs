// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;

use super::{CypherBuilder, ExpressionBuilder};

/// A constant value inlined into the statement text.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Literal>),
    Map(IndexMap<String, Literal>),
}

impl ExpressionBuilder for Literal {
    fn build(&self, builder: &mut CypherBuilder) {
        match self {
            Literal::Null => builder.push_str("null"),
            Literal::Boolean(value) => builder.push_str(if *value { "true" } else { "false" }),
            Literal::Int(value) => builder.push_str(value.to_string()),
            // Debug formatting keeps the fractional part (`1.0` instead of `1`), so the value stays
            // a float on the database side
            Literal::Float(value) => builder.push_str(format!("{value:?}")),
            Literal::String(value) => builder.push_string_literal(value),
            Literal::List(elems) => {
                builder.push('[');
                builder.push_elems(elems, ", ");
                builder.push(']');
            }
            Literal::Map(entries) => {
                builder.push('{');
                builder.push_iter(entries.iter(), ", ", |builder, (key, value)| {
                    builder.push_identifier(key);
                    builder.push_str(": ");
                    value.build(builder);
                });
                builder.push('}');
            }
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Int(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}
