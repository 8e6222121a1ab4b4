// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;

use cypher::{Expression, Literal};

use crate::{TranslationError, Value, Variables};

/// Parameters bound while translating one top-level field.
///
/// Variables referenced from argument values become statement parameters and their values are
/// recorded here; structural arguments (filters, ordering, pagination) are resolved to plain
/// values instead, since they shape the statement itself.
pub(crate) struct Parameters<'a> {
    variables: &'a Variables,
    bound: IndexMap<String, serde_json::Value>,
}

impl<'a> Parameters<'a> {
    pub fn new(variables: &'a Variables) -> Self {
        Self {
            variables,
            bound: IndexMap::new(),
        }
    }

    pub fn variable(&self, name: &str) -> Result<&'a serde_json::Value, TranslationError> {
        self.variables
            .get(name)
            .ok_or_else(|| TranslationError::VariableNotFound(name.to_string()))
    }

    /// Bind a value to a parameter named `name`, or to `name_1`, `name_2`... if `name` already
    /// holds a different value
    pub fn bind(&mut self, name: &str, value: serde_json::Value) -> Expression {
        let name = self.free_name(name, &value);
        self.bound.insert(name.clone(), value);
        Expression::Parameter(name)
    }

    /// Bind a parameter referenced by name from a statement's text, replacing any earlier value
    pub fn bind_exact(&mut self, name: &str, value: serde_json::Value) {
        self.bound.insert(name.to_string(), value);
    }

    fn free_name(&self, name: &str, value: &serde_json::Value) -> String {
        let available =
            |candidate: &str| self.bound.get(candidate).is_none_or(|bound| bound == value);

        if available(name) {
            return name.to_string();
        }
        (1..)
            .map(|suffix: usize| format!("{name}_{suffix}"))
            .find(|candidate| available(candidate))
            .unwrap_or_else(|| name.to_string())
    }

    /// The statement expression for an argument value: literals are inlined, variables become
    /// parameters.
    pub fn expression(&mut self, value: &Value) -> Result<Expression, TranslationError> {
        Ok(match value {
            Value::Variable(name) => {
                let resolved = self.variable(name)?.clone();
                self.bind(name, resolved)
            }
            Value::List(elems) if contains_variable(value) => Expression::List(
                elems
                    .iter()
                    .map(|elem| self.expression(elem))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(entries) if contains_variable(value) => Expression::Map(
                entries
                    .iter()
                    .map(|(key, elem)| Ok((key.clone(), self.expression(elem)?)))
                    .collect::<Result<_, TranslationError>>()?,
            ),
            value => Expression::Literal(literal(value)),
        })
    }

    /// Resolve an argument value to plain data, substituting variables
    pub fn resolve(&self, value: &Value) -> Result<serde_json::Value, TranslationError> {
        Ok(match value {
            Value::Null => serde_json::Value::Null,
            Value::Int(value) => serde_json::Value::from(*value),
            Value::Float(value) => serde_json::Value::from(*value),
            Value::Boolean(value) => serde_json::Value::Bool(*value),
            Value::String(value) | Value::Enum(value) => serde_json::Value::String(value.clone()),
            Value::List(elems) => serde_json::Value::Array(
                elems
                    .iter()
                    .map(|elem| self.resolve(elem))
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(key, elem)| Ok((key.clone(), self.resolve(elem)?)))
                    .collect::<Result<_, TranslationError>>()?,
            ),
            Value::Variable(name) => self.variable(name)?.clone(),
        })
    }

    pub fn into_bound(self) -> IndexMap<String, serde_json::Value> {
        self.bound
    }
}

fn contains_variable(value: &Value) -> bool {
    match value {
        Value::Variable(_) => true,
        Value::List(elems) => elems.iter().any(contains_variable),
        Value::Object(entries) => entries.values().any(contains_variable),
        _ => false,
    }
}

/// A variable-free argument value as a literal. Enum values render as strings.
fn literal(value: &Value) -> Literal {
    match value {
        Value::Null | Value::Variable(_) => Literal::Null,
        Value::Int(value) => Literal::Int(*value),
        Value::Float(value) => Literal::Float(*value),
        Value::Boolean(value) => Literal::Boolean(*value),
        Value::String(value) | Value::Enum(value) => Literal::String(value.clone()),
        Value::List(elems) => Literal::List(elems.iter().map(literal).collect()),
        Value::Object(entries) => Literal::Map(
            entries
                .iter()
                .map(|(key, elem)| (key.clone(), literal(elem)))
                .collect(),
        ),
    }
}

/// Plain data (a resolved argument, a default value, a static parameter) as a literal
pub(crate) fn json_literal(value: &serde_json::Value) -> Literal {
    match value {
        serde_json::Value::Null => Literal::Null,
        serde_json::Value::Bool(value) => Literal::Boolean(*value),
        serde_json::Value::Number(number) => match number.as_i64() {
            Some(value) => Literal::Int(value),
            None => Literal::Float(number.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(value) => Literal::String(value.clone()),
        serde_json::Value::Array(elems) => Literal::List(elems.iter().map(json_literal).collect()),
        serde_json::Value::Object(entries) => Literal::Map(
            entries
                .iter()
                .map(|(key, elem)| (key.clone(), json_literal(elem)))
                .collect(),
        ),
    }
}
