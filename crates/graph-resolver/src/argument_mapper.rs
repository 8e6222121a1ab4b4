// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use indexmap::IndexMap;

use cypher::{Expression, OrderBy, OrderByElement, Ordering, Predicate};
use graph_model::{MetadataRegistry, Operator, ParameterInfo, TypeMetadata};

use crate::limit_offset_mapper::{count, slice_bounds};
use crate::order_by_mapper::order_by;
use crate::predicate_mapper::{filter_predicate, operator_predicate};
use crate::value_mapper::Parameters;
use crate::{Field, TranslationError, Value};

/// What the arguments of a field ask of the entities in its scope
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScopeArguments {
    pub predicate: Predicate,
    pub order_by: Vec<(String, Ordering)>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl ScopeArguments {
    pub fn order_by_clause(&self, variable: &str) -> Option<OrderBy> {
        if self.order_by.is_empty() {
            return None;
        }
        Some(OrderBy(
            self.order_by
                .iter()
                .map(|(property, ordering)| {
                    OrderByElement(Expression::property(variable, property), *ordering)
                })
                .collect(),
        ))
    }

    pub fn slice_bounds(&self) -> Option<(i64, Option<i64>)> {
        slice_bounds(self.skip, self.limit)
    }
}

/// Map the arguments of `field`, whose entities are bound to `variable`. Arguments named in
/// `declared` feed a custom statement instead and are skipped here.
pub(crate) fn scope_arguments(
    field: &Field,
    metadata: &TypeMetadata,
    variable: &str,
    declared: &IndexMap<String, ParameterInfo>,
    registry: &MetadataRegistry,
    parameters: &mut Parameters,
) -> Result<ScopeArguments, TranslationError> {
    let mut predicates = vec![];
    let mut arguments = ScopeArguments {
        predicate: Predicate::True,
        order_by: vec![],
        skip: None,
        limit: None,
    };

    for (name, value) in &field.arguments {
        if declared.contains_key(name) {
            continue;
        }

        match name.as_str() {
            "first" => arguments.limit = Some(count(name, &parameters.resolve(value)?)?),
            "offset" => arguments.skip = Some(count(name, &parameters.resolve(value)?)?),
            "orderBy" => arguments.order_by = order_by(&parameters.resolve(value)?, metadata)?,
            "filter" => predicates.push(filter_predicate(
                &parameters.resolve(value)?,
                metadata,
                variable,
                registry,
            )?),
            _ => predicates.push(argument_predicate(
                name, value, metadata, variable, parameters,
            )?),
        }
    }

    arguments.predicate = Predicate::all(predicates);
    Ok(arguments)
}

/// A plain argument such as `name: "Keanu"`, `born_gte: 1960`, or `names: ["A", "B"]` (a plural
/// of a property means membership).
///
/// Plurals are recognized by a trailing `s` only, so irregular plurals and plurals ending in `es`
/// (`addresses` for `address`) are not.
fn argument_predicate(
    name: &str,
    value: &Value,
    metadata: &TypeMetadata,
    variable: &str,
    parameters: &mut Parameters,
) -> Result<Predicate, TranslationError> {
    if let Some(singular) = name.strip_suffix('s') {
        let accepts_list = metadata.property(singular).is_some_and(|property| {
            Operator::for_type(&property.property_type).contains(&Operator::In)
        });
        if !metadata.has_field(name) && accepts_list && is_list(value, parameters)? {
            return Ok(Predicate::In(
                Expression::property(variable, singular),
                parameters.expression(value)?,
            ));
        }
    }

    let (base, operator) = Operator::resolve(name, |name| metadata.properties.contains_key(name));
    let property = metadata
        .property(base)
        .ok_or_else(|| TranslationError::UnknownArgument {
            type_name: metadata.type_name.clone(),
            argument: name.to_string(),
        })?;

    let rhs = if is_null(value, parameters)? {
        None
    } else {
        Some(parameters.expression(value)?)
    };
    operator_predicate(property, operator, Expression::property(variable, base), rhs)
}

fn is_list(value: &Value, parameters: &Parameters) -> Result<bool, TranslationError> {
    Ok(match value {
        Value::List(_) => true,
        Value::Variable(name) => parameters.variable(name)?.is_array(),
        _ => false,
    })
}

fn is_null(value: &Value, parameters: &Parameters) -> Result<bool, TranslationError> {
    Ok(match value {
        Value::Null => true,
        Value::Variable(name) => parameters.variable(name)?.is_null(),
        _ => false,
    })
}
