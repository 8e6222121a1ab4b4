// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Filters: the `filter` argument, a nested object such as
//! `{name_starts_with: "K", movies_some: {released_gt: 2000}, OR: [...]}`.
//!
//! Recursion follows the filter value: each level resolves its keys against the type it applies
//! to, so a filter can only be as deep as the value supplied.

use cypher::{Expression, Literal, PatternComprehension, Predicate, Quantifier};
use graph_model::{MetadataRegistry, Operator, PropertyInfo, RelationshipInfo, TypeMetadata};

use crate::TranslationError;
use crate::translator::traversal_pattern;
use crate::value_mapper::json_literal;

/// Apply an operator to a property. Only the operators applicable to the property's type are
/// accepted. A `None` operand stands for `null`, which turns equality into a null check.
pub(crate) fn operator_predicate(
    property: &PropertyInfo,
    operator: Operator,
    lhs: Expression,
    rhs: Option<Expression>,
) -> Result<Predicate, TranslationError> {
    let unsupported = || TranslationError::UnsupportedOperator {
        field: property.field_name.clone(),
        operator: operator.suffix().to_string(),
    };

    if !Operator::for_type(&property.property_type).contains(&operator) {
        return Err(unsupported());
    }

    let predicate = match (operator.positive(), rhs) {
        (Operator::Eq, None) => Predicate::IsNull(lhs),
        (Operator::Eq, Some(rhs)) => Predicate::Eq(lhs, rhs),
        (positive, rhs) => {
            let rhs = rhs.unwrap_or(Expression::Literal(Literal::Null));
            match positive {
                Operator::Gte => Predicate::Gte(lhs, rhs),
                Operator::Gt => Predicate::Gt(lhs, rhs),
                Operator::Lte => Predicate::Lte(lhs, rhs),
                Operator::Lt => Predicate::Lt(lhs, rhs),
                Operator::In => Predicate::In(lhs, rhs),
                Operator::Contains => Predicate::Contains(lhs, rhs),
                Operator::StartsWith => Predicate::StartsWith(lhs, rhs),
                Operator::EndsWith => Predicate::EndsWith(lhs, rhs),
                _ => return Err(unsupported()),
            }
        }
    };

    Ok(if operator.is_negated() {
        !predicate
    } else {
        predicate
    })
}

pub(crate) fn filter_predicate(
    filter: &serde_json::Value,
    metadata: &TypeMetadata,
    variable: &str,
    registry: &MetadataRegistry,
) -> Result<Predicate, TranslationError> {
    match filter {
        serde_json::Value::Null => Ok(Predicate::True),
        serde_json::Value::Object(entries) => {
            let predicates = entries
                .iter()
                .map(|(key, value)| filter_entry(key, value, metadata, variable, registry))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Predicate::all(predicates))
        }
        _ => Err(TranslationError::invalid_argument(
            "filter",
            format!("expected an object, got {filter}"),
        )),
    }
}

fn filter_entry(
    key: &str,
    value: &serde_json::Value,
    metadata: &TypeMetadata,
    variable: &str,
    registry: &MetadataRegistry,
) -> Result<Predicate, TranslationError> {
    match key {
        "AND" => Ok(Predicate::all(nested_filters(
            key, value, metadata, variable, registry,
        )?)),
        "OR" => Ok(Predicate::any(nested_filters(
            key, value, metadata, variable, registry,
        )?)),
        _ => {
            let (base, operator) = Operator::resolve(key, |name| metadata.has_field(name));

            if let Some(property) = metadata.property(base) {
                let rhs = (!value.is_null()).then(|| Expression::Literal(json_literal(value)));
                operator_predicate(property, operator, Expression::property(variable, base), rhs)
            } else if let Some(relationship) = metadata.relationship(base) {
                relationship_predicate(relationship, operator, value, variable, registry)
            } else {
                Err(TranslationError::UnknownFilterField {
                    type_name: metadata.type_name.clone(),
                    field: key.to_string(),
                })
            }
        }
    }
}

/// The operands of `AND`, `OR`, and `_in`: a list of filters, or a single one
fn nested_filters(
    key: &str,
    value: &serde_json::Value,
    metadata: &TypeMetadata,
    variable: &str,
    registry: &MetadataRegistry,
) -> Result<Vec<Predicate>, TranslationError> {
    match value {
        serde_json::Value::Array(elems) => elems
            .iter()
            .map(|elem| filter_predicate(elem, metadata, variable, registry))
            .collect(),
        serde_json::Value::Object(_) => Ok(vec![filter_predicate(
            value, metadata, variable, registry,
        )?]),
        _ => Err(TranslationError::invalid_argument(
            key,
            format!("expected a list of filters, got {value}"),
        )),
    }
}

/// A filter on related entities, quantified over
/// `[(variable)-[:TYPE]->(variable_field:Target) | variable_field]`.
fn relationship_predicate(
    relationship: &RelationshipInfo,
    operator: Operator,
    value: &serde_json::Value,
    variable: &str,
    registry: &MetadataRegistry,
) -> Result<Predicate, TranslationError> {
    let target = registry
        .get(&relationship.target_type)
        .ok_or_else(|| TranslationError::UnknownType(relationship.target_type.clone()))?;

    if !Operator::for_relationship(relationship).contains(&operator) {
        return Err(TranslationError::UnsupportedOperator {
            field: relationship.field_name.clone(),
            operator: operator.suffix().to_string(),
        });
    }

    let item = format!("{variable}_{}", relationship.field_name);
    let related = Expression::PatternComprehension(Box::new(PatternComprehension {
        pattern: traversal_pattern(variable, relationship, &item, target),
        predicate: Predicate::True,
        projection: Expression::variable(&item),
    }));

    let (quantifier, predicate) = match (operator, value) {
        (Operator::Eq, serde_json::Value::Null) => (Quantifier::None, Predicate::True),
        (Operator::Neq, serde_json::Value::Null) => (Quantifier::Any, Predicate::True),
        (Operator::In | Operator::NotIn, _) => {
            let alternatives = nested_filters(
                &operator.argument_name(&relationship.field_name),
                value,
                target,
                &item,
                registry,
            )?;
            let quantifier = if operator == Operator::In {
                Quantifier::Any
            } else {
                Quantifier::None
            };
            (quantifier, Predicate::any(alternatives))
        }
        (operator, value) => {
            let quantifier = match operator {
                Operator::Neq | Operator::None => Quantifier::None,
                Operator::Every => Quantifier::All,
                Operator::Single => Quantifier::Single,
                _ => Quantifier::Any,
            };
            (quantifier, filter_predicate(value, target, &item, registry)?)
        }
    };

    Ok(Predicate::quantified(quantifier, item, related, predicate))
}

#[cfg(test)]
mod tests {
    use cypher::ExpressionBuilder;
    use serde_json::json;

    use crate::test_util::registry;

    use super::*;

    fn person_filter(filter: serde_json::Value) -> Result<String, TranslationError> {
        let registry = registry();
        let person = registry.get("Person").unwrap();

        filter_predicate(&filter, person, "person", &registry).map(|predicate| {
            let (cypher, params) = predicate.to_cypher();
            assert!(params.is_empty());
            cypher
        })
    }

    #[test]
    fn scalar_operators() {
        assert_eq!(
            person_filter(json!({"name_starts_with": "K", "born_gte": 1960, "born_lt": 1970})),
            Ok(r#"`person`.`name` STARTS WITH "K" AND `person`.`born` >= 1960 AND `person`.`born` < 1970"#.to_string())
        );
        assert_eq!(
            person_filter(json!({"name_not_in": ["A", "B"], "name_not_contains": "x"})),
            Ok(r#"NOT (`person`.`name` IN ["A", "B"]) AND NOT (`person`.`name` CONTAINS "x")"#.to_string())
        );
    }

    #[test]
    fn null_checks() {
        assert_eq!(
            person_filter(json!({"born": null, "name_not": null})),
            Ok("`person`.`born` IS NULL AND `person`.`name` IS NOT NULL".to_string())
        );
        assert_eq!(
            person_filter(json!({"name_not": "Keanu"})),
            Ok(r#"`person`.`name` <> "Keanu""#.to_string())
        );
    }

    #[test]
    fn logical_combinations() {
        assert_eq!(
            person_filter(json!({
                "OR": [{"name": "Keanu"}, {"born_gt": 1990}],
                "born_lt": 2000
            })),
            Ok(r#"(`person`.`name` = "Keanu" OR `person`.`born` > 1990) AND `person`.`born` < 2000"#.to_string())
        );
        assert_eq!(person_filter(json!({"AND": []})), Ok("true".to_string()));
        assert_eq!(person_filter(json!({"OR": []})), Ok("false".to_string()));
        assert_eq!(
            person_filter(json!({"AND": {"name": "Keanu"}})),
            Ok(r#"`person`.`name` = "Keanu""#.to_string())
        );
    }

    #[test]
    fn single_relationship() {
        assert_eq!(
            person_filter(json!({"company": {"name": "ACME"}})),
            Ok(r#"ANY(`person_company` IN [(`person`)-[:`WORKS_AT`]->(`person_company`:`Company`) | `person_company`] WHERE `person_company`.`name` = "ACME")"#.to_string())
        );
        assert_eq!(
            person_filter(json!({"company": null})),
            Ok("NONE(`person_company` IN [(`person`)-[:`WORKS_AT`]->(`person_company`:`Company`) | `person_company`] WHERE true)".to_string())
        );
    }

    #[test]
    fn quantifiers() {
        let registry = registry();
        let company = registry.get("Company").unwrap();
        let filter = |filter: serde_json::Value| {
            filter_predicate(&filter, company, "company", &registry)
                .unwrap()
                .to_cypher()
                .0
        };
        let employees = "[(`company`)<-[:`WORKS_AT`]-(`company_employees`:`Person`) | `company_employees`]";

        assert_eq!(
            filter(json!({"employees_none": {"name": "Jim"}})),
            format!(r#"NONE(`company_employees` IN {employees} WHERE `company_employees`.`name` = "Jim")"#)
        );
        assert_eq!(
            filter(json!({"employees_every": {"born_gt": 1980}})),
            format!("ALL(`company_employees` IN {employees} WHERE `company_employees`.`born` > 1980)")
        );
        assert_eq!(
            filter(json!({"employees_single": {"born_gt": 1980}})),
            format!("SINGLE(`company_employees` IN {employees} WHERE `company_employees`.`born` > 1980)")
        );
        assert_eq!(
            filter(json!({"employees_some": {"born_gt": 1980}})),
            format!("ANY(`company_employees` IN {employees} WHERE `company_employees`.`born` > 1980)")
        );
        assert_eq!(
            filter(json!({"employees_in": [{"name": "Jim"}, {"name": "Pam"}]})),
            format!(r#"ANY(`company_employees` IN {employees} WHERE `company_employees`.`name` = "Jim" OR `company_employees`.`name` = "Pam")"#)
        );
        assert_eq!(
            filter(json!({"employees_not_in": [{"name": "Jim"}]})),
            format!(r#"NONE(`company_employees` IN {employees} WHERE `company_employees`.`name` = "Jim")"#)
        );
    }

    #[test]
    fn nested_relationships() {
        assert_eq!(
            person_filter(json!({"movies_some": {"actors_none": {"name": "Keanu"}}})),
            Ok(r#"ANY(`person_movies` IN [(`person`)-[:`ACTED_IN`]->(`person_movies`:`Movie`) | `person_movies`] WHERE NONE(`person_movies_actors` IN [(`person_movies`)<-[:`ACTED_IN`]-(`person_movies_actors`:`Person`) | `person_movies_actors`] WHERE `person_movies_actors`.`name` = "Keanu"))"#.to_string())
        );
    }

    #[test]
    fn operators_follow_property_type() {
        let registry = graph_model_builder::parse(
            r#"
            enum Genre { DRAMA COMEDY }
            type Movie { title: String! active: Boolean released: Int genre: Genre }
            "#,
        )
        .unwrap();
        let movie = registry.get("Movie").unwrap();
        let filter = |filter: serde_json::Value| {
            filter_predicate(&filter, movie, "movie", &registry)
                .map(|predicate| predicate.to_cypher().0)
        };
        let unsupported = |field: &str, operator: &str| -> Result<String, TranslationError> {
            Err(TranslationError::UnsupportedOperator {
                field: field.into(),
                operator: operator.into(),
            })
        };

        assert_eq!(
            filter(json!({"active": true, "active_not": false})),
            Ok("`movie`.`active` = true AND `movie`.`active` <> false".to_string())
        );
        assert_eq!(filter(json!({"active_contains": "x"})), unsupported("active", "contains"));
        assert_eq!(filter(json!({"active_gt": true})), unsupported("active", "gt"));
        assert_eq!(filter(json!({"active_in": [true]})), unsupported("active", "in"));

        assert_eq!(
            filter(json!({"released_starts_with": "19"})),
            unsupported("released", "starts_with")
        );

        assert_eq!(
            filter(json!({"genre_in": ["DRAMA"]})),
            Ok(r#"`movie`.`genre` IN ["DRAMA"]"#.to_string())
        );
        assert_eq!(filter(json!({"genre_gte": "DRAMA"})), unsupported("genre", "gte"));
        assert_eq!(filter(json!({"genre_contains": "RA"})), unsupported("genre", "contains"));

        assert_eq!(
            filter(json!({"title_ends_with": "x"})),
            Ok(r#"`movie`.`title` ENDS WITH "x""#.to_string())
        );
    }

    #[test]
    fn errors() {
        assert_eq!(
            person_filter(json!({"age_gt": 3})),
            Err(TranslationError::UnknownFilterField {
                type_name: "Person".into(),
                field: "age_gt".into()
            })
        );
        assert_eq!(
            person_filter(json!({"name_some": "K"})),
            Err(TranslationError::UnsupportedOperator {
                field: "name".into(),
                operator: "some".into()
            })
        );
        assert_eq!(
            person_filter(json!({"company_every": {"name": "ACME"}})),
            Err(TranslationError::UnsupportedOperator {
                field: "company".into(),
                operator: "every".into()
            })
        );
        assert!(person_filter(json!(["name"])).is_err());
    }
}
