// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Parsing a GraphQL request into the [Operation] to execute.
//!
//! The document is reduced to plain [Field]s: named fragments are inlined (as inline fragments,
//! so their type conditions still apply), fields excluded by `@skip`/`@include` are dropped, and
//! variable defaults are applied. Everything else (whether fields and arguments exist) is left
//! to translation, which knows the graph schema.

use std::collections::HashMap;

use async_graphql_parser::{
    Pos, Positioned, parse_query,
    types::{
        Directive as GqlDirective, DocumentOperations, Field as GqlField, FragmentDefinition,
        OperationDefinition, OperationType, Selection as GqlSelection, SelectionSet,
        VariableDefinition,
    },
};
use async_graphql_value::{Name, Value as GqlValue};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::{Directive, Field, InlineFragment, Selection, Value, Variables};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperationKind {
    Query,
    Mutation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    pub name: Option<String>,
    pub kind: OperationKind,
    /// The top-level fields, in document order
    pub fields: Vec<Field>,
    /// The supplied variables, completed with the defaults declared by the operation
    pub variables: Variables,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("Syntax error at {}:{}: {message}", pos.line, pos.column)]
    Syntax { message: String, pos: Pos },

    #[error("No operation found")]
    NoOperationFound,

    #[error("Must provide operation name if query contains multiple operations")]
    MultipleOperationsNoOperationName,

    #[error("operationName '{0}' doesn't match any operation")]
    MultipleOperationsUnmatchedOperationName(String),

    #[error("Subscriptions are not supported")]
    Subscription,

    #[error("Fragment definition '{0}' not found")]
    FragmentNotFound(String, Pos),

    #[error("Fragment '{0}' spreads itself")]
    FragmentCycle(String, Pos),

    #[error("Variable '{0}' could not be deserialized: {1}")]
    MalformedVariable(String, String),

    #[error("Invalid @{directive} directive: {message}")]
    InvalidDirectiveArgument {
        directive: String,
        message: String,
        pos: Pos,
    },
}

impl DocumentError {
    pub fn pos(&self) -> Pos {
        match self {
            DocumentError::Syntax { pos, .. }
            | DocumentError::FragmentNotFound(_, pos)
            | DocumentError::FragmentCycle(_, pos)
            | DocumentError::InvalidDirectiveArgument { pos, .. } => *pos,
            _ => Pos::default(),
        }
    }
}

impl From<async_graphql_parser::Error> for DocumentError {
    fn from(error: async_graphql_parser::Error) -> Self {
        let pos = error.positions().next().unwrap_or_default();
        let message = match error {
            async_graphql_parser::Error::Syntax { message, .. } => message,
            error => error.to_string(),
        };
        DocumentError::Syntax { message, pos }
    }
}

/// Parse `query` and reduce the operation to execute.
///
/// The operation is selected as follows:
/// - a document with a single anonymous operation uses it
/// - without an operation name, the document must contain exactly one operation
/// - with an operation name, the document must contain an operation of that name
#[instrument(name = "document::parse_operation", skip(query, variables))]
pub fn parse_operation(
    query: &str,
    operation_name: Option<&str>,
    variables: Variables,
) -> Result<Operation, DocumentError> {
    let document = parse_query(query)?;
    let (name, operation) = select_operation(document.operations, operation_name)?;
    let operation = operation.node;

    let kind = match operation.ty {
        OperationType::Query => OperationKind::Query,
        OperationType::Mutation => OperationKind::Mutation,
        OperationType::Subscription => return Err(DocumentError::Subscription),
    };
    let variables = with_defaults(&operation.variable_definitions, variables)?;

    let lowering = Lowering {
        fragments: &document.fragments,
        variables: &variables,
    };
    let mut fields = vec![];
    flatten_root(
        lowering.selection_set(&operation.selection_set.node, &mut vec![])?,
        &mut fields,
    );

    Ok(Operation {
        name,
        kind,
        fields,
        variables,
    })
}

fn select_operation(
    operations: DocumentOperations,
    operation_name: Option<&str>,
) -> Result<(Option<String>, Positioned<OperationDefinition>), DocumentError> {
    match operations {
        DocumentOperations::Single(operation) => {
            Ok((operation_name.map(|name| name.to_string()), operation))
        }
        DocumentOperations::Multiple(mut operations) => match operation_name {
            // A named operation parses as `Multiple` even when it is the only one
            None if operations.len() == 1 => operations
                .into_iter()
                .next()
                .map(|(name, operation)| (Some(name.to_string()), operation))
                .ok_or(DocumentError::NoOperationFound),
            None if operations.is_empty() => Err(DocumentError::NoOperationFound),
            None => Err(DocumentError::MultipleOperationsNoOperationName),
            Some(name) => operations
                .remove(&Name::new(name))
                .map(|operation| (Some(name.to_string()), operation))
                .ok_or_else(|| {
                    DocumentError::MultipleOperationsUnmatchedOperationName(name.to_string())
                }),
        },
    }
}

fn with_defaults(
    definitions: &[Positioned<VariableDefinition>],
    mut variables: Variables,
) -> Result<Variables, DocumentError> {
    for definition in definitions {
        let name = definition.node.name.node.as_str();
        if variables.contains_key(name) {
            continue;
        }
        if let Some(default_value) = &definition.node.default_value {
            let value = default_value
                .node
                .clone()
                .into_json()
                .map_err(|e| DocumentError::MalformedVariable(name.to_string(), e.to_string()))?;
            variables.insert(name.to_string(), value);
        }
    }
    Ok(variables)
}

/// Fragments at the top level select from the root type, so they just contribute fields
fn flatten_root(selections: Vec<Selection>, fields: &mut Vec<Field>) {
    for selection in selections {
        match selection {
            Selection::Field(field) => fields.push(field),
            Selection::InlineFragment(fragment) => flatten_root(fragment.selection_set, fields),
        }
    }
}

struct Lowering<'a> {
    fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    variables: &'a Variables,
}

impl Lowering<'_> {
    /// `spreads` holds the named fragments being expanded, innermost last
    fn selection_set(
        &self,
        selection_set: &SelectionSet,
        spreads: &mut Vec<String>,
    ) -> Result<Vec<Selection>, DocumentError> {
        let mut selections = vec![];

        for selection in &selection_set.items {
            match &selection.node {
                GqlSelection::Field(field) => {
                    if self.included(&field.node.directives)? {
                        selections.push(Selection::Field(self.field(&field.node, spreads)?));
                    }
                }
                GqlSelection::InlineFragment(fragment) => {
                    if self.included(&fragment.node.directives)? {
                        selections.push(Selection::InlineFragment(InlineFragment {
                            type_condition: fragment
                                .node
                                .type_condition
                                .as_ref()
                                .map(|condition| condition.node.on.node.to_string()),
                            selection_set: self
                                .selection_set(&fragment.node.selection_set.node, spreads)?,
                        }));
                    }
                }
                GqlSelection::FragmentSpread(spread) => {
                    if !self.included(&spread.node.directives)? {
                        continue;
                    }

                    let name = spread.node.fragment_name.node.as_str();
                    let definition = self
                        .fragments
                        .get(&spread.node.fragment_name.node)
                        .ok_or_else(|| DocumentError::FragmentNotFound(name.to_string(), spread.pos))?;
                    if spreads.iter().any(|spread| spread == name) {
                        return Err(DocumentError::FragmentCycle(name.to_string(), spread.pos));
                    }

                    spreads.push(name.to_string());
                    let selection_set =
                        self.selection_set(&definition.node.selection_set.node, spreads)?;
                    spreads.pop();

                    selections.push(Selection::InlineFragment(InlineFragment {
                        type_condition: Some(definition.node.type_condition.node.on.node.to_string()),
                        selection_set,
                    }));
                }
            }
        }

        Ok(selections)
    }

    fn field(&self, field: &GqlField, spreads: &mut Vec<String>) -> Result<Field, DocumentError> {
        Ok(Field {
            name: field.name.node.to_string(),
            alias: field.alias.as_ref().map(|alias| alias.node.to_string()),
            arguments: field
                .arguments
                .iter()
                .map(|(name, value)| (name.node.to_string(), value_of(&value.node)))
                .collect(),
            directives: field
                .directives
                .iter()
                .filter(|directive| !is_conditional(&directive.node))
                .map(|directive| Directive {
                    name: directive.node.name.node.to_string(),
                    arguments: directive
                        .node
                        .arguments
                        .iter()
                        .map(|(name, value)| (name.node.to_string(), value_of(&value.node)))
                        .collect(),
                })
                .collect(),
            selection_set: self.selection_set(&field.selection_set.node, spreads)?,
        })
    }

    /// Whether `@skip` / `@include` keep the selection
    fn included(&self, directives: &[Positioned<GqlDirective>]) -> Result<bool, DocumentError> {
        for directive in directives {
            let keep_if = match directive.node.name.node.as_str() {
                "skip" => false,
                "include" => true,
                _ => continue,
            };
            if self.condition(directive)? != keep_if {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn condition(&self, directive: &Positioned<GqlDirective>) -> Result<bool, DocumentError> {
        let invalid = |message: String| DocumentError::InvalidDirectiveArgument {
            directive: directive.node.name.node.to_string(),
            message,
            pos: directive.pos,
        };

        match directive.node.get_argument("if").map(|value| &value.node) {
            Some(GqlValue::Boolean(value)) => Ok(*value),
            Some(GqlValue::Variable(variable)) => match self.variables.get(variable.as_str()) {
                Some(serde_json::Value::Bool(value)) => Ok(*value),
                _ => Err(invalid(format!(
                    "variable '{variable}' must be supplied as a boolean"
                ))),
            },
            Some(_) => Err(invalid("`if` must be a boolean".to_string())),
            None => Err(invalid("missing `if` argument".to_string())),
        }
    }
}

fn is_conditional(directive: &GqlDirective) -> bool {
    matches!(directive.name.node.as_str(), "skip" | "include")
}

fn value_of(value: &GqlValue) -> Value {
    match value {
        GqlValue::Variable(name) => Value::Variable(name.to_string()),
        GqlValue::Null => Value::Null,
        GqlValue::Number(number) => match number.as_i64() {
            Some(value) => Value::Int(value),
            None => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
        },
        GqlValue::String(value) => Value::String(value.clone()),
        GqlValue::Boolean(value) => Value::Boolean(*value),
        GqlValue::Binary(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        GqlValue::Enum(name) => Value::Enum(name.to_string()),
        GqlValue::List(elems) => Value::List(elems.iter().map(value_of).collect()),
        GqlValue::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(name, value)| (name.to_string(), value_of(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn variables(value: serde_json::Value) -> Variables {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn fragments_and_directives() {
        let query = r#"
            query People($skipBorn: Boolean!, $limit: Int = 5) {
                people: Person(first: $limit, genre: DRAMA) {
                    name
                    born @skip(if: $skipBorn)
                    ...movieFields
                    ... on Entity @include(if: false) { name }
                }
            }

            fragment movieFields on Person {
                movies { title }
            }
        "#;

        let operation = parse_operation(query, None, variables(json!({"skipBorn": true}))).unwrap();

        assert_eq!(operation.name.as_deref(), Some("People"));
        assert_eq!(operation.kind, OperationKind::Query);
        assert_eq!(
            serde_json::Value::Object(operation.variables.clone()),
            json!({"skipBorn": true, "limit": 5})
        );
        insta::assert_json_snapshot!(operation.fields, @r#"
        [
          {
            "name": "Person",
            "alias": "people",
            "arguments": {
              "first": {
                "Variable": "limit"
              },
              "genre": {
                "Enum": "DRAMA"
              }
            },
            "directives": [],
            "selection_set": [
              {
                "Field": {
                  "name": "name",
                  "alias": null,
                  "arguments": {},
                  "directives": [],
                  "selection_set": []
                }
              },
              {
                "InlineFragment": {
                  "type_condition": "Person",
                  "selection_set": [
                    {
                      "Field": {
                        "name": "movies",
                        "alias": null,
                        "arguments": {},
                        "directives": [],
                        "selection_set": [
                          {
                            "Field": {
                              "name": "title",
                              "alias": null,
                              "arguments": {},
                              "directives": [],
                              "selection_set": []
                            }
                          }
                        ]
                      }
                    }
                  ]
                }
              }
            ]
          }
        ]
        "#);
    }

    #[test]
    fn argument_values() {
        let operation = parse_operation(
            r#"{ Person(a: 1, b: 1.5, c: "x", d: true, e: null, f: [1, $v], g: {h: RED}) @profile { name } }"#,
            None,
            Variables::new(),
        )
        .unwrap();
        let field = &operation.fields[0];

        assert_eq!(field.arguments["a"], Value::Int(1));
        assert_eq!(field.arguments["b"], Value::Float(1.5));
        assert_eq!(field.arguments["c"], Value::from("x"));
        assert_eq!(field.arguments["d"], Value::Boolean(true));
        assert_eq!(field.arguments["e"], Value::Null);
        assert_eq!(
            field.arguments["f"],
            Value::List(vec![Value::Int(1), Value::Variable("v".into())])
        );
        assert_eq!(
            field.arguments["g"],
            Value::Object([("h".to_string(), Value::Enum("RED".into()))].into_iter().collect())
        );
        assert!(field.has_directive("profile"));
    }

    #[test]
    fn operation_selection() {
        let query = "query A { Person { name } } mutation B { deletePerson(name: \"x\") }";

        let operation = parse_operation(query, Some("B"), Variables::new()).unwrap();
        assert_eq!(operation.kind, OperationKind::Mutation);
        assert_eq!(operation.fields[0].name, "deletePerson");

        assert_eq!(
            parse_operation(query, None, Variables::new()).unwrap_err(),
            DocumentError::MultipleOperationsNoOperationName
        );
        assert_eq!(
            parse_operation(query, Some("C"), Variables::new()).unwrap_err(),
            DocumentError::MultipleOperationsUnmatchedOperationName("C".into())
        );

        // A lone named operation needs no operation name
        let operation =
            parse_operation("query A { Person { name } }", None, Variables::new()).unwrap();
        assert_eq!(operation.name.as_deref(), Some("A"));

        // Supplied variables win over defaults
        let operation = parse_operation(
            "query($n: Int = 1) { Person(first: $n) { name } }",
            None,
            variables(json!({"n": 3})),
        )
        .unwrap();
        assert_eq!(operation.variables["n"], json!(3));
    }

    #[test]
    fn root_fragments() {
        let operation = parse_operation(
            "{ ...roots Movie { title } } fragment roots on Query { Person { name } }",
            None,
            Variables::new(),
        )
        .unwrap();

        assert_eq!(
            operation
                .fields
                .iter()
                .map(|field| field.name.as_str())
                .collect::<Vec<_>>(),
            vec!["Person", "Movie"]
        );
    }

    #[test]
    fn errors() {
        assert!(matches!(
            parse_operation("{ Person { name }", None, Variables::new()),
            Err(DocumentError::Syntax { .. })
        ));
        assert_eq!(
            parse_operation("subscription { Person { name } }", None, Variables::new())
                .unwrap_err(),
            DocumentError::Subscription
        );
        assert!(matches!(
            parse_operation("{ Person { ...missing } }", None, Variables::new()),
            Err(DocumentError::FragmentNotFound(name, _)) if name == "missing"
        ));
        assert!(matches!(
            parse_operation(
                "{ Person { ...a } } fragment a on Person { ...b } fragment b on Person { ...a }",
                None,
                Variables::new()
            ),
            Err(DocumentError::FragmentCycle(name, _)) if name == "a"
        ));

        let error = parse_operation(
            r#"{ Person { name @skip(if: "yes") } }"#,
            None,
            Variables::new(),
        )
        .unwrap_err();
        assert!(matches!(
            &error,
            DocumentError::InvalidDirectiveArgument { directive, .. } if directive == "skip"
        ));
        assert_eq!(error.pos(), Pos { line: 1, column: 17 });
    }
}
