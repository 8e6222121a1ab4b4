// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Lowering of a GraphQL selection into a single Cypher statement.
//!
//! The walk over the selection is shared between the dialects: [project_scope] resolves the
//! fields of one scope (a type and the variable bound to its entities) and hands every
//! relationship traversal to a [Backend], which decides how the related entities are matched
//! and folded back into the parent's projection.

mod comprehension;
mod staged;

use std::borrow::Cow;
use std::sync::Arc;

use indexmap::{IndexMap, map::Entry};
use serde::Serialize;
use tracing::{debug, instrument};

use cypher::{
    Clause, Direction, Expression, ExpressionBuilder, Limit, Literal, NodePattern, Pattern,
    RelationshipPattern, ReturnItem, Skip, Statement, StatementPrefix,
};
use graph_model::{
    CustomQuery, MetadataRegistry, OperationInfo, ParameterInfo, RelationshipDirection,
    RelationshipInfo, TypeMetadata,
};

use crate::argument_mapper::{ScopeArguments, scope_arguments};
use crate::value_mapper::{Parameters, json_literal};
use crate::{Dialect, Field, Selection, TranslationError, TranslatorConfig, Variables, mutation};

use comprehension::Comprehension;
use staged::Staged;

/// A statement ready for execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedQuery {
    pub statement: String,
    /// Values for the parameters (`$name`) referenced by the statement
    pub parameters: IndexMap<String, serde_json::Value>,
    /// Whether the field resolves to a list (as opposed to a single value or null)
    pub result_is_list: bool,
}

/// Translates top-level fields against one registry snapshot.
#[derive(Debug, Clone)]
pub struct QueryTranslator {
    registry: Arc<MetadataRegistry>,
    config: TranslatorConfig,
}

impl QueryTranslator {
    pub fn new(registry: Arc<MetadataRegistry>, config: TranslatorConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translate a top-level query field. Fields declared in the schema's query type take
    /// precedence; any other field must be named after a type and selects its entities.
    #[instrument(name = "QueryTranslator::translate_field", skip_all, fields(field = %field.name))]
    pub fn translate_field(
        &self,
        field: &Field,
        variables: &Variables,
    ) -> Result<GeneratedQuery, TranslationError> {
        if let Some(operation) = self.registry.queries.get(&field.name) {
            return match &operation.custom_query {
                Some(custom) => self.declared_operation(field, operation, custom, variables),
                None => {
                    let metadata = self.metadata(&operation.return_type.name)?;
                    self.translate_scope(field, metadata, variables, operation.return_type.array)
                }
            };
        }

        match self.registry.get(&field.name) {
            Some(metadata) => self.translate_query_field(field, metadata, variables),
            None => Err(TranslationError::UnknownField {
                type_name: "Query".to_string(),
                field: field.name.clone(),
            }),
        }
    }

    /// Translate a field selecting the entities of `root_metadata`
    pub fn translate_query_field(
        &self,
        field: &Field,
        root_metadata: &TypeMetadata,
        variables: &Variables,
    ) -> Result<GeneratedQuery, TranslationError> {
        self.translate_scope(field, root_metadata, variables, true)
    }

    #[instrument(name = "QueryTranslator::translate_mutation", skip_all, fields(field = %field.name))]
    pub fn translate_mutation(
        &self,
        field: &Field,
        variables: &Variables,
    ) -> Result<GeneratedQuery, TranslationError> {
        mutation::translate_mutation(self, field, variables)
    }

    pub(crate) fn metadata(&self, type_name: &str) -> Result<&TypeMetadata, TranslationError> {
        self.registry
            .get(type_name)
            .ok_or_else(|| TranslationError::UnknownType(type_name.to_string()))
    }

    /// Run the statement of a query or mutation declared with `@cypher`. Its rows are returned
    /// as they are, without any projection.
    pub(crate) fn declared_operation(
        &self,
        field: &Field,
        operation: &OperationInfo,
        custom: &CustomQuery,
        variables: &Variables,
    ) -> Result<GeneratedQuery, TranslationError> {
        let mut translation = Translation::new(self, variables);

        for (name, value) in &custom.static_params {
            translation.parameters.bind_exact(name, value.clone());
        }
        for name in field.arguments.keys() {
            if !operation.parameters.contains_key(name) {
                return Err(TranslationError::UnknownArgument {
                    type_name: operation.name.clone(),
                    argument: name.clone(),
                });
            }
        }
        for (name, parameter) in &operation.parameters {
            let value = match field.arguments.get(name) {
                Some(value) => translation.parameters.resolve(value)?,
                None => parameter
                    .default_value
                    .clone()
                    .unwrap_or(serde_json::Value::Null),
            };
            translation.parameters.bind_exact(name, value);
        }

        Ok(translation.finish_raw(
            field,
            custom.statement.clone(),
            operation.return_type.array,
        ))
    }

    fn translate_scope(
        &self,
        field: &Field,
        metadata: &TypeMetadata,
        variables: &Variables,
        result_is_list: bool,
    ) -> Result<GeneratedQuery, TranslationError> {
        let mut translation = Translation::new(self, variables);
        let variable = root_variable(&metadata.type_name, field.output_name());

        let arguments = scope_arguments(
            field,
            metadata,
            &variable,
            &IndexMap::new(),
            self.registry(),
            &mut translation.parameters,
        )?;

        let mut clauses = vec![Clause::matching(
            Pattern::node(NodePattern::variable(&variable).with_label(&metadata.type_name)),
            arguments.predicate.clone(),
        )];
        let (projection, nested) =
            translation.project(metadata, &variable, &field.selection_set)?;
        clauses.extend(nested);
        clauses.push(Clause::Return {
            items: vec![ReturnItem::new(projection, field.output_name())],
            order_by: arguments.order_by_clause(&variable),
            skip: arguments.skip.map(Skip),
            limit: arguments.limit.map(Limit),
        });

        Ok(translation.finish(field, clauses, result_is_list))
    }
}

/// The variable bound to the entities selected by a top-level field: the type name with a
/// lower-cased first character, made distinct from the output name.
pub(crate) fn root_variable(type_name: &str, output_name: &str) -> String {
    let mut chars = type_name.chars();
    let mut variable: String = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    };
    if variable == output_name {
        variable.push('_');
    }
    variable
}

/// `(from)-[:TYPE]->(to:Target)`, or `(from)<-[:TYPE]-(to:Target)` for incoming relationships
pub(crate) fn traversal_pattern(
    from: &str,
    relationship: &RelationshipInfo,
    to: &str,
    target: &TypeMetadata,
) -> Pattern {
    Pattern::node(NodePattern::variable(from)).related(
        RelationshipPattern::new(&relationship.relationship_type, direction(relationship)),
        NodePattern::variable(to).with_label(&target.type_name),
    )
}

pub(crate) fn direction(relationship: &RelationshipInfo) -> Direction {
    match relationship.direction {
        RelationshipDirection::Out => Direction::Outgoing,
        RelationshipDirection::In => Direction::Incoming,
    }
}

/// State of translating one top-level field
pub(crate) struct Translation<'a> {
    pub translator: &'a QueryTranslator,
    pub parameters: Parameters<'a>,
}

/// A relationship field to be matched by a [Backend]
pub(crate) struct Traversal<'q> {
    pub field: &'q Field,
    pub relationship: &'q RelationshipInfo,
    pub target: &'q TypeMetadata,
    /// The variable bound to the entity the relationship starts from
    pub parent: String,
    /// The variable to bind the related entities to
    pub variable: String,
    pub arguments: ScopeArguments,
    /// The list produced by the field's custom statement (if it has one)
    pub source: Option<Expression>,
}

enum Projection<'q> {
    Value(Expression),
    Traversal(Traversal<'q>),
}

/// How a dialect matches related entities
pub(crate) trait Backend {
    /// Match the related entities of `traversal`, returning the expression for the field's value
    /// in the parent's projection. `keys` lists the variables in scope (the staged dialect must
    /// carry them over explicitly).
    fn traverse(
        &mut self,
        translation: &mut Translation<'_>,
        traversal: Traversal<'_>,
        keys: &mut Vec<String>,
    ) -> Result<Expression, TranslationError>;

    /// The projection of an entity bound to `variable`
    fn projection(&self, variable: &str, entries: Vec<(String, Expression)>) -> Expression;
}

/// Project the selected fields of the entity bound to `variable`
pub(crate) fn project_scope<B: Backend>(
    backend: &mut B,
    translation: &mut Translation<'_>,
    metadata: &TypeMetadata,
    variable: &str,
    selection_set: &[Selection],
    keys: &mut Vec<String>,
) -> Result<Expression, TranslationError> {
    let mut fields = IndexMap::new();
    collect_fields(translation.registry(), metadata, selection_set, &mut fields);

    let mut entries = Vec::with_capacity(fields.len());
    for (output_name, (field, scope)) in &fields {
        let value = match translation.field_projection(field, scope, variable)? {
            Projection::Value(value) => value,
            Projection::Traversal(traversal) => backend.traverse(translation, traversal, keys)?,
        };
        entries.push((output_name.to_string(), value));
    }

    Ok(backend.projection(variable, entries))
}

/// Flatten the selection set into the fields to project, each with the type it resolves
/// against. Inline fragments contribute only if their type may describe entities of `metadata`.
/// A field selected more than once is projected once, with the sub-selections of every
/// occurrence merged.
fn collect_fields<'s, 'r>(
    registry: &'r MetadataRegistry,
    metadata: &'r TypeMetadata,
    selection_set: &'s [Selection],
    fields: &mut IndexMap<&'s str, (Cow<'s, Field>, &'r TypeMetadata)>,
) {
    for selection in selection_set {
        match selection {
            Selection::Field(field) => match fields.entry(field.output_name()) {
                Entry::Occupied(mut entry) => {
                    if !field.selection_set.is_empty() {
                        let (merged, _) = entry.get_mut();
                        merged
                            .to_mut()
                            .selection_set
                            .extend(field.selection_set.iter().cloned());
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert((Cow::Borrowed(field), metadata));
                }
            },
            Selection::InlineFragment(fragment) => {
                let scope = match fragment.type_condition.as_deref() {
                    None => Some(metadata),
                    Some(type_condition) => match registry.get(type_condition) {
                        Some(fragment_metadata) => fragment_metadata
                            .is_compatible_with(metadata)
                            .then_some(fragment_metadata),
                        // A label without a type of its own
                        None => metadata
                            .all_labels()
                            .contains(type_condition)
                            .then_some(metadata),
                    },
                };

                if let Some(scope) = scope {
                    collect_fields(registry, scope, &fragment.selection_set, fields);
                }
            }
        }
    }
}

impl<'a> Translation<'a> {
    pub fn new(translator: &'a QueryTranslator, variables: &'a Variables) -> Self {
        Self {
            translator,
            parameters: Parameters::new(variables),
        }
    }

    pub fn registry(&self) -> &'a MetadataRegistry {
        &self.translator.registry
    }

    /// The projection of the entity bound to `variable` along with the clauses needed to match
    /// its related entities (always empty for the comprehension dialect)
    pub fn project(
        &mut self,
        metadata: &TypeMetadata,
        variable: &str,
        selection_set: &[Selection],
    ) -> Result<(Expression, Vec<Clause>), TranslationError> {
        let mut keys = vec![variable.to_string()];

        match self.translator.config.dialect {
            Dialect::Comprehension => {
                let projection = project_scope(
                    &mut Comprehension,
                    self,
                    metadata,
                    variable,
                    selection_set,
                    &mut keys,
                )?;
                Ok((projection, vec![]))
            }
            Dialect::Staged => {
                let mut staged = Staged::default();
                let projection =
                    project_scope(&mut staged, self, metadata, variable, selection_set, &mut keys)?;
                Ok((projection, staged.clauses))
            }
        }
    }

    fn field_projection<'q>(
        &mut self,
        field: &'q Field,
        metadata: &'q TypeMetadata,
        variable: &str,
    ) -> Result<Projection<'q>, TranslationError>
    where
        'a: 'q,
    {
        let this = Expression::variable(variable);

        let value = match field.name.as_str() {
            "_id" => Expression::function("id", vec![this]),
            "_labels" => Expression::function("labels", vec![this]),
            "__typename" => Expression::Literal(Literal::String(metadata.type_name.clone())),
            name => {
                if let Some(property) = metadata.property(name) {
                    match &property.custom_query {
                        None => Expression::property(variable, name),
                        Some(custom) => {
                            reject_undeclared(field, metadata, &property.parameters)?;
                            let call =
                                self.custom_call(custom, &property.parameters, field, variable, true)?;
                            if property.property_type.array {
                                call
                            } else {
                                call.head()
                            }
                        }
                    }
                } else if let Some(relationship) = metadata.relationship(name) {
                    return self.relationship_projection(field, relationship, variable);
                } else {
                    return Err(TranslationError::UnknownField {
                        type_name: metadata.type_name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        };

        Ok(Projection::Value(value))
    }

    fn relationship_projection<'q>(
        &mut self,
        field: &'q Field,
        relationship: &'q RelationshipInfo,
        parent: &str,
    ) -> Result<Projection<'q>, TranslationError>
    where
        'a: 'q,
    {
        let target = self.translator.metadata(&relationship.target_type)?;

        if let Some(custom) = &relationship.custom_query {
            if custom.pass_through {
                reject_undeclared(field, target, &relationship.parameters)?;
                return Ok(Projection::Value(self.custom_call(
                    custom,
                    &relationship.parameters,
                    field,
                    parent,
                    relationship.multi,
                )?));
            }
        }

        let variable = format!("{parent}_{}", field.output_name());
        let (source, declared) = match &relationship.custom_query {
            Some(custom) => (
                Some(self.custom_call(custom, &relationship.parameters, field, parent, true)?),
                relationship.parameters.clone(),
            ),
            None => (None, IndexMap::new()),
        };
        let arguments = scope_arguments(
            field,
            target,
            &variable,
            &declared,
            self.registry(),
            &mut self.parameters,
        )?;

        Ok(Projection::Traversal(Traversal {
            field,
            relationship,
            target,
            parent: parent.to_string(),
            variable,
            arguments,
            source,
        }))
    }

    /// `run_fn("statement", {this: this, <static params>, <declared arguments>}, list)`
    fn custom_call(
        &mut self,
        custom: &CustomQuery,
        declared: &IndexMap<String, ParameterInfo>,
        field: &Field,
        this: &str,
        list: bool,
    ) -> Result<Expression, TranslationError> {
        let mut params = vec![("this".to_string(), Expression::variable(this))];

        for (name, value) in &custom.static_params {
            params.push((name.clone(), Expression::Literal(json_literal(value))));
        }
        for (name, parameter) in declared {
            let value = match (field.arguments.get(name), &parameter.default_value) {
                (Some(value), _) => self.parameters.expression(value)?,
                (None, Some(default_value)) => Expression::Literal(json_literal(default_value)),
                (None, None) => Expression::Literal(Literal::Null),
            };
            params.push((name.clone(), value));
        }

        Ok(Expression::function(
            &self.translator.config.run_function,
            vec![
                Expression::Literal(Literal::String(custom.statement.clone())),
                Expression::Map(params),
                Expression::Literal(Literal::Boolean(list)),
            ],
        ))
    }

    /// Render the statement, applying the `@profile` / `@explain` directives of the field
    pub fn finish(self, field: &Field, clauses: Vec<Clause>, result_is_list: bool) -> GeneratedQuery {
        let (statement, _) = Statement::new(clauses)
            .with_prefix(statement_prefix(field))
            .to_cypher();
        self.into_query(field, statement, result_is_list)
    }

    /// Like [Translation::finish], for a statement written by hand
    fn finish_raw(self, field: &Field, statement: String, result_is_list: bool) -> GeneratedQuery {
        let statement = match statement_prefix(field) {
            Some(StatementPrefix::Profile) => format!("PROFILE\n{statement}"),
            Some(StatementPrefix::Explain) => format!("EXPLAIN\n{statement}"),
            None => statement,
        };
        self.into_query(field, statement, result_is_list)
    }

    fn into_query(self, field: &Field, statement: String, result_is_list: bool) -> GeneratedQuery {
        debug!(field = field.output_name(), %statement, "Generated statement");

        GeneratedQuery {
            statement,
            parameters: self.parameters.into_bound(),
            result_is_list,
        }
    }
}

fn statement_prefix(field: &Field) -> Option<StatementPrefix> {
    if field.has_directive("profile") {
        Some(StatementPrefix::Profile)
    } else if field.has_directive("explain") {
        Some(StatementPrefix::Explain)
    } else {
        None
    }
}

/// Fields whose value comes from a custom statement take its declared arguments only
fn reject_undeclared(
    field: &Field,
    metadata: &TypeMetadata,
    declared: &IndexMap<String, ParameterInfo>,
) -> Result<(), TranslationError> {
    match field.arguments.keys().find(|name| !declared.contains_key(*name)) {
        Some(name) => Err(TranslationError::UnknownArgument {
            type_name: metadata.type_name.clone(),
            argument: name.clone(),
        }),
        None => Ok(()),
    }
}
