// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::collections::HashSet;

use async_graphql_parser::{
    Pos, Positioned,
    types::{
        BaseType, ConstDirective, FieldDefinition, InputValueDefinition, ServiceDocument, Type,
        TypeDefinition, TypeKind, TypeSystemDefinition,
    },
};
use async_graphql_value::ConstValue;
use indexmap::IndexMap;
use tracing::debug;

use graph_model::{
    CustomQuery, MetadataRegistry, ModelError, OperationInfo, ParameterInfo, PropertyInfo,
    PropertyType, RelationshipDirection, RelationshipInfo, ScalarKind, TypeMetadata,
};

use crate::SchemaError;

const RELATION_DIRECTIVE: &str = "relation";
const OUT_DIRECTIVE: &str = "out";
const IN_DIRECTIVE: &str = "in";
const CYPHER_DIRECTIVE: &str = "cypher";
const DEFAULT_VALUE_DIRECTIVE: &str = "defaultValue";
const UNIQUE_DIRECTIVES: [&str; 2] = ["isUnique", "unique"];

/// Parse a schema document into a registry.
///
/// Object and interface types become [TypeMetadata]. A field whose (list-unwrapped) type is a
/// scalar or an enum becomes a property; any other field becomes a relationship, mapped by the
/// `@relation(name:, direction:)` directive (or the `@out(name:)`/`@in(name:)` shorthands) and
/// otherwise named after the field, pointing outward. Fields of the query and mutation root
/// types become [OperationInfo]s.
///
/// Either the whole document is accepted or an error is returned; a partially built registry
/// never escapes.
pub fn parse(document: &str) -> Result<MetadataRegistry, SchemaError> {
    let service = async_graphql_parser::parse_schema(document)?;
    let registry = SchemaBuilder::new(&service).build()?;

    debug!(
        types = registry.types.len(),
        queries = registry.queries.len(),
        mutations = registry.mutations.len(),
        "Parsed schema document"
    );

    Ok(registry)
}

struct SchemaBuilder<'a> {
    document: &'a ServiceDocument,
    enums: IndexMap<String, Vec<String>>,
    scalars: HashSet<String>,
    query_root: String,
    mutation_root: String,
}

impl<'a> SchemaBuilder<'a> {
    fn new(document: &'a ServiceDocument) -> Self {
        let mut query_root = "Query".to_string();
        let mut mutation_root = "Mutation".to_string();
        let mut enums = IndexMap::new();
        let mut scalars = HashSet::new();

        for definition in &document.definitions {
            match definition {
                TypeSystemDefinition::Schema(schema) => {
                    if let Some(query) = &schema.node.query {
                        query_root = query.node.to_string();
                    }
                    if let Some(mutation) = &schema.node.mutation {
                        mutation_root = mutation.node.to_string();
                    }
                }
                TypeSystemDefinition::Type(type_definition) => {
                    let type_definition = &type_definition.node;
                    let name = type_definition.name.node.to_string();
                    match &type_definition.kind {
                        TypeKind::Enum(enum_type) => {
                            let values: &mut Vec<String> = enums.entry(name).or_default();
                            values.extend(
                                enum_type
                                    .values
                                    .iter()
                                    .map(|value| value.node.value.node.to_string()),
                            );
                        }
                        TypeKind::Scalar => {
                            scalars.insert(name);
                        }
                        _ => {}
                    }
                }
                TypeSystemDefinition::Directive(_) => {}
            }
        }

        Self {
            document,
            enums,
            scalars,
            query_root,
            mutation_root,
        }
    }

    fn build(self) -> Result<MetadataRegistry, SchemaError> {
        let mut registry = MetadataRegistry {
            enums: self.enums.clone(),
            ..Default::default()
        };

        for definition in &self.document.definitions {
            let TypeSystemDefinition::Type(type_definition) = definition else {
                continue;
            };
            let name = type_definition.node.name.node.as_str();

            if name == self.query_root || name == self.mutation_root {
                let operations = self.operations(&type_definition.node)?;
                let target = if name == self.query_root {
                    &mut registry.queries
                } else {
                    &mut registry.mutations
                };
                target.extend(operations);
                continue;
            }

            let (implements, fields, is_interface) = match &type_definition.node.kind {
                TypeKind::Object(object) => (&object.implements, &object.fields, false),
                TypeKind::Interface(interface) => (&interface.implements, &interface.fields, true),
                _ => continue,
            };

            if !type_definition.node.extend && registry.types.contains_key(name) {
                return Err(SchemaError::Model {
                    error: ModelError::DuplicateType(name.to_string()),
                    pos: type_definition.pos,
                });
            }

            // `extend type` adds to an earlier definition
            let metadata = registry
                .types
                .entry(name.to_string())
                .or_insert_with(|| TypeMetadata {
                    is_interface,
                    description: type_definition
                        .node
                        .description
                        .as_ref()
                        .map(|description| description.node.clone()),
                    ..TypeMetadata::new(name)
                });

            for label in implements {
                metadata.add_label(label.node.as_str());
            }
            for field in fields {
                self.add_field(metadata, field)?;
            }
        }

        Ok(registry)
    }

    fn add_field(
        &self,
        metadata: &mut TypeMetadata,
        field: &Positioned<FieldDefinition>,
    ) -> Result<(), SchemaError> {
        let definition = &field.node;
        let field_name = definition.name.node.to_string();
        let field_type = self.property_type(&definition.ty.node);
        let directives = &definition.directives;

        let custom_query = custom_query(directives)?;
        let parameters = self.parameters(&definition.arguments)?;
        let description = definition
            .description
            .as_ref()
            .map(|description| description.node.clone());
        let model_error = |error: ModelError| SchemaError::Model {
            error,
            pos: field.pos,
        };

        if field_type.is_basic() {
            let is_id_candidate =
                field_type.required && !field_type.array && custom_query.is_none();

            let property = PropertyInfo {
                field_name: field_name.clone(),
                unique: UNIQUE_DIRECTIVES
                    .iter()
                    .any(|name| find_directive(directives, name).is_some()),
                default_value: default_value(directives)?,
                property_type: field_type,
                description,
                custom_query,
                parameters,
            };
            metadata.add_property(property).map_err(model_error)?;

            if is_id_candidate {
                metadata.register_id_property(&field_name);
            }
        } else {
            let (relationship_type, direction) = relationship_mapping(directives)?
                .unwrap_or((None, RelationshipDirection::Out));
            let relationship_type = relationship_type.unwrap_or_else(|| field_name.clone());

            let relationship = RelationshipInfo {
                non_null_depth: field_type.non_null_depth,
                description,
                custom_query,
                parameters,
                ..RelationshipInfo::new(
                    field_name,
                    relationship_type,
                    field_type.name,
                    direction,
                    field_type.array,
                )
            };
            metadata.merge_relationship(relationship).map_err(model_error)?;
        }

        Ok(())
    }

    fn operations(
        &self,
        definition: &TypeDefinition,
    ) -> Result<Vec<(String, OperationInfo)>, SchemaError> {
        let TypeKind::Object(object) = &definition.kind else {
            return Ok(vec![]);
        };

        object
            .fields
            .iter()
            .map(|field| {
                let field = &field.node;
                let name = field.name.node.to_string();
                let operation = OperationInfo {
                    name: name.clone(),
                    return_type: self.property_type(&field.ty.node),
                    custom_query: custom_query(&field.directives)?,
                    parameters: self.parameters(&field.arguments)?,
                    description: field
                        .description
                        .as_ref()
                        .map(|description| description.node.clone()),
                };
                Ok((name, operation))
            })
            .collect()
    }

    fn parameters(
        &self,
        arguments: &[Positioned<InputValueDefinition>],
    ) -> Result<IndexMap<String, ParameterInfo>, SchemaError> {
        arguments
            .iter()
            .map(|argument| {
                let name = argument.node.name.node.to_string();
                let default_value = argument
                    .node
                    .default_value
                    .as_ref()
                    .map(|value| to_json(&value.node, "argument default", value.pos))
                    .transpose()?;

                let parameter = ParameterInfo {
                    default_value,
                    description: argument
                        .node
                        .description
                        .as_ref()
                        .map(|description| description.node.clone()),
                    ..ParameterInfo::new(name.clone(), self.property_type(&argument.node.ty.node))
                };
                Ok((name, parameter))
            })
            .collect()
    }

    fn property_type(&self, ty: &Type) -> PropertyType {
        let mut property_type = match &ty.base {
            BaseType::Named(name) => {
                let name = name.as_str();
                let kind = ScalarKind::builtin(name).unwrap_or_else(|| {
                    if self.enums.contains_key(name) {
                        ScalarKind::Enum
                    } else if self.scalars.contains(name) {
                        ScalarKind::Custom
                    } else {
                        ScalarKind::Object
                    }
                });
                PropertyType::new(name, kind)
            }
            BaseType::List(inner) => self.property_type(inner).list(),
        };

        if !ty.nullable {
            property_type = property_type.non_null();
        } else {
            property_type.required = false;
        }
        property_type
    }
}

fn find_directive<'d>(
    directives: &'d [Positioned<ConstDirective>],
    name: &str,
) -> Option<&'d Positioned<ConstDirective>> {
    directives
        .iter()
        .find(|directive| directive.node.name.node.as_str() == name)
}

fn string_argument(
    directive: &Positioned<ConstDirective>,
    argument: &str,
) -> Result<Option<String>, SchemaError> {
    match directive.node.get_argument(argument) {
        None => Ok(None),
        Some(value) => match &value.node {
            ConstValue::String(value) => Ok(Some(value.clone())),
            ConstValue::Enum(value) => Ok(Some(value.to_string())),
            _ => Err(SchemaError::InvalidDirective {
                directive: directive.node.name.node.to_string(),
                message: format!("`{argument}` must be a string"),
                pos: value.pos,
            }),
        },
    }
}

/// The relationship type (if named) and direction declared by `@relation`, `@out` or `@in`
fn relationship_mapping(
    directives: &[Positioned<ConstDirective>],
) -> Result<Option<(Option<String>, RelationshipDirection)>, SchemaError> {
    if let Some(relation) = find_directive(directives, RELATION_DIRECTIVE) {
        let name = string_argument(relation, "name")?;
        let direction = string_argument(relation, "direction")?
            .map(|direction| RelationshipDirection::parse(&direction))
            .unwrap_or(RelationshipDirection::Out);
        return Ok(Some((name, direction)));
    }

    for (directive_name, direction) in [
        (OUT_DIRECTIVE, RelationshipDirection::Out),
        (IN_DIRECTIVE, RelationshipDirection::In),
    ] {
        if let Some(directive) = find_directive(directives, directive_name) {
            return Ok(Some((string_argument(directive, "name")?, direction)));
        }
    }

    Ok(None)
}

fn custom_query(
    directives: &[Positioned<ConstDirective>],
) -> Result<Option<CustomQuery>, SchemaError> {
    let Some(directive) = find_directive(directives, CYPHER_DIRECTIVE) else {
        return Ok(None);
    };

    let statement = string_argument(directive, "statement")?.ok_or_else(|| {
        SchemaError::InvalidDirective {
            directive: CYPHER_DIRECTIVE.to_string(),
            message: "missing `statement` argument".to_string(),
            pos: directive.pos,
        }
    })?;

    let static_params = match directive.node.get_argument("params") {
        None => IndexMap::new(),
        Some(value) => match &value.node {
            ConstValue::Object(entries) => entries
                .iter()
                .map(|(key, entry)| Ok((key.to_string(), to_json(entry, "params", value.pos)?)))
                .collect::<Result<_, SchemaError>>()?,
            _ => {
                return Err(SchemaError::InvalidDirective {
                    directive: CYPHER_DIRECTIVE.to_string(),
                    message: "`params` must be an object".to_string(),
                    pos: value.pos,
                });
            }
        },
    };

    let pass_through = match directive.node.get_argument("passThrough") {
        None => false,
        Some(value) => match &value.node {
            ConstValue::Boolean(pass_through) => *pass_through,
            _ => {
                return Err(SchemaError::InvalidDirective {
                    directive: CYPHER_DIRECTIVE.to_string(),
                    message: "`passThrough` must be a boolean".to_string(),
                    pos: value.pos,
                });
            }
        },
    };

    Ok(Some(CustomQuery {
        statement,
        static_params,
        pass_through,
    }))
}

fn default_value(
    directives: &[Positioned<ConstDirective>],
) -> Result<Option<serde_json::Value>, SchemaError> {
    let Some(directive) = find_directive(directives, DEFAULT_VALUE_DIRECTIVE) else {
        return Ok(None);
    };

    match directive.node.get_argument("value") {
        Some(value) => to_json(&value.node, DEFAULT_VALUE_DIRECTIVE, value.pos).map(Some),
        None => Err(SchemaError::InvalidDirective {
            directive: DEFAULT_VALUE_DIRECTIVE.to_string(),
            message: "missing `value` argument".to_string(),
            pos: directive.pos,
        }),
    }
}

fn to_json(value: &ConstValue, context: &str, pos: Pos) -> Result<serde_json::Value, SchemaError> {
    value
        .clone()
        .into_json()
        .map_err(|error| SchemaError::InvalidDirective {
            directive: context.to_string(),
            message: error.to_string(),
            pos,
        })
}
