// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Mutations. Fields of the schema's mutation type run their `@cypher` statement; any other
//! mutation is generated from its name:
//!
//! | name                       | effect                                                    |
//! |----------------------------|-----------------------------------------------------------|
//! | `create<Type>`             | create a node from the property arguments                 |
//! | `update<Type>`             | update the node identified by its id property             |
//! | `delete<Type>`             | delete the node identified by its id property             |
//! | `add<Type><Field>`         | connect the node to the targets identified by their ids   |
//! | `delete<Type><Field>`      | disconnect the node from the targets                      |

use indexmap::IndexMap;

use cypher::{
    Clause, Expression, NodePattern, Pattern, Predicate, RelationshipPattern, ReturnItem,
    SetItem,
};
use graph_model::{MetadataRegistry, PropertyInfo, RelationshipInfo, TypeMetadata};

use crate::translator::{QueryTranslator, Translation, direction, root_variable};
use crate::{Field, GeneratedQuery, TranslationError, Variables};

enum GeneratedMutation<'r> {
    Create(&'r TypeMetadata),
    Update(&'r TypeMetadata),
    Delete(&'r TypeMetadata),
    AddRelationship(&'r TypeMetadata, &'r RelationshipInfo),
    DeleteRelationship(&'r TypeMetadata, &'r RelationshipInfo),
}

pub(crate) fn translate_mutation(
    translator: &QueryTranslator,
    field: &Field,
    variables: &Variables,
) -> Result<GeneratedQuery, TranslationError> {
    let registry = translator.registry();

    if let Some(operation) = registry.mutations.get(&field.name) {
        let custom = operation
            .custom_query
            .as_ref()
            .ok_or_else(|| TranslationError::MissingCustomQuery(field.name.clone()))?;
        return translator.declared_operation(field, operation, custom, variables);
    }

    let mut translation = Translation::new(translator, variables);
    let clauses = match resolve(registry, &field.name)? {
        GeneratedMutation::Create(metadata) => create(&mut translation, field, metadata)?,
        GeneratedMutation::Update(metadata) => update(&mut translation, field, metadata)?,
        GeneratedMutation::Delete(metadata) => delete(&mut translation, field, metadata)?,
        GeneratedMutation::AddRelationship(metadata, relationship) => {
            relate(&mut translation, field, metadata, relationship, true)?
        }
        GeneratedMutation::DeleteRelationship(metadata, relationship) => {
            relate(&mut translation, field, metadata, relationship, false)?
        }
    };

    Ok(translation.finish(field, clauses, false))
}

fn resolve<'r>(
    registry: &'r MetadataRegistry,
    name: &str,
) -> Result<GeneratedMutation<'r>, TranslationError> {
    let mutation = if let Some(type_name) = name.strip_prefix("create") {
        registry.get(type_name).map(GeneratedMutation::Create)
    } else if let Some(type_name) = name.strip_prefix("update") {
        registry.get(type_name).map(GeneratedMutation::Update)
    } else if let Some(rest) = name.strip_prefix("delete") {
        match registry.get(rest) {
            Some(metadata) => Some(GeneratedMutation::Delete(metadata)),
            None => relationship_field(registry, rest).map(|(metadata, relationship)| {
                GeneratedMutation::DeleteRelationship(metadata, relationship)
            }),
        }
    } else if let Some(rest) = name.strip_prefix("add") {
        relationship_field(registry, rest)
            .map(|(metadata, relationship)| GeneratedMutation::AddRelationship(metadata, relationship))
    } else {
        None
    };

    mutation.ok_or_else(|| TranslationError::UnknownField {
        type_name: "Mutation".to_string(),
        field: name.to_string(),
    })
}

/// Find the relationship named by `<Type><Field>` (the field name capitalized)
fn relationship_field<'r>(
    registry: &'r MetadataRegistry,
    name: &str,
) -> Option<(&'r TypeMetadata, &'r RelationshipInfo)> {
    registry.types.values().find_map(|metadata| {
        let field_name = name.strip_prefix(metadata.type_name.as_str())?;
        metadata
            .relationships
            .values()
            .find(|relationship| capitalize(&relationship.field_name) == field_name)
            .map(|relationship| (metadata, relationship))
    })
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn create(
    translation: &mut Translation<'_>,
    field: &Field,
    metadata: &TypeMetadata,
) -> Result<Vec<Clause>, TranslationError> {
    let variable = root_variable(&metadata.type_name, field.output_name());

    let mut properties = stored_properties(translation, field, metadata, None)?;
    for (name, property) in &metadata.properties {
        if let (false, Some(default_value)) =
            (properties.contains_key(name), &property.default_value)
        {
            properties.insert(name.clone(), default_value.clone());
        }
    }

    let node = metadata
        .all_labels()
        .into_iter()
        .fold(NodePattern::variable(&variable), |node, label| {
            node.with_label(label)
        });
    let properties = translation
        .parameters
        .bind("properties", serde_json::Value::Object(properties.into_iter().collect()));

    let mut clauses = vec![
        Clause::Create(Pattern::node(node)),
        Clause::Set(vec![SetItem::Replace(variable.clone(), properties)]),
    ];
    returning(translation, field, metadata, &variable, &mut clauses)?;
    Ok(clauses)
}

fn update(
    translation: &mut Translation<'_>,
    field: &Field,
    metadata: &TypeMetadata,
) -> Result<Vec<Clause>, TranslationError> {
    let variable = root_variable(&metadata.type_name, field.output_name());
    let id = id_property(field, metadata)?;
    let node = identified_node(translation, field, metadata, id, &variable)?;

    let properties = stored_properties(translation, field, metadata, Some(id))?;
    let properties = translation
        .parameters
        .bind("properties", serde_json::Value::Object(properties.into_iter().collect()));

    let mut clauses = vec![
        Clause::matching(Pattern::node(node), Predicate::True),
        Clause::Set(vec![SetItem::Merge(variable.clone(), properties)]),
    ];
    returning(translation, field, metadata, &variable, &mut clauses)?;
    Ok(clauses)
}

fn delete(
    translation: &mut Translation<'_>,
    field: &Field,
    metadata: &TypeMetadata,
) -> Result<Vec<Clause>, TranslationError> {
    let variable = root_variable(&metadata.type_name, field.output_name());
    let id = id_property(field, metadata)?;
    reject_arguments(field, metadata, &[&id.field_name])?;
    let node = identified_node(translation, field, metadata, id, &variable)?;

    Ok(vec![
        Clause::matching(Pattern::node(node), Predicate::True),
        Clause::Delete {
            variables: vec![variable],
            detach: true,
        },
        count(field),
    ])
}

/// Connect (`add`) or disconnect the node to the targets whose ids are listed in the argument
/// named after the relationship
fn relate(
    translation: &mut Translation<'_>,
    field: &Field,
    metadata: &TypeMetadata,
    relationship: &RelationshipInfo,
    add: bool,
) -> Result<Vec<Clause>, TranslationError> {
    let id = id_property(field, metadata)?;
    let target = translation.translator.metadata(&relationship.target_type)?;
    let target_id = target.id_property_info().ok_or_else(|| {
        TranslationError::unsupported_mutation(
            &field.name,
            format!("type '{}' has no id property", target.type_name),
        )
    })?;
    reject_arguments(
        field,
        metadata,
        &[&id.field_name, &relationship.field_name],
    )?;

    let from = identified_node(translation, field, metadata, id, "from")?;
    let target_ids = match field.arguments.get(&relationship.field_name) {
        Some(value) => match translation.parameters.resolve(value)? {
            serde_json::Value::Array(ids) => serde_json::Value::Array(ids),
            id => serde_json::Value::Array(vec![id]),
        },
        None => {
            return Err(TranslationError::invalid_argument(
                &relationship.field_name,
                "required to identify the related entities",
            ));
        }
    };
    let target_ids = translation
        .parameters
        .bind(&relationship.field_name, target_ids);
    let in_targets = Predicate::In(Expression::property("to", &target_id.field_name), target_ids);

    let direction = direction(relationship);
    let to = NodePattern::variable("to").with_label(&target.type_name);

    let mut clauses = vec![Clause::matching(Pattern::node(from), Predicate::True)];
    if add {
        clauses.push(Clause::matching(Pattern::node(to), in_targets));
        clauses.push(Clause::Merge(Pattern::node(NodePattern::variable("from")).related(
            RelationshipPattern::new(&relationship.relationship_type, direction),
            NodePattern::variable("to"),
        )));
    } else {
        clauses.push(Clause::matching(
            Pattern::node(NodePattern::variable("from")).related(
                RelationshipPattern::new(&relationship.relationship_type, direction)
                    .with_variable("r"),
                to,
            ),
            in_targets,
        ));
        clauses.push(Clause::Delete {
            variables: vec!["r".to_string()],
            detach: false,
        });
    }
    clauses.push(count(field));

    Ok(clauses)
}

fn id_property<'m>(
    field: &Field,
    metadata: &'m TypeMetadata,
) -> Result<&'m PropertyInfo, TranslationError> {
    metadata.id_property_info().ok_or_else(|| {
        TranslationError::unsupported_mutation(
            &field.name,
            format!("type '{}' has no id property", metadata.type_name),
        )
    })
}

/// `(variable:Type {id: $id})`, with the id taken from the argument named after the id property
fn identified_node(
    translation: &mut Translation<'_>,
    field: &Field,
    metadata: &TypeMetadata,
    id: &PropertyInfo,
    variable: &str,
) -> Result<NodePattern, TranslationError> {
    let value = field.arguments.get(&id.field_name).ok_or_else(|| {
        TranslationError::invalid_argument(&id.field_name, "required to identify the entity")
    })?;
    let value = translation.parameters.resolve(value)?;
    let id_value = translation.parameters.bind(&id.field_name, value);

    Ok(NodePattern::variable(variable)
        .with_label(&metadata.type_name)
        .with_property(&id.field_name, id_value))
}

/// The arguments naming stored properties (except `skip`), resolved to plain values
fn stored_properties(
    translation: &Translation<'_>,
    field: &Field,
    metadata: &TypeMetadata,
    skip: Option<&PropertyInfo>,
) -> Result<IndexMap<String, serde_json::Value>, TranslationError> {
    field
        .arguments
        .iter()
        .filter(|(name, _)| skip.is_none_or(|skip| &skip.field_name != *name))
        .map(|(name, value)| match metadata.property(name) {
            Some(property) if property.is_stored() => {
                Ok((name.clone(), translation.parameters.resolve(value)?))
            }
            _ => Err(TranslationError::UnknownArgument {
                type_name: metadata.type_name.clone(),
                argument: name.clone(),
            }),
        })
        .collect()
}

fn reject_arguments(
    field: &Field,
    metadata: &TypeMetadata,
    allowed: &[&String],
) -> Result<(), TranslationError> {
    match field
        .arguments
        .keys()
        .find(|name| !allowed.contains(name))
    {
        Some(name) => Err(TranslationError::UnknownArgument {
            type_name: metadata.type_name.clone(),
            argument: name.clone(),
        }),
        None => Ok(()),
    }
}

/// Project the created or updated node, or count it if nothing is selected
fn returning(
    translation: &mut Translation<'_>,
    field: &Field,
    metadata: &TypeMetadata,
    variable: &str,
    clauses: &mut Vec<Clause>,
) -> Result<(), TranslationError> {
    if field.selection_set.is_empty() {
        clauses.push(count(field));
        return Ok(());
    }

    let (projection, nested) = translation.project(metadata, variable, &field.selection_set)?;
    if !nested.is_empty() {
        clauses.push(Clause::With {
            items: vec![ReturnItem::variable(variable)],
            order_by: None,
        });
        clauses.extend(nested);
    }
    clauses.push(Clause::Return {
        items: vec![ReturnItem::new(projection, field.output_name())],
        order_by: None,
        skip: None,
        limit: None,
    });
    Ok(())
}

fn count(field: &Field) -> Clause {
    Clause::Return {
        items: vec![ReturnItem::new(Expression::CountAll, field.output_name())],
        order_by: None,
        skip: None,
        limit: None,
    }
}
