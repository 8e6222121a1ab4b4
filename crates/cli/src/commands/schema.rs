// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::Colorize;

use graph_model::{MetadataRegistry, RelationshipDirection, RelationshipInfo};

use super::command::{CommandDefinition, get_required, schema_file_arg};
use super::util::load_schema;

pub(crate) struct SchemaCommandDefinition {}

impl CommandDefinition for SchemaCommandDefinition {
    fn command(&self) -> Command {
        Command::new("schema")
            .about("Check a GraphQL schema and show how it maps onto the graph")
            .arg(schema_file_arg())
            .arg(
                Arg::new("json")
                    .help("Print the type metadata as JSON")
                    .long("json")
                    .action(ArgAction::SetTrue),
            )
    }

    fn execute(&self, matches: &ArgMatches) -> Result<()> {
        let schema: PathBuf = get_required(matches, "schema")?;
        let registry = load_schema(&schema)?;

        if matches.get_flag("json") {
            println!("{}", serde_json::to_string_pretty(&registry)?);
        } else {
            print!("{}", describe(&registry));
        }

        Ok(())
    }
}

fn describe(registry: &MetadataRegistry) -> String {
    let mut output = String::new();

    for metadata in registry.types.values() {
        let labels = metadata
            .all_labels()
            .into_iter()
            .collect::<Vec<_>>()
            .join(":");
        let kind = if metadata.is_interface {
            "interface"
        } else {
            "type"
        };
        let _ = write!(output, "{kind} {} (:{labels})", metadata.type_name.bold());
        if let Some(id) = &metadata.id_property {
            let _ = write!(output, " id: {id}");
        }
        output.push('\n');

        for property in metadata.properties.values() {
            let _ = write!(output, "  {}: {}", property.field_name, property.property_type);
            if property.custom_query.is_some() {
                let _ = write!(output, " {}", "@cypher".cyan());
            }
            output.push('\n');
        }
        for relationship in metadata.relationships.values() {
            let _ = writeln!(
                output,
                "  {}: {}",
                relationship.field_name,
                describe_relationship(relationship)
            );
        }
    }

    for (title, operations) in [
        ("Query", &registry.queries),
        ("Mutation", &registry.mutations),
    ] {
        if operations.is_empty() {
            continue;
        }
        let _ = writeln!(output, "{}", title.bold());
        for operation in operations.values() {
            let _ = write!(output, "  {}: {}", operation.name, operation.return_type);
            if operation.custom_query.is_some() {
                let _ = write!(output, " {}", "@cypher".cyan());
            }
            output.push('\n');
        }
    }

    output
}

fn describe_relationship(relationship: &RelationshipInfo) -> String {
    let target = if relationship.multi {
        format!("[{}]", relationship.target_type)
    } else {
        relationship.target_type.clone()
    };
    let pattern = match relationship.direction {
        RelationshipDirection::Out => format!("-[:{}]->", relationship.relationship_type),
        RelationshipDirection::In => format!("<-[:{}]-", relationship.relationship_type),
    };
    let custom = if relationship.custom_query.is_some() {
        format!(" {}", "@cypher".cyan())
    } else {
        String::new()
    };

    format!("{pattern} {target}{custom}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_registry() {
        colored::control::set_override(false);

        let registry = graph_model_builder::parse(
            r#"
            interface Entity { name: String! }

            type Person implements Entity {
                name: String!
                score: Float @cypher(statement: "RETURN 1")
                movies: [Movie] @relation(name: "ACTED_IN")
            }

            type Movie {
                title: String!
                actors: [Person] @relation(name: "ACTED_IN", direction: "IN")
            }

            type Query {
                movieCount: Int @cypher(statement: "MATCH (m:Movie) RETURN count(m)")
            }
            "#,
        )
        .unwrap();

        let description = describe(&registry);
        assert!(description.contains("type Person (:Person:Entity) id: name\n"));
        assert!(description.contains("  score: Float @cypher\n"));
        assert!(description.contains("  movies: -[:ACTED_IN]-> [Movie]\n"));
        assert!(description.contains("  actors: <-[:ACTED_IN]- [Person]\n"));
        assert!(description.contains("Query\n  movieCount: Int @cypher\n"));
    }
}
