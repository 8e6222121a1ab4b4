// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgMatches, Command};
use colored::Colorize;

use common::env::SystemEnvironment;
use graph_resolver::document::parse_operation;
use graph_resolver::{
    Dialect, GeneratedQuery, OperationKind, QueryTranslator, TranslatorConfig, Variables,
};

use super::command::{CommandDefinition, get, get_required, schema_file_arg};
use super::util::load_schema;

pub(crate) struct TranslateCommandDefinition {}

impl CommandDefinition for TranslateCommandDefinition {
    fn command(&self) -> Command {
        Command::new("translate")
            .about("Print the Cypher statements for a GraphQL operation")
            .arg(schema_file_arg())
            .arg(
                Arg::new("query")
                    .help("The path to the file containing the GraphQL operation.")
                    .required(true)
                    .value_parser(clap::value_parser!(PathBuf))
                    .index(2),
            )
            .arg(
                Arg::new("dialect")
                    .help("The form of the generated statements. Default: GRAPHQL_CYPHER_DIALECT or comprehension")
                    .long("dialect")
                    .short('d')
                    .value_parser(["staged", "comprehension"]),
            )
            .arg(
                Arg::new("variables")
                    .help("Variables for the operation, as a JSON object")
                    .long("variables")
                    .num_args(1),
            )
            .arg(
                Arg::new("operation")
                    .help("The operation to translate, if the document contains several")
                    .long("operation")
                    .short('o')
                    .num_args(1),
            )
    }

    fn execute(&self, matches: &ArgMatches) -> Result<()> {
        let schema: PathBuf = get_required(matches, "schema")?;
        let query_path: PathBuf = get_required(matches, "query")?;

        let registry = load_schema(&schema)?;
        let query = std::fs::read_to_string(&query_path)
            .with_context(|| format!("Could not read query file {}", query_path.display()))?;

        let variables: Variables = match get::<String>(matches, "variables") {
            Some(variables) => {
                serde_json::from_str(&variables).context("Variables must be a JSON object")?
            }
            None => Variables::new(),
        };

        let mut config = TranslatorConfig::from_env(&SystemEnvironment)?;
        if let Some(dialect) = get::<String>(matches, "dialect") {
            let dialect = Dialect::parse(&dialect)
                .ok_or_else(|| anyhow!("Unknown dialect '{}'", dialect))?;
            config = config.with_dialect(dialect);
        }

        let operation_name: Option<String> = get(matches, "operation");
        let operation = parse_operation(&query, operation_name.as_deref(), variables)?;
        let translator = QueryTranslator::new(Arc::new(registry), config);

        let mut failures = 0;
        for field in &operation.fields {
            let translated = match operation.kind {
                OperationKind::Query => translator.translate_field(field, &operation.variables),
                OperationKind::Mutation => {
                    translator.translate_mutation(field, &operation.variables)
                }
            };

            match translated {
                Ok(query) => {
                    println!("{}", format!("// {}", field.output_name()).green());
                    println!("{}", render(&query)?);
                }
                Err(error) => {
                    eprintln!(
                        "{} {}: {}",
                        "error".red().bold(),
                        field.output_name(),
                        error
                    );
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            Err(anyhow!("{} field(s) could not be translated", failures))
        } else {
            Ok(())
        }
    }
}

/// The statement followed by its parameters (if any) as JSON
fn render(query: &GeneratedQuery) -> Result<String> {
    if query.parameters.is_empty() {
        return Ok(query.statement.clone());
    }

    Ok(format!(
        "{}\n{}",
        query.statement,
        serde_json::to_string_pretty(&query.parameters)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_parameters() {
        let mut query = GeneratedQuery {
            statement: "MATCH (`movie`:`Movie`)\nRETURN count(*) AS `count`".to_string(),
            parameters: Default::default(),
            result_is_list: false,
        };
        assert_eq!(render(&query).unwrap(), query.statement);

        query
            .parameters
            .insert("title".to_string(), serde_json::json!("Speed"));
        assert_eq!(
            render(&query).unwrap(),
            "MATCH (`movie`:`Movie`)\nRETURN count(*) AS `count`\n{\n  \"title\": \"Speed\"\n}"
        );
    }
}
