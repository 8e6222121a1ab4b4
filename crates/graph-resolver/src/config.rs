// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::time::Duration;

use common::env::{EnvError, Environment};

pub const GRAPHQL_CYPHER_DIALECT: &str = "GRAPHQL_CYPHER_DIALECT";
pub const GRAPHQL_CYPHER_RUN_FUNCTION: &str = "GRAPHQL_CYPHER_RUN_FUNCTION";
pub const GRAPHQL_CYPHER_SORT_FUNCTION: &str = "GRAPHQL_CYPHER_SORT_FUNCTION";
pub const GRAPHQL_CYPHER_SCHEMA_CHECK_INTERVAL_MS: &str = "GRAPHQL_CYPHER_SCHEMA_CHECK_INTERVAL_MS";

const DEFAULT_RUN_FUNCTION: &str = "graphql.run";
const DEFAULT_SORT_FUNCTION: &str = "graphql.sortColl";
const DEFAULT_SCHEMA_CHECK_INTERVAL_MS: u64 = 10_000;

/// The shape of the generated statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// One `OPTIONAL MATCH` per nested relationship, aggregated with `collect`
    Staged,
    /// A single `RETURN` with nested pattern comprehensions
    #[default]
    Comprehension,
}

impl Dialect {
    pub fn parse(value: &str) -> Option<Dialect> {
        match value.to_lowercase().as_str() {
            "staged" => Some(Dialect::Staged),
            "comprehension" => Some(Dialect::Comprehension),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorConfig {
    pub dialect: Dialect,
    /// Procedure-like function running a custom statement: `fn(statement, params, list)`
    pub run_function: String,
    /// Function sorting a list of maps or nodes: `fn(list, ['^ascending', 'descending'])`
    pub sort_function: String,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            run_function: DEFAULT_RUN_FUNCTION.to_string(),
            sort_function: DEFAULT_SORT_FUNCTION.to_string(),
        }
    }
}

impl TranslatorConfig {
    pub fn from_env(env: &dyn Environment) -> Result<Self, EnvError> {
        let dialect = match env.get(GRAPHQL_CYPHER_DIALECT) {
            Some(value) => Dialect::parse(&value).ok_or(EnvError::InvalidEnum {
                env_key: GRAPHQL_CYPHER_DIALECT,
                env_value: value,
                message: "Must be 'staged' or 'comprehension'".to_string(),
            })?,
            None => Dialect::default(),
        };

        Ok(Self {
            dialect,
            run_function: env.get_or_else(GRAPHQL_CYPHER_RUN_FUNCTION, DEFAULT_RUN_FUNCTION),
            sort_function: env.get_or_else(GRAPHQL_CYPHER_SORT_FUNCTION, DEFAULT_SORT_FUNCTION),
        })
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    /// Minimum time between two checks of the graph fingerprint
    pub schema_check_interval: Duration,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            schema_check_interval: Duration::from_millis(DEFAULT_SCHEMA_CHECK_INTERVAL_MS),
        }
    }
}

impl ContextConfig {
    pub fn from_env(env: &dyn Environment) -> Result<Self, EnvError> {
        let interval = env.get_u64(
            GRAPHQL_CYPHER_SCHEMA_CHECK_INTERVAL_MS,
            DEFAULT_SCHEMA_CHECK_INTERVAL_MS,
        )?;

        Ok(Self {
            schema_check_interval: Duration::from_millis(interval),
        })
    }
}

#[cfg(test)]
mod tests {
    use common::env::MapEnvironment;

    use super::*;

    #[test]
    fn defaults() {
        let env = MapEnvironment::new();

        assert_eq!(TranslatorConfig::from_env(&env).unwrap(), TranslatorConfig::default());
        assert_eq!(
            ContextConfig::from_env(&env).unwrap().schema_check_interval,
            Duration::from_secs(10)
        );
    }

    #[test]
    fn from_env() {
        let env = MapEnvironment::from([
            (GRAPHQL_CYPHER_DIALECT, "Staged"),
            (GRAPHQL_CYPHER_RUN_FUNCTION, "apoc.cypher.runFirstColumn"),
            (GRAPHQL_CYPHER_SCHEMA_CHECK_INTERVAL_MS, "500"),
        ]);

        let config = TranslatorConfig::from_env(&env).unwrap();
        assert_eq!(config.dialect, Dialect::Staged);
        assert_eq!(config.run_function, "apoc.cypher.runFirstColumn");
        assert_eq!(config.sort_function, "graphql.sortColl");
        assert_eq!(
            ContextConfig::from_env(&env).unwrap().schema_check_interval,
            Duration::from_millis(500)
        );
    }

    #[test]
    fn invalid_dialect() {
        let env = MapEnvironment::from([(GRAPHQL_CYPHER_DIALECT, "nested")]);

        assert_eq!(
            TranslatorConfig::from_env(&env).unwrap_err().to_string(),
            "Invalid env value nested for GRAPHQL_CYPHER_DIALECT: Must be 'staged' or 'comprehension'"
        );
    }
}
