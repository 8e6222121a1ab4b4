// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;
use tracing::error;

use graph_model::ModelError;
use graph_model_builder::SchemaError;

use crate::{DocumentError, ExecutorError, StoreError};

/// A selection that cannot be expressed against the schema. These are all caused by the
/// request, so their messages are safe to return to the client.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    #[error("Unknown type '{0}'")]
    UnknownType(String),

    #[error("Unknown field '{field}' on type '{type_name}'")]
    UnknownField { type_name: String, field: String },

    #[error("Unknown filter field '{field}' on type '{type_name}'")]
    UnknownFilterField { type_name: String, field: String },

    #[error("Unknown argument '{argument}' on type '{type_name}'")]
    UnknownArgument { type_name: String, argument: String },

    #[error("Operation '{0}' does not declare a @cypher statement")]
    MissingCustomQuery(String),

    #[error("Invalid ordering '{0}': expected <property>_asc or <property>_desc")]
    InvalidOrdering(String),

    #[error("Invalid argument '{argument}': {message}")]
    InvalidArgument { argument: String, message: String },

    #[error("Operator '{operator}' is not supported on '{field}'")]
    UnsupportedOperator { field: String, operator: String },

    #[error("Unsupported value for '{0}'")]
    UnsupportedValue(String),

    #[error("Variable '{0}' not found")]
    VariableNotFound(String),

    #[error("Unsupported mutation '{mutation}': {message}")]
    UnsupportedMutation { mutation: String, message: String },
}

impl TranslationError {
    pub(crate) fn invalid_argument(argument: &str, message: impl Into<String>) -> Self {
        TranslationError::InvalidArgument {
            argument: argument.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn unsupported_mutation(mutation: &str, message: impl Into<String>) -> Self {
        TranslationError::UnsupportedMutation {
            mutation: mutation.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error(transparent)]
    Translation(#[from] TranslationError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Statement execution failed: {0}")]
    Executor(#[from] ExecutorError),

    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("Inconsistent graph schema: {0}")]
    Model(#[from] ModelError),

    #[error("Schema storage failed: {0}")]
    Store(#[from] StoreError),
}

impl ExecutionError {
    pub fn user_error_message(&self) -> String {
        match self {
            ExecutionError::Translation(_)
            | ExecutionError::Document(_)
            | ExecutionError::Schema(_) => self.to_string(),
            // Do not reveal database errors; they may include data or statement details
            _ => {
                error!("Operation failed: {:?}", self);
                "Operation failed".to_string()
            }
        }
    }
}
