// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::document::parse_operation;
use crate::{
    DocumentError, ExecutionContext, ExecutionError, Field, OperationKind, QueryExecutor,
    QueryTranslator, Variables, reshape,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub query: String,
    #[serde(default)]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: Option<Variables>,
}

impl GraphQLRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operation_name: None,
            variables: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GraphQLError {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct GraphQLResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

impl GraphQLResponse {
    fn request_error(message: String, locations: Vec<Location>) -> Self {
        Self {
            data: None,
            errors: vec![GraphQLError {
                message,
                locations,
                path: vec![],
            }],
        }
    }
}

impl From<DocumentError> for GraphQLResponse {
    fn from(error: DocumentError) -> Self {
        let pos = error.pos();
        // Errors not tied to a place in the document carry the default (0:0) position
        let locations = if pos.line == 0 {
            vec![]
        } else {
            vec![Location {
                line: pos.line,
                column: pos.column,
            }]
        };
        GraphQLResponse::request_error(error.to_string(), locations)
    }
}

/// Runs GraphQL requests against the graph: each top-level field is translated, executed and
/// reshaped on its own, so a failing field yields `null` and an error without affecting its
/// siblings.
pub struct GraphQLEngine {
    context: Arc<ExecutionContext>,
    executor: Arc<dyn QueryExecutor>,
}

impl GraphQLEngine {
    pub fn new(context: Arc<ExecutionContext>, executor: Arc<dyn QueryExecutor>) -> Self {
        Self { context, executor }
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    #[instrument(name = "GraphQLEngine::execute", skip_all, fields(operation_name = ?request.operation_name))]
    pub async fn execute(&self, request: GraphQLRequest) -> GraphQLResponse {
        let operation = match parse_operation(
            &request.query,
            request.operation_name.as_deref(),
            request.variables.unwrap_or_default(),
        ) {
            Ok(operation) => operation,
            Err(error) => return error.into(),
        };

        let snapshot = match self.context.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(error) => return GraphQLResponse::request_error(error.user_error_message(), vec![]),
        };

        let mut data = serde_json::Map::new();
        let mut errors = vec![];

        for field in &operation.fields {
            let output_name = field.output_name().to_string();

            if field.name == "__typename" {
                let type_name = match operation.kind {
                    OperationKind::Query => "Query",
                    OperationKind::Mutation => "Mutation",
                };
                data.insert(output_name, type_name.into());
                continue;
            }

            let value = self
                .resolve_field(
                    &snapshot.translator,
                    operation.kind,
                    field,
                    &operation.variables,
                )
                .await;

            match value {
                Ok(value) => {
                    data.insert(output_name, value);
                }
                Err(error) => {
                    errors.push(GraphQLError {
                        message: error.user_error_message(),
                        locations: vec![],
                        path: vec![output_name.clone()],
                    });
                    data.insert(output_name, serde_json::Value::Null);
                }
            }
        }

        GraphQLResponse {
            data: Some(data),
            errors,
        }
    }

    async fn resolve_field(
        &self,
        translator: &QueryTranslator,
        kind: OperationKind,
        field: &Field,
        variables: &Variables,
    ) -> Result<serde_json::Value, ExecutionError> {
        let query = match kind {
            OperationKind::Query => translator.translate_field(field, variables)?,
            OperationKind::Mutation => translator.translate_mutation(field, variables)?,
        };

        let rows = self
            .executor
            .execute(&query.statement, &query.parameters)
            .await?;

        Ok(reshape(rows, query.result_is_list))
    }
}
