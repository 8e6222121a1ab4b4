// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Translation of GraphQL selections into Cypher statements, and the request pipeline around it.
//!
//! The pure part is the [QueryTranslator]: given a [Field] and a
//! [graph_model::MetadataRegistry], it produces a [GeneratedQuery] (statement, parameters and
//! result shape). Everything else is plumbing: [document] turns a GraphQL document into
//! [Field]s, [reshaper] turns result rows back into the response shape, and the
//! [ExecutionContext] keeps a schema snapshot up to date for the [GraphQLEngine].

mod argument_mapper;
mod collaborators;
mod config;
pub mod document;
mod engine;
mod error;
mod execution_context;
mod limit_offset_mapper;
mod mutation;
mod order_by_mapper;
mod predicate_mapper;
pub mod reshaper;
mod selection;
mod translator;
mod value_mapper;

#[cfg(test)]
mod test_util;

pub use collaborators::{
    ExecutorError, FingerprintProvider, GraphSampler, InMemorySchemaStore, QueryExecutor, Row,
    SchemaStore, StoreError,
};
pub use config::{
    ContextConfig, Dialect, GRAPHQL_CYPHER_DIALECT, GRAPHQL_CYPHER_RUN_FUNCTION,
    GRAPHQL_CYPHER_SCHEMA_CHECK_INTERVAL_MS, GRAPHQL_CYPHER_SORT_FUNCTION, TranslatorConfig,
};
pub use document::{DocumentError, Operation, OperationKind};
pub use engine::{GraphQLEngine, GraphQLError, GraphQLRequest, GraphQLResponse, Location};
pub use error::{ExecutionError, TranslationError};
pub use execution_context::{ExecutionContext, SchemaSnapshot};
pub use reshaper::{GraphValue, reshape};
pub use selection::{Directive, Field, InlineFragment, Selection, Value, Variables};
pub use translator::{GeneratedQuery, QueryTranslator};
