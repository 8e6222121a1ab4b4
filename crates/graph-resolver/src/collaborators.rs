// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The services the engine relies on but does not implement: the graph database (executing
//! statements, fingerprinting and sampling the graph) and the storage of the schema document.

use async_trait::async_trait;
use indexmap::IndexMap;
use thiserror::Error;
use tokio::sync::RwLock;

use graph_model_builder::LabelSample;

use crate::GraphValue;

/// A result row: column name to value, in the order of the `RETURN` clause
pub type Row = IndexMap<String, GraphValue>;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Statement failed: {0}")]
    Statement(String),
}

#[derive(Error, Debug)]
#[error("{0}")]
pub struct StoreError(pub String);

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Execute a statement. An empty result is `Ok(vec![])`, never an error.
    async fn execute(
        &self,
        statement: &str,
        parameters: &IndexMap<String, serde_json::Value>,
    ) -> Result<Vec<Row>, ExecutorError>;
}

/// A cheap summary of the graph's structure (such as a hash of its labels, relationship types
/// and property keys). A change means metadata derived from the graph may be stale.
#[async_trait]
pub trait FingerprintProvider: Send + Sync {
    async fn fingerprint(&self) -> Result<i64, ExecutorError>;
}

/// Samples nodes of every label, for inferring metadata when no schema document is stored.
///
/// Implementations should take at most `nodes_per_label` nodes per label and skip relationships
/// of dense nodes (see [graph_model_builder::DENSE_NODE]).
#[async_trait]
pub trait GraphSampler: Send + Sync {
    async fn sample(&self, nodes_per_label: usize) -> Result<Vec<LabelSample>, ExecutorError>;
}

#[async_trait]
pub trait SchemaStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>, StoreError>;

    async fn save(&self, document: String) -> Result<(), StoreError>;

    async fn delete(&self) -> Result<(), StoreError>;
}

/// A [SchemaStore] keeping the document in memory
#[derive(Debug, Default)]
pub struct InMemorySchemaStore {
    document: RwLock<Option<String>>,
}

impl InMemorySchemaStore {
    pub fn new(document: Option<String>) -> Self {
        Self {
            document: RwLock::new(document),
        }
    }
}

#[async_trait]
impl SchemaStore for InMemorySchemaStore {
    async fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.document.read().await.clone())
    }

    async fn save(&self, document: String) -> Result<(), StoreError> {
        *self.document.write().await = Some(document);
        Ok(())
    }

    async fn delete(&self) -> Result<(), StoreError> {
        *self.document.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_store() {
        let store = InMemorySchemaStore::default();
        assert_eq!(store.load().await.unwrap(), None);

        store.save("type Person { name: String }".to_string()).await.unwrap();
        assert_eq!(
            store.load().await.unwrap().as_deref(),
            Some("type Person { name: String }")
        );

        store.delete().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }
}
