// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! Holds the schema snapshot used to translate requests.
//!
//! A snapshot is built once (from the stored schema document, or inferred from a sample of the
//! graph when none is stored) and reused until the graph's fingerprint changes, the schema is
//! replaced, or the context is reset.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use tracing::{info, instrument, warn};

use graph_model::MetadataRegistry;
use graph_model_builder::{SAMPLE_SIZE, infer_registry};

use crate::{
    ContextConfig, ExecutionError, FingerprintProvider, GraphSampler, QueryTranslator,
    SchemaStore, TranslatorConfig,
};

/// An immutable view of the schema along with the translator built for it
#[derive(Debug)]
pub struct SchemaSnapshot {
    pub registry: Arc<MetadataRegistry>,
    pub translator: QueryTranslator,
    /// Fingerprint of the graph at the time the snapshot was built
    pub fingerprint: i64,
}

impl SchemaSnapshot {
    pub fn new(registry: MetadataRegistry, fingerprint: i64, config: &TranslatorConfig) -> Self {
        let registry = Arc::new(registry);
        Self {
            translator: QueryTranslator::new(registry.clone(), config.clone()),
            registry,
            fingerprint,
        }
    }
}

pub struct ExecutionContext {
    store: Arc<dyn SchemaStore>,
    fingerprints: Arc<dyn FingerprintProvider>,
    sampler: Option<Arc<dyn GraphSampler>>,
    translator_config: TranslatorConfig,
    config: ContextConfig,
    snapshot: RwLock<Option<Arc<SchemaSnapshot>>>,
    rebuild_lock: tokio::sync::Mutex<()>,
    started: Instant,
    /// Milliseconds since `started` at which the fingerprint was last checked
    last_check: AtomicU64,
}

impl ExecutionContext {
    pub fn new(
        store: Arc<dyn SchemaStore>,
        fingerprints: Arc<dyn FingerprintProvider>,
        translator_config: TranslatorConfig,
        config: ContextConfig,
    ) -> Self {
        Self {
            store,
            fingerprints,
            sampler: None,
            translator_config,
            config,
            snapshot: RwLock::new(None),
            rebuild_lock: tokio::sync::Mutex::new(()),
            started: Instant::now(),
            last_check: AtomicU64::new(0),
        }
    }

    /// Infer the schema from the graph when no schema document is stored
    pub fn with_sampler(mut self, sampler: Arc<dyn GraphSampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// The current snapshot, building it if needed. At most once per check interval, the graph's
    /// fingerprint is compared with the snapshot's and a change triggers a rebuild. A failed
    /// rebuild keeps the previous snapshot.
    #[instrument(name = "ExecutionContext::snapshot", skip_all)]
    pub async fn snapshot(&self) -> Result<Arc<SchemaSnapshot>, ExecutionError> {
        let Some(current) = self.current() else {
            return self.rebuild(None).await;
        };

        if !self.check_due() {
            return Ok(current);
        }

        let fingerprint = match self.fingerprints.fingerprint().await {
            Ok(fingerprint) => fingerprint,
            Err(error) => {
                warn!(%error, "Could not fetch the graph fingerprint");
                return Ok(current);
            }
        };

        if fingerprint == current.fingerprint {
            return Ok(current);
        }

        warn!(
            previous = current.fingerprint,
            fingerprint, "Graph fingerprint changed, rebuilding the schema"
        );

        match self.rebuild(Some(current.clone())).await {
            Ok(snapshot) => Ok(snapshot),
            Err(error) => {
                warn!(%error, "Rebuilding the schema failed, keeping the previous one");
                Ok(current)
            }
        }
    }

    /// Drop the current snapshot; the next request rebuilds it
    pub fn reset(&self) {
        self.set_current(None);
    }

    /// Parse and store a new schema document and use it from now on. An invalid document is
    /// neither stored nor used.
    #[instrument(name = "ExecutionContext::replace_schema", skip_all)]
    pub async fn replace_schema(
        &self,
        document: String,
    ) -> Result<Arc<SchemaSnapshot>, ExecutionError> {
        let _guard = self.rebuild_lock.lock().await;

        let registry = graph_model_builder::parse(&document)?;
        self.store.save(document).await?;
        let fingerprint = self.fingerprints.fingerprint().await?;

        info!(types = registry.types.len(), "Replaced schema");

        let snapshot = Arc::new(SchemaSnapshot::new(
            registry,
            fingerprint,
            &self.translator_config,
        ));
        self.set_current(Some(snapshot.clone()));
        self.mark_checked();
        Ok(snapshot)
    }

    /// Delete the stored schema document. The next snapshot is inferred from the graph.
    pub async fn delete_schema(&self) -> Result<(), ExecutionError> {
        let _guard = self.rebuild_lock.lock().await;
        self.store.delete().await?;
        self.set_current(None);
        Ok(())
    }

    /// Rebuild the snapshot unless another task already replaced `stale` while we waited
    async fn rebuild(
        &self,
        stale: Option<Arc<SchemaSnapshot>>,
    ) -> Result<Arc<SchemaSnapshot>, ExecutionError> {
        let _guard = self.rebuild_lock.lock().await;

        if let Some(current) = self.current() {
            let replaced = stale
                .as_ref()
                .is_none_or(|stale| !Arc::ptr_eq(stale, &current));
            if replaced {
                return Ok(current);
            }
        }

        let snapshot = Arc::new(self.build().await?);
        self.set_current(Some(snapshot.clone()));
        self.mark_checked();
        Ok(snapshot)
    }

    async fn build(&self) -> Result<SchemaSnapshot, ExecutionError> {
        let fingerprint = self.fingerprints.fingerprint().await?;

        let registry = match self.store.load().await? {
            Some(document) => graph_model_builder::parse(&document)?,
            None => match &self.sampler {
                Some(sampler) => infer_registry(&sampler.sample(SAMPLE_SIZE).await?)?,
                None => MetadataRegistry::new(),
            },
        };

        info!(
            types = registry.types.len(),
            fingerprint, "Built schema snapshot"
        );

        Ok(SchemaSnapshot::new(
            registry,
            fingerprint,
            &self.translator_config,
        ))
    }

    fn current(&self) -> Option<Arc<SchemaSnapshot>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_current(&self, snapshot: Option<Arc<SchemaSnapshot>>) {
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    fn elapsed_millis(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn mark_checked(&self) {
        self.last_check
            .store(self.elapsed_millis(), Ordering::Release);
    }

    /// Whether the fingerprint should be checked now. Only one caller per interval gets `true`.
    fn check_due(&self) -> bool {
        let now = self.elapsed_millis();
        let last = self.last_check.load(Ordering::Acquire);
        let interval =
            u64::try_from(self.config.schema_check_interval.as_millis()).unwrap_or(u64::MAX);

        if now.saturating_sub(last) < interval {
            return false;
        }

        self.last_check
            .compare_exchange(last, now, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicI64, AtomicUsize};
    use std::time::Duration;

    use async_trait::async_trait;
    use graph_model_builder::{LabelSample, SampledNode};

    use super::*;
    use crate::test_util::SCHEMA;
    use crate::{ExecutorError, InMemorySchemaStore};

    #[derive(Default)]
    pub(crate) struct FakeFingerprint {
        pub value: AtomicI64,
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl FingerprintProvider for FakeFingerprint {
        async fn fingerprint(&self) -> Result<i64, ExecutorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.value.load(Ordering::SeqCst))
        }
    }

    struct FakeSampler;

    #[async_trait]
    impl GraphSampler for FakeSampler {
        async fn sample(&self, nodes_per_label: usize) -> Result<Vec<LabelSample>, ExecutorError> {
            assert_eq!(nodes_per_label, SAMPLE_SIZE);

            let node = SampledNode {
                labels: vec!["Robot".to_string()],
                properties: [("serial".to_string(), serde_json::json!("R2"))]
                    .into_iter()
                    .collect(),
                relationships: vec![],
            };

            Ok(vec![LabelSample {
                label: "Robot".to_string(),
                unique_properties: vec!["serial".to_string()],
                nodes: vec![node],
            }])
        }
    }

    fn context(
        document: Option<&str>,
        interval: Duration,
    ) -> (ExecutionContext, Arc<InMemorySchemaStore>, Arc<FakeFingerprint>) {
        let store = Arc::new(InMemorySchemaStore::new(document.map(str::to_string)));
        let fingerprints = Arc::new(FakeFingerprint::default());
        let context = ExecutionContext::new(
            store.clone(),
            fingerprints.clone(),
            TranslatorConfig::default(),
            ContextConfig {
                schema_check_interval: interval,
            },
        );
        (context, store, fingerprints)
    }

    #[tokio::test]
    async fn builds_once_and_reuses() {
        let (context, _, _) = context(Some(SCHEMA), Duration::ZERO);

        let first = context.snapshot().await.unwrap();
        assert!(first.registry.get("Person").is_some());
        assert!(first.translator.registry().get("Movie").is_some());

        let second = context.snapshot().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn rebuilds_on_fingerprint_change() {
        let (context, _, fingerprints) = context(Some(SCHEMA), Duration::ZERO);

        let first = context.snapshot().await.unwrap();
        fingerprints.value.store(42, Ordering::SeqCst);

        let second = context.snapshot().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.fingerprint, 42);
    }

    #[tokio::test]
    async fn failed_rebuild_keeps_previous_snapshot() {
        let (context, store, fingerprints) = context(Some(SCHEMA), Duration::ZERO);

        let first = context.snapshot().await.unwrap();

        store.save("type {".to_string()).await.unwrap();
        fingerprints.value.store(7, Ordering::SeqCst);

        let second = context.snapshot().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        // Without a snapshot to fall back on, the failure surfaces
        context.reset();
        assert!(matches!(
            context.snapshot().await,
            Err(ExecutionError::Schema(_))
        ));
    }

    #[tokio::test]
    async fn throttles_fingerprint_checks() {
        let (context, _, fingerprints) = context(Some(SCHEMA), Duration::from_secs(3600));

        let first = context.snapshot().await.unwrap();
        fingerprints.value.store(1, Ordering::SeqCst);

        for _ in 0..3 {
            let next = context.snapshot().await.unwrap();
            assert!(Arc::ptr_eq(&first, &next));
        }

        // Only the initial build asked for a fingerprint
        assert_eq!(fingerprints.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn infers_without_a_document() {
        let (bare, _, _) = context(None, Duration::ZERO);
        let empty = bare.snapshot().await.unwrap();
        assert!(empty.registry.types.is_empty());

        let (sampled, _, _) = context(None, Duration::ZERO);
        let sampled = sampled.with_sampler(Arc::new(FakeSampler));
        let inferred = sampled.snapshot().await.unwrap();
        assert!(inferred.registry.get("Robot").is_some());
    }

    #[tokio::test]
    async fn replaces_and_deletes_schema() {
        let (context, store, _) = context(None, Duration::ZERO);
        let context = context.with_sampler(Arc::new(FakeSampler));

        let inferred = context.snapshot().await.unwrap();
        assert!(inferred.registry.get("Person").is_none());

        let replaced = context.replace_schema(SCHEMA.to_string()).await.unwrap();
        assert!(replaced.registry.get("Person").is_some());
        assert_eq!(store.load().await.unwrap().as_deref(), Some(SCHEMA));
        assert!(Arc::ptr_eq(&replaced, &context.snapshot().await.unwrap()));

        // An invalid document is rejected and leaves everything as it was
        assert!(matches!(
            context.replace_schema("type {".to_string()).await,
            Err(ExecutionError::Schema(_))
        ));
        assert_eq!(store.load().await.unwrap().as_deref(), Some(SCHEMA));

        context.delete_schema().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        let reinferred = context.snapshot().await.unwrap();
        assert!(reinferred.registry.get("Robot").is_some());
        assert!(reinferred.registry.get("Person").is_none());
    }
}
