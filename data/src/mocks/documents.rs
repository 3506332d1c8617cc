//! In-memory document store.

use super::FailureSwitch;
use crate::backend::{Document, DocumentStore, Query};
use crate::error::{DataError, Result};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Collections = HashMap<String, BTreeMap<String, Document>>;

/// Document store backed by a map of collections.
///
/// Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<Mutex<Collections>>,
    failures: FailureSwitch,
    latency: Arc<Mutex<HashMap<String, Duration>>>,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail with a backend error carrying `message`.
    pub fn fail_with(&self, message: &str) {
        self.failures.fail(None, message);
    }

    /// Make operations on `collection` fail with `message`.
    pub fn fail_collection(&self, collection: &str, message: &str) {
        self.failures.fail(Some(collection), message);
    }

    /// Clear all injected failures.
    pub fn recover(&self) {
        self.failures.recover();
    }

    /// Delay writes to `collection` by `delay`.
    pub fn delay_writes(&self, collection: &str, delay: Duration) {
        if let Ok(mut latency) = self.latency.lock() {
            latency.insert(collection.to_string(), delay);
        }
    }

    /// Number of documents in `collection`.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn document_count(&self, collection: &str) -> Result<usize> {
        Ok(self
            .collections
            .lock()
            .map_err(|_| DataError::lock_poisoned())?
            .get(collection)
            .map_or(0, BTreeMap::len))
    }

    fn write_delay(&self, collection: &str) -> Option<Duration> {
        self.latency.lock().ok()?.get(collection).copied()
    }

    fn with_collections<T>(&self, collection: &str, f: impl FnOnce(&mut Collections) -> Result<T>) -> Result<T> {
        self.failures.check(collection)?;
        let mut collections = self.collections.lock().map_err(|_| DataError::lock_poisoned())?;
        f(&mut collections)
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self, collection: &str, id: &str) -> impl Future<Output = Result<Option<Document>>> + Send {
        let result = self.with_collections(collection, |collections| {
            Ok(collections.get(collection).and_then(|docs| docs.get(id)).cloned())
        });
        async move { result }
    }

    fn set(&self, collection: &str, id: &str, document: Document) -> impl Future<Output = Result<()>> + Send {
        let store = self.clone();
        let collection = collection.to_string();
        let id = id.to_string();
        async move {
            if let Some(delay) = store.write_delay(&collection) {
                tokio::time::sleep(delay).await;
            }
            store.with_collections(&collection, |collections| {
                collections.entry(collection.clone()).or_default().insert(id, document);
                Ok(())
            })
        }
    }

    fn update(&self, collection: &str, id: &str, fields: Document) -> impl Future<Output = Result<()>> + Send {
        let result = self.with_collections(collection, |collections| {
            let document = collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(id))
                .ok_or_else(|| DataError::not_found("Document"))?;
            document.extend(fields);
            Ok(())
        });
        async move { result }
    }

    fn delete(&self, collection: &str, id: &str) -> impl Future<Output = Result<()>> + Send {
        let result = self.with_collections(collection, |collections| {
            if let Some(docs) = collections.get_mut(collection) {
                docs.remove(id);
            }
            Ok(())
        });
        async move { result }
    }

    fn query(&self, collection: &str, query: Query) -> impl Future<Output = Result<Vec<Document>>> + Send {
        let result = self.with_collections(collection, |collections| {
            let mut documents: Vec<Document> = collections
                .get(collection)
                .map(|docs| docs.values().filter(|doc| query.matches(doc)).cloned().collect())
                .unwrap_or_default();
            query.sort(&mut documents);
            Ok(documents)
        });
        async move { result }
    }

    fn transaction<F>(&self, collection: &str, id: &str, apply: F) -> impl Future<Output = Result<()>> + Send
    where
        F: FnOnce(Option<Document>) -> Result<Option<Document>> + Send + 'static,
    {
        // The lock is held across read and write, which makes this atomic.
        let result = self.with_collections(collection, |collections| {
            let docs = collections.entry(collection.to_string()).or_default();
            if let Some(fields) = apply(docs.get(id).cloned())? {
                docs.entry(id.to_string()).or_default().extend(fields);
            }
            Ok(())
        });
        async move { result }
    }
}
