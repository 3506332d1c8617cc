//! In-memory blob storage.

use super::FailureSwitch;
use crate::backend::BlobStorage;
use crate::error::{DataError, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Blob storage that keeps uploads in a map and hands out fake URLs.
#[derive(Debug, Clone)]
pub struct MemoryBlobStorage {
    base_url: String,
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    failures: FailureSwitch,
}

impl MemoryBlobStorage {
    /// Create storage whose URLs start with `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            blobs: Arc::new(Mutex::new(HashMap::new())),
            failures: FailureSwitch::default(),
        }
    }

    /// Make every upload fail with `message`.
    pub fn fail_with(&self, message: &str) {
        self.failures.fail(None, message);
    }

    /// Clear injected failures.
    pub fn recover(&self) {
        self.failures.recover();
    }

    /// Bytes stored at `path`, if any.
    #[must_use]
    pub fn blob(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.lock().ok()?.get(path).cloned()
    }
}

impl Default for MemoryBlobStorage {
    fn default() -> Self {
        Self::new("memory://blobs")
    }
}

impl BlobStorage for MemoryBlobStorage {
    fn upload(&self, path: &str, bytes: Vec<u8>) -> impl Future<Output = Result<String>> + Send {
        let result = self.failures.check(path).and_then(|()| {
            self.blobs
                .lock()
                .map_err(|_| DataError::lock_poisoned())?
                .insert(path.to_string(), bytes);
            Ok(format!("{}/{path}", self.base_url))
        });
        async move { result }
    }
}
