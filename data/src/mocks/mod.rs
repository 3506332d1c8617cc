//! In-memory backend implementations.
//!
//! Used by tests and by the demo binary in place of the hosted services.
//! Every double can be switched into a failing mode to exercise rollback
//! and fallback paths.

pub mod blobs;
pub mod documents;
pub mod identity;

pub use blobs::MemoryBlobStorage;
pub use documents::MemoryDocumentStore;
pub use identity::MemoryIdentityProvider;

use crate::error::{DataError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Shared failure injection: a global failure plus per-scope failures.
#[derive(Debug, Clone, Default)]
pub(crate) struct FailureSwitch {
    failures: Arc<Mutex<HashMap<Option<String>, String>>>,
}

impl FailureSwitch {
    pub(crate) fn fail(&self, scope: Option<&str>, message: &str) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(scope.map(str::to_string), message.to_string());
        }
    }

    pub(crate) fn recover(&self) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.clear();
        }
    }

    /// Fail with the global message, else with the one for `scope`.
    pub(crate) fn check(&self, scope: &str) -> Result<()> {
        let failures = self.failures.lock().map_err(|_| DataError::lock_poisoned())?;
        match failures.get(&None).or_else(|| failures.get(&Some(scope.to_string()))) {
            Some(message) => Err(DataError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}
