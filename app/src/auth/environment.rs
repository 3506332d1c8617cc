//! Session screen environment.

use eventos_core::environment::Clock;
use eventos_data::backend::{BlobStorage, DocumentStore, IdentityProvider};
use eventos_data::AuthRepository;
use std::sync::Arc;

/// Dependencies of [`super::AuthReducer`].
///
/// # Type Parameters
///
/// - `I`: Identity provider
/// - `D`: Document store
/// - `B`: Blob storage
#[derive(Clone)]
pub struct AuthEnvironment<I, D, B>
where
    I: IdentityProvider + Clone,
    D: DocumentStore + Clone,
    B: BlobStorage + Clone,
{
    /// Account and profile operations.
    pub repository: AuthRepository<I, D, B>,

    /// Time source for freshly installed profiles.
    pub clock: Arc<dyn Clock>,
}

impl<I, D, B> AuthEnvironment<I, D, B>
where
    I: IdentityProvider + Clone,
    D: DocumentStore + Clone,
    B: BlobStorage + Clone,
{
    /// Create a new environment.
    #[must_use]
    pub fn new(repository: AuthRepository<I, D, B>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }
}
