//! Event screen environment.

use eventos_core::environment::Clock;
use eventos_data::{EventRepository, SampleCatalog};
use std::sync::Arc;

/// Dependencies of [`super::EventReducer`].
#[derive(Clone)]
pub struct EventEnvironment<R>
where
    R: EventRepository,
{
    /// Event storage.
    pub repository: R,

    /// Time source for optimistic timestamps.
    pub clock: Arc<dyn Clock>,

    /// Demo events used as fallback.
    pub samples: Arc<SampleCatalog>,

    /// Top up non-empty fetches with demo events.
    pub merge_samples: bool,
}

impl<R> EventEnvironment<R>
where
    R: EventRepository,
{
    /// Create an environment with demo events dated relative to now.
    #[must_use]
    pub fn new(repository: R, clock: Arc<dyn Clock>) -> Self {
        let samples = Arc::new(SampleCatalog::new(clock.now()));
        Self {
            repository,
            clock,
            samples,
            merge_samples: true,
        }
    }

    /// Enable or disable merging demo events into non-empty fetches.
    #[must_use]
    pub fn with_sample_merging(mut self, enabled: bool) -> Self {
        self.merge_samples = enabled;
        self
    }
}
