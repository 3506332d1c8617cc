//! # Eventos Testing
//!
//! Testing utilities and helpers for Eventos reducers and stores.
//!
//! This crate provides:
//! - A deterministic [`Clock`] implementation
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Assertion helpers for effects
//! - Opt-in log capture for tests
//!
//! ## Example
//!
//! ```ignore
//! use eventos_testing::{test_clock, ReducerTest, assertions};
//!
//! ReducerTest::new(EventReducer::new())
//!     .with_env(test_environment())
//!     .given_state(EventState::default())
//!     .when_action(EventAction::LoadEvents)
//!     .then_state(|state| assert!(state.loading.events))
//!     .then_effects(assertions::assert_has_future_effect)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use eventos_core::environment::Clock;


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use eventos_testing::mocks::FixedClock;
    /// use eventos_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }
}

/// Install a `tracing` subscriber that writes through the test harness
///
/// Honors `RUST_LOG`. Safe to call from every test; only the first call
/// installs anything.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_tracing_init_is_idempotent() {
        init_test_tracing();
        init_test_tracing();
    }
}
