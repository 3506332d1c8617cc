//! # Eventos Data
//!
//! Storage for the Eventos client: events, comments, ratings and user
//! profiles.
//!
//! - [`EventRepository`] is the contract the event screens depend on, with a
//!   hosted ([`RemoteEventRepository`]) and an in-process
//!   ([`LocalEventRepository`]) implementation.
//! - [`AuthRepository`] covers sign-in, sign-up and profile maintenance.
//! - [`backend`] defines the hosted services as traits; [`mocks`] provides
//!   in-memory versions of them.
//! - [`SampleCatalog`] holds the built-in demo events.
//!
//! ## Example
//!
//! ```
//! use eventos_core::environment::SystemClock;
//! use eventos_data::{EventRepository, LocalEventRepository};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let repository = LocalEventRepository::new(Arc::new(SystemClock));
//! let upcoming = repository.upcoming_events().await?;
//! assert_eq!(upcoming.len(), 2);
//! # Ok::<(), eventos_data::DataError>(())
//! # });
//! ```

pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod samples;

#[cfg(feature = "test-utils")]
pub mod mocks;

pub use auth::AuthRepository;
pub use config::BackendConfig;
pub use error::{DataError, Result};
pub use model::{
    Comment, CommentId, Event, EventDraft, EventId, Rating, RatingId, RatingSummary, User, UserId,
};
pub use repository::{EventRepository, LocalEventRepository, RemoteEventRepository};
pub use samples::SampleCatalog;
