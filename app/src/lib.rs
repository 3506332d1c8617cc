//! # Eventos App
//!
//! View-state holders for the Eventos client.
//!
//! Each screen family is a reducer run by an [`eventos_runtime::Store`]:
//!
//! - [`events`]: event lists, details, create/edit, attendance, comments and
//!   ratings, with optimistic updates and demo-event fallback
//! - [`auth`]: session, sign-up, and profile maintenance
//!
//! [`config::Config`] reads the backend selection and tuning knobs from the
//! environment.
//!
//! ## Example
//!
//! ```no_run
//! use eventos_app::events::{EventAction, EventEnvironment, EventReducer, EventState};
//! use eventos_core::environment::SystemClock;
//! use eventos_data::LocalEventRepository;
//! use eventos_runtime::Store;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let clock = Arc::new(SystemClock);
//! let environment = EventEnvironment::new(LocalEventRepository::new(clock.clone()), clock);
//! let store = Store::new(EventState::default(), EventReducer::new(), environment);
//!
//! store.send(EventAction::LoadUpcomingEvents).await?.wait().await;
//! let upcoming = store.state(|s| s.upcoming_events.len()).await;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod events;
