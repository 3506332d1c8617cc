//! Event list, details and edit screens.

mod actions;
mod environment;
mod reducer;
mod state;

pub use actions::{EventAction, Membership};
pub use environment::EventEnvironment;
pub use reducer::EventReducer;
pub use state::{resolve_list, EventList, EventState, LoadingFlags};
