//! Sign-in, sign-up and profile screens.

mod actions;
mod environment;
mod reducer;
mod state;

pub use actions::AuthAction;
pub use environment::AuthEnvironment;
pub use reducer::{AuthReducer, MIN_PASSWORD_LEN};
pub use state::AuthState;
