//! Session screen state.

use eventos_data::User;

/// Everything the sign-in and profile screens render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    /// A sign-in, sign-up or profile change is in flight.
    pub is_loading: bool,
    /// The identity provider has a current user.
    pub is_authenticated: bool,
    /// Profile of the signed-in user.
    pub current_user: Option<User>,
    /// Error banner.
    pub error_message: Option<String>,
    /// Confirmation banner.
    pub info_message: Option<String>,
}
