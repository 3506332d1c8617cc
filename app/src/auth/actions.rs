//! Session screen actions.

use eventos_data::backend::AuthUser;
use eventos_data::User;

/// Actions handled by [`super::AuthReducer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    // ========== Commands ==========
    /// Pick up an existing session on startup.
    CheckSession,
    /// Sign in with email and password.
    SignInWithEmail {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
    },
    /// Create an email account.
    SignUpWithEmail {
        /// Account email.
        email: String,
        /// Account password.
        password: String,
        /// Display name.
        name: String,
    },
    /// Exchange a federated provider's id token for a session.
    SignInWithFederatedToken {
        /// Provider-issued id token.
        id_token: String,
    },
    /// Refresh the signed-in user's profile.
    LoadProfile,
    /// Change display name and/or avatar.
    UpdateProfile {
        /// New display name.
        name: Option<String>,
        /// Encoded avatar image.
        photo: Option<Vec<u8>>,
    },
    /// Change the password.
    UpdatePassword {
        /// New password.
        new_password: String,
    },
    /// End the session.
    SignOut,
    /// Dismiss the error banner.
    ClearError,
    /// Dismiss the confirmation banner.
    ClearInfo,

    // ========== Outcomes ==========
    /// Email or federated sign-in finished.
    SignedIn {
        /// Provider user or error message.
        result: Result<AuthUser, String>,
    },
    /// Sign-up finished.
    SignedUp {
        /// Email signed up with.
        email: String,
        /// Name signed up with.
        name: String,
        /// Provider user or error message.
        result: Result<AuthUser, String>,
    },
    /// Profile fetch finished. `None` when nobody is signed in.
    ProfileLoaded {
        /// Stored or fallback profile.
        profile: Option<User>,
    },
    /// Profile change finished.
    ProfileUpdated {
        /// Stored profile or error message.
        result: Result<User, String>,
    },
    /// Password change finished.
    PasswordUpdated {
        /// Error message on failure.
        result: Result<(), String>,
    },
}
