//! Session reducer.
//!
//! # Flow
//!
//! 1. `CheckSession` on startup, or one of the sign-in commands
//! 2. On success mark the session authenticated
//! 3. Load the profile in the background (`LoadProfile`)
//!
//! Sign-up installs a minimal profile right away so the UI can move on
//! while the stored profile loads.

use super::actions::AuthAction;
use super::environment::AuthEnvironment;
use super::state::AuthState;
use eventos_core::effect::Effect;
use eventos_core::reducer::Reducer;
use eventos_core::{smallvec, SmallVec};
use eventos_data::backend::{BlobStorage, DocumentStore, IdentityProvider};
use eventos_data::User;
use tracing::debug;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

type Effects = SmallVec<[Effect<AuthAction>; 4]>;

/// Reducer behind the sign-in, sign-up and profile screens.
#[derive(Debug, Clone)]
pub struct AuthReducer<I, D, B> {
    _phantom: std::marker::PhantomData<(I, D, B)>,
}

impl<I, D, B> AuthReducer<I, D, B> {
    /// Create a new auth reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<I, D, B> Default for AuthReducer<I, D, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, D, B> AuthReducer<I, D, B>
where
    I: IdentityProvider + Clone + 'static,
    D: DocumentStore + Clone + 'static,
    B: BlobStorage + Clone + 'static,
{
    fn reject(state: &mut AuthState, message: impl Into<String>) -> Effects {
        state.error_message = Some(message.into());
        smallvec![Effect::None]
    }

    fn start(state: &mut AuthState) {
        state.is_loading = true;
        state.error_message = None;
        state.info_message = None;
    }

    fn load_profile(env: &AuthEnvironment<I, D, B>) -> Effect<AuthAction> {
        let repository = env.repository.clone();
        Effect::task(async move {
            AuthAction::ProfileLoaded {
                profile: repository.current_profile().await,
            }
        })
    }
}

impl<I, D, B> Reducer for AuthReducer<I, D, B>
where
    I: IdentityProvider + Clone + 'static,
    D: DocumentStore + Clone + 'static,
    B: BlobStorage + Clone + 'static,
{
    type State = AuthState;
    type Action = AuthAction;
    type Environment = AuthEnvironment<I, D, B>;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Session
            // ═══════════════════════════════════════════════════════════════
            AuthAction::CheckSession => {
                if env.repository.current_user().is_some() {
                    state.is_authenticated = true;
                    smallvec![Self::load_profile(env)]
                } else {
                    state.is_authenticated = false;
                    state.current_user = None;
                    smallvec![Effect::None]
                }
            },

            AuthAction::SignInWithEmail { email, password } => {
                if email.trim().is_empty() || password.is_empty() {
                    return Self::reject(state, "Email and password are required");
                }
                Self::start(state);
                let repository = env.repository.clone();

                smallvec![Effect::task(async move {
                    let result = repository
                        .sign_in_with_email(email.trim(), &password)
                        .await
                        .map_err(|err| err.to_string());
                    AuthAction::SignedIn { result }
                })]
            },

            AuthAction::SignInWithFederatedToken { id_token } => {
                Self::start(state);
                let repository = env.repository.clone();

                smallvec![Effect::task(async move {
                    let result = repository
                        .sign_in_with_federated_token(&id_token)
                        .await
                        .map_err(|err| err.to_string());
                    AuthAction::SignedIn { result }
                })]
            },

            AuthAction::SignUpWithEmail {
                email,
                password,
                name,
            } => {
                if email.trim().is_empty() || name.trim().is_empty() {
                    return Self::reject(state, "Name and email are required");
                }
                if password.chars().count() < MIN_PASSWORD_LEN {
                    return Self::reject(state, "Password must be at least 6 characters");
                }
                Self::start(state);
                let repository = env.repository.clone();

                smallvec![Effect::task(async move {
                    let email = email.trim().to_string();
                    let name = name.trim().to_string();
                    let result = repository
                        .sign_up_with_email(&email, &password, &name)
                        .await
                        .map_err(|err| err.to_string());
                    AuthAction::SignedUp {
                        email,
                        name,
                        result,
                    }
                })]
            },

            AuthAction::SignedIn { result } => {
                state.is_loading = false;
                match result {
                    Ok(user) => {
                        debug!(uid = %user.uid, "Signed in");
                        state.is_authenticated = true;
                        smallvec![Self::load_profile(env)]
                    },
                    Err(err) => Self::reject(state, err),
                }
            },

            AuthAction::SignedUp {
                email,
                name,
                result,
            } => {
                state.is_loading = false;
                match result {
                    Ok(user) => {
                        debug!(uid = %user.uid, "Signed up");
                        state.is_authenticated = true;
                        state.current_user = Some(User {
                            id: user.uid,
                            email,
                            name,
                            photo_url: None,
                            created_at: env.clock.now(),
                        });
                        state.info_message = Some("Registration successful!".to_string());
                        smallvec![Self::load_profile(env)]
                    },
                    Err(err) => Self::reject(state, err),
                }
            },

            AuthAction::SignOut => {
                *state = AuthState::default();
                let repository = env.repository.clone();
                smallvec![Effect::Future(Box::pin(async move {
                    repository.sign_out();
                    None
                }))]
            },

            // ═══════════════════════════════════════════════════════════════
            // Profile
            // ═══════════════════════════════════════════════════════════════
            AuthAction::LoadProfile => smallvec![Self::load_profile(env)],

            AuthAction::ProfileLoaded { profile } => {
                // Ignore profiles that arrive after sign-out.
                if let Some(profile) = profile.filter(|_| state.is_authenticated) {
                    state.current_user = Some(profile);
                }
                smallvec![Effect::None]
            },

            AuthAction::UpdateProfile { name, photo } => {
                if name.as_ref().is_some_and(|name| name.trim().is_empty()) {
                    return Self::reject(state, "Name cannot be empty");
                }
                Self::start(state);
                let repository = env.repository.clone();

                smallvec![Effect::task(async move {
                    let name = name.map(|name| name.trim().to_string());
                    let result = repository
                        .update_profile(name, photo)
                        .await
                        .map_err(|err| err.to_string());
                    AuthAction::ProfileUpdated { result }
                })]
            },

            AuthAction::ProfileUpdated { result } => {
                state.is_loading = false;
                match result {
                    Ok(profile) => {
                        state.current_user = Some(profile);
                        state.info_message = Some("Profile updated successfully".to_string());
                        smallvec![Effect::None]
                    },
                    Err(err) => Self::reject(state, format!("Failed to update profile: {err}")),
                }
            },

            AuthAction::UpdatePassword { new_password } => {
                if new_password.chars().count() < MIN_PASSWORD_LEN {
                    return Self::reject(state, "Password must be at least 6 characters");
                }
                Self::start(state);
                let repository = env.repository.clone();

                smallvec![Effect::task(async move {
                    let result = repository
                        .update_password(&new_password)
                        .await
                        .map_err(|err| err.to_string());
                    AuthAction::PasswordUpdated { result }
                })]
            },

            AuthAction::PasswordUpdated { result } => {
                state.is_loading = false;
                match result {
                    Ok(()) => {
                        state.info_message = Some("Password updated successfully".to_string());
                        smallvec![Effect::None]
                    },
                    Err(err) => Self::reject(state, format!("Failed to update password: {err}")),
                }
            },

            // ═══════════════════════════════════════════════════════════════
            // Banners
            // ═══════════════════════════════════════════════════════════════
            AuthAction::ClearError => {
                state.error_message = None;
                smallvec![Effect::None]
            },

            AuthAction::ClearInfo => {
                state.info_message = None;
                smallvec![Effect::None]
            },
        }
    }
}
