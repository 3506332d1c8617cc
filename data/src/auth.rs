//! Account and profile operations.
//!
//! Combines the identity provider (sessions and credentials) with the
//! `users` collection (profile documents) and blob storage (avatars).

use crate::backend::{AuthUser, BlobStorage, Document, DocumentStore, IdentityProvider, ProfileChange};
use crate::config::BackendConfig;
use crate::error::{DataError, Result};
use crate::model::User;
use crate::repository::{field, from_document, profile_image_path, to_document, USERS};
use chrono::{DateTime, Utc};
use eventos_core::environment::Clock;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// Name shown for users who never set one.
pub const DEFAULT_USER_NAME: &str = "User";

/// Build a profile from what the identity provider knows.
#[must_use]
pub fn fallback_profile(auth: &AuthUser, created_at: DateTime<Utc>) -> User {
    User {
        id: auth.uid.clone(),
        email: auth.email.clone().unwrap_or_default(),
        name: auth
            .display_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_NAME.to_string()),
        photo_url: auth.photo_url.clone(),
        created_at,
    }
}

/// Sign-in, sign-up and profile maintenance.
#[derive(Clone)]
pub struct AuthRepository<I, D, B> {
    identity: I,
    documents: D,
    blobs: B,
    clock: Arc<dyn Clock>,
    config: BackendConfig,
}

impl<I, D, B> AuthRepository<I, D, B>
where
    I: IdentityProvider,
    D: DocumentStore,
    B: BlobStorage,
{
    /// Create a repository over the given services.
    #[must_use]
    pub fn new(identity: I, documents: D, blobs: B, clock: Arc<dyn Clock>, config: BackendConfig) -> Self {
        Self {
            identity,
            documents,
            blobs,
            clock,
            config,
        }
    }

    fn explain(&self, err: DataError) -> DataError {
        err.explained(&self.config.project_id)
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<AuthUser> {
        self.identity.current_user()
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the provider's error for bad credentials.
    pub fn sign_in_with_email(&self, email: &str, password: &str) -> impl Future<Output = Result<AuthUser>> + Send {
        async move { self.identity.sign_in_with_email(email, password).await }
    }

    /// Create an account, then best-effort set its display name and write
    /// its profile document.
    ///
    /// Only account creation can fail the call. The profile write is bounded
    /// by [`BackendConfig::profile_write_timeout`].
    ///
    /// # Errors
    ///
    /// Returns the provider's error if the account cannot be created.
    pub fn sign_up_with_email(&self, email: &str, password: &str, name: &str) -> impl Future<Output = Result<AuthUser>> + Send {
        async move {
            let created = self.identity.create_user_with_email(email, password).await?;

            let change = ProfileChange {
                display_name: Some(name.to_string()),
                photo_url: None,
            };
            let user = match self.identity.update_profile(change).await {
                Ok(updated) => updated,
                Err(err) => {
                    warn!(uid = %created.uid, error = %err, "Could not set display name after sign-up");
                    created
                },
            };

            let profile = User {
                id: user.uid.clone(),
                email: email.to_string(),
                name: name.to_string(),
                photo_url: None,
                created_at: self.clock.now(),
            };
            let timeout = self.config.profile_write_timeout;
            match tokio::time::timeout(timeout, self.save_profile(&profile)).await {
                Ok(Ok(())) => debug!(uid = %user.uid, "Profile document written"),
                Ok(Err(err)) => warn!(uid = %user.uid, error = %err, "Profile document write failed"),
                Err(_) => warn!(uid = %user.uid, ?timeout, "Profile document write timed out"),
            }

            Ok(user)
        }
    }

    /// Sign in with a federated id token, creating the profile document on
    /// first sign-in.
    ///
    /// # Errors
    ///
    /// Returns error if the token is rejected or the profile cannot be read
    /// or created.
    pub fn sign_in_with_federated_token(&self, id_token: &str) -> impl Future<Output = Result<AuthUser>> + Send {
        async move {
            let user = self.identity.sign_in_with_credential(id_token).await?;
            let existing = self
                .documents
                .get(USERS, user.uid.as_str())
                .await
                .map_err(|err| self.explain(err))?;
            if existing.is_none() {
                let profile = fallback_profile(&user, self.clock.now());
                self.save_profile(&profile).await?;
                debug!(uid = %user.uid, "Profile created on first federated sign-in");
            }
            Ok(user)
        }
    }

    /// The signed-in user's profile.
    ///
    /// Falls back to the provider's view of the user when the profile
    /// document is missing or unreadable. `None` when nobody is signed in.
    pub fn current_profile(&self) -> impl Future<Output = Option<User>> + Send {
        async move {
            let auth = self.identity.current_user()?;
            let stored = match self.documents.get(USERS, auth.uid.as_str()).await {
                Ok(Some(document)) => from_document::<User>(document)
                    .inspect_err(|err| warn!(uid = %auth.uid, error = %err, "Malformed profile document"))
                    .ok(),
                Ok(None) => None,
                Err(err) => {
                    warn!(uid = %auth.uid, error = %err, "Could not load profile document");
                    None
                },
            };
            Some(stored.unwrap_or_else(|| fallback_profile(&auth, self.clock.now())))
        }
    }

    /// Change the display name and/or avatar, then return the stored profile.
    ///
    /// The profile document is created if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotAuthenticated`] without a session, or the
    /// first failing upload or write.
    pub fn update_profile(&self, name: Option<String>, photo: Option<Vec<u8>>) -> impl Future<Output = Result<User>> + Send {
        async move {
            let auth = self.identity.current_user().ok_or(DataError::NotAuthenticated)?;

            let photo_url = match photo {
                Some(bytes) => Some(self.blobs.upload(&profile_image_path(&auth.uid), bytes).await?),
                None => None,
            };

            self.identity
                .update_profile(ProfileChange {
                    display_name: name.clone(),
                    photo_url: photo_url.clone(),
                })
                .await?;

            let uid = auth.uid.as_str();
            let existing = self.documents.get(USERS, uid).await.map_err(|err| self.explain(err))?;
            if existing.is_some() {
                let mut fields = Document::new();
                if let Some(name) = &name {
                    fields.extend(field("name", name)?);
                }
                if let Some(url) = &photo_url {
                    fields.extend(field("photoUrl", url)?);
                }
                if !fields.is_empty() {
                    self.documents
                        .update(USERS, uid, fields)
                        .await
                        .map_err(|err| self.explain(err))?;
                }
            } else {
                let mut profile = fallback_profile(&auth, self.clock.now());
                if let Some(name) = name {
                    profile.name = name;
                }
                if photo_url.is_some() {
                    profile.photo_url = photo_url;
                }
                self.save_profile(&profile).await?;
            }

            self.documents
                .get(USERS, uid)
                .await
                .map_err(|err| self.explain(err))?
                .map(from_document)
                .transpose()?
                .ok_or_else(|| DataError::not_found("Profile"))
        }
    }

    /// Change the signed-in user's password.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NotAuthenticated`] without a session, or the
    /// provider's error.
    pub fn update_password(&self, new_password: &str) -> impl Future<Output = Result<()>> + Send {
        async move {
            if self.identity.current_user().is_none() {
                return Err(DataError::NotAuthenticated);
            }
            self.identity.update_password(new_password).await
        }
    }

    /// End the session.
    pub fn sign_out(&self) {
        self.identity.sign_out();
    }

    async fn save_profile(&self, profile: &User) -> Result<()> {
        let document = to_document(profile)?;
        self.documents
            .set(USERS, profile.id.as_str(), document)
            .await
            .map_err(|err| self.explain(err))
    }
}
