//! In-memory identity provider.

use super::FailureSwitch;
use crate::backend::{AuthUser, IdentityProvider, ProfileChange};
use crate::error::{DataError, Result};
use crate::model::UserId;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Account {
    user: AuthUser,
    password: Option<String>,
}

#[derive(Debug, Default)]
struct Accounts {
    by_uid: HashMap<UserId, Account>,
    federated: HashMap<String, UserId>,
    current: Option<UserId>,
}

impl Accounts {
    fn by_email(&self, email: &str) -> Option<&Account> {
        self.by_uid
            .values()
            .find(|account| account.user.email.as_deref() == Some(email))
    }

    fn current_mut(&mut self) -> Result<&mut Account> {
        let uid = self.current.clone().ok_or(DataError::NotAuthenticated)?;
        self.by_uid.get_mut(&uid).ok_or(DataError::NotAuthenticated)
    }
}

/// Identity provider holding accounts in memory.
///
/// Clones share accounts and the signed-in session.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityProvider {
    accounts: Arc<Mutex<Accounts>>,
    failures: FailureSwitch,
}

impl MemoryIdentityProvider {
    /// Minimum password length accepted on sign-up.
    pub const MIN_PASSWORD_LEN: usize = 6;

    /// Create a provider with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an email account without signing it in.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn with_account(self, email: &str, password: &str, display_name: Option<&str>) -> Result<Self> {
        let user = AuthUser {
            uid: UserId::generate(),
            email: Some(email.to_string()),
            display_name: display_name.map(str::to_string),
            photo_url: None,
        };
        self.lock()?.by_uid.insert(
            user.uid.clone(),
            Account {
                user,
                password: Some(password.to_string()),
            },
        );
        Ok(self)
    }

    /// Accept `id_token` as a federated credential for `user`.
    ///
    /// # Errors
    ///
    /// Returns error if lock is poisoned.
    pub fn with_federated_token(self, id_token: &str, user: AuthUser) -> Result<Self> {
        {
            let mut accounts = self.lock()?;
            accounts.federated.insert(id_token.to_string(), user.uid.clone());
            accounts.by_uid.insert(user.uid.clone(), Account { user, password: None });
        }
        Ok(self)
    }

    /// Make every call fail with `message`.
    pub fn fail_with(&self, message: &str) {
        self.failures.fail(None, message);
    }

    /// Make only `operation` fail with `message`
    /// (e.g. `"update_profile"`).
    pub fn fail_operation(&self, operation: &str, message: &str) {
        self.failures.fail(Some(operation), message);
    }

    /// Clear injected failures.
    pub fn recover(&self) {
        self.failures.recover();
    }

    /// Stored password of the account registered under `email`.
    #[must_use]
    pub fn password_of(&self, email: &str) -> Option<String> {
        self.accounts.lock().ok()?.by_email(email)?.password.clone()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Accounts>> {
        self.accounts.lock().map_err(|_| DataError::lock_poisoned())
    }

    fn run<T>(&self, operation: &str, f: impl FnOnce(&mut Accounts) -> Result<T>) -> Result<T> {
        self.failures.check(operation)?;
        f(&mut *self.lock()?)
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    fn current_user(&self) -> Option<AuthUser> {
        let accounts = self.accounts.lock().ok()?;
        let uid = accounts.current.as_ref()?;
        accounts.by_uid.get(uid).map(|account| account.user.clone())
    }

    fn sign_in_with_email(&self, email: &str, password: &str) -> impl Future<Output = Result<AuthUser>> + Send {
        let result = self.run("sign_in_with_email", |accounts| {
            let account = accounts
                .by_email(email)
                .ok_or_else(|| DataError::Backend("There is no user record corresponding to this identifier.".to_string()))?;
            if account.password.as_deref() != Some(password) {
                return Err(DataError::Backend(
                    "The password is invalid or the user does not have a password.".to_string(),
                ));
            }
            let user = account.user.clone();
            accounts.current = Some(user.uid.clone());
            Ok(user)
        });
        async move { result }
    }

    fn create_user_with_email(&self, email: &str, password: &str) -> impl Future<Output = Result<AuthUser>> + Send {
        let result = self.run("create_user_with_email", |accounts| {
            if accounts.by_email(email).is_some() {
                return Err(DataError::Backend(
                    "The email address is already in use by another account.".to_string(),
                ));
            }
            if password.len() < Self::MIN_PASSWORD_LEN {
                return Err(DataError::Backend(
                    "The given password is invalid. [ Password should be at least 6 characters ]".to_string(),
                ));
            }
            let user = AuthUser {
                uid: UserId::generate(),
                email: Some(email.to_string()),
                display_name: None,
                photo_url: None,
            };
            accounts.by_uid.insert(
                user.uid.clone(),
                Account {
                    user: user.clone(),
                    password: Some(password.to_string()),
                },
            );
            accounts.current = Some(user.uid.clone());
            Ok(user)
        });
        async move { result }
    }

    fn sign_in_with_credential(&self, id_token: &str) -> impl Future<Output = Result<AuthUser>> + Send {
        let result = self.run("sign_in_with_credential", |accounts| {
            let uid = accounts
                .federated
                .get(id_token)
                .cloned()
                .ok_or_else(|| DataError::Backend("The supplied auth credential is malformed or has expired.".to_string()))?;
            let user = accounts
                .by_uid
                .get(&uid)
                .map(|account| account.user.clone())
                .ok_or_else(|| DataError::not_found("User"))?;
            accounts.current = Some(uid);
            Ok(user)
        });
        async move { result }
    }

    fn update_profile(&self, change: ProfileChange) -> impl Future<Output = Result<AuthUser>> + Send {
        let result = self.run("update_profile", |accounts| {
            let account = accounts.current_mut()?;
            if let Some(name) = change.display_name {
                account.user.display_name = Some(name);
            }
            if let Some(url) = change.photo_url {
                account.user.photo_url = Some(url);
            }
            Ok(account.user.clone())
        });
        async move { result }
    }

    fn update_password(&self, new_password: &str) -> impl Future<Output = Result<()>> + Send {
        let result = self.run("update_password", |accounts| {
            accounts.current_mut()?.password = Some(new_password.to_string());
            Ok(())
        });
        async move { result }
    }

    fn sign_out(&self) {
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.current = None;
        }
    }
}
