//! Backend configuration.
//!
//! Values are supplied by the application (see the app crate's
//! `Config::from_env`); nothing here reads the environment.

use std::time::Duration;

/// Settings shared by the remote repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Hosted project identifier, used to build setup links in error messages.
    pub project_id: String,

    /// Upper bound on the profile document write during sign-up.
    ///
    /// Default: 3 seconds
    pub profile_write_timeout: Duration,
}

impl BackendConfig {
    /// Create configuration for the given project.
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            profile_write_timeout: Duration::from_secs(3),
        }
    }

    /// Set the sign-up profile write timeout.
    #[must_use]
    pub const fn with_profile_write_timeout(mut self, timeout: Duration) -> Self {
        self.profile_write_timeout = timeout;
        self
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new("eventos-demo")
    }
}
