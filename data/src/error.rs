//! Error types for repository and backend operations.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Failure modes of the data layer.
///
/// `Display` output is what the view-state holders surface to the user, so
/// messages are phrased for people rather than logs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    // ═══════════════════════════════════════════════════════════
    // Lookup Errors
    // ═══════════════════════════════════════════════════════════

    /// A referenced record does not exist.
    #[error("{what} not found")]
    NotFound {
        /// Kind of record that was missing
        what: String,
    },

    /// Join was attempted on an event the hosted store has no record of,
    /// typically a built-in demo event.
    #[error("This event does not exist in the database. You can only join events created in the app.")]
    NotJoinable,

    // ═══════════════════════════════════════════════════════════
    // Backend Errors
    // ═══════════════════════════════════════════════════════════

    /// The hosted backend rejected or failed the request.
    #[error("{0}")]
    Backend(String),

    /// The operation cannot run with the configured backend.
    #[error("{0}")]
    Unavailable(String),

    /// The backend did not answer in time.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    // ═══════════════════════════════════════════════════════════
    // Input Errors
    // ═══════════════════════════════════════════════════════════

    /// Input failed validation before reaching the backend.
    #[error("{0}")]
    Validation(String),

    /// No user is signed in.
    #[error("User is not authenticated")]
    NotAuthenticated,

    // ═══════════════════════════════════════════════════════════
    // Internal Errors
    // ═══════════════════════════════════════════════════════════

    /// A stored document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Unexpected internal failure (poisoned lock and the like).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DataError {
    /// Shorthand for [`DataError::NotFound`].
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Replace raw backend failures with actionable setup guidance.
    ///
    /// Only [`DataError::Backend`] is rewritten; every other variant
    /// already carries a user-facing message.
    #[must_use]
    pub fn explained(self, project_id: &str) -> Self {
        match self {
            Self::Backend(message) => Self::Backend(explain_backend_error(&message, project_id)),
            other => other,
        }
    }

    pub(crate) fn lock_poisoned() -> Self {
        Self::Internal("Mutex lock failed".to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Translate a raw backend message into guidance the user can act on.
///
/// Recognizes a disabled API and an unprovisioned database; anything else
/// is returned unchanged.
#[must_use]
pub fn explain_backend_error(message: &str, project_id: &str) -> String {
    let lowered = message.to_lowercase();

    if lowered.contains("api has not been used") {
        format!(
            "The document store API is not enabled for this project. Enable it at \
             https://console.developers.google.com/apis/api/firestore.googleapis.com/overview?project={project_id} \
             and try again in a few minutes."
        )
    } else if lowered.contains("permission_denied") {
        "The document store API is not enabled for this project, or the security rules deny access. \
         Enable the API and check the rules, then try again."
            .to_string()
    } else if lowered.contains("not_found") || lowered.contains("does not exist") {
        format!(
            "The database has not been created for this project. Create it at \
             https://console.firebase.google.com/project/{project_id}/firestore and try again."
        )
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_api_points_at_console_with_project() {
        let explained = explain_backend_error(
            "PERMISSION_DENIED: Cloud Firestore API has not been used in project demo-123",
            "demo-123",
        );
        assert!(explained.contains("not enabled"));
        assert!(explained.contains("project=demo-123"));
    }

    #[test]
    fn permission_denied_mentions_enablement() {
        let explained = explain_backend_error("PERMISSION_DENIED: missing rights", "p");
        assert!(explained.contains("not enabled"));
        assert!(!explained.contains("PERMISSION_DENIED"));
    }

    #[test]
    fn missing_database_points_at_setup() {
        let explained = explain_backend_error("NOT_FOUND: The database (default) does not exist", "p1");
        assert!(explained.contains("has not been created"));
        assert!(explained.contains("project/p1/firestore"));
    }

    #[test]
    fn other_messages_pass_through() {
        assert_eq!(explain_backend_error("deadline exceeded", "p"), "deadline exceeded");
    }

    #[test]
    fn explained_only_rewrites_backend_errors() {
        let err = DataError::Validation("Title is required".into()).explained("p");
        assert_eq!(err, DataError::Validation("Title is required".into()));

        let err = DataError::Backend("does not exist".into()).explained("p");
        assert!(err.to_string().contains("has not been created"));
    }
}
