//! Backend service contracts.
//!
//! The remote repositories talk to three hosted services: a document store,
//! a blob store for images, and an identity provider. Each is a trait so the
//! hosted SDK binding and the in-memory test doubles are interchangeable.

use crate::error::Result;
use crate::model::UserId;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::future::Future;

/// A stored document: a JSON object keyed by field name.
pub type Document = Map<String, Value>;

// ═══════════════════════════════════════════════════════════════════════
// Queries
// ═══════════════════════════════════════════════════════════════════════

/// Sort direction for [`Query::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// Comparison used by a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Field equals the value.
    Equal,
    /// Field is strictly greater than the value.
    GreaterThan,
    /// Field is strictly less than the value.
    LessThan,
}

/// A single field predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// Field name.
    pub field: String,
    /// Comparison.
    pub op: FilterOp,
    /// Right-hand side.
    pub value: Value,
}

impl Filter {
    fn matches(&self, document: &Document) -> bool {
        let Some(actual) = document.get(&self.field) else {
            return false;
        };
        match self.op {
            FilterOp::Equal => actual == &self.value,
            FilterOp::GreaterThan => compare_values(actual, &self.value) == Some(Ordering::Greater),
            FilterOp::LessThan => compare_values(actual, &self.value) == Some(Ordering::Less),
        }
    }
}

/// A collection query: conjunctive filters plus optional ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// All filters must match.
    pub filters: Vec<Filter>,
    /// Field and direction to sort by.
    pub order_by: Option<(String, Direction)>,
}

impl Query {
    /// Match every document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_filter(mut self, field: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    /// Require `field == value`.
    #[must_use]
    pub fn where_eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.with_filter(field, FilterOp::Equal, value)
    }

    /// Require `field > value`.
    #[must_use]
    pub fn where_gt(self, field: &str, value: impl Into<Value>) -> Self {
        self.with_filter(field, FilterOp::GreaterThan, value)
    }

    /// Require `field < value`.
    #[must_use]
    pub fn where_lt(self, field: &str, value: impl Into<Value>) -> Self {
        self.with_filter(field, FilterOp::LessThan, value)
    }

    /// Sort results by `field`.
    #[must_use]
    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    /// Returns `true` if `document` satisfies every filter.
    #[must_use]
    pub fn matches(&self, document: &Document) -> bool {
        self.filters.iter().all(|filter| filter.matches(document))
    }

    /// Sort `documents` by the requested order, if any.
    ///
    /// Documents missing the field sort first, as in the hosted store.
    pub fn sort(&self, documents: &mut [Document]) {
        let Some((field, direction)) = &self.order_by else {
            return;
        };
        documents.sort_by(|a, b| {
            let ordering = match (a.get(field), b.get(field)) {
                (Some(a), Some(b)) => compare_values(a, b).unwrap_or(Ordering::Equal),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            match direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Services
// ═══════════════════════════════════════════════════════════════════════

/// Hosted document database.
///
/// Collections hold documents addressed by id.
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn get(&self, collection: &str, id: &str) -> impl Future<Output = Result<Option<Document>>> + Send;

    /// Create or replace a document.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn set(&self, collection: &str, id: &str, document: Document) -> impl Future<Output = Result<()>> + Send;

    /// Merge `fields` into an existing document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DataError::NotFound`] if the document does not exist.
    fn update(&self, collection: &str, id: &str, fields: Document) -> impl Future<Output = Result<()>> + Send;

    /// Delete a document. Deleting a missing document is not an error.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn delete(&self, collection: &str, id: &str) -> impl Future<Output = Result<()>> + Send;

    /// Run a query against a collection.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable.
    fn query(&self, collection: &str, query: Query) -> impl Future<Output = Result<Vec<Document>>> + Send;

    /// Read-modify-write one document atomically.
    ///
    /// `apply` sees the current document (or `None`) and returns the fields
    /// to merge, or `None` to leave the document untouched. An error from
    /// `apply` aborts the transaction and is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns error if the store is unreachable or `apply` fails.
    fn transaction<F>(&self, collection: &str, id: &str, apply: F) -> impl Future<Output = Result<()>> + Send
    where
        F: FnOnce(Option<Document>) -> Result<Option<Document>> + Send + 'static;
}

/// Hosted blob storage for images.
pub trait BlobStorage: Send + Sync {
    /// Store `bytes` at `path` and return a retrievable URL.
    ///
    /// # Errors
    ///
    /// Returns error if the upload fails.
    fn upload(&self, path: &str, bytes: Vec<u8>) -> impl Future<Output = Result<String>> + Send;
}

/// The identity provider's view of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Provider uid.
    pub uid: UserId,
    /// Sign-in email, if the provider knows one.
    pub email: Option<String>,
    /// Display name, if set.
    pub display_name: Option<String>,
    /// Avatar URL, if set.
    pub photo_url: Option<String>,
}

/// Changes to the provider-side profile. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChange {
    /// New display name.
    pub display_name: Option<String>,
    /// New avatar URL.
    pub photo_url: Option<String>,
}

/// Hosted identity provider.
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, if any.
    fn current_user(&self) -> Option<AuthUser>;

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns error for unknown accounts or wrong passwords.
    fn sign_in_with_email(&self, email: &str, password: &str) -> impl Future<Output = Result<AuthUser>> + Send;

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns error if the email is taken or the password is rejected.
    fn create_user_with_email(&self, email: &str, password: &str) -> impl Future<Output = Result<AuthUser>> + Send;

    /// Sign in with a federated provider's id token.
    ///
    /// # Errors
    ///
    /// Returns error if the token is rejected.
    fn sign_in_with_credential(&self, id_token: &str) -> impl Future<Output = Result<AuthUser>> + Send;

    /// Update the signed-in user's provider profile.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DataError::NotAuthenticated`] without a session.
    fn update_profile(&self, change: ProfileChange) -> impl Future<Output = Result<AuthUser>> + Send;

    /// Change the signed-in user's password.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DataError::NotAuthenticated`] without a session.
    fn update_password(&self, new_password: &str) -> impl Future<Output = Result<()>> + Send;

    /// End the session.
    fn sign_out(&self);
}
