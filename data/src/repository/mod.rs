//! Event repository contract and its two implementations.
//!
//! - [`RemoteEventRepository`]: hosted document store plus blob storage
//! - [`LocalEventRepository`]: in-process lists seeded with the demo events
//!
//! View-state holders depend only on [`EventRepository`] and receive one
//! implementation at construction.

mod local;
mod remote;

pub use local::LocalEventRepository;
pub use remote::RemoteEventRepository;

use crate::error::Result;
use crate::model::{Comment, CommentId, Event, EventDraft, EventId, Rating, RatingId, UserId};
use std::future::Future;

/// Collection holding event documents.
pub const EVENTS: &str = "events";
/// Collection holding comment documents.
pub const COMMENTS: &str = "comments";
/// Collection holding rating documents.
pub const RATINGS: &str = "ratings";
/// Collection holding user profile documents.
pub const USERS: &str = "users";

/// Storage path of an event's cover image.
#[must_use]
pub fn event_image_path(event_id: &EventId) -> String {
    format!("event_images/{event_id}.jpg")
}

/// Storage path of a user's avatar.
#[must_use]
pub fn profile_image_path(user_id: &UserId) -> String {
    format!("profile_images/{user_id}.jpg")
}

/// Everything the event screens need from storage.
///
/// Lists are returned in display order: all and upcoming events ascending by
/// date, past events descending, comments newest first.
pub trait EventRepository: Clone + Send + Sync + 'static {
    /// Persist a new event and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn create_event(&self, event: Event) -> impl Future<Output = Result<EventId>> + Send;

    /// All events, ascending by date.
    ///
    /// # Errors
    ///
    /// Returns error if the read fails.
    fn events(&self) -> impl Future<Output = Result<Vec<Event>>> + Send;

    /// Events dated strictly after now, ascending.
    ///
    /// # Errors
    ///
    /// Returns error if the read fails.
    fn upcoming_events(&self) -> impl Future<Output = Result<Vec<Event>>> + Send;

    /// Events dated strictly before now, most recent first.
    ///
    /// # Errors
    ///
    /// Returns error if the read fails.
    fn past_events(&self) -> impl Future<Output = Result<Vec<Event>>> + Send;

    /// One event, `None` if unknown.
    ///
    /// # Errors
    ///
    /// Returns error if the read fails.
    fn event(&self, event_id: &EventId) -> impl Future<Output = Result<Option<Event>>> + Send;

    /// Add `user_id` to the attendees. Joining twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns error if the event does not exist or the write fails.
    fn join_event(&self, event_id: &EventId, user_id: &UserId) -> impl Future<Output = Result<()>> + Send;

    /// Remove `user_id` from the attendees. Leaving as a non-member is a no-op.
    ///
    /// # Errors
    ///
    /// Returns error if the event does not exist or the write fails.
    fn leave_event(&self, event_id: &EventId, user_id: &UserId) -> impl Future<Output = Result<()>> + Send;

    /// Persist a comment and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn add_comment(&self, comment: Comment) -> impl Future<Output = Result<CommentId>> + Send;

    /// Comments on an event, newest first.
    ///
    /// # Errors
    ///
    /// Returns error if the read fails.
    fn comments(&self, event_id: &EventId) -> impl Future<Output = Result<Vec<Comment>>> + Send;

    /// Record a rating, replacing the author's previous one for the same
    /// event, and refresh the event's rating aggregate.
    ///
    /// A failed aggregate refresh is logged and does not fail the call.
    ///
    /// # Errors
    ///
    /// Returns error if the rating itself cannot be stored.
    fn add_rating(&self, rating: Rating) -> impl Future<Output = Result<RatingId>> + Send;

    /// The rating `user_id` gave `event_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns error if the read fails.
    fn user_rating(&self, event_id: &EventId, user_id: &UserId) -> impl Future<Output = Result<Option<Rating>>> + Send;

    /// Upload a cover image and return its URL.
    ///
    /// # Errors
    ///
    /// Returns error if the upload fails or uploads are unsupported.
    fn upload_event_image(&self, event_id: &EventId, image: Vec<u8>) -> impl Future<Output = Result<String>> + Send;

    /// Point an event at an uploaded cover image.
    ///
    /// # Errors
    ///
    /// Returns error if the write fails.
    fn set_event_image(&self, event_id: &EventId, image_url: &str) -> impl Future<Output = Result<()>> + Send;

    /// Overwrite an event's editable fields.
    ///
    /// # Errors
    ///
    /// Returns error if the event does not exist or the write fails.
    fn update_event(&self, event_id: &EventId, draft: &EventDraft) -> impl Future<Output = Result<()>> + Send;
}

// ═══════════════════════════════════════════════════════════════════════
// Document codec
// ═══════════════════════════════════════════════════════════════════════

use crate::backend::Document;
use crate::error::DataError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Encode a record as a document.
pub(crate) fn to_document<T: Serialize>(record: &T) -> Result<Document> {
    match serde_json::to_value(record)? {
        Value::Object(document) => Ok(document),
        other => Err(DataError::Serialization(format!("expected an object, got {other}"))),
    }
}

/// Decode a document into a record.
pub(crate) fn from_document<T: DeserializeOwned>(document: Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(document))?)
}

/// Decode every document, skipping (and logging) the malformed ones.
pub(crate) fn decode_all<T: DeserializeOwned>(collection: &str, documents: Vec<Document>) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|document| match from_document(document) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(collection, error = %err, "Skipping malformed document");
                None
            },
        })
        .collect()
}

/// A single-field document, for partial updates.
pub(crate) fn field(name: &str, value: impl Serialize) -> Result<Document> {
    let mut document = Document::new();
    document.insert(name.to_string(), serde_json::to_value(value)?);
    Ok(document)
}
