//! Domain records: events, comments, ratings and user profiles.
//!
//! Records serialize to the camelCase document shape the hosted store
//! expects. Dates travel as epoch milliseconds.

use crate::error::{DataError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Borrow the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns `true` if no identifier has been assigned yet.
            #[must_use]
            pub fn is_unassigned(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifier of an event document.
    EventId
);
string_id!(
    /// Identifier of a user (the identity provider's uid).
    UserId
);
string_id!(
    /// Identifier of a comment document.
    CommentId
);
string_id!(
    /// Identifier of a rating document.
    RatingId
);

// ═══════════════════════════════════════════════════════════════════════
// Events
// ═══════════════════════════════════════════════════════════════════════

/// A community event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Document id; empty until the repository assigns one.
    #[serde(default)]
    pub id: EventId,
    /// Title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// When the event happens. Drives the upcoming/past partition.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    /// Human-readable start time, e.g. "10:00 AM".
    pub time: String,
    /// Where it happens.
    pub location: String,
    /// Creator's user id.
    pub organizer_id: UserId,
    /// Display name shown for the organizer.
    pub organizer_name: String,
    /// Creation timestamp.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Attending users, without duplicates.
    #[serde(default)]
    pub attendees: Vec<UserId>,
    /// Cover image location, if one was uploaded.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Mean of all ratings, `0.0` when unrated.
    #[serde(default)]
    pub average_rating: f64,
    /// Number of ratings behind `average_rating`.
    #[serde(default)]
    pub total_ratings: u32,
}

impl Event {
    /// Build a new, unsaved event from user input.
    #[must_use]
    pub fn from_draft(draft: EventDraft, organizer_id: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: EventId::default(),
            title: draft.title,
            description: draft.description,
            date: draft.date,
            time: draft.time,
            location: draft.location,
            organizer_id,
            organizer_name: draft.organizer_name,
            created_at,
            attendees: Vec::new(),
            image_url: None,
            average_rating: 0.0,
            total_ratings: 0,
        }
    }

    /// Returns `true` if `user` is in the attendee list.
    #[must_use]
    pub fn is_attending(&self, user: &UserId) -> bool {
        self.attendees.contains(user)
    }

    /// Add `user` to the attendees. Returns `false` if already attending.
    pub fn add_attendee(&mut self, user: UserId) -> bool {
        if self.is_attending(&user) {
            return false;
        }
        self.attendees.push(user);
        true
    }

    /// Remove `user` from the attendees. Returns `false` if not attending.
    pub fn remove_attendee(&mut self, user: &UserId) -> bool {
        let before = self.attendees.len();
        self.attendees.retain(|attendee| attendee != user);
        self.attendees.len() != before
    }

    /// Overwrite the editable fields with `draft`.
    ///
    /// Attendees, ratings, image and ownership are left alone.
    pub fn apply_draft(&mut self, draft: &EventDraft) {
        self.title.clone_from(&draft.title);
        self.description.clone_from(&draft.description);
        self.date = draft.date;
        self.time.clone_from(&draft.time);
        self.location.clone_from(&draft.location);
        self.organizer_name.clone_from(&draft.organizer_name);
    }

    /// The editable fields of this event, e.g. to prefill an edit form.
    #[must_use]
    pub fn draft(&self) -> EventDraft {
        EventDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            date: self.date,
            time: self.time.clone(),
            location: self.location.clone(),
            organizer_name: self.organizer_name.clone(),
        }
    }

    /// Replace the rating aggregate with the summary of `ratings`.
    pub fn set_rating_summary(&mut self, summary: RatingSummary) {
        self.average_rating = summary.average;
        self.total_ratings = summary.count;
    }

    /// Subject line used when sharing the event.
    #[must_use]
    pub fn share_subject(&self) -> String {
        format!("Event: {}", self.title)
    }

    /// Plain-text invitation for sharing the event.
    #[must_use]
    pub fn share_text(&self) -> String {
        format!(
            "📅 {title}\n\n{description}\n\n📍 Location: {location}\n🕐 Date: {date} at {time}\n👤 Organizer: {organizer}\n\nDon't miss it!",
            title = self.title,
            description = self.description,
            location = self.location,
            date = self.date.format("%d/%m/%Y"),
            time = self.time,
            organizer = self.organizer_name,
        )
    }
}

/// The user-editable fields of an event.
///
/// Serializes to exactly the fields an update is allowed to touch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// When the event happens.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    /// Human-readable start time.
    pub time: String,
    /// Where it happens.
    pub location: String,
    /// Organizer display name.
    pub organizer_name: String,
}

impl EventDraft {
    /// Check that every text field has content.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Validation`] naming the first blank field.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("Title", &self.title),
            ("Description", &self.description),
            ("Time", &self.time),
            ("Location", &self.location),
            ("Organizer name", &self.organizer_name),
        ];

        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((label, _)) => Err(DataError::Validation(format!("{label} is required"))),
            None => Ok(()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Comments and Ratings
// ═══════════════════════════════════════════════════════════════════════

/// A comment on an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Document id; empty until the repository assigns one.
    #[serde(default)]
    pub id: CommentId,
    /// Event commented on.
    pub event_id: EventId,
    /// Author.
    pub user_id: UserId,
    /// Author display name at posting time.
    pub user_name: String,
    /// Author avatar at posting time.
    #[serde(default)]
    pub user_photo_url: Option<String>,
    /// Body.
    pub text: String,
    /// Posting time.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Build a new, unsaved comment.
    #[must_use]
    pub fn new(
        event_id: EventId,
        user_id: UserId,
        user_name: impl Into<String>,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CommentId::default(),
            event_id,
            user_id,
            user_name: user_name.into(),
            user_photo_url: None,
            text: text.into(),
            created_at,
        }
    }

    /// Attach the author's avatar.
    #[must_use]
    pub fn with_photo(mut self, url: impl Into<String>) -> Self {
        self.user_photo_url = Some(url.into());
        self
    }

    /// Check that the body has content.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Validation`] for a blank body.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(DataError::Validation("Comment cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Lowest accepted score.
pub const MIN_SCORE: f64 = 1.0;
/// Highest accepted score.
pub const MAX_SCORE: f64 = 5.0;

/// One user's score for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    /// Document id; empty until the repository assigns one.
    #[serde(default)]
    pub id: RatingId,
    /// Event rated.
    pub event_id: EventId,
    /// Rater.
    pub user_id: UserId,
    /// Score between [`MIN_SCORE`] and [`MAX_SCORE`].
    #[serde(rename = "rating")]
    pub score: f64,
    /// When the score was given.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Rating {
    /// Build a new, unsaved rating.
    #[must_use]
    pub fn new(event_id: EventId, user_id: UserId, score: f64, created_at: DateTime<Utc>) -> Self {
        Self {
            id: RatingId::default(),
            event_id,
            user_id,
            score,
            created_at,
        }
    }

    /// Check that the score is in range.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Validation`] when the score is outside 1..=5.
    pub fn validate(&self) -> Result<()> {
        if (MIN_SCORE..=MAX_SCORE).contains(&self.score) {
            Ok(())
        } else {
            Err(DataError::Validation("Rating must be between 1 and 5".to_string()))
        }
    }
}

/// Aggregate over an event's ratings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    /// Arithmetic mean.
    pub average: f64,
    /// Number of ratings.
    pub count: u32,
}

impl RatingSummary {
    /// Summarize `ratings`; `None` when there are none.
    #[must_use]
    pub fn of<'a>(ratings: impl IntoIterator<Item = &'a Rating>) -> Option<Self> {
        let (sum, count) = ratings
            .into_iter()
            .fold((0.0_f64, 0_u32), |(sum, count), rating| (sum + rating.score, count + 1));

        (count > 0).then(|| Self {
            average: sum / f64::from(count),
            count,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Users
// ═══════════════════════════════════════════════════════════════════════

/// A user profile document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// The identity provider's uid.
    pub id: UserId,
    /// Sign-in email.
    #[serde(default)]
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Avatar location.
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Profile creation time.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}
