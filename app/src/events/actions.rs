//! Event screen actions.
//!
//! Commands come from the UI. Outcomes are produced by effects and carry
//! whatever the reducer needs to confirm or roll back, including the
//! pre-mutation snapshot for optimistic updates.

use super::state::EventList;
use eventos_data::{Comment, CommentId, Event, EventDraft, EventId, Rating, RatingId, UserId};

/// Direction of an attendance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Add the user to the attendees.
    Join,
    /// Remove the user from the attendees.
    Leave,
}

/// Actions handled by [`super::EventReducer`].
#[derive(Debug, Clone, PartialEq)]
pub enum EventAction {
    // ========== Commands ==========
    /// Fetch the all-events list.
    LoadEvents,
    /// Fetch the upcoming list.
    LoadUpcomingEvents,
    /// Fetch the past list.
    LoadPastEvents,
    /// Fetch an event and its comments for the details screen.
    LoadEventDetails {
        /// Event to view.
        event_id: EventId,
    },
    /// Fetch the comments of an event.
    LoadComments {
        /// Event commented on.
        event_id: EventId,
    },
    /// Fetch a user's rating of an event.
    LoadUserRating {
        /// Event rated.
        event_id: EventId,
        /// Rater.
        user_id: UserId,
    },
    /// Create an event, optionally with a cover image.
    CreateEvent {
        /// Form contents.
        draft: EventDraft,
        /// Creator.
        organizer_id: UserId,
        /// Encoded cover image.
        image: Option<Vec<u8>>,
    },
    /// Edit an event, optionally replacing its cover image.
    UpdateEvent {
        /// Event to edit.
        event_id: EventId,
        /// Form contents.
        draft: EventDraft,
        /// Encoded cover image.
        image: Option<Vec<u8>>,
    },
    /// Attend an event.
    JoinEvent {
        /// Event to join.
        event_id: EventId,
        /// Joining user.
        user_id: UserId,
    },
    /// Stop attending an event.
    LeaveEvent {
        /// Event to leave.
        event_id: EventId,
        /// Leaving user.
        user_id: UserId,
    },
    /// Post a comment.
    AddComment {
        /// Comment to post.
        comment: Comment,
    },
    /// Rate an event.
    AddRating {
        /// Rating to submit.
        rating: Rating,
    },
    /// Dismiss the error banner.
    ClearError,

    // ========== Outcomes ==========
    /// A list fetch finished.
    ListLoaded {
        /// Which list.
        list: EventList,
        /// Rows or error message.
        result: Result<Vec<Event>, String>,
    },
    /// An event fetch finished.
    EventLoaded {
        /// Requested event.
        event_id: EventId,
        /// Event (if stored) or error message.
        result: Result<Option<Event>, String>,
    },
    /// A comments fetch finished.
    CommentsLoaded {
        /// Event commented on.
        event_id: EventId,
        /// Comments or error message.
        result: Result<Vec<Comment>, String>,
    },
    /// A user-rating fetch finished.
    UserRatingLoaded {
        /// Event rated.
        event_id: EventId,
        /// Rating (if any) or error message.
        result: Result<Option<Rating>, String>,
    },
    /// A create finished.
    EventCreated {
        /// New id or error message.
        result: Result<EventId, String>,
        /// Set when the event was saved but its image was not.
        image_error: Option<String>,
    },
    /// An update finished.
    EventUpdated {
        /// Edited event.
        event_id: EventId,
        /// Error message on failure.
        result: Result<(), String>,
        /// Set when the event was saved but its image was not.
        image_error: Option<String>,
    },
    /// A join or leave finished.
    MembershipChanged {
        /// Event joined or left.
        event_id: EventId,
        /// User who joined or left.
        user_id: UserId,
        /// Join or leave.
        change: Membership,
        /// The viewed event before the optimistic change, if it was this one.
        previous: Option<Event>,
        /// Error message on failure.
        result: Result<(), String>,
    },
    /// A comment post finished.
    CommentPosted {
        /// Event commented on.
        event_id: EventId,
        /// Comments before the optimistic insert.
        previous: Vec<Comment>,
        /// New id or error message.
        result: Result<CommentId, String>,
    },
    /// A rating submission finished.
    RatingSubmitted {
        /// Event rated.
        event_id: EventId,
        /// Rater.
        user_id: UserId,
        /// The user's rating before the optimistic change.
        previous: Option<Rating>,
        /// New id or error message.
        result: Result<RatingId, String>,
    },
}
