//! Event repository over in-process lists.

use super::EventRepository;
use crate::error::{DataError, Result};
use crate::model::{
    Comment, CommentId, Event, EventDraft, EventId, Rating, RatingId, RatingSummary, UserId,
};
use crate::samples::SampleCatalog;
use eventos_core::environment::Clock;
use std::future::Future;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct LocalData {
    events: Vec<Event>,
    comments: Vec<Comment>,
    ratings: Vec<Rating>,
}

impl LocalData {
    fn event_mut(&mut self, event_id: &EventId) -> Result<&mut Event> {
        self.events
            .iter_mut()
            .find(|event| &event.id == event_id)
            .ok_or_else(|| DataError::not_found("Event"))
    }
}

/// Events kept in memory for the lifetime of the process.
///
/// Seeded with the demo events. Image upload is not supported.
#[derive(Clone)]
pub struct LocalEventRepository {
    data: Arc<Mutex<LocalData>>,
    clock: Arc<dyn Clock>,
}

impl LocalEventRepository {
    /// Create a repository seeded with the demo events, dated relative to now.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let events = SampleCatalog::new(clock.now()).all();
        Self::with_events(clock, events)
    }

    /// Create a repository holding exactly `events`.
    #[must_use]
    pub fn with_events(clock: Arc<dyn Clock>, events: Vec<Event>) -> Self {
        Self {
            data: Arc::new(Mutex::new(LocalData {
                events,
                ..LocalData::default()
            })),
            clock,
        }
    }

    fn with_data<T>(&self, f: impl FnOnce(&mut LocalData) -> Result<T>) -> Result<T> {
        let mut data = self.data.lock().map_err(|_| DataError::lock_poisoned())?;
        f(&mut data)
    }

    fn select_events(&self, keep: impl Fn(&Event) -> bool, newest_first: bool) -> Result<Vec<Event>> {
        self.with_data(|data| {
            let mut events: Vec<Event> = data.events.iter().filter(|e| keep(e)).cloned().collect();
            events.sort_by_key(|event| event.date);
            if newest_first {
                events.reverse();
            }
            Ok(events)
        })
    }
}

impl EventRepository for LocalEventRepository {
    fn create_event(&self, mut event: Event) -> impl Future<Output = Result<EventId>> + Send {
        let result = self.with_data(|data| {
            event.id = EventId::generate();
            let id = event.id.clone();
            data.events.push(event);
            Ok(id)
        });
        async move { result }
    }

    fn events(&self) -> impl Future<Output = Result<Vec<Event>>> + Send {
        let result = self.select_events(|_| true, false);
        async move { result }
    }

    fn upcoming_events(&self) -> impl Future<Output = Result<Vec<Event>>> + Send {
        let now = self.clock.now();
        let result = self.select_events(|event| event.date > now, false);
        async move { result }
    }

    fn past_events(&self) -> impl Future<Output = Result<Vec<Event>>> + Send {
        let now = self.clock.now();
        let result = self.select_events(|event| event.date < now, true);
        async move { result }
    }

    fn event(&self, event_id: &EventId) -> impl Future<Output = Result<Option<Event>>> + Send {
        let result = self.with_data(|data| Ok(data.events.iter().find(|e| &e.id == event_id).cloned()));
        async move { result }
    }

    fn join_event(&self, event_id: &EventId, user_id: &UserId) -> impl Future<Output = Result<()>> + Send {
        let result = self.with_data(|data| {
            data.event_mut(event_id)?.add_attendee(user_id.clone());
            Ok(())
        });
        async move { result }
    }

    fn leave_event(&self, event_id: &EventId, user_id: &UserId) -> impl Future<Output = Result<()>> + Send {
        let result = self.with_data(|data| {
            data.event_mut(event_id)?.remove_attendee(user_id);
            Ok(())
        });
        async move { result }
    }

    fn add_comment(&self, mut comment: Comment) -> impl Future<Output = Result<CommentId>> + Send {
        let now = self.clock.now();
        let result = self.with_data(|data| {
            comment.id = CommentId::generate();
            comment.created_at = now;
            let id = comment.id.clone();
            data.comments.push(comment);
            Ok(id)
        });
        async move { result }
    }

    fn comments(&self, event_id: &EventId) -> impl Future<Output = Result<Vec<Comment>>> + Send {
        let result = self.with_data(|data| {
            let mut comments: Vec<Comment> = data
                .comments
                .iter()
                .filter(|comment| &comment.event_id == event_id)
                .cloned()
                .collect();
            comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(comments)
        });
        async move { result }
    }

    fn add_rating(&self, mut rating: Rating) -> impl Future<Output = Result<RatingId>> + Send {
        let result = self.with_data(|data| {
            data.ratings
                .retain(|r| !(r.event_id == rating.event_id && r.user_id == rating.user_id));
            rating.id = RatingId::generate();
            let id = rating.id.clone();
            let event_id = rating.event_id.clone();
            data.ratings.push(rating);

            let summary = RatingSummary::of(data.ratings.iter().filter(|r| r.event_id == event_id));
            match (summary, data.event_mut(&event_id)) {
                (Some(summary), Ok(event)) => event.set_rating_summary(summary),
                (_, Err(err)) => {
                    tracing::warn!(event_id = %event_id, error = %err, "Rating stored but event average not refreshed");
                },
                (None, Ok(_)) => {},
            }
            Ok(id)
        });
        async move { result }
    }

    fn user_rating(&self, event_id: &EventId, user_id: &UserId) -> impl Future<Output = Result<Option<Rating>>> + Send {
        let result = self.with_data(|data| {
            Ok(data
                .ratings
                .iter()
                .find(|r| &r.event_id == event_id && &r.user_id == user_id)
                .cloned())
        });
        async move { result }
    }

    fn upload_event_image(&self, _event_id: &EventId, _image: Vec<u8>) -> impl Future<Output = Result<String>> + Send {
        async move {
            Err(DataError::Unavailable(
                "Image upload is not available in local mode".to_string(),
            ))
        }
    }

    fn set_event_image(&self, event_id: &EventId, image_url: &str) -> impl Future<Output = Result<()>> + Send {
        let result = self.with_data(|data| {
            data.event_mut(event_id)?.image_url = Some(image_url.to_string());
            Ok(())
        });
        async move { result }
    }

    fn update_event(&self, event_id: &EventId, draft: &EventDraft) -> impl Future<Output = Result<()>> + Send {
        let result = self.with_data(|data| {
            data.event_mut(event_id)?.apply_draft(draft);
            Ok(())
        });
        async move { result }
    }
}
