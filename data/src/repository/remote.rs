//! Event repository over the hosted document store.

use super::{
    decode_all, event_image_path, field, from_document, to_document, EventRepository, COMMENTS,
    EVENTS, RATINGS,
};
use crate::backend::{BlobStorage, Direction, DocumentStore, Query};
use crate::config::BackendConfig;
use crate::error::{DataError, Result};
use crate::model::{
    Comment, CommentId, Event, EventDraft, EventId, Rating, RatingId, RatingSummary, UserId,
};
use eventos_core::environment::Clock;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn, Instrument};

/// Events, comments and ratings stored in the hosted document store, with
/// cover images in blob storage.
///
/// Raw backend failures are rewritten into setup guidance (see
/// [`DataError::explained`]) before they leave the repository.
#[derive(Clone)]
pub struct RemoteEventRepository<D, B> {
    documents: D,
    blobs: B,
    clock: Arc<dyn Clock>,
    config: BackendConfig,
}

impl<D, B> RemoteEventRepository<D, B>
where
    D: DocumentStore,
    B: BlobStorage,
{
    /// Create a repository over the given services.
    #[must_use]
    pub fn new(documents: D, blobs: B, clock: Arc<dyn Clock>, config: BackendConfig) -> Self {
        Self {
            documents,
            blobs,
            clock,
            config,
        }
    }

    fn explain(&self, err: DataError) -> DataError {
        err.explained(&self.config.project_id)
    }

    async fn query_events(&self, query: Query) -> Result<Vec<Event>> {
        let documents = self
            .documents
            .query(EVENTS, query)
            .await
            .map_err(|err| self.explain(err))?;
        Ok(decode_all(EVENTS, documents))
    }

    /// Rewrite the event's aggregate from every stored rating.
    async fn refresh_rating_summary(&self, event_id: &EventId) -> Result<()> {
        let documents = self
            .documents
            .query(RATINGS, Query::new().where_eq("eventId", event_id.as_str()))
            .await?;
        let ratings: Vec<Rating> = decode_all(RATINGS, documents);

        let Some(summary) = RatingSummary::of(&ratings) else {
            return Ok(());
        };

        let mut fields = field("averageRating", summary.average)?;
        fields.extend(field("totalRatings", summary.count)?);
        self.documents.update(EVENTS, event_id.as_str(), fields).await
    }

    fn ratings_by(event_id: &EventId, user_id: &UserId) -> Query {
        Query::new()
            .where_eq("eventId", event_id.as_str())
            .where_eq("userId", user_id.as_str())
    }
}

impl<D, B> EventRepository for RemoteEventRepository<D, B>
where
    D: DocumentStore + Clone + 'static,
    B: BlobStorage + Clone + 'static,
{
    fn create_event(&self, mut event: Event) -> impl Future<Output = Result<EventId>> + Send {
        async move {
            event.id = EventId::generate();
            let document = to_document(&event)?;
            self.documents
                .set(EVENTS, event.id.as_str(), document)
                .await
                .map_err(|err| self.explain(err))?;
            debug!(event_id = %event.id, "Event created");
            Ok(event.id)
        }
    }

    fn events(&self) -> impl Future<Output = Result<Vec<Event>>> + Send {
        self.query_events(Query::new().order_by("date", Direction::Ascending))
    }

    fn upcoming_events(&self) -> impl Future<Output = Result<Vec<Event>>> + Send {
        let now = self.clock.now().timestamp_millis();
        self.query_events(
            Query::new()
                .where_gt("date", now)
                .order_by("date", Direction::Ascending),
        )
    }

    fn past_events(&self) -> impl Future<Output = Result<Vec<Event>>> + Send {
        let now = self.clock.now().timestamp_millis();
        self.query_events(
            Query::new()
                .where_lt("date", now)
                .order_by("date", Direction::Descending),
        )
    }

    fn event(&self, event_id: &EventId) -> impl Future<Output = Result<Option<Event>>> + Send {
        async move {
            self.documents
                .get(EVENTS, event_id.as_str())
                .await
                .map_err(|err| self.explain(err))?
                .map(from_document)
                .transpose()
        }
    }

    fn join_event(&self, event_id: &EventId, user_id: &UserId) -> impl Future<Output = Result<()>> + Send {
        let user = user_id.clone();
        async move {
            self.documents
                .transaction(EVENTS, event_id.as_str(), move |current| {
                    let document = current.ok_or(DataError::NotJoinable)?;
                    let mut event: Event = from_document(document)?;
                    if !event.add_attendee(user) {
                        return Ok(None);
                    }
                    field("attendees", &event.attendees).map(Some)
                })
                .await
                .map_err(|err| self.explain(err))
        }
        .instrument(tracing::debug_span!("join_event", event_id = %event_id, user_id = %user_id))
    }

    fn leave_event(&self, event_id: &EventId, user_id: &UserId) -> impl Future<Output = Result<()>> + Send {
        let user = user_id.clone();
        async move {
            self.documents
                .transaction(EVENTS, event_id.as_str(), move |current| {
                    let document = current.ok_or_else(|| DataError::not_found("Event"))?;
                    let mut event: Event = from_document(document)?;
                    if !event.remove_attendee(&user) {
                        return Ok(None);
                    }
                    field("attendees", &event.attendees).map(Some)
                })
                .await
                .map_err(|err| self.explain(err))
        }
        .instrument(tracing::debug_span!("leave_event", event_id = %event_id, user_id = %user_id))
    }

    fn add_comment(&self, mut comment: Comment) -> impl Future<Output = Result<CommentId>> + Send {
        async move {
            comment.id = CommentId::generate();
            let document = to_document(&comment)?;
            self.documents
                .set(COMMENTS, comment.id.as_str(), document)
                .await
                .map_err(|err| self.explain(err))?;
            Ok(comment.id)
        }
    }

    fn comments(&self, event_id: &EventId) -> impl Future<Output = Result<Vec<Comment>>> + Send {
        async move {
            let documents = self
                .documents
                .query(
                    COMMENTS,
                    Query::new()
                        .where_eq("eventId", event_id.as_str())
                        .order_by("createdAt", Direction::Descending),
                )
                .await
                .map_err(|err| self.explain(err))?;
            Ok(decode_all(COMMENTS, documents))
        }
    }

    fn add_rating(&self, mut rating: Rating) -> impl Future<Output = Result<RatingId>> + Send {
        async move {
            let previous: Vec<Rating> = decode_all(
                RATINGS,
                self.documents
                    .query(RATINGS, Self::ratings_by(&rating.event_id, &rating.user_id))
                    .await
                    .map_err(|err| self.explain(err))?,
            );
            for stale in previous {
                self.documents
                    .delete(RATINGS, stale.id.as_str())
                    .await
                    .map_err(|err| self.explain(err))?;
            }

            rating.id = RatingId::generate();
            let document = to_document(&rating)?;
            self.documents
                .set(RATINGS, rating.id.as_str(), document)
                .await
                .map_err(|err| self.explain(err))?;

            if let Err(err) = self.refresh_rating_summary(&rating.event_id).await {
                warn!(event_id = %rating.event_id, error = %err, "Rating stored but event average not refreshed");
            }
            Ok(rating.id)
        }
    }

    fn user_rating(&self, event_id: &EventId, user_id: &UserId) -> impl Future<Output = Result<Option<Rating>>> + Send {
        let query = Self::ratings_by(event_id, user_id);
        async move {
            let documents = self
                .documents
                .query(RATINGS, query)
                .await
                .map_err(|err| self.explain(err))?;
            Ok(decode_all(RATINGS, documents).into_iter().next())
        }
    }

    fn upload_event_image(&self, event_id: &EventId, image: Vec<u8>) -> impl Future<Output = Result<String>> + Send {
        let path = event_image_path(event_id);
        async move { self.blobs.upload(&path, image).await }
    }

    fn set_event_image(&self, event_id: &EventId, image_url: &str) -> impl Future<Output = Result<()>> + Send {
        async move {
            let fields = field("imageUrl", image_url)?;
            self.documents
                .update(EVENTS, event_id.as_str(), fields)
                .await
                .map_err(|err| self.explain(err))
        }
    }

    fn update_event(&self, event_id: &EventId, draft: &EventDraft) -> impl Future<Output = Result<()>> + Send {
        async move {
            let fields = to_document(draft)?;
            self.documents
                .update(EVENTS, event_id.as_str(), fields)
                .await
                .map_err(|err| self.explain(err))
        }
    }
}
