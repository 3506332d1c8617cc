//! Event screen reducer.
//!
//! # Optimistic mutations
//!
//! Join, leave, comment and rating patch the state before the store call
//! and put a snapshot of the touched field into the outcome action. A failed
//! call restores the snapshot and raises the error banner. A successful one
//! re-fetches the canonical data.
//!
//! # List loads
//!
//! Fetched lists go through [`resolve_list`], so an empty or failing store
//! never blanks a list that was already showing, and a fresh screen falls
//! back to the demo events.

use super::actions::{EventAction, Membership};
use super::environment::EventEnvironment;
use super::state::{resolve_list, EventList, EventState};
use eventos_core::effect::Effect;
use eventos_core::reducer::Reducer;
use eventos_core::{smallvec, SmallVec};
use eventos_data::{
    Comment, CommentId, Event, EventDraft, EventId, EventRepository, Rating, UserId,
};
use tracing::{debug, warn};

type Effects = SmallVec<[Effect<EventAction>; 4]>;

/// Reducer behind the event list, details, and edit screens.
#[derive(Debug, Clone)]
pub struct EventReducer<R> {
    _phantom: std::marker::PhantomData<R>,
}

impl<R> EventReducer<R> {
    /// Create a new event reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<R> Default for EventReducer<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> EventReducer<R>
where
    R: EventRepository,
{
    /// Reduce follow-up actions in order and collect their effects.
    fn chain(
        &self,
        state: &mut EventState,
        env: &EventEnvironment<R>,
        actions: impl IntoIterator<Item = EventAction>,
    ) -> Effects {
        actions
            .into_iter()
            .flat_map(|action| self.reduce(state, action, env))
            .filter(|effect| !effect.is_none())
            .collect()
    }

    fn reject(state: &mut EventState, message: String) -> Effects {
        state.error_message = Some(message);
        smallvec![Effect::None]
    }

    // ========== Loads ==========

    fn load_list(state: &mut EventState, env: &EventEnvironment<R>, list: EventList) -> Effects {
        *state.loading.list_mut(list) = true;
        let repository = env.repository.clone();

        smallvec![Effect::task(async move {
            let result = match list {
                EventList::All => repository.events().await,
                EventList::Upcoming => repository.upcoming_events().await,
                EventList::Past => repository.past_events().await,
            };
            EventAction::ListLoaded {
                list,
                result: result.map_err(|err| err.to_string()),
            }
        })]
    }

    fn load_comments(env: &EventEnvironment<R>, event_id: EventId) -> Effect<EventAction> {
        let repository = env.repository.clone();
        Effect::task(async move {
            let result = repository.comments(&event_id).await.map_err(|err| err.to_string());
            EventAction::CommentsLoaded { event_id, result }
        })
    }

    fn load_event(env: &EventEnvironment<R>, event_id: EventId) -> Effect<EventAction> {
        let repository = env.repository.clone();
        Effect::task(async move {
            let result = repository.event(&event_id).await.map_err(|err| err.to_string());
            EventAction::EventLoaded { event_id, result }
        })
    }

    fn load_user_rating(env: &EventEnvironment<R>, event_id: EventId, user_id: UserId) -> Effect<EventAction> {
        let repository = env.repository.clone();
        Effect::task(async move {
            let result = repository
                .user_rating(&event_id, &user_id)
                .await
                .map_err(|err| err.to_string());
            EventAction::UserRatingLoaded { event_id, result }
        })
    }

    // ========== Saves ==========

    fn create_event(
        state: &mut EventState,
        env: &EventEnvironment<R>,
        draft: EventDraft,
        organizer_id: UserId,
        image: Option<Vec<u8>>,
    ) -> Effects {
        if let Err(err) = draft.validate() {
            return Self::reject(state, err.to_string());
        }
        state.loading.saving = true;
        state.error_message = None;

        let event = Event::from_draft(draft, organizer_id, env.clock.now());
        let repository = env.repository.clone();

        smallvec![Effect::task(async move {
            match repository.create_event(event).await {
                Ok(event_id) => {
                    let image_error = match image {
                        Some(bytes) => attach_image(&repository, &event_id, bytes).await.err(),
                        None => None,
                    };
                    EventAction::EventCreated {
                        result: Ok(event_id),
                        image_error,
                    }
                },
                Err(err) => EventAction::EventCreated {
                    result: Err(err.to_string()),
                    image_error: None,
                },
            }
        })]
    }

    fn update_event(
        state: &mut EventState,
        env: &EventEnvironment<R>,
        event_id: EventId,
        draft: EventDraft,
        image: Option<Vec<u8>>,
    ) -> Effects {
        if let Err(err) = draft.validate() {
            return Self::reject(state, err.to_string());
        }
        state.loading.saving = true;
        state.error_message = None;

        let repository = env.repository.clone();

        smallvec![Effect::task(async move {
            match repository.update_event(&event_id, &draft).await {
                Ok(()) => {
                    let image_error = match image {
                        Some(bytes) => attach_image(&repository, &event_id, bytes).await.err(),
                        None => None,
                    };
                    EventAction::EventUpdated {
                        event_id,
                        result: Ok(()),
                        image_error,
                    }
                },
                Err(err) => EventAction::EventUpdated {
                    event_id,
                    result: Err(err.to_string()),
                    image_error: None,
                },
            }
        })]
    }

    // ========== Optimistic mutations ==========

    fn change_membership(
        state: &mut EventState,
        env: &EventEnvironment<R>,
        event_id: EventId,
        user_id: UserId,
        change: Membership,
    ) -> Effects {
        state.error_message = None;

        let previous = state.current_event.clone().filter(|event| event.id == event_id);
        if let Some(event) = state.current_event.as_mut().filter(|event| event.id == event_id) {
            match change {
                Membership::Join => {
                    event.add_attendee(user_id.clone());
                },
                Membership::Leave => {
                    event.remove_attendee(&user_id);
                },
            }
        }

        let repository = env.repository.clone();

        smallvec![Effect::task(async move {
            let result = match change {
                Membership::Join => repository.join_event(&event_id, &user_id).await,
                Membership::Leave => repository.leave_event(&event_id, &user_id).await,
            };
            EventAction::MembershipChanged {
                event_id,
                user_id,
                change,
                previous,
                result: result.map_err(|err| err.to_string()),
            }
        })]
    }

    fn add_comment(state: &mut EventState, env: &EventEnvironment<R>, comment: Comment) -> Effects {
        if let Err(err) = comment.validate() {
            return Self::reject(state, err.to_string());
        }
        state.error_message = None;

        let previous = state.comments.clone();
        if state.accepts(&comment.event_id) {
            let now = env.clock.now();
            let optimistic = Comment {
                id: CommentId::new(format!("temp_{}", now.timestamp_millis())),
                created_at: now,
                ..comment.clone()
            };
            state.comments.insert(0, optimistic);
        }

        let repository = env.repository.clone();
        let event_id = comment.event_id.clone();

        smallvec![Effect::task(async move {
            let result = repository.add_comment(comment).await.map_err(|err| err.to_string());
            EventAction::CommentPosted {
                event_id,
                previous,
                result,
            }
        })]
    }

    fn add_rating(state: &mut EventState, env: &EventEnvironment<R>, rating: Rating) -> Effects {
        if let Err(err) = rating.validate() {
            return Self::reject(state, err.to_string());
        }
        state.error_message = None;

        let previous = state.user_rating.clone();
        if state.accepts(&rating.event_id) {
            state.user_rating = Some(rating.clone());
        }
        let repository = env.repository.clone();
        let event_id = rating.event_id.clone();
        let user_id = rating.user_id.clone();

        smallvec![Effect::task(async move {
            let result = repository.add_rating(rating).await.map_err(|err| err.to_string());
            EventAction::RatingSubmitted {
                event_id,
                user_id,
                previous,
                result,
            }
        })]
    }
}

/// Upload a cover image and link it to the event.
///
/// Only the upload can fail; a failed link is logged.
async fn attach_image<R: EventRepository>(repository: &R, event_id: &EventId, bytes: Vec<u8>) -> Result<(), String> {
    let url = repository
        .upload_event_image(event_id, bytes)
        .await
        .map_err(|err| err.to_string())?;
    if let Err(err) = repository.set_event_image(event_id, &url).await {
        warn!(event_id = %event_id, error = %err, "Image uploaded but not linked to event");
    }
    Ok(())
}

impl<R> Reducer for EventReducer<R>
where
    R: EventRepository,
{
    type State = EventState;
    type Action = EventAction;
    type Environment = EventEnvironment<R>;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ═══════════════════════════════════════════════════════════════
            // Loads
            // ═══════════════════════════════════════════════════════════════
            EventAction::LoadEvents => Self::load_list(state, env, EventList::All),
            EventAction::LoadUpcomingEvents => Self::load_list(state, env, EventList::Upcoming),
            EventAction::LoadPastEvents => Self::load_list(state, env, EventList::Past),

            EventAction::LoadEventDetails { event_id } => {
                if !state.is_viewing(&event_id) {
                    state.current_event = None;
                    state.comments.clear();
                    state.user_rating = None;
                }
                state.selected_event = Some(event_id.clone());
                state.loading.details = true;
                state.error_message = None;

                smallvec![Effect::merge([
                    Self::load_comments(env, event_id.clone()),
                    Self::load_event(env, event_id),
                ])]
            },

            EventAction::LoadComments { event_id } => smallvec![Self::load_comments(env, event_id)],

            EventAction::LoadUserRating { event_id, user_id } => {
                smallvec![Self::load_user_rating(env, event_id, user_id)]
            },

            EventAction::ListLoaded { list, result } => {
                *state.loading.list_mut(list) = false;
                let fetched = result.unwrap_or_else(|err| {
                    warn!(?list, error = %err, "Event list fetch failed, keeping held or demo events");
                    Vec::new()
                });
                let samples = list.samples(&env.samples);
                let rows = resolve_list(list, fetched, state.list(list), &samples, env.merge_samples);
                *state.list_mut(list) = rows;
                smallvec![Effect::None]
            },

            EventAction::EventLoaded { event_id, result } => {
                if !state.accepts(&event_id) {
                    debug!(event_id = %event_id, "Dropping details of an event no longer viewed");
                    return smallvec![Effect::None];
                }
                state.loading.details = false;
                match result {
                    Ok(Some(event)) => state.current_event = Some(event),
                    Ok(None) => {
                        state.current_event = env.samples.find(&event_id).cloned();
                        if state.current_event.is_none() {
                            state.error_message = Some("Event not found".to_string());
                        }
                    },
                    Err(err) => state.error_message = Some(format!("Failed to load event: {err}")),
                }
                smallvec![Effect::None]
            },

            EventAction::CommentsLoaded { event_id, result } => {
                if !state.accepts(&event_id) {
                    return smallvec![Effect::None];
                }
                match result {
                    Ok(comments) => state.comments = comments,
                    Err(err) => warn!(event_id = %event_id, error = %err, "Comments fetch failed"),
                }
                smallvec![Effect::None]
            },

            EventAction::UserRatingLoaded { event_id, result } => {
                if !state.accepts(&event_id) {
                    return smallvec![Effect::None];
                }
                match result {
                    Ok(rating) => state.user_rating = rating,
                    Err(err) => warn!(event_id = %event_id, error = %err, "User rating fetch failed"),
                }
                smallvec![Effect::None]
            },

            // ═══════════════════════════════════════════════════════════════
            // Create / update
            // ═══════════════════════════════════════════════════════════════
            EventAction::CreateEvent {
                draft,
                organizer_id,
                image,
            } => Self::create_event(state, env, draft, organizer_id, image),

            EventAction::UpdateEvent {
                event_id,
                draft,
                image,
            } => Self::update_event(state, env, event_id, draft, image),

            EventAction::EventCreated { result, image_error } => {
                state.loading.saving = false;
                match result {
                    Ok(event_id) => {
                        debug!(event_id = %event_id, "Event created");
                        if let Some(err) = image_error {
                            state.error_message =
                                Some(format!("Event created but the image could not be uploaded: {err}"));
                        }
                        self.chain(
                            state,
                            env,
                            [
                                EventAction::LoadEvents,
                                EventAction::LoadUpcomingEvents,
                                EventAction::LoadPastEvents,
                            ],
                        )
                    },
                    Err(err) => Self::reject(state, format!("Failed to create event: {err}")),
                }
            },

            EventAction::EventUpdated {
                event_id,
                result,
                image_error,
            } => {
                state.loading.saving = false;
                match result {
                    Ok(()) => {
                        let details = state
                            .accepts(&event_id)
                            .then_some(EventAction::LoadEventDetails { event_id });
                        let reloads = details.into_iter().chain([
                            EventAction::LoadEvents,
                            EventAction::LoadUpcomingEvents,
                            EventAction::LoadPastEvents,
                        ]);
                        let effects = self.chain(state, env, reloads);
                        // Set after the reloads, which clear the banner.
                        if let Some(err) = image_error {
                            state.error_message =
                                Some(format!("Event updated but the image could not be uploaded: {err}"));
                        }
                        effects
                    },
                    Err(err) => Self::reject(state, format!("Failed to update event: {err}")),
                }
            },

            // ═══════════════════════════════════════════════════════════════
            // Optimistic mutations
            // ═══════════════════════════════════════════════════════════════
            EventAction::JoinEvent { event_id, user_id } => {
                Self::change_membership(state, env, event_id, user_id, Membership::Join)
            },

            EventAction::LeaveEvent { event_id, user_id } => {
                Self::change_membership(state, env, event_id, user_id, Membership::Leave)
            },

            EventAction::MembershipChanged {
                event_id,
                user_id,
                change,
                previous,
                result,
            } => match result {
                Ok(()) => {
                    debug!(event_id = %event_id, user_id = %user_id, ?change, "Attendance confirmed");
                    let details = state
                        .accepts(&event_id)
                        .then_some(EventAction::LoadEventDetails { event_id });
                    self.chain(state, env, details.into_iter().chain([EventAction::LoadEvents]))
                },
                Err(err) => {
                    if let Some(snapshot) = previous.filter(|_| state.is_viewing(&event_id)) {
                        state.current_event = Some(snapshot);
                    }
                    Self::reject(state, err)
                },
            },

            EventAction::AddComment { comment } => Self::add_comment(state, env, comment),

            EventAction::CommentPosted {
                event_id,
                previous,
                result,
            } => match result {
                Ok(_) if state.accepts(&event_id) => {
                    self.chain(state, env, [EventAction::LoadComments { event_id }])
                },
                Ok(_) => smallvec![Effect::None],
                Err(err) => {
                    if state.accepts(&event_id) {
                        state.comments = previous;
                    }
                    Self::reject(state, format!("Failed to add comment: {err}"))
                },
            },

            EventAction::AddRating { rating } => Self::add_rating(state, env, rating),

            EventAction::RatingSubmitted {
                event_id,
                user_id,
                previous,
                result,
            } => match result {
                Ok(_) if state.accepts(&event_id) => self.chain(
                    state,
                    env,
                    [
                        EventAction::LoadEventDetails {
                            event_id: event_id.clone(),
                        },
                        EventAction::LoadUserRating { event_id, user_id },
                    ],
                ),
                Ok(_) => smallvec![Effect::None],
                Err(err) => {
                    if state.accepts(&event_id) {
                        state.user_rating = previous;
                    }
                    Self::reject(state, format!("Failed to submit rating: {err}"))
                },
            },

            EventAction::ClearError => {
                state.error_message = None;
                smallvec![Effect::None]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventos_core::environment::Clock;
    use crate::events::LoadingFlags;
    use eventos_data::{LocalEventRepository, RatingId};
    use eventos_testing::{assertions, test_clock, ReducerTest};
    use std::sync::Arc;

    type TestReducer = EventReducer<LocalEventRepository>;

    fn env() -> EventEnvironment<LocalEventRepository> {
        let clock = Arc::new(test_clock());
        EventEnvironment::new(LocalEventRepository::new(clock.clone()), clock)
    }

    fn viewing(event_id: &str) -> EventState {
        let env = env();
        EventState {
            current_event: env.samples.find(&EventId::new(event_id)).cloned(),
            ..EventState::default()
        }
    }

    fn comment(text: &str) -> Comment {
        Comment::new(
            EventId::new("sample-beach-cleanup"),
            UserId::new("u1"),
            "Ana",
            text,
            test_clock().now(),
        )
    }

    #[test]
    fn load_list_sets_only_its_flag() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState::default())
            .when_action(EventAction::LoadUpcomingEvents)
            .then_state(|state| {
                assert!(state.loading.upcoming);
                assert!(!state.loading.events);
                assert!(state.is_loading());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn failed_list_fetch_seeds_samples() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState::default())
            .when_action(EventAction::ListLoaded {
                list: EventList::Past,
                result: Err("offline".into()),
            })
            .then_state(|state| {
                assert_eq!(state.past_events.len(), 1);
                assert!(!state.loading.past);
                assert!(state.error_message.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn details_load_fetches_comments_and_event() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState::default())
            .when_action(EventAction::LoadEventDetails {
                event_id: EventId::new("sample-beach-cleanup"),
            })
            .then_state(|state| assert!(state.loading.details))
            .then_effects(|effects| assert_eq!(assertions::count_futures(effects), 2))
            .run();
    }

    #[test]
    fn missing_event_falls_back_to_sample() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState::default())
            .when_action(EventAction::EventLoaded {
                event_id: EventId::new("sample-food-festival"),
                result: Ok(None),
            })
            .then_state(|state| {
                assert_eq!(
                    state.current_event.as_ref().map(|e| e.title.as_str()),
                    Some("Food Festival")
                );
                assert!(state.error_message.is_none());
            })
            .run();
    }

    #[test]
    fn unknown_event_reports_not_found() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState::default())
            .when_action(EventAction::EventLoaded {
                event_id: EventId::new("nope"),
                result: Ok(None),
            })
            .then_state(|state| {
                assert!(state.current_event.is_none());
                assert_eq!(state.error_message.as_deref(), Some("Event not found"));
            })
            .run();
    }

    #[test]
    fn failed_event_load_is_reported() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState::default())
            .when_action(EventAction::EventLoaded {
                event_id: EventId::new("x"),
                result: Err("boom".into()),
            })
            .then_state(|state| {
                assert_eq!(state.error_message.as_deref(), Some("Failed to load event: boom"));
            })
            .run();
    }

    #[test]
    fn join_is_applied_optimistically() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(viewing("sample-entrepreneurs-fair"))
            .when_action(EventAction::JoinEvent {
                event_id: EventId::new("sample-entrepreneurs-fair"),
                user_id: UserId::new("newcomer"),
            })
            .then_state(|state| {
                let event = state.current_event.as_ref().unwrap();
                assert!(event.is_attending(&UserId::new("newcomer")));
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn rejected_join_restores_snapshot() {
        let before = viewing("sample-entrepreneurs-fair");
        let snapshot = before.current_event.clone();
        let expected = before.current_event.clone();

        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(before)
            .when_action(EventAction::JoinEvent {
                event_id: EventId::new("sample-entrepreneurs-fair"),
                user_id: UserId::new("newcomer"),
            })
            .when_action(EventAction::MembershipChanged {
                event_id: EventId::new("sample-entrepreneurs-fair"),
                user_id: UserId::new("newcomer"),
                change: Membership::Join,
                previous: snapshot,
                result: Err("This event does not exist in the database.".into()),
            })
            .then_state(move |state| {
                assert_eq!(state.current_event, expected);
                assert!(state.error_message.is_some());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn leave_of_other_event_leaves_current_untouched() {
        let before = viewing("sample-beach-cleanup");
        let expected = before.current_event.clone();

        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(before)
            .when_action(EventAction::LeaveEvent {
                event_id: EventId::new("sample-food-festival"),
                user_id: UserId::new("demo_user"),
            })
            .then_state(move |state| assert_eq!(state.current_event, expected))
            .run();
    }

    #[test]
    fn confirmed_membership_reloads_details_and_list() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState::default())
            .when_action(EventAction::MembershipChanged {
                event_id: EventId::new("e"),
                user_id: UserId::new("u"),
                change: Membership::Leave,
                previous: None,
                result: Ok(()),
            })
            .then_state(|state| {
                assert!(state.loading.details);
                assert!(state.loading.events);
            })
            .then_effects(|effects| assert_eq!(assertions::count_futures(effects), 3))
            .run();
    }

    #[test]
    fn comment_is_prepended_with_temporary_id() {
        let existing = comment("first");
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState {
                comments: vec![existing],
                ..EventState::default()
            })
            .when_action(EventAction::AddComment {
                comment: comment("second"),
            })
            .then_state(|state| {
                assert_eq!(state.comments.len(), 2);
                assert_eq!(state.comments[0].text, "second");
                assert_eq!(
                    state.comments[0].id.as_str(),
                    format!("temp_{}", test_clock().now().timestamp_millis())
                );
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn rejected_comment_restores_exact_list() {
        let previous = vec![comment("first")];
        let expected = previous.clone();

        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState {
                comments: previous.clone(),
                ..EventState::default()
            })
            .when_action(EventAction::AddComment {
                comment: comment("second"),
            })
            .when_action(EventAction::CommentPosted {
                event_id: EventId::new("sample-beach-cleanup"),
                previous,
                result: Err("offline".into()),
            })
            .then_state(move |state| {
                assert_eq!(state.comments, expected);
                assert_eq!(state.error_message.as_deref(), Some("Failed to add comment: offline"));
            })
            .run();
    }

    #[test]
    fn blank_comment_is_rejected_without_store_call() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState::default())
            .when_action(EventAction::AddComment { comment: comment("   ") })
            .then_state(|state| {
                assert!(state.comments.is_empty());
                assert_eq!(state.error_message.as_deref(), Some("Comment cannot be empty"));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn out_of_range_rating_is_rejected() {
        let rating = Rating::new("e".into(), "u".into(), 6.0, test_clock().now());
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState::default())
            .when_action(EventAction::AddRating { rating })
            .then_state(|state| {
                assert!(state.user_rating.is_none());
                assert_eq!(state.error_message.as_deref(), Some("Rating must be between 1 and 5"));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn rejected_rating_restores_previous() {
        let at = test_clock().now();
        let old = Rating::new("e".into(), "u".into(), 2.0, at);
        let expected = Some(old.clone());

        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState {
                user_rating: Some(old.clone()),
                ..EventState::default()
            })
            .when_action(EventAction::AddRating {
                rating: Rating::new("e".into(), "u".into(), 5.0, at),
            })
            .when_action(EventAction::RatingSubmitted {
                event_id: "e".into(),
                user_id: "u".into(),
                previous: Some(old),
                result: Err("denied".into()),
            })
            .then_state(move |state| assert_eq!(state.user_rating, expected))
            .run();
    }

    #[test]
    fn details_switch_clears_previous_event() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState {
                comments: vec![comment("on A")],
                ..viewing("sample-beach-cleanup")
            })
            .when_action(EventAction::LoadEventDetails {
                event_id: EventId::new("sample-food-festival"),
            })
            .then_state(|state| {
                assert!(state.is_viewing(&EventId::new("sample-food-festival")));
                assert!(state.current_event.is_none());
                assert!(state.comments.is_empty());
            })
            .run();
    }

    #[test]
    fn late_loads_for_previous_event_are_dropped() {
        let env = env();
        let beach = env.samples.find(&EventId::new("sample-beach-cleanup")).cloned();

        ReducerTest::new(TestReducer::new())
            .with_env(env)
            .given_state(viewing("sample-beach-cleanup"))
            .when_action(EventAction::LoadEventDetails {
                event_id: EventId::new("sample-food-festival"),
            })
            .when_action(EventAction::EventLoaded {
                event_id: EventId::new("sample-beach-cleanup"),
                result: Ok(beach),
            })
            .when_action(EventAction::CommentsLoaded {
                event_id: EventId::new("sample-beach-cleanup"),
                result: Ok(vec![comment("on A")]),
            })
            .when_action(EventAction::UserRatingLoaded {
                event_id: EventId::new("sample-beach-cleanup"),
                result: Ok(Some(Rating::new(
                    "sample-beach-cleanup".into(),
                    "u1".into(),
                    4.0,
                    test_clock().now(),
                ))),
            })
            .then_state(|state| {
                assert!(state.is_viewing(&EventId::new("sample-food-festival")));
                assert!(state.current_event.is_none());
                assert!(state.loading.details);
                assert!(state.comments.is_empty());
                assert!(state.user_rating.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn rejected_comment_after_navigating_away_leaves_new_event_alone() {
        let on_a = vec![comment("on A")];

        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState {
                comments: on_a.clone(),
                ..viewing("sample-beach-cleanup")
            })
            .when_action(EventAction::AddComment {
                comment: comment("second"),
            })
            .when_action(EventAction::LoadEventDetails {
                event_id: EventId::new("sample-food-festival"),
            })
            .when_action(EventAction::EventLoaded {
                event_id: EventId::new("sample-food-festival"),
                result: Ok(None),
            })
            .when_action(EventAction::CommentPosted {
                event_id: EventId::new("sample-beach-cleanup"),
                previous: on_a,
                result: Err("offline".into()),
            })
            .then_state(|state| {
                assert!(state.is_viewing(&EventId::new("sample-food-festival")));
                assert!(state.comments.is_empty());
                assert_eq!(state.error_message.as_deref(), Some("Failed to add comment: offline"));
            })
            .run();
    }

    #[test]
    fn rejected_rating_after_navigating_away_leaves_new_event_alone() {
        let at = test_clock().now();
        let old = Rating::new("sample-beach-cleanup".into(), "u1".into(), 2.0, at);

        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState {
                user_rating: Some(old.clone()),
                ..viewing("sample-beach-cleanup")
            })
            .when_action(EventAction::AddRating {
                rating: Rating::new("sample-beach-cleanup".into(), "u1".into(), 5.0, at),
            })
            .when_action(EventAction::LoadEventDetails {
                event_id: EventId::new("sample-food-festival"),
            })
            .when_action(EventAction::EventLoaded {
                event_id: EventId::new("sample-food-festival"),
                result: Ok(None),
            })
            .when_action(EventAction::RatingSubmitted {
                event_id: "sample-beach-cleanup".into(),
                user_id: "u1".into(),
                previous: Some(old),
                result: Err("denied".into()),
            })
            .then_state(|state| {
                assert!(state.is_viewing(&EventId::new("sample-food-festival")));
                assert!(state.user_rating.is_none());
                assert!(state.error_message.is_some());
            })
            .run();
    }

    #[test]
    fn confirmed_rating_for_previous_event_does_not_navigate_back() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(viewing("sample-food-festival"))
            .when_action(EventAction::RatingSubmitted {
                event_id: "sample-beach-cleanup".into(),
                user_id: "u1".into(),
                previous: None,
                result: Ok(RatingId::new("r1")),
            })
            .then_state(|state| {
                assert!(state.is_viewing(&EventId::new("sample-food-festival")));
                assert!(!state.loading.details);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn invalid_draft_is_rejected() {
        let mut draft = env().samples.all().remove(0).draft();
        draft.title = String::new();

        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState::default())
            .when_action(EventAction::CreateEvent {
                draft,
                organizer_id: "u".into(),
                image: None,
            })
            .then_state(|state| {
                assert!(!state.loading.saving);
                assert_eq!(state.error_message.as_deref(), Some("Title is required"));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn created_event_with_failed_image_reloads_and_warns() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState {
                loading: LoadingFlags {
                    saving: true,
                    ..Default::default()
                },
                ..EventState::default()
            })
            .when_action(EventAction::EventCreated {
                result: Ok(EventId::new("new")),
                image_error: Some("Image upload is not available in local mode".into()),
            })
            .then_state(|state| {
                assert!(!state.loading.saving);
                assert_eq!(
                    state.error_message.as_deref(),
                    Some("Event created but the image could not be uploaded: Image upload is not available in local mode")
                );
            })
            .then_effects(|effects| assert_eq!(assertions::count_futures(effects), 3))
            .run();
    }

    #[test]
    fn updated_event_with_failed_image_keeps_warning_after_reload() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState::default())
            .when_action(EventAction::EventUpdated {
                event_id: EventId::new("e"),
                result: Ok(()),
                image_error: Some("quota".into()),
            })
            .then_state(|state| {
                assert_eq!(
                    state.error_message.as_deref(),
                    Some("Event updated but the image could not be uploaded: quota")
                );
            })
            .then_effects(|effects| assert_eq!(assertions::count_futures(effects), 5))
            .run();
    }

    #[test]
    fn clear_error() {
        ReducerTest::new(TestReducer::new())
            .with_env(env())
            .given_state(EventState {
                error_message: Some("x".into()),
                ..EventState::default()
            })
            .when_action(EventAction::ClearError)
            .then_state(|state| assert!(state.error_message.is_none()))
            .run();
    }
}
