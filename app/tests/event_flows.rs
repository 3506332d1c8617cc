//! End-to-end event screen flows through the store runtime.
//!
//! Each test sends actions to a real [`Store`] and waits on the effect
//! handle, which covers the follow-up reloads as well.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use chrono::Duration;
use eventos_app::events::{EventAction, EventEnvironment, EventReducer, EventState};
use eventos_core::environment::Clock;
use eventos_data::mocks::{MemoryBlobStorage, MemoryDocumentStore};
use eventos_data::repository::COMMENTS;
use eventos_data::{
    BackendConfig, Comment, EventDraft, EventId, EventRepository, LocalEventRepository, Rating,
    RemoteEventRepository, UserId,
};
use eventos_runtime::Store;
use eventos_testing::{init_test_tracing, test_clock};
use std::sync::Arc;

type Remote = RemoteEventRepository<MemoryDocumentStore, MemoryBlobStorage>;
type EventStore<R> = Store<EventState, EventAction, EventEnvironment<R>, EventReducer<R>>;

fn remote() -> (Remote, MemoryDocumentStore) {
    let documents = MemoryDocumentStore::new();
    let repository = RemoteEventRepository::new(
        documents.clone(),
        MemoryBlobStorage::default(),
        Arc::new(test_clock()),
        BackendConfig::new("test-project"),
    );
    (repository, documents)
}

fn store<R: EventRepository>(repository: R, state: EventState) -> EventStore<R> {
    init_test_tracing();
    let environment = EventEnvironment::new(repository, Arc::new(test_clock()));
    Store::new(state, EventReducer::new(), environment)
}

async fn run<R: EventRepository>(store: &EventStore<R>, action: EventAction) {
    store.send(action).await.unwrap().wait().await;
}

fn draft(title: &str) -> EventDraft {
    EventDraft {
        title: title.to_string(),
        description: "Bring friends".to_string(),
        date: test_clock().now() + Duration::days(4),
        time: "6:00 PM".to_string(),
        location: "Town Square".to_string(),
        organizer_name: "Ana".to_string(),
    }
}

#[tokio::test]
async fn empty_store_shows_sorted_demo_events() {
    let (repository, _) = remote();
    let store = store(repository, EventState::default());

    run(&store, EventAction::LoadEvents).await;

    let (events, loading) = store.state(|s| (s.events.clone(), s.is_loading())).await;
    assert_eq!(events.len(), 3);
    assert!(events.windows(2).all(|w| w[0].date <= w[1].date));
    assert!(!loading);
}

#[tokio::test]
async fn failing_store_keeps_held_list() {
    let (repository, documents) = remote();
    let store = store(repository, EventState::default());
    run(&store, EventAction::CreateEvent {
        draft: draft("Held"),
        organizer_id: UserId::new("u1"),
        image: None,
    })
    .await;
    let held = store.state(|s| s.upcoming_events.clone()).await;
    assert_eq!(held.len(), 3);

    documents.fail_with("UNAVAILABLE: connection reset");
    run(&store, EventAction::LoadUpcomingEvents).await;

    assert_eq!(store.state(|s| s.upcoming_events.clone()).await, held);
}

#[tokio::test]
async fn rejected_comment_restores_previous_list() {
    let (repository, documents) = remote();
    let event_id = EventId::new("sample-beach-cleanup");
    let existing = Comment::new(event_id.clone(), "u2".into(), "Ben", "Count me in", test_clock().now());
    let store = store(
        repository,
        EventState {
            comments: vec![existing.clone()],
            ..EventState::default()
        },
    );

    documents.fail_collection(COMMENTS, "deadline exceeded");
    run(&store, EventAction::AddComment {
        comment: Comment::new(event_id, "u1".into(), "Ana", "Hello", test_clock().now()),
    })
    .await;

    let (comments, error) = store.state(|s| (s.comments.clone(), s.error_message.clone())).await;
    assert_eq!(comments, vec![existing]);
    assert_eq!(error.as_deref(), Some("Failed to add comment: deadline exceeded"));
}

#[tokio::test]
async fn accepted_comment_is_replaced_by_stored_copy() {
    let (repository, _) = remote();
    let event_id = EventId::new("e1");
    let store = store(repository, EventState::default());

    run(&store, EventAction::AddComment {
        comment: Comment::new(event_id, "u1".into(), "Ana", "Hello", test_clock().now()),
    })
    .await;

    let comments = store.state(|s| s.comments.clone()).await;
    assert_eq!(comments.len(), 1);
    assert!(!comments[0].id.as_str().starts_with("temp_"));
}

#[tokio::test]
async fn joining_demo_event_against_remote_store_rolls_back() {
    let (repository, _) = remote();
    let event_id = EventId::new("sample-entrepreneurs-fair");
    let store = store(repository, EventState::default());

    run(&store, EventAction::LoadEventDetails { event_id: event_id.clone() }).await;
    let before = store.state(|s| s.current_event.clone()).await;
    assert!(before.is_some());

    run(&store, EventAction::JoinEvent {
        event_id,
        user_id: UserId::new("newcomer"),
    })
    .await;

    let (after, error) = store.state(|s| (s.current_event.clone(), s.error_message.clone())).await;
    assert_eq!(after, before);
    assert_eq!(
        error.as_deref(),
        Some("This event does not exist in the database. You can only join events created in the app.")
    );
}

#[tokio::test]
async fn join_then_leave_against_local_store() {
    let clock = Arc::new(test_clock());
    let store = store(LocalEventRepository::new(clock), EventState::default());
    let event_id = EventId::new("sample-beach-cleanup");
    let user = UserId::new("newcomer");

    run(&store, EventAction::LoadEventDetails { event_id: event_id.clone() }).await;
    run(&store, EventAction::JoinEvent {
        event_id: event_id.clone(),
        user_id: user.clone(),
    })
    .await;

    let (attending, listed) = store
        .state(|s| {
            (
                s.current_event.as_ref().is_some_and(|e| e.is_attending(&user)),
                s.events.iter().any(|e| e.id == event_id && e.is_attending(&user)),
            )
        })
        .await;
    assert!(attending);
    assert!(listed);

    run(&store, EventAction::LeaveEvent {
        event_id: event_id.clone(),
        user_id: user.clone(),
    })
    .await;
    let attending = store
        .state(|s| s.current_event.as_ref().is_some_and(|e| e.is_attending(&user)))
        .await;
    assert!(!attending);
}

#[tokio::test]
async fn rerating_replaces_previous_score() {
    let (repository, _) = remote();
    let user = UserId::new("u1");
    let event_id = repository.create_event(eventos_data::Event::from_draft(
        draft("Rated"),
        user.clone(),
        test_clock().now(),
    ))
    .await
    .unwrap();
    let store = store(repository, EventState::default());
    let at = test_clock().now();

    run(&store, EventAction::AddRating {
        rating: Rating::new(event_id.clone(), user.clone(), 2.0, at),
    })
    .await;
    run(&store, EventAction::AddRating {
        rating: Rating::new(event_id.clone(), user.clone(), 4.0, at),
    })
    .await;

    let (event, mine) = store.state(|s| (s.current_event.clone(), s.user_rating.clone())).await;
    let event = event.unwrap();
    assert_eq!(event.total_ratings, 1);
    assert!((event.average_rating - 4.0).abs() < f64::EPSILON);
    assert!((mine.unwrap().score - 4.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn create_with_image_in_local_mode_warns_but_saves() {
    let clock = Arc::new(test_clock());
    let store = store(LocalEventRepository::new(clock), EventState::default());

    run(&store, EventAction::CreateEvent {
        draft: draft("Picnic"),
        organizer_id: UserId::new("u1"),
        image: Some(vec![1, 2, 3]),
    })
    .await;

    let (titles, error, saving) = store
        .state(|s| {
            (
                s.upcoming_events.iter().map(|e| e.title.clone()).collect::<Vec<_>>(),
                s.error_message.clone(),
                s.loading.saving,
            )
        })
        .await;
    assert!(titles.contains(&"Picnic".to_string()));
    assert!(!saving);
    assert_eq!(
        error.as_deref(),
        Some("Event created but the image could not be uploaded: Image upload is not available in local mode")
    );
}

#[tokio::test]
async fn create_with_image_in_remote_mode_links_image() {
    let (repository, _) = remote();
    let store = store(repository, EventState::default());

    run(&store, EventAction::CreateEvent {
        draft: draft("Concert"),
        organizer_id: UserId::new("u1"),
        image: Some(vec![9]),
    })
    .await;

    let created = store
        .state(|s| s.events.iter().find(|e| e.title == "Concert").cloned())
        .await
        .unwrap();
    assert_eq!(
        created.image_url,
        Some(format!("memory://blobs/event_images/{}.jpg", created.id))
    );
}

#[tokio::test]
async fn update_reloads_details() {
    let clock = Arc::new(test_clock());
    let store = store(LocalEventRepository::new(clock), EventState::default());
    let event_id = EventId::new("sample-food-festival");

    run(&store, EventAction::LoadEventDetails { event_id: event_id.clone() }).await;
    let mut edited = store.state(|s| s.current_event.clone()).await.unwrap().draft();
    edited.title = "Food & Music Festival".to_string();

    run(&store, EventAction::UpdateEvent {
        event_id,
        draft: edited,
        image: None,
    })
    .await;

    let (title, past_title) = store
        .state(|s| {
            (
                s.current_event.as_ref().map(|e| e.title.clone()),
                s.past_events.first().map(|e| e.title.clone()),
            )
        })
        .await;
    assert_eq!(title.as_deref(), Some("Food & Music Festival"));
    assert_eq!(past_title.as_deref(), Some("Food & Music Festival"));
}
