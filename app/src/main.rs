//! Eventos demo client.
//!
//! Drives both view-state holders through a short scripted session against
//! the in-memory backends, logging what a UI would render.

use anyhow::Context;
use chrono::Duration;
use eventos_app::auth::{AuthAction, AuthEnvironment, AuthReducer, AuthState};
use eventos_app::config::{BackendKind, Config};
use eventos_app::events::{EventAction, EventEnvironment, EventReducer, EventState};
use eventos_core::environment::{Clock, SystemClock};
use eventos_data::mocks::{MemoryBlobStorage, MemoryDocumentStore, MemoryIdentityProvider};
use eventos_data::{
    AuthRepository, Comment, EventDraft, EventRepository, LocalEventRepository, Rating,
    RemoteEventRepository, User,
};
use eventos_runtime::Store;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventos=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(backend = ?config.backend, project_id = %config.project_id, "Configuration loaded");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let documents = MemoryDocumentStore::new();
    let blobs = MemoryBlobStorage::default();

    // Session
    let auth_repository = AuthRepository::new(
        MemoryIdentityProvider::new(),
        documents.clone(),
        blobs.clone(),
        clock.clone(),
        config.backend_config(),
    );
    let auth = Store::new(
        AuthState::default(),
        AuthReducer::new(),
        AuthEnvironment::new(auth_repository, clock.clone()),
    );

    auth.send(AuthAction::CheckSession).await?.wait().await;
    auth.send(AuthAction::SignUpWithEmail {
        email: "ana@example.com".to_string(),
        password: "secret123".to_string(),
        name: "Ana".to_string(),
    })
    .await?
    .wait()
    .await;

    let (user, info_message) = auth
        .state(|s| (s.current_user.clone(), s.info_message.clone()))
        .await;
    let user = user.context("sign-up did not produce a signed-in user")?;
    info!(uid = %user.id, name = %user.name, info = ?info_message, "Signed in");

    match config.backend {
        BackendKind::Local => {
            let repository = LocalEventRepository::new(clock.clone());
            run_event_screens(repository, clock, &config, &user).await?;
        },
        BackendKind::Remote => {
            let repository =
                RemoteEventRepository::new(documents, blobs, clock.clone(), config.backend_config());
            run_event_screens(repository, clock, &config, &user).await?;
        },
    }

    auth.send(AuthAction::SignOut).await?.wait().await;
    auth.shutdown(std::time::Duration::from_secs(5)).await?;
    info!("Signed out");
    Ok(())
}

async fn run_event_screens<R: EventRepository>(
    repository: R,
    clock: Arc<dyn Clock>,
    config: &Config,
    user: &User,
) -> anyhow::Result<()> {
    let environment =
        EventEnvironment::new(repository, clock.clone()).with_sample_merging(config.include_sample_events);
    let store = Store::new(EventState::default(), EventReducer::new(), environment);

    // List screens
    let handles = futures::future::try_join_all([
        store.send(EventAction::LoadEvents),
        store.send(EventAction::LoadUpcomingEvents),
        store.send(EventAction::LoadPastEvents),
    ])
    .await?;
    for mut handle in handles {
        handle.wait().await;
    }
    log_lists(&store).await;

    // Create screen
    let draft = EventDraft {
        title: "Neighborhood Book Swap".to_string(),
        description: "Bring a book, take a book.".to_string(),
        date: clock.now() + Duration::days(5),
        time: "11:00 AM".to_string(),
        location: "Public Library".to_string(),
        organizer_name: user.name.clone(),
    };
    store
        .send(EventAction::CreateEvent {
            draft,
            organizer_id: user.id.clone(),
            image: Some(vec![0xFF, 0xD8, 0xFF]),
        })
        .await?
        .wait()
        .await;
    if let Some(message) = store.state(|s| s.error_message.clone()).await {
        warn!(%message, "Create screen banner");
        store.send(EventAction::ClearError).await?;
    }
    log_lists(&store).await;

    // Details screen
    let created = store
        .state(|s| {
            s.upcoming_events
                .iter()
                .find(|e| e.title == "Neighborhood Book Swap")
                .map(|e| e.id.clone())
        })
        .await
        .context("created event is not listed")?;

    store
        .send(EventAction::LoadEventDetails { event_id: created.clone() })
        .await?
        .wait()
        .await;
    store
        .send(EventAction::JoinEvent {
            event_id: created.clone(),
            user_id: user.id.clone(),
        })
        .await?
        .wait()
        .await;
    store
        .send(EventAction::AddComment {
            comment: Comment::new(created.clone(), user.id.clone(), user.name.clone(), "See you there!", clock.now()),
        })
        .await?
        .wait()
        .await;
    store
        .send(EventAction::AddRating {
            rating: Rating::new(created.clone(), user.id.clone(), 5.0, clock.now()),
        })
        .await?
        .wait()
        .await;

    let (event, comments) = store
        .state(|s| (s.current_event.clone(), s.comments.len()))
        .await;
    if let Some(event) = event {
        info!(
            title = %event.title,
            attendees = event.attendees.len(),
            average_rating = event.average_rating,
            comments,
            "Details screen"
        );
        info!("Share text:\n{}", event.share_text());
    }

    // Joining a demo event only works when it exists in the backing store.
    store
        .send(EventAction::JoinEvent {
            event_id: "sample-beach-cleanup".into(),
            user_id: user.id.clone(),
        })
        .await?
        .wait()
        .await;
    if let Some(message) = store.state(|s| s.error_message.clone()).await {
        warn!(%message, "Details screen banner");
    }

    store.shutdown(std::time::Duration::from_secs(5)).await?;
    Ok(())
}

async fn log_lists<R: EventRepository>(store: &Store<EventState, EventAction, EventEnvironment<R>, EventReducer<R>>) {
    let (all, upcoming, past) = store
        .state(|s| (s.events.len(), s.upcoming_events.len(), s.past_events.len()))
        .await;
    info!(all, upcoming, past, "Event lists");
}
