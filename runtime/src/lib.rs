//! # Eventos Runtime
//!
//! Store runtime for Eventos view-state holders.
//!
//! A [`Store`] owns one view state, serializes every reducer call behind a
//! write lock (one writer per holder), and executes the effects the reducer
//! returns on the tokio runtime. Actions produced by effects are fed back into
//! the same store, which is how backend outcomes reach the view state.
//!
//! ## Example
//!
//! ```ignore
//! use eventos_runtime::Store;
//!
//! let store = Store::new(EventState::default(), EventReducer::new(), env);
//!
//! // Join optimistically; the handle resolves after the backend call and
//! // the reconciling reloads have all landed.
//! let mut handle = store.send(EventAction::JoinEvent { event_id, user_id }).await?;
//! handle.wait().await;
//!
//! let attendees = store.state(|s| s.current_event.clone()).await;
//! ```

use eventos_core::{effect::Effect, reducer::Reducer};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// Returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),
    }
}

pub use error::StoreError;

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`]. Effects started by the action, and effects
/// started by the actions those effects feed back, all count against the same
/// handle, so [`EffectHandle::wait`] resolves once the whole cascade is done.
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new handle together with its internal tracking context
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Number of effects still running for this handle
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Every tracker is gone, so nothing can still be running
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns `Err(())` if the timeout expires before all effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), ()> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| ())
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Keeps the counter honest even if the effect future panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, DecrementGuard, Duration, Effect,
        EffectHandle, EffectTracking, Ordering, Reducer, RwLock, StoreError,
    };
    use tokio::sync::broadcast;

    /// The Store - runtime coordinator for a view-state reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`, written only by the reducer)
    /// 2. Reducer (view-state logic)
    /// 3. Environment (injected repositories and clock)
    /// 4. Effect execution (with feedback loop)
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        /// Actions produced by effects, for observers that redraw on change
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// The action broadcast keeps the 16 most recent actions for slow
        /// observers; use [`Store::with_broadcast_capacity`] to change that.
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_broadcast_capacity(initial_state, reducer, environment, 16)
        }

        /// Create a store with a custom action broadcast capacity
        #[must_use]
        pub fn with_broadcast_capacity(
            initial_state: S,
            reducer: R,
            environment: E,
            capacity: usize,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Spawns the returned effects
        ///
        /// `send()` returns once the reducer has run, so optimistic state is
        /// already visible; the returned handle tracks the effects.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            let (handle, tracking) = EffectHandle::new();
            self.dispatch(action, &tracking).await;
            Ok(handle)
        }

        /// Run the reducer and start its effects under the given tracking
        async fn dispatch(&self, action: A, tracking: &EffectTracking) {
            metrics::counter!("store.actions.total").increment(1);

            let effects = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");
                self.reducer.reduce(&mut *state, action, &self.environment)
            };

            tracing::trace!("Reducer returned {} effects", effects.len());
            for effect in effects {
                self.execute_effect(effect, tracking);
            }
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.events.len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Subscribe to actions produced by effects
        ///
        /// UI layers use this as a "state changed" signal and re-read state.
        #[must_use]
        pub fn subscribe(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Number of effects currently running on this store
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::SeqCst)
        }

        /// Stop accepting new actions and wait for running effects
        ///
        /// Results of effects already in flight are still applied.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if effects are still
        /// running after `timeout`.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            self.shutdown.store(true, Ordering::Release);

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(pending_effects = pending, "Shutdown timed out");
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Execute an effect with tracking
        ///
        /// - `None`: No-op
        /// - `Future`: Spawned; a resulting action is broadcast and fed back
        ///   into the store under the same tracking
        /// - `Parallel`: Each child executed with the same tracking
        ///
        /// A panicking effect is contained in its task; the guards keep both
        /// counters consistent.
        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
            match effect {
                Effect::None => {
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Future(fut) => {
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    tracking.increment();

                    self.pending_effects.fetch_add(1, Ordering::SeqCst);
                    let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                    let tracking = tracking.clone();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = DecrementGuard(tracking.clone());
                        let _pending_guard = pending_guard;

                        if let Some(action) = fut.await {
                            tracing::trace!("Effect::Future produced an action, feeding back");
                            let _ = store.action_broadcast.send(action.clone());
                            store.dispatch(action, &tracking).await;
                        } else {
                            tracing::trace!("Effect::Future completed with no action");
                        }
                    });
                },
                Effect::Parallel(effects) => {
                    metrics::counter!("store.effects.executed", "type" => "parallel").increment(1);
                    for effect in effects {
                        self.execute_effect(effect, tracking);
                    }
                },
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;
    use eventos_core::{smallvec, SmallVec};

    #[derive(Debug, Clone)]
    struct TestState {
        value: i32,
    }

    #[derive(Debug, Clone)]
    enum TestAction {
        Increment,
        NoOp,
        ProduceEffect,
        ProduceChain,
        ProduceParallelEffects,
        ProduceSlowEffect,
        ProducePanickingEffect,
    }

    #[derive(Debug, Clone)]
    struct TestEnv;

    #[derive(Debug, Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment => {
                    state.value += 1;
                    smallvec![Effect::None]
                },
                TestAction::NoOp => smallvec![Effect::None],
                TestAction::ProduceEffect => {
                    smallvec![Effect::task(async { TestAction::Increment })]
                },
                TestAction::ProduceChain => {
                    // Feedback action starts its own effect
                    smallvec![Effect::task(async { TestAction::ProduceEffect })]
                },
                TestAction::ProduceParallelEffects => smallvec![Effect::Parallel(vec![
                    Effect::task(async { TestAction::Increment }),
                    Effect::task(async { TestAction::Increment }),
                    Effect::task(async { TestAction::Increment }),
                ])],
                TestAction::ProduceSlowEffect => smallvec![Effect::task(async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    TestAction::Increment
                })],
                TestAction::ProducePanickingEffect => {
                    #[allow(clippy::panic)] // Intentional panic for testing containment
                    {
                        smallvec![Effect::Future(Box::pin(async {
                            panic!("Intentional panic in effect for testing");
                        }))]
                    }
                },
            }
        }
    }

    fn store() -> Store<TestState, TestAction, TestEnv, TestReducer> {
        Store::new(TestState { value: 0 }, TestReducer, TestEnv)
    }

    #[tokio::test]
    async fn test_send_action_updates_state_before_returning() {
        let store = store();

        let _ = store.send(TestAction::Increment).await;
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_effect_none_leaves_state() {
        let store = store();

        if let Ok(mut handle) = store.send(TestAction::NoOp).await {
            assert_eq!(handle.pending(), 0);
            handle.wait().await;
        }
        assert_eq!(store.state(|s| s.value).await, 0);
    }

    #[tokio::test]
    async fn test_future_effect_feeds_action_back() {
        let store = store();

        if let Ok(mut handle) = store.send(TestAction::ProduceEffect).await {
            handle.wait().await;
        }
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_handle_waits_for_cascading_effects() {
        let store = store();

        if let Ok(mut handle) = store.send(TestAction::ProduceChain).await {
            handle.wait().await;
            assert_eq!(handle.pending(), 0);
        }
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_parallel_effects() {
        let store = store();

        if let Ok(mut handle) = store.send(TestAction::ProduceParallelEffects).await {
            handle.wait().await;
        }
        assert_eq!(store.state(|s| s.value).await, 3);
    }

    #[tokio::test]
    async fn test_wait_with_timeout_expires() {
        let store = store();

        if let Ok(mut handle) = store.send(TestAction::ProduceSlowEffect).await {
            assert!(handle.wait_with_timeout(Duration::from_millis(1)).await.is_err());
            assert!(handle.wait_with_timeout(Duration::from_secs(5)).await.is_ok());
        }
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_panicking_effect_is_contained() {
        let store = store();

        if let Ok(mut handle) = store.send(TestAction::ProducePanickingEffect).await {
            assert!(handle.wait_with_timeout(Duration::from_secs(5)).await.is_ok());
        }

        let _ = store.send(TestAction::Increment).await;
        assert_eq!(store.state(|s| s.value).await, 1);
        assert_eq!(store.pending_effects(), 0);
    }

    #[tokio::test]
    async fn test_subscribers_see_effect_actions() {
        let store = store();
        let mut rx = store.subscribe();

        if let Ok(mut handle) = store.send(TestAction::ProduceEffect).await {
            handle.wait().await;
        }

        let observed = rx.recv().await;
        assert!(matches!(observed, Ok(TestAction::Increment)));
    }

    #[tokio::test]
    async fn test_shutdown_drains_and_rejects() {
        let store = store();

        let _ = store.send(TestAction::ProduceSlowEffect).await;
        assert_eq!(store.shutdown(Duration::from_secs(5)).await, Ok(()));

        // In-flight result still landed
        assert_eq!(store.state(|s| s.value).await, 1);
        assert_eq!(
            store.send(TestAction::Increment).await.err(),
            Some(StoreError::ShutdownInProgress)
        );
    }

    #[test]
    fn test_completed_handle_has_nothing_pending() {
        assert_eq!(EffectHandle::completed().pending(), 0);
    }
}
