//! # Eventos Core
//!
//! Core traits and types for the Eventos view-state architecture.
//!
//! Every screen-level view-state holder is a reducer run by a store:
//!
//! - **State**: what the UI renders (event lists, the current event, the session)
//! - **Action**: user intents plus the outcomes of backend calls
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: a description of a backend call, executed by the runtime
//! - **Environment**: injected repositories and clock
//!
//! Reducers patch state synchronously (including optimistic updates) and hand
//! the slow part to the runtime as an [`effect::Effect::Future`]. The future
//! resolves to another action, which the reducer uses to confirm or roll back.
//!
//! ## Example
//!
//! ```
//! use eventos_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct CounterState {
//!     count: i32,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CounterState,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => state.count += 1,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = CounterState::default();
//! let _ = CounterReducer.reduce(&mut state, CounterAction::Increment, &());
//! assert_eq!(state.count, 1);
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{smallvec, SmallVec};

/// Reducer module - The core trait for view-state logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all state-transition logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for view-state logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The view state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// Effects to be executed by the runtime. Most actions produce zero or
        /// one effect, hence the inline capacity of four.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values, not execution.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what should happen,
    /// returned from reducers and executed by the Store runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects in parallel
        Parallel(Vec<Effect<Action>>),

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Wrap an async computation that always yields an action
        #[must_use]
        pub fn task<F>(fut: F) -> Self
        where
            F: Future<Output = Action> + Send + 'static,
        {
            Effect::Future(Box::pin(async move { Some(fut.await) }))
        }

        /// Combine effects to run in parallel
        ///
        /// `Effect::None` entries are dropped, and a single remaining effect
        /// is returned unwrapped.
        #[must_use]
        pub fn merge(effects: impl IntoIterator<Item = Effect<Action>>) -> Effect<Action> {
            let mut effects: Vec<_> = effects
                .into_iter()
                .filter(|effect| !effect.is_none())
                .collect();

            match effects.len() {
                0 => Effect::None,
                1 => effects.pop().unwrap_or(Effect::None),
                _ => Effect::Parallel(effects),
            }
        }

        /// Returns `true` for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// Upcoming/past partitioning, optimistic comment timestamps and sample
    /// data dates all read "now" through this trait.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
