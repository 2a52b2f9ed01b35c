//! Intent / reducer / state primitives for the feed core.
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ Subscriber
//!    ↑                                 │
//!    └─────────────────────────────────┘
//! ```
//!
//! A [`Store`] owns one reducer's state and is the only place intents are
//! applied, so every transition can be tested without I/O.

/// Snapshot of everything a subscriber renders.
pub trait State: Clone + PartialEq + Default + Send + 'static {}

/// User action or completion of asynchronous work.
pub trait Intent: Send + 'static {}

/// Pure transition function: (State, Intent) -> State.
pub trait Reducer {
    type State: State;
    type Intent: Intent;

    /// No I/O, no clocks, no side effects.
    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State;
}

/// Current state of a single reducer.
pub struct Store<R: Reducer> {
    state: R::State,
}

impl<R: Reducer> Default for Store<R> {
    fn default() -> Self {
        Self {
            state: R::State::default(),
        }
    }
}

impl<R: Reducer> Store<R> {
    pub fn state(&self) -> &R::State {
        &self.state
    }

    /// Apply `intent`; returns whether the state changed.
    pub fn dispatch(&mut self, intent: R::Intent) -> bool {
        let next = R::reduce(self.state.clone(), intent);
        let changed = next != self.state;
        self.state = next;
        changed
    }
}
