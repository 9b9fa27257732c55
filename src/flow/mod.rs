//! Booking flow orchestration.
//!
//! Each flow moves `Idle -> Validating -> Calculating -> Ready`, or ends in
//! `Error` with neutral numbers. Starting a recalculation clears the numbers
//! and takes a new generation number; a result that arrives after a newer
//! calculation started is dropped, so a slow stale quote never overwrites a
//! fresher one. A ready estimate remembers the inputs it was priced for.

pub mod circuit;
pub mod trip;
pub mod validation;

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;

pub use circuit::CircuitCalculator;
pub use trip::TripCalculator;
pub use validation::ValidationError;

/// Where a flow currently stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "lowercase")]
pub enum FlowState {
    Idle,
    Validating,
    Calculating,
    Ready,
    Error(String),
}

impl FlowState {
    pub fn error(&self) -> Option<&str> {
        match self {
            FlowState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Submission is only offered on a priced, error-free flow
    pub fn can_submit(&self) -> bool {
        matches!(self, FlowState::Ready)
    }
}

/// State plus the numbers shown alongside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowView<E> {
    pub state: FlowState,
    pub estimate: E,
}

#[derive(Debug)]
struct Slot<E, K> {
    view: FlowView<E>,
    /// Inputs behind a `Ready` estimate
    priced: Option<K>,
}

/// Shared state machine with a latest-request-wins guard.
///
/// `K` identifies the inputs a price depends on.
#[derive(Debug)]
pub struct Flow<E, K> {
    generation: AtomicU64,
    neutral: E,
    slot: Mutex<Slot<E, K>>,
}

impl<E: Clone, K: Clone + PartialEq> Flow<E, K> {
    pub fn new(neutral: E) -> Self {
        Self {
            generation: AtomicU64::new(0),
            slot: Mutex::new(Slot {
                view: FlowView {
                    state: FlowState::Idle,
                    estimate: neutral.clone(),
                },
                priced: None,
            }),
            neutral,
        }
    }

    /// Start a new calculation, superseding any in flight; numbers go back to neutral
    pub fn begin(&self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let neutral = self.neutral.clone();
        self.apply(generation, FlowState::Validating, Some(neutral), None);
        generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub fn calculating(&self, generation: u64) -> bool {
        self.apply(generation, FlowState::Calculating, None, None)
    }

    /// Publish the estimate priced for `inputs`
    pub fn ready(&self, generation: u64, inputs: K, estimate: E) -> bool {
        self.apply(generation, FlowState::Ready, Some(estimate), Some(inputs))
    }

    /// Record a failure; numbers go back to neutral
    pub fn fail(&self, generation: u64, message: impl Into<String>) -> bool {
        let neutral = self.neutral.clone();
        self.apply(generation, FlowState::Error(message.into()), Some(neutral), None)
    }

    /// Back to `Idle`, discarding anything in flight
    pub fn reset(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let neutral = self.neutral.clone();
        self.apply(generation, FlowState::Idle, Some(neutral), None);
    }

    pub fn snapshot(&self) -> FlowView<E> {
        self.lock().view.clone()
    }

    pub fn state(&self) -> FlowState {
        self.lock().view.state.clone()
    }

    /// The ready estimate, only if it was priced for exactly `inputs`
    pub fn priced_for(&self, inputs: &K) -> Option<E> {
        let slot = self.lock();
        match &slot.priced {
            Some(priced) if slot.view.state.can_submit() && priced == inputs => {
                Some(slot.view.estimate.clone())
            }
            _ => None,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot<E, K>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn apply(&self, generation: u64, state: FlowState, estimate: Option<E>, inputs: Option<K>) -> bool {
        let mut slot = self.lock();
        // Checked under the lock so a newer begin() cannot interleave
        if !self.is_current(generation) {
            debug!("Discarding superseded result (generation {})", generation);
            return false;
        }
        slot.view.state = state;
        if let Some(estimate) = estimate {
            slot.view.estimate = estimate;
        }
        slot.priced = inputs;
        true
    }
}
