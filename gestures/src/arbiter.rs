//! The protocol between recognizers and the arbiter that decides which recognizer owns a touch.
//!
//! All recognizers of a window share one arbiter. Per touch it tracks any number of candidates
//! and at most one owner. Recognizers talk to it through [`TouchArbiter`] and receive its
//! decisions as [`OwnershipEvent`]s and unowned touch updates.

use std::{
    cell::RefCell,
    sync::atomic::{AtomicU64, Ordering},
};

use derive_more::{Display, From};

use tactile_input::TouchId;

/// Identifies a recognizer towards the arbiter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, From, Display)]
#[display("recognizer {_0}")]
pub struct RecognizerId(u64);

impl RecognizerId {
    /// A process-wide unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

pub trait TouchArbiter: std::fmt::Debug {
    /// Registers interest in owning `touch`. The arbiter sends the recognizer unowned updates of
    /// the touch until ownership gets granted or lost.
    fn add_candidate_owner(&self, touch: TouchId, recognizer: RecognizerId);
    fn remove_candidate_owner(&self, touch: TouchId, recognizer: RecognizerId);
    /// Takes ownership of `touch`. All other candidates and the previous owner lose it.
    fn request_ownership(&self, touch: TouchId, recognizer: RecognizerId);
    /// Subscribes to the remaining updates of `touch` without any interest in owning it.
    fn add_touch_watcher(&self, touch: TouchId, recognizer: RecognizerId);
}

/// An ownership decision of the arbiter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OwnershipEvent {
    Granted(TouchId),
    /// Ownership or candidacy was given to another recognizer.
    Lost(TouchId),
}

impl OwnershipEvent {
    pub fn touch(&self) -> TouchId {
        match *self {
            Self::Granted(touch) | Self::Lost(touch) => touch,
        }
    }
}

/// A request a recognizer made to the arbiter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ArbiterRequest {
    AddCandidateOwner(TouchId, RecognizerId),
    RemoveCandidateOwner(TouchId, RecognizerId),
    RequestOwnership(TouchId, RecognizerId),
    AddTouchWatcher(TouchId, RecognizerId),
}

/// An arbiter that decides nothing and records all requests.
///
/// Sufficient for hosts with a single recognizer per touch, and for replays and tests.
#[derive(Debug, Default)]
pub struct RecordingArbiter {
    requests: RefCell<Vec<ArbiterRequest>>,
}

impl RecordingArbiter {
    pub fn requests(&self) -> Vec<ArbiterRequest> {
        self.requests.borrow().clone()
    }

    /// Returns and forgets the recorded requests.
    pub fn take(&self) -> Vec<ArbiterRequest> {
        self.requests.take()
    }

    fn record(&self, request: ArbiterRequest) {
        self.requests.borrow_mut().push(request);
    }
}

impl TouchArbiter for RecordingArbiter {
    fn add_candidate_owner(&self, touch: TouchId, recognizer: RecognizerId) {
        self.record(ArbiterRequest::AddCandidateOwner(touch, recognizer));
    }

    fn remove_candidate_owner(&self, touch: TouchId, recognizer: RecognizerId) {
        self.record(ArbiterRequest::RemoveCandidateOwner(touch, recognizer));
    }

    fn request_ownership(&self, touch: TouchId, recognizer: RecognizerId) {
        self.record(ArbiterRequest::RequestOwnership(touch, recognizer));
    }

    fn add_touch_watcher(&self, touch: TouchId, recognizer: RecognizerId) {
        self.record(ArbiterRequest::AddTouchWatcher(touch, recognizer));
    }
}
