/// A single shot timer that bounds how long a touch may stay undecided.
///
/// The timer does not fire by itself. The host schedules a wake-up at [`Self::deadline`] and the
/// owner checks [`Self::has_elapsed`]. A stopped timer never elapses, so a wake-up that arrives
/// after the owner moved on is harmless.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RecognitionTimer {
    interval_ms: u64,
    deadline_ms: Option<u64>,
}

impl RecognitionTimer {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            deadline_ms: None,
        }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(self.interval_ms));
    }

    pub fn stop(&mut self) {
        self.deadline_ms = None;
    }

    /// Changes the interval. A running timer keeps its current deadline.
    pub fn set_interval(&mut self, interval_ms: u64) {
        self.interval_ms = interval_ms;
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline_ms
    }

    pub fn has_elapsed(&self, now_ms: u64) -> bool {
        self.deadline_ms.is_some_and(|deadline| now_ms >= deadline)
    }
}
