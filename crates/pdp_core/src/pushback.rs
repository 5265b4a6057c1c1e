use std::collections::VecDeque;

/// Number of most recent observations kept in the rolling window.
pub const WINDOW_CAPACITY: usize = 6;

/// Rolling window of pushback observations, one per completed work item.
///
/// An observation is `true` when any attempt for that item hit a
/// rate-limit/forbidden response. The oldest observation is evicted once
/// the window is full.
#[derive(Debug, Clone)]
pub struct PushbackWindow {
    observations: VecDeque<bool>,
    capacity: usize,
}

impl Default for PushbackWindow {
    fn default() -> Self {
        Self::new(WINDOW_CAPACITY)
    }
}

impl PushbackWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            observations: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends one observation, evicting the oldest on overflow.
    pub fn record(&mut self, pushback: bool) {
        self.observations.push_back(pushback);
        while self.observations.len() > self.capacity {
            self.observations.pop_front();
        }
    }

    /// Fraction of pushback observations in the window, 0.0 when empty.
    pub fn ratio(&self) -> f64 {
        if self.observations.is_empty() {
            return 0.0;
        }
        let hits = self.observations.iter().filter(|seen| **seen).count();
        hits as f64 / self.observations.len() as f64
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
