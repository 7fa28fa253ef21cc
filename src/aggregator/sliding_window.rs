//! Fixed-capacity rolling buffer of recent log events

use crate::events::LogEvent;
use std::collections::VecDeque;

/// Upper bound on the buffer allocated up front; larger windows grow on demand
const INITIAL_ALLOCATION: usize = 1024;

/// Sliding window over the most recent `capacity` log events
///
/// Appending past capacity evicts the oldest event. A zero-capacity window is
/// allowed and simply stays empty.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    /// Events in arrival order, oldest at the front
    events: VecDeque<LogEvent>,
    /// Maximum number of events retained
    capacity: usize,
}

impl SlidingWindow {
    /// Create an empty window holding at most `capacity` events
    ///
    /// # Examples
    ///
    /// ```
    /// use poolwatch::aggregator::SlidingWindow;
    ///
    /// let window = SlidingWindow::new(200);
    /// assert!(window.is_empty());
    /// ```
    pub fn new(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(INITIAL_ALLOCATION)),
            capacity,
        }
    }

    /// Add an event at the tail, evicting from the head if over capacity
    pub fn append(&mut self, event: LogEvent) {
        if self.capacity == 0 {
            return;
        }
        self.events.push_back(event);
        self.enforce_capacity();
    }

    /// Number of events currently held
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are held
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Maximum number of events retained
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate over the current contents, oldest to newest
    pub fn snapshot(&self) -> impl ExactSizeIterator<Item = &LogEvent> + '_ {
        self.events.iter()
    }

    /// Removes oldest entries while the buffer exceeds capacity
    fn enforce_capacity(&mut self) {
        while self.events.len() > self.capacity {
            self.events.pop_front();
        }
    }
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new(200)
    }
}
