use std::time::{Duration, Instant};

/// Quiet period before a typed query is used for filtering.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// Query text as typed (`live`) and as used for filtering (`settled`).
///
/// Each edit of the live text replaces the single pending deadline; the
/// owner's event loop calls [`QueryBuffer::poll`] and the live text is copied
/// to `settled` once a deadline passes without further edits. The deadline
/// lives inside the buffer, so nothing can settle after it is dropped.
#[derive(Debug, Clone)]
pub struct QueryBuffer {
    live: String,
    settled: String,
    deadline: Option<Instant>,
    window: Duration,
}

impl Default for QueryBuffer {
    fn default() -> Self {
        QueryBuffer::new()
    }
}

impl QueryBuffer {
    pub fn new() -> Self {
        QueryBuffer::with_window(DEBOUNCE_WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        QueryBuffer {
            live: String::new(),
            settled: String::new(),
            deadline: None,
            window,
        }
    }

    pub fn live(&self) -> &str {
        &self.live
    }

    pub fn settled(&self) -> &str {
        &self.settled
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Replaces the live text and restarts the debounce window from `now`.
    pub fn set(&mut self, query: impl Into<String>, now: Instant) {
        self.live = query.into();
        self.deadline = Some(now + self.window);
    }

    pub fn push(&mut self, c: char, now: Instant) {
        self.live.push(c);
        self.deadline = Some(now + self.window);
    }

    pub fn pop(&mut self, now: Instant) {
        if self.live.pop().is_some() {
            self.deadline = Some(now + self.window);
        }
    }

    /// Sets live and settled text together, dropping any pending deadline.
    pub fn commit(&mut self, query: impl Into<String>) {
        self.live = query.into();
        self.settled = self.live.clone();
        self.deadline = None;
    }

    /// Empties both live and settled text immediately.
    pub fn clear(&mut self) {
        self.live.clear();
        self.settled.clear();
        self.deadline = None;
    }

    /// Drops the pending deadline, if any, leaving the settled text as is.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Settles the live text if the pending deadline has passed.
    ///
    /// Returns `true` when the settled text changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                if self.settled != self.live {
                    self.settled.clone_from(&self.live);
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    /// Time left before the pending deadline, `None` when nothing is pending.
    pub fn time_until_settle(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }
}
