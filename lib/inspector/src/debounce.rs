//! The commit timer behind debounced form writes.
//!
//! A field group moves `Idle -> Pending { deadline } -> Idle` (on fire
//! or cancel). Each edit re-arms the deadline to one full quiescence
//! window from now, so the commit happens only after typing stops. The
//! timer is owned by the engine and cancelled on re-selection and
//! teardown; a cancelled timer can never fire.

use std::time::Duration;
use tokio::time::Instant;

/// A cancellable quiescence timer.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Creates an idle timer with the given quiescence window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Changes the window for subsequent edits; a pending deadline is
    /// left as armed.
    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    /// Re-arms the deadline to one window from `now`.
    pub fn note_edit(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// The pending deadline, if armed.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True while an uncommitted edit is waiting.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fires if the deadline has passed. Returns true exactly once per
    /// armed deadline.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Disarms the timer. Returns true if it was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_after_the_window() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();
        debouncer.note_edit(start);

        assert!(!debouncer.fire_due(start + Duration::from_millis(299)));
        assert!(debouncer.is_pending());
        assert!(debouncer.fire_due(start + Duration::from_millis(300)));
        assert!(!debouncer.is_pending());
        // Fires once.
        assert!(!debouncer.fire_due(start + Duration::from_secs(10)));
    }

    #[test]
    fn each_edit_re_arms_the_deadline() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let start = Instant::now();
        debouncer.note_edit(start);
        debouncer.note_edit(start + Duration::from_millis(200));

        assert!(!debouncer.fire_due(start + Duration::from_millis(350)));
        assert!(debouncer.fire_due(start + Duration::from_millis(500)));
    }

    #[test]
    fn cancel_disarms() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.note_edit(Instant::now());
        assert!(debouncer.cancel());
        assert!(!debouncer.cancel());
        assert!(!debouncer.fire_due(Instant::now() + Duration::from_secs(1)));
    }
}
