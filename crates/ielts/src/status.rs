//! Busy flag and last-error slot shared by long-running operations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anstream::eprintln;
use colored::Colorize;

#[derive(Debug, Clone, Default)]
pub struct Activity {
    busy: Arc<AtomicBool>,
    last_error: Arc<Mutex<Option<String>>>,
}

/// Clears the busy flag when dropped.
#[derive(Debug)]
pub struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

impl Activity {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.last_error.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark an attempt as started: busy is set and the previous error cleared.
    pub fn begin(&self) -> BusyGuard {
        self.busy.store(true, Ordering::SeqCst);
        self.slot().take();
        BusyGuard {
            busy: Arc::clone(&self.busy),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn record_error(&self, message: impl Into<String>) {
        *self.slot() = Some(message.into());
    }

    pub fn last_error(&self) -> Option<String> {
        self.slot().clone()
    }

    /// Print the recorded error, if any, when running verbosely.
    pub fn report(&self, verbose: bool) {
        if self.is_busy() {
            log::warn!("activity still marked busy after the command finished");
        }
        if let (true, Some(message)) = (verbose, self.last_error()) {
            eprintln!("{} {}", "last error:".red().bold(), message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_clears_busy_on_drop() {
        let activity = Activity::new();
        {
            let _guard = activity.begin();
            assert!(activity.is_busy());
        }
        assert!(!activity.is_busy());
    }

    #[test]
    fn test_guard_clears_busy_on_early_return() {
        fn fails(activity: &Activity) -> Result<(), String> {
            let _guard = activity.begin();
            Err("boom".into())
        }

        let activity = Activity::new();
        assert!(fails(&activity).is_err());
        assert!(!activity.is_busy());
    }

    #[test]
    fn test_begin_clears_last_error() {
        let activity = Activity::new();
        activity.record_error("first");
        assert_eq!(activity.last_error().as_deref(), Some("first"));

        let _guard = activity.begin();
        assert_eq!(activity.last_error(), None);
    }

    #[test]
    fn test_clones_share_state() {
        let activity = Activity::new();
        let clone = activity.clone();
        let _guard = clone.begin();
        clone.record_error("shared");
        assert!(activity.is_busy());
        assert_eq!(activity.last_error().as_deref(), Some("shared"));
    }
}
