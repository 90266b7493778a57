//! Cooperative run control: cancel / pause / resume / skip flags.
//!
//! The flags are the only state shared between the scheduler's run loop
//! and the background key listener; both sides go through atomics, never
//! plain shared variables. `ControlFlags` is cheap to clone (shared
//! `Arc`) and test-injectable: tests call the `request_*` methods
//! directly instead of feeding real keyboard input.

mod listener;

pub use listener::{KeyListener, ListenerHandle};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Repeated key events inside this window are ignored (some terminals
/// deliver duplicates).
const DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Default)]
struct Inner {
    cancel: AtomicBool,
    paused: AtomicBool,
    skip: AtomicBool,
    last_key: Mutex<Option<Instant>>,
}

/// Shared control flags for one scheduler run.
#[derive(Clone, Default)]
pub struct ControlFlags {
    inner: Arc<Inner>,
}

impl ControlFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one raw key event from the listener, with debouncing.
    /// `c` cancel, `p` pause, `r` resume, `s` skip; other keys are ignored.
    pub fn handle_key(&self, key: u8) {
        if !self.accept_key() {
            return;
        }
        match key.to_ascii_lowercase() {
            b'c' => self.request_cancel(),
            b'p' => self.request_pause(),
            b'r' => self.request_resume(),
            b's' => self.request_skip(),
            _ => {}
        }
    }

    fn accept_key(&self) -> bool {
        let mut last = match self.inner.last_key.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Instant::now();
        if let Some(prev) = *last {
            if now.duration_since(prev) < DEBOUNCE {
                return false;
            }
        }
        *last = Some(now);
        true
    }

    /// Stop after the in-flight item finishes; do not start a new one.
    pub fn request_cancel(&self) {
        self.inner.cancel.store(true, Ordering::Relaxed);
    }

    /// Do not start a new item until resumed; the in-flight item finishes.
    pub fn request_pause(&self) {
        self.inner.paused.store(true, Ordering::Relaxed);
    }

    pub fn request_resume(&self) {
        self.inner.paused.store(false, Ordering::Relaxed);
    }

    /// Abort only the in-flight item's fetch, best-effort.
    pub fn request_skip(&self) {
        self.inner.skip.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancel.load(Ordering::Relaxed)
    }

    pub fn is_paused(&self) -> bool {
        self.inner.paused.load(Ordering::Relaxed)
    }

    /// Read and consume the skip request.
    pub fn take_skip(&self) -> bool {
        self.inner.skip.swap(false, Ordering::Relaxed)
    }

    /// Non-consuming handle for a fetcher to poll mid-flight.
    pub fn skip_signal(&self) -> SkipSignal {
        SkipSignal {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Clear all flags; called at the start and end of each run so state
    /// never leaks across runs.
    pub fn reset(&self) {
        self.inner.cancel.store(false, Ordering::Relaxed);
        self.inner.paused.store(false, Ordering::Relaxed);
        self.inner.skip.store(false, Ordering::Relaxed);
        if let Ok(mut last) = self.inner.last_key.lock() {
            *last = None;
        }
    }
}

/// Read-only view of the skip flag, passed into `Fetcher::fetch` so a
/// cooperative fetcher can abort the in-flight retrieval.
#[derive(Clone)]
pub struct SkipSignal {
    inner: Arc<Inner>,
}

impl SkipSignal {
    pub fn is_requested(&self) -> bool {
        self.inner.skip.load(Ordering::Relaxed)
    }
}

/// A signal that never fires; for fetch calls outside a controlled run.
impl Default for SkipSignal {
    fn default() -> Self {
        ControlFlags::new().skip_signal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_start_clear() {
        let flags = ControlFlags::new();
        assert!(!flags.is_cancelled());
        assert!(!flags.is_paused());
        assert!(!flags.take_skip());
    }

    #[test]
    fn request_and_reset() {
        let flags = ControlFlags::new();
        flags.request_cancel();
        flags.request_pause();
        flags.request_skip();
        assert!(flags.is_cancelled());
        assert!(flags.is_paused());

        flags.reset();
        assert!(!flags.is_cancelled());
        assert!(!flags.is_paused());
        assert!(!flags.take_skip());
    }

    #[test]
    fn take_skip_consumes() {
        let flags = ControlFlags::new();
        flags.request_skip();
        assert!(flags.take_skip());
        assert!(!flags.take_skip());
    }

    #[test]
    fn skip_signal_reads_without_consuming() {
        let flags = ControlFlags::new();
        let signal = flags.skip_signal();
        assert!(!signal.is_requested());
        flags.request_skip();
        assert!(signal.is_requested());
        assert!(signal.is_requested());
        assert!(flags.take_skip());
        assert!(!signal.is_requested());
    }

    #[test]
    fn pause_resume_toggle() {
        let flags = ControlFlags::new();
        flags.request_pause();
        assert!(flags.is_paused());
        flags.request_resume();
        assert!(!flags.is_paused());
    }

    #[test]
    fn key_events_are_debounced() {
        let flags = ControlFlags::new();
        flags.handle_key(b'p');
        assert!(flags.is_paused());

        // Immediate duplicate is absorbed.
        flags.handle_key(b'r');
        assert!(flags.is_paused());

        std::thread::sleep(DEBOUNCE + Duration::from_millis(50));
        flags.handle_key(b'r');
        assert!(!flags.is_paused());
    }

    #[test]
    fn clones_share_state() {
        let flags = ControlFlags::new();
        let other = flags.clone();
        other.request_cancel();
        assert!(flags.is_cancelled());
    }

    #[test]
    fn unknown_keys_ignored() {
        let flags = ControlFlags::new();
        flags.handle_key(b'x');
        assert!(!flags.is_cancelled());
        assert!(!flags.is_paused());
        assert!(!flags.take_skip());
    }
}
