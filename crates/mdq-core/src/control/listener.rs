//! Background terminal key listener.
//!
//! Puts stdin into cbreak mode on a dedicated thread and feeds single
//! keypresses to `ControlFlags`. If stdin is not a tty (piped input,
//! service context) the listener degrades to a no-op: the run proceeds
//! with no interactive control, which is not an error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::ControlFlags;

/// Spawns the listener thread for the duration of one scheduler run.
pub struct KeyListener;

impl KeyListener {
    /// Start listening; keys map to control flags (`c`/`p`/`r`/`s`).
    /// Always pair with `ListenerHandle::stop` (the scheduler does this via
    /// an RAII guard) so the terminal mode is restored on every exit path.
    pub fn spawn(flags: ControlFlags) -> ListenerHandle {
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);
        let thread = thread::Builder::new()
            .name("mdq-key-listener".to_string())
            .spawn(move || listen_loop(flags, thread_running))
            .map_err(|e| tracing::warn!("key listener unavailable: {e}"))
            .ok();
        ListenerHandle { running, thread }
    }
}

/// Stops the listener thread and restores the terminal when dropped.
pub struct ListenerHandle {
    running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.thread.take() {
            // The read loop wakes at least every poll tick, so this join is bounded.
            let _ = handle.join();
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(unix)]
fn listen_loop(flags: ControlFlags, running: Arc<AtomicBool>) {
    let fd = libc::STDIN_FILENO;
    if unsafe { libc::isatty(fd) } != 1 {
        tracing::warn!("stdin is not a tty, interactive control disabled");
        return;
    }

    let mut saved: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(fd, &mut saved) } != 0 {
        tracing::warn!("tcgetattr failed, interactive control disabled");
        return;
    }

    // cbreak: no line buffering, no echo; reads time out after 100ms so the
    // loop can observe the running flag.
    let mut raw = saved;
    raw.c_lflag &= !(libc::ICANON | libc::ECHO);
    raw.c_cc[libc::VMIN] = 0;
    raw.c_cc[libc::VTIME] = 1;
    if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &raw) } != 0 {
        tracing::warn!("tcsetattr failed, interactive control disabled");
        return;
    }

    tracing::debug!("key listener active: c=cancel p=pause r=resume s=skip");

    while running.load(Ordering::Relaxed) {
        let mut buf = [0u8; 1];
        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), 1) };
        match n {
            1 => flags.handle_key(buf[0]),
            // 0 = VTIME expired with no input; negative = transient error.
            0 => {}
            _ => thread::sleep(Duration::from_millis(50)),
        }
    }

    if unsafe { libc::tcsetattr(fd, libc::TCSADRAIN, &saved) } != 0 {
        tracing::warn!("failed to restore terminal mode");
    }
}

#[cfg(not(unix))]
fn listen_loop(_flags: ControlFlags, _running: Arc<AtomicBool>) {
    tracing::warn!("interactive control is only available on Unix terminals");
}
