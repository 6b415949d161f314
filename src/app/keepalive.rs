// whisper-relay - app/keepalive.rs
//
// Anti-AFK keepalive ticker.
//
// One background thread taps a single key into the game window on a fixed
// period so the session is never idle long enough to be disconnected. The
// thread is owned by a `KeepaliveHandle`: an `Arc<AtomicBool>` cancel flag
// allows a prompt signalled shutdown, and the sleep is sub-divided into
// short slices so the flag is observed within a fraction of a second.
//
// Every tick failure (window missing, input rejected) is logged and the
// ticker continues to the next period; nothing a tick does can abort it.

use crate::platform::window::GameAutomation;
use crate::util::constants::{KEEPALIVE_CANCEL_CHECK_INTERVAL_MS, KEEPALIVE_INTERVAL_SECS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Owns the keepalive background thread.
///
/// `stop()` signals cancellation and joins; dropping the handle does the
/// same, so the thread never outlives the process teardown path.
pub struct KeepaliveHandle {
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

/// Start the keepalive ticker on its own thread.
pub fn start<G>(game: G) -> KeepaliveHandle
where
    G: GameAutomation + Send + 'static,
{
    let cancel = Arc::new(AtomicBool::new(false));
    let thread_cancel = Arc::clone(&cancel);

    let thread = std::thread::spawn(move || {
        run_ticker(game, thread_cancel);
    });

    tracing::info!(
        period_secs = KEEPALIVE_INTERVAL_SECS,
        "Keepalive ticker started"
    );

    KeepaliveHandle {
        cancel,
        thread: Some(thread),
    }
}

impl KeepaliveHandle {
    /// Signal the ticker to stop and wait for the thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancel.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("Keepalive thread panicked before shutdown");
            } else {
                tracing::debug!("Keepalive ticker stopped");
            }
        }
    }
}

impl Drop for KeepaliveHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Ticker body: interruptible sleep, then one best-effort keystroke.
fn run_ticker<G: GameAutomation>(game: G, cancel: Arc<AtomicBool>) {
    // Sub-divide each period into cancel-check slices.
    let slices =
        ((KEEPALIVE_INTERVAL_SECS * 1_000) / KEEPALIVE_CANCEL_CHECK_INTERVAL_MS).max(1);

    loop {
        for _ in 0..slices {
            std::thread::sleep(Duration::from_millis(KEEPALIVE_CANCEL_CHECK_INTERVAL_MS));
            if cancel.load(Ordering::SeqCst) {
                return;
            }
        }

        match game.anti_idle_tap() {
            Ok(()) => tracing::debug!("Keepalive keystroke sent"),
            Err(e) => tracing::warn!(error = %e, "Keepalive tick skipped"),
        }
    }
}
