use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

/// Handle to a repeating timer running on its own thread.
///
/// `on_tick` is called every `interval` until it returns `false`, `stop()`
/// is called, or the handle is dropped. `stop()` and drop join the timer
/// thread, so once either returns no further tick can fire.
pub struct Ticker {
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl Ticker {
    pub fn start<F>(interval: Duration, mut on_tick: F) -> Ticker
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || loop {
            match shutdown_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    if !on_tick() {
                        break;
                    }
                }
                // An explicit shutdown message or a dropped sender both end the timer.
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        debug!(interval_ms = interval.as_millis() as u64, "ticker started");

        Ticker {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True while the timer thread is still running.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    /// Stops the timer and waits for its thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            // A panic inside `on_tick` has already ended the thread; nothing to recover.
            let _ = handle.join();
            debug!("ticker stopped");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
