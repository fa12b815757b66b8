//! Periodic flush timer
//!
//! Runs on its own thread with a current-thread tokio runtime, so the logger
//! does not depend on the caller having a runtime.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};

use super::error::LoggerError;

/// Handle to a running flush timer
///
/// Dropping the handle signals the timer to stop without waiting for it.
#[derive(Debug)]
pub struct FlushTimer {
    shutdown_tx: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl FlushTimer {
    /// Start calling `tick` every `period`
    ///
    /// The first tick happens one full period after start. The timer ends when
    /// stopped or when `tick` returns `false`.
    pub fn start<F>(period: Duration, mut tick: F) -> Result<Self, LoggerError>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let thread = thread::Builder::new()
            .name("log-flush".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        eprintln!("log flush timer could not start: {}", e);
                        return;
                    }
                };

                runtime.block_on(async move {
                    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

                    loop {
                        tokio::select! {
                            _ = ticker.tick() => {
                                if !tick() {
                                    break;
                                }
                            }
                            _ = &mut shutdown_rx => break,
                        }
                    }
                });
            })
            .map_err(LoggerError::Timer)?;

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    fn signal(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            // Ignore error if the timer already ended
            let _ = tx.send(());
        }
    }

    /// Stop the timer and wait for its thread to finish
    pub fn stop(mut self) {
        self.signal();
        if let Some(handle) = self.thread.take() {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for FlushTimer {
    fn drop(&mut self) {
        self.signal();
    }
}
