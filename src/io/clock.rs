use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::Utc;

/// How often countdowns are refreshed
pub const TICK: Duration = Duration::from_secs(1);

/// Current wall-clock time in epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Ticker that drives countdown re-renders.
///
/// A background thread sends the current time once per period. The event loop
/// calls [`poll`](Self::poll) each iteration and redraws when it returns true.
/// Dropping the clock stops the thread.
pub struct DeadlineClock {
    rx: Receiver<i64>,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    now_ms: i64,
}

impl DeadlineClock {
    pub fn start() -> io::Result<Self> {
        Self::with_period(TICK)
    }

    pub fn with_period(period: Duration) -> io::Result<Self> {
        let (tick_tx, tick_rx) = mpsc::channel();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("tdl-clock".into())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(period) {
                        Err(RecvTimeoutError::Timeout) => {
                            if tick_tx.send(now_millis()).is_err() {
                                break;
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })?;

        Ok(DeadlineClock {
            rx: tick_rx,
            stop: Some(stop_tx),
            handle: Some(handle),
            now_ms: now_millis(),
        })
    }

    /// Drain pending ticks; true if at least one arrived
    pub fn poll(&mut self) -> bool {
        let mut ticked = false;
        while let Ok(ms) = self.rx.try_recv() {
            self.now_ms = ms;
            ticked = true;
        }
        ticked
    }

    /// Time of the latest tick
    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }
}

impl Drop for DeadlineClock {
    fn drop(&mut self) {
        self.stop.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
