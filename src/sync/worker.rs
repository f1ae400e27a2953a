use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::task_store::{PendingOp, Reply};
use crate::store::{AdapterError, DocumentStore};

/// A finished remote call, ready for [`TaskStore::complete`](super::TaskStore::complete)
#[derive(Debug)]
pub struct Completion {
    pub op: PendingOp,
    pub result: Result<Reply, AdapterError>,
}

/// Runs remote calls off the UI thread, one at a time, in submission order.
///
/// Completions are collected with [`poll`](Self::poll) from the event loop.
/// Dropping the worker lets every queued call finish before the thread exits.
pub struct SyncWorker {
    tx: Option<Sender<PendingOp>>,
    rx: Receiver<Completion>,
    handle: Option<JoinHandle<()>>,
    /// Ops that could not be handed to the thread
    rejected: VecDeque<Completion>,
    in_flight: usize,
}

impl SyncWorker {
    pub fn start(store: Arc<dyn DocumentStore>) -> io::Result<Self> {
        let (op_tx, op_rx) = mpsc::channel::<PendingOp>();
        let (done_tx, done_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("tdl-sync".into())
            .spawn(move || {
                for op in op_rx {
                    tracing::trace!(category = %op.category(), "issuing remote call");
                    let result = op.execute(store.as_ref());
                    if done_tx.send(Completion { op, result }).is_err() {
                        break;
                    }
                }
            })?;

        Ok(SyncWorker {
            tx: Some(op_tx),
            rx: done_rx,
            handle: Some(handle),
            rejected: VecDeque::new(),
            in_flight: 0,
        })
    }

    pub fn submit(&mut self, op: PendingOp) {
        self.in_flight += 1;
        let Some(tx) = &self.tx else {
            self.reject(op);
            return;
        };
        if let Err(mpsc::SendError(op)) = tx.send(op) {
            self.reject(op);
        }
    }

    fn reject(&mut self, op: PendingOp) {
        tracing::error!(category = %op.category(), "sync worker is gone");
        self.rejected.push_back(Completion {
            op,
            result: Err(AdapterError::Unavailable("sync worker stopped".into())),
        });
    }

    /// Non-blocking: every completion that has arrived so far
    pub fn poll(&mut self) -> Vec<Completion> {
        let mut done: Vec<Completion> = self.rejected.drain(..).collect();
        while let Ok(c) = self.rx.try_recv() {
            done.push(c);
        }
        self.in_flight = self.in_flight.saturating_sub(done.len());
        done
    }

    /// Block until the next completion or `timeout`
    pub fn wait(&mut self, timeout: Duration) -> Option<Completion> {
        if let Some(c) = self.rejected.pop_front() {
            self.in_flight = self.in_flight.saturating_sub(1);
            return Some(c);
        }
        match self.rx.recv_timeout(timeout) {
            Ok(c) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                Some(c)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Submitted calls whose completion has not been collected yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("sync worker panicked");
        }
    }
}
