//! Background serialization worker.
//!
//! `submit` freezes a committed stream into a snapshot, hands the
//! snapshot to a spawned thread, and returns a ticket immediately.
//! Every outcome - success or failure - comes back as a completion on
//! the queue; nothing is thrown from `submit` after the freeze, and
//! there is no cancellation. With no destination the result is the
//! serialized bytes in memory; with one the bytes land at that path
//! and the completion echoes it.

use crate::diag::{DiagLevel, DiagSink};
use crate::error::{BindError, Result};
use crate::stream::{StreamController, StreamSnapshot};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

/// Correlates a completion with the submission it answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Where the serialized bytes ended up.
#[derive(Debug)]
pub enum SerializationOutput {
    /// In-memory result; the byte count equals the committed payload
    /// length.
    Bytes(Vec<u8>),
    /// Bytes were written to this path.
    Path(String),
}

/// One finished job, success or failure.
#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub result: std::result::Result<SerializationOutput, BindError>,
}

/// Receiving end of the completion channel.
pub struct CompletionQueue {
    rx: Receiver<Completion>,
}

impl CompletionQueue {
    /// Non-blocking poll. `None` while nothing has finished.
    pub fn poll(&self) -> Option<Completion> {
        match self.rx.try_recv() {
            Ok(completion) => Some(completion),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Block until the next completion. `None` once every worker
    /// handle is gone and the channel has drained.
    pub fn recv(&self) -> Option<Completion> {
        self.rx.recv().ok()
    }
}

/// Hands committed streams to background threads for serialization.
pub struct SerializationWorker {
    tx: Sender<Completion>,
    next_ticket: u64,
    sink: Arc<dyn DiagSink>,
}

impl SerializationWorker {
    pub fn new(sink: Arc<dyn DiagSink>) -> (Self, CompletionQueue) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                tx,
                next_ticket: 1,
                sink,
            },
            CompletionQueue { rx },
        )
    }

    /// Freeze the controller's committed stream and serialize it on a
    /// background thread. Freezing fails for a controller mid-append;
    /// everything after that is reported through the queue.
    pub fn submit(
        &mut self,
        controller: &StreamController,
        destination: Option<&str>,
    ) -> Result<Ticket> {
        let snapshot = controller.freeze()?;
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        let destination = destination
            .filter(|path| !path.is_empty())
            .map(str::to_string);
        self.sink.event(
            DiagLevel::Debug,
            "worker",
            &format!(
                "job submitted: {} bytes, destination {}",
                snapshot.raw.len(),
                destination.as_deref().unwrap_or("<memory>")
            ),
        );
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = run_job(snapshot, destination);
            // A dropped queue just means nobody is listening anymore.
            let _ = tx.send(Completion { ticket, result });
        });
        Ok(ticket)
    }
}

fn run_job(
    snapshot: StreamSnapshot,
    destination: Option<String>,
) -> std::result::Result<SerializationOutput, BindError> {
    let bytes = snapshot.raw;
    match destination {
        None => Ok(SerializationOutput::Bytes(bytes)),
        Some(path) => {
            std::fs::write(&path, &bytes)
                .map_err(|e| BindError::Serialization(format!("{path}: {e}")))?;
            Ok(SerializationOutput::Path(path))
        }
    }
}
