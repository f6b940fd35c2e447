//! The write capability backing a connection.
//!
//! The registry and broadcaster never touch a transport directly; they hold
//! an [`EventSink`] and call [`EventSink::try_send`]. Production code backs
//! this with [`ChannelSink`] (a bounded channel drained by the transport's
//! write task); tests back it with the same type and keep the receiving
//! half as an in-memory recorder.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Errors a sink write can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The send queue is full: the client is not draining frames fast
    /// enough. The frame is dropped.
    #[error("sink queue full")]
    Full,
    /// The sink is closed. The transport went away or `close` was called.
    #[error("sink closed")]
    Closed,
}

/// Write capability for one push connection.
///
/// Implementations must be non-blocking: a `try_send` that cannot complete
/// immediately fails with [`SinkError::Full`] rather than waiting, so one
/// slow client can never stall fan-out to the others.
pub trait EventSink: Send + Sync {
    /// Enqueue a fully-framed text block for transmission.
    fn try_send(&self, frame: Arc<String>) -> Result<(), SinkError>;

    /// Close the sink. Subsequent writes fail with [`SinkError::Closed`].
    fn close(&self);
}

/// Production sink: a bounded `mpsc` channel whose receiving half is owned
/// by the transport's write task.
pub struct ChannelSink {
    tx: mpsc::Sender<Arc<String>>,
    closed: CancellationToken,
}

impl ChannelSink {
    /// Wrap an existing sender.
    #[must_use]
    pub fn new(tx: mpsc::Sender<Arc<String>>) -> Self {
        Self {
            tx,
            closed: CancellationToken::new(),
        }
    }

    /// Create a sink with a bounded queue of `capacity` frames, returning
    /// the receiving half for the transport write task.
    #[must_use]
    pub fn bounded(capacity: usize) -> (Self, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Token cancelled when the sink is closed. The transport write task
    /// selects on this alongside the frame channel.
    #[must_use]
    pub fn closed_token(&self) -> CancellationToken {
        self.closed.clone()
    }
}

impl EventSink for ChannelSink {
    fn try_send(&self, frame: Arc<String>) -> Result<(), SinkError> {
        if self.closed.is_cancelled() {
            return Err(SinkError::Closed);
        }
        match self.tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(SinkError::Full),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(SinkError::Closed),
        }
    }

    fn close(&self) {
        self.closed.cancel();
    }
}
