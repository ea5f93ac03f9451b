use thiserror::Error;

use crate::protocol::Message;

/// The peer closed the connection cleanly. Any other transport error is a
/// failed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("connection closed by peer")]
pub struct ConnectionClosed;

impl ConnectionClosed {
    /// Whether `err` is a clean close rather than a broken session.
    pub fn is(err: &anyhow::Error) -> bool {
        err.downcast_ref::<ConnectionClosed>().is_some()
    }
}

/// Bidirectional, ordered message channel between two peers.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()>;
    async fn recv(&mut self) -> anyhow::Result<Message>;
}

pub mod in_memory;
pub mod tcp;
