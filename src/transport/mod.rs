//! Message delivery between actors.
//!
//! Delivery is at-least-once: [`Transport::recv`] returns the oldest
//! envelope without removing it, and only [`Transport::ack`] removes it. An
//! envelope received by an incarnation that dies before acknowledging it is
//! handed to the next incarnation again.

use crate::domain::ActorId;
use crate::protocol::Envelope;

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Append an envelope to the mailbox of `to`.
    async fn deliver(&self, to: &ActorId, envelope: Envelope) -> anyhow::Result<()>;
    /// Wait for the oldest unacknowledged envelope of `owner`.
    async fn recv(&self, owner: &ActorId) -> anyhow::Result<Envelope>;
    /// Drop the oldest envelope of `owner`.
    async fn ack(&self, owner: &ActorId) -> anyhow::Result<()>;
    /// Number of envelopes waiting for `owner`.
    fn pending(&self, owner: &ActorId) -> anyhow::Result<usize>;
}

pub mod in_memory;
pub mod redelivery;

pub use in_memory::InMemoryTransport;
pub use redelivery::RedeliveringTransport;
