use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::domain::ActorId;
use crate::protocol::Envelope;
use crate::transport::Transport;

/// Encoded envelopes waiting for one actor.
#[derive(Default)]
struct Mailbox {
    frames: Mutex<VecDeque<Vec<u8>>>,
    notify: Notify,
}

impl Mailbox {
    fn front(&self) -> anyhow::Result<Option<Vec<u8>>> {
        let queue = self
            .frames
            .lock()
            .map_err(|_| anyhow::anyhow!("Mailbox lock poisoned"))?;
        Ok(queue.front().cloned())
    }
}

/// Process-local transport. Mailboxes are created on first use, so a
/// message sent to an actor that has not started yet waits for it.
#[derive(Default)]
pub struct InMemoryTransport {
    mailboxes: Mutex<HashMap<ActorId, Arc<Mailbox>>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn mailbox(&self, owner: &ActorId) -> anyhow::Result<Arc<Mailbox>> {
        let mut mailboxes = self
            .mailboxes
            .lock()
            .map_err(|_| anyhow::anyhow!("Mailbox registry lock poisoned"))?;
        Ok(mailboxes.entry(owner.clone()).or_default().clone())
    }
}

#[async_trait::async_trait]
impl Transport for InMemoryTransport {
    async fn deliver(&self, to: &ActorId, envelope: Envelope) -> anyhow::Result<()> {
        let frame = envelope.encode()?;
        let mailbox = self.mailbox(to)?;
        mailbox
            .frames
            .lock()
            .map_err(|_| anyhow::anyhow!("Mailbox lock poisoned"))?
            .push_back(frame);
        mailbox.notify.notify_one();
        Ok(())
    }

    async fn recv(&self, owner: &ActorId) -> anyhow::Result<Envelope> {
        let mailbox = self.mailbox(owner)?;
        loop {
            if let Some(frame) = mailbox.front()? {
                return Envelope::decode(&frame);
            }
            // notify_one leaves a permit behind when nobody is waiting yet.
            mailbox.notify.notified().await;
        }
    }

    async fn ack(&self, owner: &ActorId) -> anyhow::Result<()> {
        let mailbox = self.mailbox(owner)?;
        let mut frames = mailbox
            .frames
            .lock()
            .map_err(|_| anyhow::anyhow!("Mailbox lock poisoned"))?;
        if frames.pop_front().is_none() {
            return Err(anyhow::anyhow!("Nothing to acknowledge for {}", owner));
        }
        Ok(())
    }

    fn pending(&self, owner: &ActorId) -> anyhow::Result<usize> {
        let mailbox = self.mailbox(owner)?;
        let frames = mailbox
            .frames
            .lock()
            .map_err(|_| anyhow::anyhow!("Mailbox lock poisoned"))?;
        Ok(frames.len())
    }
}
