use std::sync::Mutex;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::domain::ActorId;
use crate::protocol::Envelope;
use crate::transport::Transport;

/// Transport wrapper that delivers some envelopes twice.
///
/// Exercises the at-least-once side of the delivery contract: every handler
/// downstream has to treat a repeated envelope as a no-op.
pub struct RedeliveringTransport<T: Transport> {
    inner: T,
    probability: f64,
    rng: Mutex<SmallRng>,
}

impl<T: Transport> RedeliveringTransport<T> {
    /// # Arguments
    /// * `inner` - The transport that actually stores envelopes
    /// * `probability` - Chance in `[0, 1]` that an envelope is delivered twice
    /// * `seed` - Fixes which envelopes get duplicated
    pub fn new(inner: T, probability: f64, seed: Option<u64>) -> Self {
        let rng = if let Some(s) = seed {
            SmallRng::seed_from_u64(s)
        } else {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        };
        Self {
            inner,
            probability: if probability.is_nan() {
                0.0
            } else {
                probability.clamp(0.0, 1.0)
            },
            rng: Mutex::new(rng),
        }
    }

    fn roll(&self) -> anyhow::Result<bool> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| anyhow::anyhow!("Redelivery rng lock poisoned"))?;
        Ok(rng.random_bool(self.probability))
    }
}

#[async_trait::async_trait]
impl<T: Transport> Transport for RedeliveringTransport<T> {
    async fn deliver(&self, to: &ActorId, envelope: Envelope) -> anyhow::Result<()> {
        let duplicate = self.roll()?;
        if duplicate {
            log::debug!(
                "[RedeliveringTransport] Duplicating {} from {} to {}",
                envelope.message.name(),
                envelope.from,
                to
            );
            self.inner.deliver(to, envelope.clone()).await?;
        }
        self.inner.deliver(to, envelope).await
    }

    async fn recv(&self, owner: &ActorId) -> anyhow::Result<Envelope> {
        self.inner.recv(owner).await
    }

    async fn ack(&self, owner: &ActorId) -> anyhow::Result<()> {
        self.inner.ack(owner).await
    }

    fn pending(&self, owner: &ActorId) -> anyhow::Result<usize> {
        self.inner.pending(owner)
    }
}
