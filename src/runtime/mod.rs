//! In-process durable-execution substrate.
//!
//! Provides what the actors need from their environment: leaf-operation
//! invocation with timeouts and retries, addressed at-least-once messaging,
//! checkpoint storage, and actor spawning tied to a parent's cancellation
//! token.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use log::{debug, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::activities::{Activities, ActivityContext};
use crate::common::GameError;
use crate::config::{ActivityOptions, GameConfig};
use crate::domain::ActorId;
use crate::protocol::{Envelope, Message};
use crate::transport::{InMemoryTransport, RedeliveringTransport, Transport};

pub mod journal;

pub use journal::Journal;

struct Inner {
    config: GameConfig,
    activities: Arc<dyn Activities>,
    transport: Arc<dyn Transport>,
    journal: Journal,
    live: Arc<AtomicUsize>,
}

/// Cheaply cloneable handle to the substrate shared by all actors of a match.
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<Inner>,
}

impl Runtime {
    /// Runtime over the in-memory transport, duplicating deliveries when the
    /// config asks for it.
    pub fn new(config: GameConfig, activities: Arc<dyn Activities>) -> Self {
        let transport: Arc<dyn Transport> = if config.duplicate_delivery > 0.0 {
            Arc::new(RedeliveringTransport::new(
                InMemoryTransport::new(),
                config.duplicate_delivery,
                config.seed.map(|s| s.wrapping_add(1)),
            ))
        } else {
            Arc::new(InMemoryTransport::new())
        };
        Self::with_transport(config, activities, transport)
    }

    pub fn with_transport(
        config: GameConfig,
        activities: Arc<dyn Activities>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                activities,
                transport,
                journal: Journal::new(),
                live: Arc::new(AtomicUsize::new(0)),
            }),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.inner.config
    }

    pub fn activities(&self) -> &dyn Activities {
        self.inner.activities.as_ref()
    }

    pub fn transport(&self) -> &dyn Transport {
        self.inner.transport.as_ref()
    }

    pub fn journal(&self) -> &Journal {
        &self.inner.journal
    }

    /// Number of spawned actors whose task has not finished yet.
    pub fn live_actors(&self) -> usize {
        self.inner.live.load(Ordering::SeqCst)
    }

    /// Run a leaf operation on behalf of `actor`.
    ///
    /// Each attempt gets `options.start_to_close`; failed or timed-out
    /// attempts are retried after `options.backoff` until
    /// `options.max_attempts` is used up. Cancellation ends the call at once.
    pub async fn execute<T, F, Fut>(
        &self,
        actor: &ActorId,
        activity: &'static str,
        options: &ActivityOptions,
        cancel: &CancellationToken,
        mut op: F,
    ) -> Result<T, GameError>
    where
        F: FnMut(ActivityContext) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let mut reason = String::from("never attempted");
        for attempt in 1..=options.max_attempts {
            let ctx = ActivityContext::new(actor.clone(), attempt);
            let outcome = tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(GameError::Cancelled { actor: actor.clone() });
                }
                res = tokio::time::timeout(options.start_to_close, op(ctx)) => res,
            };
            match outcome {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => reason = e.to_string(),
                Err(_) => reason = format!("timed out after {:?}", options.start_to_close),
            }
            warn!(
                "[{}] Activity {} attempt {}/{} failed: {}",
                actor, activity, attempt, options.max_attempts, reason
            );
            if attempt < options.max_attempts && !options.backoff.is_zero() {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        return Err(GameError::Cancelled { actor: actor.clone() });
                    }
                    _ = tokio::time::sleep(options.backoff) => {}
                }
            }
        }
        Err(GameError::ActivityFailed {
            activity,
            attempts: options.max_attempts,
            reason,
        })
    }

    /// Send `message` from one actor to another.
    pub async fn signal(&self, from: &ActorId, to: &ActorId, message: Message) -> anyhow::Result<()> {
        debug!("[{}] Signalling {} to {}", from, message.name(), to);
        self.inner
            .transport
            .deliver(to, Envelope::new(from.clone(), message))
            .await
    }

    /// Wait for the oldest unacknowledged envelope of `owner`.
    pub async fn next_envelope(
        &self,
        owner: &ActorId,
        cancel: &CancellationToken,
    ) -> anyhow::Result<Envelope> {
        tokio::select! {
            _ = cancel.cancelled() => Err(GameError::Cancelled { actor: owner.clone() }.into()),
            envelope = self.inner.transport.recv(owner) => envelope,
        }
    }

    pub async fn ack(&self, owner: &ActorId) -> anyhow::Result<()> {
        self.inner.transport.ack(owner).await
    }

    /// Start an actor as a child of `parent`.
    ///
    /// The actor receives a child token of `parent`: cancelling the parent
    /// cancels the actor, cancelling the actor leaves the parent alone.
    pub fn spawn<T, F, Fut>(&self, parent: &CancellationToken, id: ActorId, f: F) -> ActorHandle<T>
    where
        F: FnOnce(Runtime, CancellationToken) -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let token = parent.child_token();
        let guard = LiveGuard::new(self.inner.live.clone());
        let fut = f(self.clone(), token.clone());
        debug!("[runtime] Spawning {}", id);
        let task = tokio::spawn(async move {
            let _guard = guard;
            fut.await
        });
        ActorHandle { id, token, task }
    }
}

struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    fn new(live: Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self(live)
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A running actor. Awaiting the handle yields the actor's output.
pub struct ActorHandle<T> {
    id: ActorId,
    token: CancellationToken,
    task: JoinHandle<anyhow::Result<T>>,
}

impl<T> ActorHandle<T> {
    pub fn id(&self) -> &ActorId {
        &self.id
    }

    /// Ask the actor to stop. It fails with [`GameError::Cancelled`].
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<T> Future for ActorHandle<T> {
    type Output = anyhow::Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.task).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(output)) => Poll::Ready(output),
            Poll::Ready(Err(e)) => Poll::Ready(Err(GameError::ActorPanicked {
                actor: this.id.clone(),
                reason: e.to_string(),
            }
            .into())),
        }
    }
}
