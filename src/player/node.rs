use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::activities::{CHECK_ATTACK, GENERATE_BOARD, SELECT_ATTACK};
use crate::board::Board;
use crate::domain::{ActorId, PlayerInput, PlayerOutput, PlayerStatus};
use crate::player::state::{Handled, PlayerState};
use crate::protocol::{Envelope, Message};
use crate::runtime::{ActorHandle, Runtime};

/// Drives one [`PlayerState`] through a match.
///
/// Every incoming envelope is applied, checkpointed, acknowledged and only
/// then are the queued outgoing messages sent. A crash at any point leaves
/// either an unacknowledged envelope (applied again, ignored as a duplicate)
/// or an outbox that is flushed on resume.
pub struct PlayerActor {
    id: ActorId,
    input: PlayerInput,
    runtime: Runtime,
    cancel: CancellationToken,
    state: PlayerState,
}

impl PlayerActor {
    /// Start the actor as a child of `parent`.
    pub fn spawn(
        runtime: &Runtime,
        parent: &CancellationToken,
        id: ActorId,
        input: PlayerInput,
    ) -> ActorHandle<PlayerOutput> {
        let actor_id = id.clone();
        runtime.spawn(parent, id, move |runtime, cancel| async move {
            PlayerActor::resume(runtime, actor_id, input, cancel)?
                .run()
                .await
        })
    }

    /// Build the actor from its latest checkpoint, or from `input` if it
    /// never saved one.
    pub fn resume(
        runtime: Runtime,
        id: ActorId,
        input: PlayerInput,
        cancel: CancellationToken,
    ) -> anyhow::Result<Self> {
        let state = match runtime.journal().load::<PlayerState>(&id)? {
            Some(state) => {
                info!("[{}] Resuming from checkpoint as {}", id, state.status());
                state
            }
            None => PlayerState::new(input.initial_status, runtime.config().letters_to_win()),
        };
        Ok(Self {
            id,
            input,
            runtime,
            cancel,
            state,
        })
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub async fn run(mut self) -> anyhow::Result<PlayerOutput> {
        info!(
            "[{}] {} starts as {} against {}",
            self.id,
            self.input.name,
            self.state.status(),
            self.input.competitor_id
        );
        if self.state.board().is_none() {
            let board = self.generate_board().await?;
            self.state.install_board(board);
            self.persist()?;
        }
        self.flush().await?;

        while !self.state.status().is_terminal() {
            self.wait_until(|s| s.status() != PlayerStatus::Waiting).await?;
            match self.state.status() {
                PlayerStatus::Playing => self.attack().await?,
                PlayerStatus::Attacking => self.await_result().await?,
                PlayerStatus::UnderAttack => self.defend().await?,
                PlayerStatus::Waiting | PlayerStatus::GameOver => {}
            }
        }

        info!(
            "[{}] Game over with {} letters: {:?}",
            self.id,
            self.state.letters_won().len(),
            self.state.letters_won().as_slice()
        );
        Ok(self.state.output())
    }

    async fn generate_board(&self) -> anyhow::Result<Board> {
        let config = self.runtime.config();
        let activities = self.runtime.activities();
        let size = config.board_size;
        let pieces = config.pieces.as_slice();
        let board = self
            .runtime
            .execute(&self.id, GENERATE_BOARD, &config.activity, &self.cancel, |ctx| {
                activities.generate_board(ctx, size, pieces)
            })
            .await?;
        Ok(board)
    }

    async fn attack(&mut self) -> anyhow::Result<()> {
        let config = self.runtime.config();
        let activities = self.runtime.activities();
        let board_size = self.board()?.size();
        let history = self.state.attack_history();
        let target = self
            .runtime
            .execute(&self.id, SELECT_ATTACK, &config.activity, &self.cancel, |ctx| {
                activities.select_attack(ctx, history, board_size)
            })
            .await?;

        info!(
            "[{}] Attacking {} at {} on turn {}",
            self.id,
            self.input.competitor_id,
            target,
            self.state.turn()
        );
        let handled = self.state.launch_attack(target);
        self.report_local("attack", handled);
        self.persist()?;
        self.flush().await?;
        self.await_result().await
    }

    async fn await_result(&mut self) -> anyhow::Result<()> {
        let before = self.state.letters_won().len();
        self.wait_until(|s| s.status() != PlayerStatus::Attacking)
            .await?;
        let won = self.state.letters_won();
        if won.len() > before {
            if let Some(letter) = won.as_slice().last() {
                info!(
                    "[{}] Hit letter {}! Already have {} hits.",
                    self.id,
                    letter,
                    won.len()
                );
            }
        }
        if won.is_full() {
            info!("[{}] Won game!", self.id);
        }
        Ok(())
    }

    async fn defend(&mut self) -> anyhow::Result<()> {
        let Some(pending) = self.state.received_attack().copied() else {
            return Err(anyhow::anyhow!(
                "{} is under attack without a pending attack",
                self.id
            ));
        };
        let config = self.runtime.config();
        let activities = self.runtime.activities();
        let board = self.board()?;
        let target = &pending.target;
        let hit = self
            .runtime
            .execute(&self.id, CHECK_ATTACK, &config.activity, &self.cancel, |ctx| {
                activities.check_attack(ctx, target, board)
            })
            .await?;

        match hit {
            Some(letter) => info!("[{}] Attack on {} hit letter {}", self.id, target, letter),
            None => info!("[{}] Attack on {} missed", self.id, target),
        }
        let handled = self.state.answer_attack(hit);
        self.report_local("answer", handled);
        self.persist()?;
        self.flush().await
    }

    /// Process envelopes until `ready` holds.
    async fn wait_until<P>(&mut self, ready: P) -> anyhow::Result<()>
    where
        P: Fn(&PlayerState) -> bool,
    {
        while !ready(&self.state) {
            let envelope = self.runtime.next_envelope(&self.id, &self.cancel).await?;
            let handled = self.state.apply(&envelope.message);
            self.report(&envelope, handled);
            self.persist()?;
            self.runtime.ack(&self.id).await?;
            self.flush().await?;
        }
        Ok(())
    }

    /// Send the queued messages, then checkpoint the empty outbox.
    async fn flush(&mut self) -> anyhow::Result<()> {
        if self.state.outbox().is_empty() {
            return Ok(());
        }
        for message in self.state.outbox().to_vec() {
            self.runtime
                .signal(&self.id, &self.input.competitor_id, message)
                .await?;
        }
        self.state.clear_outbox();
        self.persist()
    }

    fn persist(&self) -> anyhow::Result<()> {
        self.runtime.journal().save(&self.id, &self.state)?;
        Ok(())
    }

    fn board(&self) -> anyhow::Result<&Board> {
        self.state
            .board()
            .ok_or_else(|| anyhow::anyhow!("{} has no board", self.id))
    }

    fn report(&self, envelope: &Envelope, handled: Handled) {
        match handled {
            Handled::Applied => debug!(
                "[{}] Got {} from {}, now {}",
                self.id,
                envelope.message.name(),
                envelope.from,
                self.state.status()
            ),
            Handled::Lenient(mismatch) => warn!(
                "[{}] Got {} from {} out of order: {}",
                self.id,
                envelope.message.name(),
                envelope.from,
                mismatch
            ),
            Handled::Ignored(reason) => debug!(
                "[{}] Ignoring {} from {}: {}",
                self.id,
                envelope.message.name(),
                envelope.from,
                reason
            ),
        }
        if handled == Handled::Applied && envelope.message == Message::GameOver {
            info!("[{}] Game over signalled by {}", self.id, envelope.from);
        }
    }

    fn report_local(&self, action: &str, handled: Handled) {
        match handled {
            Handled::Applied => {}
            Handled::Lenient(mismatch) => warn!("[{}] {} out of order: {}", self.id, action, mismatch),
            Handled::Ignored(reason) => warn!("[{}] {} skipped: {}", self.id, action, reason),
        }
    }
}
