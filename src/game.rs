//! Game coordinator: picks the starting side, runs both players and reduces
//! their results to a [`MatchOutcome`].

use std::cmp::Ordering;

use log::{debug, error, info, warn};
use tokio_util::sync::CancellationToken;

use crate::activities::CHOOSE_STARTING_PLAYER;
use crate::common::GameError;
use crate::domain::{
    ActorId, MatchOutcome, PlayerInput, PlayerOutput, PlayerStatus, PlayerTally, TiePolicy, Winner,
};
use crate::player::PlayerActor;
use crate::protocol::Message;
use crate::runtime::{ActorHandle, Runtime};

/// One of the two players of a match, in spawn order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

impl Side {
    fn index(self) -> usize {
        match self {
            Side::First => 0,
            Side::Second => 1,
        }
    }
}

/// Reduce both players' results to the match outcome.
///
/// More collected letters wins. Equal counts are settled by `policy`;
/// `finished_first` is the side whose actor terminated first.
pub fn decide(
    first: &PlayerTally,
    second: &PlayerTally,
    finished_first: Side,
    policy: TiePolicy,
) -> MatchOutcome {
    let winner = match first
        .collected_letters
        .len()
        .cmp(&second.collected_letters.len())
    {
        Ordering::Greater => Some(Side::First),
        Ordering::Less => Some(Side::Second),
        Ordering::Equal => match policy {
            TiePolicy::Draw => None,
            TiePolicy::FirstFinished => Some(finished_first),
            TiePolicy::SecondPlayer => Some(Side::Second),
        },
    };
    let tallies = vec![first.clone(), second.clone()];
    match winner {
        Some(side) => {
            let tally = &tallies[side.index()];
            MatchOutcome {
                winner: Winner::Player {
                    id: tally.id.clone(),
                    name: tally.name.clone(),
                },
                collected_letters: tally.collected_letters.clone(),
                tallies,
            }
        }
        None => MatchOutcome {
            winner: Winner::Draw,
            collected_letters: Vec::new(),
            tallies,
        },
    }
}

enum Event {
    Finished(Side, anyhow::Result<PlayerOutput>),
    Deadline,
    Cancelled,
}

/// Coordinator of a single match.
pub struct Game {
    runtime: Runtime,
    id: ActorId,
}

impl Game {
    pub fn new(runtime: Runtime, id: impl Into<ActorId>) -> Self {
        Self {
            runtime,
            id: id.into(),
        }
    }

    pub fn id(&self) -> &ActorId {
        &self.id
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Actor ids of the first and second player.
    pub fn player_ids(&self) -> (ActorId, ActorId) {
        (
            ActorId::new(format!("{}-player1", self.id)),
            ActorId::new(format!("{}-player2", self.id)),
        )
    }

    pub async fn run(&self) -> anyhow::Result<MatchOutcome> {
        self.run_with_cancel(CancellationToken::new()).await
    }

    /// Run the match until both players terminate.
    ///
    /// Cancelling `cancel`, or dropping the returned future, cancels both
    /// players. Any player failure fails the match.
    pub async fn run_with_cancel(&self, cancel: CancellationToken) -> anyhow::Result<MatchOutcome> {
        let scope = cancel.child_token();
        let _scope_guard = scope.clone().drop_guard();
        let config = self.runtime.config();
        let (first_id, second_id) = self.player_ids();

        let starter = self.choose_starting_player(&first_id, &second_id, &scope).await?;
        info!("[{}] {} takes the first turn", self.id, starter);
        let initial_status = |id: &ActorId| {
            if *id == starter {
                PlayerStatus::Playing
            } else {
                PlayerStatus::Waiting
            }
        };

        let first = PlayerActor::spawn(
            &self.runtime,
            &scope,
            first_id.clone(),
            PlayerInput {
                name: "player 1".to_string(),
                competitor_id: second_id.clone(),
                initial_status: initial_status(&first_id),
            },
        );
        let second = PlayerActor::spawn(
            &self.runtime,
            &scope,
            second_id.clone(),
            PlayerInput {
                name: "player 2".to_string(),
                competitor_id: first_id.clone(),
                initial_status: initial_status(&second_id),
            },
        );

        let (first_output, second_output, finished_first) =
            self.join(first, second, &scope).await?;

        let first_tally = PlayerTally {
            id: first_id,
            name: "player 1".to_string(),
            collected_letters: first_output.collected_letters,
        };
        let second_tally = PlayerTally {
            id: second_id,
            name: "player 2".to_string(),
            collected_letters: second_output.collected_letters,
        };
        let outcome = decide(&first_tally, &second_tally, finished_first, config.tie_policy);
        info!(
            "[{}] Winner: {} with {} letters",
            self.id,
            outcome.winner,
            outcome.collected_letters.len()
        );
        Ok(outcome)
    }

    async fn choose_starting_player(
        &self,
        first: &ActorId,
        second: &ActorId,
        scope: &CancellationToken,
    ) -> anyhow::Result<ActorId> {
        let config = self.runtime.config();
        let activities = self.runtime.activities();
        let candidates = [first.clone(), second.clone()];
        let starter = self
            .runtime
            .execute(
                &self.id,
                CHOOSE_STARTING_PLAYER,
                &config.starting_side,
                scope,
                |ctx| activities.choose_starting_player(ctx, &candidates),
            )
            .await?;
        if !candidates.contains(&starter) {
            return Err(GameError::ActivityFailed {
                activity: CHOOSE_STARTING_PLAYER,
                attempts: 1,
                reason: format!("{} is not a player of this match", starter),
            }
            .into());
        }
        Ok(starter)
    }

    /// Wait for both players in whatever order they finish.
    async fn join(
        &self,
        mut first: ActorHandle<PlayerOutput>,
        mut second: ActorHandle<PlayerOutput>,
        scope: &CancellationToken,
    ) -> anyhow::Result<(PlayerOutput, PlayerOutput, Side)> {
        let mut outputs: [Option<PlayerOutput>; 2] = [None, None];
        let mut done = [false, false];
        let mut finished_first = None;

        let deadline = self.runtime.config().match_deadline;
        let mut deadline_armed = deadline.is_some();
        let sleep = tokio::time::sleep(deadline.unwrap_or_default());
        tokio::pin!(sleep);

        while !(done[0] && done[1]) {
            let event = tokio::select! {
                biased;
                _ = scope.cancelled() => Event::Cancelled,
                res = &mut first, if !done[0] => Event::Finished(Side::First, res),
                res = &mut second, if !done[1] => Event::Finished(Side::Second, res),
                _ = &mut sleep, if deadline_armed => Event::Deadline,
            };
            match event {
                Event::Finished(side, Ok(output)) => {
                    debug!("[{}] {:?} player finished", self.id, side);
                    done[side.index()] = true;
                    outputs[side.index()] = Some(output);
                    finished_first.get_or_insert(side);
                }
                Event::Finished(side, Err(e)) => {
                    error!("[{}] {:?} player failed: {:#}", self.id, side, e);
                    done[side.index()] = true;
                    scope.cancel();
                    Self::drain(&mut first, &mut second, done).await;
                    return Err(e);
                }
                Event::Deadline => {
                    deadline_armed = false;
                    warn!("[{}] Match deadline reached, stopping both players", self.id);
                    for (handle_done, id) in [(done[0], first.id()), (done[1], second.id())] {
                        if !handle_done {
                            self.runtime.signal(&self.id, id, Message::GameOver).await?;
                        }
                    }
                }
                Event::Cancelled => {
                    warn!("[{}] Cancelled, stopping both players", self.id);
                    Self::drain(&mut first, &mut second, done).await;
                    return Err(GameError::Cancelled {
                        actor: self.id.clone(),
                    }
                    .into());
                }
            }
        }

        match (outputs, finished_first) {
            ([Some(first), Some(second)], Some(side)) => Ok((first, second, side)),
            _ => Err(anyhow::anyhow!("{} joined without both player results", self.id)),
        }
    }

    /// Await the players still running once the scope is cancelled.
    async fn drain(
        first: &mut ActorHandle<PlayerOutput>,
        second: &mut ActorHandle<PlayerOutput>,
        done: [bool; 2],
    ) {
        for (handle, finished) in [(first, done[0]), (second, done[1])] {
            if finished {
                continue;
            }
            let id = handle.id().clone();
            if let Err(e) = handle.await {
                debug!("[{}] stopped: {}", id, e);
            }
        }
    }
}
