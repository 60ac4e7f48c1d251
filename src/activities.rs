//! Leaf operations invoked by the actors through the runtime.
//!
//! Every call may be retried by the runtime, so implementations must not
//! keep per-call state that a retry would corrupt.

use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::Mutex;

use crate::board::{self, Board, Coordinate};
use crate::domain::ActorId;

pub const CHOOSE_STARTING_PLAYER: &str = "choose_starting_player";
pub const GENERATE_BOARD: &str = "generate_board";
pub const SELECT_ATTACK: &str = "select_attack";
pub const CHECK_ATTACK: &str = "check_attack";

/// Who is calling, and which attempt this is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityContext {
    pub actor: ActorId,
    pub attempt: u32,
}

impl ActivityContext {
    pub fn new(actor: ActorId, attempt: u32) -> Self {
        Self { actor, attempt }
    }
}

#[async_trait]
pub trait Activities: Send + Sync {
    /// Pick the player that takes the first turn.
    async fn choose_starting_player(
        &self,
        ctx: ActivityContext,
        candidates: &[ActorId],
    ) -> anyhow::Result<ActorId>;

    /// Place every piece on a fresh board.
    async fn generate_board(
        &self,
        ctx: ActivityContext,
        size: u8,
        pieces: &[char],
    ) -> anyhow::Result<Board>;

    /// Choose a coordinate not yet present in `history`.
    async fn select_attack(
        &self,
        ctx: ActivityContext,
        history: &[Coordinate],
        board_size: u8,
    ) -> anyhow::Result<Coordinate>;

    /// Resolve an attack against `board`.
    async fn check_attack(
        &self,
        ctx: ActivityContext,
        target: &Coordinate,
        board: &Board,
    ) -> anyhow::Result<Option<char>>;
}

/// Uniformly random implementation backed by a single seedable generator.
pub struct RandomActivities {
    rng: Mutex<SmallRng>,
}

impl RandomActivities {
    /// A fixed seed makes the whole match reproducible as long as the call
    /// order is the same.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = if let Some(s) = seed {
            SmallRng::seed_from_u64(s)
        } else {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl Activities for RandomActivities {
    async fn choose_starting_player(
        &self,
        _ctx: ActivityContext,
        candidates: &[ActorId],
    ) -> anyhow::Result<ActorId> {
        if candidates.is_empty() {
            return Err(anyhow::anyhow!("No candidates to start the game"));
        }
        let idx = self.rng.lock().await.random_range(0..candidates.len());
        Ok(candidates[idx].clone())
    }

    async fn generate_board(
        &self,
        ctx: ActivityContext,
        size: u8,
        pieces: &[char],
    ) -> anyhow::Result<Board> {
        log::info!("[{}] Generating board with size {}x{}", ctx.actor, size, size);
        let mut rng = self.rng.lock().await;
        let board = board::generate_board(&mut *rng, size, pieces)?;
        log::debug!("[{}] Got board: {:?}", ctx.actor, board.placement());
        Ok(board)
    }

    async fn select_attack(
        &self,
        _ctx: ActivityContext,
        history: &[Coordinate],
        board_size: u8,
    ) -> anyhow::Result<Coordinate> {
        let mut rng = self.rng.lock().await;
        Ok(board::select_attack(&mut *rng, history, board_size)?)
    }

    async fn check_attack(
        &self,
        ctx: ActivityContext,
        target: &Coordinate,
        board: &Board,
    ) -> anyhow::Result<Option<char>> {
        let hit = board::check_attack(target, board);
        match hit {
            Some(letter) => log::debug!("[{}] Attack on {} hit {}", ctx.actor, target, letter),
            None => log::debug!("[{}] Attack on {} missed", ctx.actor, target),
        }
        Ok(hit)
    }
}
