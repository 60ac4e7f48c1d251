#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use letter_battleship::config::ALPHABET;
use letter_battleship::{
    Activities, ActivityContext, ActorId, Board, Coordinate, GameConfig, Runtime,
};

/// Coordinate of the `i`-th letter on [`alphabet_board`].
pub fn letter_cell(i: usize) -> Coordinate {
    Coordinate::new((i % 11) as u8, (i / 11) as u8)
}

/// A..Z laid out row by row from the top-left corner of a size-10 board.
pub fn alphabet_board() -> Board {
    Board::from_placement(10, ALPHABET.iter().enumerate().map(|(i, &l)| (letter_cell(i), l)))
        .unwrap()
}

/// Attacks that hit every letter of [`alphabet_board`] in alphabetical order.
pub fn hitting_script() -> Vec<Coordinate> {
    (0..ALPHABET.len()).map(letter_cell).collect()
}

/// Attacks that never hit [`alphabet_board`].
pub fn missing_script() -> Vec<Coordinate> {
    (0..=10u8)
        .flat_map(|y| (0..=10u8).map(move |x| Coordinate::new(x, y)))
        .filter(|c| c.y >= 5)
        .collect()
}

/// Deterministic leaf operations.
///
/// Attack `n` of an actor is entry `n` of its script, so a retried call picks
/// the same target.
pub struct ScriptedActivities {
    pub starter: Option<ActorId>,
    pub scripts: HashMap<ActorId, Vec<Coordinate>>,
    pub attack_delay: Duration,
    pub fail_boards: bool,
    pub board_calls: AtomicUsize,
}

impl ScriptedActivities {
    pub fn new(starter: Option<&str>) -> Self {
        Self {
            starter: starter.map(ActorId::from),
            scripts: HashMap::new(),
            attack_delay: Duration::ZERO,
            fail_boards: false,
            board_calls: AtomicUsize::new(0),
        }
    }

    pub fn script(mut self, actor: &str, attacks: Vec<Coordinate>) -> Self {
        self.scripts.insert(ActorId::from(actor), attacks);
        self
    }

    pub fn attack_delay(mut self, delay: Duration) -> Self {
        self.attack_delay = delay;
        self
    }

    pub fn failing_boards(mut self) -> Self {
        self.fail_boards = true;
        self
    }

    pub fn board_calls(&self) -> usize {
        self.board_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Activities for ScriptedActivities {
    async fn choose_starting_player(
        &self,
        _ctx: ActivityContext,
        _candidates: &[ActorId],
    ) -> anyhow::Result<ActorId> {
        self.starter
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no starting player scripted"))
    }

    async fn generate_board(
        &self,
        _ctx: ActivityContext,
        _size: u8,
        _pieces: &[char],
    ) -> anyhow::Result<Board> {
        self.board_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_boards {
            return Err(anyhow::anyhow!("board service unavailable"));
        }
        Ok(alphabet_board())
    }

    async fn select_attack(
        &self,
        ctx: ActivityContext,
        history: &[Coordinate],
        _board_size: u8,
    ) -> anyhow::Result<Coordinate> {
        if !self.attack_delay.is_zero() {
            tokio::time::sleep(self.attack_delay).await;
        }
        self.scripts
            .get(&ctx.actor)
            .and_then(|script| script.get(history.len()))
            .copied()
            .ok_or_else(|| anyhow::anyhow!("script of {} is exhausted", ctx.actor))
    }

    async fn check_attack(
        &self,
        _ctx: ActivityContext,
        target: &Coordinate,
        board: &Board,
    ) -> anyhow::Result<Option<char>> {
        Ok(board.piece_at(target))
    }
}

/// Runtime over scripted activities with a short retry backoff.
pub fn scripted_runtime(activities: Arc<ScriptedActivities>, config: GameConfig) -> Runtime {
    let mut config = config;
    config.activity.backoff = Duration::from_millis(1);
    Runtime::new(config, activities)
}
