//! Data contracts shared between the coordinator and the player actors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a durable actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Status of a player actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerStatus {
    Waiting,
    Playing,
    Attacking,
    UnderAttack,
    GameOver,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerStatus::Waiting => "waiting",
            PlayerStatus::Playing => "playing",
            PlayerStatus::Attacking => "attacking",
            PlayerStatus::UnderAttack => "under_attack",
            PlayerStatus::GameOver => "game_over",
        };
        f.write_str(name)
    }
}

/// Something that moves a player from one status to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusEvent {
    /// The competitor handed the turn over.
    TurnGranted,
    /// The competitor attacked one of our cells.
    AttackReceived,
    /// We chose a target and sent the attack.
    AttackLaunched,
    /// The competitor answered our attack.
    ResultReceived,
    /// We answered the competitor's attack.
    ResultSent,
    /// The match is over.
    GameOver,
}

impl StatusEvent {
    /// Status the event leads to when applied from its expected source.
    pub fn target(self) -> PlayerStatus {
        match self {
            StatusEvent::TurnGranted => PlayerStatus::Playing,
            StatusEvent::AttackReceived => PlayerStatus::UnderAttack,
            StatusEvent::AttackLaunched => PlayerStatus::Attacking,
            StatusEvent::ResultReceived | StatusEvent::ResultSent => PlayerStatus::Waiting,
            StatusEvent::GameOver => PlayerStatus::GameOver,
        }
    }
}

/// An event arrived while the player was not in the status it expects.
///
/// `to` is the status the player moves to anyway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMismatch {
    pub from: PlayerStatus,
    pub event: StatusEvent,
    pub to: PlayerStatus,
}

impl fmt::Display for StatusMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unexpected {:?} while {}, moving to {}",
            self.event, self.from, self.to
        )
    }
}

impl PlayerStatus {
    /// Transition function of the player state machine.
    ///
    /// Valid transitions return the next status. Anything else returns a
    /// [`StatusMismatch`] whose `to` field is the lenient target: the event's
    /// natural target, except that `GameOver` is never left.
    pub fn on(self, event: StatusEvent) -> Result<PlayerStatus, StatusMismatch> {
        use PlayerStatus::*;
        use StatusEvent as E;
        let next = match (self, event) {
            (GameOver, _) => None,
            (_, E::GameOver) => Some(GameOver),
            (Waiting, E::TurnGranted) => Some(Playing),
            (Waiting, E::AttackReceived) => Some(UnderAttack),
            (Playing, E::AttackLaunched) => Some(Attacking),
            (Attacking, E::ResultReceived) => Some(Waiting),
            (UnderAttack, E::ResultSent) => Some(Waiting),
            _ => None,
        };
        next.ok_or(StatusMismatch {
            from: self,
            event,
            to: if self == GameOver {
                GameOver
            } else {
                event.target()
            },
        })
    }

    pub fn is_terminal(self) -> bool {
        self == PlayerStatus::GameOver
    }
}

/// Insertion-ordered set of letters with an upper bound on its size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterSet {
    letters: Vec<char>,
    limit: usize,
}

impl LetterSet {
    pub fn new(limit: usize) -> Self {
        Self {
            letters: Vec::new(),
            limit,
        }
    }

    /// Add a letter unless it is already present or the set is full.
    /// Returns `true` when the set changed.
    pub fn insert(&mut self, letter: char) -> bool {
        if self.letters.len() >= self.limit || self.letters.contains(&letter) {
            return false;
        }
        self.letters.push(letter);
        true
    }

    pub fn contains(&self, letter: char) -> bool {
        self.letters.contains(&letter)
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.letters.len() >= self.limit
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Letters in the order they were added.
    pub fn as_slice(&self) -> &[char] {
        &self.letters
    }

    pub fn to_vec(&self) -> Vec<char> {
        self.letters.clone()
    }
}

/// Start-up parameters of a player actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub name: String,
    pub competitor_id: ActorId,
    pub initial_status: PlayerStatus,
}

/// Final output of a player actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerOutput {
    pub collected_letters: Vec<char>,
}

/// One player's final result as seen by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTally {
    pub id: ActorId,
    pub name: String,
    pub collected_letters: Vec<char>,
}

/// Who won a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Player { id: ActorId, name: String },
    Draw,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Player { name, .. } => f.write_str(name),
            Winner::Draw => f.write_str("draw"),
        }
    }
}

/// Result of a whole match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub winner: Winner,
    /// Winner's letters in capture order; empty for a draw.
    pub collected_letters: Vec<char>,
    /// Both players' results, first player first.
    pub tallies: Vec<PlayerTally>,
}

/// How the coordinator settles equal letter counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TiePolicy {
    /// Nobody wins.
    #[default]
    Draw,
    /// The player whose actor terminated first wins.
    FirstFinished,
    /// The second player wins, as the plain "more letters" comparison
    /// falls through to it.
    SecondPlayer,
}

impl FromStr for TiePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "draw" => Ok(TiePolicy::Draw),
            "first-finished" => Ok(TiePolicy::FirstFinished),
            "second-player" => Ok(TiePolicy::SecondPlayer),
            other => Err(anyhow::anyhow!("unknown tie policy {:?}", other)),
        }
    }
}
