use serde::{Deserialize, Serialize};

use crate::board::{Board, Coordinate};
use crate::domain::{LetterSet, PlayerOutput, PlayerStatus, StatusEvent, StatusMismatch};
use crate::protocol::Message;

/// An attack received from the competitor that still needs an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAttack {
    pub turn: u64,
    pub target: Coordinate,
}

/// What a handler did with its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Applied,
    /// Applied although the player was in an unexpected status.
    Lenient(StatusMismatch),
    /// Dropped without touching the state, usually a redelivery.
    Ignored(&'static str),
}

/// Everything a player actor knows. Checkpointed after every change.
///
/// Handlers never perform I/O: messages for the competitor are queued in the
/// outbox and sent by the driver once the state carrying them is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    status: PlayerStatus,
    /// Latest turn granted to this player.
    turn: u64,
    board: Option<Board>,
    attack_history: Vec<Coordinate>,
    letters_won: LetterSet,
    letters_lost: LetterSet,
    received_attack: Option<PendingAttack>,
    /// Highest turn of an attack received from the competitor.
    last_attack_turn: u64,
    /// Highest turn whose result has been recorded.
    last_result_turn: u64,
    outbox: Vec<Message>,
}

impl PlayerState {
    /// Fresh state. The starting player owns turn 1.
    pub fn new(initial_status: PlayerStatus, letters_to_win: usize) -> Self {
        Self {
            status: initial_status,
            turn: if initial_status == PlayerStatus::Playing { 1 } else { 0 },
            board: None,
            attack_history: Vec::new(),
            letters_won: LetterSet::new(letters_to_win),
            letters_lost: LetterSet::new(letters_to_win),
            received_attack: None,
            last_attack_turn: 0,
            last_result_turn: 0,
            outbox: Vec::new(),
        }
    }

    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn attack_history(&self) -> &[Coordinate] {
        &self.attack_history
    }

    pub fn letters_won(&self) -> &LetterSet {
        &self.letters_won
    }

    pub fn letters_lost(&self) -> &LetterSet {
        &self.letters_lost
    }

    pub fn received_attack(&self) -> Option<&PendingAttack> {
        self.received_attack.as_ref()
    }

    pub fn outbox(&self) -> &[Message] {
        &self.outbox
    }

    pub fn clear_outbox(&mut self) {
        self.outbox.clear();
    }

    pub fn output(&self) -> PlayerOutput {
        PlayerOutput {
            collected_letters: self.letters_won.to_vec(),
        }
    }

    /// Keep the first board ever installed. Returns `false` if one was
    /// already present.
    pub fn install_board(&mut self, board: Board) -> bool {
        if self.board.is_some() {
            return false;
        }
        self.board = Some(board);
        true
    }

    fn transition(&mut self, event: StatusEvent) -> Handled {
        match self.status.on(event) {
            Ok(next) => {
                self.status = next;
                Handled::Applied
            }
            Err(mismatch) => {
                self.status = mismatch.to;
                Handled::Lenient(mismatch)
            }
        }
    }

    /// Apply a message from the competitor or the coordinator.
    pub fn apply(&mut self, message: &Message) -> Handled {
        if self.status.is_terminal() && *message != Message::GameOver {
            return Handled::Ignored("match is already over");
        }
        match *message {
            Message::TurnGranted { turn } => self.on_turn_granted(turn),
            Message::Attack { turn, target } => self.on_attack(turn, target),
            Message::AttackResult { turn, hit } => self.on_result(turn, hit),
            Message::GameOver => self.on_game_over(),
        }
    }

    fn on_turn_granted(&mut self, turn: u64) -> Handled {
        if turn <= self.turn {
            return Handled::Ignored("turn was already granted");
        }
        self.turn = turn;
        self.transition(StatusEvent::TurnGranted)
    }

    fn on_attack(&mut self, turn: u64, target: Coordinate) -> Handled {
        if turn <= self.last_attack_turn {
            return Handled::Ignored("attack was already received");
        }
        self.last_attack_turn = turn;
        self.received_attack = Some(PendingAttack { turn, target });
        self.transition(StatusEvent::AttackReceived)
    }

    fn on_result(&mut self, turn: u64, hit: Option<char>) -> Handled {
        if turn != self.turn || turn <= self.last_result_turn {
            return Handled::Ignored("result does not answer the current attack");
        }
        self.last_result_turn = turn;
        if let Some(letter) = hit {
            self.letters_won.insert(letter);
        }
        let handled = self.transition(StatusEvent::ResultReceived);
        if self.letters_won.is_full() {
            self.transition(StatusEvent::GameOver);
            self.outbox.push(Message::GameOver);
        } else {
            self.outbox.push(Message::TurnGranted { turn: turn + 1 });
        }
        handled
    }

    fn on_game_over(&mut self) -> Handled {
        if self.status.is_terminal() {
            return Handled::Ignored("match is already over");
        }
        self.transition(StatusEvent::GameOver)
    }

    /// Record our own attack on `target` and queue it for the competitor.
    pub fn launch_attack(&mut self, target: Coordinate) -> Handled {
        self.attack_history.push(target);
        self.outbox.push(Message::Attack {
            turn: self.turn,
            target,
        });
        self.transition(StatusEvent::AttackLaunched)
    }

    /// Answer the pending attack with the letter it hit, if any.
    pub fn answer_attack(&mut self, hit: Option<char>) -> Handled {
        let Some(pending) = self.received_attack.take() else {
            return Handled::Ignored("no attack to answer");
        };
        if let Some(letter) = hit {
            self.letters_lost.insert(letter);
        }
        self.outbox.push(Message::AttackResult {
            turn: pending.turn,
            hit,
        });
        self.transition(StatusEvent::ResultSent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_player_owns_first_turn() {
        assert_eq!(PlayerState::new(PlayerStatus::Playing, 26).turn(), 1);
        assert_eq!(PlayerState::new(PlayerStatus::Waiting, 26).turn(), 0);
    }

    #[test]
    fn board_is_installed_once() {
        let mut state = PlayerState::new(PlayerStatus::Waiting, 26);
        let first = Board::from_placement(10, [(Coordinate::new(0, 0), 'A')]).unwrap();
        let second = Board::from_placement(10, [(Coordinate::new(1, 1), 'A')]).unwrap();
        assert!(state.install_board(first.clone()));
        assert!(!state.install_board(second));
        assert_eq!(state.board(), Some(&first));
    }
}
