use std::fmt::Write;

use crate::board::{Board, Coordinate};
use crate::domain::{MatchOutcome, Winner};

/// Render `board` as a grid, `y` growing downwards. Empty cells show `.`.
pub fn render_board(board: &Board) -> String {
    let size = board.size();
    let mut out = String::new();
    out.push_str("   ");
    for x in 0..=size {
        let _ = write!(out, "{:>3}", x);
    }
    out.push('\n');
    for y in 0..=size {
        let _ = write!(out, "{:>3}", y);
        for x in 0..=size {
            let cell = board.piece_at(&Coordinate::new(x, y)).unwrap_or('.');
            let _ = write!(out, "{:>3}", cell);
        }
        out.push('\n');
    }
    out
}

/// Human readable summary of a finished match.
pub fn render_outcome(outcome: &MatchOutcome) -> String {
    let mut out = String::new();
    match &outcome.winner {
        Winner::Player { id, name } => {
            let _ = writeln!(out, "Winner: {} ({})", name, id);
            let letters: String = outcome.collected_letters.iter().collect();
            let _ = writeln!(out, "Collected letters: {}", letters);
        }
        Winner::Draw => {
            let _ = writeln!(out, "Draw");
        }
    }
    for tally in &outcome.tallies {
        let _ = writeln!(
            out,
            "  {:<10} {:>2} letters",
            tally.name,
            tally.collected_letters.len()
        );
    }
    out
}
