//! Player actors
//!
//! A player owns a board, attacks the competitor's board turn by turn and
//! answers the competitor's attacks. The logic is split in two:
//! - [`PlayerState`]: pure, checkpointable state machine fed with messages
//! - [`PlayerActor`]: driver that performs leaf operations, persists the
//!   state and exchanges messages through the runtime

pub mod node;
pub mod state;

pub use node::PlayerActor;
pub use state::{Handled, PendingAttack, PlayerState};
