pub mod activities;
pub mod board;
mod common;
pub mod config;
pub mod domain;
pub mod game;
mod logging;
pub mod player;
pub mod protocol;
pub mod runtime;
pub mod transport;
pub mod ui;

pub use activities::{Activities, ActivityContext, RandomActivities};
pub use board::{Board, Coordinate};
pub use common::*;
pub use config::{ActivityOptions, GameConfig};
pub use domain::*;
pub use game::{decide, Game, Side};
pub use logging::{init_logging, init_logging_at};
pub use player::{Handled, PlayerActor, PlayerState};
pub use protocol::{Envelope, Message, PROTOCOL_VERSION};
pub use runtime::{ActorHandle, Journal, Runtime};
pub use transport::{InMemoryTransport, RedeliveringTransport, Transport};
