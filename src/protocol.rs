//! Messages exchanged between player actors and the envelope they travel in.

use serde::{Deserialize, Serialize};

use crate::board::Coordinate;
use crate::common::GameError;
use crate::domain::ActorId;

pub const PROTOCOL_VERSION: u8 = 1;

/// Upper bound of an encoded envelope, so a corrupt length prefix cannot
/// trigger a huge allocation.
const MAX_FRAME_SIZE: u64 = 64 * 1024;

/// Signals a player actor understands.
///
/// `turn` is the global half-round number: the starting player owns turn 1
/// and every hand-over increments it. Receivers use it to drop redeliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// The competitor finished its turn; `turn` is now ours.
    TurnGranted { turn: u64 },
    /// The competitor attacks `target` during `turn`.
    Attack { turn: u64, target: Coordinate },
    /// Answer to our attack of `turn`: the letter hit, if any.
    AttackResult { turn: u64, hit: Option<char> },
    /// The match is over.
    GameOver,
}

impl Message {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Message::TurnGranted { .. } => "turn_granted",
            Message::Attack { .. } => "attack",
            Message::AttackResult { .. } => "result",
            Message::GameOver => "game_over",
        }
    }
}

/// A message addressed by the runtime, tagged with its sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u8,
    pub from: ActorId,
    pub message: Message,
}

impl Envelope {
    pub fn new(from: ActorId, message: Message) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            from,
            message,
        }
    }

    pub fn encode(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a frame and reject anything not speaking our protocol version.
    pub fn decode(frame: &[u8]) -> anyhow::Result<Self> {
        use bincode::Options;

        if frame.len() as u64 > MAX_FRAME_SIZE {
            return Err(anyhow::anyhow!(
                "Frame of {} bytes exceeds the {} byte limit",
                frame.len(),
                MAX_FRAME_SIZE
            ));
        }
        let envelope: Envelope = bincode::options()
            .with_fixint_encoding()
            .allow_trailing_bytes()
            .with_limit(MAX_FRAME_SIZE)
            .deserialize(frame)?;
        if envelope.version != PROTOCOL_VERSION {
            return Err(GameError::ProtocolVersion {
                expected: PROTOCOL_VERSION,
                got: envelope.version,
            }
            .into());
        }
        Ok(envelope)
    }
}
