use std::collections::HashSet;
use std::time::Duration;

use crate::board::cell_count;
use crate::common::GameError;
use crate::domain::TiePolicy;

pub const BOARD_SIZE: u8 = 10;
pub const ALPHABET_LEN: usize = 26;
pub const ALPHABET: [char; ALPHABET_LEN] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Start-to-close timeout of a single leaf operation attempt.
pub const ACTIVITY_TIMEOUT: Duration = Duration::from_secs(1);
pub const ACTIVITY_MAX_ATTEMPTS: u32 = 3;
pub const ACTIVITY_RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Prefix of every environment variable read by [`GameConfig::from_env`].
pub const ENV_PREFIX: &str = "LETTERS_";

/// Timeout and retry policy of a leaf operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityOptions {
    pub start_to_close: Duration,
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl ActivityOptions {
    /// Retry transient failures with the default attempt budget.
    pub const fn retrying(start_to_close: Duration) -> Self {
        Self {
            start_to_close,
            max_attempts: ACTIVITY_MAX_ATTEMPTS,
            backoff: ACTIVITY_RETRY_BACKOFF,
        }
    }

    /// Single attempt, no retries.
    pub const fn once(start_to_close: Duration) -> Self {
        Self {
            start_to_close,
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }
}

impl Default for ActivityOptions {
    fn default() -> Self {
        Self::retrying(ACTIVITY_TIMEOUT)
    }
}

/// Everything a match needs to know before it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub board_size: u8,
    /// Pieces placed on every board; capturing all of them wins.
    pub pieces: Vec<char>,
    /// Board generation, attack selection and hit checks.
    pub activity: ActivityOptions,
    /// Starting-side selection. Side-effect free, so never retried.
    pub starting_side: ActivityOptions,
    pub tie_policy: TiePolicy,
    /// Stop both players cooperatively once this much time has passed.
    pub match_deadline: Option<Duration>,
    /// Probability that the transport delivers a message twice.
    pub duplicate_delivery: f64,
    /// Seed for reproducible matches.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: BOARD_SIZE,
            pieces: ALPHABET.to_vec(),
            activity: ActivityOptions::default(),
            starting_side: ActivityOptions::once(ACTIVITY_TIMEOUT),
            tie_policy: TiePolicy::default(),
            match_deadline: None,
            duplicate_delivery: 0.0,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Defaults overridden by `LETTERS_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each
    /// `LETTERS_*` key.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));
        let mut config = Self::default();

        if let Some(v) = get("BOARD_SIZE") {
            config.board_size = v.trim().parse()?;
        }
        if let Some(v) = get("ACTIVITY_TIMEOUT_MS") {
            config.activity.start_to_close = Duration::from_millis(v.trim().parse()?);
        }
        if let Some(v) = get("MAX_ATTEMPTS") {
            config.activity.max_attempts = v.trim().parse()?;
        }
        if let Some(v) = get("TIE_POLICY") {
            config.tie_policy = v.parse()?;
        }
        if let Some(v) = get("MATCH_DEADLINE_MS") {
            config.match_deadline = Some(Duration::from_millis(v.trim().parse()?));
        }
        if let Some(v) = get("DUPLICATE_DELIVERY") {
            config.duplicate_delivery = v.trim().parse()?;
        }
        if let Some(v) = get("SEED") {
            config.seed = Some(v.trim().parse()?);
        }
        config.validate()?;
        Ok(config)
    }

    /// Number of captured letters that wins the match.
    pub fn letters_to_win(&self) -> usize {
        self.pieces.len()
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if self.pieces.is_empty() {
            return Err(GameError::InvalidConfig("pieces must not be empty".to_string()));
        }
        if self.pieces.len() > ALPHABET_LEN {
            return Err(GameError::InvalidConfig(format!(
                "at most {} pieces are allowed, got {}",
                ALPHABET_LEN,
                self.pieces.len()
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.pieces.iter().find(|p| !seen.insert(**p)) {
            return Err(GameError::InvalidConfig(format!("piece {} appears twice", dup)));
        }
        if self.pieces.len() > cell_count(self.board_size) {
            return Err(GameError::InvalidConfig(format!(
                "board_size {} cannot hold {} pieces",
                self.board_size,
                self.pieces.len()
            )));
        }
        for (name, options) in [("activity", &self.activity), ("starting_side", &self.starting_side)] {
            if options.max_attempts == 0 {
                return Err(GameError::InvalidConfig(format!(
                    "{}.max_attempts must be >= 1",
                    name
                )));
            }
            if options.start_to_close.is_zero() {
                return Err(GameError::InvalidConfig(format!(
                    "{}.start_to_close must be > 0",
                    name
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.duplicate_delivery) {
            return Err(GameError::InvalidConfig(format!(
                "duplicate_delivery must be within [0, 1], got {}",
                self.duplicate_delivery
            )));
        }
        if matches!(self.match_deadline, Some(d) if d.is_zero()) {
            return Err(GameError::InvalidConfig("match_deadline must be > 0".to_string()));
        }
        Ok(())
    }
}
