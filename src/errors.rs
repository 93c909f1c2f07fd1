use crate::side::SideId;
use thiserror::Error;

/// Failures of the random engine. Sampling an empty list is the only one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrngError {
    #[error("Cannot sample an empty array")]
    EmptySample,
}

/// Errors raised while loading or querying bundled game data.
#[derive(Debug, Error)]
pub enum DexError {
    #[error("Malformed dex data: {0}")]
    Malformed(#[from] ron::error::SpannedError),
}

/// Errors related to team strings and structured team lists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TeamError {
    #[error("Packed team entry {index} is truncated")]
    Truncated { index: usize },
    #[error("Invalid team JSON: {0}")]
    InvalidJson(String),
}

/// Misuse of the battle controller. These never leave battle state half-mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    #[error("The battle has not started yet")]
    NotStarted,
    #[error("Slot {0} is not supported by a singles battle")]
    UnsupportedSlot(SideId),
    #[error("No player has been assigned to {0}")]
    UnknownSide(SideId),
    #[error("{0} has already made a choice this turn")]
    ChoiceAlreadyMade(SideId),
    #[error("Invalid choice \"{choice}\": {reason}")]
    InvalidChoice { choice: String, reason: String },
    #[error("{side} must switch out its fainted Pokemon")]
    MustSwitch { side: SideId },
    #[error("Move {index} is out of range")]
    InvalidMoveIndex { index: usize },
    #[error("Move {name} has no PP left")]
    NoPpLeft { name: String },
    #[error("Pokemon {index} is out of range")]
    InvalidSwitchIndex { index: usize },
    #[error("Can't switch to {name}: {reason}")]
    InvalidSwitchTarget { name: String, reason: &'static str },
    #[error("{0} was given an empty team")]
    EmptyTeam(SideId),
    #[error(transparent)]
    Team(#[from] TeamError),
}

/// Errors raised by the line-oriented command protocol.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Unrecognized command \">{command} {message}\"")]
    UnrecognizedCommand { command: String, message: String },
    #[error("Invalid JSON payload for \">{command}\": {source}")]
    InvalidJson {
        command: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid slot \"{0}\"")]
    InvalidSlot(String),
    #[error("Team requested for slot {0}, but that slot does not exist.")]
    MissingTeamSlot(String),
    #[error("No battle is running; send \">start\" first")]
    NoBattle,
    #[error("A battle is already running on this stream")]
    AlreadyStarted,
    #[error(transparent)]
    Battle(#[from] BattleError),
}

/// An error delivered in-band on an output channel. Cloned once per channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct StreamError {
    pub message: String,
}

impl From<&ProtocolError> for StreamError {
    fn from(err: &ProtocolError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

pub type PrngResult<T> = Result<T, PrngError>;
pub type DexResult<T> = Result<T, DexError>;
pub type TeamResult<T> = Result<T, TeamError>;
pub type BattleResult<T> = Result<T, BattleError>;
pub type ProtocolResult<T> = Result<T, ProtocolError>;
