//! Pokemon Battle Simulator
//!
//! A deterministic, seed-driven singles battle engine. A battle is driven by
//! choice submissions, writes an append-only protocol log, and fans that log
//! out to per-viewer channels.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod dex;
pub mod errors;
pub mod pokemon;
pub mod prng;
pub mod side;
pub mod stream;
pub mod teams;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{BoostId, MoveCategory, MoveTarget, PokemonType, StatId, StatTable, StatusType, TypeRelation};

// --- From this crate's modules (`src/`) ---

// The controller and what it is configured with.
pub use battle::engine::{parse_choice, Battle};
pub use battle::log::{BattleEvent, EventLog, EventRecord, OutputSink};
pub use battle::state::{BattleOptions, BattleState, GameState, PlayerOptions, TeamSpec};

// Core runtime types for a battle.
pub use pokemon::{PokemonInst, StatusCondition};
pub use prng::{Prng, PrngSeed};
pub use side::{BattleSide, ChoiceAction, SideId};
pub use teams::PokemonSet;

// Data lookup.
pub use dex::{to_id, DataLookup, Dex};

// Streaming front end.
pub use stream::{BattleStream, ChannelId, Channels, ReplayView, StreamOptions};

// Crate-specific error and result types.
pub use errors::{
    BattleError, BattleResult, DexError, DexResult, PrngError, PrngResult, ProtocolError, ProtocolResult,
    StreamError, TeamError, TeamResult,
};
