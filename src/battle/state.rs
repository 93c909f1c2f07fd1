use crate::battle::log::EventLog;
use crate::prng::{parse_seed, Prng, PrngSeed};
use crate::side::{BattleSide, SideId};
use crate::teams::PokemonSet;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FORMAT: &str = "gen9customgame";
pub const DEFAULT_GENERATION: u8 = 9;

/// Controller lifecycle. `Ended` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameState {
    AwaitingPlayers,
    AwaitingChoices,
    Resolving,
    Ended,
}

/// A seed as it may arrive on the wire: four words or the `a,b,c,d` text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedSpec {
    Words(PrngSeed),
    Text(String),
}

impl SeedSpec {
    /// `None` for malformed text, which means "generate one".
    pub fn resolve(&self) -> Option<PrngSeed> {
        match self {
            SeedSpec::Words(words) => Some(*words),
            SeedSpec::Text(text) => parse_seed(text),
        }
    }
}

/// Payload of `>start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleOptions {
    #[serde(alias = "formatId")]
    pub formatid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<SeedSpec>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub debug: bool,
}

impl Default for BattleOptions {
    fn default() -> Self {
        Self {
            formatid: DEFAULT_FORMAT.to_string(),
            seed: None,
            debug: false,
        }
    }
}

impl BattleOptions {
    pub fn with_seed(mut self, seed: PrngSeed) -> Self {
        self.seed = Some(SeedSpec::Words(seed));
        self
    }

    /// The number following the first `gen` in the format id.
    pub fn generation(&self) -> u8 {
        let format = self.formatid.to_ascii_lowercase();
        format
            .find("gen")
            .map(|at| &format[at + 3..])
            .map(|rest| rest.chars().take_while(char::is_ascii_digit).collect::<String>())
            .and_then(|digits| digits.parse().ok())
            .unwrap_or(DEFAULT_GENERATION)
    }
}

/// A team as submitted: packed text or a structured list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TeamSpec {
    Packed(String),
    Sets(Vec<PokemonSet>),
}

/// Payload of `>player`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamSpec>,
}

impl PlayerOptions {
    pub fn new(name: &str, team: Vec<PokemonSet>) -> Self {
        Self {
            name: Some(name.to_string()),
            team: Some(TeamSpec::Sets(team)),
        }
    }
}

/// Everything one battle owns. Sides are kept by slot; the RandomEngine and
/// the log live beside them so a turn can borrow all three at once.
#[derive(Debug, Clone)]
pub struct BattleState {
    pub format: String,
    pub generation: u8,
    pub sides: [Option<BattleSide>; 2],
    pub turn: u32,
    pub game_state: GameState,
    pub winner: Option<SideId>,
    pub prng: Prng,
    pub log: EventLog,
    pub debug: bool,
}

impl BattleState {
    pub fn new(options: &BattleOptions) -> Self {
        let seed = options.seed.as_ref().and_then(SeedSpec::resolve);
        Self {
            format: options.formatid.clone(),
            generation: options.generation(),
            sides: [None, None],
            turn: 0,
            game_state: GameState::AwaitingPlayers,
            winner: None,
            prng: Prng::new(seed),
            log: EventLog::new(),
            debug: options.debug,
        }
    }

    pub fn side(&self, id: SideId) -> Option<&BattleSide> {
        self.sides.get(id.index()).and_then(Option::as_ref)
    }

    pub fn side_mut(&mut self, id: SideId) -> Option<&mut BattleSide> {
        self.sides.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Assigned sides in slot order.
    pub fn sides(&self) -> impl Iterator<Item = &BattleSide> {
        self.sides.iter().flatten()
    }

    pub fn all_sides_set(&self) -> bool {
        self.sides.iter().all(Option::is_some)
    }

    pub fn is_ended(&self) -> bool {
        self.game_state == GameState::Ended
    }
}
