use crate::battle::engine::Battle;
use crate::battle::log::{EventRecord, OutputSink};
use crate::battle::state::{BattleOptions, BattleState, GameState, PlayerOptions};
use crate::dex::Dex;
use crate::errors::BattleResult;
use crate::pokemon::{PokemonInst, StatusCondition};
use crate::side::{BattleSide, SideId};
use crate::teams::PokemonSet;
use std::sync::Arc;

pub const TEST_SEED: [u16; 4] = [1, 2, 3, 4];

/// The bundled data set.
pub fn test_dex() -> Dex {
    match Dex::bundled() {
        Ok(dex) => dex,
        Err(err) => panic!("Failed to load bundled dex: {}", err),
    }
}

/// A builder for creating test Pokemon instances with common defaults.
///
/// # Example
/// ```ignore
/// let pokemon = TestPokemonBuilder::new("Pikachu", 25)
///     .with_moves(&["Thunderbolt"])
///     .with_status(StatusCondition::Paralysis)
///     .build();
/// ```
pub struct TestPokemonBuilder {
    species: String,
    level: u8,
    moves: Vec<String>,
    ability: Option<String>,
    status: Option<StatusCondition>,
    current_hp: Option<u16>,
    fainted: bool,
    side: SideId,
}

impl TestPokemonBuilder {
    /// Creates a new builder for a given species and level.
    pub fn new(species: &str, level: u8) -> Self {
        Self {
            species: species.to_string(),
            level,
            moves: vec!["Tackle".to_string()],
            ability: None,
            status: None,
            current_hp: None,
            fainted: false,
            side: SideId::P1,
        }
    }

    pub fn with_moves(mut self, moves: &[&str]) -> Self {
        self.moves = moves.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_ability(mut self, ability: &str) -> Self {
        self.ability = Some(ability.to_string());
        self
    }

    pub fn with_status(mut self, status: StatusCondition) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the current HP. If not set, HP will be max.
    pub fn with_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    pub fn fainted(mut self) -> Self {
        self.fainted = true;
        self
    }

    pub fn on_side(mut self, side: SideId) -> Self {
        self.side = side;
        self
    }

    pub fn build(self) -> PokemonInst {
        let set = PokemonSet {
            species: self.species,
            level: Some(self.level),
            moves: self.moves,
            ability: self.ability.unwrap_or_default(),
            ..PokemonSet::default()
        };
        let mut pokemon = PokemonInst::from_set(set, self.side, 0, &test_dex());
        pokemon.status = self.status;
        if let Some(hp) = self.current_hp {
            pokemon.set_hp(hp);
        }
        if self.fainted {
            pokemon.hp = 0;
            pokemon.fainted = true;
        }
        pokemon
    }
}

/// A level 100 set with the given moves.
pub fn test_set(species: &str, moves: &[&str]) -> PokemonSet {
    PokemonSet {
        species: species.to_string(),
        level: Some(100),
        moves: moves.iter().map(|m| m.to_string()).collect(),
        ..PokemonSet::default()
    }
}

fn into_side(id: SideId, name: &str, mut team: Vec<PokemonInst>) -> BattleSide {
    for (position, pokemon) in team.iter_mut().enumerate() {
        pokemon.side = id;
        pokemon.position = position;
    }
    let mut side = BattleSide::new(id, name.to_string(), team);
    side.switch_in(0);
    side
}

/// A started two-side state with both leads active and an empty log,
/// bypassing the controller.
pub fn create_test_state(p1_team: Vec<PokemonInst>, p2_team: Vec<PokemonInst>) -> BattleState {
    let mut state = BattleState::new(&BattleOptions::default().with_seed(TEST_SEED));
    state.sides = [
        Some(into_side(SideId::P1, "Player 1", p1_team)),
        Some(into_side(SideId::P2, "Player 2", p2_team)),
    ];
    state.turn = 1;
    state.game_state = GameState::AwaitingChoices;
    state
}

/// Captures everything a battle sends out.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub updates: Vec<Vec<EventRecord>>,
    pub side_updates: Vec<(SideId, String)>,
    pub ended: Option<String>,
}

impl RecordingSink {
    /// Omniscient text of every flushed record, in order.
    pub fn lines(&self) -> Vec<String> {
        self.updates
            .iter()
            .flatten()
            .map(|record| record.omniscient().to_string())
            .collect()
    }

    /// The most recent request sent to `side`.
    pub fn last_request(&self, side: SideId) -> Option<&str> {
        self.side_updates
            .iter()
            .rev()
            .find(|(to, _)| *to == side)
            .map(|(_, message)| message.as_str())
    }
}

impl OutputSink for RecordingSink {
    fn update(&mut self, records: &[EventRecord]) {
        self.updates.push(records.to_vec());
    }

    fn side_update(&mut self, side: SideId, message: &str) {
        self.side_updates.push((side, message.to_string()));
    }

    fn end(&mut self, summary: &str) {
        self.ended = Some(summary.to_string());
    }
}

/// A singles battle on the fixed test seed with both players set, so the
/// first requests have already gone out.
pub fn create_test_battle(p1_team: Vec<PokemonSet>, p2_team: Vec<PokemonSet>) -> Battle<RecordingSink> {
    create_seeded_battle(TEST_SEED, p1_team, p2_team)
}

pub fn create_seeded_battle(
    seed: [u16; 4],
    p1_team: Vec<PokemonSet>,
    p2_team: Vec<PokemonSet>,
) -> Battle<RecordingSink> {
    let mut battle = Battle::new(
        BattleOptions::default().with_seed(seed),
        Arc::new(test_dex()),
        RecordingSink::default(),
    );
    assert_ok(battle.set_player(SideId::P1, PlayerOptions::new("Alice", p1_team)));
    assert_ok(battle.set_player(SideId::P2, PlayerOptions::new("Bob", p2_team)));
    battle
}

/// Submits one choice per side.
pub fn play_turn<S: OutputSink>(battle: &mut Battle<S>, p1: &str, p2: &str) {
    assert_ok(battle.choose(SideId::P1, p1));
    assert_ok(battle.choose(SideId::P2, p2));
}

/// Helper function to assert that a Result is Ok and return the value.
/// Provides clear error messages in tests when functions unexpectedly fail.
pub fn assert_ok<T>(result: BattleResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Expected Ok but got error: {}", err),
    }
}
