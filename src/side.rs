use crate::battle::requests::SideRequest;
use crate::pokemon::PokemonInst;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Player slot identifier, `p1` through `p4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideId {
    P1,
    P2,
    P3,
    P4,
}

impl SideId {
    pub const ALL: [SideId; 4] = [SideId::P1, SideId::P2, SideId::P3, SideId::P4];

    /// Zero-based slot index.
    pub fn index(self) -> usize {
        match self {
            SideId::P1 => 0,
            SideId::P2 => 1,
            SideId::P3 => 2,
            SideId::P4 => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<SideId> {
        SideId::ALL.get(index).copied()
    }

    /// The opposing slot in a two-sided battle.
    pub fn foe(self) -> SideId {
        match self {
            SideId::P1 => SideId::P2,
            SideId::P2 => SideId::P1,
            SideId::P3 => SideId::P4,
            SideId::P4 => SideId::P3,
        }
    }
}

impl fmt::Display for SideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.index() + 1)
    }
}

impl FromStr for SideId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "p1" => Ok(SideId::P1),
            "p2" => Ok(SideId::P2),
            "p3" => Ok(SideId::P3),
            "p4" => Ok(SideId::P4),
            other => Err(other.to_string()),
        }
    }
}

/// One parsed choice token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceAction {
    /// Zero-based move slot.
    Move(usize),
    /// Zero-based roster position.
    Switch(usize),
    Default,
}

/// A side's pending submission for the current turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Choice {
    pub actions: Vec<ChoiceAction>,
    pub done: bool,
}

impl Choice {
    pub fn clear(&mut self) {
        self.actions.clear();
        self.done = false;
    }
}

/// One competing roster. Owns its combatants; "active" is an index into
/// `pokemon`, never a second owner.
#[derive(Debug, Clone)]
pub struct BattleSide {
    pub id: SideId,
    pub name: String,
    pub pokemon: Vec<PokemonInst>,
    pub active: Option<usize>,
    pub choice: Choice,
    pub request: Option<SideRequest>,
    pub fainted_this_turn: bool,
    pub fainted_last_turn: bool,
}

impl BattleSide {
    pub fn new(id: SideId, name: String, pokemon: Vec<PokemonInst>) -> Self {
        Self {
            id,
            name,
            pokemon,
            active: None,
            choice: Choice::default(),
            request: None,
            fainted_this_turn: false,
            fainted_last_turn: false,
        }
    }

    pub fn active_pokemon(&self) -> Option<&PokemonInst> {
        self.active.and_then(|index| self.pokemon.get(index))
    }

    pub fn active_pokemon_mut(&mut self) -> Option<&mut PokemonInst> {
        match self.active {
            Some(index) => self.pokemon.get_mut(index),
            None => None,
        }
    }

    /// True once every roster member has fainted.
    pub fn all_fainted(&self) -> bool {
        self.pokemon.iter().all(|p| p.fainted)
    }

    /// True when the active slot is empty or holds a fainted combatant.
    pub fn needs_switch(&self) -> bool {
        self.active_pokemon().map_or(true, |p| p.fainted)
    }

    /// Whether the choice must be a switch: what the last request said, or
    /// the roster state before any request was sent.
    pub fn must_switch(&self) -> bool {
        self.request
            .as_ref()
            .map_or_else(|| self.needs_switch(), SideRequest::forces_switch)
    }

    /// Moves `position` into the active slot. Returns the position that was
    /// active before, if any. Refuses fainted or missing roster members.
    pub fn switch_in(&mut self, position: usize) -> Option<Option<usize>> {
        if self.pokemon.get(position).map_or(true, |p| p.fainted) {
            return None;
        }
        let previous = self.active;
        if let Some(current) = self.active_pokemon_mut() {
            current.switch_out();
        }
        self.active = Some(position);
        if let Some(incoming) = self.pokemon.get_mut(position) {
            incoming.is_active = true;
        }
        Some(previous)
    }

    /// Moves the faint flag forward at the end of a turn.
    pub fn roll_faint_flags(&mut self) {
        self.fainted_last_turn = self.fainted_this_turn;
        self.fainted_this_turn = false;
    }
}
