//! Read-only game data lookup.
//!
//! The engine only ever talks to [`DataLookup`]; [`Dex`] is the bundled
//! implementation backed by `data/dex.ron`. Every lookup normalizes its key
//! with [`to_id`] and falls back to default data with `exists == false`.

use crate::errors::DexResult;
use schema::{BoostId, MoveCategory, MoveTarget, PokemonType, StatId, StatTable, StatusType, TypeRelation};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::ops::Deref;

/// Requested stat stage changes, iterated in `BoostId` order.
pub type BoostChanges = BTreeMap<BoostId, i8>;

/// Lowercase, then drop everything outside `[a-z0-9]`.
pub fn to_id(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// A lookup result: the normalized id, whether the entry exists, and the
/// data (defaults when it does not).
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    pub id: String,
    pub exists: bool,
    pub data: T,
}

impl<T> Deref for Entry<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T: Clone + Default> Entry<T> {
    fn lookup(table: &HashMap<String, T>, name: &str) -> Self {
        let id = to_id(name);
        match table.get(&id) {
            Some(data) => Entry {
                id,
                exists: true,
                data: data.clone(),
            },
            None => Entry {
                id,
                exists: false,
                data: T::default(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpeciesData {
    pub name: String,
    pub types: Vec<PokemonType>,
    pub base_stats: StatTable,
    /// Regular abilities, slot 0 first.
    pub abilities: Vec<String>,
    pub hidden_ability: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Accuracy {
    AlwaysHits,
    Percent(u8),
}

impl Default for Accuracy {
    fn default() -> Self {
        Accuracy::Percent(100)
    }
}

/// A chance-gated rider on a damaging move.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SecondaryEffect {
    /// Percentage; `None` means it always applies.
    pub chance: Option<u8>,
    pub status: Option<StatusType>,
    pub boosts: Option<BoostChanges>,
    pub volatile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MoveData {
    pub name: String,
    pub move_type: PokemonType,
    pub category: MoveCategory,
    pub base_power: u16,
    pub accuracy: Accuracy,
    pub pp: u8,
    pub priority: i8,
    pub target: MoveTarget,
    pub contact: bool,
    pub crit_ratio: u8,
    pub will_crit: bool,
    pub secondary: Option<SecondaryEffect>,
    pub status: Option<StatusType>,
    pub boosts: Option<BoostChanges>,
    /// Fraction of the user's max HP restored, as `(numerator, denominator)`.
    pub heal: Option<(u16, u16)>,
}

impl Default for MoveData {
    fn default() -> Self {
        Self {
            name: String::new(),
            move_type: PokemonType::Normal,
            category: MoveCategory::Physical,
            base_power: 0,
            accuracy: Accuracy::default(),
            pp: 0,
            priority: 0,
            target: MoveTarget::Normal,
            contact: false,
            crit_ratio: 1,
            will_crit: false,
            secondary: None,
            status: None,
            boosts: None,
            heal: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AbilityData {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ItemData {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NatureData {
    pub name: String,
    pub plus: Option<StatId>,
    pub minus: Option<StatId>,
}

/// Accumulated effectiveness of one attacking type against a defender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effectiveness {
    Immune,
    /// Sum of +1 per super-effective and -1 per resisted defending type.
    Modifier(i8),
}

impl Effectiveness {
    pub fn is_immune(self) -> bool {
        matches!(self, Effectiveness::Immune)
    }
}

/// The static data service the engine depends on.
pub trait DataLookup: Send + Sync {
    fn species(&self, name: &str) -> Entry<SpeciesData>;
    fn move_data(&self, name: &str) -> Entry<MoveData>;
    fn ability(&self, name: &str) -> Entry<AbilityData>;
    fn item(&self, name: &str) -> Entry<ItemData>;
    fn nature(&self, name: &str) -> Entry<NatureData>;

    fn type_relation(&self, attacking: PokemonType, defending: PokemonType) -> TypeRelation {
        PokemonType::relation(attacking, defending)
    }

    /// Sums per-type contributions; the first immune relation short-circuits.
    fn effectiveness(&self, attacking: PokemonType, defending: &[PokemonType]) -> Effectiveness {
        let mut total = 0i8;
        for &defender in defending {
            let relation = self.type_relation(attacking, defender);
            if relation == TypeRelation::Immune {
                return Effectiveness::Immune;
            }
            total += relation.modifier();
        }
        Effectiveness::Modifier(total)
    }

    fn is_immune(&self, attacking: PokemonType, defending: &[PokemonType]) -> bool {
        defending
            .iter()
            .any(|&defender| self.type_relation(attacking, defender) == TypeRelation::Immune)
    }
}

/// Bundled game data, keyed by id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Dex {
    species: HashMap<String, SpeciesData>,
    moves: HashMap<String, MoveData>,
    abilities: HashMap<String, AbilityData>,
    items: HashMap<String, ItemData>,
    natures: HashMap<String, NatureData>,
}

const BUNDLED_DATA: &str = include_str!("../data/dex.ron");

impl Dex {
    /// Loads the data shipped with the crate.
    pub fn bundled() -> DexResult<Self> {
        Self::from_ron(BUNDLED_DATA)
    }

    /// Parses a RON document. Keys are normalized so hand-written data may
    /// use display names.
    pub fn from_ron(text: &str) -> DexResult<Self> {
        let raw: Dex = ron::from_str(text)?;
        let dex = Dex {
            species: normalize_keys(raw.species),
            moves: normalize_keys(raw.moves),
            abilities: normalize_keys(raw.abilities),
            items: normalize_keys(raw.items),
            natures: normalize_keys(raw.natures),
        };
        tracing::debug!(
            species = dex.species.len(),
            moves = dex.moves.len(),
            abilities = dex.abilities.len(),
            "loaded dex data"
        );
        Ok(dex)
    }
}

fn normalize_keys<T>(table: HashMap<String, T>) -> HashMap<String, T> {
    table.into_iter().map(|(key, value)| (to_id(&key), value)).collect()
}

impl DataLookup for Dex {
    fn species(&self, name: &str) -> Entry<SpeciesData> {
        Entry::lookup(&self.species, name)
    }

    fn move_data(&self, name: &str) -> Entry<MoveData> {
        Entry::lookup(&self.moves, name)
    }

    fn ability(&self, name: &str) -> Entry<AbilityData> {
        Entry::lookup(&self.abilities, name)
    }

    fn item(&self, name: &str) -> Entry<ItemData> {
        Entry::lookup(&self.items, name)
    }

    fn nature(&self, name: &str) -> Entry<NatureData> {
        Entry::lookup(&self.natures, name)
    }
}
