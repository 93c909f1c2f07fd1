use crate::dex::{to_id, DataLookup, NatureData};
use crate::side::SideId;
use crate::teams::PokemonSet;
use schema::{BoostId, PokemonType, StatId, StatTable, StatusType};
use serde::Serialize;
use std::collections::BTreeMap;

pub const MAX_TOXIC_STAGE: u8 = 15;
pub const MAX_BOOST: i8 = 6;
pub const MIN_BOOST: i8 = -6;

/// A major status together with the counter it carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusCondition {
    Burn,
    Paralysis,
    Sleep { turns: u8 },
    Freeze,
    Poison,
    Toxic { stage: u8 },
}

impl StatusCondition {
    pub fn kind(&self) -> StatusType {
        match self {
            StatusCondition::Burn => StatusType::Burn,
            StatusCondition::Paralysis => StatusType::Paralysis,
            StatusCondition::Sleep { .. } => StatusType::Sleep,
            StatusCondition::Freeze => StatusType::Freeze,
            StatusCondition::Poison => StatusType::Poison,
            StatusCondition::Toxic { .. } => StatusType::Toxic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSlot {
    pub id: String,
    /// Display name, or the submitted text when the move is unknown.
    pub name: String,
    pub pp: u8,
    pub max_pp: u8,
    pub disabled: bool,
}

impl MoveSlot {
    /// Spend one PP, never going below zero.
    pub fn deduct_pp(&mut self) {
        self.pp = self.pp.saturating_sub(1);
    }
}

/// Stat stages, each kept within [-6, 6].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoostTable {
    pub atk: i8,
    pub def: i8,
    pub spa: i8,
    pub spd: i8,
    pub spe: i8,
    pub accuracy: i8,
    pub evasion: i8,
}

impl BoostTable {
    pub fn get(&self, boost: BoostId) -> i8 {
        match boost {
            BoostId::Atk => self.atk,
            BoostId::Def => self.def,
            BoostId::Spa => self.spa,
            BoostId::Spd => self.spd,
            BoostId::Spe => self.spe,
            BoostId::Accuracy => self.accuracy,
            BoostId::Evasion => self.evasion,
        }
    }

    pub fn set(&mut self, boost: BoostId, stage: i8) {
        let stage = stage.clamp(MIN_BOOST, MAX_BOOST);
        match boost {
            BoostId::Atk => self.atk = stage,
            BoostId::Def => self.def = stage,
            BoostId::Spa => self.spa = stage,
            BoostId::Spd => self.spd = stage,
            BoostId::Spe => self.spe = stage,
            BoostId::Accuracy => self.accuracy = stage,
            BoostId::Evasion => self.evasion = stage,
        }
    }
}

/// A transient flag on a combatant. Cleared on switch-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Volatile {
    /// Name of the combatant that caused it.
    pub source: Option<String>,
}

/// A combatant with its live battle state.
#[derive(Debug, Clone)]
pub struct PokemonInst {
    pub name: String,
    pub species: String,
    pub level: u8,
    pub gender: String,
    pub hp: u16,
    pub max_hp: u16,
    pub status: Option<StatusCondition>,
    pub types: Vec<PokemonType>,
    pub ability: String,
    pub item: String,
    pub move_slots: Vec<MoveSlot>,
    pub stats: StatTable,
    pub boosts: BoostTable,
    pub volatiles: BTreeMap<String, Volatile>,
    pub fainted: bool,
    pub is_active: bool,
    /// Owning side; a plain slot id rather than a reference.
    pub side: SideId,
    pub position: usize,
    pub set: PokemonSet,
}

impl PokemonInst {
    /// Builds a combatant from a submitted set. Unknown species fall back to
    /// a Normal type with base 100 stats; unknown moves keep their name and
    /// get no PP.
    pub fn from_set(set: PokemonSet, side: SideId, position: usize, dex: &dyn DataLookup) -> Self {
        let species = dex.species(&set.species);
        let level = set.level.unwrap_or(100).clamp(1, 100);

        let (types, base_stats) = if species.exists {
            (species.types.clone(), species.base_stats)
        } else {
            (vec![PokemonType::Normal], StatTable::uniform(100))
        };

        let nature = if set.nature.is_empty() {
            None
        } else {
            Some(dex.nature(&set.nature)).filter(|n| n.exists).map(|n| n.data)
        };
        let stats = calculate_stats(&base_stats, set.evs.as_ref(), set.ivs.as_ref(), level, nature.as_ref());

        let move_slots = set
            .moves
            .iter()
            .map(|move_name| {
                let data = dex.move_data(move_name);
                if data.exists {
                    MoveSlot {
                        id: data.id.clone(),
                        name: data.name.clone(),
                        pp: data.pp,
                        max_pp: data.pp,
                        disabled: false,
                    }
                } else {
                    MoveSlot {
                        id: to_id(move_name),
                        name: move_name.clone(),
                        pp: 0,
                        max_pp: 0,
                        disabled: false,
                    }
                }
            })
            .collect();

        let ability = if !set.ability.is_empty() {
            set.ability.clone()
        } else {
            species.abilities.first().cloned().unwrap_or_default()
        };
        let name = if set.name.is_empty() {
            if species.exists {
                species.name.clone()
            } else {
                set.species.clone()
            }
        } else {
            set.name.clone()
        };
        let species_name = if species.exists {
            species.name.clone()
        } else {
            set.species.clone()
        };

        Self {
            name,
            species: species_name,
            level,
            gender: set.gender.clone(),
            hp: stats.hp,
            max_hp: stats.hp,
            status: None,
            types,
            ability,
            item: set.item.clone(),
            move_slots,
            stats,
            boosts: BoostTable::default(),
            volatiles: BTreeMap::new(),
            fainted: false,
            is_active: false,
            side,
            position,
            set,
        }
    }

    pub fn status_type(&self) -> Option<StatusType> {
        self.status.map(|s| s.kind())
    }

    pub fn has_type(&self, pokemon_type: PokemonType) -> bool {
        self.types.contains(&pokemon_type)
    }

    pub fn has_volatile(&self, id: &str) -> bool {
        self.volatiles.contains_key(id)
    }

    /// `"Species, L50"` plus the gender when set.
    pub fn details(&self) -> String {
        if self.gender.is_empty() {
            format!("{}, L{}", self.species, self.level)
        } else {
            format!("{}, L{}, {}", self.species, self.level, self.gender)
        }
    }

    /// Exact condition: `hp/max` plus the status id, or `0 fnt`.
    pub fn condition(&self) -> String {
        if self.fainted {
            return "0 fnt".to_string();
        }
        match self.status_type() {
            Some(status) => format!("{}/{} {}", self.hp, self.max_hp, status),
            None => format!("{}/{}", self.hp, self.max_hp),
        }
    }

    /// Resets everything that does not survive leaving the field.
    pub fn switch_out(&mut self) {
        self.is_active = false;
        self.boosts = BoostTable::default();
        self.volatiles.clear();
    }

    pub fn set_hp(&mut self, hp: u16) {
        self.hp = hp.min(self.max_hp);
    }
}

/// Computes the six stats for a level from base stats, EVs, IVs and nature.
/// IVs default to 31 and EVs to 0.
pub fn calculate_stats(
    base: &StatTable,
    evs: Option<&StatTable>,
    ivs: Option<&StatTable>,
    level: u8,
    nature: Option<&NatureData>,
) -> StatTable {
    let evs = evs.copied().unwrap_or_default();
    let ivs = ivs.copied().unwrap_or(StatTable::uniform(31));
    let level = level as u32;
    let mut stats = StatTable::default();

    for stat in [StatId::Hp, StatId::Atk, StatId::Def, StatId::Spa, StatId::Spd, StatId::Spe] {
        let base_value = base.get(stat) as u32;
        let core = (2 * base_value + ivs.get(stat) as u32 + evs.get(stat) as u32 / 4) * level / 100;

        let value = if stat == StatId::Hp {
            if base_value == 1 {
                1
            } else {
                core + level + 10
            }
        } else {
            let mut value = core + 5;
            if let Some(nature) = nature {
                if nature.plus == Some(stat) {
                    value = (value as f64 * 1.1).floor() as u32;
                }
                if nature.minus == Some(stat) {
                    value = (value as f64 * 0.9).floor() as u32;
                }
            }
            value
        };
        stats.set(stat, value.min(u16::MAX as u32) as u16);
    }

    stats
}
