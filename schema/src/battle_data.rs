use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Major, mutually exclusive status conditions. The string form is the
/// protocol id (`brn`, `par`, ...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
pub enum StatusType {
    #[serde(rename = "brn")]
    #[strum(serialize = "brn")]
    Burn,
    #[serde(rename = "par")]
    #[strum(serialize = "par")]
    Paralysis,
    #[serde(rename = "slp")]
    #[strum(serialize = "slp")]
    Sleep,
    #[serde(rename = "frz")]
    #[strum(serialize = "frz")]
    Freeze,
    #[serde(rename = "psn")]
    #[strum(serialize = "psn")]
    Poison,
    #[serde(rename = "tox")]
    #[strum(serialize = "tox")]
    Toxic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString)]
pub enum MoveCategory {
    Physical,
    Special,
    #[default]
    Status,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum MoveTarget {
    #[default]
    Normal,
    #[serde(rename = "self")]
    #[strum(serialize = "self")]
    User,
    AdjacentFoe,
    AllAdjacentFoes,
    Any,
}

/// Boostable stats, in the order boost records are emitted.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BoostId {
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
    Accuracy,
    Evasion,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatId {
    Hp,
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
}

/// A full six-stat table, used for base stats, EVs, IVs and computed stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatTable {
    pub hp: u16,
    pub atk: u16,
    pub def: u16,
    pub spa: u16,
    pub spd: u16,
    pub spe: u16,
}

impl StatTable {
    pub fn uniform(value: u16) -> Self {
        Self {
            hp: value,
            atk: value,
            def: value,
            spa: value,
            spd: value,
            spe: value,
        }
    }

    pub fn get(&self, stat: StatId) -> u16 {
        match stat {
            StatId::Hp => self.hp,
            StatId::Atk => self.atk,
            StatId::Def => self.def,
            StatId::Spa => self.spa,
            StatId::Spd => self.spd,
            StatId::Spe => self.spe,
        }
    }

    pub fn set(&mut self, stat: StatId, value: u16) {
        match stat {
            StatId::Hp => self.hp = value,
            StatId::Atk => self.atk = value,
            StatId::Def => self.def = value,
            StatId::Spa => self.spa = value,
            StatId::Spd => self.spd = value,
            StatId::Spe => self.spe = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_ids() {
        assert_eq!(StatusType::Burn.to_string(), "brn");
        assert_eq!(StatusType::from_str("tox"), Ok(StatusType::Toxic));
        let id: &'static str = StatusType::Paralysis.into();
        assert_eq!(id, "par");
    }

    #[test]
    fn test_move_target_ids() {
        let s: &'static str = MoveTarget::User.into();
        assert_eq!(s, "self");
        assert_eq!(MoveTarget::AdjacentFoe.to_string(), "adjacentFoe");
    }
}
