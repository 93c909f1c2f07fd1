use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum PokemonType {
    #[default]
    Normal,
    Fighting,
    Flying,
    Poison,
    Ground,
    Rock,
    Bug,
    Ghost,
    Steel,
    Fire,
    Water,
    Grass,
    Electric,
    Psychic,
    Ice,
    Dragon,
    Dark,
    Fairy,
}

/// How an attacking type interacts with a single defending type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRelation {
    Neutral,
    SuperEffective,
    Resisted,
    Immune,
}

impl TypeRelation {
    /// Signed contribution of this relation to an accumulated effectiveness score.
    /// `Immune` has no finite contribution and must be handled by the caller.
    pub fn modifier(self) -> i8 {
        match self {
            TypeRelation::SuperEffective => 1,
            TypeRelation::Resisted => -1,
            TypeRelation::Neutral | TypeRelation::Immune => 0,
        }
    }
}

impl PokemonType {
    /// Look up the type chart entry for `attacking` hitting `defending`.
    pub fn relation(attacking: PokemonType, defending: PokemonType) -> TypeRelation {
        use PokemonType::*;
        use TypeRelation::*;

        match (attacking, defending) {
            // Normal
            (Normal, Ghost) => Immune,
            (Normal, Rock) | (Normal, Steel) => Resisted,
            (Normal, _) => Neutral,

            // Fighting
            (Fighting, Ghost) => Immune,
            (Fighting, Normal) | (Fighting, Ice) | (Fighting, Rock) | (Fighting, Dark) | (Fighting, Steel) => {
                SuperEffective
            }
            (Fighting, Poison) | (Fighting, Flying) | (Fighting, Psychic) | (Fighting, Bug) | (Fighting, Fairy) => {
                Resisted
            }
            (Fighting, _) => Neutral,

            // Flying
            (Flying, Grass) | (Flying, Fighting) | (Flying, Bug) => SuperEffective,
            (Flying, Electric) | (Flying, Rock) | (Flying, Steel) => Resisted,
            (Flying, _) => Neutral,

            // Poison
            (Poison, Steel) => Immune,
            (Poison, Grass) | (Poison, Fairy) => SuperEffective,
            (Poison, Poison) | (Poison, Ground) | (Poison, Rock) | (Poison, Ghost) => Resisted,
            (Poison, _) => Neutral,

            // Ground
            (Ground, Flying) => Immune,
            (Ground, Fire) | (Ground, Electric) | (Ground, Poison) | (Ground, Rock) | (Ground, Steel) => {
                SuperEffective
            }
            (Ground, Grass) | (Ground, Bug) => Resisted,
            (Ground, _) => Neutral,

            // Rock
            (Rock, Fire) | (Rock, Ice) | (Rock, Flying) | (Rock, Bug) => SuperEffective,
            (Rock, Fighting) | (Rock, Ground) | (Rock, Steel) => Resisted,
            (Rock, _) => Neutral,

            // Bug
            (Bug, Grass) | (Bug, Psychic) | (Bug, Dark) => SuperEffective,
            (Bug, Fire)
            | (Bug, Fighting)
            | (Bug, Poison)
            | (Bug, Flying)
            | (Bug, Ghost)
            | (Bug, Steel)
            | (Bug, Fairy) => Resisted,
            (Bug, _) => Neutral,

            // Ghost
            (Ghost, Normal) => Immune,
            (Ghost, Psychic) | (Ghost, Ghost) => SuperEffective,
            (Ghost, Dark) => Resisted,
            (Ghost, _) => Neutral,

            // Steel
            (Steel, Ice) | (Steel, Rock) | (Steel, Fairy) => SuperEffective,
            (Steel, Fire) | (Steel, Water) | (Steel, Electric) | (Steel, Steel) => Resisted,
            (Steel, _) => Neutral,

            // Fire
            (Fire, Grass) | (Fire, Ice) | (Fire, Bug) | (Fire, Steel) => SuperEffective,
            (Fire, Fire) | (Fire, Water) | (Fire, Rock) | (Fire, Dragon) => Resisted,
            (Fire, _) => Neutral,

            // Water
            (Water, Fire) | (Water, Ground) | (Water, Rock) => SuperEffective,
            (Water, Water) | (Water, Grass) | (Water, Dragon) => Resisted,
            (Water, _) => Neutral,

            // Grass
            (Grass, Water) | (Grass, Ground) | (Grass, Rock) => SuperEffective,
            (Grass, Fire)
            | (Grass, Grass)
            | (Grass, Poison)
            | (Grass, Flying)
            | (Grass, Bug)
            | (Grass, Dragon)
            | (Grass, Steel) => Resisted,
            (Grass, _) => Neutral,

            // Electric
            (Electric, Ground) => Immune,
            (Electric, Water) | (Electric, Flying) => SuperEffective,
            (Electric, Electric) | (Electric, Grass) | (Electric, Dragon) => Resisted,
            (Electric, _) => Neutral,

            // Psychic
            (Psychic, Dark) => Immune,
            (Psychic, Fighting) | (Psychic, Poison) => SuperEffective,
            (Psychic, Psychic) | (Psychic, Steel) => Resisted,
            (Psychic, _) => Neutral,

            // Ice
            (Ice, Grass) | (Ice, Ground) | (Ice, Flying) | (Ice, Dragon) => SuperEffective,
            (Ice, Fire) | (Ice, Water) | (Ice, Ice) | (Ice, Steel) => Resisted,
            (Ice, _) => Neutral,

            // Dragon
            (Dragon, Fairy) => Immune,
            (Dragon, Dragon) => SuperEffective,
            (Dragon, Steel) => Resisted,
            (Dragon, _) => Neutral,

            // Dark
            (Dark, Psychic) | (Dark, Ghost) => SuperEffective,
            (Dark, Fighting) | (Dark, Dark) | (Dark, Fairy) => Resisted,
            (Dark, _) => Neutral,

            // Fairy
            (Fairy, Fighting) | (Fairy, Dragon) | (Fairy, Dark) => SuperEffective,
            (Fairy, Fire) | (Fairy, Poison) | (Fairy, Steel) => Resisted,
            (Fairy, _) => Neutral,
        }
    }
}
