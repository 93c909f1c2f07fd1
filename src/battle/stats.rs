use crate::pokemon::PokemonInst;
use schema::{MoveCategory, StatusType};

/// Scale a stat by a boost stage: `stat * (2 + s) / 2` when raised,
/// `stat * 2 / (2 - s)` when lowered, floored.
pub fn apply_stat_stage(stat: u32, stage: i8) -> u32 {
    scale_by_stage(stat, stage, 2)
}

/// Same piecewise scale as stats but over a base of 3, used for the
/// accuracy minus evasion difference. The difference is not clamped.
pub fn apply_accuracy_stage(accuracy: u32, stage: i32) -> u32 {
    scale_by_stage(accuracy, stage, 3)
}

fn scale_by_stage(value: u32, stage: impl Into<i32>, base: i32) -> u32 {
    let stage = stage.into();
    match stage {
        s if s > 0 => value * (base + s) as u32 / base as u32,
        s if s < 0 => value * base as u32 / (base - s) as u32,
        _ => value,
    }
}

/// Speed used for turn ordering: boosted, then halved by paralysis.
pub fn effective_speed(pokemon: &PokemonInst) -> u32 {
    let speed = apply_stat_stage(pokemon.stats.spe as u32, pokemon.boosts.spe);
    if pokemon.status_type() == Some(StatusType::Paralysis) {
        speed / 2
    } else {
        speed
    }
}

/// Attacking stat for a move category, after boosts and burn.
pub fn effective_attack(pokemon: &PokemonInst, category: MoveCategory) -> u32 {
    let (base, stage) = match category {
        MoveCategory::Physical => (pokemon.stats.atk, pokemon.boosts.atk),
        _ => (pokemon.stats.spa, pokemon.boosts.spa),
    };
    let attack = apply_stat_stage(base as u32, stage);

    if category == MoveCategory::Physical && pokemon.status_type() == Some(StatusType::Burn) {
        attack / 2
    } else {
        attack
    }
}

/// Defending stat for a move category, after boosts.
pub fn effective_defense(pokemon: &PokemonInst, category: MoveCategory) -> u32 {
    let (base, stage) = match category {
        MoveCategory::Physical => (pokemon.stats.def, pokemon.boosts.def),
        _ => (pokemon.stats.spd, pokemon.boosts.spd),
    };
    apply_stat_stage(base as u32, stage)
}
