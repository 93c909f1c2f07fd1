use crate::battle::stats::{apply_accuracy_stage, effective_attack, effective_defense};
use crate::dex::{Accuracy, DataLookup, Effectiveness, MoveData};
use crate::pokemon::PokemonInst;
use crate::prng::Prng;

/// Crit chance denominators indexed by crit ratio (clamped to 4).
const CRIT_DENOMINATORS: [u32; 5] = [0, 24, 8, 2, 1];

/// Computes the damage a move would deal before critical hits.
///
/// Consumes exactly one random roll (the 85-100% spread) and never returns
/// less than 1. Immunity is expected to be checked before calling this.
pub fn calculate_damage(
    attacker: &PokemonInst,
    defender: &PokemonInst,
    move_data: &MoveData,
    dex: &dyn DataLookup,
    prng: &mut Prng,
) -> u32 {
    let level = attacker.level as u64;
    let base_power = move_data.base_power as u64;
    let attack = effective_attack(attacker, move_data.category) as u64;
    let defense = (effective_defense(defender, move_data.category) as u64).max(1);

    let mut damage = (2 * level / 5 + 2) * base_power * attack / defense / 50 + 2;

    // Same-type bonus
    if attacker.has_type(move_data.move_type) {
        damage = damage * 3 / 2;
    }

    match dex.effectiveness(move_data.move_type, &defender.types) {
        Effectiveness::Modifier(e) if e > 0 => damage <<= e as u32,
        Effectiveness::Modifier(e) if e < 0 => damage >>= (-e) as u32,
        _ => {}
    }

    let roll = prng.random_range(85, 101) as u64;
    damage = damage * roll / 100;

    damage.clamp(1, u32::MAX as u64) as u32
}

/// Applies the critical multiplier to rolled damage.
pub fn apply_critical(damage: u32, crit: bool) -> u32 {
    let damage = if crit { damage * 3 / 2 } else { damage };
    damage.max(1)
}

/// Rolls for a critical hit. Moves that always crit skip the roll.
pub fn roll_critical(move_data: &MoveData, prng: &mut Prng) -> bool {
    if move_data.will_crit {
        return true;
    }
    let ratio = move_data.crit_ratio.clamp(1, 4) as usize;
    prng.random_chance(1, CRIT_DENOMINATORS[ratio])
}

/// Accuracy check. Always-hit moves consume no randomness.
pub fn accuracy_check(move_data: &MoveData, attacker: &PokemonInst, defender: &PokemonInst, prng: &mut Prng) -> bool {
    let Accuracy::Percent(accuracy) = move_data.accuracy else {
        return true;
    };
    let stage = attacker.boosts.accuracy as i32 - defender.boosts.evasion as i32;
    let accuracy = apply_accuracy_stage(accuracy as u32, stage);
    prng.random_chance(accuracy, 100)
}
