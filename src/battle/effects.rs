//! Effect pipeline: the state changes a move, ability or residual can make
//! to a combatant. Every function reports whether anything happened and
//! writes its records to the log it is handed; refusals are `false`, never
//! errors.

use crate::battle::log::{BattleEvent, EventLog, HpSnapshot, PokemonIdent};
use crate::dex::{to_id, BoostChanges, DataLookup};
use crate::pokemon::{PokemonInst, StatusCondition, Volatile, MAX_BOOST, MAX_TOXIC_STAGE, MIN_BOOST};
use crate::prng::Prng;
use schema::{BoostId, PokemonType, StatusType};
use std::collections::HashMap;

/// Applies each requested stage change, clamped to [-6, 6]. A stat already
/// at its bound is skipped silently; records carry the clamped amount.
pub fn apply_boosts(pokemon: &mut PokemonInst, boosts: &BoostChanges, log: &mut EventLog) -> bool {
    if pokemon.fainted {
        return false;
    }

    let mut changed = false;
    for (&stat, &delta) in boosts {
        if delta == 0 {
            continue;
        }
        let current = pokemon.boosts.get(stat);
        let next = current.saturating_add(delta).clamp(MIN_BOOST, MAX_BOOST);
        if next == current {
            continue;
        }
        pokemon.boosts.set(stat, next);
        changed = true;

        let amount = (next - current).abs();
        let ident = PokemonIdent::from(&*pokemon);
        log.push(if next > current {
            BattleEvent::Boost { pokemon: ident, stat, amount }
        } else {
            BattleEvent::Unboost { pokemon: ident, stat, amount }
        });
    }
    changed
}

/// Whether the combatant's typing rules out a status outright.
pub fn is_status_immune(types: &[PokemonType], status: StatusType) -> bool {
    let has = |t: PokemonType| types.contains(&t);
    match status {
        StatusType::Burn => has(PokemonType::Fire),
        StatusType::Poison | StatusType::Toxic => has(PokemonType::Poison) || has(PokemonType::Steel),
        StatusType::Paralysis => has(PokemonType::Electric),
        StatusType::Freeze => has(PokemonType::Ice),
        StatusType::Sleep => false,
    }
}

/// Inflicts a major status. Refused on a fainted target, one that already
/// has a status, or one whose typing is immune.
pub fn try_set_status(pokemon: &mut PokemonInst, status: StatusType, prng: &mut Prng, log: &mut EventLog) -> bool {
    if pokemon.fainted || pokemon.status.is_some() || is_status_immune(&pokemon.types, status) {
        return false;
    }

    pokemon.status = Some(match status {
        StatusType::Burn => StatusCondition::Burn,
        StatusType::Paralysis => StatusCondition::Paralysis,
        StatusType::Sleep => StatusCondition::Sleep {
            turns: prng.random_range(2, 5) as u8,
        },
        StatusType::Freeze => StatusCondition::Freeze,
        StatusType::Poison => StatusCondition::Poison,
        StatusType::Toxic => StatusCondition::Toxic { stage: 1 },
    });

    log.push(BattleEvent::Status {
        pokemon: PokemonIdent::from(&*pokemon),
        status,
    });
    true
}

/// Removes the current status, if any, with a `-curestatus` record.
pub fn cure_status(pokemon: &mut PokemonInst, log: &mut EventLog) -> bool {
    let Some(status) = pokemon.status.take() else {
        return false;
    };
    log.push(BattleEvent::CureStatus {
        pokemon: PokemonIdent::from(&*pokemon),
        status: status.kind(),
    });
    true
}

pub fn add_volatile(pokemon: &mut PokemonInst, id: &str, source: Option<&str>, log: &mut EventLog) -> bool {
    if pokemon.fainted || pokemon.has_volatile(id) {
        return false;
    }
    pokemon.volatiles.insert(
        id.to_string(),
        Volatile {
            source: source.map(str::to_string),
        },
    );
    log.push(BattleEvent::VolatileStart {
        pokemon: PokemonIdent::from(&*pokemon),
        volatile: id.to_string(),
    });
    true
}

/// Subtracts HP (clamped at zero) and faints the combatant when it runs
/// out. Returns true when this call caused the faint; the caller owns the
/// side-level bookkeeping.
pub fn apply_damage(pokemon: &mut PokemonInst, amount: u32, from: Option<&str>, log: &mut EventLog) -> bool {
    if pokemon.fainted {
        return false;
    }
    let amount = amount.min(pokemon.hp as u32) as u16;
    pokemon.hp -= amount;

    log.push(BattleEvent::Damage {
        pokemon: PokemonIdent::from(&*pokemon),
        hp: HpSnapshot::from(&*pokemon),
        from: from.map(str::to_string),
    });

    if pokemon.hp == 0 {
        faint(pokemon, log);
        return true;
    }
    false
}

pub fn heal(pokemon: &mut PokemonInst, amount: u32, log: &mut EventLog) -> bool {
    if pokemon.fainted {
        return false;
    }
    let before = pokemon.hp;
    let healed = (before as u32 + amount).min(pokemon.max_hp as u32) as u16;
    if healed <= before {
        return false;
    }
    pokemon.hp = healed;
    log.push(BattleEvent::Heal {
        pokemon: PokemonIdent::from(&*pokemon),
        hp: HpSnapshot::from(&*pokemon),
    });
    true
}

pub fn faint(pokemon: &mut PokemonInst, log: &mut EventLog) {
    if pokemon.fainted {
        return;
    }
    pokemon.fainted = true;
    pokemon.hp = 0;
    pokemon.is_active = false;
    log.push(BattleEvent::Faint {
        pokemon: PokemonIdent::from(&*pokemon),
    });
}

/// End-of-turn status damage. Toxic hits for `stage/16` and then advances
/// its stage. Returns true if the combatant fainted.
pub fn run_residual(pokemon: &mut PokemonInst, log: &mut EventLog) -> bool {
    if pokemon.fainted {
        return false;
    }
    let max_hp = pokemon.max_hp as u32;
    let (damage, from) = match pokemon.status {
        Some(StatusCondition::Burn) => ((max_hp / 16).max(1), "[from] brn"),
        Some(StatusCondition::Poison) => ((max_hp / 8).max(1), "[from] psn"),
        Some(StatusCondition::Toxic { stage }) => {
            pokemon.status = Some(StatusCondition::Toxic {
                stage: (stage + 1).min(MAX_TOXIC_STAGE),
            });
            ((max_hp * stage as u32 / 16).max(1), "[from] psn")
        }
        _ => return false,
    };
    apply_damage(pokemon, damage, Some(from), log)
}

/// Closed set of ability behaviors the engine knows how to run.
#[derive(Debug, Clone, PartialEq)]
pub enum AbilityEffect {
    /// Changes the opposing active combatant's stages on entry.
    BoostFoeOnSwitchIn { boosts: BoostChanges },
    /// Percentage chance to inflict a status on an attacker that made contact.
    StatusOnContact { status: StatusType, chance: u32 },
}

/// Ability id to effect table, replacing per-id string comparisons.
#[derive(Debug, Clone, Default)]
pub struct EffectRegistry {
    abilities: HashMap<String, AbilityEffect>,
}

impl EffectRegistry {
    /// The abilities this engine ships with.
    pub fn standard() -> Self {
        let mut registry = Self::default();
        registry.register(
            "intimidate",
            AbilityEffect::BoostFoeOnSwitchIn {
                boosts: BoostChanges::from([(BoostId::Atk, -1)]),
            },
        );
        for (id, status) in [
            ("static", StatusType::Paralysis),
            ("poisonpoint", StatusType::Poison),
            ("flamebody", StatusType::Burn),
        ] {
            registry.register(id, AbilityEffect::StatusOnContact { status, chance: 30 });
        }
        registry
    }

    pub fn register(&mut self, id: &str, effect: AbilityEffect) {
        self.abilities.insert(to_id(id), effect);
    }

    /// Looks up an ability by name. Abilities the data service does not
    /// know have no effect even if registered.
    pub fn ability_effect(&self, ability: &str, dex: &dyn DataLookup) -> Option<&AbilityEffect> {
        let entry = dex.ability(ability);
        if !entry.exists {
            return None;
        }
        self.abilities.get(&entry.id)
    }
}

/// Runs the holder's switch-in ability against the opposing active
/// combatant, if both are present and standing.
pub fn run_switch_in_ability(
    holder: &PokemonInst,
    foe: Option<&mut PokemonInst>,
    registry: &EffectRegistry,
    dex: &dyn DataLookup,
    log: &mut EventLog,
) -> bool {
    let Some(AbilityEffect::BoostFoeOnSwitchIn { boosts }) = registry.ability_effect(&holder.ability, dex) else {
        return false;
    };
    let Some(foe) = foe.filter(|f| !f.fainted) else {
        return false;
    };

    log.push(BattleEvent::Ability {
        pokemon: PokemonIdent::from(holder),
        ability: dex.ability(&holder.ability).name.clone(),
    });
    apply_boosts(foe, boosts, log);
    true
}

/// Runs the defender's on-contact ability against the attacker. Gated on
/// the attacker having no status and on the ability's chance roll.
pub fn run_contact_ability(
    attacker: &mut PokemonInst,
    defender: &PokemonInst,
    registry: &EffectRegistry,
    dex: &dyn DataLookup,
    prng: &mut Prng,
    log: &mut EventLog,
) -> bool {
    let Some(&AbilityEffect::StatusOnContact { status, chance }) = registry.ability_effect(&defender.ability, dex)
    else {
        return false;
    };
    if attacker.status.is_some() || !prng.random_chance(chance, 100) {
        return false;
    }
    try_set_status(attacker, status, prng, log)
}
