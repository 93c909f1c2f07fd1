//! Turn resolution: turn submitted choices into ordered actions, run them,
//! then run the end-of-turn phase.

use crate::battle::calculators::{accuracy_check, apply_critical, calculate_damage, roll_critical};
use crate::battle::effects::{
    add_volatile, apply_boosts, apply_damage, cure_status, heal, run_contact_ability, run_residual,
    run_switch_in_ability, try_set_status, EffectRegistry,
};
use crate::battle::log::{BattleEvent, EventLog, HpSnapshot, PokemonIdent};
use crate::battle::state::{BattleState, GameState};
use crate::battle::stats::effective_speed;
use crate::dex::{DataLookup, Effectiveness, MoveData};
use crate::pokemon::{PokemonInst, StatusCondition};
use crate::prng::Prng;
use crate::side::{BattleSide, ChoiceAction, SideId};
use schema::{MoveCategory, MoveTarget};
use std::cmp::Ordering;

/// Switches outrank every move.
pub const SWITCH_PRIORITY: i8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleAction {
    Move {
        side: SideId,
        move_index: usize,
        priority: i8,
        speed: u32,
    },
    Switch {
        side: SideId,
        target: usize,
        priority: i8,
        speed: u32,
    },
}

impl BattleAction {
    pub fn side(&self) -> SideId {
        match self {
            BattleAction::Move { side, .. } | BattleAction::Switch { side, .. } => *side,
        }
    }

    pub fn priority(&self) -> i8 {
        match self {
            BattleAction::Move { priority, .. } | BattleAction::Switch { priority, .. } => *priority,
        }
    }

    pub fn speed(&self) -> u32 {
        match self {
            BattleAction::Move { speed, .. } | BattleAction::Switch { speed, .. } => *speed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Continue,
    Won(SideId),
}

/// One action per side with an active combatant, from the first submitted
/// token. A missing or default token uses move slot 0.
pub fn collect_actions(state: &BattleState, dex: &dyn DataLookup) -> Vec<BattleAction> {
    let mut actions = Vec::new();
    for side in state.sides() {
        let Some(active) = side.active_pokemon() else {
            continue;
        };
        let speed = effective_speed(active);
        let token = side.choice.actions.first().copied().unwrap_or(ChoiceAction::Default);

        actions.push(match token {
            ChoiceAction::Switch(target) => BattleAction::Switch {
                side: side.id,
                target,
                priority: SWITCH_PRIORITY,
                speed,
            },
            ChoiceAction::Move(move_index) => BattleAction::Move {
                side: side.id,
                move_index,
                priority: move_priority(active, move_index, dex),
                speed,
            },
            ChoiceAction::Default => BattleAction::Move {
                side: side.id,
                move_index: 0,
                priority: move_priority(active, 0, dex),
                speed,
            },
        });
    }
    actions
}

fn move_priority(pokemon: &PokemonInst, move_index: usize, dex: &dyn DataLookup) -> i8 {
    pokemon
        .move_slots
        .get(move_index)
        .map(|slot| dex.move_data(&slot.id))
        .filter(|data| data.exists)
        .map_or(0, |data| data.priority)
}

/// Higher priority first, then higher speed; exact ties are a coin flip.
fn compare_actions(a: &BattleAction, b: &BattleAction, prng: &mut Prng) -> Ordering {
    b.priority()
        .cmp(&a.priority())
        .then_with(|| b.speed().cmp(&a.speed()))
        .then_with(|| {
            if prng.random() < 0.5 {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        })
}

/// Stable insertion sort. Each comparison that reaches a tie draws one
/// number, so the draw count depends on the input order.
pub fn order_actions(actions: &mut [BattleAction], prng: &mut Prng) {
    for i in 1..actions.len() {
        let mut j = i;
        while j > 0 && compare_actions(&actions[j], &actions[j - 1], prng) == Ordering::Less {
            actions.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Splits the side array into (acting side, opposing side).
fn sides_for(sides: &mut [Option<BattleSide>; 2], id: SideId) -> (Option<&mut BattleSide>, Option<&mut BattleSide>) {
    let [first, second] = sides;
    if id.index() == 0 {
        (first.as_mut(), second.as_mut())
    } else {
        (second.as_mut(), first.as_mut())
    }
}

/// Resolves the current turn. The caller ends the battle on `Won`.
pub fn run_turn(state: &mut BattleState, dex: &dyn DataLookup, registry: &EffectRegistry) -> TurnOutcome {
    if state.is_ended() {
        return TurnOutcome::Continue;
    }
    state.game_state = GameState::Resolving;

    let mut actions = collect_actions(state, dex);
    order_actions(&mut actions, &mut state.prng);
    tracing::debug!(turn = state.turn, order = ?actions, "resolving turn");

    for action in &actions {
        match *action {
            BattleAction::Switch { side, target, .. } => {
                switch_in(state, side, target, true, dex, registry);
            }
            BattleAction::Move { side, move_index, .. } => {
                execute_move(state, side, move_index, dex, registry);
            }
        }
        if let Some(winner) = check_win(state) {
            return TurnOutcome::Won(winner);
        }
    }

    run_end_of_turn(state);
    if let Some(winner) = check_win(state) {
        return TurnOutcome::Won(winner);
    }

    state.turn += 1;
    state.log.push(BattleEvent::Turn(state.turn));
    TurnOutcome::Continue
}

/// Puts roster member `position` into the active slot and announces it.
/// Switch-in abilities run unless `run_ability` is false.
pub fn switch_in(
    state: &mut BattleState,
    side_id: SideId,
    position: usize,
    run_ability: bool,
    dex: &dyn DataLookup,
    registry: &EffectRegistry,
) -> bool {
    let Some(side) = state.side_mut(side_id) else {
        return false;
    };
    if side.switch_in(position).is_none() {
        return false;
    }
    let Some(incoming) = side.active_pokemon() else {
        return false;
    };
    let event = BattleEvent::Switch {
        pokemon: PokemonIdent::from(incoming),
        details: incoming.details(),
        hp: HpSnapshot::from(incoming),
    };
    state.log.push(event);

    if run_ability {
        activate_switch_in_ability(state, side_id, dex, registry);
    }
    true
}

/// Runs the switch-in ability of `side_id`'s active combatant.
pub fn activate_switch_in_ability(
    state: &mut BattleState,
    side_id: SideId,
    dex: &dyn DataLookup,
    registry: &EffectRegistry,
) -> bool {
    let BattleState { sides, log, .. } = state;
    let (own, foe) = sides_for(sides, side_id);
    let Some(holder) = own.as_deref().and_then(BattleSide::active_pokemon).filter(|p| !p.fainted) else {
        return false;
    };
    run_switch_in_ability(holder, foe.and_then(BattleSide::active_pokemon_mut), registry, dex, log)
}

/// Checks that run before a move: paralysis, sleep, freeze, flinch.
/// Returns false when the user cannot act this turn.
fn can_act(user: &mut PokemonInst, prng: &mut Prng, log: &mut EventLog) -> bool {
    let cant = |user: &PokemonInst, reason: &str, log: &mut EventLog| {
        log.push(BattleEvent::Cant {
            pokemon: PokemonIdent::from(user),
            reason: reason.to_string(),
        });
    };

    match user.status {
        Some(StatusCondition::Paralysis) if prng.random_chance(1, 4) => {
            cant(user, "par", log);
            return false;
        }
        Some(StatusCondition::Sleep { turns }) => {
            let turns = turns.saturating_sub(1);
            if turns == 0 {
                cure_status(user, log);
            } else {
                user.status = Some(StatusCondition::Sleep { turns });
                cant(user, "slp", log);
                return false;
            }
        }
        Some(StatusCondition::Freeze) => {
            if prng.random_chance(1, 5) {
                cure_status(user, log);
            } else {
                cant(user, "frz", log);
                return false;
            }
        }
        _ => {}
    }

    if user.has_volatile("flinch") {
        cant(user, "flinch", log);
        return false;
    }
    true
}

pub fn execute_move(
    state: &mut BattleState,
    side_id: SideId,
    move_index: usize,
    dex: &dyn DataLookup,
    registry: &EffectRegistry,
) {
    let BattleState { sides, prng, log, .. } = state;
    let (own, foe) = sides_for(sides, side_id);
    let Some(user) = own.and_then(BattleSide::active_pokemon_mut) else {
        return;
    };
    if user.fainted || !can_act(user, prng, log) {
        return;
    }

    let Some(slot) = user.move_slots.get_mut(move_index) else {
        return;
    };
    slot.deduct_pp();
    let data = dex.move_data(&slot.id);
    let move_name = if data.exists { data.name.clone() } else { slot.name.clone() };

    log.push(BattleEvent::Move {
        user: PokemonIdent::from(&*user),
        move_name,
    });

    let Some(foe) = foe else {
        log.push(BattleEvent::NoTarget {
            pokemon: PokemonIdent::from(&*user),
        });
        return;
    };
    let Some(target) = foe.active.and_then(|i| foe.pokemon.get_mut(i)).filter(|p| !p.fainted) else {
        log.push(BattleEvent::NoTarget {
            pokemon: PokemonIdent::from(&*user),
        });
        return;
    };
    if !data.exists {
        return;
    }

    if data.category == MoveCategory::Status {
        use_status_move(user, target, &data, prng, log);
    } else if use_damaging_move(user, target, &data, dex, registry, prng, log) {
        foe.fainted_this_turn = true;
    }
}

fn use_status_move(user: &mut PokemonInst, target: &mut PokemonInst, data: &MoveData, prng: &mut Prng, log: &mut EventLog) {
    let self_targeted = data.target == MoveTarget::User;
    if !self_targeted && !accuracy_check(data, user, target, prng) {
        log.push(BattleEvent::Miss {
            source: PokemonIdent::from(&*user),
            target: PokemonIdent::from(&*target),
        });
        return;
    }

    let mut success = false;
    if let Some(status) = data.status {
        success |= try_set_status(target, status, prng, log);
    }
    if let Some(boosts) = &data.boosts {
        let recipient = if self_targeted { &mut *user } else { &mut *target };
        success |= apply_boosts(recipient, boosts, log);
    }
    if let Some((numerator, denominator)) = data.heal {
        let amount = user.max_hp as u32 * numerator as u32 / (denominator as u32).max(1);
        success |= heal(user, amount, log);
    }

    if !success {
        log.push(BattleEvent::Fail {
            pokemon: PokemonIdent::from(&*user),
        });
    }
}

/// Returns true if the target fainted.
fn use_damaging_move(
    user: &mut PokemonInst,
    target: &mut PokemonInst,
    data: &MoveData,
    dex: &dyn DataLookup,
    registry: &EffectRegistry,
    prng: &mut Prng,
    log: &mut EventLog,
) -> bool {
    if !accuracy_check(data, user, target, prng) {
        log.push(BattleEvent::Miss {
            source: PokemonIdent::from(&*user),
            target: PokemonIdent::from(&*target),
        });
        return false;
    }

    let effectiveness = dex.effectiveness(data.move_type, &target.types);
    if effectiveness.is_immune() {
        log.push(BattleEvent::Immune {
            pokemon: PokemonIdent::from(&*target),
        });
        return false;
    }

    let damage = calculate_damage(user, target, data, dex, prng);
    let crit = roll_critical(data, prng);
    let target_ident = PokemonIdent::from(&*target);
    if crit {
        log.push(BattleEvent::Crit {
            pokemon: target_ident.clone(),
        });
    }
    match effectiveness {
        Effectiveness::Modifier(e) if e > 0 => log.push(BattleEvent::SuperEffective { pokemon: target_ident }),
        Effectiveness::Modifier(e) if e < 0 => log.push(BattleEvent::Resisted { pokemon: target_ident }),
        _ => {}
    }

    if apply_damage(target, apply_critical(damage, crit), None, log) {
        return true;
    }

    if let Some(secondary) = &data.secondary {
        let triggered = secondary
            .chance
            .map_or(true, |chance| prng.random_chance(chance as u32, 100));
        if triggered {
            if let Some(status) = secondary.status {
                try_set_status(target, status, prng, log);
            }
            if let Some(boosts) = &secondary.boosts {
                apply_boosts(target, boosts, log);
            }
            if let Some(volatile) = &secondary.volatile {
                add_volatile(target, volatile, Some(&user.name), log);
            }
        }
    }

    if data.contact {
        run_contact_ability(user, target, registry, dex, prng, log);
    }
    false
}

/// Residual status damage for each standing active combatant in side
/// order, then flinch expiry and faint-flag rollover.
pub fn run_end_of_turn(state: &mut BattleState) {
    let BattleState { sides, log, .. } = state;
    for side in sides.iter_mut().flatten() {
        let Some(active) = side.active.and_then(|i| side.pokemon.get_mut(i)) else {
            continue;
        };
        if run_residual(active, log) {
            side.fainted_this_turn = true;
        }
    }

    for side in sides.iter_mut().flatten() {
        if let Some(active) = side.active_pokemon_mut() {
            active.volatiles.remove("flinch");
        }
        side.roll_faint_flags();
    }
}

/// The first side (in slot order) with nothing left standing loses.
pub fn check_win(state: &BattleState) -> Option<SideId> {
    state
        .sides()
        .find(|side| side.all_fainted())
        .map(|loser| loser.id.foe())
        .filter(|winner| state.side(*winner).is_some())
}
