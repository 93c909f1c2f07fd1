//! The battle controller: the public operations a session drives, layered
//! over [`BattleState`] and the turn orchestrator.

use crate::battle::effects::EffectRegistry;
use crate::battle::log::{BattleEvent, OutputSink};
use crate::battle::requests::SideRequest;
use crate::battle::state::{BattleOptions, BattleState, GameState, PlayerOptions, TeamSpec};
use crate::battle::turn_orchestrator::{activate_switch_in_ability, run_turn, switch_in, TurnOutcome};
use crate::dex::{to_id, DataLookup};
use crate::errors::{BattleError, BattleResult};
use crate::pokemon::PokemonInst;
use crate::prng::{format_seed, parse_seed, PrngSeed};
use crate::side::{BattleSide, ChoiceAction, SideId};
use crate::teams;
use serde_json::json;
use std::sync::Arc;

const SINGLES_SIDES: usize = 2;
const CLAUSE_RULE: &str = "Sleep Clause Mod: Limit one foe put to sleep";

pub struct Battle<S: OutputSink> {
    state: BattleState,
    dex: Arc<dyn DataLookup>,
    registry: EffectRegistry,
    sink: S,
    input_log: Vec<String>,
}

impl<S: OutputSink> Battle<S> {
    pub fn new(options: BattleOptions, dex: Arc<dyn DataLookup>, sink: S) -> Self {
        let state = BattleState::new(&options);
        let seed = state.prng.starting_seed();
        let start = json!({ "formatid": state.format, "seed": seed });
        tracing::debug!(format = %state.format, seed = %format_seed(&seed), "battle created");

        Self {
            state,
            dex,
            registry: EffectRegistry::standard(),
            sink,
            input_log: vec![format!(">start {}", start)],
        }
    }

    /// Replaces the ability effect table.
    pub fn with_registry(mut self, registry: EffectRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut BattleState {
        &mut self.state
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn input_log(&self) -> &[String] {
        &self.input_log
    }

    pub fn is_ended(&self) -> bool {
        self.state.is_ended()
    }

    pub fn winner(&self) -> Option<SideId> {
        self.state.winner
    }

    pub fn turn(&self) -> u32 {
        self.state.turn
    }

    pub fn starting_seed(&self) -> PrngSeed {
        self.state.prng.starting_seed()
    }

    fn check_slot(slot: SideId) -> BattleResult<()> {
        if slot.index() >= SINGLES_SIDES {
            return Err(BattleError::UnsupportedSlot(slot));
        }
        Ok(())
    }

    /// Assigns a roster to `slot`. The battle starts once both slots are
    /// filled; after that only the display name can change.
    pub fn set_player(&mut self, slot: SideId, options: PlayerOptions) -> BattleResult<()> {
        Self::check_slot(slot)?;
        let name = options.name.clone().unwrap_or_else(|| format!("Player {}", slot.index() + 1));

        if self.state.game_state != GameState::AwaitingPlayers {
            if let Some(side) = self.state.side_mut(slot) {
                side.name = name;
            }
            self.record_player(slot, &options);
            return Ok(());
        }

        let sets = match &options.team {
            Some(TeamSpec::Packed(text)) => teams::unpack(text, self.dex.as_ref())?,
            Some(TeamSpec::Sets(sets)) => sets.clone(),
            None => Vec::new(),
        };
        if sets.is_empty() {
            return Err(BattleError::EmptyTeam(slot));
        }

        let pokemon: Vec<PokemonInst> = sets
            .into_iter()
            .enumerate()
            .map(|(position, set)| PokemonInst::from_set(set, slot, position, self.dex.as_ref()))
            .collect();
        tracing::debug!(side = %slot, name = %name, team_size = pokemon.len(), "player set");

        self.state.sides[slot.index()] = Some(BattleSide::new(slot, name, pokemon));
        self.record_player(slot, &options);

        if self.state.all_sides_set() {
            self.start();
        }
        Ok(())
    }

    fn record_player(&mut self, slot: SideId, options: &PlayerOptions) {
        let payload = serde_json::to_string(options).unwrap_or_default();
        self.input_log.push(format!(">player {} {}", slot, payload));
    }

    fn start(&mut self) {
        let log = &mut self.state.log;
        log.push(BattleEvent::GameType("singles".to_string()));
        log.push(BattleEvent::Gen(self.state.generation));
        log.push(BattleEvent::Tier(self.state.format.clone()));

        let roster: Vec<(SideId, String, usize)> = self
            .state
            .sides()
            .map(|side| (side.id, side.name.clone(), side.pokemon.len()))
            .collect();
        for (side, name, _) in &roster {
            self.state.log.push(BattleEvent::Player {
                side: *side,
                name: name.clone(),
            });
        }
        for (side, _, size) in &roster {
            self.state.log.push(BattleEvent::TeamSize {
                side: *side,
                size: *size,
            });
        }
        self.state.log.push(BattleEvent::Rule(CLAUSE_RULE.to_string()));
        self.state.log.push(BattleEvent::Start);

        // Both leads are on the field before any entry ability fires.
        for (side, _, _) in &roster {
            switch_in(&mut self.state, *side, 0, false, self.dex.as_ref(), &self.registry);
        }
        for (side, _, _) in &roster {
            activate_switch_in_ability(&mut self.state, *side, self.dex.as_ref(), &self.registry);
        }

        self.state.turn = 1;
        self.state.log.push(BattleEvent::Turn(1));
        self.state.game_state = GameState::AwaitingChoices;
        tracing::debug!("battle started");
        self.make_requests();
    }

    /// Flushes pending records, then sends every side a fresh request and
    /// clears its choice.
    fn make_requests(&mut self) {
        self.send_updates();
        let dex = self.dex.as_ref();
        let debug = self.state.debug;
        for side in self.state.sides.iter_mut().flatten() {
            let request = SideRequest::for_side(side, dex);
            side.choice.clear();
            match request.to_message() {
                Ok(message) => {
                    if debug {
                        tracing::debug!(side = %side.id, request = %message, "request");
                    }
                    self.sink.side_update(side.id, &message)
                }
                Err(err) => tracing::warn!(side = %side.id, error = %err, "request did not serialize"),
            }
            side.request = Some(request);
        }
    }

    /// Submits a choice for `slot`. Resolves the turn once every side is done.
    /// Choices after the battle ended are accepted and ignored.
    pub fn choose(&mut self, slot: SideId, choice: &str) -> BattleResult<()> {
        if self.state.is_ended() {
            tracing::debug!(side = %slot, choice, "ignoring choice after the battle ended");
            return Ok(());
        }
        Self::check_slot(slot)?;
        if self.state.game_state == GameState::AwaitingPlayers {
            return Err(BattleError::NotStarted);
        }
        let side = self.state.side(slot).ok_or(BattleError::UnknownSide(slot))?;
        if side.choice.done {
            return Err(BattleError::ChoiceAlreadyMade(slot));
        }
        let actions = parse_choice(side, choice)?;

        self.input_log.push(format!(">{} {}", slot, choice));
        if let Some(side) = self.state.side_mut(slot) {
            side.choice.actions = actions;
            side.choice.done = true;
        }

        if self.state.sides().all(|side| side.choice.done) {
            self.resolve_turn();
        }
        Ok(())
    }

    /// Withdraws `slot`'s pending choice.
    pub fn undo_choice(&mut self, slot: SideId) -> BattleResult<()> {
        if self.state.is_ended() {
            return Ok(());
        }
        Self::check_slot(slot)?;
        let side = self.state.side_mut(slot).ok_or(BattleError::UnknownSide(slot))?;
        side.choice.clear();
        Ok(())
    }

    fn resolve_turn(&mut self) {
        match run_turn(&mut self.state, self.dex.as_ref(), &self.registry) {
            TurnOutcome::Won(winner) => {
                self.win(Some(winner));
            }
            TurnOutcome::Continue => {
                self.state.game_state = GameState::AwaitingChoices;
                self.make_requests();
            }
        }
    }

    /// Ends the battle. `None` is a tie. Does nothing once ended.
    pub fn win(&mut self, winner: Option<SideId>) -> bool {
        if self.state.is_ended() {
            return false;
        }
        self.state.game_state = GameState::Ended;
        self.state.winner = winner;

        match winner {
            Some(side) => {
                let name = self
                    .state
                    .side(side)
                    .map_or_else(|| side.to_string(), |s| s.name.clone());
                self.state.log.push(BattleEvent::Win { name });
            }
            None => self.state.log.push(BattleEvent::Tie),
        }
        tracing::debug!(winner = ?winner, turn = self.state.turn, "battle ended");

        self.send_updates();
        let summary = self.summary();
        self.sink.end(&summary);
        true
    }

    /// `forcewin`: without a slot this is a tie.
    pub fn force_win(&mut self, slot: Option<SideId>) -> bool {
        match slot {
            Some(side) => self.input_log.push(format!(">forcewin {}", side)),
            None => self.input_log.push(">forcewin".to_string()),
        }
        tracing::debug!(side = ?slot, "forced win");
        self.win(slot)
    }

    pub fn force_tie(&mut self) -> bool {
        self.input_log.push(">forcetie".to_string());
        tracing::debug!("forced tie");
        self.win(None)
    }

    /// `forcelose`: the opponent of `slot` wins.
    pub fn force_lose(&mut self, slot: SideId) -> bool {
        self.input_log.push(format!(">forcelose {}", slot));
        tracing::debug!(side = %slot, "forced loss");
        let winner = Some(slot.foe()).filter(|foe| self.state.side(*foe).is_some());
        self.win(winner)
    }

    /// Replaces the RandomEngine state. Malformed text is ignored.
    pub fn reseed(&mut self, text: &str) -> bool {
        let Some(seed) = parse_seed(text) else {
            tracing::warn!(text, "ignoring malformed reseed");
            return false;
        };
        self.state.prng.set_seed(seed);
        self.input_log.push(format!(">reseed {}", format_seed(&seed)));
        tracing::debug!(seed = %format_seed(&seed), "reseeded");
        true
    }

    /// Sends everything logged since the last flush as one update.
    pub fn send_updates(&mut self) {
        if !self.state.log.has_pending() {
            return;
        }
        let records = self.state.log.take_pending();
        self.sink.update(&records);
    }

    /// The packed roster for `slot`, if that side exists.
    pub fn packed_team(&self, slot: SideId) -> Option<String> {
        let side = self.state.side(slot)?;
        let sets: Vec<_> = side.pokemon.iter().map(|p| p.set.clone()).collect();
        Some(teams::pack(&sets))
    }

    fn summary(&self) -> String {
        let winner = self
            .state
            .winner
            .and_then(|side| self.state.side(side))
            .map(|side| side.name.clone())
            .unwrap_or_default();
        json!({
            "winner": winner,
            "seed": self.state.prng.starting_seed(),
            "turns": self.state.turn,
            "inputLog": self.input_log,
        })
        .to_string()
    }

    /// Marks the battle over without records. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.state.game_state != GameState::Ended {
            tracing::debug!("battle destroyed");
        }
        self.state.game_state = GameState::Ended;
    }
}

/// Parses and validates a choice string against the side's state.
pub fn parse_choice(side: &BattleSide, text: &str) -> BattleResult<Vec<ChoiceAction>> {
    let invalid = |reason: &str| BattleError::InvalidChoice {
        choice: text.to_string(),
        reason: reason.to_string(),
    };

    let mut actions = Vec::new();
    for token in text.split(',').map(str::trim) {
        let (verb, argument) = match token.split_once(' ') {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (token, ""),
        };
        let action = match verb {
            "move" => {
                if side.must_switch() {
                    return Err(BattleError::MustSwitch { side: side.id });
                }
                parse_move(side, argument).ok_or_else(|| invalid("no such move"))??
            }
            "switch" => parse_switch(side, argument).ok_or_else(|| invalid("expected a roster number"))??,
            "default" | "pass" => default_action(side),
            "" => return Err(invalid("empty choice")),
            _ => return Err(invalid("unknown action")),
        };
        actions.push(action);
    }
    Ok(actions)
}

/// `None` when the argument names no move; `Some(Err)` when it names one
/// that cannot be used.
fn parse_move(side: &BattleSide, argument: &str) -> Option<BattleResult<ChoiceAction>> {
    let active = side.active_pokemon()?;
    let index = match argument.parse::<usize>() {
        Ok(0) => return Some(Err(BattleError::InvalidMoveIndex { index: 0 })),
        Ok(number) => number - 1,
        Err(_) => {
            let id = to_id(argument);
            active.move_slots.iter().position(|slot| slot.id == id)?
        }
    };

    let Some(slot) = active.move_slots.get(index) else {
        return Some(Err(BattleError::InvalidMoveIndex { index: index + 1 }));
    };
    let disabled = side
        .request
        .as_ref()
        .and_then(|request| request.move_disabled(index))
        .unwrap_or(slot.pp == 0 || slot.disabled);
    if disabled {
        return Some(Err(BattleError::NoPpLeft { name: slot.name.clone() }));
    }
    Some(Ok(ChoiceAction::Move(index)))
}

fn parse_switch(side: &BattleSide, argument: &str) -> Option<BattleResult<ChoiceAction>> {
    let number = argument.parse::<usize>().ok()?;
    let Some(target) = number.checked_sub(1).and_then(|i| side.pokemon.get(i)) else {
        return Some(Err(BattleError::InvalidSwitchIndex { index: number }));
    };
    if target.fainted {
        return Some(Err(BattleError::InvalidSwitchTarget {
            name: target.name.clone(),
            reason: "it has fainted",
        }));
    }
    if side.active == Some(number - 1) {
        return Some(Err(BattleError::InvalidSwitchTarget {
            name: target.name.clone(),
            reason: "it is already in battle",
        }));
    }
    Some(Ok(ChoiceAction::Switch(number - 1)))
}

/// A side that must replace a fainted combatant sends in the first one
/// still standing; otherwise the default is move slot 0.
fn default_action(side: &BattleSide) -> ChoiceAction {
    if side.must_switch() {
        let standing = side
            .pokemon
            .iter()
            .enumerate()
            .find(|(index, p)| !p.fainted && Some(*index) != side.active);
        if let Some((position, _)) = standing {
            return ChoiceAction::Switch(position);
        }
    }
    ChoiceAction::Default
}
