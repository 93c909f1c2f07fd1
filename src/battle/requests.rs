//! Per-side request payloads, serialized as `|request|<json>`.

use crate::dex::{to_id, DataLookup};
use crate::pokemon::PokemonInst;
use crate::side::{BattleSide, SideId};
use schema::MoveTarget;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SideRequest {
    Move(MoveRequest),
    Switch(SwitchRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub request_type: &'static str,
    pub active: Vec<ActiveRequest>,
    pub side: SideInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveRequest {
    pub moves: Vec<MoveOption>,
    pub trapped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveOption {
    #[serde(rename = "move")]
    pub move_name: String,
    pub id: String,
    pub pp: u8,
    #[serde(rename = "maxpp")]
    pub max_pp: u8,
    pub target: MoveTarget,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchRequest {
    pub request_type: &'static str,
    pub force_switch: Vec<bool>,
    pub side: SideInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideInfo {
    pub name: String,
    pub id: SideId,
    pub pokemon: Vec<PokemonInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleStats {
    pub atk: u16,
    pub def: u16,
    pub spa: u16,
    pub spd: u16,
    pub spe: u16,
}

/// Roster snapshot entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PokemonInfo {
    pub ident: String,
    pub details: String,
    pub condition: String,
    pub active: bool,
    pub stats: VisibleStats,
    pub moves: Vec<String>,
    pub base_ability: String,
    pub item: String,
    pub pokeball: String,
}

impl From<&PokemonInst> for PokemonInfo {
    fn from(pokemon: &PokemonInst) -> Self {
        let pokeball = if pokemon.set.pokeball.is_empty() {
            "pokeball".to_string()
        } else {
            to_id(&pokemon.set.pokeball)
        };
        Self {
            ident: format!("{}: {}", pokemon.side, pokemon.name),
            details: pokemon.details(),
            condition: pokemon.condition(),
            active: pokemon.is_active,
            stats: VisibleStats {
                atk: pokemon.stats.atk,
                def: pokemon.stats.def,
                spa: pokemon.stats.spa,
                spd: pokemon.stats.spd,
                spe: pokemon.stats.spe,
            },
            moves: pokemon.set.moves.iter().map(|m| to_id(m)).collect(),
            base_ability: to_id(&pokemon.ability),
            item: to_id(&pokemon.item),
            pokeball,
        }
    }
}

impl SideInfo {
    fn of(side: &BattleSide) -> Self {
        Self {
            name: side.name.clone(),
            id: side.id,
            pokemon: side.pokemon.iter().map(PokemonInfo::from).collect(),
        }
    }
}

impl SideRequest {
    pub fn forces_switch(&self) -> bool {
        matches!(self, SideRequest::Switch(request) if request.force_switch.iter().any(|&forced| forced))
    }

    /// Whether the request offered move `index` as disabled. `None` for
    /// switch requests and unknown slots.
    pub fn move_disabled(&self, index: usize) -> Option<bool> {
        match self {
            SideRequest::Move(request) => request.active.first()?.moves.get(index).map(|option| option.disabled),
            SideRequest::Switch(_) => None,
        }
    }

    /// A switch request when the active slot is empty or fainted, a move
    /// request otherwise.
    pub fn for_side(side: &BattleSide, dex: &dyn DataLookup) -> Self {
        let Some(active) = side.active_pokemon().filter(|p| !p.fainted) else {
            return SideRequest::Switch(SwitchRequest {
                request_type: "switch",
                force_switch: vec![true],
                side: SideInfo::of(side),
            });
        };

        let moves = active
            .move_slots
            .iter()
            .map(|slot| {
                let data = dex.move_data(&slot.id);
                MoveOption {
                    move_name: slot.name.clone(),
                    id: slot.id.clone(),
                    pp: slot.pp,
                    max_pp: slot.max_pp,
                    target: if data.exists { data.target } else { MoveTarget::Normal },
                    disabled: slot.disabled || slot.pp == 0,
                }
            })
            .collect();

        SideRequest::Move(MoveRequest {
            request_type: "move",
            active: vec![ActiveRequest {
                moves,
                trapped: active.has_volatile("trapped"),
            }],
            side: SideInfo::of(side),
        })
    }

    pub fn is_switch(&self) -> bool {
        matches!(self, SideRequest::Switch(_))
    }

    pub fn side_info(&self) -> &SideInfo {
        match self {
            SideRequest::Move(request) => &request.side,
            SideRequest::Switch(request) => &request.side,
        }
    }

    /// The side-update line carrying this request.
    pub fn to_message(&self) -> serde_json::Result<String> {
        Ok(format!("|request|{}", serde_json::to_string(self)?))
    }
}
