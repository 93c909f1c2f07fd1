//! Team sets and the packed team string format.
//!
//! A packed team is a `]`-separated list of sets, each a `|`-separated row:
//! `name|species|item|ability|moves|nature|evs|gender|ivs|shiny|level|misc`
//! where `misc` is `happiness,hpType,pokeball,gigantamax,dynamaxLevel,teraType`.

use crate::dex::DataLookup;
use crate::errors::{TeamError, TeamResult};
use schema::{StatId, StatTable};
use serde::{Deserialize, Serialize};

const MAX_TEAM_SIZE: usize = 24;
const DEFAULT_IV: u16 = 31;
const DEFAULT_HAPPINESS: u8 = 255;

/// A team member as submitted by a player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PokemonSet {
    pub name: String,
    pub species: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub item: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ability: String,
    pub moves: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub nature: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub gender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evs: Option<StatTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ivs: Option<StatTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub shiny: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub happiness: Option<u8>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pokeball: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hp_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tera_type: String,
}

/// Strips everything but ASCII letters and digits, keeping case.
fn pack_name(name: &str) -> String {
    name.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Recovers a display name: the dex name when known, otherwise the packed
/// name split before capitals and digit runs.
fn unpack_name<F>(packed: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if packed.is_empty() {
        return String::new();
    }
    if let Some(name) = lookup(packed) {
        return name;
    }
    let mut out = String::new();
    let mut prev_digit = false;
    for c in packed.chars() {
        let is_digit = c.is_ascii_digit();
        if (c.is_ascii_uppercase() || (is_digit && !prev_digit) || (!is_digit && prev_digit)) && !out.is_empty() {
            out.push(' ');
        }
        out.push(c);
        prev_digit = is_digit;
    }
    out
}

fn pack_spread(spread: Option<&StatTable>, blank_value: u16) -> String {
    let Some(spread) = spread else {
        return String::new();
    };
    let fields: Vec<String> = [StatId::Hp, StatId::Atk, StatId::Def, StatId::Spa, StatId::Spd, StatId::Spe]
        .iter()
        .map(|&stat| match spread.get(stat) {
            value if value == blank_value => String::new(),
            value => value.to_string(),
        })
        .collect();
    let joined = fields.join(",");
    if joined == ",,,,," {
        String::new()
    } else {
        joined
    }
}

fn unpack_spread(field: &str, blank_value: u16) -> Option<StatTable> {
    if field.is_empty() {
        return None;
    }
    let mut table = StatTable::uniform(blank_value);
    let stats = [StatId::Hp, StatId::Atk, StatId::Def, StatId::Spa, StatId::Spd, StatId::Spe];
    for (stat, value) in stats.iter().zip(field.split(',')) {
        let parsed = if value.is_empty() { blank_value } else { value.parse().unwrap_or(0) };
        table.set(*stat, parsed);
    }
    Some(table)
}

/// Packs a team into the compact string form.
pub fn pack(team: &[PokemonSet]) -> String {
    let mut entries = Vec::with_capacity(team.len());

    for set in team {
        let display_name = if set.name.is_empty() { &set.species } else { &set.name };
        let species_id = pack_name(if set.species.is_empty() { &set.name } else { &set.species });
        let species_field = if pack_name(display_name) == species_id {
            String::new()
        } else {
            species_id
        };

        let moves: Vec<String> = set.moves.iter().map(|m| pack_name(m)).collect();
        let level = match set.level {
            Some(level) if level != 100 => level.to_string(),
            _ => String::new(),
        };
        let happiness = match set.happiness {
            Some(happiness) if happiness != DEFAULT_HAPPINESS => happiness.to_string(),
            _ => String::new(),
        };

        let mut entry = [
            display_name.clone(),
            species_field,
            pack_name(&set.item),
            pack_name(&set.ability),
            moves.join(","),
            set.nature.clone(),
            pack_spread(set.evs.as_ref(), 0),
            set.gender.clone(),
            pack_spread(set.ivs.as_ref(), DEFAULT_IV),
            if set.shiny { "S".to_string() } else { String::new() },
            level,
            happiness,
        ]
        .join("|");

        if !set.pokeball.is_empty() || !set.hp_type.is_empty() || !set.tera_type.is_empty() {
            entry.push_str(&format!(",{},{},,,{}", set.hp_type, pack_name(&set.pokeball), set.tera_type));
        }

        entries.push(entry);
    }

    entries.join("]")
}

/// Unpacks a packed team string. A JSON list of sets is accepted as well.
/// An empty string is an empty team.
pub fn unpack(buf: &str, dex: &dyn DataLookup) -> TeamResult<Vec<PokemonSet>> {
    let buf = buf.trim();
    if buf.is_empty() {
        return Ok(Vec::new());
    }
    if buf.starts_with('[') && buf.ends_with(']') {
        return serde_json::from_str(buf).map_err(|e| TeamError::InvalidJson(e.to_string()));
    }

    let species_name = |n: &str| {
        let entry = dex.species(n);
        entry.exists.then(|| entry.data.name)
    };
    let item_name = |n: &str| {
        let entry = dex.item(n);
        entry.exists.then(|| entry.data.name)
    };
    let ability_name = |n: &str| {
        let entry = dex.ability(n);
        entry.exists.then(|| entry.data.name)
    };
    let move_name = |n: &str| {
        let entry = dex.move_data(n);
        entry.exists.then(|| entry.data.name)
    };
    let nature_name = |n: &str| {
        let entry = dex.nature(n);
        entry.exists.then(|| entry.data.name)
    };

    let mut team = Vec::new();
    for (index, entry) in buf.split(']').take(MAX_TEAM_SIZE).enumerate() {
        let fields: Vec<&str> = entry.split('|').collect();
        if fields.len() < 11 {
            return Err(TeamError::Truncated { index });
        }

        let mut set = PokemonSet {
            name: fields[0].to_string(),
            ..PokemonSet::default()
        };

        set.species = unpack_name(fields[1], species_name);
        if set.species.is_empty() {
            set.species = set.name.clone();
        }
        set.item = unpack_name(fields[2], item_name);

        let species = dex.species(&set.species);
        set.ability = match fields[3] {
            "" | "0" => species.abilities.first().cloned().unwrap_or_default(),
            "1" => species.abilities.get(1).cloned().unwrap_or_default(),
            "H" => species.hidden_ability.clone().unwrap_or_default(),
            "S" => String::new(),
            packed => unpack_name(packed, ability_name),
        };

        set.moves = fields[4]
            .split(',')
            .filter(|m| !m.is_empty())
            .take(MAX_TEAM_SIZE)
            .map(|m| unpack_name(m, move_name))
            .collect();
        set.nature = unpack_name(fields[5], nature_name);
        set.evs = unpack_spread(fields[6], 0);
        set.gender = fields[7].to_string();
        set.ivs = unpack_spread(fields[8], DEFAULT_IV);
        set.shiny = !fields[9].is_empty();
        set.level = fields[10].parse().ok();

        if let Some(misc) = fields.get(11).filter(|m| !m.is_empty()) {
            let misc: Vec<&str> = misc.split(',').collect();
            set.happiness = Some(misc[0].parse().unwrap_or(DEFAULT_HAPPINESS));
            set.hp_type = misc.get(1).copied().unwrap_or_default().to_string();
            set.pokeball = unpack_name(misc.get(2).copied().unwrap_or_default(), item_name);
            set.tera_type = misc.get(5).copied().unwrap_or_default().to_string();
        }

        team.push(set);
    }

    Ok(team)
}
