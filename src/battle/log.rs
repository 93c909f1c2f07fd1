//! The authoritative battle log.
//!
//! Every observable happening is pushed as a typed [`BattleEvent`], formatted
//! once into an [`EventRecord`], and kept both in the full session log and in
//! a pending buffer that the controller flushes to its [`OutputSink`].

use crate::pokemon::PokemonInst;
use crate::side::SideId;
use schema::{BoostId, StatusType};
use std::fmt;

/// `p1a: Name`, the protocol's way of pointing at an active combatant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokemonIdent {
    pub side: SideId,
    pub name: String,
}

impl From<&PokemonInst> for PokemonIdent {
    fn from(pokemon: &PokemonInst) -> Self {
        Self {
            side: pokemon.side,
            name: pokemon.name.clone(),
        }
    }
}

impl fmt::Display for PokemonIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}a: {}", self.side, self.name)
    }
}

/// HP and status at the moment a record was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HpSnapshot {
    pub hp: u16,
    pub max_hp: u16,
    pub status: Option<StatusType>,
    pub fainted: bool,
}

impl From<&PokemonInst> for HpSnapshot {
    fn from(pokemon: &PokemonInst) -> Self {
        Self {
            hp: pokemon.hp,
            max_hp: pokemon.max_hp,
            status: pokemon.status_type(),
            fainted: pokemon.fainted,
        }
    }
}

impl HpSnapshot {
    /// Exact HP, shown to the owner and the omniscient view.
    pub fn exact(&self) -> String {
        self.render(self.hp as u32, self.max_hp as u32)
    }

    /// HP rounded up to a percentage, shown to everyone else.
    pub fn percent(&self) -> String {
        let max = self.max_hp.max(1) as u32;
        let percent = (100 * self.hp as u32).div_ceil(max);
        self.render(percent, 100)
    }

    fn render(&self, hp: u32, max: u32) -> String {
        if self.fainted {
            return "0 fnt".to_string();
        }
        match self.status {
            Some(status) => format!("{}/{} {}", hp, max, status),
            None => format!("{}/{}", hp, max),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleEvent {
    // --- Battle setup ---
    GameType(String),
    Gen(u8),
    Tier(String),
    Player { side: SideId, name: String },
    TeamSize { side: SideId, size: usize },
    Rule(String),
    Start,
    Turn(u32),

    // --- Field ---
    Switch { pokemon: PokemonIdent, details: String, hp: HpSnapshot },
    Ability { pokemon: PokemonIdent, ability: String },

    // --- Move resolution ---
    Move { user: PokemonIdent, move_name: String },
    Cant { pokemon: PokemonIdent, reason: String },
    NoTarget { pokemon: PokemonIdent },
    Miss { source: PokemonIdent, target: PokemonIdent },
    Immune { pokemon: PokemonIdent },
    Fail { pokemon: PokemonIdent },
    Crit { pokemon: PokemonIdent },
    SuperEffective { pokemon: PokemonIdent },
    Resisted { pokemon: PokemonIdent },

    // --- HP ---
    Damage { pokemon: PokemonIdent, hp: HpSnapshot, from: Option<String> },
    Heal { pokemon: PokemonIdent, hp: HpSnapshot },
    Faint { pokemon: PokemonIdent },

    // --- Conditions ---
    Status { pokemon: PokemonIdent, status: StatusType },
    CureStatus { pokemon: PokemonIdent, status: StatusType },
    Boost { pokemon: PokemonIdent, stat: BoostId, amount: i8 },
    Unboost { pokemon: PokemonIdent, stat: BoostId, amount: i8 },
    VolatileStart { pokemon: PokemonIdent, volatile: String },

    // --- Outcome ---
    Win { name: String },
    Tie,
}

impl BattleEvent {
    /// Formats the event. Records carrying HP are split into an exact view
    /// for the owning side and a percentage view for everyone else.
    pub fn to_record(&self) -> EventRecord {
        use BattleEvent::*;

        match self {
            GameType(kind) => public(&["gametype", kind]),
            Gen(generation) => public(&["gen", &generation.to_string()]),
            Tier(format) => public(&["tier", format]),
            Player { side, name } => public(&["player", &side.to_string(), name, "", ""]),
            TeamSize { side, size } => public(&["teamsize", &side.to_string(), &size.to_string()]),
            Rule(rule) => public(&["rule", rule]),
            Start => public(&["start"]),
            Turn(turn) => public(&["turn", &turn.to_string()]),

            Switch { pokemon, details, hp } => {
                let ident = pokemon.to_string();
                split(
                    pokemon.side,
                    &["switch", &ident, details, &hp.exact()],
                    &["switch", &ident, details, &hp.percent()],
                )
            }
            Ability { pokemon, ability } => public(&["-ability", &pokemon.to_string(), ability]),

            Move { user, move_name } => public(&["move", &user.to_string(), move_name]),
            Cant { pokemon, reason } => public(&["cant", &pokemon.to_string(), reason]),
            NoTarget { pokemon } => public(&["-notarget", &pokemon.to_string()]),
            Miss { source, target } => public(&["-miss", &source.to_string(), &target.to_string()]),
            Immune { pokemon } => public(&["-immune", &pokemon.to_string()]),
            Fail { pokemon } => public(&["-fail", &pokemon.to_string()]),
            Crit { pokemon } => public(&["-crit", &pokemon.to_string()]),
            SuperEffective { pokemon } => public(&["-supereffective", &pokemon.to_string()]),
            Resisted { pokemon } => public(&["-resisted", &pokemon.to_string()]),

            Damage { pokemon, hp, from } => {
                let ident = pokemon.to_string();
                let (exact, percent) = (hp.exact(), hp.percent());
                let mut secret: Vec<&str> = vec!["-damage", &ident, &exact];
                let mut shown: Vec<&str> = vec!["-damage", &ident, &percent];
                if let Some(from) = from {
                    secret.push(from);
                    shown.push(from);
                }
                split(pokemon.side, &secret, &shown)
            }
            Heal { pokemon, hp } => {
                let ident = pokemon.to_string();
                split(pokemon.side, &["-heal", &ident, &hp.exact()], &["-heal", &ident, &hp.percent()])
            }
            Faint { pokemon } => public(&["faint", &pokemon.to_string()]),

            Status { pokemon, status } => public(&["-status", &pokemon.to_string(), &status.to_string()]),
            CureStatus { pokemon, status } => {
                public(&["-curestatus", &pokemon.to_string(), &status.to_string(), "[msg]"])
            }
            Boost { pokemon, stat, amount } => {
                public(&["-boost", &pokemon.to_string(), &stat.to_string(), &amount.to_string()])
            }
            Unboost { pokemon, stat, amount } => {
                public(&["-unboost", &pokemon.to_string(), &stat.to_string(), &amount.to_string()])
            }
            VolatileStart { pokemon, volatile } => public(&["-start", &pokemon.to_string(), volatile]),

            Win { name } => public(&["win", name]),
            Tie => public(&["tie"]),
        }
    }
}

fn join(parts: &[&str]) -> String {
    format!("|{}", parts.join("|"))
}

fn public(parts: &[&str]) -> EventRecord {
    EventRecord::Public(join(parts))
}

fn split(side: SideId, secret: &[&str], public: &[&str]) -> EventRecord {
    EventRecord::Split {
        side,
        secret: join(secret),
        public: join(public),
    }
}

/// One formatted log line, possibly with a per-viewer split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventRecord {
    Public(String),
    Split {
        side: SideId,
        secret: String,
        public: String,
    },
}

impl EventRecord {
    /// The unredacted text.
    pub fn omniscient(&self) -> &str {
        match self {
            EventRecord::Public(text) => text,
            EventRecord::Split { secret, .. } => secret,
        }
    }

    /// The text seen by `viewer`; `None` is a spectator.
    pub fn view_for(&self, viewer: Option<SideId>) -> &str {
        match self {
            EventRecord::Public(text) => text,
            EventRecord::Split { side, secret, public } => {
                if viewer == Some(*side) {
                    secret
                } else {
                    public
                }
            }
        }
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.omniscient())
    }
}

/// Where the controller sends flushed records and per-side messages.
pub trait OutputSink {
    /// One flush unit, in log order.
    fn update(&mut self, records: &[EventRecord]);

    /// A message only the given side may see, such as its request.
    fn side_update(&mut self, side: SideId, message: &str);

    /// The battle reached a terminal state.
    fn end(&mut self, _summary: &str) {}
}

/// Append-only record store with a pending buffer for the next flush.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
    pending: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: BattleEvent) {
        let record = event.to_record();
        tracing::trace!(record = %record, "log");
        self.records.push(record.clone());
        self.pending.push(record);
    }

    /// Everything logged since the last call.
    pub fn take_pending(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// The full session log.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Omniscient text of the full session log.
    pub fn lines(&self) -> Vec<String> {
        self.records.iter().map(|r| r.omniscient().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ident(side: SideId, name: &str) -> PokemonIdent {
        PokemonIdent {
            side,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_public_record_format() {
        let record = BattleEvent::Move {
            user: ident(SideId::P1, "Pikachu"),
            move_name: "Thunderbolt".to_string(),
        }
        .to_record();
        assert_eq!(record, EventRecord::Public("|move|p1a: Pikachu|Thunderbolt".to_string()));

        let record = BattleEvent::Player {
            side: SideId::P2,
            name: "Misty".to_string(),
        }
        .to_record();
        assert_eq!(record.omniscient(), "|player|p2|Misty||");
    }

    #[test]
    fn test_damage_record_is_split() {
        let record = BattleEvent::Damage {
            pokemon: ident(SideId::P2, "Squirtle"),
            hp: HpSnapshot {
                hp: 87,
                max_hp: 130,
                status: Some(StatusType::Burn),
                fainted: false,
            },
            from: Some("[from] brn".to_string()),
        }
        .to_record();

        assert_eq!(record.view_for(Some(SideId::P2)), "|-damage|p2a: Squirtle|87/130 brn|[from] brn");
        // ceil(8700 / 130) = 67
        assert_eq!(record.view_for(Some(SideId::P1)), "|-damage|p2a: Squirtle|67/100 brn|[from] brn");
        assert_eq!(record.view_for(None), "|-damage|p2a: Squirtle|67/100 brn|[from] brn");
        assert_eq!(record.omniscient(), "|-damage|p2a: Squirtle|87/130 brn|[from] brn");
    }

    #[test]
    fn test_fainted_snapshot() {
        let hp = HpSnapshot {
            hp: 0,
            max_hp: 100,
            status: None,
            fainted: true,
        };
        assert_eq!(hp.exact(), "0 fnt");
        assert_eq!(hp.percent(), "0 fnt");
    }

    #[test]
    fn test_percent_rounds_up() {
        let hp = HpSnapshot {
            hp: 1,
            max_hp: 341,
            status: None,
            fainted: false,
        };
        assert_eq!(hp.percent(), "1/100");
    }

    #[test]
    fn test_log_pending_and_full() {
        let mut log = EventLog::new();
        log.push(BattleEvent::Start);
        log.push(BattleEvent::Turn(1));
        assert_eq!(log.take_pending().len(), 2);
        assert!(!log.has_pending());

        log.push(BattleEvent::Tie);
        assert_eq!(log.take_pending(), vec![EventRecord::Public("|tie".to_string())]);
        assert_eq!(log.lines(), vec!["|start", "|turn|1", "|tie"]);
    }

    #[test]
    fn test_boost_records() {
        let boost = BattleEvent::Boost {
            pokemon: ident(SideId::P1, "Mew"),
            stat: BoostId::Atk,
            amount: 2,
        };
        let unboost = BattleEvent::Unboost {
            pokemon: ident(SideId::P2, "Mew"),
            stat: BoostId::Spe,
            amount: 1,
        };
        assert_eq!(boost.to_record().omniscient(), "|-boost|p1a: Mew|atk|2");
        assert_eq!(unboost.to_record().omniscient(), "|-unboost|p2a: Mew|spe|1");
    }
}
