//! The line-oriented command protocol. Each `>command message` line drives
//! the controller; output goes out through a [`ChannelRouter`].

use crate::battle::engine::Battle;
use crate::battle::state::{BattleOptions, PlayerOptions};
use crate::dex::{DataLookup, Dex};
use crate::errors::{DexResult, ProtocolError, ProtocolResult, StreamError};
use crate::prng::{format_seed, Prng};
use crate::side::SideId;
use crate::stream::router::{ChannelRouter, Channels, ReplayView};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamOptions {
    /// Return protocol errors to the writer instead of delivering them on
    /// the channels.
    pub no_catch: bool,
    /// Keep channels open after the battle ends.
    pub keep_alive: bool,
    /// Force `debug` on every battle and trace each command.
    pub debug: bool,
    /// Write only this view, on the omniscient channel.
    pub replay: Option<ReplayView>,
}

pub struct BattleStream {
    options: StreamOptions,
    dex: Arc<dyn DataLookup>,
    /// Held until `>start` hands it to the battle.
    router: Option<ChannelRouter>,
    channels: Option<Channels>,
    battle: Option<Battle<ChannelRouter>>,
    destroyed: bool,
}

impl BattleStream {
    pub fn new(options: StreamOptions, dex: Arc<dyn DataLookup>) -> Self {
        let (router, channels) = ChannelRouter::new(options.keep_alive);
        let router = router.with_replay(options.replay);
        Self {
            options,
            dex,
            router: Some(router),
            channels: Some(channels),
            battle: None,
            destroyed: false,
        }
    }

    /// A stream over the bundled game data.
    pub fn with_bundled_dex(options: StreamOptions) -> DexResult<Self> {
        Ok(Self::new(options, Arc::new(Dex::bundled()?)))
    }

    /// The output channels. Handed out once.
    pub fn channels(&mut self) -> Option<Channels> {
        self.channels.take()
    }

    pub fn battle(&self) -> Option<&Battle<ChannelRouter>> {
        self.battle.as_ref()
    }

    fn router_mut(&mut self) -> Option<&mut ChannelRouter> {
        match self.battle.as_mut() {
            Some(battle) => Some(battle.sink_mut()),
            None => self.router.as_mut(),
        }
    }

    fn router(&self) -> Option<&ChannelRouter> {
        match self.battle.as_ref() {
            Some(battle) => Some(battle.sink()),
            None => self.router.as_ref(),
        }
    }

    fn battle_mut(&mut self) -> ProtocolResult<&mut Battle<ChannelRouter>> {
        self.battle.as_mut().ok_or(ProtocolError::NoBattle)
    }

    /// Feeds a chunk of input. Lines that do not start with `>` are skipped.
    ///
    /// In permissive mode a failing line is delivered as an error on every
    /// channel, the channels end, and `Ok` is returned; with `no_catch` the
    /// error comes back here instead.
    pub fn write(&mut self, chunk: &str) -> ProtocolResult<()> {
        if self.destroyed {
            tracing::debug!("ignoring input after destroy");
            return Ok(());
        }

        let result = chunk
            .split('\n')
            .filter_map(|line| line.strip_prefix('>'))
            .try_for_each(|line| {
                let (kind, message) = line.split_once(' ').unwrap_or((line, ""));
                self.write_line(kind, message)
            });

        if let Err(err) = result {
            if self.options.no_catch {
                return Err(err);
            }
            tracing::warn!(error = %err, "protocol error; closing channels");
            if let Some(router) = self.router_mut() {
                router.fail(StreamError::from(&err));
            }
            return Ok(());
        }

        if let Some(battle) = self.battle.as_mut() {
            battle.send_updates();
        }
        Ok(())
    }

    /// Feeds a chunk on behalf of one player: every non-blank line becomes
    /// `>pN <line>`.
    pub fn write_as(&mut self, side: SideId, chunk: &str) -> ProtocolResult<()> {
        let prefixed: Vec<String> = chunk
            .split('\n')
            .filter(|line| !line.trim().is_empty())
            .map(|line| format!(">{} {}", side, line))
            .collect();
        self.write(&prefixed.join("\n"))
    }

    fn write_line(&mut self, kind: &str, message: &str) -> ProtocolResult<()> {
        if self.options.debug {
            tracing::debug!(command = kind, message, "stream input");
        }

        match kind {
            "start" => self.start(message),
            "player" => {
                let (slot, payload) = message.split_once(' ').unwrap_or((message, ""));
                let slot = parse_slot(slot)?;
                let options: PlayerOptions = parse_json(kind, payload)?;
                self.battle_mut()?.set_player(slot, options)?;
                Ok(())
            }
            "p1" | "p2" | "p3" | "p4" => {
                let slot = parse_slot(kind)?;
                let battle = self.battle_mut()?;
                if message.trim() == "undo" {
                    battle.undo_choice(slot)?;
                } else {
                    battle.choose(slot, message)?;
                }
                Ok(())
            }
            "forcewin" => {
                let slot = match message.trim() {
                    "" => None,
                    slot => Some(parse_slot(slot)?),
                };
                self.battle_mut()?.force_win(slot);
                Ok(())
            }
            "forcetie" => {
                self.battle_mut()?.force_tie();
                Ok(())
            }
            "forcelose" => {
                let slot = parse_slot(message)?;
                self.battle_mut()?.force_lose(slot);
                Ok(())
            }
            "reseed" => {
                let text = match message.trim() {
                    "" => format_seed(&Prng::generate_seed()),
                    text => text.to_string(),
                };
                self.battle_mut()?.reseed(&text);
                Ok(())
            }
            "requestlog" => {
                let battle = self.battle_mut()?;
                let data = format!("requesteddata\n{}", battle.input_log().join("\n"));
                battle.sink().push_omniscient(&data);
                Ok(())
            }
            "requestteam" => {
                let missing = || ProtocolError::MissingTeamSlot(message.trim().to_string());
                let slot = message.trim().parse::<SideId>().map_err(|_| missing())?;
                let battle = self.battle_mut()?;
                let team = battle.packed_team(slot).ok_or_else(missing)?;
                battle.sink().push_omniscient(&format!("requesteddata\n{}", team));
                Ok(())
            }
            "version" | "version-origin" => Ok(()),
            _ => Err(ProtocolError::UnrecognizedCommand {
                command: kind.to_string(),
                message: message.to_string(),
            }),
        }
    }

    fn start(&mut self, message: &str) -> ProtocolResult<()> {
        let mut options: BattleOptions = if message.trim().is_empty() {
            BattleOptions::default()
        } else {
            parse_json("start", message)?
        };
        if self.options.debug {
            options.debug = true;
        }
        let router = self.router.take().ok_or(ProtocolError::AlreadyStarted)?;
        self.battle = Some(Battle::new(options, Arc::clone(&self.dex), router));
        Ok(())
    }

    /// Ends the battle and every channel. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        if let Some(battle) = self.battle.as_mut() {
            battle.destroy();
        }
        if let Some(router) = self.router_mut() {
            router.end_all();
        }
        tracing::debug!("stream destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// True once every channel has ended.
    pub fn is_closed(&self) -> bool {
        self.router().map_or(true, ChannelRouter::is_ended)
    }
}

impl Drop for BattleStream {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn parse_slot(text: &str) -> ProtocolResult<SideId> {
    text.trim()
        .parse::<SideId>()
        .map_err(|_| ProtocolError::InvalidSlot(text.trim().to_string()))
}

fn parse_json<T: serde::de::DeserializeOwned>(command: &str, payload: &str) -> ProtocolResult<T> {
    serde_json::from_str(payload).map_err(|source| ProtocolError::InvalidJson {
        command: command.to_string(),
        source,
    })
}
