//! Fans flush units out to the omniscient, spectator and per-side channels.

use crate::battle::log::{EventRecord, OutputSink};
use crate::errors::StreamError;
use crate::side::SideId;
use crate::stream::object_stream::{object_stream, ObjectReader, ObjectWriter};
use std::collections::BTreeMap;
use std::fmt;

/// Channel numbering: -1 omniscient, 0 spectator, 1..4 sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChannelId {
    Omniscient,
    Spectator,
    Side(SideId),
}

impl ChannelId {
    pub const ALL: [ChannelId; 6] = [
        ChannelId::Omniscient,
        ChannelId::Spectator,
        ChannelId::Side(SideId::P1),
        ChannelId::Side(SideId::P2),
        ChannelId::Side(SideId::P3),
        ChannelId::Side(SideId::P4),
    ];

    pub fn number(self) -> i8 {
        match self {
            ChannelId::Omniscient => -1,
            ChannelId::Spectator => 0,
            ChannelId::Side(side) => side.index() as i8 + 1,
        }
    }

    pub fn from_number(number: i8) -> Option<ChannelId> {
        match number {
            -1 => Some(ChannelId::Omniscient),
            0 => Some(ChannelId::Spectator),
            n if n > 0 => SideId::from_index(n as usize - 1).map(ChannelId::Side),
            _ => None,
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelId::Omniscient => f.write_str("omniscient"),
            ChannelId::Spectator => f.write_str("spectator"),
            ChannelId::Side(side) => write!(f, "{}", side),
        }
    }
}

/// Decides what a non-omniscient viewer sees of a record. `None` hides it.
/// `viewer` is `None` for spectators.
pub trait ChannelFilter: Send {
    fn view<'a>(&self, viewer: Option<SideId>, record: &'a EventRecord) -> Option<&'a str>;
}

/// Exact HP for the owning side, percentages for everyone else.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitViewFilter;

impl ChannelFilter for SplitViewFilter {
    fn view<'a>(&self, viewer: Option<SideId>, record: &'a EventRecord) -> Option<&'a str> {
        Some(record.view_for(viewer))
    }
}

/// The single view a replay router writes. Replays carry no side updates
/// and no end summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayView {
    Omniscient,
    Spectator,
}

/// The reading ends handed to consumers.
#[derive(Debug)]
pub struct Channels {
    readers: BTreeMap<ChannelId, ObjectReader>,
}

impl Channels {
    /// Takes one reader out. Each channel can be taken once.
    pub fn take(&mut self, channel: ChannelId) -> Option<ObjectReader> {
        self.readers.remove(&channel)
    }

    pub fn omniscient(&mut self) -> Option<ObjectReader> {
        self.take(ChannelId::Omniscient)
    }

    pub fn spectator(&mut self) -> Option<ObjectReader> {
        self.take(ChannelId::Spectator)
    }

    pub fn side(&mut self, side: SideId) -> Option<ObjectReader> {
        self.take(ChannelId::Side(side))
    }
}

pub struct ChannelRouter {
    writers: BTreeMap<ChannelId, ObjectWriter>,
    filter: Box<dyn ChannelFilter>,
    keep_alive: bool,
    replay: Option<ReplayView>,
}

impl fmt::Debug for ChannelRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelRouter")
            .field("channels", &self.writers.keys().collect::<Vec<_>>())
            .field("keep_alive", &self.keep_alive)
            .field("replay", &self.replay)
            .finish()
    }
}

impl ChannelRouter {
    /// A router over all six channels with the split-view filter. With
    /// `keep_alive` the channels stay open after the battle ends.
    pub fn new(keep_alive: bool) -> (Self, Channels) {
        let mut writers = BTreeMap::new();
        let mut readers = BTreeMap::new();
        for channel in ChannelId::ALL {
            let (writer, reader) = object_stream();
            writers.insert(channel, writer);
            readers.insert(channel, reader);
        }
        let router = Self {
            writers,
            filter: Box::new(SplitViewFilter),
            keep_alive,
            replay: None,
        };
        (router, Channels { readers })
    }

    pub fn with_filter(mut self, filter: Box<dyn ChannelFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Turns the router into a replay: every flush unit goes to the
    /// omniscient channel as seen through `view`, and nothing else is sent
    /// apart from raw omniscient pushes.
    pub fn with_replay(mut self, replay: Option<ReplayView>) -> Self {
        self.replay = replay;
        self
    }

    fn writer(&self, channel: ChannelId) -> Option<&ObjectWriter> {
        self.writers.get(&channel)
    }

    /// Raw text for the omniscient channel only, such as `requesteddata`.
    pub fn push_omniscient(&self, text: &str) {
        if let Some(writer) = self.writer(ChannelId::Omniscient) {
            writer.push(text);
        }
    }

    /// Delivers `err` on every channel and ends them all.
    pub fn fail(&mut self, err: StreamError) {
        for writer in self.writers.values() {
            writer.push_error(err.clone());
        }
        self.end_all();
    }

    pub fn end_all(&mut self) {
        for writer in self.writers.values_mut() {
            writer.end();
        }
    }

    pub fn is_ended(&self) -> bool {
        self.writers.values().all(ObjectWriter::is_ended)
    }
}

impl OutputSink for ChannelRouter {
    fn update(&mut self, records: &[EventRecord]) {
        if let Some(view) = self.replay {
            let lines: Vec<&str> = match view {
                ReplayView::Omniscient => records.iter().map(EventRecord::omniscient).collect(),
                ReplayView::Spectator => records.iter().filter_map(|r| self.filter.view(None, r)).collect(),
            };
            if !lines.is_empty() {
                self.push_omniscient(&lines.join("\n"));
            }
            return;
        }

        for (channel, writer) in &self.writers {
            let lines: Vec<&str> = match channel {
                ChannelId::Omniscient => records.iter().map(EventRecord::omniscient).collect(),
                ChannelId::Spectator => records.iter().filter_map(|r| self.filter.view(None, r)).collect(),
                ChannelId::Side(side) => records.iter().filter_map(|r| self.filter.view(Some(*side), r)).collect(),
            };
            if !lines.is_empty() {
                writer.push(lines.join("\n"));
            }
        }
    }

    fn side_update(&mut self, side: SideId, message: &str) {
        if self.replay.is_some() {
            return;
        }
        if let Some(writer) = self.writer(ChannelId::Side(side)) {
            writer.push(message);
        }
    }

    fn end(&mut self, summary: &str) {
        if self.replay.is_none() {
            self.push_omniscient(&format!("end\n{}", summary));
        }
        if !self.keep_alive {
            self.end_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::log::{BattleEvent, HpSnapshot, PokemonIdent};
    use crate::battle::tests::common::TestPokemonBuilder;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn records() -> Vec<EventRecord> {
        let mut mew = TestPokemonBuilder::new("Mew", 100).build();
        mew.set_hp(170);
        vec![
            BattleEvent::Move {
                user: PokemonIdent::from(&mew),
                move_name: "Swift".to_string(),
            }
            .to_record(),
            BattleEvent::Damage {
                pokemon: PokemonIdent::from(&mew),
                hp: HpSnapshot::from(&mew),
                from: None,
            }
            .to_record(),
        ]
    }

    fn text(channels: &mut Channels, channel: ChannelId) -> String {
        match channels.take(channel).map(|mut reader| reader.drain_text()) {
            Some(Ok(text)) => text,
            other => panic!("channel {} did not drain: {:?}", channel, other),
        }
    }

    #[rstest]
    #[case(ChannelId::Omniscient, -1)]
    #[case(ChannelId::Spectator, 0)]
    #[case(ChannelId::Side(SideId::P1), 1)]
    #[case(ChannelId::Side(SideId::P4), 4)]
    fn test_channel_numbers(#[case] channel: ChannelId, #[case] number: i8) {
        assert_eq!(channel.number(), number);
        assert_eq!(ChannelId::from_number(number), Some(channel));
    }

    #[test]
    fn test_update_is_split_per_viewer() {
        let (mut router, mut channels) = ChannelRouter::new(false);

        router.update(&records());

        assert_eq!(
            text(&mut channels, ChannelId::Omniscient),
            "|move|p1a: Mew|Swift\n|-damage|p1a: Mew|170/341"
        );
        assert_eq!(
            text(&mut channels, ChannelId::Side(SideId::P1)),
            "|move|p1a: Mew|Swift\n|-damage|p1a: Mew|170/341"
        );
        assert_eq!(
            text(&mut channels, ChannelId::Spectator),
            "|move|p1a: Mew|Swift\n|-damage|p1a: Mew|50/100"
        );
        assert_eq!(
            text(&mut channels, ChannelId::Side(SideId::P2)),
            "|move|p1a: Mew|Swift\n|-damage|p1a: Mew|50/100"
        );
    }

    #[test]
    fn test_side_update_reaches_only_its_side() {
        let (mut router, mut channels) = ChannelRouter::new(false);

        router.side_update(SideId::P2, "|request|{}");

        assert_eq!(text(&mut channels, ChannelId::Side(SideId::P2)), "|request|{}");
        for channel in [ChannelId::Omniscient, ChannelId::Spectator, ChannelId::Side(SideId::P1)] {
            assert_eq!(text(&mut channels, channel), "", "{} should see nothing", channel);
        }
    }

    struct HideDamage;

    impl ChannelFilter for HideDamage {
        fn view<'a>(&self, viewer: Option<SideId>, record: &'a EventRecord) -> Option<&'a str> {
            let text = record.view_for(viewer);
            (!text.starts_with("|-damage|")).then_some(text)
        }
    }

    #[test]
    fn test_custom_filter_never_touches_omniscient() {
        let (router, mut channels) = ChannelRouter::new(false);
        let mut router = router.with_filter(Box::new(HideDamage));

        router.update(&records());

        assert_eq!(text(&mut channels, ChannelId::Spectator), "|move|p1a: Mew|Swift");
        assert!(text(&mut channels, ChannelId::Omniscient).contains("|-damage|"));
    }

    #[tokio::test]
    async fn test_end_closes_channels_unless_kept_alive() {
        let (mut router, mut channels) = ChannelRouter::new(false);
        router.end("{}");
        assert!(router.is_ended());
        let omniscient = channels.omniscient().map(ObjectReader::read_all);
        match omniscient {
            Some(items) => assert_eq!(items.await, vec![Ok("end\n{}".to_string())]),
            None => panic!("omniscient channel missing"),
        }

        let (mut kept, mut kept_channels) = ChannelRouter::new(true);
        kept.end("{}");
        assert!(!kept.is_ended());
        assert_eq!(text(&mut kept_channels, ChannelId::Omniscient), "end\n{}");
    }

    #[tokio::test]
    async fn test_fail_delivers_error_everywhere() {
        let (mut router, mut channels) = ChannelRouter::new(true);
        let err = StreamError {
            message: "Unrecognized command \">bogus \"".to_string(),
        };

        router.fail(err.clone());

        for channel in ChannelId::ALL {
            let items = match channels.take(channel) {
                Some(reader) => reader.read_all().await,
                None => panic!("channel {} missing", channel),
            };
            assert_eq!(items, vec![Err(err.clone())]);
        }
    }

    #[rstest]
    #[case(ReplayView::Omniscient, "|move|p1a: Mew|Swift\n|-damage|p1a: Mew|170/341")]
    #[case(ReplayView::Spectator, "|move|p1a: Mew|Swift\n|-damage|p1a: Mew|50/100")]
    fn test_replay_writes_one_view(#[case] view: ReplayView, #[case] expected: &str) {
        let (router, mut channels) = ChannelRouter::new(true);
        let mut router = router.with_replay(Some(view));

        router.update(&records());
        router.side_update(SideId::P1, "|request|{}");
        router.end("{}");

        assert_eq!(text(&mut channels, ChannelId::Omniscient), expected);
        for channel in [ChannelId::Spectator, ChannelId::Side(SideId::P1), ChannelId::Side(SideId::P2)] {
            assert_eq!(text(&mut channels, channel), "", "{} should see nothing in a replay", channel);
        }
    }

    #[tokio::test]
    async fn test_replay_end_closes_without_summary() {
        let (router, mut channels) = ChannelRouter::new(false);
        let mut router = router.with_replay(Some(ReplayView::Spectator));

        router.end("{}");

        assert!(router.is_ended());
        match channels.omniscient() {
            Some(reader) => assert_eq!(reader.read_all().await, Vec::new()),
            None => panic!("omniscient channel missing"),
        }
    }
}
