//! Streaming front end: text channels, the router that feeds them, and the
//! command protocol.

pub mod battle_stream;
pub mod object_stream;
pub mod router;

pub use battle_stream::{BattleStream, StreamOptions};
pub use object_stream::{object_stream, ObjectReader, ObjectWriter, StreamItem};
pub use router::{ChannelFilter, ChannelId, ChannelRouter, Channels, ReplayView, SplitViewFilter};
