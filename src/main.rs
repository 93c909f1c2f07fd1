//! Runs one battle over stdin/stdout.
//!
//! Each stdin line is a protocol command such as
//! `>start {"formatid":"gen9customgame"}`. The omniscient channel is printed
//! as-is; side channel chunks are printed as `sideupdate\n<pN>\n<chunk>`.
//! Diagnostics go to stderr, filtered by `RUST_LOG` (default `warn`).

use anyhow::Result;
use pokemon_sim::side::SideId;
use pokemon_sim::stream::{BattleStream, ObjectReader, StreamOptions};
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

async fn print_channel(side: Option<SideId>, mut reader: ObjectReader) {
    while let Some(item) = reader.read().await {
        match (item, side) {
            (Ok(chunk), None) => println!("{}\n", chunk),
            (Ok(chunk), Some(side)) => println!("sideupdate\n{}\n{}\n", side, chunk),
            (Err(err), _) => eprintln!("error: {}", err),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut stream = BattleStream::with_bundled_dex(StreamOptions::default())?;
    let mut printers = Vec::new();
    if let Some(mut channels) = stream.channels() {
        if let Some(reader) = channels.omniscient() {
            printers.push(tokio::spawn(print_channel(None, reader)));
        }
        for side in [SideId::P1, SideId::P2] {
            if let Some(reader) = channels.side(side) {
                printers.push(tokio::spawn(print_channel(Some(side), reader)));
            }
        }
    }

    let mut lines = BufReader::new(stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        stream.write(&line)?;
        if stream.is_closed() {
            break;
        }
    }
    stream.destroy();

    for printer in printers {
        printer.await?;
    }
    Ok(())
}
