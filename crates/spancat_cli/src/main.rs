#![forbid(unsafe_code)]

use std::io;

use clap::Parser;
use crossbeam_channel::unbounded;
use spancat::{Composer, FsResolver};

mod relay;

/// Concatenate a byte range across ordered content sources.
#[derive(Debug, Parser)]
#[command(name = "spancat", version)]
struct Args {
    /// Byte offset to begin reading from.
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    offset: i64,

    /// Maximum number of bytes to read (-1 reads to the end).
    #[arg(
        short,
        long,
        default_value_t = spancat::UNBOUNDED,
        allow_negative_numbers = true
    )]
    length: i64,

    /// Paths of the sources to read, in output order.
    #[arg(required = true)]
    paths: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,spancat=info".to_string()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let composer = Composer::new(FsResolver::new());
    let result = composer.window(&args.paths, args.offset, args.length)?;
    let total = result.total_length();

    // Emit stage: announce the length, then hand over the composed stream.
    let (tx, rx) = unbounded();
    let _ = tx.send(relay::RelayEvent::Stream(Box::new(result.into_reader())));
    drop(tx);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    relay::run(total, &rx, &mut out)?;
    Ok(())
}
