#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Beatback battle in the terminal.

mod map;
mod session;

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::PathBuf,
};

use anyhow::{Context, Result as AnyResult};
use beatback_core::{Side, WELCOME_BANNER};
use clap::Parser;
use session::Session;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Side length of the battlefield when none is given.
const DEFAULT_FIELD_SIZE: u32 = 8;
/// Log filter applied when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "beatback=info";

/// Turn-based tactical battles on a square grid.
#[derive(Debug, Parser)]
#[command(name = "beatback", version)]
struct Args {
    /// Map file listing terrain and unit entries.
    #[arg(long)]
    map: PathBuf,

    /// Battlefield height in cells.
    #[arg(long, default_value_t = DEFAULT_FIELD_SIZE)]
    rows: u32,

    /// Battlefield width in cells.
    #[arg(long, default_value_t = DEFAULT_FIELD_SIZE)]
    columns: u32,

    /// Read player commands from this file instead of standard input.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Write the game transcript to this file instead of standard output.
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Entry point for the Beatback command-line interface.
fn main() -> AnyResult<()> {
    let args = Args::parse();
    init_tracing();

    let field = map::load_map(&args.map, args.rows, args.columns)
        .with_context(|| format!("failed to load battle map {}", args.map.display()))?;

    let input: Box<dyn BufRead> = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open input {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };
    let mut output: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create output {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };
    writeln!(output, "{WELCOME_BANNER}")?;

    let mut session = Session::new(field, input, output);
    let outcome = session.run()?;
    info!(
        ?outcome,
        player_units = session.field().count_units(Side::Player),
        enemy_units = session.field().count_units(Side::Enemy),
        "session finished"
    );
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
