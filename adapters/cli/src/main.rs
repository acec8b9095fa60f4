#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Garden Defence scenarios headlessly.

mod logging;
mod path_file;
mod runner;
mod scenario;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;
use garden_defence_world::{query, World};
use log::info;

use scenario::Scenario;

/// Runs a Garden Defence scenario without a window.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path file: a waypoint count followed by that many `x y` pairs.
    #[arg(long)]
    path: Option<PathBuf>,
    /// Scenario TOML with a `[world]` table and `[[placements]]` entries.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,
    /// Length of each tick in milliseconds.
    #[arg(long, default_value_t = 16)]
    dt_ms: u64,
    /// Write the path in use to this file.
    #[arg(long)]
    save_path: Option<PathBuf>,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Garden Defence command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let path = match &args.path {
        Some(file) => path_file::load(file)?,
        None => path_file::builtin()?,
    };
    if let Some(file) = &args.save_path {
        path_file::save(&path, file)?;
        info!("path written to {}", file.display());
    }

    let scenario = match &args.scenario {
        Some(file) => Scenario::load(file)?,
        None => Scenario::builtin(),
    };

    let mut world = World::new(path, scenario.world);
    println!("{}", query::welcome_banner(&world));

    let summary = runner::run(
        &mut world,
        &scenario.placements,
        args.ticks,
        Duration::from_millis(args.dt_ms),
    );
    println!("{summary}");
    Ok(())
}
