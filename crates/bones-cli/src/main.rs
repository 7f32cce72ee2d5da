//! CLI frontend for the Bones engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "bones",
    about = "Bones: a grid-maze dungeon crawler runtime",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a headless run driven by an input script
    Run {
        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// RNG seed (overrides the config)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Key script: U D L R move, a h d r fight, p pause, q quit, `.` idle
        #[arg(long, default_value = "")]
        script: String,

        /// Read the key script from a file instead
        #[arg(long, conflicts_with = "script")]
        script_file: Option<PathBuf>,

        /// Stop after this many ticks even if the script continues
        #[arg(long, default_value = "10000")]
        max_ticks: u64,

        /// Pace frames against the wall clock instead of simulated time
        #[arg(long)]
        realtime: bool,

        /// Print the full event log
        #[arg(short, long)]
        events: bool,
    },

    /// Generate a maze and print it
    Map {
        /// Maze height in cells
        #[arg(long, default_value = "11")]
        rows: usize,

        /// Maze width in cells
        #[arg(long, default_value = "11")]
        cols: usize,

        /// Number of enemies to place
        #[arg(short, long, default_value = "2")]
        enemies: usize,

        /// RNG seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },

    /// Resolve one combat round from a script of actions
    Fight {
        /// TOML config file for combatant stats
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Player actions in order: a attack, h heavy, d defend, r heal
        #[arg(long, default_value = "aaaaaaaaaa")]
        actions: String,

        /// Fight the boss instead of a regular enemy
        #[arg(long)]
        boss: bool,

        /// RNG seed for the enemy's choices
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            config,
            seed,
            script,
            script_file,
            max_ticks,
            realtime,
            events,
        } => commands::run::run(commands::run::RunArgs {
            config: config.as_deref(),
            seed,
            script: &script,
            script_file: script_file.as_deref(),
            max_ticks,
            realtime,
            show_events: events,
        }),
        Commands::Map {
            rows,
            cols,
            enemies,
            seed,
        } => commands::map::run(rows, cols, enemies, seed),
        Commands::Fight {
            config,
            actions,
            boss,
            seed,
        } => commands::fight::run(config.as_deref(), &actions, boss, seed),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
