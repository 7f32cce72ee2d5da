use std::path::Path;

use bones_engine::{
    Game, GameEventKind, RecordingAudio, RecordingRenderer, Scene, ScriptedInput, SimulatedTime,
};
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::load_config;

/// Options for `bones run`.
pub struct RunArgs<'a> {
    pub config: Option<&'a Path>,
    pub seed: Option<u64>,
    pub script: &'a str,
    pub script_file: Option<&'a Path>,
    pub max_ticks: u64,
    pub realtime: bool,
    pub show_events: bool,
}

pub fn run(args: RunArgs<'_>) -> Result<(), String> {
    let mut config = load_config(args.config)?;
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let script = match args.script_file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?,
        None => args.script.to_string(),
    };
    let input = ScriptedInput::parse(&script).map_err(|e| e.to_string())?;

    let mut game = Game::new(config)
        .with_input(input)
        .with_renderer(RecordingRenderer::default())
        .with_audio(RecordingAudio::default());
    if !args.realtime {
        game = game.with_time_source(SimulatedTime::new());
    }

    tracing::debug!(
        seed = game.config().seed,
        max_ticks = args.max_ticks,
        realtime = args.realtime,
        "starting headless run"
    );
    let ticks = game.run_ticks(args.max_ticks).map_err(|e| e.to_string())?;

    println!(
        "{} seed {} | {} level(s)",
        "Run".bold(),
        game.config().seed,
        game.config().levels
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Ticks", "Level", "Scene", "Fights won", "Player HP", "Events"]);
    let stats = game.player_stats();
    table.add_row(vec![
        ticks.to_string(),
        game.level().to_string(),
        game.scene().to_string(),
        game.fights_won().to_string(),
        format!("{}/{}", stats.health, stats.max_health),
        game.events().len().to_string(),
    ]);
    println!("{table}");

    let frames = game
        .renderer::<RecordingRenderer>()
        .map_or(0, RecordingRenderer::frames);
    let blocked = game
        .events()
        .count(|kind| matches!(kind, GameEventKind::MoveBlocked { .. }));
    println!(
        "  {}",
        format!("{frames} frame(s) rendered, {blocked} blocked move(s)").dimmed()
    );

    match game.scene() {
        Scene::EndGame { victory: true } => {
            let message = format!("{} is defeated.", game.config().boss.name);
            println!("  {}", message.green());
        }
        Scene::EndGame { victory: false } => println!("  {}", "You were defeated.".red()),
        _ => {}
    }

    if args.show_events {
        println!();
        println!("{}", "Event Log".bold().underline());
        for event in game.events().events() {
            println!(
                "  {} {}",
                format!("[{:>5}]", event.tick).dimmed(),
                event.description
            );
        }
    }

    game.shutdown();
    Ok(())
}
