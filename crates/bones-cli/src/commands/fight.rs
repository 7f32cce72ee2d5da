use std::path::Path;

use bones_engine::choose_enemy_action;
use bones_mechanics::{ActionKind, CombatEvent, CombatRound, RoundState, Side};
use colored::Colorize;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::load_config;

pub fn run(config: Option<&Path>, actions: &str, boss: bool, seed: u64) -> Result<(), String> {
    let config = load_config(config)?;
    let actions = parse_actions(actions)?;

    let enemy = if boss { &config.boss } else { &config.enemy };
    let mut round = CombatRound::new(config.player.clone().restored(), enemy.clone().restored());
    let mut rng = StdRng::seed_from_u64(seed);

    println!(
        "{} {} vs {}",
        "Fight".bold(),
        round.player().name,
        round.enemy().name
    );
    println!();

    for action in actions {
        if round.is_resolved() {
            break;
        }
        let outcome = round.act(action).map_err(|e| e.to_string())?;
        print_event(&outcome.event);
        if outcome.state == RoundState::EnemyTurn {
            let reply = choose_enemy_action(&mut rng, round.enemy());
            let outcome = round.act(reply).map_err(|e| e.to_string())?;
            print_event(&outcome.event);
        }
    }

    println!();
    match round.winner() {
        Some(Side::Player) => println!(
            "  {} wins after {} round(s)",
            round.player().name.green().bold(),
            round.round()
        ),
        Some(Side::Enemy) => println!(
            "  {} wins after {} round(s)",
            round.enemy().name.red().bold(),
            round.round()
        ),
        None => println!(
            "  {} ({} {}/{} hp, {} {}/{} hp)",
            "unresolved".yellow(),
            round.player().name,
            round.player().health,
            round.player().max_health,
            round.enemy().name,
            round.enemy().health,
            round.enemy().max_health
        ),
    }
    Ok(())
}

fn parse_actions(script: &str) -> Result<Vec<ActionKind>, String> {
    script
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| ActionKind::from_symbol(c).ok_or_else(|| format!("unknown action symbol '{c}'")))
        .collect()
}

fn print_event(event: &CombatEvent) {
    let side = match event.side {
        Side::Player => format!("{:<6}", "player").cyan(),
        Side::Enemy => format!("{:<6}", "enemy").magenta(),
    };
    println!(
        "  {} {} {}",
        format!("[{:>2}]", event.round).dimmed(),
        side,
        event.description
    );
}
