use bones_core::maze;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub fn run(rows: usize, cols: usize, enemies: usize, seed: u64) -> Result<(), String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let map = maze::generate(rows, cols, enemies, &mut rng).map_err(|e| e.to_string())?;

    print!("{}", map.to_ascii());
    eprintln!(
        "{rows}x{cols} maze, {} walkable cell(s), {} enemy(ies), seed {seed}",
        map.walkable_count(),
        map.enemies().len()
    );
    Ok(())
}
