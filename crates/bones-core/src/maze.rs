//! Seeded maze generation.
//!
//! Mazes are carved with a randomized depth-first walk over the odd
//! coordinates of the grid, so walls sit on even rows and columns and the
//! outer border is always solid. The entry is `(1, 1)`; the stair goes on the
//! floor cell farthest from the entry by walking distance, and enemies are
//! placed on dead ends first.

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::{CoreError, CoreResult};
use crate::grid::{Cell, GridMap};

/// Smallest side length that leaves room for a corridor.
pub const MIN_SIDE: usize = 3;

/// Generate a maze of `rows` x `cols` cells with up to `enemies` enemy spawns.
///
/// Even side lengths are accepted; the last row or column is then left solid.
pub fn generate<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    enemies: usize,
    rng: &mut R,
) -> CoreResult<GridMap> {
    if rows < MIN_SIDE || cols < MIN_SIDE {
        return Err(CoreError::MazeTooSmall { rows, cols });
    }

    let mut map = GridMap::try_new(rows, cols)?;
    let entry = Cell::new(1, 1);
    carve(&mut map, entry, rng);
    map.set_start_map_pos(entry.row, entry.col);

    let distances = walk_distances(&map, entry);
    if let Some((stair, _)) = distances
        .iter()
        .filter(|(cell, _)| *cell != entry)
        .max_by_key(|(cell, d)| (*d, std::cmp::Reverse(*cell)))
    {
        map.set_stair_map_pos(stair.row, stair.col);
    }

    for cell in pick_enemy_cells(&map, &distances, enemies, rng) {
        map.set_enemy_map_pos(cell.row, cell.col);
    }

    tracing::debug!(
        rows,
        cols,
        floor = map.walkable_count(),
        enemies = map.enemies().len(),
        "maze generated"
    );
    Ok(map)
}

/// Randomized depth-first carve, iterative so large mazes cannot overflow the stack.
fn carve<R: Rng + ?Sized>(map: &mut GridMap, from: Cell, rng: &mut R) {
    let rows = map.rows() as i32;
    let cols = map.cols() as i32;
    let is_room = |c: Cell| c.row > 0 && c.col > 0 && c.row < rows - 1 && c.col < cols - 1;

    map.set_walkable(from.row, from.col, true);
    let mut stack = vec![from];

    while let Some(&here) = stack.last() {
        let mut steps = [(-2, 0), (2, 0), (0, -2), (0, 2)];
        steps.shuffle(rng);
        let next = steps
            .iter()
            .map(|(dr, dc)| (Cell::new(here.row + dr, here.col + dc), (dr / 2, dc / 2)))
            .find(|(cell, _)| is_room(*cell) && !map.is_cell_walkable(*cell));

        match next {
            Some((cell, (dr, dc))) => {
                map.set_walkable(here.row + dr, here.col + dc, true);
                map.set_walkable(cell.row, cell.col, true);
                stack.push(cell);
            }
            None => {
                stack.pop();
            }
        }
    }
}

/// Breadth-first walking distance from `from` to every reachable floor cell.
fn walk_distances(map: &GridMap, from: Cell) -> Vec<(Cell, u32)> {
    let index = |c: Cell| c.row as usize * map.cols() + c.col as usize;
    let mut seen = vec![false; map.rows() * map.cols()];
    if !map.is_cell_walkable(from) {
        return Vec::new();
    }
    seen[index(from)] = true;
    let mut out = vec![(from, 0)];
    let mut queue = VecDeque::from([(from, 0u32)]);

    while let Some((cell, d)) = queue.pop_front() {
        for next in map.walkable_neighbors(cell) {
            if !seen[index(next)] {
                seen[index(next)] = true;
                out.push((next, d + 1));
                queue.push_back((next, d + 1));
            }
        }
    }
    out
}

fn pick_enemy_cells<R: Rng + ?Sized>(
    map: &GridMap,
    distances: &[(Cell, u32)],
    wanted: usize,
    rng: &mut R,
) -> Vec<Cell> {
    let reserved = |c: Cell| Some(c) == map.start() || map.is_stair(c);

    // Keep enemies off the entry's doorstep.
    let (mut dead_ends, mut others): (Vec<Cell>, Vec<Cell>) = distances
        .iter()
        .filter(|(c, d)| *d >= 2 && !reserved(*c))
        .map(|(c, _)| *c)
        .partition(|c| map.walkable_neighbors(*c).count() == 1);

    dead_ends.shuffle(rng);
    others.shuffle(rng);
    dead_ends.into_iter().chain(others).take(wanted).collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn maze(rows: usize, cols: usize, enemies: usize, seed: u64) -> GridMap {
        generate(rows, cols, enemies, &mut StdRng::seed_from_u64(seed)).unwrap()
    }

    #[test]
    fn too_small_is_rejected() {
        let err = generate(2, 9, 0, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert_eq!(err, CoreError::MazeTooSmall { rows: 2, cols: 9 });
    }

    #[test]
    fn oversized_maze_is_an_error() {
        let err = generate(usize::MAX, 5, 0, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert_eq!(
            err,
            CoreError::MapTooLarge {
                rows: usize::MAX,
                cols: 5
            }
        );
    }

    #[test]
    fn large_maze_is_fully_reachable() {
        let map = maze(201, 201, 4, 9);
        assert_eq!(map.walkable_count(), 100 * 100 * 2 - 1);
        assert_eq!(
            walk_distances(&map, Cell::new(1, 1)).len(),
            map.walkable_count()
        );
        assert!(map.stair().is_some());
    }

    #[test]
    fn same_seed_same_maze() {
        assert_eq!(maze(11, 15, 3, 7), maze(11, 15, 3, 7));
    }

    #[test]
    fn border_is_solid() {
        let map = maze(9, 9, 0, 3);
        for i in 0..9 {
            assert!(!map.is_walkable(0, i));
            assert!(!map.is_walkable(8, i));
            assert!(!map.is_walkable(i, 0));
            assert!(!map.is_walkable(i, 8));
        }
    }

    #[test]
    fn smallest_maze_has_one_cell_and_no_stair() {
        let map = maze(3, 3, 2, 0);
        assert_eq!(map.walkable_count(), 1);
        assert_eq!(map.start(), Some(Cell::new(1, 1)));
        assert_eq!(map.stair(), None);
        assert!(map.enemies().is_empty());
    }

    proptest! {
        #[test]
        fn every_room_is_reachable_and_markers_are_on_floor(
            half_rows in 1usize..7,
            half_cols in 1usize..7,
            enemies in 0usize..4,
            seed in any::<u64>(),
        ) {
            let (rows, cols) = (half_rows * 2 + 1, half_cols * 2 + 1);
            let map = maze(rows, cols, enemies, seed);

            // A perfect maze over the odd lattice opens every room plus one
            // passage per tree edge.
            let rooms = half_rows * half_cols;
            prop_assert_eq!(map.walkable_count(), rooms * 2 - 1);
            prop_assert_eq!(walk_distances(&map, Cell::new(1, 1)).len(), map.walkable_count());

            if let Some(stair) = map.stair() {
                prop_assert!(map.is_cell_walkable(stair));
            }
            prop_assert!(map.enemies().len() <= enemies);
            for e in map.enemies() {
                prop_assert!(map.is_cell_walkable(*e));
                prop_assert!(!map.is_stair(*e));
                prop_assert_ne!(Some(*e), map.start());
            }
        }
    }
}
