//! Walkability grid with distinguished cells.
//!
//! Rows map to the world X axis and columns to the world Y axis; a position
//! converts to a cell by dividing each axis by the cell size and flooring.

use std::fmt;

use glam::Vec3;

use crate::error::{CoreError, CoreResult};

/// Default edge length of one cell in world units.
pub const DEFAULT_CELL_SIZE: f32 = 100.0;

/// A grid coordinate. May lie outside any particular map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    /// Row index.
    pub row: i32,
    /// Column index.
    pub col: i32,
}

impl Cell {
    /// Construct a cell.
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A rectangular grid of walkable/blocked cells.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMap {
    rows: usize,
    cols: usize,
    walkable: Vec<bool>,
    cell_size: f32,
    start: Option<Cell>,
    stair: Option<Cell>,
    player: Option<Cell>,
    enemies: Vec<Cell>,
}

impl GridMap {
    /// A map where every cell is blocked, rejecting sizes whose cell count
    /// overflows or whose sides do not fit in a [`Cell`] coordinate.
    pub fn try_new(rows: usize, cols: usize) -> CoreResult<Self> {
        let max_side = i32::MAX as usize;
        if rows > max_side || cols > max_side || rows.checked_mul(cols).is_none() {
            return Err(CoreError::MapTooLarge { rows, cols });
        }
        Ok(Self::new(rows, cols))
    }

    /// A map where every cell is blocked.
    ///
    /// For sizes that come from outside the program, use
    /// [`GridMap::try_new`].
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            walkable: vec![false; rows * cols],
            cell_size: DEFAULT_CELL_SIZE,
            start: None,
            stair: None,
            player: None,
            enemies: Vec::new(),
        }
    }

    /// A map where every cell is walkable.
    pub fn open(rows: usize, cols: usize) -> Self {
        let mut map = Self::new(rows, cols);
        map.walkable.fill(true);
        map
    }

    /// Builder: change the cell size used for position conversion.
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Edge length of one cell in world units.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn index(&self, row: i32, col: i32) -> Option<usize> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    /// Whether (`row`, `col`) is inside the grid.
    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        self.index(row, col).is_some()
    }

    /// Whether a mover may enter (`row`, `col`). Out of bounds reads as blocked.
    pub fn is_walkable(&self, row: i32, col: i32) -> bool {
        self.index(row, col).is_some_and(|i| self.walkable[i])
    }

    /// [`GridMap::is_walkable`] for a [`Cell`].
    pub fn is_cell_walkable(&self, cell: Cell) -> bool {
        self.is_walkable(cell.row, cell.col)
    }

    /// Set a cell's walkability. Out-of-bounds writes are ignored.
    pub fn set_walkable(&mut self, row: i32, col: i32, walkable: bool) {
        if let Some(i) = self.index(row, col) {
            self.walkable[i] = walkable;
        }
    }

    /// Count of walkable cells.
    pub fn walkable_count(&self) -> usize {
        self.walkable.iter().filter(|w| **w).count()
    }

    /// Walkable in-bounds neighbours of `cell` (up, down, left, right).
    pub fn walkable_neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .into_iter()
            .map(move |(dr, dc)| Cell::new(cell.row + dr, cell.col + dc))
            .filter(|c| self.is_cell_walkable(*c))
    }

    // -----------------------------------------------------------------------
    // Distinguished cells
    // -----------------------------------------------------------------------

    /// Where the player enters the level.
    pub fn start(&self) -> Option<Cell> {
        self.start
    }

    /// Set the entry cell.
    pub fn set_start_map_pos(&mut self, row: i32, col: i32) {
        self.start = Some(Cell::new(row, col));
    }

    /// The exit to the next level.
    pub fn stair(&self) -> Option<Cell> {
        self.stair
    }

    /// Set the exit cell.
    pub fn set_stair_map_pos(&mut self, row: i32, col: i32) {
        self.stair = Some(Cell::new(row, col));
    }

    /// The player's last reported cell.
    pub fn player(&self) -> Option<Cell> {
        self.player
    }

    /// Record the player's cell.
    pub fn set_player_map_pos(&mut self, row: i32, col: i32) {
        self.player = Some(Cell::new(row, col));
    }

    /// Enemy spawn cells in insertion order.
    pub fn enemies(&self) -> &[Cell] {
        &self.enemies
    }

    /// Add an enemy spawn cell. Duplicates are ignored.
    pub fn set_enemy_map_pos(&mut self, row: i32, col: i32) {
        let cell = Cell::new(row, col);
        if !self.enemies.contains(&cell) {
            self.enemies.push(cell);
        }
    }

    /// Whether an enemy occupies `cell`.
    pub fn has_enemy(&self, cell: Cell) -> bool {
        self.enemies.contains(&cell)
    }

    /// Forget an enemy cell. Returns whether one was there.
    pub fn remove_enemy(&mut self, cell: Cell) -> bool {
        let before = self.enemies.len();
        self.enemies.retain(|c| *c != cell);
        self.enemies.len() != before
    }

    /// Whether `cell` is the exit.
    pub fn is_stair(&self, cell: Cell) -> bool {
        self.stair == Some(cell)
    }

    // -----------------------------------------------------------------------
    // World-space conversion
    // -----------------------------------------------------------------------

    /// The cell containing `position`.
    ///
    /// Divides by the cell size and rounds toward negative infinity, which
    /// truncates for on-grid positions and keeps negative coordinates outside
    /// row and column 0.
    pub fn cell_of(&self, position: Vec3) -> Cell {
        Cell::new(
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    /// The world position an actor standing on `cell` is placed at.
    pub fn position_of(&self, cell: Cell) -> Vec3 {
        Vec3::new(
            cell.row as f32 * self.cell_size,
            cell.col as f32 * self.cell_size,
            0.0,
        )
    }

    // -----------------------------------------------------------------------
    // Text form
    // -----------------------------------------------------------------------

    /// Parse a map drawn with `#` (wall), `.` (floor), `S` (start),
    /// `X` (stair), `E` (enemy) and `P` (player). All but `#` are walkable.
    /// Blank lines and surrounding whitespace are ignored.
    pub fn from_ascii(text: &str) -> CoreResult<Self> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let cols = lines.first().ok_or(CoreError::EmptyMap)?.chars().count();
        let mut map = Self::new(lines.len(), cols);

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(CoreError::RaggedRow {
                    row,
                    expected: cols,
                    found,
                });
            }
            for (col, symbol) in line.chars().enumerate() {
                let (r, c) = (row as i32, col as i32);
                match symbol {
                    '#' => {}
                    '.' => map.set_walkable(r, c, true),
                    'S' => {
                        map.set_walkable(r, c, true);
                        map.set_start_map_pos(r, c);
                    }
                    'X' => {
                        map.set_walkable(r, c, true);
                        map.set_stair_map_pos(r, c);
                    }
                    'E' => {
                        map.set_walkable(r, c, true);
                        map.set_enemy_map_pos(r, c);
                    }
                    'P' => {
                        map.set_walkable(r, c, true);
                        map.set_player_map_pos(r, c);
                    }
                    other => {
                        return Err(CoreError::UnknownSymbol {
                            symbol: other,
                            row,
                            col,
                        });
                    }
                }
            }
        }
        Ok(map)
    }

    /// Render in the [`GridMap::from_ascii`] format, one line per row.
    ///
    /// When markers overlap, the player wins over enemies, which win over
    /// the stair, which wins over the start.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols + 1));
        for row in 0..self.rows as i32 {
            for col in 0..self.cols as i32 {
                let cell = Cell::new(row, col);
                let symbol = if !self.is_cell_walkable(cell) {
                    '#'
                } else if self.player == Some(cell) {
                    'P'
                } else if self.has_enemy(cell) {
                    'E'
                } else if self.is_stair(cell) {
                    'X'
                } else if self.start == Some(cell) {
                    'S'
                } else {
                    '.'
                };
                out.push(symbol);
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for GridMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii())
    }
}
