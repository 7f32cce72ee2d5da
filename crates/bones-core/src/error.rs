/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building maps.
///
/// Simulation operations themselves do not fail: out-of-bounds queries read
/// as blocked and removing an unknown actor is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// The map text contained no rows.
    #[error("map is empty")]
    EmptyMap,

    /// A map row had a different width than the first row.
    #[error("map row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },

    /// An unrecognized cell symbol.
    #[error("unknown map symbol '{symbol}' at ({row}, {col})")]
    UnknownSymbol {
        /// The character found.
        symbol: char,
        /// Row of the symbol.
        row: usize,
        /// Column of the symbol.
        col: usize,
    },

    /// The requested dimensions do not fit in memory or in cell coordinates.
    #[error("map of {rows}x{cols} cells is too large")]
    MapTooLarge {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
    },

    /// The requested maze dimensions cannot hold a corridor.
    #[error("maze must be at least 3x3, got {rows}x{cols}")]
    MazeTooSmall {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
    },
}
