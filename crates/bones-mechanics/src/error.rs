//! Error types for the combat resolver.

use crate::combat::Side;

/// Errors reported by combat operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CombatError {
    /// The round already has a winner; further actions are ignored.
    #[error("combat round already resolved ({winner} won)")]
    AlreadyResolved {
        /// The side that won the round.
        winner: Side,
    },

    /// An integer action code did not map to a known action.
    #[error("unknown action code: {0}")]
    UnknownAction(i32),
}

/// Convenience result type for combat operations.
pub type CombatResult<T> = Result<T, CombatError>;
