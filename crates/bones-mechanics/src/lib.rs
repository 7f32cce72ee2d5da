//! Combat mechanics for the Bones engine.
//!
//! A [`CombatRound`] is a small turn-based state machine: the player acts,
//! then the enemy, until one side's health drops to zero. Damage numbers
//! come from a pluggable [`DamageFormula`]; the resolver itself only owns
//! turn order, terminal detection and the combat log.

pub mod combat;
pub mod error;
pub mod stats;

pub use combat::{
    ActionEffect, ActionKind, CombatEvent, CombatRound, DamageFormula, RoundState, Side,
    StandardFormula, TurnOutcome,
};
pub use error::{CombatError, CombatResult};
pub use stats::CombatStats;
