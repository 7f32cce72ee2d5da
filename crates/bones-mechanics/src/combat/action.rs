//! Combat actions, their effects, and the combat log entry type.

use serde::{Deserialize, Serialize};

use crate::error::CombatError;
use crate::stats::CombatStats;

use super::Side;

/// An action a side can take on its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// A standard strike.
    Attack,
    /// A stronger strike that ignores the attacker's own guard.
    HeavyAttack,
    /// Halve the next incoming damage.
    Defend,
    /// Restore a quarter of maximum health.
    Heal,
}

impl ActionKind {
    /// Every action, in code order.
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Attack,
        ActionKind::HeavyAttack,
        ActionKind::Defend,
        ActionKind::Heal,
    ];

    /// Map a single-letter script symbol (`a`, `h`, `d`, `r`) to an action.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_lowercase() {
            'a' => Some(Self::Attack),
            'h' => Some(Self::HeavyAttack),
            'd' => Some(Self::Defend),
            'r' => Some(Self::Heal),
            _ => None,
        }
    }
}

impl TryFrom<i32> for ActionKind {
    type Error = CombatError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or(CombatError::UnknownAction(code))
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attack => write!(f, "attack"),
            Self::HeavyAttack => write!(f, "heavy attack"),
            Self::Defend => write!(f, "defend"),
            Self::Heal => write!(f, "heal"),
        }
    }
}

/// What an action does, as computed by a [`DamageFormula`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionEffect {
    /// Damage staged against the opposing side.
    pub damage: i32,
    /// Health restored to the acting side.
    pub heal: i32,
    /// Whether the acting side raises its guard.
    pub guard: bool,
}

/// The numeric rules behind combat actions.
///
/// Implementations must be deterministic: the same action and stats always
/// produce the same effect.
pub trait DamageFormula: std::fmt::Debug {
    /// Compute the effect of `action` taken by `actor` against `target`.
    fn effect(&self, action: ActionKind, actor: &CombatStats, target: &CombatStats)
    -> ActionEffect;
}

/// Default formula: attack minus defense with a floor of one.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFormula;

impl DamageFormula for StandardFormula {
    fn effect(
        &self,
        action: ActionKind,
        actor: &CombatStats,
        target: &CombatStats,
    ) -> ActionEffect {
        match action {
            ActionKind::Attack => ActionEffect {
                damage: (actor.attack - target.defense).max(1),
                ..ActionEffect::default()
            },
            ActionKind::HeavyAttack => ActionEffect {
                damage: (actor.attack * 3 / 2 - target.defense).max(1),
                ..ActionEffect::default()
            },
            ActionKind::Defend => ActionEffect {
                guard: true,
                ..ActionEffect::default()
            },
            ActionKind::Heal => ActionEffect {
                heal: (actor.max_health / 4).max(1),
                ..ActionEffect::default()
            },
        }
    }
}

/// A recorded combat action.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatEvent {
    /// Exchange number the action happened in (1-based).
    pub round: u32,
    /// The side that acted.
    pub side: Side,
    /// What it did.
    pub action: ActionKind,
    /// Damage actually applied to the other side.
    pub damage: i32,
    /// Health the acting side regained.
    pub healed: i32,
    /// Human-readable summary.
    pub description: String,
}
