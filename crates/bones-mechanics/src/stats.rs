//! Combatant statistics.

use serde::{Deserialize, Serialize};

/// Health and combat attributes for one side of a fight.
///
/// `health` and the transient fields are runtime state; a stat block read
/// from configuration should be passed through [`CombatStats::restored`]
/// before use so that it starts at full health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatStats {
    /// Display name used in the combat log.
    pub name: String,
    /// Upper bound for `health`.
    pub max_health: i32,
    /// Current health. The side is defeated at zero or below.
    #[serde(skip)]
    pub health: i32,
    /// Offensive rating fed to the damage formula.
    pub attack: i32,
    /// Defensive rating fed to the damage formula.
    pub defense: i32,
    /// Damage staged against this side but not yet applied.
    #[serde(skip)]
    pub pending_damage: i32,
    /// Set by a defend action; halves the next application of pending damage.
    #[serde(skip)]
    pub guarding: bool,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self::new("combatant", 20, 5, 1)
    }
}

impl CombatStats {
    /// Create a stat block at full health.
    pub fn new(name: impl Into<String>, max_health: i32, attack: i32, defense: i32) -> Self {
        Self {
            name: name.into(),
            max_health,
            health: max_health,
            attack,
            defense,
            pending_damage: 0,
            guarding: false,
        }
    }

    /// Return a copy reset to full health with no staged damage or guard.
    pub fn restored(mut self) -> Self {
        self.restore();
        self
    }

    /// Reset to full health and clear transient state.
    pub fn restore(&mut self) {
        self.health = self.max_health;
        self.pending_damage = 0;
        self.guarding = false;
    }

    /// Return `true` once health has dropped to zero or below.
    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }

    /// Apply all pending damage to health and return the amount dealt.
    ///
    /// An active guard halves the damage (rounding down) and is consumed.
    pub fn apply_pending(&mut self) -> i32 {
        let mut dealt = self.pending_damage.max(0);
        if self.guarding && dealt > 0 {
            dealt /= 2;
            self.guarding = false;
        }
        self.health -= dealt;
        self.pending_damage = 0;
        dealt
    }

    /// Restore up to `amount` health, capped at `max_health`. Returns the amount healed.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.health = (self.health + amount.max(0)).min(self.max_health);
        self.health - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stats_start_full() {
        let stats = CombatStats::new("Knight", 30, 6, 2);
        assert_eq!(stats.health, 30);
        assert!(!stats.is_defeated());
    }

    #[test]
    fn guard_halves_damage_once() {
        let mut stats = CombatStats::new("Knight", 30, 6, 2);
        stats.guarding = true;
        stats.pending_damage = 9;
        assert_eq!(stats.apply_pending(), 4);
        assert!(!stats.guarding);
        stats.pending_damage = 9;
        assert_eq!(stats.apply_pending(), 9);
        assert_eq!(stats.health, 17);
    }

    #[test]
    fn heal_caps_at_max() {
        let mut stats = CombatStats::new("Knight", 10, 1, 1);
        stats.health = 8;
        assert_eq!(stats.heal(5), 2);
        assert_eq!(stats.health, 10);
    }

    #[test]
    fn restored_clears_runtime_state() {
        let mut stats = CombatStats::new("Knight", 10, 1, 1);
        stats.health = -3;
        stats.guarding = true;
        stats.pending_damage = 4;
        let stats = stats.restored();
        assert_eq!(stats.health, 10);
        assert_eq!(stats.pending_damage, 0);
        assert!(!stats.guarding);
    }

    #[test]
    fn negative_pending_damage_is_ignored() {
        let mut stats = CombatStats::new("Knight", 10, 1, 1);
        stats.pending_damage = -5;
        assert_eq!(stats.apply_pending(), 0);
        assert_eq!(stats.health, 10);
    }
}
