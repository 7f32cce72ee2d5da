//! Turn-based combat round state machine.
//!
//! A round starts on the player's turn. Each call to [`CombatRound::act`]
//! lets the side whose turn it is apply one action to the other side, then
//! either resolves the round (someone's health reached zero) or hands the
//! turn over. Once resolved, the round stays resolved until [`CombatRound::reset`].

pub mod action;

pub use action::{ActionEffect, ActionKind, CombatEvent, DamageFormula, StandardFormula};

use crate::error::{CombatError, CombatResult};
use crate::stats::CombatStats;

/// One side of a fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The player character.
    Player,
    /// The opposing creature.
    Enemy,
}

impl Side {
    /// The other side.
    pub fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Enemy => write!(f, "enemy"),
        }
    }
}

/// Where a round currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// Waiting for the player's action.
    PlayerTurn,
    /// Waiting for the enemy's action.
    EnemyTurn,
    /// A side was defeated. Sticky until reset.
    Resolved {
        /// The side left standing.
        winner: Side,
    },
}

/// The result of a single accepted action.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The logged action.
    pub event: CombatEvent,
    /// State after the action was applied.
    pub state: RoundState,
}

/// Resolver for one fight between the player and a single enemy.
#[derive(Debug)]
pub struct CombatRound {
    state: RoundState,
    player: CombatStats,
    enemy: CombatStats,
    round: u32,
    log: Vec<CombatEvent>,
    formula: Box<dyn DamageFormula>,
}

impl CombatRound {
    /// Start a fight on the player's turn using [`StandardFormula`].
    pub fn new(player: CombatStats, enemy: CombatStats) -> Self {
        Self {
            state: RoundState::PlayerTurn,
            player,
            enemy,
            round: 1,
            log: Vec::new(),
            formula: Box::new(StandardFormula),
        }
    }

    /// Replace the damage formula.
    pub fn with_formula<F: DamageFormula + 'static>(mut self, formula: F) -> Self {
        self.formula = Box::new(formula);
        self
    }

    /// Apply `action` for whichever side's turn it is.
    ///
    /// Returns [`CombatError::AlreadyResolved`] without touching any state
    /// once the round has a winner.
    pub fn act(&mut self, action: ActionKind) -> CombatResult<TurnOutcome> {
        let side = match self.state {
            RoundState::PlayerTurn => Side::Player,
            RoundState::EnemyTurn => Side::Enemy,
            RoundState::Resolved { winner } => {
                return Err(CombatError::AlreadyResolved { winner });
            }
        };

        let (actor, target) = match side {
            Side::Player => (&mut self.player, &mut self.enemy),
            Side::Enemy => (&mut self.enemy, &mut self.player),
        };

        let effect = self.formula.effect(action, actor, target);
        if effect.guard {
            actor.guarding = true;
        }
        let healed = actor.heal(effect.heal);
        target.pending_damage += effect.damage;
        let damage = target.apply_pending();

        let description = match action {
            ActionKind::Attack | ActionKind::HeavyAttack => format!(
                "{} uses {action} on {} for {damage} damage ({} hp left)",
                actor.name, target.name, target.health
            ),
            ActionKind::Defend => format!("{} raises a guard", actor.name),
            ActionKind::Heal => format!("{} heals {healed} hp", actor.name),
        };
        tracing::debug!(round = self.round, %side, %action, damage, "{description}");

        let next = if target.is_defeated() {
            RoundState::Resolved { winner: side }
        } else if actor.is_defeated() {
            RoundState::Resolved {
                winner: side.opponent(),
            }
        } else {
            match side {
                Side::Player => RoundState::EnemyTurn,
                Side::Enemy => RoundState::PlayerTurn,
            }
        };

        let event = CombatEvent {
            round: self.round,
            side,
            action,
            damage,
            healed,
            description,
        };
        self.log.push(event.clone());

        if let RoundState::Resolved { winner } = next {
            tracing::info!(%winner, rounds = self.round, "combat round resolved");
        } else if next == RoundState::PlayerTurn {
            self.round += 1;
        }
        self.state = next;

        Ok(TurnOutcome { event, state: next })
    }

    /// Start a new fight against `enemy`, keeping the player's current stats.
    pub fn reset(&mut self, enemy: CombatStats) {
        self.enemy = enemy;
        self.player.pending_damage = 0;
        self.player.guarding = false;
        self.state = RoundState::PlayerTurn;
        self.round = 1;
        self.log.clear();
    }

    /// Current state.
    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Return `true` once a winner has been decided.
    pub fn is_resolved(&self) -> bool {
        matches!(self.state, RoundState::Resolved { .. })
    }

    /// The winning side, if the round is resolved.
    pub fn winner(&self) -> Option<Side> {
        match self.state {
            RoundState::Resolved { winner } => Some(winner),
            _ => None,
        }
    }

    /// The losing side, if the round is resolved.
    pub fn loser(&self) -> Option<Side> {
        self.winner().map(Side::opponent)
    }

    /// The side expected to act next, or `None` when resolved.
    pub fn active_side(&self) -> Option<Side> {
        match self.state {
            RoundState::PlayerTurn => Some(Side::Player),
            RoundState::EnemyTurn => Some(Side::Enemy),
            RoundState::Resolved { .. } => None,
        }
    }

    /// Exchange counter (1-based).
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Player stats.
    pub fn player(&self) -> &CombatStats {
        &self.player
    }

    /// Mutable player stats, e.g. to heal between fights.
    pub fn player_mut(&mut self) -> &mut CombatStats {
        &mut self.player
    }

    /// Enemy stats.
    pub fn enemy(&self) -> &CombatStats {
        &self.enemy
    }

    /// All actions taken since the last reset.
    pub fn log(&self) -> &[CombatEvent] {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knight() -> CombatStats {
        CombatStats::new("Knight", 30, 8, 2)
    }

    fn skeleton() -> CombatStats {
        CombatStats::new("Skeleton", 12, 4, 1)
    }

    #[test]
    fn starts_on_player_turn() {
        let round = CombatRound::new(knight(), skeleton());
        assert_eq!(round.state(), RoundState::PlayerTurn);
        assert_eq!(round.active_side(), Some(Side::Player));
        assert!(!round.is_resolved());
    }

    #[test]
    fn turns_alternate_and_round_counter_advances() {
        let mut round = CombatRound::new(knight(), CombatStats::new("Ogre", 100, 4, 1));
        let out = round.act(ActionKind::Attack).unwrap();
        assert_eq!(out.state, RoundState::EnemyTurn);
        assert_eq!(out.event.side, Side::Player);
        assert_eq!(round.round(), 1);

        let out = round.act(ActionKind::Attack).unwrap();
        assert_eq!(out.state, RoundState::PlayerTurn);
        assert_eq!(out.event.side, Side::Enemy);
        assert_eq!(round.round(), 2);
        assert_eq!(round.player().health, 28);
        assert_eq!(round.enemy().health, 93);
    }

    #[test]
    fn lethal_player_action_resolves_with_enemy_losing() {
        let mut round = CombatRound::new(knight(), CombatStats::new("Rat", 5, 1, 0));
        let out = round.act(ActionKind::Attack).unwrap();
        assert_eq!(
            out.state,
            RoundState::Resolved {
                winner: Side::Player
            }
        );
        assert_eq!(round.loser(), Some(Side::Enemy));
        assert!(round.enemy().is_defeated());
    }

    #[test]
    fn resolved_round_is_sticky() {
        let mut round = CombatRound::new(knight(), CombatStats::new("Rat", 5, 1, 0));
        round.act(ActionKind::Attack).unwrap();
        let before_player = round.player().clone();
        let before_enemy = round.enemy().clone();
        let log_len = round.log().len();

        for action in ActionKind::ALL {
            assert_eq!(
                round.act(action),
                Err(CombatError::AlreadyResolved {
                    winner: Side::Player
                })
            );
        }
        assert_eq!(round.player(), &before_player);
        assert_eq!(round.enemy(), &before_enemy);
        assert_eq!(round.log().len(), log_len);
    }

    #[test]
    fn enemy_can_win() {
        let mut round = CombatRound::new(
            CombatStats::new("Squire", 3, 1, 0),
            CombatStats::new("Troll", 50, 9, 0),
        );
        round.act(ActionKind::Defend).unwrap();
        let out = round.act(ActionKind::Attack).unwrap();
        // Guard halves 9 to 4.
        assert_eq!(out.event.damage, 4);
        assert_eq!(out.state, RoundState::Resolved { winner: Side::Enemy });
        assert_eq!(round.loser(), Some(Side::Player));
    }

    #[test]
    fn heal_restores_actor_without_damage() {
        let mut round = CombatRound::new(knight(), CombatStats::new("Ogre", 100, 10, 1));
        round.act(ActionKind::Defend).unwrap();
        round.act(ActionKind::Attack).unwrap();
        assert_eq!(round.player().health, 26);
        let out = round.act(ActionKind::Heal).unwrap();
        assert_eq!(out.event.healed, 4);
        assert_eq!(out.event.damage, 0);
        assert_eq!(round.player().health, 30);
    }

    #[test]
    fn reset_keeps_player_health() {
        let mut round = CombatRound::new(knight(), CombatStats::new("Rat", 5, 3, 0));
        round.act(ActionKind::Defend).unwrap();
        round.act(ActionKind::Attack).unwrap();
        round.act(ActionKind::Attack).unwrap();
        assert!(round.is_resolved());
        let hp = round.player().health;

        round.reset(skeleton());
        assert_eq!(round.state(), RoundState::PlayerTurn);
        assert_eq!(round.round(), 1);
        assert!(round.log().is_empty());
        assert_eq!(round.player().health, hp);
        assert_eq!(round.enemy().name, "Skeleton");
    }

    #[test]
    fn custom_formula_is_used() {
        #[derive(Debug)]
        struct OneShot;
        impl DamageFormula for OneShot {
            fn effect(
                &self,
                _action: ActionKind,
                _actor: &CombatStats,
                target: &CombatStats,
            ) -> ActionEffect {
                ActionEffect {
                    damage: target.health,
                    ..ActionEffect::default()
                }
            }
        }

        let mut round =
            CombatRound::new(knight(), CombatStats::new("Dragon", 500, 50, 50)).with_formula(OneShot);
        let out = round.act(ActionKind::Defend).unwrap();
        assert_eq!(out.event.damage, 500);
        assert_eq!(round.winner(), Some(Side::Player));
    }
}
