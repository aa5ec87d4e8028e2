use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    Direction, EntityId, Position,
    agent::AgentSlot,
    config::{EnemyBehaviorMode, GameConfig},
    maze::Maze,
    movement::valid_moves,
};

/// Whether an enemy is closing in or backing off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Pursuit {
    #[default]
    Chase,
    Flee,
}

/// Commitment to one agent regardless of which one is nearer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockOn {
    pub target: AgentSlot,
    /// Evaluations left before the lock is released.
    pub remaining: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnemyBehavior {
    pub pursuit: Pursuit,
    pub lock: Option<LockOn>,
}

/// What an enemy knows about one agent when it decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetInfo {
    pub slot: AgentSlot,
    pub pos: Position,
    pub powered: bool,
}

/// A maze enemy. Moves one whole cell per enemy tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EntityId,
    pub grid_pos: Position,
    /// Cell occupied before the most recent move.
    pub previous_pos: Position,
    pub direction: Direction,
    pub behavior: EnemyBehavior,
}

impl Enemy {
    pub fn new(id: EntityId, pos: Position) -> Self {
        Enemy {
            id,
            grid_pos: pos,
            previous_pos: pos,
            direction: Direction::None,
            behavior: EnemyBehavior::default(),
        }
    }

    /// Sends a defeated enemy to `pos`, dropping any lock.
    pub fn respawn(&mut self, pos: Position) {
        self.grid_pos = pos;
        self.previous_pos = pos;
        self.direction = Direction::None;
        self.behavior = EnemyBehavior::default();
    }

    /// Nearer agent by Manhattan distance; ties go to the first entry.
    fn nearer(&self, targets: &[TargetInfo]) -> Option<TargetInfo> {
        targets
            .iter()
            .copied()
            .min_by_key(|t| t.pos.manhattan(&self.grid_pos))
    }

    fn select_target(&mut self, targets: &[TargetInfo], config: &GameConfig) -> Option<TargetInfo> {
        if config.enemy_behavior == EnemyBehaviorMode::Greedy {
            return self.nearer(targets);
        }

        if let Some(lock) = self.behavior.lock.as_mut() {
            let locked = targets
                .iter()
                .copied()
                .find(|t| t.slot == lock.target)
                .filter(|t| t.pos.manhattan(&self.grid_pos) <= config.lock_on_radius);
            match locked {
                Some(target) => {
                    lock.remaining = lock.remaining.saturating_sub(1);
                    if lock.remaining == 0 {
                        self.behavior.lock = None;
                    }
                    return Some(target);
                }
                None => {
                    trace!(enemy = self.id, "locked target out of range");
                    self.behavior.lock = None;
                }
            }
        }

        let target = self.nearer(targets)?;
        if target.pos.manhattan(&self.grid_pos) <= config.lock_on_radius && config.lock_on_moves > 0 {
            trace!(enemy = self.id, target = ?target.slot, "enemy locked on");
            self.behavior.lock = Some(LockOn {
                target: target.slot,
                remaining: config.lock_on_moves,
            });
        }
        Some(target)
    }

    /// One greedy step toward (or away from) the chosen agent. Stays put when
    /// boxed in or when there is nobody to chase.
    ///
    /// # Arguments
    ///
    /// * `maze`: The level maze.
    /// * `targets`: Every agent the enemy may pursue, player first.
    /// * `config`: Targeting mode and lock-on parameters.
    pub fn take_turn(&mut self, maze: &Maze, targets: &[TargetInfo], config: &GameConfig) {
        self.previous_pos = self.grid_pos;
        let Some(target) = self.select_target(targets, config) else {
            self.direction = Direction::None;
            return;
        };
        self.behavior.pursuit = if target.powered {
            Pursuit::Flee
        } else {
            Pursuit::Chase
        };

        let mut best: Option<(Direction, Position, usize)> = None;
        for (direction, next) in valid_moves(maze, self.grid_pos) {
            let dist = next.manhattan(&target.pos);
            let better = match (best, self.behavior.pursuit) {
                (None, _) => true,
                (Some((_, _, d)), Pursuit::Chase) => dist < d,
                (Some((_, _, d)), Pursuit::Flee) => dist > d,
            };
            if better {
                best = Some((direction, next, dist));
            }
        }

        match best {
            Some((direction, next, _)) => {
                self.direction = direction;
                self.grid_pos = next;
            }
            None => self.direction = Direction::None,
        }
    }
}
