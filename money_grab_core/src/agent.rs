use std::collections::{BTreeSet, VecDeque};

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    Direction, EntityId, Position,
    config::GameConfig,
    coords::CoordinateMapper,
    enemy::Enemy,
    maze::Maze,
    movement::{Motion, valid_moves},
};

/// Which of the two maze runners an agent is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentSlot {
    /// Keyboard-controlled.
    Player,
    /// AI companion.
    Ally,
}

impl AgentSlot {
    pub const BOTH: [AgentSlot; 2] = [AgentSlot::Player, AgentSlot::Ally];

    pub fn index(self) -> usize {
        match self {
            AgentSlot::Player => 0,
            AgentSlot::Ally => 1,
        }
    }
}

/// A player-side runner: position, heading, per-level score and status flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: EntityId,
    pub slot: AgentSlot,
    pub motion: Motion,
    /// Level-start cell; hits send the agent back here.
    pub start: Position,
    pub score: u32,
    pub power_up_active: bool,
    /// Level-clock millisecond at which the power-up lapses.
    pub power_up_expiry_ms: u64,
    /// Ticks left on the "grabbing" pickup animation.
    pub grab_ticks_remaining: u32,
    /// Most recently entered cells, newest last.
    pub recent_cells: VecDeque<Position>,
}

impl Agent {
    pub fn new(id: EntityId, slot: AgentSlot, start: Position, mapper: &CoordinateMapper) -> Self {
        Agent {
            id,
            slot,
            motion: Motion::at(start, mapper),
            start,
            score: 0,
            power_up_active: false,
            power_up_expiry_ms: 0,
            grab_ticks_remaining: 0,
            recent_cells: VecDeque::new(),
        }
    }

    pub fn position(&self) -> Position {
        self.motion.grid_pos
    }

    pub fn is_grabbing(&self) -> bool {
        self.grab_ticks_remaining > 0
    }

    pub fn grant_power_up(&mut self, now_ms: u64, duration_ms: u64) {
        self.power_up_expiry_ms = now_ms + duration_ms;
        self.power_up_active = true;
    }

    pub fn clear_power_up(&mut self) {
        self.power_up_active = false;
        self.power_up_expiry_ms = 0;
    }

    /// Reconciles the flag with the clock. Returns true when it just lapsed.
    pub fn expire_power_up(&mut self, now_ms: u64) -> bool {
        let was_active = self.power_up_active;
        self.power_up_active = now_ms < self.power_up_expiry_ms;
        was_active && !self.power_up_active
    }

    /// Score penalty, floored at zero.
    pub fn penalize(&mut self, points: u32) {
        self.score = self.score.saturating_sub(points);
    }

    /// Back to the level-start cell with no heading and no cell history.
    pub fn respawn(&mut self, mapper: &CoordinateMapper) {
        self.motion.teleport(self.start, mapper);
        self.recent_cells.clear();
    }

    pub fn remember(&mut self, cell: Position, capacity: usize) {
        if capacity == 0 {
            return;
        }
        while self.recent_cells.len() >= capacity {
            self.recent_cells.pop_front();
        }
        self.recent_cells.push_back(cell);
    }
}

/// Read-only view of the level handed to a [`Pilot`].
#[derive(Debug)]
pub struct FieldView<'a> {
    pub maze: &'a Maze,
    pub collectibles: &'a BTreeSet<Position>,
    pub power_ups: &'a BTreeSet<Position>,
    pub enemies: &'a [Enemy],
}

/// Decision maker for an agent that is not keyboard-driven.
pub trait Pilot {
    /// Called on ticks where the agent sits on a cell centre. The returned
    /// direction is queued exactly like player input.
    fn steer(&mut self, agent: &Agent, view: &FieldView) -> Direction;
}

/// A pilot that never moves.
#[derive(Debug, Default)]
pub struct IdlePilot;

impl Pilot for IdlePilot {
    fn steer(&mut self, _agent: &Agent, _view: &FieldView) -> Direction {
        Direction::None
    }
}

/// The companion AI: collects greedily, prefers power-ups, flees close enemies
/// and avoids bouncing between the same few cells.
#[derive(Debug)]
pub struct AllyPilot {
    rng: StdRng,
    flee_radius: usize,
    power_seek_radius: usize,
    danger_radius: usize,
    danger_penalty: usize,
    random_move_chance: f64,
}

impl AllyPilot {
    pub fn new(config: &GameConfig, seed: u64) -> Self {
        AllyPilot {
            rng: StdRng::seed_from_u64(seed),
            flee_radius: config.ally_flee_radius,
            power_seek_radius: config.ally_power_seek_radius,
            danger_radius: config.ally_danger_radius,
            danger_penalty: config.ally_danger_penalty,
            random_move_chance: config.ally_random_move_chance,
        }
    }

    fn nearest_enemy_distance(enemies: &[Enemy], cell: &Position) -> Option<usize> {
        enemies.iter().map(|e| e.grid_pos.manhattan(cell)).min()
    }

    /// Power-up nearby, else any power-up, else the nearest collectible, else the exit.
    fn pick_target(&self, here: Position, view: &FieldView) -> Position {
        let nearest = |cells: &BTreeSet<Position>| {
            cells
                .iter()
                .copied()
                .min_by_key(|cell| cell.manhattan(&here))
        };
        if let Some(power_up) =
            nearest(view.power_ups).filter(|p| p.manhattan(&here) <= self.power_seek_radius)
        {
            return power_up;
        }
        if let Some(power_up) = view.power_ups.first() {
            return *power_up;
        }
        nearest(view.collectibles).unwrap_or(view.maze.exit)
    }
}

impl Pilot for AllyPilot {
    fn steer(&mut self, agent: &Agent, view: &FieldView) -> Direction {
        let here = agent.position();
        let valid = valid_moves(view.maze, here);
        if valid.is_empty() {
            return Direction::None;
        }
        let fresh: Vec<(Direction, Position)> = valid
            .iter()
            .copied()
            .filter(|(_, next)| !agent.recent_cells.contains(next))
            .collect();
        let options = if fresh.is_empty() { valid } else { fresh };

        let chased = Self::nearest_enemy_distance(view.enemies, &here)
            .is_some_and(|d| d <= self.flee_radius);
        if chased {
            let mut best = options[0];
            let mut best_gap = 0;
            for (direction, next) in &options {
                let gap = Self::nearest_enemy_distance(view.enemies, next).unwrap_or(usize::MAX);
                if gap > best_gap {
                    best_gap = gap;
                    best = (*direction, *next);
                }
            }
            trace!(agent = agent.id, direction = ?best.0, "ally fleeing");
            return best.0;
        }

        if self.rng.random_bool(self.random_move_chance) {
            let pick = options[self.rng.random_range(0..options.len())].0;
            trace!(agent = agent.id, direction = ?pick, "ally random move");
            return pick;
        }

        let target = self.pick_target(here, view);
        let mut best = Direction::None;
        let mut best_score = usize::MAX;
        for (direction, next) in &options {
            let mut score = next.manhattan(&target);
            if Self::nearest_enemy_distance(view.enemies, next)
                .is_some_and(|d| d <= self.danger_radius)
            {
                score += self.danger_penalty;
            }
            if score < best_score {
                best_score = score;
                best = *direction;
            }
        }
        trace!(agent = agent.id, ?target, direction = ?best, "ally seeking");
        best
    }
}
