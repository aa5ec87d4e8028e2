//! One level of play: the maze, its pickups, both agents and the enemy pack,
//! advanced one fixed tick at a time.

use std::{collections::BTreeSet, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Direction, Position,
    agent::{Agent, AgentSlot, FieldView, Pilot},
    config::{ContactRule, GameConfig},
    coords::CoordinateMapper,
    enemy::{Enemy, TargetInfo},
    maze::Maze,
};

/// Something that happened during a tick, for the host to react to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    CollectiblePicked { agent: AgentSlot, at: Position },
    PowerUpPicked { agent: AgentSlot, at: Position },
    PowerUpExpired { agent: AgentSlot },
    /// Lost points and went back to the start cell.
    AgentHit { agent: AgentSlot, at: Position },
    /// Touched an enemy under the strict contact rule.
    AgentCaught { agent: AgentSlot, at: Position },
    EnemyDefeated { agent: AgentSlot, enemy: usize },
    PowerClash { at: Position },
    ExitReached { agent: AgentSlot },
    LevelLoaded { level_index: u32 },
    GameOver { final_score: u32, levels_reached: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub level_index: u32,
    pub maze: Arc<Maze>,
    pub collectibles: BTreeSet<Position>,
    pub power_ups: BTreeSet<Position>,
    /// Indexed by [`AgentSlot::index`].
    pub agents: [Agent; 2],
    pub enemies: Vec<Enemy>,
    /// Where defeated enemies reappear.
    pub enemy_respawn: Position,
    /// Level clock, advanced by one tick length per tick.
    pub now_ms: u64,
    enemy_clock_ms: u64,
    enemy_interval_ms: u64,
}

impl Level {
    /// Generates the maze for `level_index` and populates it.
    pub fn generate(level_index: u32, config: &GameConfig) -> Level {
        Level::new(level_index, Maze::generate(level_index), config)
    }

    /// Populates `maze`: agents at the entrance, power-ups in the open corners,
    /// a collectible on every other free cell, enemies in the far corner.
    pub fn new(level_index: u32, maze: Maze, config: &GameConfig) -> Level {
        let mapper = mapper(config);
        let entrance = maze.entrance;
        let ally_start = ally_start(&maze);
        let near_entrance = |pos: &Position| pos.manhattan(&entrance) <= 1;

        let (rows, cols) = (maze.grid.rows(), maze.grid.cols());
        let power_ups: BTreeSet<Position> = [
            Position::new(1, 1),
            Position::new(1, cols - 2),
            Position::new(rows - 2, 1),
            Position::new(rows - 2, cols - 2),
        ]
        .into_iter()
        .filter(|p| maze.is_open(*p) && *p != maze.exit && !near_entrance(p) && *p != ally_start)
        .collect();

        let collectibles: BTreeSet<Position> = maze
            .grid
            .enumerate()
            .map(|(pos, _)| pos)
            .filter(|p| {
                maze.is_open(*p)
                    && *p != maze.exit
                    && *p != ally_start
                    && !near_entrance(p)
                    && !power_ups.contains(p)
            })
            .collect();

        let enemies = spawn_enemies(&maze, ally_start, config.enemy_count(level_index));
        let center = Position::new(rows / 2, cols / 2);
        let enemy_respawn = maze.nearest_open(center).unwrap_or(center);

        Level {
            level_index,
            collectibles,
            power_ups,
            agents: [
                Agent::new(0, AgentSlot::Player, entrance, &mapper),
                Agent::new(1, AgentSlot::Ally, ally_start, &mapper),
            ],
            enemies,
            enemy_respawn,
            now_ms: 0,
            enemy_clock_ms: 0,
            enemy_interval_ms: config.enemy_interval_ms(level_index),
            maze: Arc::new(maze),
        }
    }

    pub fn agent(&self, slot: AgentSlot) -> &Agent {
        &self.agents[slot.index()]
    }

    pub fn agent_mut(&mut self, slot: AgentSlot) -> &mut Agent {
        &mut self.agents[slot.index()]
    }

    /// Sum of both agents' scores on this level.
    pub fn level_score(&self) -> u32 {
        self.agents.iter().map(|a| a.score).sum()
    }

    /// Buffers keyboard input for the player.
    pub fn queue_player(&mut self, direction: Direction) {
        self.agent_mut(AgentSlot::Player).motion.queue(direction);
    }

    /// Advances the level by one tick, applying, in order: player movement and
    /// cell effects, ally decision and movement, enemies (on their own slower
    /// cadence), agent/enemy contact, agent/agent contact and power-up expiry.
    ///
    /// Enemy contact is only judged for agents centred on a cell this tick.
    ///
    /// # Arguments
    ///
    /// * `pilot`: Steers the ally on ticks where it is aligned.
    /// * `config`: Timing, scoring and contact rules.
    ///
    /// Returns every event the tick produced, in the order it happened.
    pub fn tick(&mut self, pilot: &mut dyn Pilot, config: &GameConfig) -> Vec<GameEvent> {
        let mapper = mapper(config);
        let mut events = Vec::new();
        self.now_ms += config.tick_ms;

        for agent in self.agents.iter_mut() {
            agent.grab_ticks_remaining = agent.grab_ticks_remaining.saturating_sub(1);
        }

        let exited = self.advance_agent(AgentSlot::Player, &mapper, config, &mut events);
        if !exited {
            self.steer_ally(pilot, &mapper);
            let exited = self.advance_agent(AgentSlot::Ally, &mapper, config, &mut events);
            if !exited {
                self.advance_enemies(config);
                self.resolve_enemy_contact(&mapper, config, &mut events);
                self.resolve_agent_contact(&mapper, config, &mut events);
            }
        }

        for agent in self.agents.iter_mut() {
            if agent.expire_power_up(self.now_ms) {
                events.push(GameEvent::PowerUpExpired { agent: agent.slot });
            }
        }
        events
    }

    fn steer_ally(&mut self, pilot: &mut dyn Pilot, mapper: &CoordinateMapper) {
        let ally = &self.agents[AgentSlot::Ally.index()];
        if !ally.motion.is_aligned(mapper) {
            return;
        }
        let view = FieldView {
            maze: &self.maze,
            collectibles: &self.collectibles,
            power_ups: &self.power_ups,
            enemies: &self.enemies,
        };
        let direction = pilot.steer(ally, &view);
        self.agent_mut(AgentSlot::Ally).motion.queue(direction);
    }

    /// Moves one agent and applies cell-entry effects. Returns true when the
    /// agent stepped onto the exit.
    fn advance_agent(
        &mut self,
        slot: AgentSlot,
        mapper: &CoordinateMapper,
        config: &GameConfig,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        let agent = &mut self.agents[slot.index()];
        let Some(cell) = agent.motion.advance(&self.maze, mapper, config.agent_speed) else {
            return false;
        };
        agent.remember(cell, config.ally_history_len);
        self.enter_cell(slot, cell, config, events)
    }

    /// Exit, collectible and power-up effects for an agent centred on `cell`.
    /// Cells already emptied are a no-op.
    pub fn enter_cell(
        &mut self,
        slot: AgentSlot,
        cell: Position,
        config: &GameConfig,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        if cell == self.maze.exit {
            events.push(GameEvent::ExitReached { agent: slot });
            return true;
        }
        let now = self.now_ms;
        let agent = &mut self.agents[slot.index()];
        if self.collectibles.remove(&cell) {
            agent.score += config.collectible_points;
            agent.grab_ticks_remaining = config.grab_animation_ticks;
            debug!(agent = ?slot, ?cell, score = agent.score, "collectible picked");
            events.push(GameEvent::CollectiblePicked { agent: slot, at: cell });
        }
        if self.power_ups.remove(&cell) {
            agent.score += config.power_up_points;
            agent.grant_power_up(now, config.power_up_duration_ms);
            debug!(agent = ?slot, ?cell, "power-up picked");
            events.push(GameEvent::PowerUpPicked { agent: slot, at: cell });
        }
        false
    }

    fn advance_enemies(&mut self, config: &GameConfig) {
        self.enemy_clock_ms += config.tick_ms;
        if self.enemy_clock_ms < self.enemy_interval_ms {
            return;
        }
        self.enemy_clock_ms -= self.enemy_interval_ms;

        let targets = self.agents.each_ref().map(|a| TargetInfo {
            slot: a.slot,
            pos: a.position(),
            powered: a.power_up_active,
        });
        for enemy in self.enemies.iter_mut() {
            enemy.take_turn(&self.maze, &targets, config);
        }
    }

    fn resolve_enemy_contact(
        &mut self,
        mapper: &CoordinateMapper,
        config: &GameConfig,
        events: &mut Vec<GameEvent>,
    ) {
        for slot in AgentSlot::BOTH {
            let agent = &mut self.agents[slot.index()];
            if !agent.motion.is_aligned(mapper) {
                continue;
            }
            let at = agent.position();
            let left = agent.motion.last_cell;
            // Sharing a cell, or having swapped cells with the enemy mid-crossing.
            let touching =
                |e: &Enemy| e.grid_pos == at || (left != at && e.previous_pos == at && e.grid_pos == left);
            for enemy in self.enemies.iter_mut().filter(|e| touching(e)) {
                if agent.power_up_active {
                    agent.score += config.enemy_defeat_points;
                    enemy.respawn(self.enemy_respawn);
                    debug!(agent = ?slot, enemy = enemy.id, "enemy defeated");
                    events.push(GameEvent::EnemyDefeated {
                        agent: slot,
                        enemy: enemy.id,
                    });
                    continue;
                }
                match config.contact_rule {
                    ContactRule::Lenient => {
                        agent.penalize(config.hit_penalty);
                        agent.respawn(mapper);
                        debug!(agent = ?slot, ?at, score = agent.score, "agent hit");
                        events.push(GameEvent::AgentHit { agent: slot, at });
                    }
                    ContactRule::Strict => {
                        debug!(agent = ?slot, ?at, "agent caught");
                        events.push(GameEvent::AgentCaught { agent: slot, at });
                    }
                }
                break;
            }
        }
    }

    fn resolve_agent_contact(
        &mut self,
        mapper: &CoordinateMapper,
        config: &GameConfig,
        events: &mut Vec<GameEvent>,
    ) {
        let [player, ally] = &mut self.agents;
        if player.position() != ally.position() {
            return;
        }
        let at = player.position();
        match (player.power_up_active, ally.power_up_active) {
            (true, true) => {
                player.clear_power_up();
                ally.clear_power_up();
                debug!(?at, "power-up clash");
                events.push(GameEvent::PowerClash { at });
            }
            (true, false) | (false, true) => {
                let victim = if player.power_up_active { ally } else { player };
                victim.penalize(config.hit_penalty);
                victim.respawn(mapper);
                debug!(agent = ?victim.slot, ?at, "agent hit by powered partner");
                events.push(GameEvent::AgentHit {
                    agent: victim.slot,
                    at,
                });
            }
            (false, false) => {}
        }
    }
}

pub(crate) fn mapper(config: &GameConfig) -> CoordinateMapper {
    CoordinateMapper::new(config.cell_size, config.align_tolerance)
}

/// First open neighbour of the entrance, preferring cells off the border.
fn ally_start(maze: &Maze) -> Position {
    let neighbours: Vec<Position> = Direction::ALL
        .into_iter()
        .filter_map(|d| maze.grid.neighbor(maze.entrance, d))
        .filter(|p| maze.is_open(*p))
        .collect();
    neighbours
        .iter()
        .copied()
        .find(|p| !maze.grid.is_border(*p))
        .or_else(|| neighbours.first().copied())
        .unwrap_or(maze.entrance)
}

/// Enemies fill the open cells nearest the corner opposite the entrance.
fn spawn_enemies(maze: &Maze, ally_start: Position, count: usize) -> Vec<Enemy> {
    let (rows, cols) = (maze.grid.rows(), maze.grid.cols());
    let entrance = maze.entrance;
    let corner = Position::new(
        if entrance.row < rows / 2 { rows - 2 } else { 1 },
        if entrance.col < cols / 2 { cols - 2 } else { 1 },
    );
    let Some(origin) = maze.nearest_open(corner) else {
        return Vec::new();
    };
    let cells: Vec<Position> = maze
        .flood_from(origin)
        .into_iter()
        .map(|(pos, _)| pos)
        .filter(|p| *p != maze.exit && *p != ally_start && p.manhattan(&entrance) > 1)
        .take(count)
        .collect();
    if cells.is_empty() {
        return Vec::new();
    }
    (0..count)
        .map(|i| Enemy::new(i, cells[i % cells.len()]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::IdlePilot;

    /// 5x5 open interior with the entrance on the left and the exit on the right.
    fn open_room() -> Maze {
        Maze::parse(
            "
            #######
            #.....#
            #.....#
            S.....X
            #.....#
            #.....#
            #######
            ",
        )
        .unwrap()
    }

    fn quiet_level(config: &GameConfig) -> Level {
        let mut level = Level::new(0, open_room(), config);
        level.collectibles.clear();
        level.power_ups.clear();
        level.enemies.clear();
        level
    }

    fn place(level: &mut Level, slot: AgentSlot, pos: Position) {
        let mapper = mapper(&GameConfig::default());
        let agent = level.agent_mut(slot);
        agent.start = pos;
        agent.respawn(&mapper);
    }

    fn ticks_per_cell(config: &GameConfig) -> usize {
        (config.cell_size / config.agent_speed) as usize
    }

    #[test]
    fn level_population() {
        let config = GameConfig::default();
        let level = Level::generate(0, &config);
        assert_eq!(level.agent(AgentSlot::Player).position(), level.maze.entrance);
        assert_eq!(level.agent(AgentSlot::Ally).position(), Position::new(7, 1));
        assert_eq!(level.enemies.len(), 4);
        assert_eq!(level.power_ups.len(), 4);
        assert!(!level.collectibles.contains(&level.maze.exit));
        assert!(!level.collectibles.contains(&level.maze.entrance));
        assert!(level.collectibles.iter().all(|p| level.maze.is_open(*p)));
        assert!(level.enemies.iter().all(|e| level.maze.is_open(e.grid_pos)));
        assert!(level.maze.is_open(level.enemy_respawn));
        assert_eq!(Level::generate(3, &config).enemies.len(), 7);
        assert_eq!(Level::generate(11, &config).enemies.len(), 8);
    }

    #[test]
    fn pickup_scores_once_per_cell() {
        let config = GameConfig::default();
        let mut level = quiet_level(&config);
        place(&mut level, AgentSlot::Player, Position::new(2, 2));
        place(&mut level, AgentSlot::Ally, Position::new(5, 5));
        level.collectibles.insert(Position::new(2, 3));
        level.queue_player(Direction::Right);

        let mut pilot = IdlePilot;
        for _ in 0..ticks_per_cell(&config) {
            level.tick(&mut pilot, &config);
        }
        assert_eq!(level.agent(AgentSlot::Player).score, 100);
        assert!(level.collectibles.is_empty());
        assert!(level.agent(AgentSlot::Player).is_grabbing());
    }

    #[test]
    fn unaligned_ticks_never_touch_pickups() {
        let config = GameConfig::default();
        let mut level = quiet_level(&config);
        place(&mut level, AgentSlot::Player, Position::new(2, 2));
        place(&mut level, AgentSlot::Ally, Position::new(5, 5));
        level.collectibles.insert(Position::new(2, 3));
        level.queue_player(Direction::Right);

        let m = mapper(&config);
        let mut pilot = IdlePilot;
        for _ in 0..ticks_per_cell(&config) - 1 {
            level.tick(&mut pilot, &config);
            assert!(!level.agent(AgentSlot::Player).motion.is_aligned(&m));
            assert_eq!(level.agent(AgentSlot::Player).score, 0);
            assert_eq!(level.collectibles.len(), 1);
        }
    }

    #[test]
    fn entering_an_emptied_cell_is_a_no_op() {
        let config = GameConfig::default();
        let mut level = quiet_level(&config);
        let mut events = Vec::new();
        let exited = level.enter_cell(AgentSlot::Player, Position::new(2, 3), &config, &mut events);
        assert!(!exited);
        assert!(events.is_empty());
        assert_eq!(level.level_score(), 0);
    }

    #[test]
    fn power_up_lasts_its_duration() {
        let config = GameConfig::default();
        let mut level = quiet_level(&config);
        place(&mut level, AgentSlot::Player, Position::new(1, 1));
        place(&mut level, AgentSlot::Ally, Position::new(5, 5));
        level.power_ups.insert(Position::new(1, 2));
        level.queue_player(Direction::Right);

        let mut pilot = IdlePilot;
        let mut picked_at = None;
        let mut expired_at = None;
        for _ in 0..1_000 {
            let events = level.tick(&mut pilot, &config);
            for agent in &level.agents {
                assert_eq!(agent.power_up_active, level.now_ms < agent.power_up_expiry_ms);
            }
            if events.iter().any(|e| matches!(e, GameEvent::PowerUpPicked { .. })) {
                picked_at = Some(level.now_ms);
            }
            if events.iter().any(|e| matches!(e, GameEvent::PowerUpExpired { .. })) {
                expired_at = Some(level.now_ms);
                break;
            }
        }
        let (picked, expired) = (picked_at.unwrap(), expired_at.unwrap());
        assert_eq!(level.agent(AgentSlot::Player).score, 500);
        assert!(expired - picked >= config.power_up_duration_ms);
        assert!(expired - picked < config.power_up_duration_ms + config.tick_ms);
    }

    #[test]
    fn power_clash_strips_both() {
        let config = GameConfig::default();
        let mut level = quiet_level(&config);
        place(&mut level, AgentSlot::Player, Position::new(3, 3));
        place(&mut level, AgentSlot::Ally, Position::new(3, 3));
        for agent in level.agents.iter_mut() {
            agent.grant_power_up(0, 10_000);
        }
        let events = level.tick(&mut IdlePilot, &config);
        assert!(events.contains(&GameEvent::PowerClash {
            at: Position::new(3, 3)
        }));
        assert!(level.agents.iter().all(|a| !a.power_up_active));
    }

    #[test]
    fn powered_partner_knocks_back_the_other() {
        let config = GameConfig::default();
        let mut level = quiet_level(&config);
        place(&mut level, AgentSlot::Player, Position::new(3, 3));
        place(&mut level, AgentSlot::Ally, Position::new(3, 3));
        level.agent_mut(AgentSlot::Ally).start = Position::new(5, 5);
        level.agent_mut(AgentSlot::Ally).score = 300;
        level.agent_mut(AgentSlot::Player).grant_power_up(0, 10_000);

        level.tick(&mut IdlePilot, &config);
        let ally = level.agent(AgentSlot::Ally);
        assert_eq!(ally.score, 100);
        assert_eq!(ally.position(), Position::new(5, 5));
        assert!(level.agent(AgentSlot::Player).power_up_active);
    }

    #[test]
    fn unpowered_contact_penalizes_and_respawns() {
        let config = GameConfig::default();
        let mut level = quiet_level(&config);
        place(&mut level, AgentSlot::Player, Position::new(2, 2));
        place(&mut level, AgentSlot::Ally, Position::new(5, 5));
        level.agent_mut(AgentSlot::Player).start = Position::new(3, 0);
        level.agent_mut(AgentSlot::Player).score = 50;
        level.enemies.push(Enemy::new(0, Position::new(2, 2)));

        let events = level.tick(&mut IdlePilot, &config);
        assert!(events.contains(&GameEvent::AgentHit {
            agent: AgentSlot::Player,
            at: Position::new(2, 2)
        }));
        let player = level.agent(AgentSlot::Player);
        assert_eq!(player.score, 0);
        assert_eq!(player.position(), Position::new(3, 0));
        assert_eq!(player.motion.current, Direction::None);
        assert_eq!(player.motion.queued, Direction::None);
    }

    #[test]
    fn enemy_contact_waits_for_alignment() {
        let config = GameConfig::default();
        let mut level = quiet_level(&config);
        place(&mut level, AgentSlot::Player, Position::new(2, 2));
        place(&mut level, AgentSlot::Ally, Position::new(5, 5));
        level.agent_mut(AgentSlot::Player).score = 500;
        level.queue_player(Direction::Right);

        let half = ticks_per_cell(&config) / 2 + 1;
        for _ in 0..half {
            level.tick(&mut IdlePilot, &config);
        }
        let m = mapper(&config);
        assert_eq!(level.agent(AgentSlot::Player).position(), Position::new(2, 3));
        assert!(!level.agent(AgentSlot::Player).motion.is_aligned(&m));

        level.enemies.push(Enemy::new(0, Position::new(2, 3)));
        let events = level.tick(&mut IdlePilot, &config);
        assert!(events.is_empty());
        assert_eq!(level.agent(AgentSlot::Player).score, 500);

        let mut events = Vec::new();
        for _ in half + 1..ticks_per_cell(&config) {
            events = level.tick(&mut IdlePilot, &config);
        }
        assert_eq!(events, vec![GameEvent::AgentHit {
            agent: AgentSlot::Player,
            at: Position::new(2, 3)
        }]);
        assert_eq!(level.agent(AgentSlot::Player).score, 300);
    }

    #[test]
    fn swapping_cells_with_an_enemy_counts_as_contact() {
        let config = GameConfig::default();
        let mut level = quiet_level(&config);
        place(&mut level, AgentSlot::Player, Position::new(3, 1));
        place(&mut level, AgentSlot::Ally, Position::new(5, 5));
        level.agent_mut(AgentSlot::Player).score = 500;
        level.enemies.push(Enemy::new(0, Position::new(3, 3)));
        level.queue_player(Direction::Right);

        let mut hits = Vec::new();
        for _ in 0..2 * ticks_per_cell(&config) {
            let events = level.tick(&mut IdlePilot, &config);
            hits.extend(
                events
                    .into_iter()
                    .filter(|e| matches!(e, GameEvent::AgentHit { .. })),
            );
        }
        assert_eq!(level.enemies[0].previous_pos, Position::new(3, 3));
        assert_eq!(level.enemies[0].grid_pos, Position::new(3, 2));
        assert_eq!(hits, vec![GameEvent::AgentHit {
            agent: AgentSlot::Player,
            at: Position::new(3, 3)
        }]);
        let player = level.agent(AgentSlot::Player);
        assert_eq!(player.score, 300);
        assert_eq!(player.position(), Position::new(3, 1));
    }

    #[test]
    fn strict_rule_reports_capture() {
        let config = GameConfig {
            contact_rule: ContactRule::Strict,
            ..GameConfig::default()
        };
        let mut level = quiet_level(&config);
        place(&mut level, AgentSlot::Player, Position::new(2, 2));
        place(&mut level, AgentSlot::Ally, Position::new(5, 5));
        level.enemies.push(Enemy::new(0, Position::new(2, 2)));

        let events = level.tick(&mut IdlePilot, &config);
        assert!(events.contains(&GameEvent::AgentCaught {
            agent: AgentSlot::Player,
            at: Position::new(2, 2)
        }));
    }

    #[test]
    fn powered_agent_sends_enemy_to_centre() {
        let config = GameConfig::default();
        let mut level = quiet_level(&config);
        place(&mut level, AgentSlot::Player, Position::new(1, 1));
        place(&mut level, AgentSlot::Ally, Position::new(5, 5));
        level.agent_mut(AgentSlot::Player).grant_power_up(0, 10_000);
        level.enemies.push(Enemy::new(0, Position::new(1, 1)));

        level.tick(&mut IdlePilot, &config);
        assert_eq!(level.agent(AgentSlot::Player).score, 500);
        assert_eq!(level.enemies.len(), 1);
        assert_eq!(level.enemies[0].grid_pos, level.enemy_respawn);
        assert_eq!(level.enemy_respawn, Position::new(3, 3));
    }

    #[test]
    fn enemies_move_on_their_own_cadence() {
        let config = GameConfig::default();
        let mut level = quiet_level(&config);
        place(&mut level, AgentSlot::Player, Position::new(3, 1));
        place(&mut level, AgentSlot::Ally, Position::new(1, 1));
        level.enemies.push(Enemy::new(0, Position::new(3, 5)));

        let ticks_per_step = config.enemy_interval_ms(0).div_ceil(config.tick_ms) as usize;
        for _ in 0..ticks_per_step - 1 {
            level.tick(&mut IdlePilot, &config);
        }
        assert_eq!(level.enemies[0].grid_pos, Position::new(3, 5));
        level.tick(&mut IdlePilot, &config);
        assert_eq!(level.enemies[0].grid_pos, Position::new(3, 4));
    }

    #[test]
    fn reaching_the_exit_is_reported() {
        let config = GameConfig::default();
        let mut level = quiet_level(&config);
        place(&mut level, AgentSlot::Player, Position::new(3, 5));
        place(&mut level, AgentSlot::Ally, Position::new(1, 1));
        level.queue_player(Direction::Right);

        let mut events = Vec::new();
        for _ in 0..ticks_per_cell(&config) {
            events = level.tick(&mut IdlePilot, &config);
        }
        assert_eq!(events, vec![GameEvent::ExitReached {
            agent: AgentSlot::Player
        }]);
    }
}
