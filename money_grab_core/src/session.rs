//! The session state machine: levels, pause, transitions between levels,
//! game over, and the fixed-timestep clock that turns host frame times into ticks.

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    Direction, Position,
    agent::{Agent, AllyPilot, Pilot},
    config::{ConfigError, GameConfig},
    enemy::Enemy,
    level::{GameEvent, Level},
    maze::Maze,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    Playing,
    Paused,
    LevelComplete,
    GameOver,
}

/// Called once on game over with `(final_combined_score, levels_reached)`.
pub type CompletionCallback = Box<dyn FnMut(u32, u32)>;

/// Converts wall-clock deltas into whole ticks.
#[derive(Debug, Clone)]
struct FixedStep {
    step: Duration,
    accumulated: Duration,
    max_steps: u32,
}

impl FixedStep {
    fn new(step: Duration, max_steps: u32) -> Self {
        FixedStep {
            step,
            accumulated: Duration::ZERO,
            max_steps,
        }
    }

    /// Ticks due after `elapsed` more time. A backlog beyond `max_steps` is dropped.
    fn due(&mut self, elapsed: Duration) -> u32 {
        self.accumulated += elapsed;
        let mut steps = 0;
        while self.accumulated >= self.step && steps < self.max_steps {
            self.accumulated -= self.step;
            steps += 1;
        }
        if steps == self.max_steps {
            self.accumulated = Duration::ZERO;
        }
        steps
    }

    fn clear(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}

/// A level load waiting out the transition delay.
#[derive(Debug, Clone, Copy)]
struct PendingLevel {
    level_index: u32,
    remaining_ms: u64,
}

/// Renderable state handed to the host after each frame.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub level_index: u32,
    pub status: SessionStatus,
    pub maze: Arc<Maze>,
    pub player_name: String,
    pub ally_name: String,
    pub agents: [Agent; 2],
    pub enemies: Vec<Enemy>,
    pub collectibles: Vec<Position>,
    pub power_ups: Vec<Position>,
    /// Score banked from completed levels.
    pub team_score: u32,
    pub combined_score: u32,
    /// Events produced since the previous snapshot.
    pub events: Vec<GameEvent>,
}

pub struct Session {
    config: GameConfig,
    player_name: String,
    ally_name: String,
    pilot: Box<dyn Pilot>,
    level: Level,
    status: SessionStatus,
    team_score: u32,
    /// The current level's scores are already in `team_score`.
    banked: bool,
    levels_completed: u32,
    clock: FixedStep,
    pending: Option<PendingLevel>,
    on_complete: Option<CompletionCallback>,
    completion_fired: bool,
    events: Vec<GameEvent>,
}

impl Session {
    /// Starts a session on level 0 with the default ally AI.
    ///
    /// # Arguments
    ///
    /// * `config`: Engine settings, validated before anything is built.
    /// * `player_name`: Display name for the keyboard-controlled agent.
    /// * `ally_name`: Display name for the AI companion.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found in `config`.
    pub fn new(
        config: GameConfig,
        player_name: impl Into<String>,
        ally_name: impl Into<String>,
    ) -> Result<Session, ConfigError> {
        config.validate()?;
        let pilot = Box::new(AllyPilot::new(&config, config.seed));
        let level = Level::generate(0, &config);
        info!(level = 0, "session started");
        Ok(Session {
            clock: FixedStep::new(config.tick(), config.max_catch_up_ticks),
            player_name: player_name.into(),
            ally_name: ally_name.into(),
            pilot,
            level,
            status: SessionStatus::Playing,
            team_score: 0,
            banked: false,
            levels_completed: 0,
            pending: None,
            on_complete: None,
            completion_fired: false,
            events: vec![GameEvent::LevelLoaded { level_index: 0 }],
            config,
        })
    }

    /// Replaces the ally's decision maker.
    pub fn with_pilot(mut self, pilot: Box<dyn Pilot>) -> Self {
        self.pilot = pilot;
        self
    }

    /// Registers the game-over callback.
    pub fn on_game_complete(mut self, callback: impl FnMut(u32, u32) + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Direct access for hosts and tests that stage custom situations.
    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.level
    }

    pub fn team_score(&self) -> u32 {
        self.team_score
    }

    pub fn combined_score(&self) -> u32 {
        if self.banked {
            self.team_score
        } else {
            self.team_score + self.level.level_score()
        }
    }

    pub fn levels_completed(&self) -> u32 {
        self.levels_completed
    }

    /// Buffers a player direction. Ignored unless playing.
    pub fn queue_direction(&mut self, direction: Direction) {
        if self.status == SessionStatus::Playing {
            self.level.queue_player(direction);
        }
    }

    /// Playing and paused swap; other states are left alone.
    pub fn toggle_pause(&mut self) {
        self.status = match self.status {
            SessionStatus::Playing => SessionStatus::Paused,
            SessionStatus::Paused => SessionStatus::Playing,
            other => {
                debug!(status = ?other, "pause ignored");
                return;
            }
        };
        self.clock.clear();
        info!(status = ?self.status, "pause toggled");
    }

    /// Back to level 0 with the team score zeroed. Any pending level load is dropped.
    pub fn reset(&mut self) {
        info!(score = self.combined_score(), "session reset");
        self.team_score = 0;
        self.levels_completed = 0;
        self.completion_fired = false;
        self.load_level(0);
    }

    /// Ends the session now, firing the completion callback.
    pub fn finish(&mut self) {
        if self.status != SessionStatus::GameOver {
            self.game_over();
        }
    }

    /// Feeds a wall-clock delta. Runs however many fixed ticks are due and
    /// returns the resulting state. Paused and finished sessions discard time.
    pub fn advance(&mut self, elapsed: Duration) -> Snapshot {
        if matches!(self.status, SessionStatus::Playing | SessionStatus::LevelComplete) {
            for _ in 0..self.clock.due(elapsed) {
                self.step();
            }
        }
        self.snapshot()
    }

    /// Runs exactly one tick regardless of the wall clock.
    pub fn step(&mut self) {
        match self.status {
            SessionStatus::Playing => self.play_tick(),
            SessionStatus::LevelComplete => self.transition_tick(),
            SessionStatus::Paused | SessionStatus::GameOver => {}
        }
    }

    /// Current state plus every event since the last snapshot.
    pub fn snapshot(&mut self) -> Snapshot {
        Snapshot {
            level_index: self.level.level_index,
            status: self.status,
            maze: Arc::clone(&self.level.maze),
            player_name: self.player_name.clone(),
            ally_name: self.ally_name.clone(),
            agents: self.level.agents.clone(),
            enemies: self.level.enemies.clone(),
            collectibles: self.level.collectibles.iter().copied().collect(),
            power_ups: self.level.power_ups.iter().copied().collect(),
            team_score: self.team_score,
            combined_score: self.combined_score(),
            events: std::mem::take(&mut self.events),
        }
    }

    fn play_tick(&mut self) {
        let events = self.level.tick(self.pilot.as_mut(), &self.config);
        let exited = events.iter().any(|e| matches!(e, GameEvent::ExitReached { .. }));
        let caught = events.iter().any(|e| matches!(e, GameEvent::AgentCaught { .. }));
        self.events.extend(events);
        if caught {
            self.game_over();
        } else if exited {
            self.complete_level();
        }
    }

    fn transition_tick(&mut self) {
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        pending.remaining_ms = pending.remaining_ms.saturating_sub(self.config.tick_ms);
        if pending.remaining_ms == 0 {
            let next = pending.level_index;
            self.load_level(next);
        }
    }

    fn complete_level(&mut self) {
        let level_score = self.level.level_score();
        self.team_score += level_score;
        self.banked = true;
        self.levels_completed += 1;
        info!(
            level = self.level.level_index,
            level_score,
            team_score = self.team_score,
            "level complete"
        );

        if self
            .config
            .max_levels
            .is_some_and(|max| self.levels_completed >= max)
        {
            self.game_over();
            return;
        }
        self.status = SessionStatus::LevelComplete;
        self.pending = Some(PendingLevel {
            level_index: self.level.level_index + 1,
            remaining_ms: self.config.level_transition_ms,
        });
    }

    fn load_level(&mut self, level_index: u32) {
        self.level = Level::generate(level_index, &self.config);
        self.banked = false;
        self.pending = None;
        self.clock.clear();
        self.status = SessionStatus::Playing;
        info!(
            level = level_index,
            enemies = self.level.enemies.len(),
            collectibles = self.level.collectibles.len(),
            "level loaded"
        );
        self.events.push(GameEvent::LevelLoaded { level_index });
    }

    fn game_over(&mut self) {
        self.status = SessionStatus::GameOver;
        self.pending = None;
        let final_score = self.combined_score();
        let levels_reached = self.level.level_index + 1;
        info!(final_score, levels_reached, "game over");
        self.events.push(GameEvent::GameOver {
            final_score,
            levels_reached,
        });
        if !self.completion_fired {
            self.completion_fired = true;
            if let Some(callback) = self.on_complete.as_mut() {
                callback(final_score, levels_reached);
            }
        }
    }
}
