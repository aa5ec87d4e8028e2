mod input;

use anyhow::{Context, Result};
use clap::Parser;
use input::Command;
use money_grab_core::{
    ContactRule, EnemyBehaviorMode, GameConfig, Position, Session, SessionStatus, Snapshot,
    agent::AgentSlot,
    enemy::Pursuit,
    maze::Tile,
};
use ratatui::{
    crossterm::{
        self,
        event::{self, Event},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    cell::Cell,
    fs::File,
    io::{self, Stdout},
    path::{Path, PathBuf},
    rc::Rc,
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(version, about = "Two-runner maze chase in the terminal", long_about = None)]
struct Args {
    /// Name shown for the keyboard-controlled runner
    #[arg(long, default_value = "Player")]
    player: String,

    /// Name shown for the AI companion
    #[arg(long, default_value = "Buddy")]
    ally: String,

    /// JSON file with engine settings; missing fields keep their defaults
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Seed for the companion's random moves
    #[arg(long)]
    seed: Option<u64>,

    /// End the game on the first enemy contact instead of a penalty
    #[arg(long)]
    strict: bool,

    /// Enemies commit to a nearby target for several moves
    #[arg(long)]
    lock_on: bool,

    /// Stop after this many completed levels
    #[arg(long)]
    max_levels: Option<u32>,

    /// Where log output goes
    #[arg(long, value_name = "LOG_FILE", default_value = "money_grab.log")]
    log_file: PathBuf,

    /// Log per-event detail
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// File settings first, then command-line overrides.
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => GameConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.strict {
            config.contact_rule = ContactRule::Strict;
        }
        if self.lock_on {
            config.enemy_behavior = EnemyBehaviorMode::LockOn;
        }
        if self.max_levels.is_some() {
            config.max_levels = self.max_levels;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Reads a JSON settings file. Fields it leaves out keep their defaults.
fn load_config(path: &Path) -> Result<GameConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
}

/// Installs a plain-text subscriber writing to `path`.
///
/// # Arguments
///
/// * `path`: Log file, truncated on start.
/// * `verbose`: Include per-event `debug!` output.
fn init_logging(path: &Path, verbose: bool) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(())
}

struct App {
    /// The running game.
    session: Session,
    /// What was drawn last frame.
    snapshot: Snapshot,
    /// Final `(score, levels_reached)` once the game ends.
    result: Rc<Cell<Option<(u32, u32)>>>,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(config: GameConfig, player: String, ally: String) -> Result<Self> {
        let result = Rc::new(Cell::new(None));
        let sink = Rc::clone(&result);
        let mut session = Session::new(config, player, ally)?.on_game_complete(move |score, levels| {
            info!(score, levels, "final result");
            sink.set(Some((score, levels)));
        });
        let snapshot = session.snapshot();
        Ok(App {
            session,
            snapshot,
            result,
            should_quit: false,
        })
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Steer(direction) => self.session.queue_direction(direction),
            Command::TogglePause => self.session.toggle_pause(),
            Command::Reset => {
                self.result.set(None);
                self.session.reset();
            }
            Command::Quit => self.quit(),
        }
    }

    /// Feeds elapsed wall time to the session and keeps the latest state.
    fn update(&mut self, elapsed: Duration) {
        self.snapshot = self.session.advance(elapsed);
        for event in &self.snapshot.events {
            debug!(?event, "game event");
        }
    }

    /// Ends the session, which reports the final score, and sets the quit flag.
    fn quit(&mut self) {
        self.session.finish();
        self.should_quit = true;
    }
}

fn main() -> Result<()> {
    // Parse command line arguments and build the engine settings
    let args = Args::parse();
    let config = args.game_config()?;
    // The terminal belongs to the UI, so logs go to a file
    init_logging(&args.log_file, args.verbose)?;
    info!(?config, "starting");

    // Create the application state
    let mut app = App::new(config, args.player, args.ally)?;

    // Set up the terminal and run the main loop
    let mut terminal = setup_terminal()?;
    let outcome = run_app(&mut terminal, &mut app);
    // Restore the terminal even when the loop failed
    restore_terminal(&mut terminal)?;
    outcome?;

    // Report the result once the normal screen is back
    if let Some((score, levels)) = app.result.get() {
        println!("Final score: {score} (reached level {levels})");
    }
    Ok(())
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
///
/// # Arguments
///
/// * `terminal`: The terminal to draw into.
/// * `app`: Application state; the session inside it owns the game clock.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let frame_rate = Duration::from_millis(16);
    let mut last_frame = Instant::now();

    loop {
        // Draw the latest snapshot
        terminal.draw(|f| ui(f, &app.snapshot))?;

        // Wait for input until the next frame is due
        let timeout = frame_rate.saturating_sub(last_frame.elapsed());
        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if let Some(command) = input::command_for(key) {
                    app.handle(command);
                }
            }
        }

        // Hand the real elapsed time to the session; it decides how many ticks run
        let now = Instant::now();
        app.update(now - last_frame);
        last_frame = now;

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, snapshot: &Snapshot) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(snapshot.maze.grid.rows() as u16 + 2), // Maze
            Constraint::Length(5),                                 // Scores
            Constraint::Length(2),                                 // Help
        ])
        .split(frame.area());

    render_maze(frame, layout[0], snapshot);
    render_scores(frame, layout[1], snapshot);

    let help = Paragraph::new("arrows/WASD move  p pause  r reset  q quit")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help, layout[2]);
}

/// The cell's glyph, two columns wide so the maze keeps its shape.
fn cell_span(snapshot: &Snapshot, pos: Position) -> Span<'static> {
    for (slot, glyph, color, power_color) in [
        (AgentSlot::Player, "@@", Color::Yellow, Color::LightYellow),
        (AgentSlot::Ally, "&&", Color::Cyan, Color::LightCyan),
    ] {
        let agent = &snapshot.agents[slot.index()];
        if agent.position() != pos {
            continue;
        }
        let mut style = if agent.power_up_active {
            Style::default().fg(power_color).bold().reversed()
        } else {
            Style::default().fg(color).bold()
        };
        if agent.is_grabbing() {
            style = style.underlined();
        }
        return Span::styled(glyph, style);
    }
    if let Some(enemy) = snapshot.enemies.iter().find(|e| e.grid_pos == pos) {
        let color = match enemy.behavior.pursuit {
            Pursuit::Chase => Color::Red,
            Pursuit::Flee => Color::Blue,
        };
        return Span::styled("MM", Style::default().fg(color).bold());
    }
    if snapshot.power_ups.contains(&pos) {
        return Span::styled("<>", Style::default().fg(Color::Magenta).bold());
    }
    if snapshot.collectibles.contains(&pos) {
        return Span::styled(" $", Style::default().fg(Color::Green));
    }
    if pos == snapshot.maze.exit {
        return Span::styled("[]", Style::default().fg(Color::LightGreen));
    }
    match snapshot.maze.grid[pos] {
        Tile::Wall => Span::styled("██", Style::default().fg(Color::DarkGray)),
        Tile::Open => Span::raw("  "),
    }
}

/// Renders the maze with pickups, enemies and both agents.
fn render_maze(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let grid = &snapshot.maze.grid;
    let lines: Vec<Line> = (0..grid.rows())
        .map(|row| {
            let spans: Vec<Span> = (0..grid.cols())
                .map(|col| cell_span(snapshot, Position::new(row, col)))
                .collect();
            Line::from(spans)
        })
        .collect();

    let title = format!(" Money Grab - level {} ", snapshot.level_index + 1);
    let maze = Paragraph::new(lines)
        .block(Block::default().title(title).borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(maze, area);
}

fn status_span(snapshot: &Snapshot) -> Span<'static> {
    let (text, color) = match snapshot.status {
        SessionStatus::Playing => ("Playing".to_string(), Color::White),
        SessionStatus::Paused => ("Paused".to_string(), Color::Yellow),
        SessionStatus::LevelComplete => ("Level complete!".to_string(), Color::Green),
        SessionStatus::GameOver => (
            format!("Game over - final score {}", snapshot.combined_score),
            Color::Red,
        ),
    };
    Span::styled(text, Style::default().fg(color).bold())
}

/// Renders per-agent scores, the team total and the session status.
fn render_scores(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let names = [&snapshot.player_name, &snapshot.ally_name];
    let mut lines: Vec<Line> = AgentSlot::BOTH
        .iter()
        .map(|slot| {
            let agent = &snapshot.agents[slot.index()];
            let power = if agent.power_up_active { " POWER" } else { "" };
            Line::from(format!("{}: {}{}", names[slot.index()], agent.score, power))
        })
        .collect();
    lines.push(Line::from(vec![
        Span::raw(format!("Team: {}  ", snapshot.combined_score)),
        status_span(snapshot),
    ]));

    let scores = Paragraph::new(lines).block(Block::default().title("Scores").borders(Borders::ALL));
    frame.render_widget(scores, area);
}
