use money_grab_core::Direction;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

/// What a key press asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Steer(Direction),
    TogglePause,
    Reset,
    Quit,
}

/// Maps a key event to a command. Key releases and unbound keys yield `None`.
pub fn command_for(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let command = match key.code {
        KeyCode::Up => Command::Steer(Direction::Up),
        KeyCode::Down => Command::Steer(Direction::Down),
        KeyCode::Left => Command::Steer(Direction::Left),
        KeyCode::Right => Command::Steer(Direction::Right),
        KeyCode::Esc => Command::Quit,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Command::Steer(Direction::Up),
            's' => Command::Steer(Direction::Down),
            'a' => Command::Steer(Direction::Left),
            'd' => Command::Steer(Direction::Right),
            'p' => Command::TogglePause,
            'r' => Command::Reset,
            'q' => Command::Quit,
            _ => return None,
        },
        _ => return None,
    };
    Some(command)
}
