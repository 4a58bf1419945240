//! Key bindings for the terminal front end.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Game(Command),
    /// Reset and immediately start a new round.
    Restart,
    TogglePause,
    Quit,
}

/// Arrow keys (or h/j/k/l) steer, Space drops, P pauses, R restarts,
/// Esc/Q quits. Ctrl-C also quits.
pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }

    let action = match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Action::Quit,
        KeyCode::Char('p') | KeyCode::Char('P') => Action::TogglePause,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Restart,
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') => Action::Game(Command::MoveLeft),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') => {
            Action::Game(Command::MoveRight)
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => Action::Game(Command::SoftDrop),
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => Action::Game(Command::Rotate),
        KeyCode::Char(' ') => Action::Game(Command::HardDrop),
        _ => return None,
    };
    Some(action)
}
