use crate::simulation::control::Command;
use crossterm::event::KeyCode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Simulation(Command),
    TogglePause,
    Quit,
}

pub const KEY_HINTS: &str =
    "[c] swap  [↑/↓] flow  [r] reboot  [1] auth/mono  [2] order-1  [3] order-2  [space] pause  [q] quit";

pub fn map_key(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Char('c') | KeyCode::Char('C') => Action::Simulation(Command::SwapTopology),
        KeyCode::Up => Action::Simulation(Command::AdjustFlow(1)),
        KeyCode::Down => Action::Simulation(Command::AdjustFlow(-1)),
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Simulation(Command::Reboot),
        KeyCode::Char('1') => Action::Simulation(Command::ToggleNode(0)),
        KeyCode::Char('2') => Action::Simulation(Command::ToggleNode(1)),
        KeyCode::Char('3') => Action::Simulation(Command::ToggleNode(2)),
        KeyCode::Char(' ') => Action::TogglePause,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => return None,
    };
    Some(action)
}
