use crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::game::{Action, Direction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    GameAction(Action),
    ToggleMute,
    Quit,
    None,
}

/// Turns a mouse drag into a heading, like a swipe on a touch screen.
///
/// Distances are measured in board cells. One cell is two terminal columns
/// wide, so horizontal travel is halved before comparing.
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    min_distance: u16,
    origin: Option<(u16, u16)>,
    touched: bool,
}

impl SwipeTracker {
    pub fn new(min_distance: u16) -> Self {
        Self {
            min_distance,
            origin: None,
            touched: false,
        }
    }

    pub fn handle_mouse_event(&mut self, event: MouseEvent) -> KeyAction {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.origin = Some((event.column, event.row));
                // The very first touch starts the game
                if !self.touched {
                    self.touched = true;
                    return KeyAction::GameAction(Action::Start);
                }
                KeyAction::None
            }
            MouseEventKind::Up(MouseButton::Left) => match self.origin.take() {
                Some(origin) => self.swipe(origin, (event.column, event.row)),
                None => KeyAction::None,
            },
            _ => KeyAction::None,
        }
    }

    fn swipe(&self, (start_col, start_row): (u16, u16), (end_col, end_row): (u16, u16)) -> KeyAction {
        let dx = (end_col as i32 - start_col as i32) / 2;
        let dy = end_row as i32 - start_row as i32;
        let min = self.min_distance as i32;

        if dx.abs() < min && dy.abs() < min {
            return KeyAction::None;
        }

        let direction = if dx.abs() > dy.abs() {
            if dx > 0 { Direction::Right } else { Direction::Left }
        } else if dy > 0 {
            Direction::Down
        } else {
            Direction::Up
        };

        KeyAction::GameAction(Action::Turn(direction))
    }
}

pub struct InputHandler {
    swipe: SwipeTracker,
}

impl InputHandler {
    pub fn new(min_swipe_cells: u16) -> Self {
        Self {
            swipe: SwipeTracker::new(min_swipe_cells),
        }
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            // Movement - Arrow keys
            KeyCode::Up => KeyAction::GameAction(Action::Turn(Direction::Up)),
            KeyCode::Down => KeyAction::GameAction(Action::Turn(Direction::Down)),
            KeyCode::Left => KeyAction::GameAction(Action::Turn(Direction::Left)),
            KeyCode::Right => KeyAction::GameAction(Action::Turn(Direction::Right)),

            // Movement - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => {
                KeyAction::GameAction(Action::Turn(Direction::Up))
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                KeyAction::GameAction(Action::Turn(Direction::Down))
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                KeyAction::GameAction(Action::Turn(Direction::Left))
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                KeyAction::GameAction(Action::Turn(Direction::Right))
            }

            // Session
            KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => {
                KeyAction::GameAction(Action::TogglePause)
            }
            KeyCode::Enter => KeyAction::GameAction(Action::Start),
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::GameAction(Action::Restart),

            // Controls
            KeyCode::Char('m') | KeyCode::Char('M') => KeyAction::ToggleMute,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,

            _ => KeyAction::None,
        }
    }

    pub fn handle_mouse_event(&mut self, event: MouseEvent) -> KeyAction {
        self.swipe.handle_mouse_event(event)
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(2)
    }
}
