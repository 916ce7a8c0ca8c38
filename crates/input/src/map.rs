//! Key mapping from terminal events to game actions.

use crate::types::GameAction;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Map keyboard input to game actions.
pub fn handle_key_event(key: KeyEvent) -> Option<GameAction> {
    if key.kind == KeyEventKind::Release || key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }

    match key.code {
        // Cursor
        KeyCode::Left => Some(GameAction::CursorLeft),
        KeyCode::Right => Some(GameAction::CursorRight),
        KeyCode::Up => Some(GameAction::CursorUp),
        KeyCode::Down => Some(GameAction::CursorDown),
        KeyCode::Enter => Some(GameAction::PlaceAtCursor),

        // Rotation
        KeyCode::Char('q')
        | KeyCode::Char('Q')
        | KeyCode::Char('z')
        | KeyCode::Char('Z')
        | KeyCode::Char('[') => Some(GameAction::RotateCw),
        KeyCode::Char('e')
        | KeyCode::Char('E')
        | KeyCode::Char('c')
        | KeyCode::Char('C')
        | KeyCode::Char(']') => Some(GameAction::RotateCcw),

        KeyCode::Char(' ') | KeyCode::Char('r') | KeyCode::Char('R') => Some(GameAction::Swap),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn test_cursor_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Left)),
            Some(GameAction::CursorLeft)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Down)),
            Some(GameAction::CursorDown)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Enter)),
            Some(GameAction::PlaceAtCursor)
        );
    }

    #[test]
    fn test_rotation_keys() {
        for c in ['q', 'Z', '['] {
            assert_eq!(
                handle_key_event(KeyEvent::from(KeyCode::Char(c))),
                Some(GameAction::RotateCw)
            );
        }
        for c in ['E', 'c', ']'] {
            assert_eq!(
                handle_key_event(KeyEvent::from(KeyCode::Char(c))),
                Some(GameAction::RotateCcw)
            );
        }
    }

    #[test]
    fn test_swap_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char(' '))),
            Some(GameAction::Swap)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('R'))),
            Some(GameAction::Swap)
        );
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Esc)));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(should_quit(ctrl_c));
        assert_eq!(handle_key_event(ctrl_c), None);
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('q'))));
    }
}
