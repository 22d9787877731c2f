// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// app orchestrator, or into local ViewState mutations (cursor movement).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::ViewState;
use crate::protocol::UserCommand;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator (toggle, refresh, quit). Returns `None` when the key
/// press was handled locally by mutating `ViewState` or was ignored.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress; ignoring
    // non-Press events prevents double-processing.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately (escape hatch)
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    match key_event.code {
        // Cursor movement in the season sidebar
        KeyCode::Up | KeyCode::Char('k') => {
            view_state.cursor = view_state.cursor.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if view_state.cursor + 1 < view_state.seasons.len() {
                view_state.cursor += 1;
            }
            None
        }

        // Toggle the season under the cursor
        KeyCode::Char(' ') | KeyCode::Enter => {
            let season = *view_state.seasons.get(view_state.cursor)?;
            Some(UserCommand::ToggleSeason(season))
        }

        KeyCode::Char('r') => Some(UserCommand::Refresh),
        KeyCode::Char('q') => Some(UserCommand::Quit),

        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
