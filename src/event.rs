//! Keyboard event handling.
//!
//! The viewer uses Vim-style navigation along the alignment:
//! - `h` / `l` or arrows: move one column
//! - `0` or `Home`: go to first column
//! - `$` or `End`: go to last column
//! - `PageUp` / `PageDown`: move one screen
//! - `Ctrl+U` / `Ctrl+D`: move half a screen
//! - `n` / `N`: next / previous difference
//! - `<number>|`: go to column (e.g., `50|` goes to column 50)
//! - `:`: enter command mode
//!   - `:q` or `:quit`: quit the application
//!   - `:h` or `:help`: show help
//!   - `:<number>`: go to column
//! - `?`: toggle help
//! - `q` or `Ctrl+C`: quit

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use crate::model::{AppMode, AppState};

/// Actions that can be triggered by keyboard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action (key not recognized)
    None,
    Quit,
    MoveLeft,
    MoveRight,
    /// Go to first column (0 or Home)
    GotoFirstColumn,
    /// Go to last column ($ or End)
    GotoLastColumn,
    PageLeft,
    PageRight,
    /// Ctrl+U
    HalfPageLeft,
    /// Ctrl+D
    HalfPageRight,
    /// Jump to next difference (n)
    NextDifference,
    /// Jump to previous difference (N)
    PreviousDifference,
    /// Enter command mode
    EnterCommandMode,
    /// Add character to command buffer
    CommandChar(char),
    /// Execute current command
    ExecuteCommand,
    /// Cancel command mode
    CancelCommand,
    /// Backspace in command mode
    CommandBackspace,
    /// Resize event (terminal resized)
    Resize(u16, u16),
    ToggleHelp,
    /// Dismiss the help overlay
    DismissHelp,
    /// Accumulate a digit for number prefix
    AccumulateDigit(char),
    /// Execute pending number with | (go to column)
    ExecuteGotoColumn,
}

/// Polls for keyboard events with a timeout.
///
/// Returns `None` if no event occurred within the timeout.
pub fn poll_event(timeout: Duration) -> Option<Event> {
    if event::poll(timeout).ok()? {
        event::read().ok()
    } else {
        None
    }
}

/// Converts a crossterm event to an Action based on current app mode.
pub fn handle_event(event: Event, mode: &AppMode, show_help: bool, has_number_prefix: bool) -> Action {
    match event {
        Event::Key(key_event) => handle_key_event(key_event, mode, show_help, has_number_prefix),
        Event::Resize(width, height) => Action::Resize(width, height),
        _ => Action::None,
    }
}

/// Handles a key event based on the current application mode.
fn handle_key_event(key: KeyEvent, mode: &AppMode, show_help: bool, has_number_prefix: bool) -> Action {
    // If help is shown, any key dismisses it
    if show_help {
        return Action::DismissHelp;
    }

    match mode {
        AppMode::Normal => handle_normal_mode(key, has_number_prefix),
        AppMode::Command(_) => handle_command_mode(key),
    }
}

/// Handles key events in normal mode.
fn handle_normal_mode(key: KeyEvent, has_number_prefix: bool) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('u') => Action::HalfPageLeft,
            KeyCode::Char('d') => Action::HalfPageRight,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char('h') | KeyCode::Left => Action::MoveLeft,
        KeyCode::Char('l') | KeyCode::Right => Action::MoveRight,

        // '0' goes to first column only if not accumulating a number (e.g., 500|)
        KeyCode::Char('0') if !has_number_prefix => Action::GotoFirstColumn,
        KeyCode::Char('0') => Action::AccumulateDigit('0'),
        KeyCode::Char('$') | KeyCode::End => Action::GotoLastColumn,
        KeyCode::Home => Action::GotoFirstColumn,

        KeyCode::PageUp => Action::PageLeft,
        KeyCode::PageDown => Action::PageRight,

        KeyCode::Char('n') => Action::NextDifference,
        KeyCode::Char('N') => Action::PreviousDifference,

        KeyCode::Char(c @ '1'..='9') => Action::AccumulateDigit(c),
        KeyCode::Char('|') => Action::ExecuteGotoColumn,

        KeyCode::Char(':') => Action::EnterCommandMode,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Char('q') => Action::Quit,

        _ => Action::None,
    }
}

/// Handles key events in command mode.
fn handle_command_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::ExecuteCommand,
        KeyCode::Esc => Action::CancelCommand,
        KeyCode::Backspace => Action::CommandBackspace,
        KeyCode::Char(c) => Action::CommandChar(c),
        _ => Action::None,
    }
}

/// Applies an action to the application state.
///
/// Returns `true` if the application should continue, `false` if it should quit.
pub fn apply_action(state: &mut AppState, action: Action) -> bool {
    // A number prefix only survives until the next non-digit key
    if !matches!(
        action,
        Action::AccumulateDigit(_) | Action::ExecuteGotoColumn | Action::None | Action::Resize(_, _)
    ) {
        state.number_buffer.clear();
    }

    match action {
        Action::None => {}
        Action::Quit => state.should_quit = true,
        Action::MoveLeft => state.move_left(),
        Action::MoveRight => state.move_right(),
        Action::GotoFirstColumn => state.goto_first_column(),
        Action::GotoLastColumn => state.goto_last_column(),
        Action::PageLeft => state.page_left(),
        Action::PageRight => state.page_right(),
        Action::HalfPageLeft => state.half_page_left(),
        Action::HalfPageRight => state.half_page_right(),
        Action::NextDifference => state.next_difference(),
        Action::PreviousDifference => state.previous_difference(),
        Action::EnterCommandMode => state.enter_command_mode(),
        Action::CommandChar(c) => state.command_input(c),
        Action::ExecuteCommand => state.execute_command(),
        Action::CancelCommand => state.cancel_command(),
        Action::CommandBackspace => state.command_backspace(),
        Action::Resize(_, _) => {
            // Resize is handled in the main loop with actual terminal dimensions
        }
        Action::ToggleHelp => state.toggle_help(),
        Action::DismissHelp => state.dismiss_help(),
        Action::AccumulateDigit(c) => state.accumulate_digit(c),
        Action::ExecuteGotoColumn => state.execute_goto_column(),
    }

    !state.should_quit
}
