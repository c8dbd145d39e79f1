//! Viewer controller.
//!
//! Owns the terminal for the lifetime of the interactive viewer:
//! raw mode and the alternate screen are entered on creation and restored on
//! drop, even when the loop exits with an error.

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::event::{apply_action, handle_event, poll_event, Action};
use crate::model::AppState;
use crate::ui::glyphs::Glyphs;
use crate::ui::{calculate_visible_columns, render};

/// The interactive comparison viewer.
pub struct App {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    state: AppState,
    glyphs: Glyphs,
    /// Event poll timeout
    tick_rate: Duration,
}

impl App {
    /// Takes over the terminal and creates the viewer.
    pub fn new(state: AppState, glyphs: Glyphs) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            state,
            glyphs,
            tick_rate: Duration::from_millis(50),
        })
    }

    /// Runs the main loop until the user quits.
    pub fn run(&mut self) -> Result<()> {
        self.update_viewport_size()?;

        loop {
            let (state, glyphs) = (&self.state, &self.glyphs);
            self.terminal.draw(|frame| render(frame, state, glyphs))?;

            if let Some(event) = poll_event(self.tick_rate) {
                let has_number_prefix = !self.state.number_buffer.is_empty();
                let action = handle_event(event, &self.state.mode, self.state.show_help, has_number_prefix);

                // Handle resize specially to update viewport
                if let Action::Resize(_, _) = action {
                    self.update_viewport_size()?;
                }

                if !apply_action(&mut self.state, action) {
                    break;
                }
            }
        }

        Ok(())
    }

    fn update_viewport_size(&mut self) -> Result<()> {
        let size = self.terminal.size()?;
        self.state.update_viewport_size(calculate_visible_columns(size.width));
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Runs the interactive viewer on a comparison.
pub fn run_app(state: AppState, glyphs: Glyphs) -> Result<()> {
    let mut app = App::new(state, glyphs)?;
    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::parse_and_align;

    #[test]
    fn test_app_state_creation() {
        let report = parse_and_align(">ref\nACGTACGT\n", ">alt\nACGAACGT\n").unwrap();
        let mut state = AppState::new(report);
        state.update_viewport_size(calculate_visible_columns(30));

        assert_eq!(state.alignment_length(), 8);
        assert_eq!(state.viewport.visible_cols, 8);
        assert!(!state.should_quit);
        assert!(state.status_message.as_deref().unwrap_or("").contains("1 difference"));

        assert!(apply_action(&mut state, Action::NextDifference));
        assert_eq!(state.cursor, 3);
        assert!(!apply_action(&mut state, Action::Quit));
        assert!(state.should_quit);
    }
}
