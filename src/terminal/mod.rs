//! Terminal session for the demo host, restored automatically on drop.
//!
//! # Example
//!
//! ```no_run
//! use folio::terminal::{install_panic_hook, TerminalSession};
//!
//! fn main() -> color_eyre::Result<()> {
//!     install_panic_hook();
//!     let mut session = TerminalSession::new()?;
//!     session.terminal().draw(|frame| { let _ = frame.area(); })?;
//!     Ok(())
//! }
//! ```

mod panic;
mod setup;

pub use panic::install_panic_hook;
pub use setup::{emergency_restore, enter_tui_mode, leave_tui_mode};

use std::io::{self, Stdout};

use color_eyre::Result;
use crossterm::terminal::enable_raw_mode;
use ratatui::{backend::CrosstermBackend, Terminal};

/// Drop guard that leaves TUI mode exactly once.
struct RestoreGuard {
    restored: bool,
}

impl RestoreGuard {
    fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        leave_tui_mode(&mut io::stdout());
    }
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Raw-mode, alternate-screen terminal owned for the lifetime of the demo.
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    guard: RestoreGuard,
}

impl TerminalSession {
    /// Enter raw mode and the alternate screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be switched into TUI mode.
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        enter_tui_mode(&mut stdout)?;

        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;
        tracing::debug!("terminal session started");

        Ok(Self {
            terminal,
            guard: RestoreGuard { restored: false },
        })
    }

    pub fn terminal(&mut self) -> &mut Terminal<CrosstermBackend<Stdout>> {
        &mut self.terminal
    }

    /// Leave TUI mode before the session is dropped.
    pub fn restore(&mut self) -> Result<()> {
        self.guard.restore();
        self.terminal.show_cursor()?;
        Ok(())
    }
}
