//! Entering and leaving TUI mode.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};

/// Switch to the alternate screen and hide the cursor.
pub fn enter_tui_mode<W: Write>(writer: &mut W) -> io::Result<()> {
    execute!(writer, EnterAlternateScreen, Hide)
}

/// Undo [`enter_tui_mode`] and raw mode. Errors are ignored so this is
/// safe to call from drop and panic paths, and more than once.
pub fn leave_tui_mode<W: Write>(writer: &mut W) {
    let _ = disable_raw_mode();
    let _ = execute!(writer, LeaveAlternateScreen, Show);
    let _ = writer.flush();
}

/// Best-effort restore of the process's own stdout.
pub fn emergency_restore() {
    leave_tui_mode(&mut io::stdout());
}
