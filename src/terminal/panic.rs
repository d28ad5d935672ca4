use std::panic;

use super::setup::emergency_restore;

/// Restore the terminal before the panic message is printed.
///
/// Install before creating a [`TerminalSession`](super::TerminalSession).
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        emergency_restore();
        previous(info);
    }));
}
