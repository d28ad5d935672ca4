//! Host lifecycle forwarding.
//!
//! The enclosing host (a screen, a window, or a parent page) reports its own
//! lifecycle to the engine, which applies it to the top entry. A page is
//! only made visible once the host has started and only focused once the
//! host has resumed.

use crate::page::{lifecycle, PageRef};

use super::engine::StackEngine;
use super::pending::PendingOp;

/// How far the host has come up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostPhase {
    pub started: bool,
    pub resumed: bool,
}

impl HostPhase {
    /// Started and resumed.
    pub fn running() -> Self {
        Self {
            started: true,
            resumed: true,
        }
    }
}

impl StackEngine {
    /// The host became visible. Shows the top page.
    pub fn on_start(&mut self) {
        self.phase.started = true;
        tracing::debug!(nesting = self.nesting, "host started");
        if self.pending.is_some() {
            return;
        }
        if let Some(top) = self.entries.last() {
            lifecycle::show(&mut *top.page.borrow_mut());
        }
    }

    /// The host gained focus. Focuses the top page if it is visible.
    pub fn on_resume(&mut self) {
        self.phase.resumed = true;
        tracing::debug!(nesting = self.nesting, "host resumed");
        if self.pending.is_some() {
            return;
        }
        if let Some(top) = self.entries.last() {
            lifecycle::focus(&mut *top.page.borrow_mut());
        }
    }

    /// The host lost focus. Blurs every focused page.
    ///
    /// While a transition is in flight the outgoing page may still hold
    /// focus, so this is not limited to the top entry.
    pub fn on_pause(&mut self) {
        self.phase.resumed = false;
        tracing::debug!(nesting = self.nesting, "host paused");
        for page in self.live_pages() {
            lifecycle::blur(&mut *page.borrow_mut());
        }
    }

    /// The host is no longer visible. Hides every visible page.
    pub fn on_stop(&mut self) {
        self.phase.started = false;
        self.phase.resumed = false;
        tracing::debug!(nesting = self.nesting, "host stopped");
        for page in self.live_pages() {
            lifecycle::hide(&mut *page.borrow_mut());
        }
    }

    /// Pages still in the container, top first. An in-flight pop's outgoing
    /// page has left the stack but not the screen.
    fn live_pages(&self) -> Vec<PageRef> {
        let outgoing = self.pending.as_ref().and_then(|pending| match &pending.op {
            PendingOp::Pop { outgoing, .. } => Some(outgoing.page.clone()),
            PendingOp::Push { .. } => None,
        });
        outgoing
            .into_iter()
            .chain(self.entries.iter().rev().map(|entry| entry.page.clone()))
            .collect()
    }

    /// The host is going away. Destroys every page, top to bottom.
    ///
    /// An in-flight pop's outgoing page sits above the stack and is
    /// destroyed first. The engine rejects all further mutations.
    pub fn on_destroy(&mut self) {
        if self.destroyed {
            return;
        }
        tracing::info!(nesting = self.nesting, size = self.entries.len(), "destroying stack");

        self.phase = HostPhase::default();
        if let Some(pending) = self.pending.take() {
            if let PendingOp::Pop { outgoing, .. } = pending.op {
                self.destroy_entry(outgoing);
            }
        }
        while let Some(entry) = self.entries.pop() {
            self.destroy_entry(entry);
        }
        self.retained.clear();
        self.destroyed = true;
    }

    pub fn host_phase(&self) -> HostPhase {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_phase_is_stopped() {
        let phase = HostPhase::default();
        assert!(!phase.started);
        assert!(!phase.resumed);
        assert_eq!(
            HostPhase::running(),
            HostPhase {
                started: true,
                resumed: true
            }
        );
    }
}
