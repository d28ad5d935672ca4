//! The single in-flight transition of an engine.

use tokio::sync::oneshot::{self, error::TryRecvError};

use super::entry::{EntryId, StackEntry};

/// Structural change whose completion step is still outstanding.
#[derive(Debug)]
pub(crate) enum PendingOp {
    Push {
        incoming: EntryId,
        outgoing: Option<EntryId>,
    },
    /// The popped entry is already out of the stack but its view stays in
    /// the container until the exit transition ends.
    Pop {
        incoming: EntryId,
        outgoing: StackEntry,
    },
}

impl PendingOp {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            PendingOp::Push { .. } => "push",
            PendingOp::Pop { .. } => "pop",
        }
    }
}

#[derive(Debug)]
enum Phase {
    /// Waiting one scheduling turn so the new view can lay out.
    AwaitingLayout,
    /// Transitions are running; one receiver per transition.
    Running(Vec<oneshot::Receiver<()>>),
}

#[derive(Debug)]
pub(crate) struct PendingTransition {
    pub(crate) op: PendingOp,
    phase: Phase,
}

impl PendingTransition {
    pub(crate) fn new(op: PendingOp) -> Self {
        Self {
            op,
            phase: Phase::AwaitingLayout,
        }
    }

    pub(crate) fn awaiting_layout(&self) -> bool {
        matches!(self.phase, Phase::AwaitingLayout)
    }

    pub(crate) fn start(&mut self, waits: Vec<oneshot::Receiver<()>>) {
        self.phase = Phase::Running(waits);
    }

    /// Drop every completed transition. True once none remain.
    pub(crate) fn poll_completion(&mut self) -> bool {
        let Phase::Running(waits) = &mut self.phase else {
            return false;
        };
        waits.retain_mut(|rx| match rx.try_recv() {
            Ok(()) => false,
            Err(TryRecvError::Empty) => true,
            Err(TryRecvError::Closed) => {
                tracing::warn!("transition dropped without completing, treating it as done");
                false
            }
        });
        waits.is_empty()
    }
}
