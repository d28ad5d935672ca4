//! Deferred navigation requests.
//!
//! A page cannot call into the engine that owns it: the engine is busy
//! driving the page when the page's hooks run. Pages instead hold a
//! [`Navigator`] and queue requests, which the engine executes on its next
//! idle scheduling turn.

use std::fmt;
use std::rc::Rc;

use tokio::sync::mpsc;

use crate::factory::PageFactory;
use crate::transition::{TransitionFactory, TransitionRef};

pub(crate) enum NavCommand {
    Push {
        factory: Box<dyn PageFactory>,
        transition: Option<TransitionRef>,
    },
    Pop,
    ReplaceAll {
        factory: Box<dyn PageFactory>,
        transition: Option<TransitionRef>,
    },
    ReplaceExceptFirst {
        factory: Box<dyn PageFactory>,
        transition: Option<TransitionRef>,
    },
    GoToFirst,
}

impl NavCommand {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            NavCommand::Push { .. } => "push",
            NavCommand::Pop => "pop",
            NavCommand::ReplaceAll { .. } => "replace_all",
            NavCommand::ReplaceExceptFirst { .. } => "replace_except_first",
            NavCommand::GoToFirst => "go_to_first",
        }
    }
}

/// Cloneable handle for queueing navigation on one engine.
///
/// Every method returns false if the engine no longer exists.
#[derive(Clone)]
pub struct Navigator {
    tx: mpsc::UnboundedSender<NavCommand>,
    nesting: usize,
}

impl Navigator {
    pub(crate) fn channel(nesting: usize) -> (Self, mpsc::UnboundedReceiver<NavCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, nesting }, rx)
    }

    pub fn push<F: PageFactory + 'static>(&self, factory: F) -> bool {
        self.send(NavCommand::Push {
            factory: Box::new(factory),
            transition: None,
        })
    }

    pub fn push_with<F, T>(&self, factory: F, transition: T) -> bool
    where
        F: PageFactory + 'static,
        T: TransitionFactory + 'static,
    {
        self.send(NavCommand::Push {
            factory: Box::new(factory),
            transition: Some(Rc::new(transition)),
        })
    }

    pub fn pop(&self) -> bool {
        self.send(NavCommand::Pop)
    }

    pub fn replace_all<F: PageFactory + 'static>(&self, factory: F) -> bool {
        self.send(NavCommand::ReplaceAll {
            factory: Box::new(factory),
            transition: None,
        })
    }

    pub fn replace_all_with<F, T>(&self, factory: F, transition: T) -> bool
    where
        F: PageFactory + 'static,
        T: TransitionFactory + 'static,
    {
        self.send(NavCommand::ReplaceAll {
            factory: Box::new(factory),
            transition: Some(Rc::new(transition)),
        })
    }

    pub fn replace_except_first<F: PageFactory + 'static>(&self, factory: F) -> bool {
        self.send(NavCommand::ReplaceExceptFirst {
            factory: Box::new(factory),
            transition: None,
        })
    }

    pub fn replace_except_first_with<F, T>(&self, factory: F, transition: T) -> bool
    where
        F: PageFactory + 'static,
        T: TransitionFactory + 'static,
    {
        self.send(NavCommand::ReplaceExceptFirst {
            factory: Box::new(factory),
            transition: Some(Rc::new(transition)),
        })
    }

    pub fn go_to_first(&self) -> bool {
        self.send(NavCommand::GoToFirst)
    }

    /// Depth of the target engine.
    pub fn nesting(&self) -> usize {
        self.nesting
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, command: NavCommand) -> bool {
        let name = command.name();
        match self.tx.send(command) {
            Ok(()) => {
                tracing::trace!(command = name, nesting = self.nesting, "navigation queued");
                true
            }
            Err(_) => {
                tracing::debug!(command = name, nesting = self.nesting, "navigator outlived its stack");
                false
            }
        }
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("nesting", &self.nesting)
            .field("closed", &self.is_closed())
            .finish()
    }
}
