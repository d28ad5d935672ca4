use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::factory::PageFactory;
use crate::page::PageRef;
use crate::traits::ViewRef;
use crate::transition::TransitionRef;

/// Identity of a stack entry, stable across save and restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EntryId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// One position in a stack: the page, the factory that built it, and the
/// transitions it enters and leaves with.
pub(crate) struct StackEntry {
    pub(crate) id: EntryId,
    pub(crate) factory: Box<dyn PageFactory>,
    pub(crate) page: PageRef,
    pub(crate) transitions: TransitionRef,
}

impl StackEntry {
    pub(crate) fn is_mounted(&self) -> bool {
        self.page.borrow().core().is_mounted()
    }

    pub(crate) fn view(&self) -> Option<ViewRef> {
        self.page.borrow().core().view().ok().cloned()
    }

    pub(crate) fn name(&self) -> &'static str {
        self.page.borrow().name()
    }
}

impl fmt::Debug for StackEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackEntry")
            .field("id", &self.id)
            .field("kind", &self.factory.kind())
            .field("transition", &self.transitions.kind())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(EntryId::new(), EntryId::new());
    }

    #[test]
    fn test_id_serializes_as_plain_uuid() {
        let id = EntryId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));

        let back: EntryId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
