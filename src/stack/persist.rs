//! Saving and restoring a stack.
//!
//! Only factories are persisted, never pages: a [`SavedStack`] is the
//! ordered list of factory descriptors plus the deferred state of each
//! entry. Restoring replays the factories through the engine's
//! [`FactoryRegistry`](crate::factory::FactoryRegistry).

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{NavError, NavResult, RestoreError};
use crate::factory::Descriptor;
use crate::page::{lifecycle, PageState};

use super::engine::StackEngine;
use super::entry::EntryId;

/// Current on-disk format version.
pub const SAVED_STACK_VERSION: u32 = 1;

/// One persisted entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEntry {
    pub id: EntryId,
    pub factory: Descriptor,
    pub transition: Descriptor,
}

/// Persisted form of a whole stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedStack {
    #[serde(default)]
    pub version: u32,
    pub entries: Vec<SavedEntry>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub states: BTreeMap<EntryId, PageState>,
}

impl Default for SavedStack {
    fn default() -> Self {
        Self {
            version: SAVED_STACK_VERSION,
            entries: Vec::new(),
            states: BTreeMap::new(),
        }
    }
}

impl SavedStack {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Factory kinds, bottom to top.
    pub fn factory_kinds(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.factory.kind.as_str()).collect()
    }

    pub fn state(&self, id: EntryId) -> Option<&PageState> {
        self.states.get(&id)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and migrate a saved stack.
    ///
    /// # Errors
    ///
    /// [`RestoreError::Corrupt`] for malformed input and
    /// [`RestoreError::UnsupportedVersion`] for snapshots written by a newer
    /// format.
    pub fn from_json(json: &str) -> Result<Self, RestoreError> {
        let mut saved: SavedStack = serde_json::from_str(json)?;
        saved.check_version()?;
        saved.migrate();
        Ok(saved)
    }

    pub fn needs_migration(&self) -> bool {
        self.version < SAVED_STACK_VERSION
    }

    /// Upgrade an older snapshot in place.
    ///
    /// Version 0 snapshots predate the version field and carry state for
    /// entries that are no longer in the stack; those blobs are dropped.
    pub fn migrate(&mut self) {
        if !self.needs_migration() {
            return;
        }
        let from = self.version;
        let live: HashSet<EntryId> = self.entries.iter().map(|e| e.id).collect();
        self.states.retain(|id, _| live.contains(id));
        for state in self.states.values_mut() {
            if let Some(nested) = state.nested.as_mut() {
                nested.migrate();
            }
        }
        self.version = SAVED_STACK_VERSION;
        tracing::info!(from, to = SAVED_STACK_VERSION, "migrated saved stack");
    }

    fn check_version(&self) -> Result<(), RestoreError> {
        if self.version > SAVED_STACK_VERSION {
            return Err(RestoreError::UnsupportedVersion {
                found: self.version,
                supported: SAVED_STACK_VERSION,
            });
        }
        Ok(())
    }
}

impl StackEngine {
    /// Snapshot the stack.
    ///
    /// Mounted entries are captured fresh; unmounted entries contribute a
    /// copy of their retained state, which stays retained. An entry whose
    /// pop is still animating is already gone from the stack and is not
    /// saved.
    pub fn save_state(&mut self) -> NavResult<SavedStack> {
        if self.destroyed {
            return Err(NavError::Destroyed);
        }

        let mut saved = SavedStack::default();
        for entry in &self.entries {
            saved.entries.push(SavedEntry {
                id: entry.id,
                factory: Descriptor::of_page(entry.factory.as_ref()).map_err(NavError::Serialize)?,
                transition: Descriptor::of_transition(entry.transitions.as_ref())
                    .map_err(NavError::Serialize)?,
            });

            let mut page = entry.page.borrow_mut();
            if page.core().is_mounted() {
                saved.states.insert(entry.id, lifecycle::capture(&mut *page)?);
            } else if let Some(state) = self.retained.get(&entry.id) {
                saved.states.insert(entry.id, state.clone());
            }
        }

        tracing::info!(
            nesting = self.nesting,
            entries = saved.entries.len(),
            states = saved.states.len(),
            "stack saved"
        );
        Ok(saved)
    }

    /// Rebuild a saved stack into this engine.
    ///
    /// Every descriptor is resolved before anything is created, so a failure
    /// leaves the engine untouched. Entries are mounted bottom to top with
    /// their saved state; all but the top are left invisible, and the top is
    /// promoted as far as the host phase allows.
    ///
    /// # Errors
    ///
    /// [`NavError::InvalidArgument`] unless the engine is empty, or
    /// [`NavError::Restore`] for unknown kinds, duplicate ids and
    /// unsupported versions.
    pub fn restore_state(&mut self, saved: SavedStack) -> NavResult<()> {
        self.ensure_ready("restore_state")?;
        if !self.entries.is_empty() {
            return Err(NavError::invalid("restore_state requires an empty stack"));
        }

        let mut saved = saved;
        saved.check_version()?;
        saved.migrate();

        let mut seen = HashSet::with_capacity(saved.entries.len());
        let mut resolved = Vec::with_capacity(saved.entries.len());
        for entry in &saved.entries {
            if !seen.insert(entry.id) {
                return Err(RestoreError::DuplicateEntry(entry.id).into());
            }
            let factory = self.registry.page_factory(&entry.factory)?;
            let transition = self.registry.transition(&entry.transition)?;
            resolved.push((entry.id, factory, transition));
        }

        let mut states = saved.states;
        states.retain(|id, _| seen.contains(id));

        for (id, factory, transition) in resolved {
            let entry = self.create_entry(factory, transition, id);
            self.entries.push(entry);
        }

        let top = self.entries.len().saturating_sub(1);
        for index in 0..self.entries.len() {
            let id = self.entries[index].id;
            let view = self.mount_at(index, states.remove(&id));
            if index != top {
                if let Some(view) = view {
                    view.borrow_mut().set_visible(false);
                }
            }
        }

        if let Some(id) = self.top_id() {
            self.promote(id);
        }
        tracing::info!(nesting = self.nesting, size = self.entries.len(), "stack restored");
        self.notify();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn entry(kind: &str) -> SavedEntry {
        SavedEntry {
            id: EntryId::new(),
            factory: Descriptor::new(kind, Value::Null),
            transition: Descriptor::new("none", Value::Null),
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let mut saved = SavedStack::default();
        let first = entry("inbox");
        let mut state = PageState::new();
        state.put("scroll", &3).unwrap();
        saved.states.insert(first.id, state);
        saved.entries.push(first);
        saved.entries.push(entry("thread"));

        let back = SavedStack::from_json(&saved.to_json().unwrap()).unwrap();
        assert_eq!(back, saved);
        assert_eq!(back.factory_kinds(), vec!["inbox", "thread"]);
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let json = json!({"version": 99, "entries": []}).to_string();
        assert!(matches!(
            SavedStack::from_json(&json),
            Err(RestoreError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_garbage_is_corrupt() {
        assert!(matches!(SavedStack::from_json("{not json"), Err(RestoreError::Corrupt(_))));
    }

    #[test]
    fn test_unversioned_snapshot_is_migrated() {
        let live = entry("inbox");
        let stale = EntryId::new();
        let json = json!({
            "entries": [live],
            "states": {
                live.id.to_string(): {"values": {"a": 1}},
                stale.to_string(): {"values": {"b": 2}},
            }
        })
        .to_string();

        let saved = SavedStack::from_json(&json).unwrap();
        assert_eq!(saved.version, SAVED_STACK_VERSION);
        assert!(saved.state(live.id).is_some());
        assert!(saved.state(stale).is_none());
    }
}
