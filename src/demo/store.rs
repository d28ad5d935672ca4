//! Saved-stack file.

use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;

use crate::stack::SavedStack;

const APP_DIR: &str = "folio";
const STACK_FILE: &str = "stack.json";

/// Where the demo keeps its saved stack between runs.
#[derive(Debug, Clone)]
pub struct StackStore {
    path: PathBuf,
}

impl StackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/folio/stack.json`.
    pub fn at_default_location() -> Result<Self> {
        let base = dirs::data_dir().ok_or_else(|| eyre!("no data directory for this platform"))?;
        Ok(Self::new(base.join(APP_DIR).join(STACK_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> Option<&Path> {
        self.path.parent()
    }

    /// Read the saved stack. A missing file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<SavedStack>> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).wrap_err_with(|| format!("reading {}", self.path.display()));
            }
        };
        let saved = SavedStack::from_json(&json)
            .wrap_err_with(|| format!("parsing {}", self.path.display()))?;
        Ok(Some(saved))
    }

    /// Write the stack, replacing the file atomically.
    pub fn save(&self, saved: &SavedStack) -> Result<()> {
        if let Some(dir) = self.dir() {
            fs::create_dir_all(dir).wrap_err_with(|| format!("creating {}", dir.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, saved.to_json()?).wrap_err_with(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).wrap_err_with(|| format!("replacing {}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), entries = saved.len(), "stack written");
        Ok(())
    }

    /// Delete the saved stack if there is one.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).wrap_err_with(|| format!("removing {}", self.path.display())),
        }
    }
}
