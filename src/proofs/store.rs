use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::proofs::bundle::ResultSet;

/// Outcome of loading the persisted result document
#[derive(Debug)]
pub enum LoadResult {
    Found(ResultSet),
    Absent,
}

/// Whole-document persistence for the [`ResultSet`].
///
/// Discipline: read the entire set, mutate in memory, rewrite the entire
/// file. The serialized form is fully key-sorted so reruns diff cleanly.
#[derive(Debug, Clone)]
pub struct ProofStore {
    path: PathBuf,
}

impl ProofStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted set; a missing file is a cold start, not an error
    pub fn load(&self) -> Result<LoadResult> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LoadResult::Absent),
            Err(e) => {
                return Err(e).context(format!("failed to read {}", self.path.display()));
            }
        };
        let set = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        Ok(LoadResult::Found(set))
    }

    /// Load the persisted set, starting empty on a cold start
    pub fn load_or_default(&self) -> Result<ResultSet> {
        Ok(match self.load()? {
            LoadResult::Found(set) => set,
            LoadResult::Absent => ResultSet::default(),
        })
    }

    /// Rewrite the whole document, keys sorted
    pub fn save(&self, set: &ResultSet) -> Result<()> {
        // Route through Value: serde_json object maps are ordered, which
        // pins struct fields and bundle names to one stable key order.
        let value = serde_json::to_value(set).context("failed to serialize result set")?;
        let raw = serde_json::to_string_pretty(&value)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}
