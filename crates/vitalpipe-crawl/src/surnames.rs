//! Surname reference list
//!
//! External collaborator, file interface: one `id<TAB>surname` pair per
//! line, `#` comments and blank lines ignored. The original reference
//! list carries roughly 18 800 entries.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

#[derive(Debug)]
pub struct SurnameList {
    entries: BTreeMap<u32, String>,
}

impl SurnameList {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read surname list: {}", path.display()))?;

        let mut entries = BTreeMap::new();
        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (id, name) = line
                .split_once('\t')
                .with_context(|| format!("{}:{}: expected id<TAB>surname", path.display(), lineno + 1))?;
            let id: u32 = id
                .parse()
                .with_context(|| format!("{}:{}: bad surname id {id:?}", path.display(), lineno + 1))?;
            entries.insert(id, name.trim().to_string());
        }

        log::info!("loaded {} surnames from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (u32, String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    /// Entries in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
