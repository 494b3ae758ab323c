//! Known-atom table consulted when decoding with [`AtomPolicy::ExistingOnly`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::term::SENTINEL_ATOMS;

/// Atoms every table starts with.
///
/// Covers the vocabulary of registry responses plus the local node name
/// carried by pids and references.
pub const DEFAULT_ATOMS: &[&str] = &[
    "ok",
    "error",
    "undefined",
    "infinity",
    "nonode@nohost",
];

/// How the decoder treats atoms it has not seen before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomPolicy {
    /// Atoms must already be present in the [`AtomTable`].
    #[default]
    ExistingOnly,
    /// Any atom is accepted.
    CreateNew,
}

/// Set of atom names considered to exist already.
#[derive(Debug, Clone)]
pub struct AtomTable {
    names: HashSet<String>,
}

impl AtomTable {
    /// Table holding only the `nil`/`true`/`false` sentinels.
    pub fn empty() -> Self {
        Self {
            names: SENTINEL_ATOMS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Add an atom name.
    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Whether `name` is known.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of known atoms.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table is empty (never true; sentinels are always present).
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for AtomTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.extend(DEFAULT_ATOMS.iter().copied());
        table
    }
}

impl<S: Into<String>> Extend<S> for AtomTable {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name);
        }
    }
}
