// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backup scopes: which artifact families a run produces.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One artifact family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Db,
    Files,
    Env,
    Caddy,
}

impl Scope {
    pub const ALL: [Scope; 4] = [Scope::Db, Scope::Files, Scope::Env, Scope::Caddy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Db => "db",
            Scope::Files => "files",
            Scope::Env => "env",
            Scope::Caddy => "caddy",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered scope subset. Backed by a `BTreeSet` so iteration order —
/// and with it tag order and work-dir creation order — is stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeSet(BTreeSet<Scope>);

impl ScopeSet {
    pub fn full() -> Self {
        Self(Scope::ALL.into_iter().collect())
    }

    pub fn contains(&self, scope: Scope) -> bool {
        self.0.contains(&scope)
    }

    /// The full set is tagged differently from any proper subset.
    pub fn is_full(&self) -> bool {
        self.0.len() == Scope::ALL.len()
    }

    pub fn label(&self) -> &'static str {
        if self.is_full() {
            "full"
        } else {
            "partial"
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Scope> + '_ {
        self.0.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<Scope> {
        self.0.iter().copied().collect()
    }
}

impl Default for ScopeSet {
    fn default() -> Self {
        Self::full()
    }
}

impl FromIterator<Scope> for ScopeSet {
    fn from_iter<T: IntoIterator<Item = Scope>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[path = "scope_tests.rs"]
mod tests;
