//! Occurrence identity and per-run resolution state.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

/// Identity of one analysis run. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Identity of one located occurrence within one run: `{run}-{ordinal}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OccurrenceId(String);

impl OccurrenceId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mints occurrence ids for a single run.
///
/// Ids are derived from the run id and a counter, so replaying the same
/// locate pass under the same run yields the same ids.
#[derive(Debug)]
pub struct IdMinter {
    run: RunId,
    next: usize,
}

impl IdMinter {
    pub fn new(run: RunId) -> Self {
        Self { run, next: 0 }
    }

    pub fn mint(&mut self) -> OccurrenceId {
        let id = OccurrenceId(format!("{}-{}", self.run, self.next));
        self.next += 1;
        id
    }

    pub fn minted(&self) -> usize {
        self.next
    }
}

/// The set of occurrences the user has marked resolved.
///
/// Only explicit `resolve`/`unresolve`/`reset` calls mutate it. Ids are not
/// checked against any run: an update racing a reset is simply a no-op
/// against the fresh state.
#[derive(Debug, Default, Clone)]
pub struct ResolutionStore {
    resolved: HashSet<OccurrenceId>,
}

impl ResolutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` resolved. Returns `true` if it was not already.
    pub fn resolve(&mut self, id: &OccurrenceId) -> bool {
        let changed = self.resolved.insert(id.clone());
        if changed {
            debug!(occurrence = %id, "resolved");
        }
        changed
    }

    /// Mark `id` unresolved. Returns `true` if it was resolved.
    pub fn unresolve(&mut self, id: &OccurrenceId) -> bool {
        let changed = self.resolved.remove(id);
        if changed {
            debug!(occurrence = %id, "unresolved");
        }
        changed
    }

    /// Flip `id` and return its new state.
    pub fn toggle(&mut self, id: &OccurrenceId) -> bool {
        if self.unresolve(id) {
            false
        } else {
            self.resolve(id)
        }
    }

    pub fn is_resolved(&self, id: &OccurrenceId) -> bool {
        self.resolved.contains(id)
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    /// Forget every resolution.
    pub fn reset(&mut self) {
        if !self.resolved.is_empty() {
            debug!(cleared = self.resolved.len(), "resolution state reset");
        }
        self.resolved.clear();
    }
}
