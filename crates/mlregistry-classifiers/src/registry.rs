//! Identifier -> classifier instance registry
//!
//! Locking discipline:
//! - the map lock guards insert, erase and lookup only, and is never held
//!   across an await or a classifier call;
//! - each entry owns an async mutex around its classifier, held by a handler
//!   for its whole body, which serializes operations per identifier;
//! - an entry can be flagged busy while a long-running operation owns it on a
//!   blocking worker; shared-path access fails fast with `Busy` meanwhile.

use crate::classifier::{Classifier, ClassifierState};
use mlregistry_core::{Error, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};
use tracing::{debug, info, warn};

/// A live classifier instance and its identity
pub struct ClassifierEntry {
    id: String,
    class_type: String,
    generation: u64,
    busy: AtomicBool,
    classifier: Arc<Mutex<Box<dyn Classifier>>>,
}

impl ClassifierEntry {
    fn new(id: String, class_type: String, generation: u64, classifier: Box<dyn Classifier>) -> Self {
        Self {
            id,
            class_type,
            generation,
            busy: AtomicBool::new(false),
            classifier: Arc::new(Mutex::new(classifier)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Canonical class type the instance was resolved from
    pub fn class_type(&self) -> &str {
        &self.class_type
    }

    /// Insert sequence number; a replacement always has a larger one
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a long-running operation currently owns the instance
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Wait for the instance, failing fast with `Busy` if a long-running
    /// operation owns it.
    pub async fn lock(&self) -> Result<MutexGuard<'_, Box<dyn Classifier>>> {
        if self.is_busy() {
            return Err(Error::busy(&self.id));
        }
        Ok(self.classifier.lock().await)
    }

    /// Mark the entry busy and take the instance as an owned guard that can
    /// move to a blocking worker. The busy flag clears when the guard drops.
    pub async fn lock_exclusive(self: &Arc<Self>) -> Result<ExclusiveGuard> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::busy(&self.id));
        }
        // Clears the flag even if this future is dropped while waiting.
        let mark = BusyMark {
            entry: Arc::clone(self),
        };

        let guard = Arc::clone(&self.classifier).lock_owned().await;
        Ok(ExclusiveGuard { guard, mark })
    }

    /// Summary without waiting on the instance lock.
    ///
    /// The state is `None` while another call holds the instance.
    pub fn summary(&self) -> ClassifierSummary {
        let state = self.classifier.try_lock().ok().map(|c| c.state());
        ClassifierSummary {
            identifier: self.id.clone(),
            class_type: self.class_type.clone(),
            generation: self.generation,
            busy: self.is_busy(),
            state,
        }
    }
}

impl std::fmt::Debug for ClassifierEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierEntry")
            .field("id", &self.id)
            .field("class_type", &self.class_type)
            .field("generation", &self.generation)
            .field("busy", &self.is_busy())
            .finish()
    }
}

/// Owned, busy-flagged access to a classifier instance
pub struct ExclusiveGuard {
    guard: OwnedMutexGuard<Box<dyn Classifier>>,
    mark: BusyMark,
}

impl ExclusiveGuard {
    pub fn entry(&self) -> &Arc<ClassifierEntry> {
        &self.mark.entry
    }
}

impl Deref for ExclusiveGuard {
    type Target = Box<dyn Classifier>;

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl DerefMut for ExclusiveGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

struct BusyMark {
    entry: Arc<ClassifierEntry>,
}

impl Drop for BusyMark {
    fn drop(&mut self) {
        self.entry.busy.store(false, Ordering::Release);
    }
}

/// Point-in-time description of an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierSummary {
    pub identifier: String,
    pub class_type: String,
    pub generation: u64,
    pub busy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<ClassifierState>,
}

/// Registry owning every live classifier instance by identifier
#[derive(Debug, Default)]
pub struct ClassifierRegistry {
    entries: RwLock<HashMap<String, Arc<ClassifierEntry>>>,
    next_generation: AtomicU64,
}

impl ClassifierRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `classifier` under `id`, replacing any existing entry.
    ///
    /// Returns the replaced entry. The swap happens under the map lock, so
    /// every lookup sees either the old entry or the new one.
    pub fn create(
        &self,
        id: impl Into<String>,
        class_type: impl Into<String>,
        classifier: Box<dyn Classifier>,
    ) -> Option<Arc<ClassifierEntry>> {
        let id = id.into();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let entry = Arc::new(ClassifierEntry::new(
            id.clone(),
            class_type.into(),
            generation,
            classifier,
        ));

        let previous = self.entries.write().insert(id.clone(), Arc::clone(&entry));

        match &previous {
            Some(old) => warn!(
                "ID already exists, overwriting: {} ({} -> {})",
                id,
                old.class_type(),
                entry.class_type()
            ),
            None => info!("Registered classifier '{}' ({})", id, entry.class_type()),
        }

        previous
    }

    /// Look up the live entry for `id`
    pub fn lookup(&self, id: &str) -> Option<Arc<ClassifierEntry>> {
        self.entries.read().get(id).cloned()
    }

    /// Look up `id`, failing with `UnknownIdentifier` when absent
    pub fn get(&self, id: &str) -> Result<Arc<ClassifierEntry>> {
        self.lookup(id).ok_or_else(|| Error::unknown_identifier(id))
    }

    /// Remove the entry for `id`; returns whether anything was removed
    pub fn erase(&self, id: &str) -> bool {
        let removed = self.entries.write().remove(id).is_some();
        if removed {
            debug!("Erased classifier '{}'", id);
        }
        removed
    }

    /// Remove the entry for `id` unless a long-running operation owns it.
    ///
    /// The busy check and the removal happen under one write lock, so the
    /// entry that was checked is the entry that gets removed.
    pub fn erase_idle(&self, id: &str) -> Result<Arc<ClassifierEntry>> {
        let mut entries = self.entries.write();

        let busy = match entries.get(id) {
            Some(entry) => entry.is_busy(),
            None => return Err(Error::unknown_identifier(id)),
        };
        if busy {
            return Err(Error::busy(id));
        }

        let removed = entries
            .remove(id)
            .ok_or_else(|| Error::unknown_identifier(id))?;
        debug!("Erased classifier '{}'", id);
        Ok(removed)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().contains_key(id)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Sorted identifiers of all live entries
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Summaries of all live entries, sorted by identifier
    pub fn summaries(&self) -> Vec<ClassifierSummary> {
        let entries: Vec<Arc<ClassifierEntry>> = self.entries.read().values().cloned().collect();
        let mut summaries: Vec<ClassifierSummary> = entries.iter().map(|e| e.summary()).collect();
        summaries.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        summaries
    }
}
