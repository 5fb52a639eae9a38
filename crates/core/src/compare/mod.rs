//! Bounded comparison selection.
//!
//! Holds up to `max` listings in selection order with no duplicate ids and
//! mirrors the full list to storage after every change. Exceeding the
//! capacity is an expected user action and is reported as a value, never a
//! panic or a storage error.

pub mod cache;
pub mod normalize;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{Error, Storage};

pub use cache::{CompareCache, CompareCacheEntry, CompareCacheType};
pub use normalize::{normalize, sanitize};

/// Storage key for the selected items.
pub const STORAGE_KEY: &str = "kind:compareItems";

/// Default capacity.
pub const DEFAULT_MAX: usize = 3;

/// A record that can be selected for comparison.
///
/// Only `id` and `title` are inspected; everything else is carried through.
pub trait Selectable: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
}

/// What a successful toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// The item had no id.
    Unchanged,
}

/// Why a toggle was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("at most {max} items can be compared")]
    CapacityReached { max: usize },
}

impl SelectionError {
    /// Short machine-readable reason.
    pub fn reason(&self) -> &'static str {
        match self {
            SelectionError::CapacityReached { .. } => "max",
        }
    }
}

impl From<SelectionError> for Error {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::CapacityReached { max } => Error::CapacityReached { max },
        }
    }
}

/// Ordered, deduplicated, capacity-bounded selection.
#[derive(Debug)]
pub struct CompareStore<T> {
    items: Vec<T>,
    max: usize,
    storage: Storage,
}

impl<T: Selectable> CompareStore<T> {
    /// Restore the selection from storage.
    ///
    /// Whatever is stored is passed through [`normalize`]; the sanitized list
    /// is written back immediately.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `max` is 0.
    pub async fn load(storage: Storage, max: usize) -> Result<Self, Error> {
        ensure_capacity(max)?;

        let raw: Value = storage.read(STORAGE_KEY, Value::Null).await;
        let items = normalize(raw, max);
        tracing::debug!(count = items.len(), max, "restored compare selection");

        let store = Self { items, max, storage };
        store.persist().await;
        Ok(store)
    }

    /// Selected items in selection order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.max
    }

    /// Whether an item with this id (whitespace-trimmed) is selected.
    pub fn is_selected(&self, id: &str) -> bool {
        let target = id.trim();
        if target.is_empty() {
            return false;
        }
        self.items.iter().any(|item| item.id() == target)
    }

    /// Remove the item if it is selected, otherwise append it.
    ///
    /// # Errors
    ///
    /// Returns `SelectionError::CapacityReached` when appending would exceed
    /// `max`; the selection is left unchanged.
    pub async fn toggle(&mut self, item: T) -> Result<ToggleOutcome, SelectionError> {
        if item.id().trim().is_empty() {
            return Ok(ToggleOutcome::Unchanged);
        }

        if let Some(pos) = self.items.iter().position(|existing| existing.id() == item.id()) {
            self.items.remove(pos);
            self.persist().await;
            return Ok(ToggleOutcome::Removed);
        }

        if self.is_full() {
            tracing::debug!(id = item.id(), max = self.max, "compare selection full");
            return Err(SelectionError::CapacityReached { max: self.max });
        }

        self.items.push(item);
        self.persist().await;
        Ok(ToggleOutcome::Added)
    }

    /// Remove the item with this id (whitespace-trimmed), if present.
    ///
    /// Returns whether anything was removed.
    pub async fn remove(&mut self, id: &str) -> bool {
        let target = id.trim();
        if target.is_empty() {
            return false;
        }

        let before = self.items.len();
        self.items.retain(|item| item.id() != target);
        let removed = self.items.len() != before;
        if removed {
            self.persist().await;
        }
        removed
    }

    /// Empty the selection.
    pub async fn clear(&mut self) {
        self.items.clear();
        self.persist().await;
    }

    /// Change the capacity, dropping any now-excess tail.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `max` is 0.
    pub async fn set_max(&mut self, max: usize) -> Result<(), Error> {
        ensure_capacity(max)?;
        self.max = max;

        let before = self.items.len();
        self.items = sanitize(std::mem::take(&mut self.items), max);
        if self.items.len() != before {
            self.persist().await;
        }
        Ok(())
    }

    async fn persist(&self) {
        self.storage.write_best_effort(STORAGE_KEY, &self.items).await;
    }
}

fn ensure_capacity(max: usize) -> Result<(), Error> {
    if max == 0 {
        return Err(Error::InvalidInput("compare capacity must be at least 1".into()));
    }
    Ok(())
}
