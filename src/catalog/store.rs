//! In-memory title store.

use std::sync::{Mutex, MutexGuard};

/// Titles the catalog starts with when no seed is configured.
pub const SEED_TITLES: [&str; 5] = [
    "ASP за 10 дней",
    "ASP за 5 дней",
    "ASP за 1 дней",
    "Комикс",
    "Преступление и наказание",
];

/// Ordered, shared sequence of book titles.
///
/// Every operation takes the lock once, so concurrent requests observe a
/// linearizable history.
#[derive(Debug)]
pub struct CatalogStore {
    titles: Mutex<Vec<String>>,
}

impl CatalogStore {
    /// Create a store holding `titles` in the given order.
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            titles: Mutex::new(titles.into_iter().map(Into::into).collect()),
        }
    }

    /// Create a store holding the default seed titles.
    pub fn seeded() -> Self {
        Self::new(SEED_TITLES)
    }

    // The vector has no invariant a panicking holder could break.
    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.titles.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the full catalog.
    pub fn list_all(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Title at `index`, if `0 <= index < len`.
    pub fn get_at(&self, index: i64) -> Option<String> {
        let index = usize::try_from(index).ok()?;
        self.lock().get(index).cloned()
    }

    /// Append `title` to the end of the catalog.
    pub fn add(&self, title: impl Into<String>) {
        self.lock().push(title.into());
    }

    /// Overwrite the first title equal to `old` with `new`.
    ///
    /// Returns `(true, new)` when a slot was replaced and `(false, "")` on a
    /// miss. Nothing is inserted on a miss.
    pub fn replace_first_match(&self, old: &str, new: &str) -> (bool, String) {
        let mut titles = self.lock();
        match titles.iter().position(|t| t == old) {
            Some(pos) => {
                titles[pos] = new.to_string();
                (true, new.to_string())
            }
            None => (false, String::new()),
        }
    }

    /// Remove the first title equal to `title`.
    pub fn remove_first_match(&self, title: &str) -> bool {
        if title.is_empty() {
            return false;
        }
        let mut titles = self.lock();
        match titles.iter().position(|t| t == title) {
            Some(pos) => {
                titles.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Number of titles currently held.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the catalog holds no titles.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::seeded()
    }
}
