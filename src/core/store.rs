//! Persisted translation store
//!
//! Holds history, favorites and preferences. Every mutation is a read-modify-write
//! of the whole snapshot under one lock, followed by a write-back of the full
//! snapshot. A failed write-back is logged and the in-memory update stands.

pub mod storage;

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::shared::error::AppResult;
use crate::shared::settings::ClientSettings;
use crate::shared::types::{
    FavoriteEntry, HistoryEntry, Preferences, PreferencesPatch, TranslationRecord,
};

pub use storage::{InMemoryStorage, RedbStorage, Storage, StoreSnapshot, STORE_KEY};

pub struct TranslationStore {
    snapshot: Mutex<StoreSnapshot>,
    storage: Arc<dyn Storage>,
}

impl TranslationStore {
    /// Hydrate from `storage`. Missing or unreadable records start empty.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let snapshot = match storage.load() {
            Ok(Some(snapshot)) => {
                tracing::info!(
                    history = snapshot.history.len(),
                    favorites = snapshot.favorites.len(),
                    "translation store loaded"
                );
                snapshot
            }
            Ok(None) => {
                tracing::info!("no saved translations, starting empty");
                StoreSnapshot::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "saved translations unreadable, starting empty");
                StoreSnapshot::default()
            }
        };

        Self {
            snapshot: Mutex::new(snapshot),
            storage,
        }
    }

    /// Open the database at `path`, falling back to memory if it cannot be opened.
    pub fn open(path: &Path) -> Self {
        let storage: Arc<dyn Storage> = match RedbStorage::open(path) {
            Ok(storage) => Arc::new(storage),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to open translation database, using in-memory fallback");
                Arc::new(InMemoryStorage::new())
            }
        };
        Self::new(storage)
    }

    pub fn from_settings(settings: &ClientSettings) -> AppResult<Self> {
        Ok(Self::open(&settings.database_path()?))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStorage::new()))
    }

    fn lock(&self) -> MutexGuard<'_, StoreSnapshot> {
        match self.snapshot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("translation store mutex poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Apply `change` under the lock; write back when it reports a modification.
    fn mutate<R>(&self, change: impl FnOnce(&mut StoreSnapshot) -> (R, bool)) -> R {
        let mut snapshot = self.lock();
        let (outcome, changed) = change(&mut snapshot);
        if changed {
            if let Err(e) = self.storage.save(&snapshot) {
                tracing::error!(error = %e, "failed to persist translation store");
            }
        }
        outcome
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.lock().clone()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.lock().history.clone()
    }

    pub fn favorites(&self) -> Vec<FavoriteEntry> {
        self.lock().favorites.clone()
    }

    pub fn preferences(&self) -> Preferences {
        self.lock().preferences.clone()
    }

    pub fn find_history(&self, id: &str) -> Option<HistoryEntry> {
        self.lock().history.iter().find(|entry| entry.id == id).cloned()
    }

    /// Record a translation at the head of the history.
    ///
    /// Returns `None` without touching the store when `save_history` is off.
    pub fn add_to_history(&self, record: TranslationRecord) -> Option<HistoryEntry> {
        self.mutate(|snapshot| {
            if !snapshot.preferences.save_history {
                tracing::debug!("history saving disabled, skipping record");
                return (None, false);
            }
            let entry = HistoryEntry::new(record);
            snapshot.history.insert(0, entry.clone());
            snapshot.history.truncate(snapshot.preferences.max_history_items);
            (Some(entry), true)
        })
    }

    pub fn remove_from_history(&self, id: &str) -> bool {
        self.mutate(|snapshot| {
            let before = snapshot.history.len();
            snapshot.history.retain(|entry| entry.id != id);
            let removed = snapshot.history.len() != before;
            (removed, removed)
        })
    }

    pub fn clear_history(&self) {
        self.mutate(|snapshot| {
            snapshot.history.clear();
            ((), true)
        });
        tracing::info!("translation history cleared");
    }

    /// `None` when a favorite with the same original text and source language exists.
    pub fn add_to_favorites(&self, record: TranslationRecord) -> Option<FavoriteEntry> {
        self.mutate(|snapshot| {
            let exists = snapshot
                .favorites
                .iter()
                .any(|fav| fav.same_key(&record.original_text, &record.source_language));
            if exists {
                return (None, false);
            }
            let favorite = FavoriteEntry::new(record);
            snapshot.favorites.insert(0, favorite.clone());
            (Some(favorite), true)
        })
    }

    pub fn remove_from_favorites(&self, favorite_id: &str) -> bool {
        self.mutate(|snapshot| {
            let before = snapshot.favorites.len();
            snapshot.favorites.retain(|fav| fav.favorite_id != favorite_id);
            let removed = snapshot.favorites.len() != before;
            (removed, removed)
        })
    }

    pub fn is_favorite(&self, original_text: &str, source_language: &str) -> bool {
        self.lock()
            .favorites
            .iter()
            .any(|fav| fav.same_key(original_text, source_language))
    }

    pub fn update_preferences(&self, patch: PreferencesPatch) -> Preferences {
        self.mutate(|snapshot| {
            snapshot.preferences.merge(patch);
            (snapshot.preferences.clone(), true)
        })
    }

    /// Case-insensitive substring match on original or translated text.
    pub fn search_history(&self, query: &str) -> Vec<HistoryEntry> {
        let query = query.to_lowercase();
        self.lock()
            .history
            .iter()
            .filter(|entry| entry.matches(&query))
            .cloned()
            .collect()
    }

    pub fn history_by_language(&self, source_language: &str, target_language: &str) -> Vec<HistoryEntry> {
        self.lock()
            .history
            .iter()
            .filter(|entry| {
                entry.source_language == source_language && entry.target_language == target_language
            })
            .cloned()
            .collect()
    }

    /// [`Self::search_history`] narrowed to one direction when `direction` is given.
    pub fn query_history(&self, search: Option<&str>, direction: Option<(&str, &str)>) -> Vec<HistoryEntry> {
        let mut entries = match search {
            Some(query) => self.search_history(query),
            None => self.history(),
        };
        if let Some((source, target)) = direction {
            let ids: HashSet<String> = self
                .history_by_language(source, target)
                .into_iter()
                .map(|entry| entry.id)
                .collect();
            entries.retain(|entry| ids.contains(&entry.id));
        }
        entries
    }
}
