//! Storage backends for the translation store
//!
//! The whole store is one record: a CBOR-encoded [`StoreSnapshot`] kept under a
//! fixed key. Backends only load and replace that record.

use std::path::Path;
use std::sync::Mutex;

use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};

use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{FavoriteEntry, HistoryEntry, Preferences};

/// Key: record name, Value: CBOR-encoded snapshot
const STORE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("translation_store");
pub const STORE_KEY: &str = "translation_history";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSnapshot {
    pub history: Vec<HistoryEntry>,
    pub favorites: Vec<FavoriteEntry>,
    pub preferences: Preferences,
}

pub trait Storage: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> AppResult<Option<StoreSnapshot>>;
    fn save(&self, snapshot: &StoreSnapshot) -> AppResult<()>;
}

pub(crate) fn encode(snapshot: &StoreSnapshot) -> AppResult<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(snapshot, &mut buf)
        .map_err(|e| AppError::Storage(format!("Failed to encode snapshot: {}", e)))?;
    Ok(buf)
}

pub(crate) fn decode(bytes: &[u8]) -> AppResult<StoreSnapshot> {
    ciborium::from_reader(bytes)
        .map_err(|e| AppError::Storage(format!("Failed to decode snapshot: {}", e)))
}

/// redb-backed storage
pub struct RedbStorage {
    db: Database,
}

impl RedbStorage {
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("Failed to create data directory: {}", e)))?;
        }

        let db = Database::create(path)
            .map_err(|e| AppError::Storage(format!("Failed to create database: {}", e)))?;

        // Initialize table
        {
            let write_txn = db
                .begin_write()
                .map_err(|e| AppError::Storage(format!("Failed to begin write transaction: {}", e)))?;
            {
                let _table = write_txn
                    .open_table(STORE_TABLE)
                    .map_err(|e| AppError::Storage(format!("Failed to open table: {}", e)))?;
            }
            write_txn
                .commit()
                .map_err(|e| AppError::Storage(format!("Failed to commit transaction: {}", e)))?;
        }

        Ok(Self { db })
    }

    fn put_raw(&self, bytes: &[u8]) -> AppResult<()> {
        let write_txn = self
            .db
            .begin_write()
            .map_err(|e| AppError::Storage(format!("Failed to begin write: {}", e)))?;
        {
            let mut table = write_txn
                .open_table(STORE_TABLE)
                .map_err(|e| AppError::Storage(format!("Failed to open table: {}", e)))?;
            table
                .insert(STORE_KEY, bytes)
                .map_err(|e| AppError::Storage(format!("Failed to insert: {}", e)))?;
        }
        write_txn
            .commit()
            .map_err(|e| AppError::Storage(format!("Failed to commit: {}", e)))
    }
}

impl Storage for RedbStorage {
    fn load(&self) -> AppResult<Option<StoreSnapshot>> {
        let read_txn = self
            .db
            .begin_read()
            .map_err(|e| AppError::Storage(format!("Failed to begin read: {}", e)))?;
        let table = read_txn
            .open_table(STORE_TABLE)
            .map_err(|e| AppError::Storage(format!("Failed to open table: {}", e)))?;

        let entry = table
            .get(STORE_KEY)
            .map_err(|e| AppError::Storage(format!("Failed to read record: {}", e)))?;

        match entry {
            Some(guard) => decode(guard.value()).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, snapshot: &StoreSnapshot) -> AppResult<()> {
        let bytes = encode(snapshot)?;
        self.put_raw(&bytes)
    }
}

/// In-memory fallback storage (used if the database cannot be opened)
#[derive(Default)]
pub struct InMemoryStorage {
    record: Mutex<Option<Vec<u8>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for InMemoryStorage {
    fn load(&self) -> AppResult<Option<StoreSnapshot>> {
        let record = self
            .record
            .lock()
            .map_err(|e| AppError::Storage(format!("Mutex poisoned: {}", e)))?;
        record.as_deref().map(decode).transpose()
    }

    fn save(&self, snapshot: &StoreSnapshot) -> AppResult<()> {
        let bytes = encode(snapshot)?;
        let mut record = self
            .record
            .lock()
            .map_err(|e| AppError::Storage(format!("Mutex poisoned: {}", e)))?;
        *record = Some(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::TranslationRecord;

    fn sample() -> StoreSnapshot {
        let record = TranslationRecord {
            original_text: "Napaykullayki".to_string(),
            translated_text: "Hola".to_string(),
            source_language: "qu".to_string(),
            target_language: "es".to_string(),
            confidence: 0.92,
            method: "dictionary".to_string(),
        };
        StoreSnapshot {
            history: vec![HistoryEntry::new(record.clone())],
            favorites: vec![FavoriteEntry::new(record)],
            preferences: Preferences {
                max_history_items: 20,
                ..Preferences::default()
            },
        }
    }

    #[test]
    fn redb_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = RedbStorage::open(&dir.path().join("store.redb")).unwrap();
        assert_eq!(storage.load().unwrap(), None);
    }

    #[test]
    fn redb_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.redb");
        let snapshot = sample();

        {
            let storage = RedbStorage::open(&path).unwrap();
            storage.save(&snapshot).unwrap();
        }

        let storage = RedbStorage::open(&path).unwrap();
        assert_eq!(storage.load().unwrap(), Some(snapshot));
    }

    #[test]
    fn corrupt_record_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = RedbStorage::open(&dir.path().join("store.redb")).unwrap();
        storage.put_raw(&[0xff, 0x00, 0x13]).unwrap();

        let err = storage.load().unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }

    #[test]
    fn in_memory_round_trip() {
        let storage = InMemoryStorage::new();
        assert_eq!(storage.load().unwrap(), None);

        let snapshot = sample();
        storage.save(&snapshot).unwrap();
        assert_eq!(storage.load().unwrap(), Some(snapshot));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        #[derive(Serialize)]
        struct Partial {
            history: Vec<HistoryEntry>,
        }
        let bytes = {
            let mut buf = Vec::new();
            ciborium::into_writer(&Partial { history: Vec::new() }, &mut buf).unwrap();
            buf
        };

        let snapshot = decode(&bytes).unwrap();
        assert!(snapshot.favorites.is_empty());
        assert_eq!(snapshot.preferences, Preferences::default());
    }
}
