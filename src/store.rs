use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

use crate::ids::next_record_id;
use crate::models::PurchaseOrder;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize purchase orders: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("storage slot is unavailable")]
    Unavailable,
}

/// A single persisted key-value slot holding the whole collection as JSON.
pub trait Slot: Send + Sync {
    /// Returns `None` when nothing has been written yet.
    fn read(&self) -> Result<Option<String>, StoreError>;
    fn write(&self, contents: &str) -> Result<(), StoreError>;
}

/// JSON file on disk. Writes go to a sibling temp file that is then renamed
/// over the target, so a crash mid-write never leaves a truncated collection.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Slot for FileSlot {
    fn read(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write(&self, contents: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

#[derive(Debug, Default)]
pub struct MemorySlot {
    value: Mutex<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(contents.into())),
        }
    }
}

impl Slot for MemorySlot {
    fn read(&self) -> Result<Option<String>, StoreError> {
        let value = self.value.lock().map_err(|_| StoreError::Unavailable)?;
        Ok(value.clone())
    }

    fn write(&self, contents: &str) -> Result<(), StoreError> {
        let mut value = self.value.lock().map_err(|_| StoreError::Unavailable)?;
        *value = Some(contents.to_string());
        Ok(())
    }
}

/// Answer to the "are you sure?" prompt that guards deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

/// The in-memory collection of purchase orders, mirrored to its slot after
/// every mutation. A mutation whose write fails leaves the collection as it
/// was.
pub struct RecordStore {
    records: Vec<PurchaseOrder>,
    slot: Box<dyn Slot>,
}

impl RecordStore {
    /// Reads the persisted collection. A missing, unreadable or corrupt slot
    /// yields an empty collection.
    pub fn load(slot: impl Slot + 'static) -> Self {
        let records = match slot.read() {
            Ok(Some(contents)) => match serde_json::from_str::<Vec<PurchaseOrder>>(&contents) {
                Ok(records) => records,
                Err(e) => {
                    log::warn!("Stored purchase orders are malformed, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Could not read stored purchase orders, starting empty: {}", e);
                Vec::new()
            }
        };

        log::info!("Loaded {} purchase orders", records.len());
        Self {
            records,
            slot: Box::new(slot),
        }
    }

    pub fn list(&self) -> &[PurchaseOrder] {
        &self.records
    }

    pub fn get(&self, id: i64) -> Option<&PurchaseOrder> {
        self.records.iter().find(|po| po.id == Some(id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes the full collection to the slot.
    pub fn save(&self) -> Result<(), StoreError> {
        self.write(&self.records)
    }

    fn write(&self, records: &[PurchaseOrder]) -> Result<(), StoreError> {
        let contents = serde_json::to_string(records)?;
        self.slot.write(&contents)
    }

    // Persists `staged` and only then makes it the live collection.
    fn commit(&mut self, staged: Vec<PurchaseOrder>) -> Result<(), StoreError> {
        self.write(&staged)?;
        self.records = staged;
        Ok(())
    }

    /// Appends `record` with a fresh id and creation timestamp and persists
    /// the collection. Returns the stored snapshot.
    pub fn create(&mut self, mut record: PurchaseOrder, now: DateTime<Utc>) -> Result<PurchaseOrder, StoreError> {
        record.id = Some(next_record_id(&self.records, now));
        record.created_at = Some(now);

        let mut staged = self.records.clone();
        staged.push(record.clone());
        self.commit(staged)?;

        log::info!("Created purchase order {}", record.po_number);
        Ok(record)
    }

    /// Replaces the record with id `id`. The stored id and creation time are
    /// kept. Returns `false` without touching anything when no record matches.
    pub fn update(&mut self, id: i64, mut record: PurchaseOrder) -> Result<bool, StoreError> {
        let Some(position) = self.records.iter().position(|po| po.id == Some(id)) else {
            log::debug!("Update skipped, no purchase order with id {}", id);
            return Ok(false);
        };

        record.id = Some(id);
        record.created_at = self.records[position].created_at;

        let mut staged = self.records.clone();
        staged[position] = record;
        self.commit(staged)?;
        Ok(true)
    }

    /// Removes the record with id `id` once the user has confirmed. Returns
    /// whether anything was removed.
    pub fn delete(&mut self, id: i64, confirmation: Confirmation) -> Result<bool, StoreError> {
        if confirmation == Confirmation::Declined {
            return Ok(false);
        }

        let staged: Vec<PurchaseOrder> = self
            .records
            .iter()
            .filter(|po| po.id != Some(id))
            .cloned()
            .collect();
        if staged.len() == self.records.len() {
            return Ok(false);
        }

        self.commit(staged)?;
        log::info!("Deleted purchase order {}", id);
        Ok(true)
    }
}
