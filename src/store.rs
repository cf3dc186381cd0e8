use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::cell::{Cell, CellKey, CellRecord};
use crate::error::StoreError;
use crate::saving;

/// The authoritative cell table, keyed by (row, column).
pub trait GridStore: Send + Sync {
    fn list_all(&self) -> Result<Vec<CellRecord>, StoreError>;

    /// Inserts or replaces the record for `cell`'s coordinate. Last write wins.
    fn upsert(&self, cell: &Cell) -> Result<CellRecord, StoreError>;

    /// Deactivates every record and clears its activation order.
    fn reset_all(&self) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Default)]
struct Table {
    next_id: u32,
    rows: BTreeMap<CellKey, CellRecord>,
}

impl Table {
    fn from_records(records: Vec<CellRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0);
        let rows = records.into_iter().map(|r| (r.key(), r)).collect();
        Table { next_id, rows }
    }

    fn records(&self) -> Vec<CellRecord> {
        self.rows.values().cloned().collect()
    }

    fn upsert(&mut self, cell: &Cell) -> CellRecord {
        let activation_order = if cell.is_active {
            cell.activation_order
        } else {
            0
        };
        if let Some(existing) = self.rows.get_mut(&cell.key()) {
            existing.is_active = cell.is_active;
            existing.activation_order = activation_order;
            return existing.clone();
        }
        self.next_id += 1;
        let record = CellRecord {
            id: self.next_id,
            row: cell.row,
            column: cell.column,
            is_active: cell.is_active,
            activation_order,
        };
        self.rows.insert(record.key(), record.clone());
        record
    }

    fn reset(&mut self) {
        for record in self.rows.values_mut() {
            record.is_active = false;
            record.activation_order = 0;
        }
    }
}

/// [`GridStore`] held in memory, optionally mirrored to a snapshot file.
///
/// With a backing file every mutation is applied to a copy of the table,
/// written to disk, and only then made visible. A failed write leaves the
/// table as it was.
#[derive(Debug, Default)]
pub struct TableStore {
    table: RwLock<Table>,
    path: Option<PathBuf>,
}

impl TableStore {
    pub fn in_memory() -> Self {
        TableStore::default()
    }

    /// Opens a file-backed store, loading the existing table if the file exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let table = if path.exists() {
            let records = saving::load_cells(&path)?;
            log::info!("Loaded {} cells from {}", records.len(), path.display());
            Table::from_records(records)
        } else {
            Table::default()
        };
        Ok(TableStore {
            table: RwLock::new(table),
            path: Some(path),
        })
    }

    fn mutate<T>(&self, change: impl FnOnce(&mut Table) -> T) -> Result<T, StoreError> {
        let mut table = self.table.write().map_err(|_| StoreError::Poisoned)?;
        match &self.path {
            None => Ok(change(&mut table)),
            Some(path) => {
                let mut next = table.clone();
                let out = change(&mut next);
                saving::save_cells(&next.records(), path)?;
                *table = next;
                Ok(out)
            }
        }
    }
}

impl GridStore for TableStore {
    fn list_all(&self) -> Result<Vec<CellRecord>, StoreError> {
        let table = self.table.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table.records())
    }

    fn upsert(&self, cell: &Cell) -> Result<CellRecord, StoreError> {
        self.mutate(|table| table.upsert(cell))
    }

    fn reset_all(&self) -> Result<(), StoreError> {
        self.mutate(Table::reset)
    }
}
