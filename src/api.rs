//! The request/response surface shared by the HTTP server and its clients.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellRecord, CellUpdate};
use crate::error::{GridError, StoreError};
use crate::store::GridStore;

pub const METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
pub const RESET_OK: &str = "Cells reset successfully";

/// `{ "message": ... }` body used for status and error replies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        MessageBody {
            message: message.into(),
        }
    }
}

/// Read, write and reset calls against the persisted grid.
#[async_trait]
pub trait GridApi: Send + Sync {
    /// `GET /api/cells`
    async fn list_cells(&self) -> Result<Vec<Cell>, GridError>;

    /// `POST /api/update`; returns the server's echo of `update`.
    async fn update_cell(&self, update: &CellUpdate) -> Result<CellUpdate, GridError>;

    /// `POST /api/reset`
    async fn reset_cells(&self) -> Result<(), GridError>;
}

/// Upserts the cell described by `update` and returns the echo the write
/// endpoint answers with.
pub fn apply_update(store: &dyn GridStore, update: &CellUpdate) -> Result<CellUpdate, StoreError> {
    store.upsert(&update.to_cell())?;
    Ok(update.clone())
}

/// [`GridApi`] served straight from a store in the same process.
#[derive(Clone)]
pub struct LocalApi {
    store: Arc<dyn GridStore>,
}

impl LocalApi {
    pub fn new(store: Arc<dyn GridStore>) -> Self {
        LocalApi { store }
    }
}

#[async_trait]
impl GridApi for LocalApi {
    async fn list_cells(&self) -> Result<Vec<Cell>, GridError> {
        let records = self.store.list_all()?;
        Ok(records.iter().map(CellRecord::cell).collect())
    }

    async fn update_cell(&self, update: &CellUpdate) -> Result<CellUpdate, GridError> {
        Ok(apply_update(self.store.as_ref(), update)?)
    }

    async fn reset_cells(&self) -> Result<(), GridError> {
        Ok(self.store.reset_all()?)
    }
}
