//! Client-side snapshot of the grid and the optimistic mutation protocol.
//!
//! Every write goes through the same life cycle:
//!
//! 1. [`GridCache::begin_toggle`] applies the change to the local snapshot
//!    right away, keeps the previous snapshot as the rollback point and hands
//!    back a [`Mutation`]. Nothing blocks.
//! 2. [`GridCache::commit`] sends the write. On success the rollback point is
//!    dropped and the snapshot is re-read from the server; on failure the
//!    rollback point is restored and the error is returned.
//!
//! A refresh that started before the newest mutation began is thrown away
//! when it completes, so a slow read never overwrites a newer optimistic
//! value. Writes still in flight are laid back over any accepted read.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::api::GridApi;
use crate::cell::{Cell, CellKey, CellUpdate};
use crate::error::GridError;
use crate::grid::DenseGrid;

/// Pause between two deactivations of an animated reset.
pub const RESET_STEP: Duration = Duration::from_millis(200);
/// Counter value after a reset; the next activation gets order 1.
pub const INITIAL_ORDER: i32 = 0;

pub const LOAD_ERROR: &str = "Failed to load cells from the server.";
pub const UPDATE_ERROR: &str = "Error updating cell on the server.";
pub const RESET_ERROR: &str = "Error resetting cells on the server.";

/// Where the most recent mutation stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationPhase {
    Idle,
    OptimisticApplied,
    Confirmed,
    RolledBack,
}

/// An optimistic change that has been applied locally but not yet settled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mutation {
    generation: u64,
    previous: Cell,
    intent: Cell,
}

impl Mutation {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn key(&self) -> CellKey {
        self.intent.key()
    }

    /// The value written into the snapshot.
    pub fn intent(&self) -> &Cell {
        &self.intent
    }
}

#[derive(Debug)]
struct RollbackPoint {
    generation: u64,
    cells: Vec<Cell>,
    order: i32,
}

#[derive(Debug)]
struct CacheState {
    cells: Vec<Cell>,
    rollback: Option<RollbackPoint>,
    in_flight: BTreeMap<CellKey, (u64, Cell)>,
    generation: u64,
    order: i32,
    phase: MutationPhase,
    loading: bool,
    error: Option<String>,
}

impl CacheState {
    fn new() -> Self {
        CacheState {
            cells: Vec::new(),
            rollback: None,
            in_flight: BTreeMap::new(),
            generation: 0,
            order: INITIAL_ORDER,
            phase: MutationPhase::Idle,
            loading: false,
            error: None,
        }
    }

    fn cell(&self, key: CellKey) -> Cell {
        self.cells
            .iter()
            .find(|c| c.key() == key)
            .cloned()
            .unwrap_or_else(|| Cell::inactive(key.row, key.column))
    }

    fn apply_optimistic(&mut self, intent: Cell, order_before: i32) -> Mutation {
        let key = intent.key();
        let previous = self.cell(key);
        self.generation += 1;
        let generation = self.generation;
        self.rollback = Some(RollbackPoint {
            generation,
            cells: self.cells.clone(),
            order: order_before,
        });
        put(&mut self.cells, intent.clone());
        self.in_flight.insert(key, (generation, intent.clone()));
        self.phase = MutationPhase::OptimisticApplied;
        Mutation {
            generation,
            previous,
            intent,
        }
    }

    fn owns_key(&self, mutation: &Mutation) -> bool {
        self.in_flight
            .get(&mutation.key())
            .is_some_and(|(generation, _)| *generation == mutation.generation)
    }

    fn set_phase(&mut self, generation: u64, phase: MutationPhase) {
        if generation == self.generation {
            self.phase = phase;
        }
    }

    fn confirm(&mut self, mutation: &Mutation) {
        if self.owns_key(mutation) {
            self.in_flight.remove(&mutation.key());
        }
        if self
            .rollback
            .as_ref()
            .is_some_and(|p| p.generation == mutation.generation)
        {
            self.rollback = None;
        }
        self.set_phase(mutation.generation, MutationPhase::Confirmed);
    }

    fn roll_back(&mut self, mutation: &Mutation) {
        let owns_key = self.owns_key(mutation);
        if owns_key {
            self.in_flight.remove(&mutation.key());
        }
        match self.rollback.take() {
            Some(point) if point.generation == mutation.generation => {
                self.cells = point.cells;
                self.order = point.order;
            }
            other => {
                // A newer mutation holds the rollback point; undo only this cell,
                // and keep the newer point from resurrecting the failed value.
                self.rollback = other.map(|mut point| {
                    put(&mut point.cells, mutation.previous.clone());
                    point
                });
                if owns_key {
                    put(&mut self.cells, mutation.previous.clone());
                }
            }
        }
        self.set_phase(mutation.generation, MutationPhase::RolledBack);
    }

    fn accept_read(&mut self, cells: Vec<Cell>) {
        let highest = cells.iter().map(|c| c.activation_order).max().unwrap_or(0);
        self.order = self.order.max(highest);
        self.cells = cells;
        overlay(&mut self.cells, &self.in_flight, u64::MAX);
    }

    /// Undoes a failed bulk reset whose rollback point was taken over by a
    /// newer mutation.
    fn restore_reset(&mut self, generation: u64, saved: &[Cell], saved_order: i32) {
        match self.rollback.take() {
            Some(point) if point.generation == generation => {
                self.cells = point.cells;
                self.order = point.order;
            }
            other => {
                self.rollback = other.map(|mut point| {
                    point.cells = saved.to_vec();
                    overlay(&mut point.cells, &self.in_flight, point.generation);
                    point.order = point.order.max(saved_order);
                    point
                });
                self.cells = saved.to_vec();
                overlay(&mut self.cells, &self.in_flight, u64::MAX);
                self.order = self.order.max(saved_order);
            }
        }
    }
}

/// Lays pending writes older than `before` over `cells`.
fn overlay(cells: &mut Vec<Cell>, in_flight: &BTreeMap<CellKey, (u64, Cell)>, before: u64) {
    for (generation, intent) in in_flight.values() {
        if *generation < before {
            put(cells, intent.clone());
        }
    }
}

fn put(cells: &mut Vec<Cell>, cell: Cell) {
    match cells.iter_mut().find(|c| c.key() == cell.key()) {
        Some(slot) => *slot = cell,
        None => cells.push(cell),
    }
}

/// The client's copy of the grid, kept in sync with a [`GridApi`].
///
/// All methods take `&self`; wrap the cache in an `Arc` to drive mutations
/// from several tasks.
pub struct GridCache<A> {
    api: A,
    grid_size: usize,
    state: Mutex<CacheState>,
}

impl<A: GridApi> GridCache<A> {
    pub fn new(api: A, grid_size: usize) -> Self {
        GridCache {
            api,
            grid_size,
            state: Mutex::new(CacheState::new()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The sparse snapshot, including optimistic values.
    pub fn snapshot(&self) -> Vec<Cell> {
        self.lock().cells.clone()
    }

    pub fn dense(&self) -> DenseGrid {
        DenseGrid::from_sparse(&self.lock().cells, self.grid_size)
    }

    pub fn phase(&self) -> MutationPhase {
        self.lock().phase
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// Message to show the user for the last failed operation.
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    /// The last activation order handed out.
    pub fn activation_counter(&self) -> i32 {
        self.lock().order
    }

    pub fn has_rollback_point(&self) -> bool {
        self.lock().rollback.is_some()
    }

    /// Initial fetch of the grid.
    pub async fn load(&self) -> Result<DenseGrid, GridError> {
        self.lock().loading = true;
        let result = self.refresh().await;
        self.lock().loading = false;
        result?;
        Ok(self.dense())
    }

    /// Re-reads the grid from the server.
    ///
    /// Returns `Ok(false)` when a mutation began while the read was in flight
    /// and the result was discarded.
    pub async fn refresh(&self) -> Result<bool, GridError> {
        let started = self.lock().generation;
        let fetched = self.api.list_cells().await;

        let mut state = self.lock();
        match fetched {
            Ok(cells) => {
                if state.generation != started {
                    log::debug!(
                        "Discarding refresh from generation {} (now {})",
                        started,
                        state.generation
                    );
                    return Ok(false);
                }
                state.accept_read(cells);
                Ok(true)
            }
            Err(err) => {
                log::error!("Error fetching cells: {}", err);
                state.error = Some(LOAD_ERROR.to_string());
                Err(err)
            }
        }
    }

    /// Flips the cell locally and returns the pending mutation.
    pub fn begin_toggle(&self, row: i32, column: i32) -> Result<Mutation, GridError> {
        let key = CellKey::new(row, column);
        if !key.in_bounds(self.grid_size) {
            return Err(GridError::OutOfBounds { row, column });
        }
        let mut state = self.lock();
        let order_before = state.order;
        let intent = if state.cell(key).is_active {
            Cell::inactive(row, column)
        } else {
            state.order = state
                .order
                .checked_add(1)
                .ok_or(GridError::OrderExhausted)?;
            Cell::active(row, column, state.order)
        };
        Ok(state.apply_optimistic(intent, order_before))
    }

    /// Sends `mutation` to the server and settles it.
    pub async fn commit(&self, mutation: Mutation) -> Result<Cell, GridError> {
        let update = CellUpdate::from(mutation.intent());
        match self.api.update_cell(&update).await {
            Ok(echo) => {
                self.lock().confirm(&mutation);
                if let Err(err) = self.refresh().await {
                    log::warn!("Refresh after update failed: {}", err);
                }
                Ok(echo.to_cell())
            }
            Err(err) => {
                {
                    let mut state = self.lock();
                    state.roll_back(&mutation);
                    state.error = Some(UPDATE_ERROR.to_string());
                }
                log::warn!(
                    "Rolled back cell ({}, {}): {}",
                    mutation.key().row,
                    mutation.key().column,
                    err
                );
                Err(err)
            }
        }
    }

    pub async fn toggle(&self, row: i32, column: i32) -> Result<Cell, GridError> {
        let mutation = self.begin_toggle(row, column)?;
        self.commit(mutation).await
    }

    /// Turns active cells off one by one in the order they were turned on,
    /// pausing `step` between writes. Returns the cells deactivated.
    ///
    /// Failed writes are rolled back individually; the first error is
    /// returned after every cell has been attempted.
    pub async fn reset_animated(&self, step: Duration) -> Result<Vec<CellKey>, GridError> {
        let mut active: Vec<Cell> = self
            .lock()
            .cells
            .iter()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        active.sort_by_key(|c| (c.activation_order, c.row, c.column));

        let mut deactivated = Vec::with_capacity(active.len());
        let mut first_error = None;
        for (i, cell) in active.iter().enumerate() {
            if i > 0 && !step.is_zero() {
                tokio::time::sleep(step).await;
            }
            let mutation = {
                let mut state = self.lock();
                if !state.cell(cell.key()).is_active {
                    continue;
                }
                let order_before = state.order;
                state.apply_optimistic(Cell::inactive(cell.row, cell.column), order_before)
            };
            match self.commit(mutation).await {
                Ok(_) => deactivated.push(cell.key()),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        self.lock().order = INITIAL_ORDER;
        match first_error {
            Some(err) => Err(err),
            None => Ok(deactivated),
        }
    }

    /// Clears the whole grid with a single `POST /api/reset`.
    pub async fn reset_all(&self) -> Result<(), GridError> {
        let (generation, saved, saved_order) = {
            let mut state = self.lock();
            state.generation += 1;
            let generation = state.generation;
            let saved = state.cells.clone();
            let saved_order = state.order;
            state.rollback = Some(RollbackPoint {
                generation,
                cells: saved.clone(),
                order: saved_order,
            });
            for cell in state.cells.iter_mut() {
                cell.is_active = false;
                cell.activation_order = 0;
            }
            state.order = INITIAL_ORDER;
            state.phase = MutationPhase::OptimisticApplied;
            (generation, saved, saved_order)
        };

        match self.api.reset_cells().await {
            Ok(()) => {
                {
                    let mut state = self.lock();
                    if state.rollback.as_ref().is_some_and(|p| p.generation == generation) {
                        state.rollback = None;
                    }
                    state.set_phase(generation, MutationPhase::Confirmed);
                }
                if let Err(err) = self.refresh().await {
                    log::warn!("Refresh after reset failed: {}", err);
                }
                Ok(())
            }
            Err(err) => {
                {
                    let mut state = self.lock();
                    state.restore_reset(generation, &saved, saved_order);
                    state.set_phase(generation, MutationPhase::RolledBack);
                    state.error = Some(RESET_ERROR.to_string());
                }
                log::warn!("Reset rolled back: {}", err);
                Err(err)
            }
        }
    }
}
