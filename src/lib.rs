/*!
# Interactive Grid

A browser-based N×N grid of toggleable cells, served and persisted by Rust.

## Overview

Users toggle individual cells on and off; every toggle is written to a
persisted cell table, and the whole grid can be reset at once. Cells
remember the order in which they were turned on so a reset can switch them
off in that same order, one step at a time.

## Architecture

### Server Layer
- **Technologies**: Rust, axum, tokio
- **Key Components**:
  - Grid Store - Table of cells keyed by (row, column), in memory or backed by a file
  - Read Endpoint - Lists every persisted cell
  - Write Endpoint - Upserts a single cell
  - Reset Endpoint - Deactivates every cell in one operation
  - Grid Page - Server-rendered HTML grid with hover highlighting

### Client Layer
- **Cache & Mutation Layer** - Holds the last known snapshot, applies toggles
  optimistically, re-reads after confirmation and rolls back on failure
- **HTTP transport** - reqwest implementation of the `GridApi` seam
- **Grid View** - Dense gridSize × gridSize projection of the sparse set, plus
  per-cell visual state

### Data Persistence Layer
- Gzip-compressed bincode snapshots of the cell table, written atomically

## Modules

- **cell**: Cell, update payload and stored record types
- **store**: The `GridStore` trait and the `TableStore` implementation
- **saving**: Snapshot files for the cell table
- **grid**: Dense projection of the sparse cell set
- **view**: Hover state, colors, per-cell visuals, text and HTML rendering
- **api**: The `GridApi` seam shared by server and clients
- **cache**: Optimistic client cache
- **config**: Server and client settings
- **app**: Routing and handlers (feature `web`)
- **client**: HTTP `GridApi` (feature `web`)

## REST API Endpoints

- `GET /api/cells` - Every persisted cell
- `POST /api/update` - Upserts `{row, column, isActive, activationOrder?}`
- `POST /api/reset` - Deactivates every cell
*/

pub mod api;
pub mod cache;
pub mod cell;
pub mod config;
pub mod error;
pub mod grid;
pub mod saving;
pub mod store;
pub mod view;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod client;

/// Re-export the core types to make them easier to use
pub use api::*;
pub use cache::*;
pub use cell::*;
pub use error::*;
pub use grid::*;
pub use saving::*;
pub use store::*;
