//! # stockpos-core: Pure Domain Logic for StockPOS
//!
//! This crate is the heart of the inventory ledger. It contains domain
//! types, validation rules, and typed errors as pure code with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       StockPOS Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (axum)                              │   │
//! │  │    create/list products, sell batch, categories                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ stockpos-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  paging   │  │   error   │  │ validation│  │   │
//! │  │   │  Product  │  │   Page    │  │ CoreError │  │   rules   │  │   │
//! │  │   │ SaleLine  │  │ PageOpts  │  │  variants │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  stockpos-db (Ledger)                           │   │
//! │  │          SQLite queries, migrations, repositories               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **No I/O**: database, network, and file system access are forbidden here
//! 2. **Integer money**: all monetary values are cents (i64), never floats
//! 3. **Explicit errors**: all errors are typed enums, never strings or panics

pub mod error;
pub mod paging;
pub mod types;
pub mod validation;

pub use error::{CoreError, ValidationError};
pub use paging::{Page, PageOptions, SortOrder};
pub use types::*;

/// Default number of rows per listing page.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Maximum rows a caller may request per page.
///
/// Prevents a single listing request from dragging the whole table
/// through the pool.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Maximum line items in a single sale batch.
pub const MAX_BATCH_LINES: usize = 100;

/// Maximum quantity of a single line item.
///
/// Guards against fat-finger quantities (1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
