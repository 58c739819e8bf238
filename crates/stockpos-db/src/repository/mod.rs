//! # Repository Implementations
//!
//! One repository per aggregate, each holding a clone of the shared pool:
//!
//! - [`product`] - catalog CRUD, restocks, and paginated listings
//! - [`sale`] - the atomic multi-line sale transaction
//! - [`category`] - category creation and listings
//!
//! Repositories return [`crate::error::LedgerError`] so that domain
//! failures (unknown sku, insufficient stock) surface as typed variants
//! rather than raw database errors.

pub mod category;
pub mod product;
pub mod sale;
