//! quotes-core - Core library for Quotes
//!
//! This crate contains the quote model, the persisted quote store, and the
//! remote sync merger used by every Quotes interface.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod services;
pub mod store;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Quote, QuoteId, QuoteOrigin};
pub use services::QuoteService;
pub use store::{pick_random, QuoteStore, ALL_CATEGORIES};
pub use sync::{SyncReport, SyncScheduler};
