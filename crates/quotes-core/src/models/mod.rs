//! Data models for Quotes

mod quote;

pub use quote::{default_quotes, Quote, QuoteId, QuoteOrigin};
