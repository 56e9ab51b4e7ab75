//! Async services shared by all clients.

mod quotes;

#[cfg(test)]
pub(crate) use quotes::test_support;
pub use quotes::QuoteService;
