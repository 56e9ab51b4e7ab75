//! Remote sync: merge policy, remote source adapter, and periodic scheduler.

mod merge;
mod remote;
mod scheduler;

pub use merge::{identity_key, merge_quotes, IdentityKey, KeyFn, RemoteQuote, SyncReport};
pub use remote::{HttpQuoteSource, OfflineQuoteSource, RemoteQuoteSource};
pub use scheduler::SyncScheduler;
