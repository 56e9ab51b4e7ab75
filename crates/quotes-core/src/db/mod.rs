//! Persistence layer for Quotes

mod connection;
mod key_value;
mod migrations;

pub use connection::SqliteKeyValueStore;
pub use key_value::{
    KeyValueStore, MemoryKeyValueStore, LAST_SYNCED_AT_KEY, QUOTES_KEY, SELECTED_CATEGORY_KEY,
};
