pub mod add;
pub mod categories;
pub mod common;
pub mod export;
pub mod import;
pub mod list;
pub mod random;
pub mod review;
pub mod sync;
