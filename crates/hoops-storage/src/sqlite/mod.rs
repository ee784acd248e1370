//! SQLite-backed storage implementation.

mod catalog;
mod columns;
mod drills;
mod ledger;
mod metadata;
mod profiles;
mod progress;
pub mod schema;
mod store;
mod transaction;

pub use store::SqliteStore;
