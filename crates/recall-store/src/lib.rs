pub mod db;
pub mod error;
pub mod manager;
pub mod store;

pub use error::StoreError;
pub use manager::SqliteStore;
pub use store::ReminderStore;
