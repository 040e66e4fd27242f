mod repository;

pub use repository::*;

/// SQL migration for the key/value storage table
pub const MIGRATION_001_STORAGE: &str = include_str!("migrations/001_storage.sql");

/// Key under which the serialized ledger is stored
pub const STORAGE_KEY: &str = "budgetData_v2";
