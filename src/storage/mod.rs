//! Injected persistence collaborators. The engine itself never touches I/O:
//! callers load one consistent snapshot, run the engine, and persist edits
//! back through a backend.

pub mod json_backend;

pub use json_backend::JsonStorage;

use crate::errors::LedgerError;
use crate::ingest::HouseholdFile;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Load/save boundary for stored household data.
pub trait StorageBackend {
    fn save(&self, file: &HouseholdFile, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<HouseholdFile>;
    fn list_backups(&self, name: &str) -> Result<Vec<String>>;
    fn backup(&self, file: &HouseholdFile, name: &str) -> Result<()>;
    fn restore(&self, name: &str, backup_name: &str) -> Result<HouseholdFile>;
}
