//! # Tariff Store - time-of-use electricity tariff settings
//!
//! Persists user-defined tariff groups (named rate periods made of hour
//! slots) and a legacy off-peak interval in a string key-value store,
//! upgrading older stored shapes whenever they are read.
//!
//! ## Architecture
//!
//! - `tariff`: data model, defaults, read-time migration, settings store and
//!   the hourly rate lookup
//! - `preferences`: display preferences kept beside the tariff records
//! - `storage`: the key-value capability and its memory/file backends
//! - `config`: YAML configuration
//! - `logging`: structured logging and tracing
//! - `web`: HTTP JSON API
//! - `error`: error type shared by all of the above

pub mod config;
pub mod error;
pub mod logging;
pub mod preferences;
pub mod storage;
pub mod tariff;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, TariffError};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use tariff::{OffPeakSettings, TariffGroup, TariffSettingsStore, TariffTimeSlot};
