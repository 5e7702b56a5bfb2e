//! Time-of-use tariff configuration
//!
//! Tariff groups are persisted as JSON in a string key-value store and
//! upgraded from older shapes every time they are read. Nothing here ever
//! rewrites a stored record on its own; only explicit saves touch storage.

pub mod defaults;
pub mod lookup;
pub mod migration;
pub mod store;
pub mod types;

pub use lookup::{is_off_peak_hour, rate_for_hour, tariff_for_hour, tariff_for_time};
pub use migration::migrate_tariff_groups;
pub use store::{TariffSettingsStore, get_tariff_slots};
pub use types::{OffPeakSettings, TariffGroup, TariffTimeSlot};
