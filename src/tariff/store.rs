//! Persistence of tariff settings on top of a [`KeyValueStore`]
//!
//! Reads never fail. A missing backend, a backend error, text that is not
//! JSON and JSON of the wrong shape all resolve to the built-in defaults.
//! Writes report their failures to the caller.

use super::defaults::{
    LEGACY_KEY_OFFPEAK_END, LEGACY_KEY_OFFPEAK_START, STORAGE_KEY_OFFPEAK,
    STORAGE_KEY_TARIFF_GROUPS, default_off_peak_settings, default_tariff_groups,
};
use super::migration::{hour, migrate_tariff_groups};
use super::types::{OffPeakSettings, TariffGroup, TariffTimeSlot};
use crate::error::{Result, TariffError};
use crate::logging::{StructuredLogger, get_logger};
use crate::storage::KeyValueStore;
use serde_json::Value;

/// Tariff and preference settings kept in a string key-value store
pub struct TariffSettingsStore {
    backend: Option<Box<dyn KeyValueStore>>,
    logger: StructuredLogger,
}

impl TariffSettingsStore {
    /// Store backed by `backend`
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self {
            backend: Some(backend),
            logger: get_logger("store"),
        }
    }

    pub fn with_backend<S: KeyValueStore + 'static>(backend: S) -> Self {
        Self::new(Box::new(backend))
    }

    /// Store for an environment without persistent storage
    ///
    /// Every read returns defaults without touching I/O and every write fails.
    pub fn unavailable() -> Self {
        Self {
            backend: None,
            logger: get_logger("store"),
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Raw value under `key`; backend errors are logged and read as `Err`
    pub(crate) fn read(&self, key: &str) -> Result<Option<String>> {
        let backend = self
            .backend
            .as_ref()
            .ok_or_else(|| TariffError::storage("No persistent store available"))?;
        backend.get_item(key).inspect_err(|e| {
            self.logger
                .debug(&format!("Reading {} failed, using defaults: {}", key, e));
        })
    }

    pub(crate) fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let backend = self
            .backend
            .as_mut()
            .ok_or_else(|| TariffError::storage("No persistent store available"))?;
        backend.set_item(key, value)?;
        self.logger.debug(&format!("Saved {}", key));
        Ok(())
    }

    /// Write every entry or none of them
    ///
    /// When a write fails the keys already written are put back to the values
    /// they held before, or removed if they were absent.
    pub(crate) fn write_all(&mut self, entries: &[(&str, String)]) -> Result<()> {
        let mut written: Vec<(&str, Option<String>)> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let previous = self.read(key)?;
            if let Err(e) = self.write(key, value) {
                self.restore(&written);
                return Err(e);
            }
            written.push((*key, previous));
        }
        Ok(())
    }

    fn restore(&mut self, written: &[(&str, Option<String>)]) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };
        for (key, previous) in written.iter().rev() {
            let restored = match previous {
                Some(value) => backend.set_item(key, value),
                None => backend.remove_item(key),
            };
            if let Err(e) = restored {
                self.logger
                    .error(&format!("Restoring {} after a failed update failed: {}", key, e));
            }
        }
    }

    /// Parsed JSON under `key`; `None` when absent, empty, unreadable or not JSON
    pub(crate) fn read_json(&self, key: &str) -> Option<Value> {
        let raw = self.read(key).ok().flatten().filter(|raw| !raw.is_empty())?;
        serde_json::from_str(&raw)
            .inspect_err(|e| {
                self.logger
                    .debug(&format!("Stored {} is not valid JSON, using defaults: {}", key, e));
            })
            .ok()
    }

    /// Current off-peak settings, upgraded from whatever generation is stored
    pub fn get_off_peak_settings(&self) -> OffPeakSettings {
        let mut settings = default_off_peak_settings();
        if !self.is_available() {
            return settings;
        }

        let raw = match self.read(STORAGE_KEY_OFFPEAK) {
            Ok(raw) => raw.filter(|raw| !raw.is_empty()),
            Err(_) => return settings,
        };

        if let Some(raw) = raw {
            match serde_json::from_str::<Value>(&raw) {
                Ok(record) => merge_record(&mut settings, &record),
                Err(e) => self.logger.debug(&format!(
                    "Stored off-peak settings are not valid JSON, using defaults: {}",
                    e
                )),
            }
            return settings;
        }

        // Before the settings record existed the hours lived under two keys
        if let Some(start) = self.legacy_hour(LEGACY_KEY_OFFPEAK_START) {
            settings.start_hour = start;
        }
        if let Some(end) = self.legacy_hour(LEGACY_KEY_OFFPEAK_END) {
            settings.end_hour = end;
        }
        settings
    }

    pub fn save_off_peak_settings(&mut self, settings: &OffPeakSettings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        self.write(STORAGE_KEY_OFFPEAK, &json)
    }

    /// Stored tariff groups, or the built-in set when nothing usable is stored
    pub fn get_tariff_groups(&self) -> Vec<TariffGroup> {
        let groups = match self.read_json(STORAGE_KEY_TARIFF_GROUPS) {
            Some(Value::Array(records)) => migrate_tariff_groups(&records),
            Some(_) => {
                self.logger
                    .debug("Stored tariff groups are not a list, using defaults");
                Vec::new()
            }
            None => Vec::new(),
        };

        if groups.is_empty() {
            default_tariff_groups()
        } else {
            groups
        }
    }

    pub fn save_tariff_groups(&mut self, groups: &[TariffGroup]) -> Result<()> {
        let json = serde_json::to_string(groups)?;
        self.write(STORAGE_KEY_TARIFF_GROUPS, &json)
    }

    fn legacy_hour(&self, key: &str) -> Option<u8> {
        let raw = self.read(key).ok().flatten()?;
        let parsed = raw.trim().parse::<u8>().ok().filter(|h| *h <= 23);
        if parsed.is_none() {
            self.logger
                .debug(&format!("Ignoring unparseable legacy hour {}={:?}", key, raw));
        }
        parsed
    }
}

/// Time slots of a group
pub fn get_tariff_slots(group: &TariffGroup) -> &[TariffTimeSlot] {
    &group.slots
}

/// Overlay the usable fields of a stored record onto `settings`
fn merge_record(settings: &mut OffPeakSettings, record: &Value) {
    let Some(record) = record.as_object() else {
        return;
    };

    if let Some(start) = hour(record.get("startHour")) {
        settings.start_hour = start;
    }
    if let Some(end) = hour(record.get("endHour")) {
        settings.end_hour = end;
    }
    if let Some(rate) = record.get("peakRate").and_then(Value::as_f64) {
        settings.peak_rate = rate;
    }
    if let Some(rate) = record.get("offpeakRate").and_then(Value::as_f64) {
        settings.offpeak_rate = rate;
    }
    if let Some(groups) = record.get("tariffGroups").and_then(Value::as_array) {
        settings.tariff_groups = migrate_tariff_groups(groups);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Err(TariffError::storage("quota exceeded"))
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(TariffError::storage("quota exceeded"))
        }

        fn remove_item(&mut self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    /// Memory store whose writes to one key always fail
    struct RejectingStore {
        inner: MemoryStore,
        rejected: &'static str,
    }

    impl KeyValueStore for RejectingStore {
        fn get_item(&self, key: &str) -> Result<Option<String>> {
            self.inner.get_item(key)
        }

        fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
            if key == self.rejected {
                return Err(TariffError::storage("quota exceeded"));
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&mut self, key: &str) -> Result<()> {
            self.inner.remove_item(key)
        }
    }

    #[test]
    fn failed_write_all_restores_earlier_keys() {
        let inner: MemoryStore = [("kept", "old")].into_iter().collect();
        let mut store = TariffSettingsStore::with_backend(RejectingStore {
            inner,
            rejected: "bad",
        });
        let entries = [
            ("kept", "new".to_string()),
            ("fresh", "1".to_string()),
            ("bad", "x".to_string()),
        ];
        assert!(store.write_all(&entries).is_err());
        assert_eq!(store.read("kept").unwrap().as_deref(), Some("old"));
        assert!(store.read("fresh").unwrap().is_none());
        assert!(store.read("bad").unwrap().is_none());

        let entries = [("kept", "new".to_string()), ("fresh", "1".to_string())];
        store.write_all(&entries).unwrap();
        assert_eq!(store.read("kept").unwrap().as_deref(), Some("new"));
        assert_eq!(store.read("fresh").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn unavailable_store_reads_defaults_and_refuses_writes() {
        let mut store = TariffSettingsStore::unavailable();
        assert_eq!(store.get_off_peak_settings(), default_off_peak_settings());
        assert_eq!(store.get_tariff_groups(), default_tariff_groups());
        assert!(store.save_tariff_groups(&[]).is_err());
    }

    #[test]
    fn backend_errors_read_as_defaults() {
        let mut store = TariffSettingsStore::with_backend(BrokenStore);
        assert_eq!(store.get_off_peak_settings(), default_off_peak_settings());
        assert_eq!(store.get_tariff_groups(), default_tariff_groups());
        let err = store
            .save_off_peak_settings(&default_off_peak_settings())
            .unwrap_err();
        assert!(matches!(err, TariffError::Storage { .. }));
    }

    #[test]
    fn record_fields_override_defaults_individually() {
        let backend: MemoryStore = [(
            STORAGE_KEY_OFFPEAK,
            json!({"startHour": 1, "endHour": "seven", "offpeakRate": 0.08}).to_string(),
        )]
        .into_iter()
        .collect();
        let settings = TariffSettingsStore::with_backend(backend).get_off_peak_settings();
        assert_eq!(settings.start_hour, 1);
        assert_eq!(settings.end_hour, 8);
        assert!((settings.offpeak_rate - 0.08).abs() < f64::EPSILON);
        assert_eq!(settings.tariff_groups, default_tariff_groups());
    }

    #[test]
    fn record_present_ignores_legacy_keys() {
        let backend: MemoryStore = [
            (STORAGE_KEY_OFFPEAK, "{}".to_string()),
            (LEGACY_KEY_OFFPEAK_START, "22".to_string()),
        ]
        .into_iter()
        .collect();
        let settings = TariffSettingsStore::with_backend(backend).get_off_peak_settings();
        assert_eq!(settings.start_hour, 23);
    }

    #[test]
    fn malformed_record_reads_as_defaults() {
        let backend: MemoryStore = [
            (STORAGE_KEY_OFFPEAK, "{not json".to_string()),
            (LEGACY_KEY_OFFPEAK_START, "22".to_string()),
        ]
        .into_iter()
        .collect();
        let settings = TariffSettingsStore::with_backend(backend).get_off_peak_settings();
        assert_eq!(settings, default_off_peak_settings());
    }

    #[test]
    fn non_list_groups_inside_record_use_defaults() {
        let backend: MemoryStore = [(
            STORAGE_KEY_OFFPEAK,
            json!({"tariffGroups": {"id": "x"}}).to_string(),
        )]
        .into_iter()
        .collect();
        let settings = TariffSettingsStore::with_backend(backend).get_off_peak_settings();
        assert_eq!(settings.tariff_groups, default_tariff_groups());
    }

    #[test]
    fn legacy_hour_out_of_range_keeps_default() {
        let backend: MemoryStore = [
            (LEGACY_KEY_OFFPEAK_START, "25".to_string()),
            (LEGACY_KEY_OFFPEAK_END, " 6 ".to_string()),
        ]
        .into_iter()
        .collect();
        let settings = TariffSettingsStore::with_backend(backend).get_off_peak_settings();
        assert_eq!((settings.start_hour, settings.end_hour), (23, 6));
    }

    #[test]
    fn empty_group_list_reads_as_defaults() {
        let backend: MemoryStore = [(STORAGE_KEY_TARIFF_GROUPS, "[]".to_string())]
            .into_iter()
            .collect();
        let store = TariffSettingsStore::with_backend(backend);
        assert_eq!(store.get_tariff_groups(), default_tariff_groups());
    }

    #[test]
    fn slots_accessor_returns_group_slots() {
        let groups = default_tariff_groups();
        assert_eq!(get_tariff_slots(&groups[0]), &[TariffTimeSlot::new(23, 6)]);
    }
}
