//! Built-in tariff configuration and storage keys

use super::types::{OffPeakSettings, TariffGroup, TariffTimeSlot};

/// Key of the JSON-encoded [`OffPeakSettings`] record
pub const STORAGE_KEY_OFFPEAK: &str = "solis_offpeak_settings";
/// Key of the JSON-encoded tariff group list
pub const STORAGE_KEY_TARIFF_GROUPS: &str = "solis_tariff_groups";
/// Pre-settings-record start hour, decimal text
pub const LEGACY_KEY_OFFPEAK_START: &str = "solis_offpeak_start";
/// Pre-settings-record end hour, decimal text
pub const LEGACY_KEY_OFFPEAK_END: &str = "solis_offpeak_end";

pub const DEFAULT_OFFPEAK_START_HOUR: u8 = 23;
pub const DEFAULT_OFFPEAK_END_HOUR: u8 = 8;

fn group(id: &str, name: &str, color: &str, is_off_peak: bool, start: u8, end: u8) -> TariffGroup {
    TariffGroup {
        id: id.to_string(),
        name: name.to_string(),
        rate: 0.0,
        color: color.to_string(),
        slots: vec![TariffTimeSlot::new(start, end)],
        is_off_peak,
    }
}

/// Six groups covering the whole day, all priced at zero
pub fn default_tariff_groups() -> Vec<TariffGroup> {
    vec![
        group("off-peak", "Off-Peak", "indigo", true, 23, 6),
        group("standard", "Standard", "sky", false, 6, 7),
        group("peak", "Peak", "amber", false, 7, 10),
        group("standard-mid", "Standard", "sky", false, 10, 18),
        group("peak-eve", "Peak", "amber", false, 18, 20),
        group("standard-eve", "Standard", "sky", false, 20, 23),
    ]
}

pub fn default_off_peak_settings() -> OffPeakSettings {
    OffPeakSettings {
        start_hour: DEFAULT_OFFPEAK_START_HOUR,
        end_hour: DEFAULT_OFFPEAK_END_HOUR,
        tariff_groups: default_tariff_groups(),
        peak_rate: 0.0,
        offpeak_rate: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tariff::lookup::tariff_for_hour;

    #[test]
    fn defaults_cover_every_hour_exactly_once() {
        let groups = default_tariff_groups();
        for hour in 0..24 {
            let covering = groups
                .iter()
                .flat_map(|g| g.slots.iter())
                .filter(|s| crate::tariff::lookup::slot_contains_hour(s, hour))
                .count();
            assert_eq!(covering, 1, "hour {hour}");
        }
    }

    #[test]
    fn only_the_overnight_group_is_off_peak() {
        let groups = default_tariff_groups();
        let off_peak: Vec<_> = groups.iter().filter(|g| g.is_off_peak).collect();
        assert_eq!(off_peak.len(), 1);
        assert_eq!(off_peak[0].id, "off-peak");
        assert_eq!(tariff_for_hour(2, &groups).unwrap().id, "off-peak");
    }

    #[test]
    fn default_settings_values() {
        let s = default_off_peak_settings();
        assert_eq!((s.start_hour, s.end_hour), (23, 8));
        assert_eq!(s.tariff_groups.len(), 6);
        assert!(s.peak_rate.abs() < f64::EPSILON);
        assert!(s.offpeak_rate.abs() < f64::EPSILON);
    }
}
