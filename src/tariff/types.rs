use serde::{Deserialize, Serialize};

/// One contiguous hour range belonging to a tariff group
///
/// `end_hour` is exclusive. An `end_hour` below `start_hour` wraps past
/// midnight, so `{23, 6}` covers 23:00 through 05:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffTimeSlot {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl TariffTimeSlot {
    pub const fn new(start_hour: u8, end_hour: u8) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    pub const fn wraps_midnight(&self) -> bool {
        self.start_hour > self.end_hour
    }
}

/// A named electricity rate period made of one or more slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TariffGroup {
    /// Caller-assigned identifier, unique within its list
    pub id: String,

    pub name: String,

    /// Currency per kWh
    pub rate: f64,

    /// UI colour hint; never interpreted here
    pub color: String,

    #[serde(default)]
    pub slots: Vec<TariffTimeSlot>,

    #[serde(default)]
    pub is_off_peak: bool,
}

/// Off-peak configuration record
///
/// `start_hour`/`end_hour` describe the original single off-peak interval and
/// are kept so that older readers keep working; `tariff_groups` is the
/// current model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffPeakSettings {
    pub start_hour: u8,
    pub end_hour: u8,
    pub tariff_groups: Vec<TariffGroup>,
    /// Deprecated; read for compatibility, no longer edited
    pub peak_rate: f64,
    pub offpeak_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn group_serializes_with_camel_case_fields() {
        let group = TariffGroup {
            id: "night".to_string(),
            name: "Night".to_string(),
            rate: 0.12,
            color: "indigo".to_string(),
            slots: vec![TariffTimeSlot::new(23, 6)],
            is_off_peak: true,
        };
        assert_eq!(
            serde_json::to_value(&group).unwrap(),
            json!({
                "id": "night",
                "name": "Night",
                "rate": 0.12,
                "color": "indigo",
                "slots": [{"startHour": 23, "endHour": 6}],
                "isOffPeak": true,
            })
        );
    }

    #[test]
    fn settings_field_names_match_stored_records() {
        let value = json!({
            "startHour": 22,
            "endHour": 7,
            "tariffGroups": [],
            "peakRate": 0.3,
            "offpeakRate": 0.1,
        });
        let settings: OffPeakSettings = serde_json::from_value(value).unwrap();
        assert_eq!(settings.start_hour, 22);
        assert_eq!(settings.end_hour, 7);
        assert!((settings.offpeak_rate - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn wrapping_slot_is_detected() {
        assert!(TariffTimeSlot::new(23, 6).wraps_midnight());
        assert!(!TariffTimeSlot::new(6, 7).wraps_midnight());
    }
}
