//! Read-time upgrade of stored tariff groups
//!
//! Stored groups come in two generations: the original one carried a single
//! `startHour`/`endHour` pair and no off-peak flag, the current one carries a
//! `slots` list and `isOffPeak`. Each raw record is classified into a
//! [`GroupShape`] first and only then turned into a canonical
//! [`TariffGroup`], which never carries the legacy fields.

use super::types::{TariffGroup, TariffTimeSlot};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static OFF_PEAK_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)off.?peak|night").expect("static off-peak pattern"));

/// Which generation a stored group record belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupShape {
    /// Non-empty `slots` list
    Current(Vec<TariffTimeSlot>),
    /// No usable `slots`, but a single top-level hour range
    Legacy(TariffTimeSlot),
    /// Neither; the group ends up without slots
    Bare,
}

impl GroupShape {
    /// Classify a raw group record
    pub fn of(record: &Map<String, Value>) -> Self {
        let slots: Vec<TariffTimeSlot> = record
            .get("slots")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(parse_slot).collect())
            .unwrap_or_default();
        if !slots.is_empty() {
            return Self::Current(slots);
        }

        match (hour(record.get("startHour")), hour(record.get("endHour"))) {
            (Some(start), Some(end)) => Self::Legacy(TariffTimeSlot::new(start, end)),
            _ => Self::Bare,
        }
    }

    pub fn into_slots(self) -> Vec<TariffTimeSlot> {
        match self {
            Self::Current(slots) => slots,
            Self::Legacy(slot) => vec![slot],
            Self::Bare => Vec::new(),
        }
    }
}

/// Whether a group name reads like an off-peak period
pub fn name_implies_off_peak(name: &str) -> bool {
    OFF_PEAK_NAME.is_match(name)
}

/// Upgrade a list of raw group records to the current schema
///
/// Entries that are not JSON objects are skipped. The result is a fixed
/// point: migrating already-migrated groups returns them unchanged.
pub fn migrate_tariff_groups(records: &[Value]) -> Vec<TariffGroup> {
    records
        .iter()
        .filter_map(Value::as_object)
        .map(migrate_group)
        .collect()
}

/// Upgrade a single raw group record
pub fn migrate_group(record: &Map<String, Value>) -> TariffGroup {
    let name = text(record.get("name"));
    let is_off_peak = record
        .get("isOffPeak")
        .and_then(Value::as_bool)
        .unwrap_or_else(|| name_implies_off_peak(&name));

    TariffGroup {
        id: text(record.get("id")),
        rate: record.get("rate").and_then(Value::as_f64).unwrap_or(0.0),
        color: text(record.get("color")),
        slots: GroupShape::of(record).into_slots(),
        is_off_peak,
        name,
    }
}

fn parse_slot(value: &Value) -> Option<TariffTimeSlot> {
    let slot = value.as_object()?;
    Some(TariffTimeSlot::new(
        hour(slot.get("startHour"))?,
        hour(slot.get("endHour"))?,
    ))
}

/// Whole hour of day, accepting integral floats such as `7.0`
pub(crate) fn hour(value: Option<&Value>) -> Option<u8> {
    let value = value?;
    let hour = match value.as_u64() {
        Some(h) => h,
        None => {
            let f = value.as_f64()?;
            if f.fract() != 0.0 || f < 0.0 {
                return None;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let whole = f as u64;
            whole
        }
    };
    u8::try_from(hour).ok().filter(|h| *h <= 23)
}

fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}
