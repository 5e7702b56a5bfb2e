//! Which tariff applies at a given hour

use super::types::{TariffGroup, TariffTimeSlot};
use chrono::{TimeZone, Timelike};

/// Whether `hour` falls inside `slot`, honouring midnight wraparound
pub fn slot_contains_hour(slot: &TariffTimeSlot, hour: u8) -> bool {
    if slot.wraps_midnight() {
        hour >= slot.start_hour || hour < slot.end_hour
    } else {
        hour >= slot.start_hour && hour < slot.end_hour
    }
}

/// Number of hours a slot spans
///
/// Equal start and end hours count as a full day, so such a slot never wins
/// against a narrower one even though it contains no hour itself.
pub fn slot_hours(slot: &TariffTimeSlot) -> u32 {
    let (start, end) = (u32::from(slot.start_hour), u32::from(slot.end_hour));
    if end > start { end - start } else { 24 - start + end }
}

/// Total hours covered by all slots of a group
pub fn group_hours(group: &TariffGroup) -> u32 {
    group.slots.iter().map(slot_hours).sum()
}

/// Group applying at `hour`
///
/// With overlapping groups the one covering the fewest hours wins, so a
/// narrow period is not shadowed by a broad one. Ties go to the earlier group.
pub fn tariff_for_hour(hour: u8, groups: &[TariffGroup]) -> Option<&TariffGroup> {
    groups
        .iter()
        .filter(|g| g.slots.iter().any(|s| slot_contains_hour(s, hour)))
        .fold(None, |best: Option<&TariffGroup>, g| match best {
            Some(b) if group_hours(b) <= group_hours(g) => Some(b),
            _ => Some(g),
        })
}

/// Group applying at the local hour of `time`
pub fn tariff_for_time<'a, Tz: TimeZone>(
    time: &chrono::DateTime<Tz>,
    groups: &'a [TariffGroup],
) -> Option<&'a TariffGroup> {
    #[allow(clippy::cast_possible_truncation)]
    let hour = time.hour() as u8;
    tariff_for_hour(hour, groups)
}

/// Rate at `hour`, zero when no group covers it
pub fn rate_for_hour(hour: u8, groups: &[TariffGroup]) -> f64 {
    tariff_for_hour(hour, groups).map_or(0.0, |g| g.rate)
}

pub fn is_off_peak_hour(hour: u8, groups: &[TariffGroup]) -> bool {
    tariff_for_hour(hour, groups).is_some_and(|g| g.is_off_peak)
}
