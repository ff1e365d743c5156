use crate::types::{AvailabilityRule, Slot};
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

/// Weekday index of a date with 0 = Sunday, matching
/// `AvailabilityRule::day_of_week`.
pub fn day_of_week(date: NaiveDate) -> i16 {
    date.weekday().num_days_from_sunday() as i16
}

fn minutes_past_midnight(time: NaiveTime) -> i32 {
    (time.hour() * 60 + time.minute()) as i32
}

fn time_from_minutes(minutes: i32) -> NaiveTime {
    NaiveTime::from_hms_opt(minutes as u32 / 60, minutes as u32 % 60, 0)
        .expect("cursor stays below 24:00 because it never passes end_time")
}

/// Candidate appointment times for one day of the weekly schedule.
///
/// Walks from `start_time` in steps of `slot_duration + break_between`
/// and emits a slot whenever it starts before `end_time`: the closing
/// time bounds where slots may begin, not where the last appointment
/// ends. A 09:00–12:00 window with 30-minute slots and 10-minute
/// breaks therefore offers 09:00 through 11:40. Output is
/// chronological.
pub fn candidate_times(rule: &AvailabilityRule) -> Vec<NaiveTime> {
    let start = minutes_past_midnight(rule.start_time);
    let end = minutes_past_midnight(rule.end_time);
    let step = rule.slot_duration + rule.break_between;

    let mut times = Vec::new();
    if rule.slot_duration <= 0 || step <= 0 {
        return times;
    }

    let mut cursor = start;
    while cursor < end {
        times.push(time_from_minutes(cursor));
        cursor += step;
    }
    times
}

/// Marks each candidate time against the booked times of the target
/// date. Order is preserved; a slot is available exactly when no
/// active appointment holds its time.
pub fn resolve_availability(candidates: &[NaiveTime], booked: &[NaiveTime]) -> Vec<Slot> {
    candidates
        .iter()
        .map(|time| Slot {
            time: time.format(crate::types::hhmm::FORMAT).to_string(),
            available: !booked.contains(time),
        })
        .collect()
}
