use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

use super::config::BusinessHours;
use super::domain::TimeSlot;

/// Half-open interval overlap on minute offsets within one day.
pub fn slots_overlap(a: &TimeSlot, b: &TimeSlot) -> bool {
    a.start_minute < b.end_minute && b.start_minute < a.end_minute
}

/// Whether `at` falls inside the configured dispatch window. The weekend is
/// Friday/Saturday in the deployment region.
pub fn within_business_hours(hours: &BusinessHours, at: DateTime<Utc>) -> bool {
    if !hours.include_weekends && matches!(at.weekday(), Weekday::Fri | Weekday::Sat) {
        return false;
    }

    let hour = at.hour() as u8;
    hours.start_hour <= hour && hour < hours.end_hour
}
