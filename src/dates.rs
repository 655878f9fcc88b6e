use serde::Serializer;
use time::{Date, Duration, OffsetDateTime};

pub const WEEK_DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Start of the current local day. Falls back to UTC when the local offset
/// cannot be determined.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

pub fn add_days(base: Date, days: i64) -> Date {
    base.saturating_add(Duration::days(days))
}

pub fn weekday_label(date: Date) -> &'static str {
    WEEK_DAYS[date.weekday().number_days_from_monday() as usize]
}

/// `YYYY-MM-DD`
pub fn date_key(date: Date) -> String {
    date.to_string()
}

pub fn serialize_date<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&date_key(*date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn labels_follow_calendar() {
        // 2025-06-02 was a Monday
        assert_eq!(weekday_label(date!(2025 - 06 - 02)), "Monday");
        assert_eq!(weekday_label(date!(2025 - 06 - 08)), "Sunday");
    }

    #[test]
    fn add_days_crosses_month_boundary() {
        assert_eq!(add_days(date!(2025 - 01 - 30), 3), date!(2025 - 02 - 02));
    }

    #[test]
    fn date_key_is_iso() {
        assert_eq!(date_key(date!(2025 - 03 - 07)), "2025-03-07");
    }
}
