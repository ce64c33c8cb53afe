use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Milliseconds in a day. Activity timestamps are bucketed by dividing with it.
pub const MS_PER_DAY: i64 = 86_400_000;

/// This is the standard way of converting a date to a string in review_bars.
pub fn date_to_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Index of `date` counted in whole days since 1970-01-01.
pub fn epoch_day(date: NaiveDate) -> i64 {
    (date - DateTime::<Utc>::UNIX_EPOCH.date_naive()).num_days()
}

/// First day of a window of `days` days that ends with `today` (inclusive).
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today - Duration::days(i64::from(days.max(1)) - 1)
}

#[cfg(test)]
mod time_tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_epoch_day() {
        assert_eq!(epoch_day(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
        assert_eq!(epoch_day(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()), 1);
        assert_eq!(epoch_day(NaiveDate::from_ymd_opt(2024, 4, 5).unwrap()), 19818);
    }

    #[test]
    fn test_window_start() {
        let today = NaiveDate::from_ymd_opt(2024, 4, 5).unwrap();
        assert_eq!(window_start(today, 7), NaiveDate::from_ymd_opt(2024, 3, 30).unwrap());
        assert_eq!(window_start(today, 1), today);
        assert_eq!(window_start(today, 0), today);
        assert_eq!(date_to_key(today), "2024-04-05");
    }
}
