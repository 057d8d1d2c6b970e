// Date utility functions
// Week, month and day arithmetic shared by the layout engine and grid shapes

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime};

/// Calculate the start of the week containing the given date.
///
/// # Arguments
/// * `date` - The date to find the week start for
/// * `first_day_of_week` - 0 = Sunday, 1 = Monday, etc.
pub fn get_week_start(date: NaiveDate, first_day_of_week: u8) -> NaiveDate {
    let weekday = date.weekday().num_days_from_sunday() as i64;
    let offset = (weekday - first_day_of_week as i64 + 7) % 7;
    date - Duration::days(offset)
}

/// Whole calendar days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Move `current` by `delta_months`, keeping the day of month where possible
/// and clamping to the last day of shorter months (Jan 31 + 1 month = Feb 28/29).
pub fn shift_month_preserving_day(current: NaiveDate, delta_months: i32) -> NaiveDate {
    let total_months = (current.year() * 12) + (current.month() as i32 - 1) + delta_months;
    let new_year = total_months.div_euclid(12);
    let new_month = total_months.rem_euclid(12) as u32 + 1;
    clamp_day(new_year, new_month, current.day()).unwrap_or(current)
}

fn clamp_day(year: i32, month: u32, desired_day: u32) -> Option<NaiveDate> {
    let max_day = last_day_of_month(year, month);
    NaiveDate::from_ymd_opt(year, month, desired_day.min(max_day))
}

/// Shift a local timestamp by whole calendar days, keeping its wall-clock time.
///
/// Adding `Duration::days` would drift by an hour across a DST change, so the
/// shift is applied to the naive local value and re-resolved in the local zone.
/// A wall-clock time that does not exist on the target day falls back to the
/// fixed 24h arithmetic.
pub fn shift_by_days(instant: DateTime<Local>, days: i64) -> DateTime<Local> {
    if days == 0 {
        return instant;
    }
    let shifted = instant.naive_local() + Duration::days(days);
    shifted
        .and_local_timezone(Local)
        .earliest()
        .unwrap_or_else(|| instant + Duration::days(days))
}

/// Inclusive last calendar day covered by an interval ending at `end`.
///
/// An end that falls exactly on midnight belongs to the previous day, unless
/// that would put it before `start`'s day.
pub fn inclusive_end_date(start: DateTime<Local>, end: DateTime<Local>) -> NaiveDate {
    let end_date = end.date_naive();
    if end > start && end.time() == NaiveTime::MIN && end_date > start.date_naive() {
        end_date.pred_opt().unwrap_or(end_date)
    } else {
        end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test_case(date(2026, 2, 13), 0, date(2026, 2, 8) ; "sunday start")]
    #[test_case(date(2026, 2, 13), 1, date(2026, 2, 9) ; "monday start")]
    #[test_case(date(2026, 2, 8), 0, date(2026, 2, 8) ; "already on week start")]
    #[test_case(date(2026, 2, 8), 1, date(2026, 2, 2) ; "sunday with monday start")]
    #[test_case(date(2026, 3, 1), 6, date(2026, 2, 28) ; "saturday start crosses month")]
    fn test_get_week_start(input: NaiveDate, first_day: u8, expected: NaiveDate) {
        assert_eq!(get_week_start(input, first_day), expected);
    }

    #[test_case(date(2026, 1, 31), 1, date(2026, 2, 28) ; "clamps to short month")]
    #[test_case(date(2024, 1, 31), 1, date(2024, 2, 29) ; "clamps to leap day")]
    #[test_case(date(2026, 1, 15), -1, date(2025, 12, 15) ; "backwards across year")]
    #[test_case(date(2026, 12, 10), 1, date(2027, 1, 10) ; "forwards across year")]
    fn test_shift_month_preserving_day(input: NaiveDate, delta: i32, expected: NaiveDate) {
        assert_eq!(shift_month_preserving_day(input, delta), expected);
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(2026, 2), 28);
        assert_eq!(last_day_of_month(2024, 2), 29);
        assert_eq!(last_day_of_month(2026, 12), 31);
        assert_eq!(last_day_of_month(2026, 4), 30);
    }

    #[test]
    fn test_days_between_is_signed() {
        assert_eq!(days_between(date(2026, 2, 15), date(2026, 2, 20)), 5);
        assert_eq!(days_between(date(2026, 2, 20), date(2026, 2, 15)), -5);
    }

    #[test]
    fn test_shift_by_days_keeps_wall_clock_time() {
        let start = Local.with_ymd_and_hms(2026, 2, 13, 12, 30, 0).unwrap();
        let shifted = shift_by_days(start, 5);
        assert_eq!(shifted.date_naive(), date(2026, 2, 18));
        assert_eq!(shifted.time(), start.time());
        assert_eq!(shift_by_days(start, 0), start);
    }

    #[test]
    fn test_inclusive_end_date_midnight_belongs_to_previous_day() {
        let start = Local.with_ymd_and_hms(2026, 2, 13, 12, 0, 0).unwrap();
        let midnight = Local.with_ymd_and_hms(2026, 2, 16, 0, 0, 0).unwrap();
        assert_eq!(inclusive_end_date(start, midnight), date(2026, 2, 15));

        let afternoon = Local.with_ymd_and_hms(2026, 2, 16, 15, 0, 0).unwrap();
        assert_eq!(inclusive_end_date(start, afternoon), date(2026, 2, 16));
    }
}
