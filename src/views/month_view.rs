use chrono::{Datelike, Duration, NaiveDate};

use super::{GridShape, ViewType};
use crate::interaction::drag::EdgeDirection;
use crate::models::grid::{DateRange, WeekRow, DAYS_PER_ROW};
use crate::models::settings::{GridSettings, MonthRows};
use crate::utils::date::{first_day_of_month, get_week_start, last_day_of_month, shift_month_preserving_day};

const FIXED_MONTH_ROWS: usize = 6;

/// A month with the leading and trailing days needed to fill whole weeks.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthShape;

impl GridShape for MonthShape {
    fn view_type(&self) -> ViewType {
        ViewType::Month
    }

    fn week_rows(&self, display_date: NaiveDate, settings: &GridSettings) -> Vec<WeekRow> {
        let first_of_month = first_day_of_month(display_date);
        let grid_start = get_week_start(first_of_month, settings.first_day_of_week);

        let row_count = match settings.month_rows {
            MonthRows::Fixed => FIXED_MONTH_ROWS,
            MonthRows::Variable => {
                let last = last_day_of_month(display_date.year(), display_date.month());
                let last_of_month = first_of_month + Duration::days(last as i64 - 1);
                let span = (last_of_month - grid_start).num_days() as usize + 1;
                span.div_ceil(DAYS_PER_ROW)
            }
        };
        WeekRow::consecutive(grid_start, row_count)
    }

    fn viewable_range(&self, display_date: NaiveDate, settings: &GridSettings) -> DateRange {
        let rows = self.week_rows(display_date, settings);
        match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => DateRange::new(first.first_day, last.last_day()),
            _ => DateRange::single(display_date),
        }
    }

    fn shift_page(&self, date: NaiveDate, direction: EdgeDirection) -> NaiveDate {
        match direction {
            EdgeDirection::Previous => shift_month_preserving_day(date, -1),
            EdgeDirection::Next => shift_month_preserving_day(date, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test_case(date(2026, 2, 14), 0, 4 ; "february 2026 fits four sunday rows")]
    #[test_case(date(2026, 2, 14), 1, 5 ; "february 2026 needs five monday rows")]
    #[test_case(date(2026, 8, 1), 0, 6 ; "august 2026 needs six rows")]
    #[test_case(date(2026, 3, 31), 0, 5 ; "march 2026")]
    fn test_variable_row_count(display: NaiveDate, first_day: u8, expected: usize) {
        let settings = GridSettings {
            first_day_of_week: first_day,
            ..Default::default()
        };
        assert_eq!(MonthShape.week_rows(display, &settings).len(), expected);
    }

    #[test]
    fn test_fixed_rows_always_six() {
        let settings = GridSettings {
            month_rows: MonthRows::Fixed,
            ..Default::default()
        };
        let rows = MonthShape.week_rows(date(2026, 2, 1), &settings);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[5].last_day(), date(2026, 3, 14));
    }

    #[test]
    fn test_any_day_of_month_maps_to_same_range() {
        let settings = GridSettings::default();
        let early = MonthShape.viewable_range(date(2026, 3, 1), &settings);
        let late = MonthShape.viewable_range(date(2026, 3, 31), &settings);

        assert_eq!(early, late);
        assert_eq!(early.start, date(2026, 3, 1));
        assert_eq!(early.end, date(2026, 4, 4));
    }

    #[test]
    fn test_leading_days_from_previous_month() {
        let settings = GridSettings::default();
        let range = MonthShape.viewable_range(date(2026, 4, 15), &settings);
        assert_eq!(range.start, date(2026, 3, 29));
    }

    #[test]
    fn test_shift_page_by_month() {
        assert_eq!(MonthShape.shift_page(date(2026, 1, 31), EdgeDirection::Next), date(2026, 2, 28));
        assert_eq!(MonthShape.shift_page(date(2026, 2, 20), EdgeDirection::Previous), date(2026, 1, 20));
    }
}
