use chrono::{Duration, NaiveDate};

use super::{GridShape, ViewType};
use crate::interaction::drag::EdgeDirection;
use crate::models::grid::{DateRange, WeekRow};
use crate::models::settings::GridSettings;
use crate::utils::date::get_week_start;

/// One week row starting on the configured first day of the week.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekShape;

impl GridShape for WeekShape {
    fn view_type(&self) -> ViewType {
        ViewType::Week
    }

    fn week_rows(&self, display_date: NaiveDate, settings: &GridSettings) -> Vec<WeekRow> {
        vec![WeekRow::new(
            0,
            get_week_start(display_date, settings.first_day_of_week),
        )]
    }

    fn viewable_range(&self, display_date: NaiveDate, settings: &GridSettings) -> DateRange {
        self.week_rows(display_date, settings)[0].range()
    }

    fn shift_page(&self, date: NaiveDate, direction: EdgeDirection) -> NaiveDate {
        match direction {
            EdgeDirection::Previous => date - Duration::weeks(1),
            EdgeDirection::Next => date + Duration::weeks(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, day).unwrap()
    }

    #[test]
    fn test_week_range_follows_first_day_setting() {
        let sunday = GridSettings::default();
        let monday = GridSettings {
            first_day_of_week: 1,
            ..Default::default()
        };

        assert_eq!(WeekShape.viewable_range(date(13), &sunday), DateRange::new(date(8), date(14)));
        assert_eq!(WeekShape.viewable_range(date(13), &monday), DateRange::new(date(9), date(15)));
    }

    #[test]
    fn test_shift_page_by_week() {
        assert_eq!(WeekShape.shift_page(date(12), EdgeDirection::Next), date(19));
        assert_eq!(WeekShape.shift_page(date(12), EdgeDirection::Previous), date(5));
    }
}
