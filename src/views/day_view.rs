use chrono::{Duration, NaiveDate};

use super::{GridShape, ViewType};
use crate::interaction::drag::EdgeDirection;
use crate::models::grid::{DateRange, WeekRow};
use crate::models::settings::GridSettings;

/// A single day. Its row is anchored on the day itself, so only slot 0 is
/// visible and events running in from earlier days show a square leading edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct DayShape;

impl GridShape for DayShape {
    fn view_type(&self) -> ViewType {
        ViewType::Day
    }

    fn week_rows(&self, display_date: NaiveDate, _settings: &GridSettings) -> Vec<WeekRow> {
        vec![WeekRow::new(0, display_date)]
    }

    fn viewable_range(&self, display_date: NaiveDate, _settings: &GridSettings) -> DateRange {
        DateRange::single(display_date)
    }

    fn shift_page(&self, date: NaiveDate, direction: EdgeDirection) -> NaiveDate {
        match direction {
            EdgeDirection::Previous => date - Duration::days(1),
            EdgeDirection::Next => date + Duration::days(1),
        }
    }
}
