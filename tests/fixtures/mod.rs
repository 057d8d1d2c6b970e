// Test fixtures - reusable test data
// Provides consistent events and grids across all test files

#![allow(dead_code)]

use chrono::{DateTime, Local, NaiveDate, TimeZone};

use calendar_grid::models::event::CalendarEvent;
use calendar_grid::models::grid::WeekRow;

/// Sample dates for testing
pub mod dates {
    use super::*;

    /// A day in February 2026; Feb 1 2026 is a Sunday.
    pub fn feb(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, day).unwrap()
    }

    pub fn mar(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    /// Local time on a February 2026 day.
    pub fn feb_at(day: u32, hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 2, day, hour, 0, 0).unwrap()
    }
}

/// Sample events for testing
pub mod events {
    use super::dates::feb_at;
    use super::*;

    /// Feb 13 09:00 - Feb 16 17:00, split across two rows of a Sunday-start grid.
    pub fn conference() -> CalendarEvent {
        CalendarEvent::new(1, "Conference", feb_at(13, 9), feb_at(16, 17)).unwrap()
    }

    pub fn lunch(id: i64, day: u32) -> CalendarEvent {
        CalendarEvent::new(id, format!("Lunch {}", id), feb_at(day, 12), feb_at(day, 13)).unwrap()
    }

    /// Timed event spanning `first..=last` February days.
    pub fn span(id: i64, first: u32, last: u32) -> CalendarEvent {
        CalendarEvent::new(id, format!("Span {}", id), feb_at(first, 9), feb_at(last, 17)).unwrap()
    }
}

/// Sample grids for testing
pub mod grids {
    use super::*;

    /// The four Sunday-start rows of February 2026.
    pub fn february_rows() -> Vec<WeekRow> {
        WeekRow::consecutive(super::dates::feb(1), 4)
    }
}
