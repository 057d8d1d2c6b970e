// Grid model
// Week rows, event segments and per-day cell summaries produced by the layout engine

use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Number of day slots in every week row.
pub const DAYS_PER_ROW: usize = 7;

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        debug_assert!(start <= end, "date range end before start");
        Self { start, end }
    }

    pub fn single(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end && end >= self.start
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.num_days()).map(move |offset| start + Duration::days(offset))
    }
}

/// One visible row of exactly seven consecutive days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WeekRow {
    pub row_index: usize,
    pub first_day: NaiveDate,
}

impl WeekRow {
    pub fn new(row_index: usize, first_day: NaiveDate) -> Self {
        Self {
            row_index,
            first_day,
        }
    }

    /// Consecutive rows starting at `first_day`.
    pub fn consecutive(first_day: NaiveDate, count: usize) -> Vec<WeekRow> {
        (0..count)
            .map(|index| {
                WeekRow::new(
                    index,
                    first_day + Duration::days((index * DAYS_PER_ROW) as i64),
                )
            })
            .collect()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first_day + Duration::days(DAYS_PER_ROW as i64 - 1)
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(self.first_day, self.last_day())
    }

    pub fn days(&self) -> [NaiveDate; DAYS_PER_ROW] {
        std::array::from_fn(|offset| self.first_day + Duration::days(offset as i64))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.range().contains(date)
    }

    /// Slot index (0-6) of `date` within this row.
    pub fn day_index(&self, date: NaiveDate) -> Option<usize> {
        self.contains(date)
            .then(|| (date - self.first_day).num_days() as usize)
    }

    pub fn date_at(&self, day_in_row: usize) -> NaiveDate {
        self.first_day + Duration::days(day_in_row as i64)
    }
}

/// Corner rounding for a drawn tile. Square edges read as a continuation
/// into the previous or next row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TileShape {
    pub round_leading: bool,
    pub round_trailing: bool,
}

/// The part of one multi-day event that falls inside one week row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSegment {
    pub event_id: i64,
    pub row_index: usize,
    pub start_day_in_row: usize,
    pub end_day_in_row: usize,
    pub is_first_row_of_event: bool,
    pub is_last_row_of_event: bool,
    pub lane_index: usize,
}

impl EventSegment {
    pub fn day_count(&self) -> usize {
        self.end_day_in_row - self.start_day_in_row + 1
    }

    pub fn covers_day(&self, day_in_row: usize) -> bool {
        self.start_day_in_row <= day_in_row && day_in_row <= self.end_day_in_row
    }

    pub fn overlaps(&self, start_day: usize, end_day: usize) -> bool {
        self.start_day_in_row <= end_day && start_day <= self.end_day_in_row
    }

    /// Shape of the whole segment drawn as one tile.
    pub fn shape(&self) -> TileShape {
        TileShape {
            round_leading: self.is_first_row_of_event,
            round_trailing: self.is_last_row_of_event,
        }
    }

    /// Shape of the piece drawn in a single day cell, for renderers that draw
    /// one tile per day.
    pub fn shape_for_day(&self, day_in_row: usize) -> TileShape {
        TileShape {
            round_leading: self.is_first_row_of_event && day_in_row == self.start_day_in_row,
            round_trailing: self.is_last_row_of_event && day_in_row == self.end_day_in_row,
        }
    }
}

/// A single-day event positioned inside a day cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SingleDayPlacement {
    pub event_id: i64,
    /// Stack position in the cell, counted after the multi-day lanes.
    pub slot_index: usize,
}

/// Summary of one day cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySlot {
    pub date: NaiveDate,
    pub row_index: usize,
    pub day_in_row: usize,
    /// Lanes taken by multi-day segments covering this day (highest lane + 1).
    pub multi_day_lanes: usize,
    pub single_day: Vec<SingleDayPlacement>,
    /// Single-day events hidden by the visible cap.
    pub overflow_count: usize,
}
