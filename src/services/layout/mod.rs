//! Multi-day layout engine.
//!
//! Packs multi-day events into lanes across the week rows of a grid and stacks
//! single-day events underneath them, per day cell.
//!
//! The engine is a pure function of the event list and the row shape. Lane
//! assignment is a greedy interval colouring: inside each row, segments are
//! taken in display order (all-day first, then start, then title) and placed
//! in the lowest lane that has no day in common with an already placed
//! segment. When that order would use more lanes than the largest number of
//! multi-day events active on one day of the row, the row is packed again
//! taking segments by their first day in the row, which is always tight.
//! Display order still breaks ties between segments starting on the same day.
//!
//! Events with `end < start` are a caller error. Debug builds panic on them;
//! release builds log and let them fall out of the layout.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::event::CalendarEvent;
use crate::models::grid::{DaySlot, EventSegment, SingleDayPlacement, WeekRow, DAYS_PER_ROW};

/// Complete layout of a grid: multi-day segments plus per-day cell summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridLayout {
    pub segments: Vec<EventSegment>,
    pub day_slots: Vec<DaySlot>,
}

impl GridLayout {
    pub fn segments_in_row(&self, row_index: usize) -> impl Iterator<Item = &EventSegment> {
        self.segments
            .iter()
            .filter(move |segment| segment.row_index == row_index)
    }

    /// Lanes used by multi-day segments in a row.
    pub fn lanes_in_row(&self, row_index: usize) -> usize {
        lanes_used(self.segments_in_row(row_index))
    }

    pub fn segments_for_event(&self, event_id: i64) -> impl Iterator<Item = &EventSegment> {
        self.segments
            .iter()
            .filter(move |segment| segment.event_id == event_id)
    }

    pub fn day_slot(&self, date: NaiveDate) -> Option<&DaySlot> {
        self.day_slots.iter().find(|slot| slot.date == date)
    }

    pub fn overflow_count(&self, date: NaiveDate) -> usize {
        self.day_slot(date).map_or(0, |slot| slot.overflow_count)
    }
}

/// Compute the multi-day segments for `rows`.
///
/// Output is ordered by row, then by the order lanes were assigned in, and is
/// identical for equal event sets regardless of input order.
pub fn compute_layout(events: &[CalendarEvent], rows: &[WeekRow]) -> Vec<EventSegment> {
    check_preconditions(events);

    let mut multi_day: Vec<&CalendarEvent> =
        events.iter().filter(|event| event.is_multi_day()).collect();
    multi_day.sort_by(|a, b| a.layout_cmp(b));

    let mut rows: Vec<&WeekRow> = rows.iter().collect();
    rows.sort_by_key(|row| row.first_day);

    let mut segments = Vec::new();
    for row in rows {
        // (order in multi_day, unplaced segment)
        let mut row_segments: Vec<(usize, EventSegment)> = multi_day
            .iter()
            .enumerate()
            .filter_map(|(order, event)| clip_to_row(event, row).map(|segment| (order, segment)))
            .collect();

        let peak = peak_overlap(row_segments.iter().map(|(_, segment)| segment));
        let mut placed = assign_lanes(&row_segments);
        if lanes_used(placed.iter()) > peak {
            log::debug!(
                "Display order needs extra lanes in row {}, packing by first day",
                row.row_index
            );
            row_segments.sort_by_key(|(order, segment)| (segment.start_day_in_row, *order));
            placed = assign_lanes(&row_segments);
        }
        segments.extend(placed);
    }

    log::debug!(
        "Laid out {} multi-day events into {} segments",
        multi_day.len(),
        segments.len()
    );
    segments
}

/// Compute segments and per-day cells, capping each day cell at
/// `max_visible_per_day` stacked tiles.
pub fn compute_grid_layout(
    events: &[CalendarEvent],
    rows: &[WeekRow],
    max_visible_per_day: usize,
) -> GridLayout {
    let segments = compute_layout(events, rows);

    let mut single_by_day: BTreeMap<NaiveDate, Vec<&CalendarEvent>> = BTreeMap::new();
    for event in events.iter().filter(|event| !event.is_multi_day()) {
        if event.end < event.start {
            continue;
        }
        single_by_day.entry(event.first_day()).or_default().push(event);
    }

    let mut day_slots = Vec::with_capacity(rows.len() * DAYS_PER_ROW);
    for row in rows {
        for (day_in_row, date) in row.days().into_iter().enumerate() {
            let multi_day_lanes = lanes_used(
                segments
                    .iter()
                    .filter(|s| s.row_index == row.row_index && s.covers_day(day_in_row)),
            );

            let mut singles = single_by_day.get(&date).cloned().unwrap_or_default();
            singles.sort_by(|a, b| a.layout_cmp(b));

            let mut slot = DaySlot {
                date,
                row_index: row.row_index,
                day_in_row,
                multi_day_lanes,
                single_day: Vec::new(),
                overflow_count: 0,
            };
            for (position, event) in singles.into_iter().enumerate() {
                let slot_index = multi_day_lanes + position;
                if slot_index < max_visible_per_day {
                    slot.single_day.push(SingleDayPlacement {
                        event_id: event.id,
                        slot_index,
                    });
                } else {
                    slot.overflow_count += 1;
                }
            }
            day_slots.push(slot);
        }
    }

    GridLayout {
        segments,
        day_slots,
    }
}

fn check_preconditions(events: &[CalendarEvent]) {
    for event in events.iter().filter(|event| event.end < event.start) {
        log::warn!(
            "Event {} ({:?}) ends before it starts; it will not be laid out",
            event.id,
            event.title
        );
    }
    debug_assert!(
        events.iter().all(|event| event.end >= event.start),
        "an event has its end before start"
    );
}

/// Part of `event` inside `row`, if any. The lane is assigned later.
fn clip_to_row(event: &CalendarEvent, row: &WeekRow) -> Option<EventSegment> {
    let first = event.first_day();
    let last = event.last_day();
    if !row.range().overlaps(first, last) {
        return None;
    }

    let start_day_in_row = row.day_index(first.max(row.first_day))?;
    let end_day_in_row = row.day_index(last.min(row.last_day()))?;
    Some(EventSegment {
        event_id: event.id,
        row_index: row.row_index,
        start_day_in_row,
        end_day_in_row,
        is_first_row_of_event: row.contains(first),
        is_last_row_of_event: row.contains(last),
        lane_index: 0,
    })
}

/// Greedy lane assignment taking segments in the given order.
fn assign_lanes(row_segments: &[(usize, EventSegment)]) -> Vec<EventSegment> {
    let mut placed: Vec<EventSegment> = Vec::with_capacity(row_segments.len());
    for (_, segment) in row_segments {
        let mut segment = segment.clone();
        segment.lane_index = lowest_free_lane(&placed, &segment);
        placed.push(segment);
    }
    placed
}

/// Largest number of segments covering one day of a row.
fn peak_overlap<'a>(segments: impl Iterator<Item = &'a EventSegment> + Clone) -> usize {
    (0..DAYS_PER_ROW)
        .map(|day| segments.clone().filter(|segment| segment.covers_day(day)).count())
        .max()
        .unwrap_or(0)
}

fn lowest_free_lane(placed: &[EventSegment], segment: &EventSegment) -> usize {
    let mut lane = 0;
    while placed.iter().any(|other| {
        other.lane_index == lane && other.overlaps(segment.start_day_in_row, segment.end_day_in_row)
    }) {
        lane += 1;
    }
    lane
}

fn lanes_used<'a>(segments: impl Iterator<Item = &'a EventSegment>) -> usize {
    segments
        .map(|segment| segment.lane_index + 1)
        .max()
        .unwrap_or(0)
}
