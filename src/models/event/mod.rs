// Event module
// Concrete (already expanded) calendar event as consumed by the grid engine

use std::cmp::Ordering;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::utils::date::{inclusive_end_date, shift_by_days};

/// A concrete calendar event supplied by the event store.
///
/// Recurring rules are expanded before events reach the grid, so every value
/// here is a single occurrence. `external_id` and `occurrence_id` link back to
/// the store and are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub title: String,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub occurrence_id: Option<String>,
}

impl CalendarEvent {
    /// Create a new event with required fields
    ///
    /// # Arguments
    /// * `id` - Identity of the event within its store
    /// * `title` - Event title (required, non-empty)
    /// * `start` - Event start time
    /// * `end` - Event end time (may equal `start`)
    ///
    /// # Examples
    /// ```
    /// use calendar_grid::models::event::CalendarEvent;
    /// use chrono::{Local, TimeZone};
    ///
    /// let start = Local.with_ymd_and_hms(2026, 2, 13, 9, 0, 0).unwrap();
    /// let end = Local.with_ymd_and_hms(2026, 2, 16, 17, 0, 0).unwrap();
    /// let event = CalendarEvent::new(1, "Conference", start, end).unwrap();
    /// assert!(event.is_multi_day());
    /// ```
    pub fn new(
        id: i64,
        title: impl Into<String>,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<Self, String> {
        let event = Self {
            id,
            title: title.into(),
            start,
            end,
            all_day: false,
            color: None,
            external_id: None,
            occurrence_id: None,
        };
        event.validate()?;
        Ok(event)
    }

    /// Create a builder for constructing events with optional fields
    pub fn builder() -> CalendarEventBuilder {
        CalendarEventBuilder::new()
    }

    /// Validate the event
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Event title cannot be empty".to_string());
        }

        if self.end < self.start {
            return Err("Event end time cannot be before start time".to_string());
        }

        if let Some(ref color) = self.color {
            if !color.starts_with('#') || (color.len() != 7 && color.len() != 4) {
                return Err("Color must be in hex format (#RRGGBB or #RGB)".to_string());
            }
        }

        Ok(())
    }

    /// First calendar day the event touches.
    pub fn first_day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Last calendar day the event touches (inclusive).
    pub fn last_day(&self) -> NaiveDate {
        inclusive_end_date(self.start, self.end)
    }

    /// True when the date-only end falls after the date-only start.
    pub fn is_multi_day(&self) -> bool {
        self.last_day() > self.first_day()
    }

    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        self.first_day() <= date && date <= self.last_day()
    }

    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }

    /// Returns a copy with new start/end, leaving every other field as is.
    pub fn with_times(&self, start: DateTime<Local>, end: DateTime<Local>) -> Self {
        Self {
            start,
            end,
            ..self.clone()
        }
    }

    /// Returns a copy moved by whole calendar days. Both endpoints move by the
    /// same delta, so the day span is unchanged.
    pub fn shifted_by_days(&self, days: i64) -> Self {
        self.with_times(shift_by_days(self.start, days), shift_by_days(self.end, days))
    }

    /// Total order used for display and lane assignment:
    /// all-day before timed, then start, then title, then id.
    pub fn layout_cmp(&self, other: &Self) -> Ordering {
        other
            .all_day
            .cmp(&self.all_day)
            .then_with(|| self.start.cmp(&other.start))
            .then_with(|| self.title.cmp(&other.title))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Order a day's events the way a cell renders them: all-day multi-day,
/// timed multi-day, all-day single-day, timed single-day, each group by
/// start then title.
pub fn display_order<'a, I>(events: I) -> Vec<&'a CalendarEvent>
where
    I: IntoIterator<Item = &'a CalendarEvent>,
{
    let mut ordered: Vec<&CalendarEvent> = events.into_iter().collect();
    ordered.sort_by(|a, b| {
        b.is_multi_day()
            .cmp(&a.is_multi_day())
            .then_with(|| a.layout_cmp(b))
    });
    ordered
}

/// Builder for creating events with optional fields
pub struct CalendarEventBuilder {
    id: Option<i64>,
    title: Option<String>,
    start: Option<DateTime<Local>>,
    end: Option<DateTime<Local>>,
    all_day: bool,
    color: Option<String>,
    external_id: Option<String>,
    occurrence_id: Option<String>,
}

impl CalendarEventBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            title: None,
            start: None,
            end: None,
            all_day: false,
            color: None,
            external_id: None,
            occurrence_id: None,
        }
    }

    pub fn id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn start(mut self, start: DateTime<Local>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: DateTime<Local>) -> Self {
        self.end = Some(end);
        self
    }

    pub fn all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    /// Set the event color (hex format)
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    pub fn occurrence_id(mut self, occurrence_id: impl Into<String>) -> Self {
        self.occurrence_id = Some(occurrence_id.into());
        self
    }

    /// Build the event
    pub fn build(self) -> Result<CalendarEvent, String> {
        let id = self.id.ok_or("Event id is required")?;
        let title = self.title.ok_or("Event title is required")?;
        let start = self.start.ok_or("Event start time is required")?;
        let end = self.end.ok_or("Event end time is required")?;

        let event = CalendarEvent {
            id,
            title,
            start,
            end,
            all_day: self.all_day,
            color: self.color,
            external_id: self.external_id,
            occurrence_id: self.occurrence_id,
        };

        event.validate()?;
        Ok(event)
    }
}

impl Default for CalendarEventBuilder {
    fn default() -> Self {
        Self::new()
    }
}
