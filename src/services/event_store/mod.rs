//! Event store seam.
//! The grid reads concrete events through [`EventStore`] and writes committed
//! drags back through the same trait. [`InMemoryEventStore`] backs tests and
//! the demo binary.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate};

use crate::error::StoreError;
use crate::interaction::drag::{CommitConfirmation, EventMove};
use crate::models::event::CalendarEvent;

/// Source of already-expanded events for a visible range.
#[cfg_attr(test, mockall::automock)]
pub trait EventStore {
    /// Events overlapping the inclusive range `[range_start, range_end]`.
    fn load_events(&self, range_start: NaiveDate, range_end: NaiveDate) -> Result<Vec<CalendarEvent>>;

    /// Persist new start/end for an event.
    fn apply_event_update(
        &mut self,
        event_id: i64,
        new_start: DateTime<Local>,
        new_end: DateTime<Local>,
    ) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryEventStore {
    events: Vec<CalendarEvent>,
}

impl InMemoryEventStore {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self { events }
    }

    /// Parse a JSON array of events.
    pub fn from_json(json: &str) -> Result<Self> {
        let events: Vec<CalendarEvent> =
            serde_json::from_str(json).context("Failed to parse events JSON")?;
        for event in &events {
            event
                .validate()
                .map_err(|reason| StoreError::InvalidUpdate { id: event.id, reason })?;
        }
        Ok(Self::new(events))
    }

    pub fn insert(&mut self, event: CalendarEvent) {
        self.events.retain(|existing| existing.id != event.id);
        self.events.push(event);
    }

    pub fn get(&self, event_id: i64) -> Option<&CalendarEvent> {
        self.events.iter().find(|event| event.id == event_id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventStore for InMemoryEventStore {
    fn load_events(&self, range_start: NaiveDate, range_end: NaiveDate) -> Result<Vec<CalendarEvent>> {
        let mut events: Vec<CalendarEvent> = self
            .events
            .iter()
            .filter(|event| event.first_day() <= range_end && event.last_day() >= range_start)
            .cloned()
            .collect();
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        Ok(events)
    }

    fn apply_event_update(
        &mut self,
        event_id: i64,
        new_start: DateTime<Local>,
        new_end: DateTime<Local>,
    ) -> Result<()> {
        if new_end < new_start {
            return Err(StoreError::InvalidUpdate {
                id: event_id,
                reason: "end before start".to_string(),
            }
            .into());
        }
        let event = self
            .events
            .iter_mut()
            .find(|event| event.id == event_id)
            .ok_or(StoreError::NotFound(event_id))?;
        *event = event.with_times(new_start, new_end);
        log::debug!("Stored new times for event {}: {} - {}", event_id, new_start, new_end);
        Ok(())
    }
}

/// Confirmation that persists each drop through `store`. A failed write
/// rejects the drop, which reverts it in the grid.
pub fn confirm_with_store<S>(store: Rc<RefCell<S>>) -> CommitConfirmation
where
    S: EventStore + 'static,
{
    Box::new(move |event: &CalendarEvent, event_move: &EventMove| {
        let result = store.borrow_mut().apply_event_update(
            event_move.event_id,
            event_move.new_start,
            event_move.new_end,
        );
        match result {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Failed to save move of '{}': {:#}", event.title, err);
                false
            }
        }
    })
}
