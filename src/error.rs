// Error types shared across the grid engine

use thiserror::Error;

/// Invalid configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("first_day_of_week must be between 0 and 6, got {0}")]
    InvalidFirstDayOfWeek(u8),
    #[error("max_visible_events_per_day must be at least 1")]
    ZeroVisibleEvents,
    #[error("long_press_ms must be greater than zero")]
    ZeroLongPress,
    #[error("min_date {min} is after max_date {max}")]
    InvertedBounds {
        min: chrono::NaiveDate,
        max: chrono::NaiveDate,
    },
}

/// Failures reported by the in-memory event store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("event {0} not found")]
    NotFound(i64),
    #[error("event {id}: {reason}")]
    InvalidUpdate { id: i64, reason: String },
}
