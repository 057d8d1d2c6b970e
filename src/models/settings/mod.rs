// Settings module
// Grid configuration, loadable from a TOML file

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::models::grid::DateRange;

/// How many week rows a month grid shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthRows {
    /// Only the weeks that touch the displayed month (4 to 6 rows).
    #[default]
    Variable,
    /// Always six rows, padding with days of the following month.
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Week start used to lay out grid rows, 0 = Sunday .. 6 = Saturday.
    /// This is a display setting only; recurrence rules keep their own WKST.
    pub first_day_of_week: u8,
    /// Tiles stacked in one day cell before the rest collapse into an overflow count.
    pub max_visible_events_per_day: usize,
    pub month_rows: MonthRows,
    pub drag_enabled: bool,
    pub long_press_ms: u64,
    pub edge_navigation_delay_ms: u64,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            first_day_of_week: 0, // Sunday
            max_visible_events_per_day: 4,
            month_rows: MonthRows::Variable,
            drag_enabled: true,
            long_press_ms: 500,
            edge_navigation_delay_ms: 700,
            min_date: None,
            max_date: None,
        }
    }
}

impl GridSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.first_day_of_week > 6 {
            return Err(SettingsError::InvalidFirstDayOfWeek(self.first_day_of_week));
        }
        if self.max_visible_events_per_day == 0 {
            return Err(SettingsError::ZeroVisibleEvents);
        }
        if self.long_press_ms == 0 {
            return Err(SettingsError::ZeroLongPress);
        }
        if let (Some(min), Some(max)) = (self.min_date, self.max_date) {
            if min > max {
                return Err(SettingsError::InvertedBounds { min, max });
            }
        }
        Ok(())
    }

    pub fn long_press(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }

    pub fn edge_navigation_delay(&self) -> Duration {
        Duration::from_millis(self.edge_navigation_delay_ms)
    }

    /// True when `date` lies inside the configured min/max bounds.
    pub fn within_bounds(&self, date: NaiveDate) -> bool {
        self.min_date.map_or(true, |min| date >= min) && self.max_date.map_or(true, |max| date <= max)
    }

    /// True when some day of `range` lies inside the bounds.
    pub fn overlaps_bounds(&self, range: DateRange) -> bool {
        self.min_date.map_or(true, |min| range.end >= min)
            && self.max_date.map_or(true, |max| range.start <= max)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let settings: GridSettings =
            toml::from_str(contents).context("Failed to parse grid settings")?;
        settings.validate().context("Invalid grid settings")?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        Self::from_toml_str(&contents)
    }

    /// Load settings from `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::debug!("No settings file at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("Ignoring settings file {}: {:#}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Platform config location, e.g. `~/.config/calendar-grid/grid.toml`.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "CalendarGrid", "calendar-grid")
            .map(|dirs| dirs.config_dir().join("grid.toml"))
    }
}
