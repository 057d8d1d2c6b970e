//! Grid views.
//!
//! A [`GridShape`] turns the shared display/focus dates into the rows and
//! ranges one kind of grid shows. [`GridView`] hosts a shape together with the
//! laid-out events and the drag controller, and follows a shared
//! [`NavigationController`](crate::services::navigation::NavigationController).

use chrono::NaiveDate;

use crate::interaction::drag::EdgeDirection;
use crate::models::grid::{DateRange, WeekRow};
use crate::models::settings::GridSettings;

pub mod day_view;
pub mod grid_view;
pub mod month_view;
pub mod week_view;

pub use day_view::DayShape;
pub use grid_view::{GridTile, GridView};
pub use month_view::MonthShape;
pub use week_view::WeekShape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewType {
    Day,
    Week,
    Month,
}

impl ViewType {
    pub fn shape(self) -> Box<dyn GridShape> {
        match self {
            ViewType::Day => Box::new(DayShape),
            ViewType::Week => Box::new(WeekShape),
            ViewType::Month => Box::new(MonthShape),
        }
    }
}

/// How one kind of grid interprets the shared navigation state.
pub trait GridShape {
    fn view_type(&self) -> ViewType;

    /// Week rows drawn while `display_date` is shown.
    fn week_rows(&self, display_date: NaiveDate, settings: &GridSettings) -> Vec<WeekRow>;

    /// Days actually visible while `display_date` is shown.
    fn viewable_range(&self, display_date: NaiveDate, settings: &GridSettings) -> DateRange;

    /// Cells highlighted for a focused date.
    fn focused_range(&self, focused_date: NaiveDate, _settings: &GridSettings) -> DateRange {
        DateRange::single(focused_date)
    }

    /// `date` moved by one page in `direction`.
    fn shift_page(&self, date: NaiveDate, direction: EdgeDirection) -> NaiveDate;
}

impl std::fmt::Debug for dyn GridShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.view_type())
    }
}
