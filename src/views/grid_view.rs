//! A grid on screen: one shape, its events, their layout and the drag
//! controller, kept in step with a shared navigation controller.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use chrono::{Local, NaiveDate};

use super::{GridShape, ViewType};
use crate::interaction::drag::{
    CommitConfirmation, DragController, DragOutcome, DragPayload, DragSignal, DragSnapshot,
    EdgeDirection, ValidationPredicate,
};
use crate::models::event::CalendarEvent;
use crate::models::grid::{DateRange, DaySlot, EventSegment, WeekRow};
use crate::models::settings::GridSettings;
use crate::services::event_store::EventStore;
use crate::services::layout::{compute_grid_layout, GridLayout};
use crate::services::navigation::{
    NavigationChange, NavigationController, NavigationObserver, NavigationState, SubscriptionId,
};

const DEFAULT_DAY_WIDTH: f32 = 100.0;

/// A draggable tile: a multi-day segment or a visible single-day event.
#[derive(Debug, Clone)]
pub struct GridTile {
    pub row_index: usize,
    pub start_day_in_row: usize,
    /// Lane for segments, stack slot for single-day events.
    pub stack_index: usize,
    pub payload: DragPayload,
}

impl GridTile {
    pub fn event_id(&self) -> i64 {
        self.payload.event.id
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        let last = self.payload.first_day + chrono::Duration::days(self.payload.day_count as i64 - 1);
        self.payload.first_day <= date && date <= last
    }
}

pub struct GridView {
    shape: Box<dyn GridShape>,
    settings: GridSettings,
    display_date: NaiveDate,
    focused_date: Option<NaiveDate>,
    rows: Vec<WeekRow>,
    viewable_range: DateRange,
    focused_range: Option<DateRange>,
    events: Vec<CalendarEvent>,
    layout: GridLayout,
    tiles: Vec<GridTile>,
    day_width: f32,
    drag: DragController,
    navigation: Option<Rc<NavigationController>>,
    subscription: Option<SubscriptionId>,
    loaded_range: Option<DateRange>,
    disposed: bool,
}

impl GridView {
    pub fn new(shape: Box<dyn GridShape>, settings: GridSettings, display_date: NaiveDate) -> Self {
        let rows = shape.week_rows(display_date, &settings);
        let viewable_range = shape.viewable_range(display_date, &settings);
        let mut view = Self {
            drag: DragController::new(settings.clone()),
            shape,
            settings,
            display_date,
            focused_date: None,
            rows,
            viewable_range,
            focused_range: None,
            events: Vec::new(),
            layout: GridLayout::default(),
            tiles: Vec::new(),
            day_width: DEFAULT_DAY_WIDTH,
            navigation: None,
            subscription: None,
            loaded_range: None,
            disposed: false,
        };
        view.relayout();
        view
    }

    pub fn for_view(view_type: ViewType, settings: GridSettings, display_date: NaiveDate) -> Self {
        Self::new(view_type.shape(), settings, display_date)
    }

    /// Follow `navigation`: the view adopts its current state now and on
    /// every later change. The observer holds only a weak reference, so a
    /// dropped view is never touched.
    pub fn attach(view: &Rc<RefCell<GridView>>, navigation: &Rc<NavigationController>) -> SubscriptionId {
        let weak = Rc::downgrade(view);
        let observer: Rc<dyn NavigationObserver> =
            Rc::new(move |state: &NavigationState, change: NavigationChange| {
                if !change.affects_ranges() {
                    return;
                }
                let Some(view) = weak.upgrade() else {
                    return;
                };
                // A view that triggered the change itself is mid-call and re-syncs on return.
                match view.try_borrow_mut() {
                    Ok(mut view) => view.apply_navigation(state),
                    Err(_) => log::debug!("Grid view busy, deferring navigation sync"),
                };
            });

        let id = navigation.subscribe(observer);
        let mut grid = view.borrow_mut();
        if let Some(previous) = grid.subscription.take() {
            if let Some(old) = grid.navigation.take() {
                old.unsubscribe(previous);
            }
        }
        grid.navigation = Some(Rc::clone(navigation));
        grid.subscription = Some(id);
        grid.apply_navigation(&navigation.state());
        id
    }

    /// Recompute rows and ranges from shared state.
    pub fn apply_navigation(&mut self, state: &NavigationState) {
        if self.disposed {
            return;
        }
        self.focused_date = state.focused_date;
        self.focused_range = state
            .focused_date
            .map(|date| self.shape.focused_range(date, &self.settings));

        if state.display_date != self.display_date {
            self.display_date = state.display_date;
            let rows = self.shape.week_rows(self.display_date, &self.settings);
            if rows != self.rows {
                log::debug!(
                    "{:?} grid now shows {} - {}",
                    self.shape.view_type(),
                    rows.first().map(|row| row.first_day).unwrap_or(self.display_date),
                    rows.last().map(|row| row.last_day()).unwrap_or(self.display_date)
                );
                self.rows = rows;
                self.viewable_range = self.shape.viewable_range(self.display_date, &self.settings);
                self.relayout();
            }
        }
    }

    pub fn view_type(&self) -> ViewType {
        self.shape.view_type()
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn display_date(&self) -> NaiveDate {
        self.display_date
    }

    pub fn focused_date(&self) -> Option<NaiveDate> {
        self.focused_date
    }

    pub fn viewable_range(&self) -> DateRange {
        self.viewable_range
    }

    pub fn focused_range(&self) -> Option<DateRange> {
        self.focused_range
    }

    pub fn is_focused(&self, date: NaiveDate) -> bool {
        self.focused_range.is_some_and(|range| range.contains(date))
    }

    pub fn rows(&self) -> &[WeekRow] {
        &self.rows
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Segments with at least one day inside the viewable range.
    pub fn visible_segments(&self) -> impl Iterator<Item = &EventSegment> {
        self.layout.segments.iter().filter(move |segment| {
            self.rows.iter().any(|row| {
                row.row_index == segment.row_index
                    && self.viewable_range.overlaps(
                        row.date_at(segment.start_day_in_row),
                        row.date_at(segment.end_day_in_row),
                    )
            })
        })
    }

    pub fn visible_day_slots(&self) -> impl Iterator<Item = &DaySlot> {
        self.layout
            .day_slots
            .iter()
            .filter(move |slot| self.viewable_range.contains(slot.date))
    }

    pub fn tiles(&self) -> &[GridTile] {
        &self.tiles
    }

    /// Index of the tile drawing `event_id` on `date`.
    pub fn tile_at(&self, event_id: i64, date: NaiveDate) -> Option<usize> {
        self.tiles
            .iter()
            .position(|tile| tile.event_id() == event_id && tile.covers(date))
    }

    pub fn set_day_width(&mut self, day_width: f32) {
        if (self.day_width - day_width).abs() > f32::EPSILON {
            self.day_width = day_width;
            self.relayout();
        }
    }

    /// Replace the events shown. A dragged event missing from `events` is
    /// kept until its drag ends.
    pub fn set_events(&mut self, mut events: Vec<CalendarEvent>) {
        if let Some(session) = self.drag.session() {
            if !events.iter().any(|event| event.id == session.event.id) {
                events.push(session.event.clone());
            }
        }
        self.events = events;
        self.relayout();
    }

    /// Load the viewable range from `store`, reporting progress and failures
    /// through the navigation controller. Returns false on failure; the grid
    /// keeps its previous events.
    pub fn reload(&mut self, store: &dyn EventStore) -> bool {
        let range = self.viewable_range;
        if let Some(navigation) = &self.navigation {
            navigation.set_loading(true);
        }

        let result = store.load_events(range.start, range.end);
        let navigation = self.navigation.clone();
        let loaded = match result {
            Ok(events) => {
                log::debug!("Loaded {} events for {} - {}", events.len(), range.start, range.end);
                self.set_events(events);
                self.loaded_range = Some(range);
                if let Some(navigation) = &navigation {
                    navigation.set_error(None);
                }
                true
            }
            Err(err) => {
                let message = format!("{:#}", err);
                match &navigation {
                    Some(navigation) => navigation.set_error(Some(message)),
                    None => log::error!("Event loading failed: {}", message),
                }
                false
            }
        };

        if let Some(navigation) = &navigation {
            navigation.set_loading(false);
        }
        loaded
    }

    /// Retry after a failed load.
    pub fn retry(&mut self, store: &dyn EventStore) -> bool {
        self.reload(store)
    }

    /// True when the viewable range differs from what was last loaded.
    pub fn needs_reload(&self) -> bool {
        self.loaded_range != Some(self.viewable_range)
    }

    pub fn navigate_previous(&mut self) {
        self.set_display_date(self.shape.shift_page(self.display_date, EdgeDirection::Previous));
    }

    pub fn navigate_next(&mut self) {
        self.set_display_date(self.shape.shift_page(self.display_date, EdgeDirection::Next));
    }

    pub fn jump_to_today(&mut self) {
        self.set_display_date(Local::now().date_naive());
    }

    /// Change the display date, through the shared controller when attached.
    pub fn set_display_date(&mut self, date: NaiveDate) {
        match self.navigation.clone() {
            Some(navigation) => {
                navigation.set_display_date(date);
                self.apply_navigation(&navigation.state());
            }
            None => {
                let mut state = self.local_state();
                state.display_date = date;
                self.apply_navigation(&state);
            }
        }
    }

    /// Select a date, through the shared controller when attached.
    pub fn select_date(&mut self, date: Option<NaiveDate>) {
        match self.navigation.clone() {
            Some(navigation) => {
                navigation.set_focused_date(date);
                self.apply_navigation(&navigation.state());
            }
            None => {
                let mut state = self.local_state();
                state.focused_date = date;
                self.apply_navigation(&state);
            }
        }
    }

    pub fn set_validator(&mut self, validator: Option<ValidationPredicate>) {
        self.drag.set_validator(validator);
    }

    pub fn set_confirmation(&mut self, confirmation: Option<CommitConfirmation>) {
        self.drag.set_confirmation(confirmation);
    }

    pub fn drag_snapshot(&self) -> DragSnapshot {
        self.drag.snapshot()
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    /// Pointer down on tile `tile_index`, `offset_x` pixels from its leading edge.
    pub fn pointer_down(&mut self, tile_index: usize, offset_x: f32, now: Instant) -> bool {
        let Some(tile) = self.tiles.get(tile_index) else {
            return false;
        };
        self.drag.pointer_down(&tile.payload, offset_x, now)
    }

    pub fn pointer_move(&mut self, day: Option<NaiveDate>, edge: Option<EdgeDirection>, now: Instant) {
        self.drag.pointer_move(day, edge, now);
    }

    pub fn pointer_up(&mut self) -> DragOutcome {
        let outcome = self.drag.pointer_up(&mut self.events);
        if matches!(outcome, DragOutcome::Committed(_) | DragOutcome::Reverted(_)) {
            self.relayout();
        }
        outcome
    }

    pub fn cancel_drag(&mut self) -> DragOutcome {
        self.drag.cancel()
    }

    /// Run due drag timers. Returns the signals that were acted on.
    ///
    /// An edge navigation pages the grid and carries the drop target along by
    /// the same page, so a pointer held still keeps pointing at the same cell.
    /// It is dropped when the carried target or the page being entered falls
    /// outside the configured bounds.
    pub fn tick(&mut self, now: Instant) -> Vec<DragSignal> {
        let mut handled = Vec::new();
        for signal in self.drag.poll(now) {
            match signal {
                DragSignal::DragStarted { .. } => handled.push(signal),
                DragSignal::NavigatePage(direction) => {
                    let Some(target) = self.drag.session().map(|session| session.target_date) else {
                        continue;
                    };
                    let proposed = self.shape.shift_page(target, direction);
                    let next_display = self.shape.shift_page(self.display_date, direction);
                    let entering = self.shape.viewable_range(next_display, &self.settings);
                    if !self.drag.edge_navigation_allowed(proposed)
                        || !self.settings.overlaps_bounds(entering)
                    {
                        log::debug!("Edge navigation to {} suppressed by bounds", proposed);
                        continue;
                    }
                    log::debug!("Edge navigation {:?} during drag", direction);
                    self.set_display_date(next_display);
                    self.drag.retarget(proposed);
                    handled.push(signal);
                }
            }
        }
        handled
    }

    /// Cancel pending drag timers, drop any drag and stop following the
    /// navigation controller.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.drag.dispose();
        if let (Some(navigation), Some(id)) = (self.navigation.take(), self.subscription.take()) {
            navigation.unsubscribe(id);
        }
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn local_state(&self) -> NavigationState {
        NavigationState {
            display_date: self.display_date,
            focused_date: self.focused_date,
            is_loading: false,
            last_error: None,
        }
    }

    fn relayout(&mut self) {
        self.layout = compute_grid_layout(
            &self.events,
            &self.rows,
            self.settings.max_visible_events_per_day,
        );
        self.tiles = self.build_tiles();
    }

    fn build_tiles(&self) -> Vec<GridTile> {
        let find = |id: i64| self.events.iter().find(|event| event.id == id);
        let mut tiles = Vec::new();

        for segment in &self.layout.segments {
            let row = self.rows.iter().find(|row| row.row_index == segment.row_index);
            let (Some(event), Some(row)) = (find(segment.event_id), row) else {
                continue;
            };
            let day_count = segment.day_count();
            tiles.push(GridTile {
                row_index: segment.row_index,
                start_day_in_row: segment.start_day_in_row,
                stack_index: segment.lane_index,
                payload: DragPayload::new(
                    event.clone(),
                    row.date_at(segment.start_day_in_row),
                    day_count,
                    self.day_width * day_count as f32,
                ),
            });
        }

        for slot in &self.layout.day_slots {
            for placement in &slot.single_day {
                let Some(event) = find(placement.event_id) else {
                    continue;
                };
                tiles.push(GridTile {
                    row_index: slot.row_index,
                    start_day_in_row: slot.day_in_row,
                    stack_index: placement.slot_index,
                    payload: DragPayload::new(event.clone(), slot.date, 1, self.day_width),
                });
            }
        }
        tiles
    }
}

impl Drop for GridView {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for GridView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridView")
            .field("view_type", &self.shape.view_type())
            .field("display_date", &self.display_date)
            .field("focused_date", &self.focused_date)
            .field("events", &self.events.len())
            .field("drag", &self.drag)
            .finish()
    }
}
