// Event Drag System
//
// Moves events between days by long-pressing a tile and dropping it on
// another day cell.
// - Idle -> Armed on pointer-down, Armed -> Dragging once the long press is recognised
// - Holding the pointer at a page edge advances the grid to the adjacent page
// - Drops are applied optimistically and reverted if the confirmation rejects them

use std::time::Instant;

use chrono::{DateTime, Local, NaiveDate};

use super::grab_offset::GrabOffsetHolder;
use super::timers::{TimerId, TimerQueue};
use crate::models::event::CalendarEvent;
use crate::models::settings::GridSettings;
use crate::utils::date::{days_between, shift_by_days};

/// Decides whether an event may be dropped at the proposed start/end.
pub type ValidationPredicate = Box<dyn Fn(&CalendarEvent, DateTime<Local>, DateTime<Local>) -> bool>;

/// Confirms a drop after it has been applied. Returning false reverts it.
pub type CommitConfirmation = Box<dyn FnMut(&CalendarEvent, &EventMove) -> bool>;

/// Which page edge the pointer is holding against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeDirection {
    Previous,
    Next,
}

/// Data a tile carries into a drag. Built when the grid lays out its tiles.
#[derive(Clone, Debug)]
pub struct DragPayload {
    pub event: CalendarEvent,
    /// First day covered by the tile.
    pub first_day: NaiveDate,
    /// Days covered by the tile, at least 1.
    pub day_count: usize,
    /// Rendered tile width in pixels.
    pub tile_width: f32,
    pub grab_offset: GrabOffsetHolder,
}

impl DragPayload {
    pub fn new(event: CalendarEvent, first_day: NaiveDate, day_count: usize, tile_width: f32) -> Self {
        Self {
            event,
            first_day,
            day_count: day_count.max(1),
            tile_width,
            grab_offset: GrabOffsetHolder::new(),
        }
    }

    /// Day of the tile under a contact point `offset_x` pixels from its leading edge.
    pub fn day_under(&self, offset_x: f32) -> NaiveDate {
        let day_width = self.tile_width / self.day_count as f32;
        let index = if day_width > 0.0 && offset_x > 0.0 {
            ((offset_x / day_width).floor() as usize).min(self.day_count - 1)
        } else {
            0
        };
        self.first_day + chrono::Duration::days(index as i64)
    }
}

/// A proposed or committed change of an event's times.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventMove {
    pub event_id: i64,
    pub old_start: DateTime<Local>,
    pub old_end: DateTime<Local>,
    pub new_start: DateTime<Local>,
    pub new_end: DateTime<Local>,
}

impl EventMove {
    pub fn day_delta(&self) -> i64 {
        days_between(self.old_start.date_naive(), self.new_start.date_naive())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPhaseKind {
    Idle,
    Armed,
    Dragging,
}

/// Presentation of the tile under the pointer while dragging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HoverState {
    #[default]
    None,
    Valid,
    Invalid,
}

/// How a pointer-up or cancel ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragOutcome {
    /// No drag was in progress.
    Ignored,
    /// Released before the long press was recognised.
    NotStarted,
    Committed(EventMove),
    /// The confirmation rejected the move; original times were restored.
    Reverted(EventMove),
    Cancelled,
}

/// Side effects the owning view has to carry out after [`DragController::poll`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragSignal {
    DragStarted { event_id: i64 },
    NavigatePage(EdgeDirection),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DragTimer {
    LongPress,
    EdgeNavigation(EdgeDirection),
}

#[derive(Clone, Copy, Debug)]
struct EdgeHold {
    direction: EdgeDirection,
    timer: TimerId,
}

#[derive(Clone, Debug)]
struct ArmedDrag {
    payload: DragPayload,
    source_date: NaiveDate,
    long_press: TimerId,
}

/// An in-progress drag of one event.
#[derive(Clone, Debug)]
pub struct DragSession {
    pub event: CalendarEvent,
    /// Times at the moment dragging began, restored verbatim on revert.
    pub original_start: DateTime<Local>,
    pub original_end: DateTime<Local>,
    /// Day segment that was grabbed; not necessarily the event's first day.
    pub source_date: NaiveDate,
    pub grab_offset: f32,
    pub target_date: NaiveDate,
    pub is_valid_target: bool,
    pub over_grid: bool,
    edge: Option<EdgeHold>,
}

impl DragSession {
    pub fn day_delta(&self) -> i64 {
        days_between(self.source_date, self.target_date)
    }

    /// Start and end shifted by the current day delta.
    pub fn proposed_times(&self) -> (DateTime<Local>, DateTime<Local>) {
        let delta = self.day_delta();
        (
            shift_by_days(self.original_start, delta),
            shift_by_days(self.original_end, delta),
        )
    }

    pub fn hover_state(&self) -> HoverState {
        if !self.over_grid {
            HoverState::None
        } else if self.is_valid_target {
            HoverState::Valid
        } else {
            HoverState::Invalid
        }
    }

    pub fn edge_direction(&self) -> Option<EdgeDirection> {
        self.edge.map(|hold| hold.direction)
    }

    fn event_move(&self) -> EventMove {
        let (new_start, new_end) = self.proposed_times();
        EventMove {
            event_id: self.event.id,
            old_start: self.original_start,
            old_end: self.original_end,
            new_start,
            new_end,
        }
    }
}

/// Read-only view of the drag state for the rendering layer.
#[derive(Clone, Debug, PartialEq)]
pub struct DragSnapshot {
    pub phase: DragPhaseKind,
    pub event_id: Option<i64>,
    pub source_date: Option<NaiveDate>,
    pub target_date: Option<NaiveDate>,
    pub hover: HoverState,
    pub proposed_start: Option<DateTime<Local>>,
    pub proposed_end: Option<DateTime<Local>>,
    pub grab_offset: Option<f32>,
}

#[derive(Clone, Debug)]
enum DragPhase {
    Idle,
    Armed(ArmedDrag),
    Dragging(DragSession),
}

/// Drag state machine for one grid. At most one drag exists at a time.
pub struct DragController {
    settings: GridSettings,
    phase: DragPhase,
    timers: TimerQueue<DragTimer>,
    validator: Option<ValidationPredicate>,
    confirmation: Option<CommitConfirmation>,
    disposed: bool,
}

impl DragController {
    pub fn new(settings: GridSettings) -> Self {
        Self {
            settings,
            phase: DragPhase::Idle,
            timers: TimerQueue::new(),
            validator: None,
            confirmation: None,
            disposed: false,
        }
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: GridSettings) {
        self.settings = settings;
    }

    /// Without a validator every in-bounds target is valid.
    pub fn set_validator(&mut self, validator: Option<ValidationPredicate>) {
        self.validator = validator;
    }

    /// Without a confirmation every drop is accepted.
    pub fn set_confirmation(&mut self, confirmation: Option<CommitConfirmation>) {
        self.confirmation = confirmation;
    }

    pub fn phase(&self) -> DragPhaseKind {
        match self.phase {
            DragPhase::Idle => DragPhaseKind::Idle,
            DragPhase::Armed(_) => DragPhaseKind::Armed,
            DragPhase::Dragging(_) => DragPhaseKind::Dragging,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, DragPhase::Idle)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.phase {
            DragPhase::Dragging(session) => Some(session),
            _ => None,
        }
    }

    pub fn pending_timer_count(&self) -> usize {
        self.timers.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn snapshot(&self) -> DragSnapshot {
        match &self.phase {
            DragPhase::Idle => DragSnapshot {
                phase: DragPhaseKind::Idle,
                event_id: None,
                source_date: None,
                target_date: None,
                hover: HoverState::None,
                proposed_start: None,
                proposed_end: None,
                grab_offset: None,
            },
            DragPhase::Armed(armed) => DragSnapshot {
                phase: DragPhaseKind::Armed,
                event_id: Some(armed.payload.event.id),
                source_date: Some(armed.source_date),
                target_date: None,
                hover: HoverState::None,
                proposed_start: None,
                proposed_end: None,
                grab_offset: Some(armed.payload.grab_offset.get()),
            },
            DragPhase::Dragging(session) => {
                let (start, end) = session.proposed_times();
                DragSnapshot {
                    phase: DragPhaseKind::Dragging,
                    event_id: Some(session.event.id),
                    source_date: Some(session.source_date),
                    target_date: Some(session.target_date),
                    hover: session.hover_state(),
                    proposed_start: Some(start),
                    proposed_end: Some(end),
                    grab_offset: Some(session.grab_offset),
                }
            }
        }
    }

    /// Pointer went down on a tile, `offset_x` pixels from its leading edge.
    ///
    /// The offset is written into the payload's holder right away, so a
    /// payload built before this call still reports it when dragging starts.
    /// Returns false when dragging is disabled or a drag is already underway.
    pub fn pointer_down(&mut self, payload: &DragPayload, offset_x: f32, now: Instant) -> bool {
        if self.disposed || !self.settings.drag_enabled || !self.is_idle() {
            return false;
        }

        payload.grab_offset.set(offset_x);
        let source_date = payload.day_under(offset_x);
        let long_press = self
            .timers
            .schedule(now, self.settings.long_press(), DragTimer::LongPress);

        log::debug!(
            "Armed drag for event {} on {} (offset {:.1}px)",
            payload.event.id,
            source_date,
            offset_x
        );
        self.phase = DragPhase::Armed(ArmedDrag {
            payload: payload.clone(),
            source_date,
            long_press,
        });
        true
    }

    /// Pointer moved. `day` is the day cell under the pointer (None when the
    /// pointer is outside the grid) and `edge` the page edge zone it is in.
    pub fn pointer_move(&mut self, day: Option<NaiveDate>, edge: Option<EdgeDirection>, now: Instant) {
        let edge_delay = self.settings.edge_navigation_delay();
        let DragPhase::Dragging(session) = &mut self.phase else {
            return;
        };

        match day {
            Some(day) => {
                session.over_grid = true;
                session.target_date = day;
                let (start, end) = session.proposed_times();
                session.is_valid_target = Self::is_valid_drop(
                    &self.settings,
                    self.validator.as_ref(),
                    &session.event,
                    start,
                    end,
                );
            }
            None => session.over_grid = false,
        }

        let current = session.edge.map(|hold| hold.direction);
        if current != edge {
            if let Some(hold) = session.edge.take() {
                self.timers.cancel(hold.timer);
            }
            if let Some(direction) = edge {
                let timer = self
                    .timers
                    .schedule(now, edge_delay, DragTimer::EdgeNavigation(direction));
                session.edge = Some(EdgeHold { direction, timer });
            }
        }
    }

    /// Fire due timers and report what the owning view has to do.
    pub fn poll(&mut self, now: Instant) -> Vec<DragSignal> {
        let mut signals = Vec::new();
        if self.disposed {
            return signals;
        }

        for (id, kind) in self.timers.take_due(now) {
            match kind {
                DragTimer::LongPress => {
                    if let Some(signal) = self.recognise_long_press(id) {
                        signals.push(signal);
                    }
                }
                DragTimer::EdgeNavigation(direction) => {
                    let edge_delay = self.settings.edge_navigation_delay();
                    let DragPhase::Dragging(session) = &mut self.phase else {
                        log::debug!("Ignoring edge timer with no drag in progress");
                        continue;
                    };
                    if !session.edge.is_some_and(|hold| hold.timer == id) {
                        log::debug!("Ignoring stale edge timer");
                        continue;
                    }
                    // Keep paging while the pointer stays at the edge.
                    let timer = self.timers.schedule(
                        now,
                        edge_delay,
                        DragTimer::EdgeNavigation(direction),
                    );
                    session.edge = Some(EdgeHold { direction, timer });
                    signals.push(DragSignal::NavigatePage(direction));
                }
            }
        }
        signals
    }

    /// Whether auto-navigation may carry the drop target to `proposed`.
    pub fn edge_navigation_allowed(&self, proposed: NaiveDate) -> bool {
        self.settings.within_bounds(proposed)
    }

    /// Move the drop target without a pointer move, e.g. after the grid paged
    /// under a pointer held still at its edge. Validity is recomputed; the
    /// edge timer is left alone.
    pub fn retarget(&mut self, day: NaiveDate) {
        let DragPhase::Dragging(session) = &mut self.phase else {
            return;
        };
        session.target_date = day;
        let (start, end) = session.proposed_times();
        session.is_valid_target = Self::is_valid_drop(
            &self.settings,
            self.validator.as_ref(),
            &session.event,
            start,
            end,
        );
    }

    /// Pointer released. Applies the move to `events` when dropped on a valid
    /// target, then asks the confirmation and restores the original times if
    /// it refuses.
    pub fn pointer_up(&mut self, events: &mut [CalendarEvent]) -> DragOutcome {
        match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Idle => DragOutcome::Ignored,
            DragPhase::Armed(armed) => {
                self.timers.cancel(armed.long_press);
                log::debug!("Released event {} before long press", armed.payload.event.id);
                DragOutcome::NotStarted
            }
            DragPhase::Dragging(session) => {
                self.timers.cancel_all();
                if session.over_grid && session.is_valid_target {
                    self.commit(&session, events)
                } else {
                    log::debug!("Drag of event {} dropped on invalid target", session.event.id);
                    DragOutcome::Cancelled
                }
            }
        }
    }

    /// Abort whatever is in progress without touching any event.
    pub fn cancel(&mut self) -> DragOutcome {
        self.timers.cancel_all();
        match std::mem::replace(&mut self.phase, DragPhase::Idle) {
            DragPhase::Idle => DragOutcome::Ignored,
            DragPhase::Armed(_) => DragOutcome::NotStarted,
            DragPhase::Dragging(session) => {
                log::debug!("Drag of event {} cancelled", session.event.id);
                DragOutcome::Cancelled
            }
        }
    }

    /// Cancel all pending timers and drop any drag. Later polls and
    /// pointer-downs are ignored.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.timers.cancel_all();
        self.phase = DragPhase::Idle;
        self.disposed = true;
    }

    fn recognise_long_press(&mut self, id: TimerId) -> Option<DragSignal> {
        let DragPhase::Armed(armed) = &self.phase else {
            log::debug!("Ignoring long press with no armed tile");
            return None;
        };
        if armed.long_press != id {
            return None;
        }

        let event = armed.payload.event.clone();
        let mut session = DragSession {
            original_start: event.start,
            original_end: event.end,
            source_date: armed.source_date,
            grab_offset: armed.payload.grab_offset.get(),
            target_date: armed.source_date,
            is_valid_target: true,
            over_grid: true,
            edge: None,
            event,
        };
        let (start, end) = session.proposed_times();
        session.is_valid_target = Self::is_valid_drop(
            &self.settings,
            self.validator.as_ref(),
            &session.event,
            start,
            end,
        );

        let event_id = session.event.id;
        log::debug!(
            "Dragging event {} from {} (grab offset {:.1}px)",
            event_id,
            session.source_date,
            session.grab_offset
        );
        self.phase = DragPhase::Dragging(session);
        Some(DragSignal::DragStarted { event_id })
    }

    fn is_valid_drop(
        settings: &GridSettings,
        validator: Option<&ValidationPredicate>,
        event: &CalendarEvent,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> bool {
        let moved = event.with_times(start, end);
        if !settings.within_bounds(moved.first_day()) || !settings.within_bounds(moved.last_day()) {
            return false;
        }
        validator.map_or(true, |validate| validate(event, start, end))
    }

    fn commit(&mut self, session: &DragSession, events: &mut [CalendarEvent]) -> DragOutcome {
        let Some(index) = events.iter().position(|event| event.id == session.event.id) else {
            log::warn!("Dragged event {} is no longer in the grid", session.event.id);
            return DragOutcome::Cancelled;
        };

        let event_move = session.event_move();
        if event_move.day_delta() == 0 {
            return DragOutcome::Committed(event_move);
        }

        let original = events[index].clone();
        events[index] = original.with_times(event_move.new_start, event_move.new_end);

        let accepted = self
            .confirmation
            .as_mut()
            .map_or(true, |confirm| confirm(&original, &event_move));

        if accepted {
            log::info!(
                "Moved event {} by {} day(s) to {}",
                event_move.event_id,
                event_move.day_delta(),
                event_move.new_start
            );
            DragOutcome::Committed(event_move)
        } else {
            events[index] = original.with_times(event_move.old_start, event_move.old_end);
            log::warn!("Move of event {} was rejected, reverting", event_move.event_id);
            DragOutcome::Reverted(event_move)
        }
    }
}

impl Drop for DragController {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for DragController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragController")
            .field("phase", &self.phase)
            .field("pending_timers", &self.timers.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}
