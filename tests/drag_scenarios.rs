// Integration tests for drag-to-reschedule
// Drives a month grid through pointer events and timers the way a host would

mod fixtures;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Datelike, Local, NaiveDate};
use mockall::mock;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use calendar_grid::interaction::drag::{DragOutcome, DragPhaseKind, DragSignal, EdgeDirection};
use calendar_grid::models::event::CalendarEvent;
use calendar_grid::models::settings::GridSettings;
use calendar_grid::services::event_store::{confirm_with_store, EventStore, InMemoryEventStore};
use calendar_grid::services::navigation::NavigationController;
use calendar_grid::views::{GridView, ViewType};
use fixtures::dates::{feb, feb_at, mar};
use fixtures::events::{conference, lunch};

mock! {
    pub Store {}
    impl EventStore for Store {
        fn load_events(
            &self,
            range_start: NaiveDate,
            range_end: NaiveDate,
        ) -> anyhow::Result<Vec<CalendarEvent>>;
        fn apply_event_update(
            &mut self,
            event_id: i64,
            new_start: DateTime<Local>,
            new_end: DateTime<Local>,
        ) -> anyhow::Result<()>;
    }
}

fn february_view(settings: GridSettings) -> GridView {
    let mut view = GridView::for_view(ViewType::Month, settings, feb(14));
    view.set_events(vec![conference(), lunch(2, 10)]);
    view
}

/// Long-press the tile of `event_id` drawn on `date` and return when dragging began.
fn start_drag(view: &mut GridView, event_id: i64, date: NaiveDate, offset_x: f32) -> Instant {
    let tile = view.tile_at(event_id, date).expect("tile on date");
    let t0 = Instant::now();
    assert!(view.pointer_down(tile, offset_x, t0));
    let began = t0 + view.settings().long_press();
    assert_eq!(view.tick(began), vec![DragSignal::DragStarted { event_id }]);
    began
}

#[test]
fn test_drop_from_second_row_segment_moves_both_ends() {
    let mut view = february_view(GridSettings::default());
    let now = start_drag(&mut view, 1, feb(15), 30.0);

    view.pointer_move(Some(feb(20)), None, now);
    let outcome = view.pointer_up();

    let DragOutcome::Committed(event_move) = outcome else {
        panic!("expected commit, got {:?}", outcome);
    };
    assert_eq!(event_move.day_delta(), 5);
    assert_eq!(event_move.new_start, feb_at(18, 9));
    assert_eq!(event_move.new_end, feb_at(21, 17));
    assert_eq!(view.events()[0].start, feb_at(18, 9));
}

#[test]
fn test_grab_offset_sampled_at_drag_start() {
    let mut view = february_view(GridSettings::default());
    let index = view.tile_at(1, feb(15)).unwrap();
    let prebuilt = view.tiles()[index].payload.clone();
    let offset = prebuilt.tile_width * 0.37;

    let t0 = Instant::now();
    assert!(view.pointer_down(index, offset, t0));
    // Recognition arrives late; the offset must still be the contact point.
    view.tick(t0 + Duration::from_secs(3));

    let snapshot = view.drag_snapshot();
    assert_eq!(snapshot.phase, DragPhaseKind::Dragging);
    assert_eq!(snapshot.grab_offset, Some(offset));
    assert_eq!(prebuilt.grab_offset.get(), offset);
}

#[test]
fn test_rejected_commit_restores_original_times() {
    let mut view = february_view(GridSettings::default());
    let mut store = MockStore::new();
    store
        .expect_apply_event_update()
        .times(1)
        .returning(|_, _, _| Err(anyhow::anyhow!("server refused")));
    view.set_confirmation(Some(confirm_with_store(Rc::new(RefCell::new(store)))));
    let layout_before = view.layout().clone();

    let now = start_drag(&mut view, 1, feb(13), 10.0);
    view.pointer_move(Some(feb(24)), None, now);

    assert!(matches!(view.pointer_up(), DragOutcome::Reverted(_)));
    assert_eq!(view.events()[0], conference());
    assert_eq!(view.layout(), &layout_before);
}

#[test]
fn test_accepted_commit_reaches_store() {
    let store = Rc::new(RefCell::new(InMemoryEventStore::new(vec![conference(), lunch(2, 10)])));
    let mut view = february_view(GridSettings::default());
    view.set_confirmation(Some(confirm_with_store(Rc::clone(&store))));

    let now = start_drag(&mut view, 2, feb(10), 50.0);
    view.pointer_move(Some(feb(12)), None, now);

    assert!(matches!(view.pointer_up(), DragOutcome::Committed(_)));
    assert_eq!(store.borrow().get(2).unwrap().start, feb_at(12, 12));
    assert_eq!(view.layout().day_slot(feb(12)).unwrap().single_day.len(), 1);
}

#[test]
fn test_edge_navigation_suppressed_beyond_max_date() {
    let settings = GridSettings {
        max_date: Some(feb(20)),
        ..Default::default()
    };
    let delay = settings.edge_navigation_delay();
    let mut view = february_view(settings);
    let now = start_drag(&mut view, 1, feb(15), 30.0);

    view.pointer_move(Some(feb(20)), Some(EdgeDirection::Next), now);
    assert!(view.tick(now + delay).is_empty());
    assert!(view.tick(now + delay * 3).is_empty());

    assert_eq!(view.display_date(), feb(14));
    assert_eq!(view.drag_snapshot().phase, DragPhaseKind::Dragging);
}

#[test]
fn test_pointer_held_at_edge_stops_paging_at_max_date() {
    let settings = GridSettings {
        max_date: Some(mar(31)),
        ..Default::default()
    };
    let delay = settings.edge_navigation_delay();
    let mut view = february_view(settings);
    let now = start_drag(&mut view, 1, feb(15), 30.0);

    view.pointer_move(Some(feb(27)), Some(EdgeDirection::Next), now);
    let paged: Vec<usize> = (1..=4)
        .map(|i| view.tick(now + delay * i).len())
        .collect();

    assert_eq!(paged, vec![1, 0, 0, 0]);
    assert_eq!(view.display_date(), mar(14));
    assert_eq!(view.drag_snapshot().target_date, Some(mar(27)));

    // The drop lands on the cell still under the pointer.
    let DragOutcome::Committed(event_move) = view.pointer_up() else {
        panic!("expected the drop on Mar 27 to commit");
    };
    assert_eq!(event_move.new_start.date_naive(), mar(25));
    assert_eq!(event_move.new_end.date_naive(), mar(28));
}

#[test]
fn test_pointer_held_at_leading_edge_stops_paging_at_min_date() {
    let settings = GridSettings {
        min_date: NaiveDate::from_ymd_opt(2026, 1, 10),
        ..Default::default()
    };
    let delay = settings.edge_navigation_delay();
    let mut view = february_view(settings);
    let now = start_drag(&mut view, 1, feb(15), 30.0);

    view.pointer_move(Some(feb(12)), Some(EdgeDirection::Previous), now);
    let paged: Vec<usize> = (1..=3)
        .map(|i| view.tick(now + delay * i).len())
        .collect();

    let jan = |day: u32| NaiveDate::from_ymd_opt(2026, 1, day).unwrap();
    assert_eq!(paged, vec![1, 0, 0]);
    assert_eq!(view.display_date(), jan(14));
    assert_eq!(view.drag_snapshot().target_date, Some(jan(12)));
    assert_eq!(view.drag_snapshot().phase, DragPhaseKind::Dragging);
}

#[test]
fn test_edge_navigation_moves_every_attached_view() {
    let navigation = Rc::new(NavigationController::new(feb(14)));
    let month = Rc::new(RefCell::new(february_view(GridSettings::default())));
    let day = Rc::new(RefCell::new(GridView::for_view(
        ViewType::Day,
        GridSettings::default(),
        feb(14),
    )));
    GridView::attach(&month, &navigation);
    GridView::attach(&day, &navigation);

    let delay = GridSettings::default().edge_navigation_delay();
    let now = start_drag(&mut month.borrow_mut(), 1, feb(15), 30.0);
    month
        .borrow_mut()
        .pointer_move(Some(feb(27)), Some(EdgeDirection::Next), now);
    let signals = month.borrow_mut().tick(now + delay);

    assert_eq!(signals, vec![DragSignal::NavigatePage(EdgeDirection::Next)]);
    assert_eq!(navigation.display_date(), mar(14));
    assert_eq!(month.borrow().viewable_range().start, mar(1));
    assert_eq!(day.borrow().viewable_range().start, mar(14));
    assert_eq!(month.borrow().drag_snapshot().event_id, Some(1));
}

#[test]
fn test_failed_load_reports_error_and_retry_clears_it() {
    let navigation = Rc::new(NavigationController::new(feb(14)));
    let view = Rc::new(RefCell::new(GridView::for_view(
        ViewType::Month,
        GridSettings::default(),
        feb(14),
    )));
    GridView::attach(&view, &navigation);

    let mut store = MockStore::new();
    let mut calls = 0;
    store.expect_load_events().times(2).returning(move |_, _| {
        calls += 1;
        if calls == 1 {
            Err(anyhow::anyhow!("timeout"))
        } else {
            Ok(vec![conference()])
        }
    });

    assert!(!view.borrow_mut().reload(&store));
    assert!(navigation.last_error().unwrap().contains("timeout"));
    assert!(!navigation.is_loading());

    assert!(view.borrow_mut().retry(&store));
    assert_eq!(navigation.last_error(), None);
    assert_eq!(view.borrow().events().len(), 1);
}

proptest! {
    /// Property: an accepted drop moves start and end by the same number of
    /// days and keeps their clock times.
    #[test]
    fn prop_commit_preserves_duration(target_day in 1..=28u32, grab_day in 13..=16u32) {
        let mut view = february_view(GridSettings::default());
        let tile = view.tile_at(1, feb(grab_day)).unwrap();
        let payload = view.tiles()[tile].payload.clone();
        let day_width = payload.tile_width / payload.day_count as f32;
        let offset = (grab_day - payload.first_day.day()) as f32 * day_width + day_width / 2.0;

        let t0 = Instant::now();
        prop_assert!(view.pointer_down(tile, offset, t0));
        view.tick(t0 + Duration::from_secs(1));
        view.pointer_move(Some(feb(target_day)), None, t0 + Duration::from_secs(1));

        let DragOutcome::Committed(event_move) = view.pointer_up() else {
            return Err(TestCaseError::fail("drop was not committed"));
        };
        let expected = i64::from(target_day) - i64::from(grab_day);
        let start_days = (event_move.new_start.date_naive() - event_move.old_start.date_naive()).num_days();
        let end_days = (event_move.new_end.date_naive() - event_move.old_end.date_naive()).num_days();
        prop_assert_eq!(start_days, expected);
        prop_assert_eq!(end_days, expected);
        prop_assert_eq!(event_move.new_start.time(), event_move.old_start.time());
        prop_assert_eq!(event_move.new_end.time(), event_move.old_end.time());
    }
}
