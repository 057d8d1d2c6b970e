// Calendar Grid demo
// Main entry point
//
// Usage: calendar-grid [EVENTS_JSON] [YYYY-MM]
// Prints the month grid with multi-day lanes and per-day overflow counts.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};

use calendar_grid::models::event::CalendarEvent;
use calendar_grid::models::settings::GridSettings;
use calendar_grid::services::event_store::InMemoryEventStore;
use calendar_grid::services::navigation::NavigationController;
use calendar_grid::views::{GridView, ViewType};

const CELL_WIDTH: usize = 12;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    log::info!("Starting calendar grid demo");

    let settings = match GridSettings::default_path() {
        Some(path) => GridSettings::load_or_default(&path),
        None => GridSettings::default(),
    };
    settings.validate()?;

    let mut args = std::env::args().skip(1);
    let store = match args.next() {
        Some(path) => load_store(Path::new(&path))?,
        None => InMemoryEventStore::default(),
    };
    let display_date = match args.next() {
        Some(month) => parse_month(&month)?,
        None => chrono::Local::now().date_naive(),
    };

    let navigation = Rc::new(NavigationController::new(display_date));
    let month = Rc::new(RefCell::new(GridView::for_view(
        ViewType::Month,
        settings.clone(),
        display_date,
    )));
    let day = Rc::new(RefCell::new(GridView::for_view(ViewType::Day, settings, display_date)));
    GridView::attach(&month, &navigation);
    GridView::attach(&day, &navigation);

    navigation.navigate_to_date(display_date, true);
    if !month.borrow_mut().reload(&store) {
        if let Some(error) = navigation.last_error() {
            eprintln!("Could not load events: {}", error);
        }
    }
    day.borrow_mut().reload(&store);

    print_month(&month.borrow());
    print_day(&day.borrow());
    Ok(())
}

fn load_store(path: &Path) -> Result<InMemoryEventStore> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read events from {}", path.display()))?;
    InMemoryEventStore::from_json(&json)
}

fn parse_month(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
        .with_context(|| format!("Expected a month as YYYY-MM, got '{}'", value))
}

fn truncate(title: &str, width: usize) -> String {
    title.chars().take(width).collect()
}

fn print_month(view: &GridView) {
    let display = view.display_date();
    println!("{}", display.format("%B %Y"));

    let events = view.events();
    let title_of = |id: i64| {
        events
            .iter()
            .find(|event| event.id == id)
            .map_or("?", |event: &CalendarEvent| event.title.as_str())
    };

    for row in view.rows() {
        let header: Vec<String> = row
            .days()
            .iter()
            .map(|date| {
                let marker = if view.is_focused(*date) { '*' } else { ' ' };
                format!("{:>2}{:<w$}", date.day(), marker, w = CELL_WIDTH - 2)
            })
            .collect();
        println!("{}", header.join("|"));

        let layout = view.layout();
        for lane in 0..layout.lanes_in_row(row.row_index) {
            let mut cells = vec![" ".repeat(CELL_WIDTH); row.days().len()];
            for segment in layout
                .segments_in_row(row.row_index)
                .filter(|segment| segment.lane_index == lane)
            {
                let title = title_of(segment.event_id);
                for day in segment.start_day_in_row..=segment.end_day_in_row {
                    let shape = segment.shape_for_day(day);
                    let open = if shape.round_leading { '[' } else { '=' };
                    let close = if shape.round_trailing { ']' } else { '=' };
                    let label = if day == segment.start_day_in_row {
                        truncate(title, CELL_WIDTH - 2)
                    } else {
                        String::new()
                    };
                    cells[day] = format!("{}{:=<w$}{}", open, label, close, w = CELL_WIDTH - 2);
                }
            }
            println!("{}", cells.join("|"));
        }

        let singles: Vec<String> = row
            .days()
            .iter()
            .map(|date| {
                let Some(slot) = layout.day_slot(*date) else {
                    return " ".repeat(CELL_WIDTH);
                };
                let mut text = slot
                    .single_day
                    .first()
                    .map(|placement| truncate(title_of(placement.event_id), CELL_WIDTH - 4))
                    .unwrap_or_default();
                let hidden = slot.single_day.len().saturating_sub(1) + slot.overflow_count;
                if hidden > 0 {
                    text.push_str(&format!(" +{}", hidden));
                }
                format!("{:<w$}", truncate(&text, CELL_WIDTH), w = CELL_WIDTH)
            })
            .collect();
        println!("{}", singles.join("|"));
        println!("{}", "-".repeat((CELL_WIDTH + 1) * row.days().len() - 1));
    }
}

fn print_day(view: &GridView) {
    println!();
    println!("{}", view.display_date().format("%A %d %B %Y"));
    let range = view.viewable_range();
    let mut any = false;
    for event in view.events().iter().filter(|event| {
        range.days().any(|date| event.occurs_on(date))
    }) {
        any = true;
        println!(
            "  {} - {}  {}",
            event.start.format("%H:%M"),
            event.end.format("%H:%M"),
            event.title
        );
    }
    if !any {
        println!("  (no events)");
    }
}
