//! Shared navigation and focus state.
//!
//! One [`NavigationController`] is shared (via `Rc`) by every grid view on
//! screen. It owns the display date, the focused date and the loading/error
//! flags, and knows nothing about the shapes of the grids observing it: each
//! observer turns the raw dates into its own visible and focused ranges.
//!
//! Setters update state and notify every observer synchronously before they
//! return. No borrow is held while observers run, so an observer may call
//! back into the controller; the nested change is delivered as its own
//! notification.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{Local, NaiveDate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    /// Period the views should show.
    pub display_date: NaiveDate,
    /// Selected/highlighted date, independent of `display_date`.
    pub focused_date: Option<NaiveDate>,
    pub is_loading: bool,
    pub last_error: Option<String>,
}

/// Which fields a notification covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationChange {
    pub display_date: bool,
    pub focused_date: bool,
    pub loading: bool,
    pub error: bool,
}

impl NavigationChange {
    pub fn is_empty(&self) -> bool {
        !(self.display_date || self.focused_date || self.loading || self.error)
    }

    /// True when visible or focused ranges may have moved.
    pub fn affects_ranges(&self) -> bool {
        self.display_date || self.focused_date
    }
}

pub trait NavigationObserver {
    fn on_navigation_changed(&self, state: &NavigationState, change: NavigationChange);
}

impl<F> NavigationObserver for F
where
    F: Fn(&NavigationState, NavigationChange),
{
    fn on_navigation_changed(&self, state: &NavigationState, change: NavigationChange) {
        self(state, change)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub struct NavigationController {
    state: RefCell<NavigationState>,
    observers: RefCell<Vec<(SubscriptionId, Rc<dyn NavigationObserver>)>>,
    next_subscription: Cell<u64>,
}

impl NavigationController {
    pub fn new(display_date: NaiveDate) -> Self {
        Self {
            state: RefCell::new(NavigationState {
                display_date,
                focused_date: None,
                is_loading: false,
                last_error: None,
            }),
            observers: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
        }
    }

    /// Controller showing today, with nothing focused.
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> NavigationState {
        self.state.borrow().clone()
    }

    pub fn display_date(&self) -> NaiveDate {
        self.state.borrow().display_date
    }

    pub fn focused_date(&self) -> Option<NaiveDate> {
        self.state.borrow().focused_date
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    pub fn subscribe(&self, observer: Rc<dyn NavigationObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.observers.borrow_mut().push((id, observer));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.borrow_mut();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Change the visible period. The focused date is left alone.
    pub fn set_display_date(&self, date: NaiveDate) {
        let change = self.update(|state, change| {
            if state.display_date != date {
                state.display_date = date;
                change.display_date = true;
            }
        });
        self.notify(change);
    }

    /// Change the selection. The display date is left alone.
    pub fn set_focused_date(&self, date: Option<NaiveDate>) {
        let change = self.update(|state, change| {
            if state.focused_date != date {
                state.focused_date = date;
                change.focused_date = true;
            }
        });
        self.notify(change);
    }

    /// Show `date`, and select it too when `focus` is set. Observers get a
    /// single notification covering both fields.
    pub fn navigate_to_date(&self, date: NaiveDate, focus: bool) {
        let change = self.update(|state, change| {
            if state.display_date != date {
                state.display_date = date;
                change.display_date = true;
            }
            if focus && state.focused_date != Some(date) {
                state.focused_date = Some(date);
                change.focused_date = true;
            }
        });
        log::info!("Navigated to {} (focus: {})", date, focus);
        self.notify(change);
    }

    pub fn set_loading(&self, loading: bool) {
        let change = self.update(|state, change| {
            if state.is_loading != loading {
                state.is_loading = loading;
                change.loading = true;
            }
        });
        self.notify(change);
    }

    pub fn set_error(&self, error: Option<String>) {
        if let Some(ref message) = error {
            log::error!("Event loading failed: {}", message);
        }
        let change = self.update(|state, change| {
            if state.last_error != error {
                state.last_error = error;
                change.error = true;
            }
        });
        self.notify(change);
    }

    fn update<F>(&self, apply: F) -> NavigationChange
    where
        F: FnOnce(&mut NavigationState, &mut NavigationChange),
    {
        let mut change = NavigationChange::default();
        apply(&mut *self.state.borrow_mut(), &mut change);
        change
    }

    fn notify(&self, change: NavigationChange) {
        if change.is_empty() {
            return;
        }
        let state = self.state();
        let observers: Vec<Rc<dyn NavigationObserver>> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        for observer in observers {
            observer.on_navigation_changed(&state, change);
        }
    }
}

impl std::fmt::Debug for NavigationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("state", &*self.state.borrow())
            .field("observers", &self.observer_count())
            .finish()
    }
}
