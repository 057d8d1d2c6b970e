// Service module exports

pub mod event_store;
pub mod layout;
pub mod navigation;
