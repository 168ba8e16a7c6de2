//! Headless page models.
//!
//! Each page owns its view state and reports through the shared
//! [`Tracker`](beacon_sdk::Tracker). Rendering is out of scope; callers drive
//! the pages with the same inputs a browser would deliver.

pub mod event;
pub mod infinite_list;
pub mod todos;

pub use event::EventPage;
pub use infinite_list::{InfiniteListPage, ListItem};
pub use todos::{Todo, TodoPage, TodoStats};
