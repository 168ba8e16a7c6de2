//! # beacon-events
//!
//! Analytics event definitions for the beacon client layer.
//!
//! ## Design Principles
//!
//! - Events are ephemeral records of a single user action; they are never stored
//! - Parameters are flat by construction (no nested values)
//! - A known event name always carries the same parameter shape
//! - Unknown names are still accepted through [`EventName::Custom`]
//!
//! ## Event Shapes
//!
//! The canonical constructors on [`Event`] are pure functions of their typed
//! arguments and an explicit timestamp:
//! - Page events (`page_view`, `page_exit`, `button_click`)
//! - Todo events (`todo_added`, `todo_deleted`, `todo_toggled`)
//! - Scroll events (`scroll_load_more`, `reached_list_end`, `scroll_depth`)
//! - Experiment events (`ab_test_exposed`)

mod error;
mod event;
mod params;
mod types;

pub use error::EventError;
pub use event::*;
pub use params::*;
pub use types::*;
