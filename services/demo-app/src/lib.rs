//! # beacon-demo
//!
//! Headless demo application for the beacon client layer.
//!
//! Three page models exercise the tracker and the config resolver:
//!
//! - **Todo page**: CRUD tracking plus the `todo_add_button_color` experiment
//! - **Event page**: page view, click counting, and dwell time on exit
//! - **Infinite list**: throttled scroll depth and intersection-driven loads
//!
//! [`App`] is the composition root; [`session::run_session`] drives a full
//! visit for the binary and the integration tests.

pub mod app;
pub mod pages;
pub mod scroll;
pub mod session;

pub use app::App;
pub use session::{run_session, SessionPlan, SessionSummary};
