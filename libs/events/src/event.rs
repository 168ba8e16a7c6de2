//! The event record and its canonical shapes.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EventError;
use crate::params::{EventParams, ParamValue};
use crate::types::{param_keys, EventName};

/// Maximum event name length accepted by the analytics backend.
pub const MAX_EVENT_NAME_LEN: usize = 40;

/// Maximum number of parameters per event.
pub const MAX_PARAMS: usize = 25;

/// Maximum parameter name length.
pub const MAX_PARAM_NAME_LEN: usize = 40;

/// Maximum string parameter value length.
pub const MAX_PARAM_VALUE_LEN: usize = 100;

/// Formats a timestamp the way every event carries it (`2025-01-01T00:00:00.000Z`).
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A named, parameterized analytics record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: EventName,

    #[serde(default)]
    pub params: EventParams,
}

impl Event {
    pub fn new(name: impl Into<EventName>, params: EventParams) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    fn stamped(name: EventName, params: EventParams, at: DateTime<Utc>) -> Self {
        Self::new(name, params.with(param_keys::TIMESTAMP, format_timestamp(at)))
    }

    /// A page was shown.
    pub fn page_view(
        page_title: &str,
        page_location: &str,
        page_path: &str,
        at: DateTime<Utc>,
    ) -> Self {
        let params = EventParams::new()
            .with(param_keys::PAGE_TITLE, page_title)
            .with(param_keys::PAGE_LOCATION, page_location)
            .with(param_keys::PAGE_PATH, page_path);
        Self::stamped(EventName::PageView, params, at)
    }

    /// A page was left after `duration_seconds` whole seconds.
    pub fn page_exit(page_title: &str, duration_seconds: u64, at: DateTime<Utc>) -> Self {
        let params = EventParams::new()
            .with(param_keys::PAGE_TITLE, page_title)
            .with(param_keys::DURATION_SECONDS, duration_seconds);
        Self::stamped(EventName::PageExit, params, at)
    }

    /// A button was clicked. Keys in `extra` override the defaults, timestamp included.
    pub fn button_click(button_name: &str, extra: Option<EventParams>, at: DateTime<Utc>) -> Self {
        let mut event = Self::stamped(
            EventName::ButtonClick,
            EventParams::new().with(param_keys::BUTTON_NAME, button_name),
            at,
        );
        if let Some(extra) = extra {
            event.params.extend(extra);
        }
        event
    }

    pub fn todo_added(todo_id: i64, todo_text: &str, at: DateTime<Utc>) -> Self {
        let params = EventParams::new()
            .with(param_keys::TODO_ID, todo_id)
            .with(param_keys::TODO_TEXT, todo_text);
        Self::stamped(EventName::TodoAdded, params, at)
    }

    /// `todo_text` is undefined when the deleted id was not in the list.
    pub fn todo_deleted(todo_id: i64, todo_text: Option<&str>, at: DateTime<Utc>) -> Self {
        let params = EventParams::new()
            .with(param_keys::TODO_ID, todo_id)
            .with(param_keys::TODO_TEXT, todo_text);
        Self::stamped(EventName::TodoDeleted, params, at)
    }

    /// `completed` is the state after the toggle.
    pub fn todo_toggled(todo_id: i64, completed: bool, at: DateTime<Utc>) -> Self {
        let params = EventParams::new()
            .with(param_keys::TODO_ID, todo_id)
            .with(param_keys::COMPLETED, completed);
        Self::stamped(EventName::TodoToggled, params, at)
    }

    pub fn scroll_load_more(
        current_items: usize,
        load_count: u32,
        scroll_percentage: u32,
        at: DateTime<Utc>,
    ) -> Self {
        let params = EventParams::new()
            .with(param_keys::CURRENT_ITEMS, current_items)
            .with(param_keys::LOAD_COUNT, load_count)
            .with(param_keys::SCROLL_PERCENTAGE, scroll_percentage);
        Self::stamped(EventName::ScrollLoadMore, params, at)
    }

    pub fn reached_list_end(total_items: usize, at: DateTime<Utc>) -> Self {
        let params = EventParams::new().with(param_keys::TOTAL_ITEMS, total_items);
        Self::stamped(EventName::ReachedListEnd, params, at)
    }

    pub fn scroll_depth(depth_percentage: u32, current_items: usize, at: DateTime<Utc>) -> Self {
        let params = EventParams::new()
            .with(param_keys::DEPTH_PERCENTAGE, depth_percentage)
            .with(param_keys::CURRENT_ITEMS, current_items);
        Self::stamped(EventName::ScrollDepth, params, at)
    }

    /// First exposure of a user to an experiment variant.
    pub fn ab_test_exposed(experiment_name: &str, variant: &str, at: DateTime<Utc>) -> Self {
        let params = EventParams::new()
            .with(param_keys::EXPERIMENT_NAME, experiment_name)
            .with(param_keys::VARIANT, variant);
        Self::stamped(EventName::AbTestExposed, params, at)
    }

    /// Checks the event against analytics backend limits.
    ///
    /// Returns every problem found; an empty list means the event is clean.
    pub fn validate(&self) -> Vec<EventError> {
        let mut issues = Vec::new();

        let name = self.name.as_str();
        let name_ok = name.len() <= MAX_EVENT_NAME_LEN
            && name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !name_ok {
            issues.push(EventError::InvalidName(name.to_string()));
        }

        let count = self.params.defined_len();
        if count > MAX_PARAMS {
            issues.push(EventError::TooManyParams {
                count,
                max: MAX_PARAMS,
            });
        }

        for (key, value) in self.params.iter() {
            if key.is_empty() || key.len() > MAX_PARAM_NAME_LEN {
                issues.push(EventError::InvalidParamName(key.to_string()));
            }
            if let ParamValue::String(s) = value {
                let len = s.chars().count();
                if len > MAX_PARAM_VALUE_LEN {
                    issues.push(EventError::ValueTooLong {
                        name: key.to_string(),
                        len,
                        max: MAX_PARAM_VALUE_LEN,
                    });
                }
            }
        }

        issues
    }

    /// JSON form of the parameters, as logged and sent.
    pub fn params_json(&self) -> Result<String, EventError> {
        Ok(serde_json::to_string(&self.params)?)
    }
}
