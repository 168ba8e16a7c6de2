//! Event name definitions.
//!
//! Known names form a closed set; anything else travels as
//! [`EventName::Custom`] so callers can extend the vocabulary without a release.

use serde::{Deserialize, Serialize};

// =============================================================================
// Event Type Constants
// =============================================================================

/// All known event names as constants.
pub mod event_types {
    // Todo list
    pub const TODO_ADDED: &str = "todo_added";
    pub const TODO_DELETED: &str = "todo_deleted";
    pub const TODO_TOGGLED: &str = "todo_toggled";

    // Event page
    pub const PAGE_VIEW: &str = "page_view";
    pub const PAGE_EXIT: &str = "page_exit";
    pub const BUTTON_CLICK: &str = "button_click";

    // Infinite list
    pub const SCROLL_LOAD_MORE: &str = "scroll_load_more";
    pub const REACHED_LIST_END: &str = "reached_list_end";
    pub const SCROLL_DEPTH: &str = "scroll_depth";

    // Experiments
    pub const AB_TEST_EXPOSED: &str = "ab_test_exposed";
}

/// Parameter keys used by the canonical event shapes.
pub mod param_keys {
    // Common
    pub const PAGE_TITLE: &str = "page_title";
    pub const PAGE_LOCATION: &str = "page_location";
    pub const PAGE_PATH: &str = "page_path";
    pub const TIMESTAMP: &str = "timestamp";

    // Todo list (camelCase is what the dashboards were built against)
    pub const TODO_ID: &str = "todoId";
    pub const TODO_TEXT: &str = "todoText";
    pub const COMPLETED: &str = "completed";

    // Button clicks
    pub const BUTTON_NAME: &str = "button_name";
    pub const PAGE: &str = "page";
    pub const TOTAL_CLICKS: &str = "total_clicks";

    // Scrolling
    pub const CURRENT_ITEMS: &str = "current_items";
    pub const LOAD_COUNT: &str = "load_count";
    pub const SCROLL_PERCENTAGE: &str = "scroll_percentage";
    pub const TOTAL_ITEMS: &str = "total_items";
    pub const DEPTH_PERCENTAGE: &str = "depth_percentage";

    // Dwell time
    pub const DURATION_SECONDS: &str = "duration_seconds";

    // Experiments
    pub const EXPERIMENT_NAME: &str = "experiment_name";
    pub const VARIANT: &str = "variant";
}

/// Name of an analytics event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventName {
    TodoAdded,
    TodoDeleted,
    TodoToggled,
    PageView,
    PageExit,
    ButtonClick,
    ScrollLoadMore,
    ReachedListEnd,
    ScrollDepth,
    AbTestExposed,
    /// Any name outside the known set.
    Custom(String),
}

impl EventName {
    /// Every known (non-custom) event name.
    pub const KNOWN: [EventName; 10] = [
        EventName::TodoAdded,
        EventName::TodoDeleted,
        EventName::TodoToggled,
        EventName::PageView,
        EventName::PageExit,
        EventName::ButtonClick,
        EventName::ScrollLoadMore,
        EventName::ReachedListEnd,
        EventName::ScrollDepth,
        EventName::AbTestExposed,
    ];

    /// Wire representation of the name.
    pub fn as_str(&self) -> &str {
        match self {
            EventName::TodoAdded => event_types::TODO_ADDED,
            EventName::TodoDeleted => event_types::TODO_DELETED,
            EventName::TodoToggled => event_types::TODO_TOGGLED,
            EventName::PageView => event_types::PAGE_VIEW,
            EventName::PageExit => event_types::PAGE_EXIT,
            EventName::ButtonClick => event_types::BUTTON_CLICK,
            EventName::ScrollLoadMore => event_types::SCROLL_LOAD_MORE,
            EventName::ReachedListEnd => event_types::REACHED_LIST_END,
            EventName::ScrollDepth => event_types::SCROLL_DEPTH,
            EventName::AbTestExposed => event_types::AB_TEST_EXPOSED,
            EventName::Custom(name) => name,
        }
    }

    /// Returns true if this name is outside the known set.
    pub fn is_custom(&self) -> bool {
        matches!(self, EventName::Custom(_))
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EventName {
    fn from(s: &str) -> Self {
        match s {
            event_types::TODO_ADDED => EventName::TodoAdded,
            event_types::TODO_DELETED => EventName::TodoDeleted,
            event_types::TODO_TOGGLED => EventName::TodoToggled,
            event_types::PAGE_VIEW => EventName::PageView,
            event_types::PAGE_EXIT => EventName::PageExit,
            event_types::BUTTON_CLICK => EventName::ButtonClick,
            event_types::SCROLL_LOAD_MORE => EventName::ScrollLoadMore,
            event_types::REACHED_LIST_END => EventName::ReachedListEnd,
            event_types::SCROLL_DEPTH => EventName::ScrollDepth,
            event_types::AB_TEST_EXPOSED => EventName::AbTestExposed,
            other => EventName::Custom(other.to_string()),
        }
    }
}

impl From<String> for EventName {
    fn from(s: String) -> Self {
        match EventName::from(s.as_str()) {
            EventName::Custom(_) => EventName::Custom(s),
            known => known,
        }
    }
}

impl From<EventName> for String {
    fn from(name: EventName) -> Self {
        match name {
            EventName::Custom(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::str::FromStr for EventName {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(EventName::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names_roundtrip_through_strings() {
        for name in EventName::KNOWN {
            assert_eq!(EventName::from(name.as_str()), name);
            assert!(!name.is_custom());
        }
    }

    #[test]
    fn test_unknown_name_is_custom() {
        let name: EventName = "signup_started".parse().unwrap();
        assert_eq!(name, EventName::Custom("signup_started".to_string()));
        assert_eq!(name.to_string(), "signup_started");
    }

    #[test]
    fn test_event_name_serialization() {
        assert_eq!(
            serde_json::to_string(&EventName::TodoAdded).unwrap(),
            "\"todo_added\""
        );
        let parsed: EventName = serde_json::from_str("\"ab_test_exposed\"").unwrap();
        assert_eq!(parsed, EventName::AbTestExposed);
    }
}
