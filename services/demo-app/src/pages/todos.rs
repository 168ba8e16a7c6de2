//! Todo list page with the add-button color experiment.

use std::sync::Arc;

use beacon_sdk::{ConfigResolver, ExperimentExposure, Tracker};
use chrono::Utc;
use tracing::debug;

/// Remote config key selecting the add button color.
pub const BUTTON_COLOR_EXPERIMENT: &str = "todo_add_button_color";

/// Button color shown before (or without) a remote value.
pub const DEFAULT_BUTTON_COLOR: &str = "red";

const SEED_TODOS: [&str; 4] = ["Get some sleep", "Study", "Exercise", "Work"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: i64,
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

/// Millisecond-clock ids that never repeat within a page, even when two
/// todos are added in the same millisecond.
#[derive(Debug, Clone, Default)]
struct IdClock {
    last: i64,
}

impl IdClock {
    fn seeded(last: i64) -> Self {
        Self { last }
    }

    fn next(&mut self, now_millis: i64) -> i64 {
        self.last = now_millis.max(self.last + 1);
        self.last
    }
}

pub struct TodoPage {
    todos: Vec<Todo>,
    ids: IdClock,
    button_color: ExperimentExposure,
    tracker: Arc<Tracker>,
    resolver: Arc<ConfigResolver>,
}

impl TodoPage {
    /// A fresh page load with the seeded todos.
    pub fn new(tracker: Arc<Tracker>, resolver: Arc<ConfigResolver>) -> Self {
        let todos: Vec<Todo> = SEED_TODOS
            .iter()
            .zip(1..)
            .map(|(text, id)| Todo {
                id,
                text: (*text).to_string(),
                completed: false,
            })
            .collect();

        Self {
            ids: IdClock::seeded(todos.len() as i64),
            todos,
            button_color: ExperimentExposure::new(BUTTON_COLOR_EXPERIMENT, DEFAULT_BUTTON_COLOR),
            tracker,
            resolver,
        }
    }

    /// Renders the page against the resolver's current state.
    ///
    /// Call on mount and again whenever the resolver becomes ready. The
    /// experiment exposure is recorded on the first render after readiness.
    pub fn render(&mut self) -> &str {
        self.button_color.observe(&self.resolver, &self.tracker);
        self.button_color.current()
    }

    /// Add button color currently shown.
    pub fn add_button_color(&self) -> &str {
        self.button_color.current()
    }

    /// Adds a todo unless `text` is blank. Returns the new id.
    pub fn add(&mut self, text: &str) -> Option<i64> {
        if text.trim().is_empty() {
            return None;
        }

        let id = self.ids.next(Utc::now().timestamp_millis());
        self.todos.push(Todo {
            id,
            text: text.to_string(),
            completed: false,
        });
        self.tracker.track_todo_added(id, text);
        Some(id)
    }

    /// Removes the todo with `id`. The event is recorded even when the id
    /// is unknown, without text.
    pub fn delete(&mut self, id: i64) -> bool {
        let removed = self
            .todos
            .iter()
            .position(|todo| todo.id == id)
            .map(|index| self.todos.remove(index));

        if removed.is_none() {
            debug!(todo_id = id, "Delete for unknown todo");
        }
        self.tracker
            .track_todo_deleted(id, removed.as_ref().map(|todo| todo.text.as_str()));
        removed.is_some()
    }

    /// Flips completion of `id`, returning the new state.
    pub fn toggle(&mut self, id: i64) -> Option<bool> {
        let todo = self.todos.iter_mut().find(|todo| todo.id == id)?;
        todo.completed = !todo.completed;
        let completed = todo.completed;
        self.tracker.track_todo_toggled(id, completed);
        Some(completed)
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn stats(&self) -> TodoStats {
        let completed = self.todos.iter().filter(|todo| todo.completed).count();
        TodoStats {
            total: self.todos.len(),
            completed,
            pending: self.todos.len() - completed,
        }
    }
}
