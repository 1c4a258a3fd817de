//! Tasks slice state.
//!
//! Shape only: no task actions or reducer cases exist yet, so the slice
//! stays at its initial value for the life of the store.

#[cfg(test)]
#[path = "tasks_test.rs"]
mod tests;

use std::collections::HashMap;

use crate::models::{Task, TaskFilters};

/// Normalized task collection: `ids` keeps insertion order, `entities` holds
/// the records keyed by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TasksState {
    pub ids: Vec<String>,
    pub entities: HashMap<String, Task>,
    pub selected_task_id: Option<String>,
    pub filters: TaskFilters,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl TasksState {
    /// Tasks in `ids` order. Ids without an entity are skipped.
    pub fn all(&self) -> impl Iterator<Item = &Task> {
        self.ids.iter().filter_map(|id| self.entities.get(id))
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Task> {
        self.selected_task_id.as_ref().and_then(|id| self.entities.get(id))
    }
}
