use chrono::{DateTime, FixedOffset};

use super::priority::Priority;

/// One row of a project table, rebuilt on every render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewItem {
    pub id: i64,
    pub due_label: String,
    /// Task content, with the note marker appended when the task has notes
    pub content: String,
    /// Sort key only; tasks without a due date sort as "now"
    pub sys_date: DateTime<FixedOffset>,
    pub priority: Priority,
    /// Comma-joined label names
    pub labels: String,
}

/// The tasks of one project, sorted for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTable {
    pub project_id: i64,
    pub name: String,
    pub items: Vec<ViewItem>,
}

/// A projected view: one table per project with at least one visible task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    pub tables: Vec<ProjectTable>,
}

impl View {
    /// No visible task in any project
    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(|t| t.items.is_empty())
    }

    pub fn task_count(&self) -> usize {
        self.tables.iter().map(|t| t.items.len()).sum()
    }
}
