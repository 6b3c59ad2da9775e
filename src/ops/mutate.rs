use indexmap::IndexMap;

use crate::io::remote::{RemoteError, RemoteStore};
use crate::model::mutation::{FieldChange, Mutation};
use crate::model::priority::Priority;
use crate::ops::session::{Batch, Session};

/// Error type for add/update/complete/delete
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("unknown project: {0}")]
    UnknownProject(String),
    #[error("unknown label: {0}")]
    UnknownLabel(String),
    #[error("unknown task: {0:x}")]
    UnknownTask(i64),
    #[error("{0}")]
    Commit(#[from] RemoteError),
}

/// Arguments for a new task. Unset or empty fields are left to the remote's
/// defaults.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub content: String,
    pub project: Option<String>,
    pub due: Option<String>,
    pub labels: Option<Vec<String>>,
    pub priority: Option<Priority>,
}

/// Fields to change on existing tasks. Unset or empty fields stay as they are.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub due: Option<String>,
    pub content: Option<String>,
    pub labels: Option<Vec<String>>,
    pub priority: Option<Priority>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn non_empty_list(value: &Option<Vec<String>>) -> Option<&[String]> {
    value.as_deref().filter(|l| !l.is_empty())
}

fn resolve_labels(
    names: &[String],
    index: &IndexMap<String, i64>,
) -> Result<Vec<i64>, MutationError> {
    names
        .iter()
        .map(|name| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| MutationError::UnknownLabel(name.clone()))
        })
        .collect()
}

/// Look up the current content of every task, before anything is staged.
fn resolve_contents(
    ids: &[i64],
    index: &IndexMap<i64, String>,
) -> Result<Vec<(i64, String)>, MutationError> {
    ids.iter()
        .map(|id| {
            index
                .get(id)
                .map(|content| (*id, content.clone()))
                .ok_or(MutationError::UnknownTask(*id))
        })
        .collect()
}

/// Create a task. Returns the confirmation line.
pub fn add<S: RemoteStore>(
    session: &mut Session<S>,
    new_task: NewTask,
) -> Result<Vec<String>, MutationError> {
    let replica = session.replica();
    let project_id = match non_empty(&new_task.project) {
        Some(name) => Some(
            replica
                .project_names()
                .get(name)
                .copied()
                .ok_or_else(|| MutationError::UnknownProject(name.to_string()))?,
        ),
        None => None,
    };
    let label_ids = match non_empty_list(&new_task.labels) {
        Some(names) => Some(resolve_labels(names, &replica.label_names())?),
        None => None,
    };

    let mut batch = Batch::new();
    batch.stage(Mutation::Add {
        content: new_task.content.clone(),
        project_id,
        due: non_empty(&new_task.due).map(str::to_string),
        label_ids,
        priority: new_task.priority,
    });
    session.commit(batch)?;
    Ok(vec![format!("{} added", new_task.content)])
}

/// Close tasks. Returns one confirmation per task.
pub fn complete<S: RemoteStore>(
    session: &mut Session<S>,
    ids: &[i64],
) -> Result<Vec<String>, MutationError> {
    let tasks = resolve_contents(ids, &session.replica().task_ids())?;
    let mut batch = Batch::new();
    for (id, _) in &tasks {
        batch.stage(Mutation::Close { id: *id });
    }
    session.commit(batch)?;
    Ok(tasks
        .iter()
        .map(|(_, content)| format!("Task \"{}\" completed", content))
        .collect())
}

/// Delete tasks. Returns one confirmation per task.
pub fn delete<S: RemoteStore>(
    session: &mut Session<S>,
    ids: &[i64],
) -> Result<Vec<String>, MutationError> {
    let tasks = resolve_contents(ids, &session.replica().task_ids())?;
    let mut batch = Batch::new();
    for (id, _) in &tasks {
        batch.stage(Mutation::Delete { id: *id });
    }
    session.commit(batch)?;
    Ok(tasks
        .iter()
        .map(|(_, content)| format!("Task \"{}\" deleted", content))
        .collect())
}

/// Stage up to four field updates per task, one for each field that is set.
/// The batch is committed even when nothing was staged.
pub fn update<S: RemoteStore>(
    session: &mut Session<S>,
    ids: &[i64],
    changes: TaskChanges,
) -> Result<Vec<String>, MutationError> {
    let replica = session.replica();
    resolve_contents(ids, &replica.task_ids())?;
    let label_ids = match non_empty_list(&changes.labels) {
        Some(names) => Some(resolve_labels(names, &replica.label_names())?),
        None => None,
    };

    let mut batch = Batch::new();
    for &id in ids {
        if let Some(due) = non_empty(&changes.due) {
            batch.stage(Mutation::Update {
                id,
                change: FieldChange::Due(due.to_string()),
            });
        }
        if let Some(content) = non_empty(&changes.content) {
            batch.stage(Mutation::Update {
                id,
                change: FieldChange::Content(content.to_string()),
            });
        }
        if let Some(label_ids) = &label_ids {
            batch.stage(Mutation::Update {
                id,
                change: FieldChange::Labels(label_ids.clone()),
            });
        }
        if let Some(priority) = changes.priority {
            batch.stage(Mutation::Update {
                id,
                change: FieldChange::Priority(priority),
            });
        }
    }
    session.commit(batch)?;
    Ok(ids.iter().map(|id| format!("Task {:x} updated", id)).collect())
}
