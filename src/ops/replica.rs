use std::fmt::Debug;
use std::hash::Hash;

use indexmap::IndexMap;
use log::warn;

use crate::model::project::{Label, Project, Snapshot};
use crate::model::task::{Note, Task};

/// In-memory copy of the remote entity set from the last pull.
///
/// The replica is only ever replaced wholesale; every index below is derived
/// on each call and reflects the replica at that moment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Replica {
    pub projects: Vec<Project>,
    pub labels: Vec<Label>,
    pub items: Vec<Task>,
    pub notes: Vec<Note>,
}

impl From<Snapshot> for Replica {
    fn from(snapshot: Snapshot) -> Self {
        Replica {
            projects: snapshot.projects,
            labels: snapshot.labels,
            items: snapshot.items,
            notes: snapshot.notes,
        }
    }
}

/// Build a key → value map, skipping records that lack either field.
/// Later duplicates replace earlier ones.
fn lookup_table<T, K, V>(
    records: &[T],
    table: &str,
    key: impl Fn(&T) -> Option<K>,
    value: impl Fn(&T) -> Option<V>,
) -> IndexMap<K, V>
where
    K: Hash + Eq + Debug,
{
    let mut output = IndexMap::new();
    for record in records {
        let (Some(k), Some(v)) = (key(record), value(record)) else {
            continue;
        };
        if output.contains_key(&k) {
            warn!("duplicate key {:?} in {}; keeping the later entry", k, table);
        }
        output.insert(k, v);
    }
    output
}

impl Replica {
    /// Project name → id
    pub fn project_names(&self) -> IndexMap<String, i64> {
        lookup_table(&self.projects, "projects", |p| p.name.clone(), |p| p.id)
    }

    /// Project id → name
    pub fn project_ids(&self) -> IndexMap<i64, String> {
        lookup_table(&self.projects, "projects", |p| p.id, |p| p.name.clone())
    }

    /// Label name → id
    pub fn label_names(&self) -> IndexMap<String, i64> {
        lookup_table(&self.labels, "labels", |l| l.name.clone(), |l| l.id)
    }

    /// Label id → name
    pub fn label_ids(&self) -> IndexMap<i64, String> {
        lookup_table(&self.labels, "labels", |l| l.id, |l| l.name.clone())
    }

    /// Task id → content
    pub fn task_ids(&self) -> IndexMap<i64, String> {
        lookup_table(&self.items, "items", |t| t.id, |t| t.content.clone())
    }

    /// Task id → id of a note on it
    pub fn note_ids(&self) -> IndexMap<i64, i64> {
        lookup_table(&self.notes, "notes", |n| n.item_id, |n| n.id)
    }

    /// Notes attached to a task, in replica order
    pub fn notes(&self, task_id: i64) -> Vec<&Note> {
        self.notes
            .iter()
            .filter(|n| n.item_id == Some(task_id) && !n.is_deleted())
            .collect()
    }

    /// Lowercase hex ids (no prefix) of tasks whose checked flag is not set
    pub fn incomplete_task_ids(&self) -> Vec<String> {
        lookup_table(&self.items, "items", |t| t.id, |t| t.checked)
            .into_iter()
            .filter(|(_, checked)| !checked.is_set())
            .map(|(id, _)| format!("{:x}", id))
            .collect()
    }
}
