use std::collections::HashSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use log::warn;

use crate::model::priority::Priority;
use crate::model::task::Task;
use crate::model::view::{ProjectTable, View, ViewItem};
use crate::ops::classify::{self, DateFilter, Decision};
use crate::ops::replica::Replica;

/// Why a task record could not be turned into a row
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedRecord {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("unparseable due date '{0}'")]
    BadDue(String),
    #[error("remote priority {0} outside 1..4")]
    BadPriority(i64),
    #[error("unknown label id {0}")]
    UnknownLabel(i64),
    #[error("unknown project id {0}")]
    UnknownProject(i64),
}

/// Result of validating one task for a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated {
    /// Row for the given project
    Valid(i64, ViewItem),
    /// Excluded by state or date filter
    Hidden,
    Invalid(Option<i64>, MalformedRecord),
}

/// Indexes a render needs, built once per render
struct Lookups {
    project_ids: IndexMap<i64, String>,
    label_ids: IndexMap<i64, String>,
    noted: HashSet<i64>,
}

impl Lookups {
    fn new(replica: &Replica) -> Self {
        Lookups {
            project_ids: replica.project_ids(),
            label_ids: replica.label_ids(),
            noted: replica
                .notes
                .iter()
                .filter(|n| !n.is_deleted())
                .filter_map(|n| n.item_id)
                .collect(),
        }
    }
}

/// Options that change how a view is assembled
#[derive(Debug, Clone)]
pub struct ViewOptions<'a> {
    pub project: Option<&'a str>,
    pub date: Option<DateFilter>,
    pub note_marker: &'a str,
}

fn validate(
    task: &Task,
    lookups: &Lookups,
    now: DateTime<Utc>,
    options: &ViewOptions<'_>,
) -> Validated {
    if task.is_excluded() {
        return Validated::Hidden;
    }
    let Some(id) = task.id else {
        return Validated::Invalid(None, MalformedRecord::MissingField("id"));
    };
    match build_item(id, task, lookups, now, options) {
        Ok(Some((project_id, item))) => Validated::Valid(project_id, item),
        Ok(None) => Validated::Hidden,
        Err(reason) => Validated::Invalid(Some(id), reason),
    }
}

fn build_item(
    id: i64,
    task: &Task,
    lookups: &Lookups,
    now: DateTime<Utc>,
    options: &ViewOptions<'_>,
) -> Result<Option<(i64, ViewItem)>, MalformedRecord> {
    let due = match &task.due_date_utc {
        Some(raw) => {
            Some(classify::parse_due(raw).map_err(|_| MalformedRecord::BadDue(raw.clone()))?)
        }
        None => None,
    };
    let (due_label, sys_date) = match classify::classify(due, now, options.date) {
        Decision::Skip => return Ok(None),
        Decision::Keep { label, sort_date } => (label, sort_date),
    };

    let content = task
        .content
        .as_deref()
        .ok_or(MalformedRecord::MissingField("content"))?;
    let project_id = task
        .project_id
        .ok_or(MalformedRecord::MissingField("project_id"))?;
    let remote = task
        .priority
        .ok_or(MalformedRecord::MissingField("priority"))?;
    let priority = Priority::from_remote(remote).map_err(|_| MalformedRecord::BadPriority(remote))?;

    let labels = task
        .label_ids
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|label_id| {
            lookups
                .label_ids
                .get(label_id)
                .map(String::as_str)
                .ok_or(MalformedRecord::UnknownLabel(*label_id))
        })
        .collect::<Result<Vec<_>, _>>()?
        .join(",");

    if !lookups.project_ids.contains_key(&project_id) {
        return Err(MalformedRecord::UnknownProject(project_id));
    }

    let content = if lookups.noted.contains(&id) {
        format!("{}{}", content, options.note_marker)
    } else {
        content.to_string()
    };

    Ok(Some((
        project_id,
        ViewItem {
            id,
            due_label,
            content,
            sys_date,
            priority,
            labels,
        },
    )))
}

/// Group visible tasks into one sorted table per project.
///
/// Projects keep replica order. Projects other than `options.project` are
/// dropped entirely, as are projects left with no rows. A malformed task is
/// logged and left out without affecting any other row.
pub fn build_view(replica: &Replica, now: DateTime<Utc>, options: &ViewOptions<'_>) -> View {
    let lookups = Lookups::new(replica);
    let mut buckets: IndexMap<i64, Vec<ViewItem>> = lookups
        .project_ids
        .keys()
        .map(|id| (*id, Vec::new()))
        .collect();

    for task in &replica.items {
        match validate(task, &lookups, now, options) {
            Validated::Valid(project_id, item) => {
                if let Some(bucket) = buckets.get_mut(&project_id) {
                    bucket.push(item);
                }
            }
            Validated::Hidden => {}
            Validated::Invalid(id, reason) => match id {
                Some(id) => warn!("skipping task {:x}: {} ({:?})", id, reason, task),
                None => warn!("skipping task record: {} ({:?})", reason, task),
            },
        }
    }

    let tables = buckets
        .into_iter()
        .filter_map(|(project_id, mut items)| {
            let name = lookups.project_ids.get(&project_id)?;
            if let Some(wanted) = options.project
                && wanted != name.as_str()
            {
                return None;
            }
            if items.is_empty() {
                return None;
            }
            items.sort_by_key(|item| (item.sys_date, item.priority));
            Some(ProjectTable {
                project_id,
                name: name.clone(),
                items,
            })
        })
        .collect();

    View { tables }
}
