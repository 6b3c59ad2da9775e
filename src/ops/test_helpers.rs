use chrono::{DateTime, TimeZone, Utc};

use crate::io::remote::{RemoteError, RemoteStore};
use crate::model::mutation::Mutation;
use crate::model::project::{Label, Project, Snapshot};
use crate::model::task::{Flag, Note, Task};
use crate::ops::replica::Replica;

pub const TODAY_EOD: &str = "Wed 14 May 2025 23:59:59 +0000";
pub const TOMORROW_0930: &str = "Thu 15 May 2025 09:30:00 +0000";
pub const FRIDAY_EOD: &str = "Fri 16 May 2025 23:59:59 +0000";

/// Wednesday 2025-05-14, 10:00 UTC
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 14, 10, 0, 0).unwrap()
}

pub fn project(id: i64, name: &str) -> Project {
    Project {
        id: Some(id),
        name: Some(name.to_string()),
    }
}

pub fn label(id: i64, name: &str) -> Label {
    Label {
        id: Some(id),
        name: Some(name.to_string()),
    }
}

/// An open task with no labels; `priority` is on the remote scale
pub fn task(id: i64, content: &str, project_id: i64, due: Option<&str>, priority: i64) -> Task {
    Task {
        id: Some(id),
        content: Some(content.to_string()),
        project_id: Some(project_id),
        due_date_utc: due.map(str::to_string),
        priority: Some(priority),
        label_ids: Some(Vec::new()),
        checked: Some(Flag::Int(0)),
        is_deleted: Some(Flag::Int(0)),
    }
}

/// Two projects, two labels, three open tasks and one note:
///
/// - `2a` "Buy milk" in Inbox, due today, most urgent
/// - `2b` "Call bank" in Work, due tomorrow 9:30, labels phone+errand, has a note
/// - `2c` "Read book" in Inbox, no due date
pub fn sample_snapshot() -> Snapshot {
    let mut call = task(0x2b, "Call bank", 2, Some(TOMORROW_0930), 1);
    call.label_ids = Some(vec![11, 10]);
    Snapshot {
        projects: vec![project(1, "Inbox"), project(2, "Work")],
        labels: vec![label(10, "errand"), label(11, "phone")],
        items: vec![
            task(0x2a, "Buy milk", 1, Some(TODAY_EOD), 4),
            call,
            task(0x2c, "Read book", 1, None, 2),
        ],
        notes: vec![Note {
            id: Some(500),
            item_id: Some(0x2b),
            content: Some("Ask about the invoice".into()),
            posted: Some("Tue 13 May 2025 09:00:00 +0000".into()),
            is_deleted: Some(Flag::Int(0)),
        }],
    }
}

pub fn sample_replica() -> Replica {
    Replica::from(sample_snapshot())
}

/// In-memory remote store that records every pushed batch
#[derive(Debug, Default)]
pub struct FakeStore {
    pub snapshot: Snapshot,
    pub pulls: usize,
    pub pushed: Vec<Vec<Mutation>>,
    pub offline: bool,
}

impl FakeStore {
    pub fn new(snapshot: Snapshot) -> Self {
        FakeStore {
            snapshot,
            ..Default::default()
        }
    }
}

impl RemoteStore for FakeStore {
    fn pull(&mut self) -> Result<Snapshot, RemoteError> {
        if self.offline {
            return Err(RemoteError::Connectivity("network unreachable".into()));
        }
        self.pulls += 1;
        Ok(self.snapshot.clone())
    }

    fn push(&mut self, batch: &[Mutation]) -> Result<(), RemoteError> {
        if self.offline {
            return Err(RemoteError::Connectivity("network unreachable".into()));
        }
        self.pushed.push(batch.to_vec());
        Ok(())
    }
}
