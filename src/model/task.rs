use serde::{Deserialize, Serialize};

/// A remote on/off flag. Older sync replies send `0`/`1`, newer ones booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    /// True for `1` or `true`; every other value counts as unset.
    pub fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Int(n) => n == 1,
        }
    }
}

/// A task ("item") as the remote reports it.
///
/// Every field is optional: the replica keeps whatever the remote sent and
/// the consumers decide which fields they need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    pub id: Option<i64>,
    pub content: Option<String>,
    pub project_id: Option<i64>,
    /// `Fri 16 May 2025 23:59:59 +0000`; a date-only due is stored at 23:59:59
    pub due_date_utc: Option<String>,
    /// Remote scale: 4 is the most urgent
    pub priority: Option<i64>,
    #[serde(rename = "labels")]
    pub label_ids: Option<Vec<i64>>,
    pub checked: Option<Flag>,
    pub is_deleted: Option<Flag>,
}

impl Task {
    pub fn is_checked(&self) -> bool {
        self.checked.is_some_and(Flag::is_set)
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted.is_some_and(Flag::is_set)
    }

    /// Checked and deleted tasks never appear in any view.
    pub fn is_excluded(&self) -> bool {
        self.is_deleted() || self.is_checked()
    }
}

/// A comment attached to a task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Note {
    pub id: Option<i64>,
    /// The task this note belongs to
    pub item_id: Option<i64>,
    pub content: Option<String>,
    pub posted: Option<String>,
    pub is_deleted: Option<Flag>,
}

impl Note {
    pub fn is_deleted(&self) -> bool {
        self.is_deleted.is_some_and(Flag::is_set)
    }
}
