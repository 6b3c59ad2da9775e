use serde::{Deserialize, Serialize};

use super::task::{Note, Task};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Label {
    pub id: Option<i64>,
    pub name: Option<String>,
}

/// The full entity set returned by one pull
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub labels: Vec<Label>,
    pub items: Vec<Task>,
    pub notes: Vec<Note>,
}
