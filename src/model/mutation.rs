use super::priority::Priority;

/// A single field change within an update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    /// Free-form due string, interpreted by the remote ("tomorrow", "fri 5pm")
    Due(String),
    Content(String),
    Labels(Vec<i64>),
    Priority(Priority),
}

/// A locally staged change, not durable until the remote accepts the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Add {
        content: String,
        project_id: Option<i64>,
        due: Option<String>,
        label_ids: Option<Vec<i64>>,
        priority: Option<Priority>,
    },
    Update {
        id: i64,
        change: FieldChange,
    },
    Close {
        id: i64,
    },
    Delete {
        id: i64,
    },
}
