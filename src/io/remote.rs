use crate::model::mutation::Mutation;
use crate::model::project::Snapshot;

/// Error type for remote store round trips
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("connection error: {0}")]
    Connectivity(String),
    #[error("remote returned HTTP {code}: {body}")]
    Status { code: u16, body: String },
    #[error("could not decode sync reply: {0}")]
    Decode(String),
    #[error("remote rejected {command}: {reason}")]
    Rejected { command: String, reason: String },
    #[error("no API token: set TODOIST_TOKEN or [api] token in the config file")]
    MissingToken,
}

/// The source of truth for all entities.
///
/// Both calls block for one network round trip. `push` is all-or-nothing
/// from the caller's point of view.
pub trait RemoteStore {
    fn pull(&mut self) -> Result<Snapshot, RemoteError>;
    fn push(&mut self, batch: &[Mutation]) -> Result<(), RemoteError>;
}
