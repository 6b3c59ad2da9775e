use log::{debug, error};

use crate::io::remote::{RemoteError, RemoteStore};
use crate::model::mutation::Mutation;
use crate::ops::replica::Replica;

/// Mutations staged locally, waiting for one commit.
///
/// Committing consumes the batch: a failed commit leaves nothing to replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    mutations: Vec<Mutation>,
}

impl Batch {
    pub fn new() -> Self {
        Batch::default()
    }

    pub fn stage(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

/// A remote store together with the replica pulled from it.
///
/// The replica only changes through [`Session::sync`]; a commit leaves it
/// stale until the next sync.
pub struct Session<S: RemoteStore> {
    store: S,
    replica: Replica,
}

impl<S: RemoteStore> Session<S> {
    /// Pull a first replica. Without one no command can run.
    pub fn open(store: S) -> Result<Self, RemoteError> {
        let mut session = Session {
            store,
            replica: Replica::default(),
        };
        session.sync()?;
        Ok(session)
    }

    pub fn replica(&self) -> &Replica {
        &self.replica
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Replace the replica with a fresh pull. On failure the old replica is
    /// kept untouched.
    pub fn sync(&mut self) -> Result<(), RemoteError> {
        let snapshot = self.store.pull().inspect_err(|e| error!("sync failed: {}", e))?;
        debug!(
            "pulled {} projects, {} labels, {} items, {} notes",
            snapshot.projects.len(),
            snapshot.labels.len(),
            snapshot.items.len(),
            snapshot.notes.len()
        );
        self.replica = Replica::from(snapshot);
        Ok(())
    }

    /// Push a staged batch. An empty batch is still pushed. There is no retry.
    pub fn commit(&mut self, batch: Batch) -> Result<(), RemoteError> {
        debug!("committing {} staged mutations", batch.len());
        self.store
            .push(batch.mutations())
            .inspect_err(|e| error!("commit failed, nothing was saved: {}", e))
    }
}
