use std::time::Duration;

use indexmap::IndexMap;
use log::warn;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::io::remote::{RemoteError, RemoteStore};
use crate::model::config::ApiConfig;
use crate::model::mutation::{FieldChange, Mutation};
use crate::model::project::Snapshot;

const RESOURCE_TYPES: &str = r#"["projects","labels","items","notes"]"#;

/// Remote store backed by the HTTPS sync endpoint.
///
/// Every pull is a full sync (`sync_token=*`); the replica is never patched
/// incrementally.
pub struct SyncClient {
    agent: ureq::Agent,
    endpoint: String,
    token: Option<String>,
}

/// Pull reply with each collection still as raw JSON records
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PullReply {
    projects: Option<Vec<Value>>,
    labels: Option<Vec<Value>>,
    items: Option<Vec<Value>>,
    notes: Option<Vec<Value>>,
}

impl PullReply {
    fn into_snapshot(self) -> Snapshot {
        Snapshot {
            projects: decode_records("projects", self.projects),
            labels: decode_records("labels", self.labels),
            items: decode_records("items", self.items),
            notes: decode_records("notes", self.notes),
        }
    }
}

/// Decode each record on its own; records that do not fit are logged and dropped.
fn decode_records<T: DeserializeOwned>(kind: &str, raw: Option<Vec<Value>>) -> Vec<T> {
    raw.unwrap_or_default()
        .into_iter()
        .filter_map(|value| {
            let id = value.get("id").cloned().unwrap_or(Value::Null);
            serde_json::from_value(value)
                .inspect_err(|e| warn!("dropping malformed {} record {}: {}", kind, id, e))
                .ok()
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct PushReply {
    #[serde(default)]
    sync_status: IndexMap<String, Value>,
}

impl SyncClient {
    pub fn new(api: &ApiConfig, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(api.timeout_secs))
            .user_agent(concat!("tdl/", env!("CARGO_PKG_VERSION")))
            .build();
        SyncClient {
            agent,
            endpoint: api.endpoint.clone(),
            token,
        }
    }

    fn token(&self) -> Result<&str, RemoteError> {
        self.token.as_deref().ok_or(RemoteError::MissingToken)
    }

    fn post(&self, form: &[(&str, &str)]) -> Result<ureq::Response, RemoteError> {
        match self.agent.post(&self.endpoint).send_form(form) {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(code, response)) => Err(RemoteError::Status {
                code,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(transport)) => {
                Err(RemoteError::Connectivity(transport.to_string()))
            }
        }
    }
}

impl RemoteStore for SyncClient {
    fn pull(&mut self) -> Result<Snapshot, RemoteError> {
        let token = self.token()?;
        let response = self.post(&[
            ("token", token),
            ("sync_token", "*"),
            ("resource_types", RESOURCE_TYPES),
        ])?;
        let reply: PullReply = response
            .into_json()
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(reply.into_snapshot())
    }

    fn push(&mut self, batch: &[Mutation]) -> Result<(), RemoteError> {
        let token = self.token()?;
        let commands: Vec<(String, &'static str, Value)> =
            batch.iter().map(encode_command).collect();
        let payload = Value::Array(commands.iter().map(|(_, _, c)| c.clone()).collect());
        let payload = payload.to_string();
        let response = self.post(&[("token", token), ("commands", payload.as_str())])?;
        let reply: PushReply = response
            .into_json()
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        check_sync_status(&commands, &reply.sync_status)
    }
}

/// Wrap a mutation in a command envelope with a fresh uuid.
/// Returns `(uuid, command type, command)`.
fn encode_command(mutation: &Mutation) -> (String, &'static str, Value) {
    let uuid = Uuid::new_v4().to_string();
    let (kind, args) = command_args(mutation);
    let mut command = json!({ "type": kind, "uuid": uuid, "args": args });
    if matches!(mutation, Mutation::Add { .. }) {
        command["temp_id"] = Value::String(Uuid::new_v4().to_string());
    }
    (uuid, kind, command)
}

/// The command type and `args` object for one mutation
pub fn command_args(mutation: &Mutation) -> (&'static str, Value) {
    match mutation {
        Mutation::Add {
            content,
            project_id,
            due,
            label_ids,
            priority,
        } => {
            let mut args = Map::new();
            args.insert("content".into(), json!(content));
            if let Some(id) = project_id {
                args.insert("project_id".into(), json!(id));
            }
            if let Some(due) = due {
                args.insert("date_string".into(), json!(due));
            }
            if let Some(p) = priority {
                args.insert("priority".into(), json!(p.remote()));
            }
            if let Some(labels) = label_ids {
                args.insert("labels".into(), json!(labels));
            }
            ("item_add", Value::Object(args))
        }
        Mutation::Update { id, change } => {
            let mut args = Map::new();
            args.insert("id".into(), json!(id));
            let (key, value) = match change {
                FieldChange::Due(s) => ("date_string", json!(s)),
                FieldChange::Content(s) => ("content", json!(s)),
                FieldChange::Labels(ids) => ("labels", json!(ids)),
                FieldChange::Priority(p) => ("priority", json!(p.remote())),
            };
            args.insert(key.into(), value);
            ("item_update", Value::Object(args))
        }
        Mutation::Close { id } => ("item_close", json!({ "id": id })),
        Mutation::Delete { id } => ("item_delete", json!({ "ids": [id] })),
    }
}

fn check_sync_status(
    commands: &[(String, &'static str, Value)],
    status: &IndexMap<String, Value>,
) -> Result<(), RemoteError> {
    for (uuid, kind, _) in commands {
        match status.get(uuid) {
            None => {}
            Some(Value::String(s)) if s == "ok" => {}
            Some(other) => {
                let reason = other
                    .get("error")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| other.to_string());
                return Err(RemoteError::Rejected {
                    command: kind.to_string(),
                    reason,
                });
            }
        }
    }
    Ok(())
}
