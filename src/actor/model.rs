use std::{fmt, sync::Arc};

use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::api::model::ApiResponse;
use crate::colony::{Intent, Snapshot};

#[derive(Clone, Debug)]
pub struct IntentRequest {
    pub owner: Uuid,
    pub request_id: String,
    pub intent: Intent,
    pub respond_to: mpsc::Sender<ResponseSignal>,
}

#[derive(Clone, Debug)]
pub enum InternalMessage {
    Intent(IntentRequest),
    Snapshot(Arc<Snapshot>),
    Stop,
}

/// Frames written back to one websocket client.
#[derive(Clone, Debug)]
pub enum ResponseSignal {
    Reply(ApiResponse),
    Snapshot(Arc<Snapshot>),
    Stop,
}

#[derive(Serialize)]
struct SnapshotFrame<'a> {
    snapshot: &'a Snapshot,
}

impl fmt::Display for ResponseSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ResponseSignal::Reply(response) => serde_json::to_string(response),
            ResponseSignal::Snapshot(snapshot) => serde_json::to_string(&SnapshotFrame { snapshot }),
            ResponseSignal::Stop => return f.write_str("stop"),
        };
        f.write_str(&text.map_err(|_| fmt::Error)?)
    }
}
