//! Pipeline Snapshots
//!
//! A [`Snapshot`] is one complete, self-contained description of the five
//! monitored collections at a point in time. Snapshots are decoded fresh
//! from every inbound message, rendered, and dropped; they are never merged
//! with an earlier snapshot.
//!
//! ## Wire format
//!
//! ```json
//! {
//!   "stages": [{"name": "ingest", "status": "running"}],
//!   "workers": [{"name": "w-1", "status": "idle"}],
//!   "eventQueues": [{"name": "q1", "length": 5}],
//!   "performanceMetrics": [{"name": "latency_ms", "value": 12.5}],
//!   "notifications": [{"message": "ok"}]
//! }
//! ```
//!
//! Any field may be omitted or `null`; both mean an empty collection.

mod error;
mod types;

pub use error::PayloadError;
pub use types::{Metric, Notification, Queue, Stage, Worker};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One complete pipeline-state payload
///
/// Sequence order is display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub stages: Vec<Stage>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub workers: Vec<Worker>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub event_queues: Vec<Queue>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub performance_metrics: Vec<Metric>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub notifications: Vec<Notification>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Snapshot {
    /// Decode a snapshot from a message body
    pub fn from_json(text: &str) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_str(text).map_err(PayloadError::InvalidJson)?;
        Self::from_value(value)
    }

    /// Decode a snapshot from an already parsed JSON value
    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        if !value.is_object() {
            return Err(PayloadError::NotAnObject(json_type_name(&value)));
        }

        serde_json::from_value(value).map_err(PayloadError::InvalidShape)
    }

    /// True when every collection is empty
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
            && self.workers.is_empty()
            && self.event_queues.is_empty()
            && self.performance_metrics.is_empty()
            && self.notifications.is_empty()
    }

    /// Collection sizes in display order, for log fields
    pub fn sizes(&self) -> [usize; 5] {
        [
            self.stages.len(),
            self.workers.len(),
            self.event_queues.len(),
            self.performance_metrics.len(),
            self.notifications.len(),
        ]
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
