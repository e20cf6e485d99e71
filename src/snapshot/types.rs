//! Snapshot entity types
//!
//! The five record types carried by a [`Snapshot`](super::Snapshot). Each
//! `Display` impl produces the exact row text shown on the dashboard.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// A processing stage of the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub status: String,
}

/// A worker and its current status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub name: String,
    pub status: String,
}

/// An event queue and its backlog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queue {
    pub name: String,
    /// Number of pending events (never negative)
    #[serde(deserialize_with = "whole_number")]
    pub length: u64,
}

/// A named performance figure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,
    pub value: f64,
}

/// An operator-facing notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
}

impl Stage {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }
}

impl Worker {
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
        }
    }
}

/// Accepts `5` and `5.0`, rejects fractions and negatives
fn whole_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(u64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(n) => Ok(n),
        Number::Float(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        Number::Float(f) => Err(de::Error::custom(format!(
            "queue length must be a non-negative whole number, got {}",
            f
        ))),
    }
}

impl Queue {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }
}

impl Metric {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl Notification {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stage: {}, Status: {}", self.name, self.status)
    }
}

impl fmt::Display for Worker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Worker: {}, Status: {}", self.name, self.status)
    }
}

impl fmt::Display for Queue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Queue: {}, Length: {}", self.name, self.length)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // f64 Display is shortest round-trip: 5.0 prints as "5"
        write!(f, "Metric: {}, Value: {}", self.name, self.value)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Notification: {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_formats() {
        assert_eq!(
            Stage::new("ingest", "running").to_string(),
            "Stage: ingest, Status: running"
        );
        assert_eq!(
            Worker::new("w-1", "idle").to_string(),
            "Worker: w-1, Status: idle"
        );
        assert_eq!(Queue::new("q1", 5).to_string(), "Queue: q1, Length: 5");
        assert_eq!(
            Notification::new("ok").to_string(),
            "Notification: ok"
        );
    }

    #[test]
    fn test_metric_value_formatting() {
        assert_eq!(
            Metric::new("latency", 5.0).to_string(),
            "Metric: latency, Value: 5"
        );
        assert_eq!(
            Metric::new("ratio", 0.25).to_string(),
            "Metric: ratio, Value: 0.25"
        );
        assert_eq!(
            Metric::new("delta", -1.5).to_string(),
            "Metric: delta, Value: -1.5"
        );
    }

    #[test]
    fn test_empty_fields_still_format() {
        assert_eq!(Stage::new("", "").to_string(), "Stage: , Status: ");
    }

    #[test]
    fn test_queue_length_accepts_whole_floats() {
        let queue: Queue = serde_json::from_str(r#"{"name":"q1","length":5.0}"#).unwrap();
        assert_eq!(queue.to_string(), "Queue: q1, Length: 5");

        assert!(serde_json::from_str::<Queue>(r#"{"name":"q1","length":2.5}"#).is_err());
        assert!(serde_json::from_str::<Queue>(r#"{"name":"q1","length":-3.0}"#).is_err());
        assert!(serde_json::from_str::<Queue>(r#"{"name":"q1","length":"5"}"#).is_err());
    }
}
