//! Display regions
//!
//! The five addressable regions of the dashboard and their stable ids.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the five display regions, one per snapshot collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Stages,
    Workers,
    EventQueues,
    PerformanceMetrics,
    Notifications,
}

impl Region {
    /// All regions in display order
    pub const ALL: [Region; 5] = [
        Region::Stages,
        Region::Workers,
        Region::EventQueues,
        Region::PerformanceMetrics,
        Region::Notifications,
    ];

    /// Stable identifier used to look the region up on a surface
    pub fn id(&self) -> &'static str {
        match self {
            Region::Stages => "stages-list",
            Region::Workers => "workers-list",
            Region::EventQueues => "event-queues-list",
            Region::PerformanceMetrics => "performance-metrics-list",
            Region::Notifications => "notification-center",
        }
    }

    /// Human-readable panel title
    pub fn title(&self) -> &'static str {
        match self {
            Region::Stages => "Stages",
            Region::Workers => "Workers",
            Region::EventQueues => "Event Queues",
            Region::PerformanceMetrics => "Performance Metrics",
            Region::Notifications => "Notifications",
        }
    }

    /// Look a region up by its stable id
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.id() == id)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
