//! # Stagewatch
//!
//! Live pipeline dashboard - subscribes to a stream of pipeline-state
//! snapshots and keeps five lists current: stages, workers, event queues,
//! performance metrics, and notifications.
//!
//! ## Features
//!
//! - **Streaming**: Server-Sent Events client with reconnect and backoff
//! - **Tolerant decoding**: missing collections are empty, bad messages are dropped
//! - **Full replacement**: every snapshot redraws every region from scratch
//! - **Terminal UI**: ratatui dashboard, or plain line output for pipes
//!
//! ## Modules
//!
//! - [`snapshot`]: Snapshot data model and payload decoding
//! - [`source`]: Snapshot sources and subscriptions
//! - [`render`]: Generic list rendering and the dashboard renderer
//! - [`tui`]: Terminal drawing
//! - [`config`]: File and environment configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use stagewatch::render::{Board, DashboardRenderer};
//! use stagewatch::source::{ScriptedSource, SnapshotSource};
//! use stagewatch::Snapshot;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//!     let source = ScriptedSource::new([r#"{"workers":[{"name":"w-1","status":"busy"}]}"#]);
//!     let subscription = source.connect(move |snapshot: Snapshot| {
//!         let _ = tx.send(snapshot);
//!     });
//!
//!     let mut renderer = DashboardRenderer::new(Board::standard())?;
//!     while let Some(snapshot) = rx.recv().await {
//!         renderer.on_snapshot(&snapshot);
//!     }
//!     subscription.close().await;
//!
//!     assert_eq!(
//!         renderer.surface().rows("workers-list").unwrap(),
//!         ["Worker: w-1, Status: busy"]
//!     );
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod render;
pub mod snapshot;
pub mod source;
pub mod tui;

// Re-export top-level types for convenience
pub use snapshot::{Metric, Notification, PayloadError, Queue, Snapshot, Stage, Worker};

pub use source::{
    Backoff, ConnectionState, ScriptedSource, SnapshotSink, SnapshotSource, SourceError,
    SourceResult, SourceStats, SseConfig, SseDecoder, SseEvent, SseSource, Subscription,
};

pub use render::{
    render, Board, DashboardRenderer, ListSurface, Panel, Region, RenderError, TextList, UiSurface,
};

pub use config::{generate_default_config, Config, ConfigError, LoggingConfig, SourceConfig};
