//! Snapshot Sources
//!
//! A [`SnapshotSource`] keeps a live subscription to a stream of pipeline
//! snapshots and hands each decoded [`Snapshot`] to a single
//! [`SnapshotSink`]. Connecting returns a [`Subscription`], the only handle
//! to the running connection.
//!
//! ## Architecture
//!
//! - **SseSource**: Server-Sent Events over HTTP, with reconnect and backoff
//! - **ScriptedSource**: replays fixed message bodies, for tests and demos
//! - **SseDecoder**: incremental `text/event-stream` frame decoder
//! - **Backoff**: capped exponential reconnect delays
//!
//! Both sources decode message bodies the same way: a body that does not
//! decode is logged and dropped, and the connection stays up.
//!
//! ## Example
//!
//! ```rust,no_run
//! use stagewatch::source::{SnapshotSource, SseConfig, SseSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = SseSource::new(SseConfig::new("http://127.0.0.1:8080/events"))?;
//!     let subscription = source.connect(|snapshot: stagewatch::Snapshot| {
//!         println!("{} stages", snapshot.stages.len());
//!     });
//!
//!     tokio::signal::ctrl_c().await?;
//!     subscription.close().await;
//!     Ok(())
//! }
//! ```

mod backoff;
mod error;
mod event_stream;
pub mod fakes;
mod sse;

pub use backoff::Backoff;
pub use error::{SourceError, SourceResult};
pub use event_stream::{SseDecoder, SseEvent};
pub use fakes::ScriptedSource;
pub use sse::{SseConfig, SseSource};

use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::snapshot::Snapshot;

/// Receiver of decoded snapshots
///
/// A sink is only ever called from the connection task, one snapshot at a
/// time, so it must not block.
pub trait SnapshotSink: Send + 'static {
    fn on_snapshot(&mut self, snapshot: Snapshot);
}

impl<F> SnapshotSink for F
where
    F: FnMut(Snapshot) + Send + 'static,
{
    fn on_snapshot(&mut self, snapshot: Snapshot) {
        self(snapshot)
    }
}

/// Something that can deliver a stream of snapshots to a sink
pub trait SnapshotSource {
    /// Start delivering snapshots to `sink`
    ///
    /// Must be called from within a tokio runtime. Returns immediately; the
    /// connection runs on a spawned task until the subscription is closed.
    fn connect<S: SnapshotSink>(&self, sink: S) -> Subscription;
}

/// Connection lifecycle of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Counters for one subscription
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SourceStats {
    /// Snapshots handed to the sink
    pub delivered: u64,
    /// Messages dropped because they did not decode
    pub dropped: u64,
    /// Reconnect attempts scheduled
    pub reconnects: u64,
}

#[derive(Debug, Default)]
struct Counters {
    delivered: AtomicU64,
    dropped: AtomicU64,
    reconnects: AtomicU64,
}

/// Shared connection-state cell
#[derive(Debug, Clone)]
pub(crate) struct StateHandle(Arc<watch::Sender<ConnectionState>>);

impl StateHandle {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(ConnectionState::Connecting);
        Self(Arc::new(tx))
    }

    pub(crate) fn set(&self, state: ConnectionState) {
        self.0.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                *current = state;
                true
            }
        });
    }

    fn get(&self) -> ConnectionState {
        *self.0.borrow()
    }
}

/// Everything a connection task needs to report back
#[derive(Debug, Clone)]
pub(crate) struct TaskContext {
    pub(crate) id: Uuid,
    pub(crate) state: StateHandle,
    counters: Arc<Counters>,
}

impl TaskContext {
    /// Decode one message body and hand it to the sink
    ///
    /// Returns false when the body was dropped.
    pub(crate) fn deliver<S: SnapshotSink>(&self, sink: &mut S, data: &str) -> bool {
        match Snapshot::from_json(data) {
            Ok(snapshot) => {
                let [stages, workers, queues, metrics, notifications] = snapshot.sizes();
                tracing::trace!(
                    subscription_id = %self.id,
                    stages,
                    workers,
                    queues,
                    metrics,
                    notifications,
                    "Snapshot received"
                );
                self.counters.delivered.fetch_add(1, Ordering::Relaxed);
                sink.on_snapshot(snapshot);
                true
            }
            Err(e) => {
                tracing::warn!(
                    subscription_id = %self.id,
                    error = %e,
                    payload_len = data.len(),
                    "Dropping malformed payload"
                );
                self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    pub(crate) fn record_reconnect(&self) {
        self.counters.reconnects.fetch_add(1, Ordering::Relaxed);
    }
}

/// Handle to a running connection
///
/// Dropping the handle aborts the connection; [`Subscription::close`] does
/// the same and additionally waits for the task to finish.
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    task: Option<JoinHandle<()>>,
    state: StateHandle,
    counters: Arc<Counters>,
}

impl Subscription {
    /// Spawn a connection task and wrap it in a subscription
    pub(crate) fn spawn<F, Fut>(run: F) -> Self
    where
        F: FnOnce(TaskContext) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let ctx = TaskContext {
            id: Uuid::new_v4(),
            state: StateHandle::new(),
            counters: Arc::new(Counters::default()),
        };
        let id = ctx.id;
        let state = ctx.state.clone();
        let counters = Arc::clone(&ctx.counters);
        let task = tokio::spawn(run(ctx));

        Self {
            id,
            task: Some(task),
            state,
            counters,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Receiver notified on every state transition
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.0.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.state() == ConnectionState::Closed
    }

    /// Current delivery counters
    pub fn stats(&self) -> SourceStats {
        SourceStats {
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            reconnects: self.counters.reconnects.load(Ordering::Relaxed),
        }
    }

    /// Release the connection
    ///
    /// Once this returns the sink will not be called again.
    pub async fn close(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            // Cancelled or already finished; either way the sink is done
            let _ = task.await;
        }
        self.state.set(ConnectionState::Closed);
        tracing::info!(subscription_id = %self.id, "Subscription closed");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            self.state.set(ConnectionState::Closed);
        }
    }
}
