//! In-process snapshot source
//!
//! [`ScriptedSource`] replays a fixed list of message bodies through the
//! same decode path as the network source, then closes. Useful for driving
//! a renderer in tests without a server.

use std::time::Duration;

use super::{ConnectionState, SnapshotSink, SnapshotSource, Subscription};
use crate::snapshot::Snapshot;

/// A source that emits scripted raw messages
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    messages: Vec<String>,
    interval: Option<Duration>,
    hold_open: bool,
}

impl ScriptedSource {
    /// Script raw message bodies, valid or not
    pub fn new<I, M>(messages: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        Self {
            messages: messages.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Script already-built snapshots
    pub fn from_snapshots(snapshots: impl IntoIterator<Item = Snapshot>) -> Self {
        Self::new(
            snapshots
                .into_iter()
                .filter_map(|s| serde_json::to_string(&s).ok()),
        )
    }

    /// Pause before each message
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Stay open after the script has run, until the subscription is closed
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl SnapshotSource for ScriptedSource {
    fn connect<S: SnapshotSink>(&self, mut sink: S) -> Subscription {
        let messages = self.messages.clone();
        let interval = self.interval;
        let hold_open = self.hold_open;

        Subscription::spawn(move |ctx| async move {
            ctx.state.set(ConnectionState::Open);

            for message in &messages {
                if let Some(interval) = interval {
                    tokio::time::sleep(interval).await;
                }
                ctx.deliver(&mut sink, message);
            }

            if hold_open {
                std::future::pending::<()>().await;
            }
            ctx.state.set(ConnectionState::Closed);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Board, DashboardRenderer, Region};
    use tokio::sync::mpsc;

    async fn collect(source: &ScriptedSource) -> (Vec<Snapshot>, Subscription) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = source.connect(move |s: Snapshot| {
            let _ = tx.send(s);
        });

        let mut received = Vec::new();
        while let Some(snapshot) = rx.recv().await {
            received.push(snapshot);
        }
        (received, subscription)
    }

    #[tokio::test]
    async fn test_replays_in_order_and_closes() {
        let source = ScriptedSource::new([
            r#"{"stages":[{"name":"a","status":"ok"}]}"#,
            r#"{"stages":[{"name":"b","status":"ok"}]}"#,
        ]);

        let (received, subscription) = collect(&source).await;
        let names: Vec<_> = received.iter().map(|s| s.stages[0].name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        let mut changes = subscription.state_changes();
        changes
            .wait_for(|s| *s == ConnectionState::Closed)
            .await
            .unwrap();
        assert_eq!(subscription.stats().delivered, 2);
    }

    #[tokio::test]
    async fn test_malformed_messages_are_skipped() {
        let source = ScriptedSource::new([
            r#"{"workers":[{"name":"w","status":"up"}]}"#,
            "not json",
            "[]",
            r#"{"workers":[]}"#,
        ]);

        let (received, subscription) = collect(&source).await;
        assert_eq!(received.len(), 2);
        assert_eq!(subscription.stats().dropped, 2);
    }

    #[tokio::test]
    async fn test_malformed_message_keeps_last_rendered_state() {
        let source = ScriptedSource::new([
            r#"{"notifications":[{"message":"first"}]}"#,
            "{broken",
        ]);

        let (received, _subscription) = collect(&source).await;
        let mut renderer = DashboardRenderer::new(Board::standard()).unwrap();
        for snapshot in &received {
            renderer.on_snapshot(snapshot);
        }

        assert_eq!(
            renderer.surface().rows(Region::Notifications.id()).unwrap(),
            ["Notification: first"]
        );
    }

    #[tokio::test]
    async fn test_from_snapshots_round_trips_through_decoder() {
        let snapshot = Snapshot {
            notifications: vec![crate::snapshot::Notification::new("hello")],
            ..Default::default()
        };
        let source = ScriptedSource::from_snapshots([snapshot.clone()]);
        assert_eq!(source.len(), 1);

        let (received, _subscription) = collect(&source).await;
        assert_eq!(received, vec![snapshot]);
    }

    #[tokio::test]
    async fn test_close_stops_delivery() {
        let source = ScriptedSource::new(vec![r#"{}"#; 100])
            .with_interval(Duration::from_millis(20))
            .hold_open();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let subscription = source.connect(move |s: Snapshot| {
            let _ = tx.send(s);
        });

        rx.recv().await.unwrap();
        subscription.close().await;

        // The sender went away with the task, so the drain terminates
        let mut after_first = 0;
        while rx.recv().await.is_some() {
            after_first += 1;
        }
        assert!(after_first < 99);
    }
}
