//! Server-Sent Events source
//!
//! Holds one long-lived `GET` against the stream endpoint and feeds the
//! body through an [`SseDecoder`]. When the stream fails or ends, the task
//! waits out a [`Backoff`] delay and reconnects, sending the last event id
//! it saw as `Last-Event-ID`.

use futures_util::StreamExt;
use reqwest::header::{HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, Response};
use std::time::Duration;

use super::backoff::Backoff;
use super::error::{SourceError, SourceResult};
use super::event_stream::SseDecoder;
use super::{ConnectionState, SnapshotSink, SnapshotSource, Subscription, TaskContext};

const EVENT_STREAM: &str = "text/event-stream";
const LAST_EVENT_ID: &str = "Last-Event-ID";

/// Connection settings for [`SseSource`]
#[derive(Debug, Clone)]
pub struct SseConfig {
    /// Stream endpoint (e.g. "http://127.0.0.1:8080/events")
    pub url: String,
    /// Upper bound on each connection handshake (TCP connect through response headers)
    pub connect_timeout: Option<Duration>,
    /// First reconnect delay
    pub reconnect_initial: Duration,
    /// Largest reconnect delay
    pub reconnect_max: Duration,
    /// Consecutive failed attempts before giving up (0 = never)
    pub max_attempts: u32,
}

impl SseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

impl Default for SseConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8080/events".to_string(),
            connect_timeout: Some(Duration::from_secs(10)),
            reconnect_initial: Duration::from_secs(1),
            reconnect_max: Duration::from_secs(30),
            max_attempts: 0,
        }
    }
}

/// Snapshot source backed by a Server-Sent Events endpoint
pub struct SseSource {
    client: Client,
    config: SseConfig,
}

impl SseSource {
    /// Create a source with the given configuration
    pub fn new(config: SseConfig) -> SourceResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SourceError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SseConfig {
        &self.config
    }
}

impl SnapshotSource for SseSource {
    fn connect<S: SnapshotSink>(&self, sink: S) -> Subscription {
        let client = self.client.clone();
        let config = self.config.clone();
        Subscription::spawn(move |ctx| run(client, config, sink, ctx))
    }
}

/// Connection loop: connect, stream, back off, repeat
async fn run<S: SnapshotSink>(client: Client, config: SseConfig, mut sink: S, ctx: TaskContext) {
    let mut backoff = Backoff::new(config.reconnect_initial, config.reconnect_max);
    let mut decoder = SseDecoder::new();

    loop {
        ctx.state.set(ConnectionState::Connecting);

        let handshake = open_stream(&client, &config.url, decoder.last_event_id());
        let opened = match config.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, handshake)
                .await
                .unwrap_or_else(|_| Err(SourceError::Timeout(limit))),
            None => handshake.await,
        };

        match opened {
            Ok(response) => {
                backoff.reset();
                ctx.state.set(ConnectionState::Open);
                tracing::info!(subscription_id = %ctx.id, url = %config.url, "Event stream connected");

                match consume(response, &mut decoder, &mut sink, &ctx).await {
                    Ok(()) => {
                        tracing::warn!(subscription_id = %ctx.id, "Event stream ended by server")
                    }
                    Err(e) => {
                        tracing::warn!(subscription_id = %ctx.id, error = %e, "Event stream lost")
                    }
                }
                ctx.state.set(ConnectionState::Connecting);
                decoder.reset();
            }
            Err(e) => {
                tracing::warn!(
                    subscription_id = %ctx.id,
                    url = %config.url,
                    attempt = backoff.attempts() + 1,
                    error = %e,
                    "Failed to connect to event stream"
                );
            }
        }

        if let Some(retry) = decoder.take_retry() {
            tracing::debug!(subscription_id = %ctx.id, retry_ms = retry.as_millis() as u64, "Server set reconnect delay");
            backoff.set_initial(retry);
        }

        if config.max_attempts > 0 && backoff.attempts() >= config.max_attempts {
            tracing::error!(
                subscription_id = %ctx.id,
                attempts = backoff.attempts(),
                "Giving up on event stream"
            );
            break;
        }

        let delay = backoff.next_delay();
        ctx.record_reconnect();
        tracing::info!(
            subscription_id = %ctx.id,
            delay_ms = delay.as_millis() as u64,
            attempt = backoff.attempts(),
            "Reconnecting to event stream"
        );
        tokio::time::sleep(delay).await;
    }

    ctx.state.set(ConnectionState::Closed);
}

/// Perform the handshake
async fn open_stream(
    client: &Client,
    url: &str,
    last_event_id: Option<&str>,
) -> SourceResult<Response> {
    let mut request = client
        .get(url)
        .header(ACCEPT, EVENT_STREAM)
        .header(CACHE_CONTROL, "no-cache");

    if let Some(id) = last_event_id {
        match HeaderValue::from_str(id) {
            Ok(value) => request = request.header(LAST_EVENT_ID, value),
            Err(_) => tracing::debug!(event_id = %id, "Last event id is not a valid header value"),
        }
    }

    let response = request.send().await.map_err(SourceError::Connect)?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status(status.as_u16()));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !content_type.starts_with(EVENT_STREAM) {
        tracing::warn!(content_type = %content_type, "Endpoint did not declare an event stream");
    }

    Ok(response)
}

/// Read the body until it ends, delivering every `message` event
async fn consume<S: SnapshotSink>(
    response: Response,
    decoder: &mut SseDecoder,
    sink: &mut S,
    ctx: &TaskContext,
) -> SourceResult<()> {
    let mut body = response.bytes_stream();

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(SourceError::Stream)?;

        for event in decoder.feed(&chunk) {
            if event.event != "message" {
                tracing::debug!(subscription_id = %ctx.id, event = %event.event, "Skipping non-message event");
                continue;
            }
            ctx.deliver(sink, &event.data);
        }
    }

    Ok(())
}
