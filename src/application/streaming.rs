//! Keep-alive streaming wrapper for slow operations.
//!
//! Lets a long-running operation (a regeneration batch, typically) run
//! behind a long-lived connection without an intermediary's idle timeout
//! cutting it off: one filler byte goes out immediately, then one per
//! heartbeat interval, and the operation's result is serialized as the final
//! payload. Filler bytes are ASCII spaces, so the concatenated stream is
//! still one valid JSON document.
//!
//! The response status is fixed when emission begins; failures are encoded
//! in the payload body, never in the status line.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::Stream;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::warn;

use crate::domain::foundation::PortalError;

/// Default heartbeat interval (15 seconds).
pub const DEFAULT_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// The filler byte emitted while the operation runs. JSON-neutral.
const FILLER: u8 = b' ';

/// Fallback payload builder invoked when the operation fails.
type ErrorPayloadFn = Box<dyn FnOnce(&PortalError) -> serde_json::Value + Send>;

/// Completion hook invoked once the operation settles successfully.
type CompleteFn = Box<dyn FnOnce() + Send>;

/// Options for [`KeepAliveStream::run`].
pub struct KeepAliveOptions {
    interval: Duration,
    on_error: Option<ErrorPayloadFn>,
    on_complete: Option<CompleteFn>,
}

impl KeepAliveOptions {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            on_error: None,
            on_complete: None,
        }
    }

    /// Replace the default error payload with a caller-provided one.
    pub fn with_on_error(
        mut self,
        on_error: impl FnOnce(&PortalError) -> serde_json::Value + Send + 'static,
    ) -> Self {
        self.on_error = Some(Box::new(on_error));
        self
    }

    /// Run a hook after the operation settles successfully.
    pub fn with_on_complete(mut self, on_complete: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(on_complete));
        self
    }
}

impl Default for KeepAliveOptions {
    fn default() -> Self {
        Self::new(DEFAULT_KEEP_ALIVE_INTERVAL)
    }
}

/// Byte stream produced by [`KeepAliveStream::run`].
///
/// Dropping the stream closes the channel; the heartbeat task observes the
/// closed channel on its next send and exits, so no timer outlives the
/// stream. The underlying operation still runs to completion — its result is
/// handed to `on_complete`, not lost.
pub struct KeepAliveStream {
    rx: mpsc::Receiver<Vec<u8>>,
}

impl KeepAliveStream {
    /// Run `operation` behind a heartbeat.
    pub fn run<F, T>(operation: F, options: KeepAliveOptions) -> Self
    where
        F: Future<Output = Result<T, PortalError>> + Send + 'static,
        T: Serialize + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(8);
        let KeepAliveOptions {
            interval: period,
            on_error,
            on_complete,
        } = options;

        tokio::spawn(async move {
            tokio::pin!(operation);

            // First filler goes out before any work happens. A send failure
            // means the consumer is already gone; the operation still runs
            // to completion below so its result reaches `on_complete`.
            let settled = if tx.send(vec![FILLER]).await.is_err() {
                None
            } else {
                let mut heartbeat = interval(period);
                heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
                // Consume the interval's immediate first tick.
                heartbeat.tick().await;

                loop {
                    tokio::select! {
                        _ = heartbeat.tick() => {
                            if tx.send(vec![FILLER]).await.is_err() {
                                // Consumer disconnected; stop the heartbeat
                                // but let the operation finish below.
                                break None;
                            }
                        }
                        result = &mut operation => break Some(result),
                    }
                }
            };

            let result = match settled {
                Some(result) => result,
                None => operation.await,
            };
            let payload = Self::settle(result, on_error, on_complete);
            let _ = tx.send(payload).await;
        });

        Self { rx }
    }

    fn settle<T: Serialize>(
        result: Result<T, PortalError>,
        on_error: Option<ErrorPayloadFn>,
        on_complete: Option<CompleteFn>,
    ) -> Vec<u8> {
        let value = match result {
            Ok(value) => {
                let serialized = serde_json::to_value(&value).unwrap_or_else(|error| {
                    warn!(%error, "result serialization failed, degrading to error payload");
                    generic_error_payload("result serialization failed")
                });
                if let Some(hook) = on_complete {
                    hook();
                }
                serialized
            }
            Err(error) => match on_error {
                Some(fallback) => fallback(&error),
                None => generic_error_payload(&error.to_string()),
            },
        };

        // to_vec of a Value cannot fail.
        serde_json::to_vec(&value).unwrap_or_else(|_| b"{}".to_vec())
    }

    /// Convert into an HTTP response. The 200 status is fixed here, before
    /// any byte is emitted, and cannot change afterwards.
    pub fn into_response(self) -> Response {
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from_stream(self))
            .expect("static response parts are valid")
    }
}

impl Stream for KeepAliveStream {
    type Item = Result<Vec<u8>, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx).map(|chunk| chunk.map(Ok))
    }
}

impl IntoResponse for KeepAliveStream {
    fn into_response(self) -> Response {
        KeepAliveStream::into_response(self)
    }
}

fn generic_error_payload(message: &str) -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "error": message,
    })
}
