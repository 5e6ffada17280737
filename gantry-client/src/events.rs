//! Session event stream subscription
//!
//! Parses the session service's server-sent event stream into the
//! `SessionEvent` values the engine consumes. Event names the engine does
//! not know are skipped; a malformed payload or transport failure ends the
//! subscription with a stream error.

use async_trait::async_trait;
use eventsource_stream::{Event, EventStreamError, Eventsource};
use futures::StreamExt;
use futures::stream::BoxStream;
use serde::Deserialize;

use crate::EventSource;
use crate::error::{ClientError, Result};
use gantry_core::domain::session::SessionEvent;

/// JSON payload carried by every lifecycle event
#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(rename = "sessionName")]
    session_name: String,
}

/// SSE-backed implementation of [`EventSource`]
pub struct SseEventSource {
    inner: BoxStream<'static, std::result::Result<Event, EventStreamError<reqwest::Error>>>,
}

impl SseEventSource {
    /// Wrap an open `text/event-stream` response
    pub fn new(response: reqwest::Response) -> Self {
        Self {
            inner: response.bytes_stream().eventsource().boxed(),
        }
    }
}

#[async_trait]
impl EventSource for SseEventSource {
    async fn next_event(&mut self) -> Result<Option<SessionEvent>> {
        while let Some(item) = self.inner.next().await {
            let event = item.map_err(|e| ClientError::Stream(e.to_string()))?;

            if event.data.is_empty() {
                continue;
            }

            let payload: EventPayload = serde_json::from_str(&event.data).map_err(|e| {
                ClientError::ParseError(format!(
                    "Failed to parse '{}' event payload: {}",
                    event.event, e
                ))
            })?;

            match SessionEvent::from_wire(&event.event, payload.session_name) {
                Some(parsed) => return Ok(Some(parsed)),
                None => {
                    tracing::debug!(event = %event.event, "Skipping unhandled session event");
                }
            }
        }

        Ok(None)
    }
}
