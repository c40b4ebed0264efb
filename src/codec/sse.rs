//! Server-Sent Events (SSE) codec for streaming responses
//!
//! Splits a byte stream into events and hands each event's data to the
//! binding codec. The stream ends at a `[DONE]` sentinel, after an event the
//! binding marks final, after the first error, or when the body ends.

use std::{future, pin::Pin, sync::Arc};

use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};

use crate::protocol::{error::AgentError, event::StreamEvent};

use super::{Codec, DecodedEvent};

/// A stream of decoded events
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, AgentError>> + Send>>;

/// SSE codec for parsing streaming responses
#[derive(Debug, Clone, Default)]
pub struct SseCodec;

impl SseCodec {
    /// Create a new SSE codec
    pub fn new() -> Self {
        Self
    }

    /// Parse an SSE byte stream into a stream of events
    ///
    /// # Arguments
    ///
    /// * `byte_stream` - The response body
    /// * `codec` - The binding codec that decodes each event's data
    pub fn parse_stream<S, B>(&self, byte_stream: S, codec: Arc<dyn Codec>) -> EventStream
    where
        S: Stream<Item = Result<B, AgentError>> + Send + 'static,
        B: AsRef<[u8]>,
    {
        let events = byte_stream
            .eventsource()
            .map(move |result| match result {
                Ok(event) if event.data.trim().is_empty() => Ok(DecodedEvent::Skip),
                Ok(event) => codec.decode_event(&event.data),
                Err(e) => Err(AgentError::Transport(format!("SSE stream error: {}", e))),
            })
            .scan(false, |finished, decoded| {
                if *finished {
                    return future::ready(None);
                }

                let item = match decoded {
                    Ok(DecodedEvent::Event(event)) => Some(Some(Ok(event))),
                    Ok(DecodedEvent::Final(event)) => {
                        *finished = true;
                        Some(Some(Ok(event)))
                    }
                    Ok(DecodedEvent::Skip) => Some(None),
                    Ok(DecodedEvent::Done) => None,
                    Err(e) => {
                        *finished = true;
                        Some(Some(Err(e)))
                    }
                };
                future::ready(item)
            })
            .filter_map(future::ready);

        Box::pin(events)
    }
}
