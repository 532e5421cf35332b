//! Datastar SSE responses for the admin's in-place updates.

use std::convert::Infallible;

use async_stream::stream;
use axum::response::{
    IntoResponse, Response,
    sse::{Event, Sse},
};
use datastar::prelude::{ElementPatchMode, PatchElements, PatchSignals};
use serde_json::Value;

/// Ordered batch of datastar events sent back as one SSE response.
#[derive(Default)]
pub struct StreamBuilder {
    events: Vec<Event>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap the element matched by `selector` for `html`.
    pub fn replace(&mut self, selector: &str, html: String) -> &mut Self {
        let event = PatchElements::new(html)
            .selector(selector)
            .mode(ElementPatchMode::Replace)
            .write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    /// Merge `signals` (a JSON object) into the client's signal store.
    pub fn signals(&mut self, signals: &Value) -> &mut Self {
        let event = PatchSignals::new(signals.to_string()).write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    pub fn into_response(self) -> Response {
        let events = self.events;
        let stream = stream! {
            for event in events {
                yield Ok::<Event, Infallible>(event);
            }
        };
        Sse::new(stream).into_response()
    }
}
