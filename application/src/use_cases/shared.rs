//! Shared utilities for use cases.
//!
//! Event emission tagged with the request id, and panic payload formatting
//! for isolated agent workers.

use crate::ports::broadcaster::Broadcaster;
use council_domain::{CouncilEvent, EventEnvelope, RequestId};
use std::any::Any;

/// Emits lifecycle events for one request
pub struct Emitter<'a> {
    request_id: &'a RequestId,
    broadcaster: &'a dyn Broadcaster,
}

impl<'a> Emitter<'a> {
    pub fn new(request_id: &'a RequestId, broadcaster: &'a dyn Broadcaster) -> Self {
        Self {
            request_id,
            broadcaster,
        }
    }

    pub fn emit(&self, event: CouncilEvent) {
        self.broadcaster
            .broadcast(&EventEnvelope::new(self.request_id.clone(), event));
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
