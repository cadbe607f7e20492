use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};

use super::{Event, Listener};

/// A listener waiting to handle an event on a later drain tick.
pub(crate) struct Deferred {
    pub listener: Arc<Listener>,
    pub event: Event,
    pub queued_at: DateTime<Utc>,
}

/// FIFO of deferred listeners, shared by notify (producer) and the drain
/// tick (consumer).
#[derive(Default)]
pub(crate) struct DeferredQueue {
    entries: Mutex<VecDeque<Deferred>>,
}

impl DeferredQueue {
    pub fn push(&self, listener: Arc<Listener>, event: Event) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Deferred {
                listener,
                event,
                queued_at: Utc::now(),
            });
    }

    pub fn pop(&self) -> Option<Deferred> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
