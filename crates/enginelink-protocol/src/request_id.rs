//! Request identifiers.

use std::sync::atomic::{AtomicI32, Ordering};

/// Hands out request ids, starting at 0.
///
/// Build one per process and share it (behind an `Arc`) with every
/// connection that constructs request messages. Ids are never negative,
/// so they cannot be mistaken for
/// [`UNSOLICITED_REQUEST_ID`](crate::UNSOLICITED_REQUEST_ID). After
/// `i32::MAX` the counter starts over at 0.
#[derive(Debug, Default)]
pub struct RequestIds {
    next: AtomicI32,
}

impl RequestIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next id.
    pub fn next(&self) -> i32 {
        let step = |id: i32| Some(id.checked_add(1).unwrap_or(0));
        let id = self
            .next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, step)
            .unwrap_or_else(|id| id);
        if id == i32::MAX {
            tracing::warn!("request ids exhausted, starting over at 0");
        }
        id
    }

    /// The id the next call to [`next`](Self::next) will return.
    pub fn peek(&self) -> i32 {
        self.next.load(Ordering::Relaxed)
    }
}
