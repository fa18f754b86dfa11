//! Per-dispatch aggregation of handler responses.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use multibot_core::Response;

/// Shared state of a single dispatch. A fresh one is created per message.
///
/// Counters are only touched through atomic increments; the ban interval slot is guarded by a
/// mutex and keeps whichever positive value was written last.
#[derive(Debug, Default)]
pub(crate) struct Aggregate {
    pin: AtomicUsize,
    unpin: AtomicUsize,
    preview: AtomicUsize,
    reply: AtomicUsize,
    ban_interval: Mutex<Duration>,
}

impl Aggregate {
    /// Records the directive flags of one handler response. Text is collected separately.
    pub(crate) fn record(&self, response: &Response) {
        if response.pin {
            self.pin.fetch_add(1, Ordering::SeqCst);
        }
        if response.unpin {
            self.unpin.fetch_add(1, Ordering::SeqCst);
        }
        if response.preview {
            self.preview.fetch_add(1, Ordering::SeqCst);
        }
        if response.reply {
            self.reply.fetch_add(1, Ordering::SeqCst);
        }
        if !response.ban_interval.is_zero() {
            let mut slot = self
                .ban_interval
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            *slot = response.ban_interval;
        }
    }

    /// Builds the merged response from the collected fragments. Whitespace-only fragments are
    /// dropped, the rest are joined with newlines in the given order.
    pub(crate) fn finish(&self, fragments: Vec<String>) -> Response {
        let lines: Vec<String> = fragments
            .into_iter()
            .filter(|text| !text.trim().is_empty())
            .collect();

        let ban_interval = *self
            .ban_interval
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        Response {
            text: lines.join("\n"),
            pin: self.pin.load(Ordering::SeqCst) > 0,
            unpin: self.unpin.load(Ordering::SeqCst) > 0,
            preview: self.preview.load(Ordering::SeqCst) > 0,
            reply: self.reply.load(Ordering::SeqCst) > 0,
            ban_interval,
        }
    }
}
