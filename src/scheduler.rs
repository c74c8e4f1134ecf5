//! Multi-rate poll scheduling over one half-duplex transport.
//!
//! The flight controller only answers what it is asked, so acquisition is
//! paced entirely from this side of the wire. Messages are grouped into
//! request classes, each polled at its own frequency: attitude drives the
//! artificial horizon and runs fast, the navigation and electrical messages
//! share a slower tier. The scheduler owns no clock; callers pass `now` in,
//! which keeps scheduling decisions deterministic under test.

use std::time::{Duration, Instant};

/// A group of message ids polled together at one frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestClass {
    /// Short name used in log fields.
    pub name: &'static str,
    /// Minimum spacing between issues of this class.
    pub interval: Duration,
    /// Message ids requested each time the class fires, in order.
    pub message_ids: Vec<u8>,
}

impl RequestClass {
    /// A class polled at the given frequency.
    pub fn at_hz(name: &'static str, hz: u32, message_ids: Vec<u8>) -> Self {
        Self {
            name,
            interval: Duration::from_secs_f64(1.0 / f64::from(hz.max(1))),
            message_ids,
        }
    }
}

#[derive(Debug)]
struct ClassState {
    class: RequestClass,
    /// When this class last fired; `None` until the first issue, so a fresh
    /// scheduler polls everything immediately.
    last_issued: Option<Instant>,
}

impl ClassState {
    fn is_due(&self, now: Instant) -> bool {
        match self.last_issued {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= self.class.interval,
        }
    }
}

/// Decides which message ids to request next.
///
/// Classes fire in construction order, so the fast class is listed first
/// and its requests always precede slower ones within a single poll. An
/// overdue class fires on the next poll regardless of how late it is; it
/// is never skipped, and it is not replayed for missed intervals either,
/// because only the latest value of each message matters.
#[derive(Debug)]
pub struct PollScheduler {
    classes: Vec<ClassState>,
}

impl PollScheduler {
    /// Build a scheduler over classes in priority order.
    pub fn new(classes: Vec<RequestClass>) -> Self {
        Self {
            classes: classes
                .into_iter()
                .map(|class| ClassState { class, last_issued: None })
                .collect(),
        }
    }

    /// Collect the message ids of every class due at `now`, marking those
    /// classes as issued. Returns ids in class priority order; an empty
    /// result means nothing is due yet.
    pub fn poll_due(&mut self, now: Instant) -> Vec<u8> {
        let mut due = Vec::new();
        for state in &mut self.classes {
            if state.is_due(now) {
                due.extend_from_slice(&state.class.message_ids);
                state.last_issued = Some(now);
            }
        }
        due
    }
}
