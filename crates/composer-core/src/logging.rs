//! Activity log for the TUI.
//!
//! [`ActivityLog`] is a `tracing` layer that keeps the most recent events in
//! a bounded buffer, so the terminal UI can show what the composer did
//! without writing to stdout.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// One recorded event.
#[derive(Debug, Clone)]
pub struct ActivityEntry {
    /// Seconds since the log was created.
    pub elapsed_secs: f64,
    pub level: Level,
    pub target: String,
    /// The event message followed by its other fields as `key=value`.
    pub text: String,
}

#[derive(Debug)]
struct Ring {
    entries: VecDeque<ActivityEntry>,
    capacity: usize,
    started: Instant,
}

/// Bounded, shareable event buffer. Clones share the same buffer.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    ring: Arc<Mutex<Ring>>,
}

impl ActivityLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            ring: Arc::new(Mutex::new(Ring {
                entries: VecDeque::with_capacity(capacity),
                capacity: capacity.max(1),
                started: Instant::now(),
            })),
        }
    }

    /// Snapshot of every buffered entry, oldest first.
    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.ring
            .lock()
            .map(|r| r.entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The newest `n` entries, oldest first.
    pub fn latest(&self, n: usize) -> Vec<ActivityEntry> {
        self.ring
            .lock()
            .map(|r| {
                let skip = r.entries.len().saturating_sub(n);
                r.entries.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.ring.lock().map(|r| r.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: Subscriber> Layer<S> for ActivityLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut fields = FieldText::default();
        event.record(&mut fields);

        if let Ok(mut ring) = self.ring.lock() {
            if ring.entries.len() >= ring.capacity {
                ring.entries.pop_front();
            }
            let elapsed_secs = ring.started.elapsed().as_secs_f64();
            ring.entries.push_back(ActivityEntry {
                elapsed_secs,
                level: *metadata.level(),
                target: metadata.target().to_string(),
                text: fields.finish(),
            });
        }
    }
}

#[derive(Default)]
struct FieldText {
    message: String,
    extra: String,
}

impl FieldText {
    fn finish(self) -> String {
        if self.extra.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.extra.trim_start().to_string()
        } else {
            format!("{}{}", self.message, self.extra)
        }
    }
}

impl Visit for FieldText {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.extra, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            let _ = write!(self.extra, " {}={:?}", field.name(), value);
        }
    }
}
