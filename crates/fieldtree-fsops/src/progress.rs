//! Progress reporting seam between long-running jobs and their observers.

use fieldtree_events::{Event, EventBus};

/// Receives completion fractions in `0.0..=1.0` together with a label.
pub trait ProgressSink {
    /// Report that `fraction` of the current operation is complete.
    fn report(&self, fraction: f64, label: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(f64, &str),
{
    fn report(&self, fraction: f64, label: &str) {
        self(fraction, label);
    }
}

/// Sink that discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _fraction: f64, _label: &str) {}
}

/// Sink that publishes [`Event::Progress`] on an event bus.
#[derive(Clone)]
pub struct EventProgress {
    events: EventBus,
}

impl EventProgress {
    /// Publish progress on `events`.
    #[must_use]
    pub const fn new(events: EventBus) -> Self {
        Self { events }
    }
}

impl ProgressSink for EventProgress {
    fn report(&self, fraction: f64, label: &str) {
        self.events.publish(Event::Progress {
            fraction,
            label: label.to_string(),
        });
    }
}

/// Maps one job's progress onto its slot within a batch of `total` jobs.
pub(crate) struct BatchSlot<'a> {
    inner: &'a dyn ProgressSink,
    index: usize,
    total: usize,
}

impl<'a> BatchSlot<'a> {
    pub(crate) const fn new(inner: &'a dyn ProgressSink, index: usize, total: usize) -> Self {
        Self {
            inner,
            index,
            total,
        }
    }
}

impl ProgressSink for BatchSlot<'_> {
    #[allow(clippy::cast_precision_loss)]
    fn report(&self, fraction: f64, label: &str) {
        let overall = (self.index as f64 + fraction.clamp(0.0, 1.0)) / self.total.max(1) as f64;
        self.inner.report(overall, label);
    }
}
