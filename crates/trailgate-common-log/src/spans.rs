//! Flush spans and timing.

use std::future::Future;
use tracing::{info_span, Instrument, Span};

/// Span covering one flush invocation.
pub fn flush_span(tag: &str) -> Span {
    info_span!("flush", tag = %tag)
}

/// Span covering one remote call.
pub fn remote_span(operation: &'static str, endpoint: &str) -> Span {
    info_span!("remote", op = operation, endpoint = %endpoint)
}

/// Instrument a future with a span.
pub fn instrument_future<F: Future>(future: F, span: Span) -> impl Future<Output = F::Output> {
    future.instrument(span)
}

/// Timing utility for operations.
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Complete the timer and record duration.
    pub fn finish(self) -> std::time::Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_ms = %duration.as_millis(),
            "operation completed"
        );
        duration
    }
}
