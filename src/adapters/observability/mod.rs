//! Observability Adapters.
//!
//! Implementations of the AnalysisObserver port.
//!
//! - `TracingObserver` - Structured `tracing` events (production)
//! - `RecordingObserver` - In-memory capture (tests)

mod recording_observer;
mod tracing_observer;

pub use recording_observer::RecordingObserver;
pub use tracing_observer::TracingObserver;
