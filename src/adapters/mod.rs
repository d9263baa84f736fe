//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Chat-completion providers (OpenAI-compatible, mock)
//! - `observability` - Analysis event sinks (tracing, in-memory)
//! - `input` - Review file loading

pub mod ai;
pub mod input;
pub mod observability;

pub use ai::{MockAIProvider, MockError, MockResponse, OpenAIConfig, OpenAIProvider};
pub use observability::{RecordingObserver, TracingObserver};
