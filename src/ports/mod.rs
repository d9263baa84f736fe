//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Outbound chat-completion capability used to score batches
//! - `AnalysisObserver` - Sink for structured operational events

mod ai_provider;
mod analysis_observer;

pub use ai_provider::{
    AIError, AIProvider, CompletionRequest, CompletionResponse, FinishReason, Message,
    MessageRole, ProviderInfo, RequestMetadata, TokenUsage,
};
pub use analysis_observer::{AnalysisEvent, AnalysisObserver, NoOpObserver};
