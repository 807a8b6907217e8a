pub mod config;
pub mod core;
pub mod utils;

// Re-export commonly used items for convenience
pub use config::EvalConfig;
pub use core::dispatch::{DispatchOrchestrator, SynthesisResult};
pub use core::emotion::{
    CapabilityWarning, EmotionTag, MarkupStyle, ProviderId, ProviderProfile, RenderedRequest,
    TaggedText, parse_tags, render,
};
pub use core::session::{ComparisonReport, ComparisonSession, OutcomeError, ProviderOutcome};
pub use core::tts::{AudioData, SynthesisError, Synthesizer, create_synthesizer};
