pub mod parser;
pub mod profile;
pub mod renderer;
pub mod tag;

pub use parser::{EmotionMarker, TagError, TaggedText, parse_tags};
pub use profile::{MarkupStyle, ProviderId, ProviderProfile, UnknownProvider, profile_for};
pub use renderer::{CapabilityWarning, RenderError, Rendered, RenderedRequest, render};
pub use tag::EmotionTag;
