pub mod audio;

pub use audio::{AudioFormat, ProviderSettings, RequestRecord};
