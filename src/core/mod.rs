pub mod dispatch;
pub mod emotion;
pub mod session;
pub mod tts;
