pub mod channel;
pub mod dispatch;
pub mod handlers;
pub mod synthesizer;
