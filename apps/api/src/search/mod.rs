pub mod annotator;
pub mod escalator;
pub mod fallback;
pub mod handlers;
pub mod normalizer;
pub mod pipeline;
pub mod provider;
