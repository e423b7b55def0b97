//! Chat assistant for Helio
//!
//! Routes free-text messages to canned weather responders via regex intent
//! detection, falling back to a generative-language model for everything
//! else.

pub mod error;
pub mod intent;
pub mod llm;
pub mod place;
pub mod responders;

pub use error::AssistantError;
pub use intent::ChatRouter;
pub use llm::GeminiClient;
