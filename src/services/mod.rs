//! 服务模块

pub mod chat;
pub mod composer;
pub mod extractor;
pub mod llm;
pub mod memory;

pub use chat::ChatService;
pub use composer::{ComposedPrompt, ContextComposer, render_profile};
pub use extractor::{CompletionSource, Extraction, MetadataExtractor, RetryPolicy};
pub use llm::{LlmGateway, OpenAiGateway};
pub use memory::ConversationMemory;
