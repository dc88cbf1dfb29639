mod claude_provider;
mod gemini_provider;
mod http_error;
mod mock_provider;
mod openai_provider;
mod provider_factory;

pub use claude_provider::{ClaudeConfig, ClaudeProvider};
pub use gemini_provider::{GeminiConfig, GeminiProvider};
pub(crate) use http_error::error_from_response;
pub use mock_provider::MockFormattingProvider;
pub use openai_provider::{OpenAiConfig, OpenAiProvider};
pub use provider_factory::{ProviderConfigs, ProviderFactory, ProviderKind};
