pub mod providers;
pub mod translators;

pub use providers::demo::DemoProvider;
pub use providers::ollama::OllamaProvider;
pub use providers::{resolve_backend, BackendChoice};
pub use translators::libretranslate::LibreTranslateTranslator;
pub use translators::llm::LlmTranslator;
pub use translators::{CachedTranslator, PassthroughTranslator};
