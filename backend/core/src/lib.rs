pub mod error;
pub mod phrases;
pub mod settings;
pub mod traits;
pub mod types;

pub use error::TutorError;
pub use phrases::{phrase, Phrase};
pub use settings::{
    GenerationSettings, ModePolicy, ScoringSettings, TutorSettings, HINT_STREAK_FLOOR,
};
pub use traits::{ChatMessage, ChatRole, LlmProvider, LlmRequest, LlmResponse, Translator};
pub use types::{Badge, Language, Mode, Script, Speaker, Subject};
