//! Vani tutoring controller
//!
//! Subject detection, the comprehension meter, mode selection, prompt
//! composition and reply validation, tied together by `TutorController`.

pub mod classifier;
pub mod comprehension;
pub mod context_window;
pub mod controller;
pub mod mode;
pub mod session_export;
pub mod session_state;
pub mod system_prompt;
pub mod validator;

pub use classifier::classify;
pub use comprehension::{ComprehensionEstimator, Judgement};
pub use controller::{TurnOutcome, TutorController};
pub use mode::{is_mastered, select_mode};
pub use session_export::{TranscriptFormat, export_transcript, render_html, render_json};
pub use session_state::{Session, Turn};
pub use system_prompt::{PromptComposer, PromptPayload};
pub use validator::{Repair, ResponseValidator, ValidatedReply, canned_reply};
