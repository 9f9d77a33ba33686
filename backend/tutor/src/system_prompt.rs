//! Prompt composition.
//!
//! Builds the instruction payload for one tutor reply: the Socratic
//! directive, the current mode's modifier, the problem being worked on, the
//! subject and comprehension figure, the language directive, and a bounded
//! window of recent turns. The problem sits in the directive so it survives
//! once the intro turn falls out of the window.

use tracing::debug;
use vani_core::{ChatMessage, GenerationSettings, Language, LlmRequest, Mode, TutorError};

use crate::context_window::ContextWindow;
use crate::session_state::Session;

/// System directive plus conversation window, ready for any backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPayload {
    pub system_prompt: String,
    pub messages: Vec<ChatMessage>,
}

impl PromptPayload {
    pub fn into_request(self, generation: &GenerationSettings) -> LlmRequest {
        LlmRequest {
            model: generation.model.clone(),
            system_prompt: self.system_prompt,
            messages: self.messages,
            max_tokens: generation.max_tokens,
            temperature: generation.temperature,
        }
    }
}

const BEHAVIOR_RULES: &str = "\
BEHAVIOR RULES:
1. NEVER give the final answer or the final numeric result.
2. Ask exactly ONE question per reply.
3. First acknowledge what the student just said, then ask your question.
4. Stay within the subject below.
5. If the student shared several questions, first ask which one they want to work on.
6. Use simple vocabulary appropriate for a school student.
7. Keep replies short: one or two short paragraphs at most.";

/// Per-mode teaching instruction.
pub fn mode_instruction(mode: Mode) -> &'static str {
    match mode {
        Mode::Scaffolded => {
            "The student is struggling. Break the problem into its smallest next sub-step \
             and ask about only that step. Be warm and encouraging."
        }
        Mode::Socratic => {
            "Ask one guiding question that moves the student one step closer to the \
             solution without revealing it."
        }
        Mode::DeepProbe => {
            "The student understands the basics. Ask one question that makes them \
             synthesize the idea or apply it to a new situation."
        }
        Mode::Hint => {
            "The student has answered incorrectly several times. Give one concrete hint \
             that narrows the next step, without stating the final result, then ask one \
             short question."
        }
    }
}

pub struct PromptComposer {
    history_window: usize,
}

impl PromptComposer {
    pub fn new(history_window: usize) -> Self {
        Self { history_window }
    }

    /// Pure with respect to the session. Fails only when there is nothing
    /// to reply to.
    pub fn compose(&self, session: &Session) -> Result<PromptPayload, TutorError> {
        if session.turns().is_empty() {
            return Err(TutorError::EmptyTranscript);
        }
        let window = ContextWindow::build(session.turns(), self.history_window);
        if window.dropped > 0 {
            debug!(session_id = %session.id(), dropped = window.dropped, "older turns left out of prompt");
        }
        Ok(PromptPayload {
            system_prompt: system_directive(session),
            messages: window.messages,
        })
    }
}

fn system_directive(session: &Session) -> String {
    let subject = session.subject().display_name();
    let language = session.language();
    let mode = session.mode();
    format!(
        "You are Vani, a patient offline tutor for {subject}. \
         Your only purpose is to guide the student to the answer through questions.\n\n\
         {BEHAVIOR_RULES}\n\n\
         CURRENT TEACHING MODE: {mode}\n{instruction}\n\n\
         PROBLEM: {problem}\n\
         SUBJECT: {subject}\n\
         STUDENT COMPREHENSION: {score}%\n\n\
         {language_rule}",
        instruction = mode_instruction(mode),
        problem = session.problem_text(),
        score = session.comprehension_score(),
        language_rule = language_directive(language),
    )
}

fn language_directive(language: Language) -> String {
    let name = language.english_name();
    format!(
        "LANGUAGE RULE: Always reply ONLY in {name}, even if the student writes in another \
         language. {}",
        language.reply_reminder()
    )
}

/// First student turn of a session: the problem, wrapped as a request for help.
pub fn intro_message(problem_text: &str, language: Language) -> String {
    format!(
        "I have this question from my textbook or homework:\n\n\"{problem_text}\"\n\n\
         I need help with this in {}. How should we start?",
        language.english_name()
    )
}

const EVALUATOR_PROMPT: &str = "You are a strict but fair exam evaluator. \
     Respond ONLY with valid JSON in the format: {\"score\": <0-100>, \"feedback\": \"<one sentence>\"}";

/// Request asking the backend to score one student reply.
pub fn evaluation_request(
    student_reply: &str,
    concept: &str,
    generation: &GenerationSettings,
) -> LlmRequest {
    let prompt = format!(
        "Evaluate the student's response below for conceptual correctness regarding \
         '{concept}'. Reply with ONLY a JSON object: {{\"score\": <0-100>, \"feedback\": \
         \"<one sentence>\"}}.\n\nStudent response: \"{student_reply}\""
    );
    LlmRequest {
        model: generation.model.clone(),
        system_prompt: EVALUATOR_PROMPT.to_string(),
        messages: vec![ChatMessage::user(prompt)],
        max_tokens: 128,
        temperature: 0.0,
    }
}
