//! Per-problem tutoring state.
//!
//! A `Session` is an owned value: the controller borrows it mutably for one
//! turn at a time and nothing else holds a reference to it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use vani_core::{Badge, Language, Mode, ModePolicy, ScoringSettings, Speaker, Subject, TutorError};

use crate::classifier::classify;
use crate::comprehension::Judgement;
use crate::mode::{is_mastered, select_mode};

/// One utterance in the transcript. Immutable once appended.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Turn {
    speaker: Speaker,
    text: String,
    at: DateTime<Utc>,
    /// Set on judged student turns.
    #[serde(skip_serializing_if = "Option::is_none")]
    judgement: Option<Judgement>,
}

impl Turn {
    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn at(&self) -> DateTime<Utc> {
        self.at
    }

    pub fn judgement(&self) -> Option<&Judgement> {
        self.judgement.as_ref()
    }
}

/// Active state of one tutoring conversation.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    problem_text: String,
    subject: Subject,
    language: Language,
    turns: Vec<Turn>,
    comprehension_score: u8,
    consecutive_wrong: u32,
    /// Judged student turns so far.
    attempts: u32,
    policy: ModePolicy,
    created_at: DateTime<Utc>,
}

impl Session {
    /// Opens a session for freshly extracted problem text.
    ///
    /// Whitespace-only text is rejected before anything is classified.
    pub fn new(
        problem_text: &str,
        language: Language,
        initial_score: u8,
        policy: ModePolicy,
    ) -> Result<Self, TutorError> {
        let problem_text = problem_text.trim();
        if problem_text.is_empty() {
            return Err(TutorError::NoProblemDetected);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            problem_text: problem_text.to_string(),
            subject: classify(problem_text),
            language,
            turns: Vec::new(),
            comprehension_score: initial_score.min(100),
            consecutive_wrong: 0,
            attempts: 0,
            policy: ModePolicy::new(
                policy.hint_streak,
                policy.deep_probe_score,
                policy.socratic_score,
                policy.mastery_score,
            ),
            created_at: Utc::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn problem_text(&self) -> &str {
        &self.problem_text
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Takes effect from the next tutor reply on.
    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn comprehension_score(&self) -> u8 {
        self.comprehension_score
    }

    pub fn consecutive_wrong(&self) -> u32 {
        self.consecutive_wrong
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn policy(&self) -> &ModePolicy {
        &self.policy
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Derived on every call, never stored.
    pub fn mode(&self) -> Mode {
        select_mode(&self.policy, self.comprehension_score, self.consecutive_wrong)
    }

    pub fn is_mastered(&self) -> bool {
        is_mastered(&self.policy, self.comprehension_score, self.consecutive_wrong)
    }

    pub fn badge(&self) -> Badge {
        Badge::for_score(self.comprehension_score)
    }

    pub fn last_tutor_turn(&self) -> Option<&Turn> {
        self.turns.iter().rev().find(|t| t.speaker == Speaker::Tutor)
    }

    // -----------------------------------------------------------------------
    // Mutation, controller only
    // -----------------------------------------------------------------------

    pub(crate) fn append(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.turns.push(Turn {
            speaker,
            text: text.into(),
            at: Utc::now(),
            judgement: None,
        });
    }

    /// Appends a student turn together with the verdict it earned.
    pub(crate) fn append_judged(&mut self, text: impl Into<String>, judgement: Judgement) {
        self.turns.push(Turn {
            speaker: Speaker::Student,
            text: text.into(),
            at: Utc::now(),
            judgement: Some(judgement),
        });
    }

    /// Applies a heuristic verdict as a clamped delta. Returns the new score.
    pub(crate) fn record_judgement(&mut self, correct: bool, scoring: &ScoringSettings) -> u8 {
        self.attempts += 1;
        if correct {
            self.comprehension_score = self.comprehension_score.saturating_add(scoring.step_up).min(100);
            self.consecutive_wrong = 0;
        } else {
            self.comprehension_score = self.comprehension_score.saturating_sub(scoring.step_down);
            self.consecutive_wrong += 1;
        }
        self.comprehension_score
    }

    /// Replaces the score with an already blended value, clamped.
    pub(crate) fn set_blended_score(&mut self, score: u8) {
        self.comprehension_score = score.min(100);
    }
}
