//! Comprehension meter.
//!
//! Judges each student reply with offline keyword heuristics and moves the
//! session score by a fixed step. An optional backend opinion can be blended
//! in afterwards; the correct/incorrect verdict always stays heuristic.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vani_core::ScoringSettings;

use crate::classifier::mentions;
use crate::session_state::Session;

const CONFUSION_MARKERS: &[&str] = &[
    "dont know",
    "do not know",
    "not sure",
    "confused",
    "no idea",
    "dont understand",
    "do not understand",
    "dont get",
    "i give up",
    "idk",
    "no clue",
];

const REASONING_MARKERS: &[&str] = &["because", "therefore", "so", "equals", "formula", "thus", "since"];

const STOPWORDS: &[&str] = &[
    "about", "after", "also", "because", "before", "could", "does", "each", "find", "from", "give",
    "given", "have", "here", "into", "just", "know", "like", "many", "more", "much", "next",
    "only", "other", "should", "some", "step", "than", "that", "their", "them", "then", "there",
    "these", "they", "think", "this", "what", "when", "where", "which", "while", "will", "with",
    "would", "your",
];

/// Outcome of judging one student turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Judgement {
    pub correct: bool,
    /// Score after the heuristic step.
    pub heuristic_score: u8,
    /// Backend opinion, when assisted scoring produced a usable one.
    pub backend_score: Option<u8>,
    /// Score the session ended up with.
    pub score: u8,
}

pub struct ComprehensionEstimator {
    scoring: ScoringSettings,
}

impl ComprehensionEstimator {
    pub fn new(scoring: ScoringSettings) -> Self {
        Self { scoring }
    }

    pub fn scoring(&self) -> &ScoringSettings {
        &self.scoring
    }

    /// Judges `student_turn` against the session and applies the step.
    /// Returns `(new_score, judged_correct)`.
    pub fn update(&self, session: &mut Session, student_turn: &str) -> (u8, bool) {
        let correct = self.judge(session, student_turn);
        let score = session.record_judgement(correct, &self.scoring);
        debug!(correct, score, wrong = session.consecutive_wrong(), "student turn judged");
        (score, correct)
    }

    /// Heuristic verdict only; does not touch the session.
    pub fn judge(&self, session: &Session, student_turn: &str) -> bool {
        let normalized = normalize(student_turn);
        let tokens: Vec<&str> = normalized.split_whitespace().collect();

        if is_too_short(&tokens) || is_confused(&normalized) || is_bare_question(student_turn, &tokens) {
            return false;
        }

        let expected = expected_terms(session);
        let names_expected =
            tokens.iter().any(|t| expected.contains(*t)) || mentions(session.subject(), student_turn);
        let states_number = tokens.iter().any(|t| t.chars().any(char::is_numeric));
        let reasons = student_turn.contains('=') || tokens.iter().any(|t| REASONING_MARKERS.contains(t));

        names_expected || states_number || reasons
    }

    /// Folds a backend score into the session's heuristic score.
    pub fn blend_into(&self, session: &mut Session, backend_score: u8) -> u8 {
        let blended = blend(
            session.comprehension_score(),
            backend_score,
            self.scoring.heuristic_weight,
        );
        session.set_blended_score(blended);
        blended
    }
}

/// `round(w * heuristic + (1 - w) * backend)`, clamped to [0, 100].
pub fn blend(heuristic: u8, backend: u8, weight: f32) -> u8 {
    let w = weight.clamp(0.0, 1.0);
    let mixed = w * f32::from(heuristic) + (1.0 - w) * f32::from(backend);
    mixed.round().clamp(0.0, 100.0) as u8
}

#[derive(Deserialize)]
struct Evaluation {
    score: f64,
    #[serde(default)]
    feedback: Option<String>,
}

/// Pulls `{"score": n, ...}` out of a backend reply. Anything malformed or
/// out of range is `None`.
pub fn parse_backend_score(raw: &str) -> Option<u8> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    let evaluation: Evaluation = match serde_json::from_str(&raw[start..=end]) {
        Ok(e) => e,
        Err(e) => {
            warn!(error = %e, "backend evaluation is not valid JSON");
            return None;
        }
    };
    if !(0.0..=100.0).contains(&evaluation.score) {
        warn!(score = evaluation.score, "backend evaluation out of range");
        return None;
    }
    if let Some(feedback) = evaluation.feedback.as_deref() {
        debug!(feedback, "backend evaluation");
    }
    Some(evaluation.score.round() as u8)
}

/// Lowercase, apostrophes dropped, other punctuation turned into spaces.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        match c {
            '\'' | '’' | '‘' | '`' => {}
            c if c.is_ascii_punctuation() || matches!(c, '।' | '？' | '！' | '。' | '，' | '“' | '”') => {
                out.push(' ')
            }
            c => out.push(c),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_too_short(tokens: &[&str]) -> bool {
    match tokens {
        [] => true,
        [only] => !only.chars().any(char::is_numeric) && only.chars().count() < 2,
        _ => false,
    }
}

fn is_confused(normalized: &str) -> bool {
    let padded = format!(" {normalized} ");
    CONFUSION_MARKERS
        .iter()
        .any(|marker| padded.contains(&format!(" {marker} ")))
}

fn is_bare_question(raw: &str, tokens: &[&str]) -> bool {
    let trimmed = raw.trim_end();
    (trimmed.ends_with('?') || trimmed.ends_with('？')) && tokens.len() <= 3
}

/// Content words of the last tutor question and of the problem text.
fn expected_terms(session: &Session) -> HashSet<String> {
    let tutor = session.last_tutor_turn().map(|t| t.text()).unwrap_or_default();
    [tutor, session.problem_text()]
        .iter()
        .flat_map(|text| {
            normalize(text)
                .split_whitespace()
                .filter(|w| w.chars().count() >= 4 && !STOPWORDS.contains(w))
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}
