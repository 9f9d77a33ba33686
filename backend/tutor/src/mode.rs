//! Mode selection. Pure functions of (score, consecutive wrong answers).

use vani_core::{HINT_STREAK_FLOOR, Mode, ModePolicy};

/// First matching arm wins. Hint never fires below the escalation floor,
/// whatever the policy says.
pub fn select_mode(policy: &ModePolicy, score: u8, consecutive_wrong: u32) -> Mode {
    let hint_streak = policy.hint_streak.max(HINT_STREAK_FLOOR);
    match (score, consecutive_wrong) {
        (_, wrong) if wrong >= hint_streak => Mode::Hint,
        (score, _) if score >= policy.deep_probe_score => Mode::DeepProbe,
        (score, _) if score >= policy.socratic_score => Mode::Socratic,
        _ => Mode::Scaffolded,
    }
}

/// UI signal only; the session carries on after mastery.
pub fn is_mastered(policy: &ModePolicy, score: u8, consecutive_wrong: u32) -> bool {
    score >= policy.mastery_score && consecutive_wrong == 0
}
