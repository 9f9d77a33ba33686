//! Terminal output: ANSI styling, notes, and the comprehension meter.

use std::io::Write;

use vani_core::{phrase, Badge, Language, Mode, Phrase};

// ---------------------------------------------------------------------------
// ANSI Color/Style helpers
// ---------------------------------------------------------------------------

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const DIM: &str = "\x1b[2m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const MAGENTA: &str = "\x1b[35m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM").map(|t| t != "dumb").unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn styled(style: &str, text: &str) -> String {
    if supports_color() {
        format!("{style}{text}{RESET}")
    } else {
        text.to_string()
    }
}

// ---------------------------------------------------------------------------
// Formatted notes
// ---------------------------------------------------------------------------

pub fn note_info(msg: &str) {
    if supports_color() {
        println!("{CYAN}{BOLD}ℹ{RESET} {msg}");
    } else {
        println!("INFO: {msg}");
    }
}

pub fn note_warn(msg: &str) {
    if supports_color() {
        println!("{YELLOW}{BOLD}⚠{RESET} {msg}");
    } else {
        println!("WARN: {msg}");
    }
}

pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

pub fn note_success(msg: &str) {
    if supports_color() {
        println!("{GREEN}{BOLD}✓{RESET} {msg}");
    } else {
        println!("OK: {msg}");
    }
}

// ---------------------------------------------------------------------------
// Tutor panels
// ---------------------------------------------------------------------------

const METER_WIDTH: usize = 20;

/// `[██████████░░░░░░░░░░]  50%  Learning`
pub fn render_meter(score: u8, badge: Badge) -> String {
    let score = score.min(100);
    let filled = usize::from(score) * METER_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%  {}",
        "█".repeat(filled),
        "░".repeat(METER_WIDTH - filled),
        score,
        badge.label()
    )
}

pub fn print_problem(problem: &str, subject: &str, language: Language) {
    println!();
    println!("{}", styled(BOLD, &format!("── {} ──", phrase(Phrase::ExtractedQuestion, language))));
    println!("{problem}");
    println!("{}", styled(DIM, subject));
}

pub fn print_reply(reply: &str, mode: Mode, language: Language) {
    println!();
    let header = format!("{} [{}]", phrase(Phrase::TutorSays, language), mode.label());
    println!("{}", styled(&format!("{MAGENTA}{BOLD}"), &header));
    println!("{reply}");
}

pub fn print_meter(score: u8, badge: Badge, language: Language) {
    println!(
        "{} {}",
        styled(DIM, phrase(Phrase::ComprehensionMeter, language)),
        render_meter(score, badge)
    );
}

pub fn print_dim(msg: &str) {
    println!("{}", styled(DIM, msg));
}

/// Localized input prompt, written without a newline.
pub fn prompt_answer(language: Language) -> std::io::Result<()> {
    let label = format!("\n{} › ", phrase(Phrase::YourAnswer, language));
    stream_write(&mut std::io::stdout(), &styled(CYAN, &label))
}

/// Write a chunk and flush.
pub fn stream_write(writer: &mut impl Write, chunk: &str) -> std::io::Result<()> {
    writer.write_all(chunk.as_bytes())?;
    writer.flush()
}
