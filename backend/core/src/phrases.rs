//! Localized labels for the presentation layer.
//!
//! Lookups never fail: a missing translation falls back to English.

use crate::types::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phrase {
    TutorSays,
    YourAnswer,
    ComprehensionMeter,
    ExtractedQuestion,
    NewSession,
}

pub fn phrase(key: Phrase, lang: Language) -> &'static str {
    localized(key, lang).unwrap_or_else(|| english(key))
}

fn english(key: Phrase) -> &'static str {
    match key {
        Phrase::TutorSays => "Vani says",
        Phrase::YourAnswer => "Your Answer",
        Phrase::ComprehensionMeter => "Comprehension Meter",
        Phrase::ExtractedQuestion => "Extracted Question",
        Phrase::NewSession => "New Session",
    }
}

fn localized(key: Phrase, lang: Language) -> Option<&'static str> {
    use Language::{En, Hi, Kn, Ta, Te};
    let text = match (key, lang) {
        (_, En) => return None,
        (Phrase::TutorSays, Hi) => "वाणी कहती है",
        (Phrase::TutorSays, Kn) => "ವಾಣಿ ಹೇಳುತ್ತಾಳೆ",
        (Phrase::TutorSays, Ta) => "வாணி சொல்கிறார்",
        (Phrase::TutorSays, Te) => "వాణి చెప్తోంది",
        (Phrase::YourAnswer, Hi) => "आपका उत्तर",
        (Phrase::YourAnswer, Kn) => "ನಿಮ್ಮ ಉತ್ತರ",
        (Phrase::YourAnswer, Ta) => "உங்கள் பதில்",
        (Phrase::YourAnswer, Te) => "మీ సమాధానం",
        (Phrase::ComprehensionMeter, Hi) => "समझ मीटर",
        (Phrase::ComprehensionMeter, Kn) => "ಅರ್ಥಗ್ರಹಣ ಮೀಟರ್",
        (Phrase::ComprehensionMeter, Ta) => "புரிதல் மீட்டர்",
        (Phrase::ComprehensionMeter, Te) => "అర్థం మీటర్",
        (Phrase::ExtractedQuestion, Hi) => "निकाला गया प्रश्न",
        (Phrase::ExtractedQuestion, Kn) => "ಹೊರತೆಗೆದ ಪ್ರಶ್ನೆ",
        (Phrase::ExtractedQuestion, Ta) => "பிரித்தெடுக்கப்பட்ட கேள்வி",
        (Phrase::ExtractedQuestion, Te) => "సంగ్రహించిన ప్రశ్న",
        (Phrase::NewSession, Hi) => "नया सत्र",
        (Phrase::NewSession, Kn) => "ಹೊಸ ಅಧಿವೇಶನ",
        (Phrase::NewSession, Ta) => "புதிய அமர்வு",
        (Phrase::NewSession, Te) => "కొత్త సెషన్",
    };
    Some(text)
}
