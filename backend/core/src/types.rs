use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Academic domain detected from the problem text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Math,
    Physics,
    Chemistry,
    Biology,
    #[default]
    Unknown,
}

impl Subject {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Math => "Mathematics",
            Self::Physics => "Physics",
            Self::Chemistry => "Chemistry",
            Self::Biology => "Biology",
            Self::Unknown => "General",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Writing system used to check that a reply honours the session language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    Latin,
    Devanagari,
    Kannada,
    Tamil,
    Telugu,
}

impl Script {
    /// Script of a single character, `None` for digits, punctuation and symbols.
    pub fn of(c: char) -> Option<Script> {
        match c as u32 {
            0x0041..=0x005A | 0x0061..=0x007A | 0x00C0..=0x024F => Some(Script::Latin),
            0x0900..=0x097F => Some(Script::Devanagari),
            0x0B80..=0x0BFF => Some(Script::Tamil),
            0x0C00..=0x0C7F => Some(Script::Telugu),
            0x0C80..=0x0CFF => Some(Script::Kannada),
            _ => None,
        }
    }
}

/// Target language for tutor replies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
    Kn,
    Ta,
    Te,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::En,
        Language::Hi,
        Language::Kn,
        Language::Ta,
        Language::Te,
    ];

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Hi => "hi",
            Self::Kn => "kn",
            Self::Ta => "ta",
            Self::Te => "te",
        }
    }

    /// English name, as used inside prompts.
    pub fn english_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "Hindi",
            Self::Kn => "Kannada",
            Self::Ta => "Tamil",
            Self::Te => "Telugu",
        }
    }

    /// Name shown in language pickers.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Hi => "Hindi (हिन्दी)",
            Self::Kn => "Kannada (ಕನ್ನಡ)",
            Self::Ta => "Tamil (தமிழ்)",
            Self::Te => "Telugu (తెలుగు)",
        }
    }

    pub fn script(&self) -> Script {
        match self {
            Self::En => Script::Latin,
            Self::Hi => Script::Devanagari,
            Self::Kn => Script::Kannada,
            Self::Ta => Script::Tamil,
            Self::Te => Script::Telugu,
        }
    }

    /// Short reminder appended to every tutor directive.
    pub fn reply_reminder(&self) -> &'static str {
        match self {
            Self::En => "Please respond in English.",
            Self::Hi => "Kripaya Hindi mein jawab dein. (Please respond in Hindi.)",
            Self::Kn => "Dayavittu Kannada nalli uttara nidi. (Please respond in Kannada.)",
            Self::Ta => "Thayavu seithu Tamil-il padhil kodunga. (Please respond in Tamil.)",
            Self::Te => "Dayachesi Telugu lo spaandhinchandi. (Please respond in Telugu.)",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    /// Accepts either the ISO code or the English name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.code() == wanted || lang.english_name().to_lowercase() == wanted)
            .ok_or_else(|| format!("unsupported language '{s}' (use en, hi, kn, ta or te)"))
    }
}

/// Pedagogical strategy for the next tutor reply.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Scaffolded,
    Socratic,
    DeepProbe,
    Hint,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Scaffolded => "SCAFFOLDED",
            Self::Socratic => "SOCRATIC",
            Self::DeepProbe => "DEEP PROBE",
            Self::Hint => "HINT",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Who produced a turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Student,
    Tutor,
}

/// Comprehension band shown next to the meter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    NeedsHelp,
    Beginner,
    Developing,
    Proficient,
    Expert,
}

impl Badge {
    pub fn for_score(score: u8) -> Self {
        match score {
            85.. => Badge::Expert,
            65..=84 => Badge::Proficient,
            45..=64 => Badge::Developing,
            25..=44 => Badge::Beginner,
            _ => Badge::NeedsHelp,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NeedsHelp => "Needs Help",
            Self::Beginner => "Beginner",
            Self::Developing => "Developing",
            Self::Proficient => "Proficient",
            Self::Expert => "Expert",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_parses_codes_and_names() {
        assert_eq!("hi".parse::<Language>().unwrap(), Language::Hi);
        assert_eq!("Tamil".parse::<Language>().unwrap(), Language::Ta);
        assert_eq!(" TE ".parse::<Language>().unwrap(), Language::Te);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn language_serializes_as_code() {
        let json = serde_json::to_string(&Language::Kn).unwrap();
        assert_eq!(json, "\"kn\"");
    }

    #[test]
    fn script_detection_by_block() {
        assert_eq!(Script::of('a'), Some(Script::Latin));
        assert_eq!(Script::of('क'), Some(Script::Devanagari));
        assert_eq!(Script::of('ಕ'), Some(Script::Kannada));
        assert_eq!(Script::of('க'), Some(Script::Tamil));
        assert_eq!(Script::of('క'), Some(Script::Telugu));
        assert_eq!(Script::of('7'), None);
        assert_eq!(Script::of('?'), None);
    }

    #[test]
    fn badge_bands() {
        assert_eq!(Badge::for_score(100), Badge::Expert);
        assert_eq!(Badge::for_score(85), Badge::Expert);
        assert_eq!(Badge::for_score(70), Badge::Proficient);
        assert_eq!(Badge::for_score(50), Badge::Developing);
        assert_eq!(Badge::for_score(30), Badge::Beginner);
        assert_eq!(Badge::for_score(0), Badge::NeedsHelp);
    }
}
