//! Subject detection.
//!
//! A fixed rule table, checked in priority order; the first subject with any
//! keyword in the text wins. A keyword matches as a whole word, case
//! insensitive, with an optional plural `s`/`es`. Digits may touch it, so
//! "5kg" still counts, but letters may not: "anatomy" is not "atom".

use std::sync::LazyLock;

use regex::Regex;
use vani_core::Subject;

const MATH: &[&str] = &[
    "algebra",
    "geometry",
    "trigonometry",
    "calculus",
    "integral",
    "integrate",
    "derivative",
    "differentiate",
    "polynomial",
    "quadratic",
    "linear equation",
    "simultaneous",
    "matrix",
    "logarithm",
    "probability",
    "percentage",
    "numerator",
    "denominator",
    "perimeter",
    "area of",
    "triangle",
    "rectangle",
    "circle",
    "hypotenuse",
    "theorem",
    "square root",
    "prime number",
];

const PHYSICS: &[&str] = &[
    "force",
    "velocity",
    "acceleration",
    "newton",
    "gravity",
    "momentum",
    "energy",
    "work done",
    "power",
    "mass",
    "wave",
    "frequency",
    "current",
    "voltage",
    "resistance",
    "ohm",
    "friction",
    "pressure",
    "displacement",
    "inertia",
    "torque",
    "refraction",
    "joule",
    "watt",
    "m/s",
    "kg",
];

const CHEMISTRY: &[&str] = &[
    "atom",
    "molecule",
    "chemical",
    "reaction",
    "element",
    "compound",
    "acid",
    "alkali",
    "mole",
    "molar",
    "periodic",
    "electron",
    "proton",
    "isotope",
    "valency",
    "covalent",
    "ionic",
    "catalyst",
    "titration",
    "oxidation",
    "electrolysis",
];

const BIOLOGY: &[&str] = &[
    "cells",
    "cell wall",
    "cell membrane",
    "organism",
    "dna",
    "genes",
    "genetic",
    "chromosome",
    "photosynthesis",
    "respiration",
    "ecosystem",
    "evolution",
    "mitosis",
    "meiosis",
    "enzyme",
    "tissue",
    "bacteria",
    "digestion",
];

const RULES: &[(Subject, &[&str])] = &[
    (Subject::Math, MATH),
    (Subject::Physics, PHYSICS),
    (Subject::Chemistry, CHEMISTRY),
    (Subject::Biology, BIOLOGY),
];

static PATTERNS: LazyLock<Vec<(Subject, Regex)>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|(subject, keywords)| {
            let alternatives: Vec<String> = keywords.iter().map(|kw| regex::escape(kw)).collect();
            let pattern = format!(
                r"(?i)(?:^|[^\p{{L}}])(?:{})(?:s|es)?(?:$|[^\p{{L}}])",
                alternatives.join("|")
            );
            (*subject, Regex::new(&pattern).expect("keyword pattern"))
        })
        .collect()
});

/// Classify extracted problem text. Total and deterministic.
pub fn classify(text: &str) -> Subject {
    PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(subject, _)| *subject)
        .unwrap_or(Subject::Unknown)
}

/// Whether `text` names any keyword of `subject`; never for `Unknown`.
pub fn mentions(subject: Subject, text: &str) -> bool {
    PATTERNS
        .iter()
        .find(|(s, _)| *s == subject)
        .is_some_and(|(_, re)| re.is_match(text))
}
