/*!
 * Language gate deciding whether a text needs translation at all.
 *
 * Two checks run before any provider call:
 * - the record's locale hint (e.g. a free-text "location" column) is matched
 *   against target-locale markers such as "united states";
 * - the text itself is classified, and text already in the target language
 *   is passed through.
 *
 * Classification is advisory. A wrong answer costs one API call, so every
 * classifier failure is treated as "needs translation".
 */

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::errors::ClassificationError;
use crate::language_utils::language_codes_match;

/// Language identification contract
pub trait LanguageClassifier: Send + Sync + Debug {
    /// Return the ISO 639-1 code of the language the text is written in
    fn classify(&self, text: &str) -> Result<String, ClassificationError>;
}

/// Non-Latin scripts that identify a language on their own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Script {
    Latin,
    Hangul,
    Kana,
    Han,
    Cyrillic,
    Greek,
    Arabic,
    Hebrew,
    Devanagari,
    Thai,
}

impl Script {
    fn of(c: char) -> Option<Self> {
        let script = match c as u32 {
            0x0041..=0x024F if c.is_alphabetic() => Self::Latin,
            0x0370..=0x03FF => Self::Greek,
            0x0400..=0x04FF => Self::Cyrillic,
            0x0590..=0x05FF => Self::Hebrew,
            0x0600..=0x06FF | 0x0750..=0x077F => Self::Arabic,
            0x0900..=0x097F => Self::Devanagari,
            0x0E00..=0x0E7F => Self::Thai,
            0x3040..=0x30FF => Self::Kana,
            0x4E00..=0x9FFF | 0x3400..=0x4DBF => Self::Han,
            0xAC00..=0xD7AF | 0x1100..=0x11FF => Self::Hangul,
            _ => return None,
        };
        Some(script)
    }

    fn language(self) -> Option<&'static str> {
        match self {
            Self::Latin => None,
            Self::Hangul => Some("ko"),
            Self::Kana => Some("ja"),
            Self::Han => Some("zh"),
            Self::Cyrillic => Some("ru"),
            Self::Greek => Some("el"),
            Self::Arabic => Some("ar"),
            Self::Hebrew => Some("he"),
            Self::Devanagari => Some("hi"),
            Self::Thai => Some("th"),
        }
    }
}

// The winner needs at least 3 hits for every 2 of the runner-up
const MIN_LEAD_NUMERATOR: usize = 3;
const MIN_LEAD_DENOMINATOR: usize = 2;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{L}+").expect("valid word regex"));

/// Stop-word profiles for Latin-script languages
static STOPWORD_PROFILES: LazyLock<Vec<(&'static str, HashSet<&'static str>)>> = LazyLock::new(|| {
    let profiles: [(&str, &[&str]); 7] = [
        ("en", &[
            "the", "and", "is", "are", "was", "were", "it", "this", "that", "to", "of", "in",
            "for", "with", "on", "not", "but", "very", "good", "great", "works", "well", "hello",
            "thanks", "thank", "you", "product", "my", "i", "an", "be", "have", "has",
            "would", "will", "they", "bad", "love", "excellent", "nice", "quality", "recommend",
        ]),
        ("fr", &[
            "le", "la", "les", "un", "une", "des", "est", "et", "très", "pas", "ne", "je", "il",
            "elle", "nous", "vous", "pour", "avec", "sur", "du", "au", "aux", "mais", "produit", "en",
            "bon", "bonne", "bonjour", "merci", "qui", "que", "ce", "cette", "marche", "bien",
        ]),
        ("de", &[
            "der", "die", "das", "und", "ist", "nicht", "ich", "sie", "es", "ein", "eine", "mit",
            "für", "auf", "sehr", "gut", "aber", "zu", "den", "dem", "hallo", "danke", "produkt",
            "funktioniert", "wie", "in", "was",
        ]),
        ("es", &[
            "el", "los", "las", "y", "es", "muy", "no", "con", "para", "por", "pero", "del",
            "bueno", "buena", "hola", "gracias", "producto", "está", "funciona", "lo", "en",
        ]),
        ("it", &[
            "il", "gli", "è", "molto", "non", "con", "per", "ma", "che", "di", "buono", "buona",
            "ciao", "grazie", "prodotto", "sono", "funziona", "questo", "in",
        ]),
        ("pt", &[
            "o", "os", "as", "é", "muito", "não", "um", "uma", "com", "mas", "do", "da", "bom",
            "boa", "olá", "obrigado", "obrigada", "produto", "funciona", "isso",
        ]),
        ("nl", &[
            "het", "een", "en", "niet", "ik", "zeer", "erg", "goed", "met", "voor", "op", "maar",
            "van", "dat", "hallo", "bedankt", "werkt", "heel", "is", "in", "was", "product", "dit",
            "niets", "slecht",
        ]),
    ];

    profiles
        .into_iter()
        .map(|(code, words)| (code, words.iter().copied().collect()))
        .collect()
});

/// Script and stop-word based classifier
///
/// Good enough for gating short review texts; not a general-purpose detector.
#[derive(Debug, Default, Clone)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    /// Create a new heuristic classifier
    pub fn new() -> Self {
        Self
    }

    fn dominant_script(text: &str) -> Option<Script> {
        let mut counts: HashMap<Script, usize> = HashMap::new();
        for script in text.chars().filter_map(Script::of) {
            *counts.entry(script).or_default() += 1;
        }

        // Japanese mixes kana with kanji; any kana decides it.
        if counts.contains_key(&Script::Kana) {
            return Some(Script::Kana);
        }

        counts.into_iter().max_by_key(|(_, n)| *n).map(|(s, _)| s)
    }

    fn score_latin(text: &str) -> Result<&'static str, ClassificationError> {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = WORD_RE.find_iter(&lowered).map(|m| m.as_str()).collect();

        let mut scores: Vec<(&'static str, usize)> = STOPWORD_PROFILES
            .iter()
            .map(|(code, profile)| (*code, words.iter().filter(|w| profile.contains(*w)).count()))
            .collect();
        scores.sort_by(|a, b| b.1.cmp(&a.1));

        match scores.as_slice() {
            [(_, 0), ..] | [] => Err(ClassificationError::Undetermined("no known words".to_string())),
            [(a, best), (b, second), ..]
                if best * MIN_LEAD_DENOMINATOR < second * MIN_LEAD_NUMERATOR =>
            {
                Err(ClassificationError::Undetermined(format!(
                    "no clear lead: {} {} vs {} {}",
                    a, best, b, second
                )))
            }
            [(code, _), ..] => Ok(*code),
        }
    }
}

impl LanguageClassifier for HeuristicClassifier {
    fn classify(&self, text: &str) -> Result<String, ClassificationError> {
        let script = Self::dominant_script(text).ok_or(ClassificationError::EmptyText)?;

        match script.language() {
            Some(code) => Ok(code.to_string()),
            None => Self::score_latin(text).map(str::to_string),
        }
    }
}

/// Decides per text whether a provider call is needed
#[derive(Debug)]
pub struct LanguageGate {
    classifier: Box<dyn LanguageClassifier>,
    target_language: String,
    locale_markers: Vec<String>,
}

impl LanguageGate {
    /// Create a gate with an explicit classifier and locale markers
    pub fn new(
        classifier: Box<dyn LanguageClassifier>,
        target_language: impl Into<String>,
        locale_markers: &[String],
    ) -> Self {
        Self {
            classifier,
            target_language: target_language.into(),
            locale_markers: locale_markers
                .iter()
                .map(|m| m.trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    /// Create a gate using the heuristic classifier and the "united states" marker
    pub fn with_defaults(target_language: impl Into<String>) -> Self {
        Self::new(
            Box::new(HeuristicClassifier::new()),
            target_language,
            &["united states".to_string()],
        )
    }

    /// The configured target language
    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Check whether a record's locale hint points at the target locale
    pub fn locale_matches(&self, hint: Option<&str>) -> bool {
        let Some(hint) = hint else {
            return false;
        };
        let hint = hint.to_lowercase();
        self.locale_markers.iter().any(|marker| hint.contains(marker.as_str()))
    }

    /// Classify the language of a text
    pub fn classify(&self, text: &str) -> Result<String, ClassificationError> {
        self.classifier.classify(text)
    }

    /// Check whether a language code denotes the target language
    pub fn is_target_language(&self, code: &str) -> bool {
        language_codes_match(code, &self.target_language)
    }

    /// Decide whether a text must be sent to the provider
    pub fn needs_translation(&self, text: &str) -> bool {
        match self.classify(text) {
            Ok(detected) => !self.is_target_language(&detected),
            Err(e) => {
                debug!("Classification failed, translating anyway: {}", e);
                true
            }
        }
    }
}
