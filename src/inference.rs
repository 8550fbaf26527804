use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use tracing::debug;

/// How a missing source language may be guessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferVia {
    /// Never guess.
    Off,
    /// Reuse the previous turn's source language only.
    Last,
    /// Ask the detector.
    #[default]
    Detect,
    /// Previous turn first, then the detector.
    Auto,
}

impl InferVia {
    pub fn uses_last(self) -> bool {
        matches!(self, InferVia::Last | InferVia::Auto)
    }

    pub fn uses_detector(self) -> bool {
        matches!(self, InferVia::Detect | InferVia::Auto)
    }
}

impl FromStr for InferVia {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "off" | "no" => Ok(InferVia::Off),
            "last" => Ok(InferVia::Last),
            "detect" => Ok(InferVia::Detect),
            "auto" => Ok(InferVia::Auto),
            other => Err(format!(
                "unknown infer policy '{}' (expected off, last, detect or auto)",
                other
            )),
        }
    }
}

/// Guesses a language for a set of words. `None` means "no single answer".
pub trait Detector {
    fn detect(&self, words: &[String]) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Script {
    Latin,
    Cyrillic,
    Greek,
    Armenian,
    Georgian,
    Arabic,
    Hebrew,
    Devanagari,
    Thai,
    Hangul,
    Kana,
    Han,
}

fn script_of(ch: char) -> Option<Script> {
    let script = match ch as u32 {
        0x0041..=0x005A | 0x0061..=0x007A | 0x00C0..=0x024F | 0x1E00..=0x1EFF => Script::Latin,
        0x0370..=0x03FF | 0x1F00..=0x1FFF => Script::Greek,
        0x0400..=0x052F => Script::Cyrillic,
        0x0530..=0x058F => Script::Armenian,
        0x0590..=0x05FF => Script::Hebrew,
        0x0600..=0x06FF | 0x0750..=0x077F => Script::Arabic,
        0x0900..=0x097F => Script::Devanagari,
        0x0E00..=0x0E7F => Script::Thai,
        0x10A0..=0x10FF => Script::Georgian,
        0x1100..=0x11FF | 0xAC00..=0xD7AF => Script::Hangul,
        0x3040..=0x30FF => Script::Kana,
        0x4E00..=0x9FFF | 0x3400..=0x4DBF => Script::Han,
        _ => return None,
    };
    Some(script)
}

fn script_of_lang(code: &str) -> Script {
    match code {
        "ru" | "uk" | "be" | "bg" | "sr" | "mk" | "kk" | "ky" | "mn" | "tg" => Script::Cyrillic,
        "el" | "grc" => Script::Greek,
        "hy" => Script::Armenian,
        "ka" => Script::Georgian,
        "ar" | "fa" | "ur" | "ps" => Script::Arabic,
        "he" | "yi" => Script::Hebrew,
        "hi" | "mr" | "ne" | "sa" => Script::Devanagari,
        "th" => Script::Thai,
        "ko" => Script::Hangul,
        "ja" => Script::Kana,
        "zh" => Script::Han,
        _ => Script::Latin,
    }
}

/// Script first, then the configured per-language alphabets.
#[derive(Debug, Clone)]
pub struct ScriptDetector {
    langs: Vec<String>,
    alphabets: HashMap<String, HashSet<char>>,
}

impl ScriptDetector {
    pub fn new(langs: &[String], alphabets: &HashMap<String, String>) -> Self {
        Self {
            langs: langs.to_vec(),
            alphabets: alphabets
                .iter()
                .map(|(lang, chars)| {
                    let alphabet = chars.chars().flat_map(char::to_lowercase).collect();
                    (lang.clone(), alphabet)
                })
                .collect(),
        }
    }

    fn dominant_script(words: &[String]) -> Option<Script> {
        let mut counts: HashMap<Script, usize> = HashMap::new();
        for ch in words.iter().flat_map(|word| word.chars()) {
            if let Some(script) = script_of(ch) {
                *counts.entry(script).or_insert(0) += 1;
            }
        }
        // Kanji mixed with kana is still Japanese.
        if counts.contains_key(&Script::Kana) {
            return Some(Script::Kana);
        }
        let mut ranked = counts.into_iter().collect::<Vec<_>>();
        ranked.sort_by(|left, right| right.1.cmp(&left.1));
        match ranked.as_slice() {
            [] => None,
            [(script, _)] => Some(*script),
            [(first, top), (_, second), ..] if top > second => Some(*first),
            _ => None,
        }
    }
}

impl Detector for ScriptDetector {
    fn detect(&self, words: &[String]) -> Option<String> {
        let script = Self::dominant_script(words)?;
        let candidates = self
            .langs
            .iter()
            .filter(|lang| script_of_lang(lang) == script)
            .collect::<Vec<_>>();
        if let [only] = candidates.as_slice() {
            return Some((*only).clone());
        }

        let special = words
            .iter()
            .flat_map(|word| word.chars())
            .filter(|ch| ch.is_alphabetic() && !ch.is_ascii())
            .flat_map(char::to_lowercase)
            .collect::<HashSet<_>>();
        if special.is_empty() {
            return None;
        }
        let matching = candidates
            .into_iter()
            .filter(|lang| {
                self.alphabets
                    .get(lang.as_str())
                    .map(|alphabet| special.is_subset(alphabet))
                    .unwrap_or(false)
            })
            .collect::<Vec<_>>();
        match matching.as_slice() {
            [only] => Some((*only).clone()),
            _ => None,
        }
    }
}

/// Thin wrapper that keeps detector answers inside the configured languages.
pub struct LanguageInferrer<'a> {
    detector: &'a dyn Detector,
    langs: &'a [String],
}

impl<'a> LanguageInferrer<'a> {
    pub fn new(detector: &'a dyn Detector, langs: &'a [String]) -> Self {
        Self { detector, langs }
    }

    pub fn infer(&self, words: &[String]) -> Option<String> {
        if words.is_empty() {
            return None;
        }
        let guess = self.detector.detect(words)?;
        if !self.langs.contains(&guess) {
            debug!("inference: ignoring unconfigured language {}", guess);
            return None;
        }
        debug!("inference: {:?} -> {}", words, guess);
        Some(guess)
    }
}
