use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

use crate::arguments::{self, GroupBy, Modes, ParsedArgs, fill::FillSources};
use crate::error::{ResolveError, Result};
use crate::inference::{Detector, ScriptDetector};
use crate::mapping::LangMapper;
use crate::outstem::Outstemmer;
use crate::settings::Settings;

/// State carried from one interactive turn to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopContext {
    pub active: bool,
    pub from_lang: Option<String>,
    pub to_langs: Vec<String>,
}

/// A fully specified lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRequest {
    pub from_lang: String,
    /// Empty only when the modes do not require a target.
    pub to_langs: Vec<String>,
    pub words: Vec<String>,
    pub modes: Modes,
    pub group_by: GroupBy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Lookup(ResolvedRequest),
    /// Languages as distributed, for the caller to store.
    ConfigEdit(ParsedArgs),
    LoopToggle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    /// Context to pass into the next call.
    pub context: LoopContext,
}

/// Turns raw tokens plus already-parsed flags into a [`Resolution`].
///
/// Everything is compiled up front; `resolve` only reads `self`, so a
/// failed call leaves nothing behind.
pub struct Resolver {
    settings: Settings,
    outstemmer: Outstemmer,
    mapper: LangMapper,
    detector: Box<dyn Detector>,
}

impl Resolver {
    pub fn new(settings: Settings) -> Result<Self> {
        let outstemmer = Outstemmer::new(settings.outstem.clone())?;
        let mapper = LangMapper::new(&settings.mappings)?;
        let detector = Box::new(ScriptDetector::new(&settings.langs, &settings.alphabets));
        Ok(Self {
            settings,
            outstemmer,
            mapper,
            detector,
        })
    }

    pub fn with_detector(mut self, detector: impl Detector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    pub fn resolve(
        &self,
        raw_tokens: &[String],
        mut parsed: ParsedArgs,
        context: &LoopContext,
    ) -> Result<Resolution> {
        let effective = self.settings.materialize(&parsed);
        parsed.leftover.extend(raw_tokens.iter().cloned());
        parsed.leftover = self.outstemmer.join(&parsed.leftover)?;

        let mut parsed = arguments::distribute(parsed, effective.assume, &self.settings.langs)?;
        parsed.words = self.outstemmer.expand(&parsed.words)?;

        let mut next = context.clone();
        if parsed.loop_toggle {
            next.active = !context.active;
        }

        let sources = FillSources {
            langs: &self.settings.langs,
            infer_via: effective.infer_via,
            detector: self.detector.as_ref(),
        };

        if parsed.is_loop_management() {
            let parsed = arguments::fill(parsed, context, &sources)?;
            next.from_lang = parsed.from_langs.first().cloned();
            next.to_langs = parsed.to_langs;
            info!("loop {}", if next.active { "on" } else { "off" });
            return Ok(Resolution {
                outcome: Outcome::LoopToggle,
                context: next,
            });
        }
        if parsed.config_edit {
            let parsed = arguments::fill(parsed, context, &sources)?;
            return Ok(Resolution {
                outcome: Outcome::ConfigEdit(parsed),
                context: next,
            });
        }

        let mut parsed = arguments::fill(parsed, context, &sources)?;
        if parsed.reverse {
            reverse(&mut parsed)?;
        }
        dedup_in_place(&mut parsed.to_langs);
        parsed.words = self.mapper.apply_cycled(&parsed.from_langs, &parsed.words);

        let request = assemble(parsed, effective.group_by)?;
        info!(
            "resolved: {} -> {:?}: {:?}",
            request.from_lang, request.to_langs, request.words
        );
        next.from_lang = Some(request.from_lang.clone());
        next.to_langs = request.to_langs.clone();
        Ok(Resolution {
            outcome: Outcome::Lookup(request),
            context: next,
        })
    }
}

/// One-shot form of [`Resolver::resolve`].
pub fn resolve(
    raw_tokens: &[String],
    parsed: ParsedArgs,
    context: &LoopContext,
    settings: &Settings,
) -> Result<Resolution> {
    Resolver::new(settings.clone())?.resolve(raw_tokens, parsed, context)
}

/// Swaps the source with the first target.
pub fn reverse(parsed: &mut ParsedArgs) -> Result<()> {
    if parsed.from_langs.is_empty() || parsed.to_langs.is_empty() {
        return Err(ResolveError::InvalidExecution(
            "cannot reverse without a target language".to_string(),
        ));
    }
    std::mem::swap(&mut parsed.from_langs[0], &mut parsed.to_langs[0]);
    debug!(
        "reverse: from={:?} to={:?}",
        parsed.from_langs, parsed.to_langs
    );
    Ok(())
}

fn dedup_in_place(values: &mut Vec<String>) {
    let mut seen = HashSet::new();
    values.retain(|value| seen.insert(value.clone()));
}

fn assemble(parsed: ParsedArgs, group_by: GroupBy) -> Result<ResolvedRequest> {
    if parsed.words.is_empty() {
        return Err(ResolveError::InvalidExecution(
            "nothing to look up: no words given".to_string(),
        ));
    }
    let Some(from_lang) = parsed.from_langs.into_iter().next() else {
        return Err(ResolveError::InvalidExecution(
            "no source language resolved".to_string(),
        ));
    };
    if parsed.to_langs.is_empty() && parsed.modes.requires_target() {
        return Err(ResolveError::InvalidExecution(
            "no target language resolved".to_string(),
        ));
    }
    Ok(ResolvedRequest {
        from_lang,
        to_langs: parsed.to_langs,
        words: parsed.words,
        modes: parsed.modes,
        group_by,
    })
}

impl fmt::Display for ResolvedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut modes = Vec::new();
        if self.modes.inflection {
            modes.push("inflection");
        }
        if self.modes.definition {
            modes.push("definition");
        }
        if self.modes.wiktio {
            modes.push("wiktio");
        }
        if self.modes.indirect {
            modes.push("indirect");
        }
        if modes.is_empty() {
            modes.push("translation");
        }
        let group_by = match self.group_by {
            GroupBy::Lang => "lang",
            GroupBy::Word => "word",
        };
        writeln!(f, "from: {}", self.from_lang)?;
        writeln!(f, "to: {}", self.to_langs.join(", "))?;
        writeln!(f, "words: {}", self.words.join(", "))?;
        writeln!(f, "modes: {}", modes.join(", "))?;
        write!(f, "group-by: {}", group_by)
    }
}
