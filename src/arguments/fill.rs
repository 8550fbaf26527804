use tracing::debug;

use super::ParsedArgs;
use crate::error::{ResolveError, Result};
use crate::inference::{Detector, InferVia, LanguageInferrer};
use crate::request::LoopContext;

/// Where missing languages may come from.
pub struct FillSources<'a> {
    /// Configured languages, most recently used first.
    pub langs: &'a [String],
    pub infer_via: InferVia,
    pub detector: &'a dyn Detector,
}

pub fn fill(
    mut parsed: ParsedArgs,
    context: &LoopContext,
    sources: &FillSources<'_>,
) -> Result<ParsedArgs> {
    if parsed.config_edit {
        debug!("fill: skipped for configuration edit");
        return Ok(parsed);
    }
    if parsed.is_loop_management() {
        parsed.from_langs = context.from_lang.iter().cloned().collect();
        parsed.to_langs = context.to_langs.clone();
        debug!(
            "fill: loop toggle keeps from={:?} to={:?}",
            parsed.from_langs, parsed.to_langs
        );
        return Ok(parsed);
    }
    if !parsed.from_langs.is_empty() && !parsed.to_langs.is_empty() {
        return Ok(parsed);
    }

    let defaults = sources
        .langs
        .iter()
        .filter(|lang| !parsed.from_langs.contains(*lang) && !parsed.to_langs.contains(*lang))
        .cloned()
        .collect::<Vec<_>>();

    let mut needed = usize::from(parsed.from_langs.is_empty());
    if parsed.to_langs.is_empty() && parsed.modes.requires_target() {
        needed += 1;
    }
    if needed > defaults.len() {
        return Err(ResolveError::InsufficientDefaults {
            needed,
            available: defaults,
        });
    }

    if parsed.from_langs.is_empty() {
        if let Some(lang) = infer_source(&parsed, context, sources) {
            if parsed.to_langs.contains(&lang) {
                debug!("fill: inferred {} is already a target, ignoring", lang);
            } else {
                debug!("fill: inferred source {}", lang);
                parsed.from_langs.push(lang);
            }
        }
    }

    let mut remaining = defaults
        .into_iter()
        .filter(|lang| !parsed.from_langs.contains(lang))
        .collect::<Vec<_>>()
        .into_iter();
    if parsed.from_langs.is_empty() {
        if let Some(lang) = remaining.next() {
            debug!("fill: default source {}", lang);
            parsed.from_langs.push(lang);
        }
    }
    if parsed.to_langs.is_empty() {
        if let Some(lang) = carried_target(&parsed, context) {
            debug!("fill: previous target {}", lang);
            parsed.to_langs.push(lang);
        } else if let Some(lang) = remaining.find(|lang| !parsed.from_langs.contains(lang)) {
            debug!("fill: default target {}", lang);
            parsed.to_langs.push(lang);
        }
    }
    Ok(parsed)
}

/// First target of the previous turn that is not the current source.
fn carried_target(parsed: &ParsedArgs, context: &LoopContext) -> Option<String> {
    if !context.active {
        return None;
    }
    context
        .to_langs
        .iter()
        .find(|lang| !parsed.from_langs.contains(*lang))
        .cloned()
}

fn infer_source(
    parsed: &ParsedArgs,
    context: &LoopContext,
    sources: &FillSources<'_>,
) -> Option<String> {
    if context.active || sources.infer_via.uses_last() {
        if let Some(lang) = context.from_lang.clone() {
            debug!("fill: previous source {}", lang);
            return Some(lang);
        }
    }
    if sources.infer_via.uses_detector() {
        return LanguageInferrer::new(sources.detector, sources.langs).infer(&parsed.words);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::Modes;

    struct Fixed(Option<&'static str>);

    impl Detector for Fixed {
        fn detect(&self, _words: &[String]) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn words(values: &[&str]) -> ParsedArgs {
        ParsedArgs {
            words: strings(values),
            ..ParsedArgs::default()
        }
    }

    fn run(
        parsed: ParsedArgs,
        langs: &[&str],
        infer_via: InferVia,
        guess: Option<&'static str>,
    ) -> Result<ParsedArgs> {
        run_in(parsed, &LoopContext::default(), langs, infer_via, guess)
    }

    fn run_in(
        parsed: ParsedArgs,
        context: &LoopContext,
        langs: &[&str],
        infer_via: InferVia,
        guess: Option<&'static str>,
    ) -> Result<ParsedArgs> {
        let langs = strings(langs);
        let detector = Fixed(guess);
        let sources = FillSources {
            langs: &langs,
            infer_via,
            detector: &detector,
        };
        fill(parsed, context, &sources)
    }

    #[test]
    fn explicit_languages_are_left_alone() {
        let mut parsed = words(&["Herr"]);
        parsed.from_langs = strings(&["de"]);
        parsed.to_langs = strings(&["pl"]);
        let filled = run(parsed.clone(), &["en"], InferVia::Detect, Some("en")).unwrap();
        assert_eq!(filled, parsed);
    }

    #[test]
    fn configuration_edit_is_not_filled() {
        let parsed = ParsedArgs {
            config_edit: true,
            ..ParsedArgs::default()
        };
        let filled = run(parsed.clone(), &[], InferVia::Off, None).unwrap();
        assert_eq!(filled, parsed);
    }

    #[test]
    fn loop_toggle_carries_previous_languages() {
        let parsed = ParsedArgs {
            loop_toggle: true,
            ..ParsedArgs::default()
        };
        let context = LoopContext {
            active: true,
            from_lang: Some("de".to_string()),
            to_langs: strings(&["pl", "en"]),
        };
        let filled = run_in(parsed, &context, &[], InferVia::Off, None).unwrap();
        assert_eq!(filled.from_langs, strings(&["de"]));
        assert_eq!(filled.to_langs, strings(&["pl", "en"]));
    }

    #[test]
    fn defaults_fill_in_configured_order() {
        let filled = run(words(&["obituary"]), &["en", "pl", "de"], InferVia::Off, None).unwrap();
        assert_eq!(filled.from_langs, strings(&["en"]));
        assert_eq!(filled.to_langs, strings(&["pl"]));

        let mut parsed = words(&["dom"]);
        parsed.from_langs = strings(&["pl"]);
        let filled = run(parsed, &["en", "pl", "de"], InferVia::Off, None).unwrap();
        assert_eq!(filled.to_langs, strings(&["en"]));

        let mut parsed = words(&["house"]);
        parsed.to_langs = strings(&["en"]);
        let filled = run(parsed, &["en", "pl", "de"], InferVia::Off, None).unwrap();
        assert_eq!(filled.from_langs, strings(&["pl"]));
    }

    #[test]
    fn too_few_defaults_fail() {
        let err = run(words(&["obituary"]), &["en"], InferVia::Off, None).unwrap_err();
        assert_eq!(
            err,
            ResolveError::InsufficientDefaults {
                needed: 2,
                available: strings(&["en"]),
            }
        );
    }

    #[test]
    fn definition_only_does_not_need_a_target() {
        let mut parsed = words(&["obituary"]);
        parsed.modes = Modes {
            definition: true,
            ..Modes::default()
        };
        let filled = run(parsed, &["en"], InferVia::Off, None).unwrap();
        assert_eq!(filled.from_langs, strings(&["en"]));
        assert!(filled.to_langs.is_empty());
    }

    #[test]
    fn detected_source_beats_defaults() {
        let filled = run(
            words(&["źdźbło"]),
            &["en", "pl", "de"],
            InferVia::Detect,
            Some("pl"),
        )
        .unwrap();
        assert_eq!(filled.from_langs, strings(&["pl"]));
        assert_eq!(filled.to_langs, strings(&["en"]));
    }

    #[test]
    fn detection_matching_a_target_is_ignored() {
        let mut parsed = words(&["dom"]);
        parsed.to_langs = strings(&["pl"]);
        let filled = run(parsed, &["en", "pl", "de"], InferVia::Detect, Some("pl")).unwrap();
        assert_eq!(filled.from_langs, strings(&["en"]));
        assert_eq!(filled.to_langs, strings(&["pl"]));
    }

    #[test]
    fn infer_off_never_asks_the_detector() {
        let filled =
            run(words(&["Haus"]), &["en", "pl", "de"], InferVia::Off, Some("de")).unwrap();
        assert_eq!(filled.from_langs, strings(&["en"]));
    }

    #[test]
    fn last_policy_reuses_previous_source() {
        let context = LoopContext {
            active: true,
            from_lang: Some("de".to_string()),
            to_langs: strings(&["pl"]),
        };
        let filled = run_in(
            words(&["Haus"]),
            &context,
            &["en", "pl", "de"],
            InferVia::Last,
            Some("pl"),
        )
        .unwrap();
        assert_eq!(filled.from_langs, strings(&["de"]));
        assert_eq!(filled.to_langs, strings(&["pl"]));
    }

    #[test]
    fn active_loop_reuses_previous_languages_under_any_policy() {
        let context = LoopContext {
            active: true,
            from_lang: Some("de".to_string()),
            to_langs: strings(&["pl"]),
        };
        for infer_via in [InferVia::Off, InferVia::Detect, InferVia::Last, InferVia::Auto] {
            let filled = run_in(
                words(&["Frau"]),
                &context,
                &["en", "pl", "de"],
                infer_via,
                Some("en"),
            )
            .unwrap();
            assert_eq!(filled.from_langs, strings(&["de"]), "{:?}", infer_via);
            assert_eq!(filled.to_langs, strings(&["pl"]), "{:?}", infer_via);
        }
    }

    #[test]
    fn inactive_context_is_ignored_without_last_policy() {
        let context = LoopContext {
            active: false,
            from_lang: Some("de".to_string()),
            to_langs: strings(&["pl"]),
        };
        let filled = run_in(
            words(&["Frau"]),
            &context,
            &["en", "pl", "de"],
            InferVia::Detect,
            None,
        )
        .unwrap();
        assert_eq!(filled.from_langs, strings(&["en"]));
        assert_eq!(filled.to_langs, strings(&["pl"]));
    }

    #[test]
    fn previous_target_equal_to_new_source_is_skipped() {
        let context = LoopContext {
            active: true,
            from_lang: Some("pl".to_string()),
            to_langs: strings(&["de", "en"]),
        };
        let mut parsed = words(&["Haus"]);
        parsed.from_langs = strings(&["de"]);
        let filled = run_in(parsed, &context, &["en", "pl", "de"], InferVia::Off, None).unwrap();
        assert_eq!(filled.from_langs, strings(&["de"]));
        assert_eq!(filled.to_langs, strings(&["en"]));
    }
}
