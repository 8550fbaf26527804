use std::collections::VecDeque;
use tracing::debug;

use super::{AssumePolicy, ParsedArgs};
use crate::error::{ResolveError, Result};

/// Moves every leftover token into `words`, `from_langs` or `to_langs`.
pub fn distribute(
    mut parsed: ParsedArgs,
    policy: AssumePolicy,
    known_langs: &[String],
) -> Result<ParsedArgs> {
    if parsed.leftover.is_empty() {
        return Ok(parsed);
    }
    let parsed = match policy {
        AssumePolicy::No => {
            return Err(ResolveError::UnresolvedArguments {
                tokens: parsed.leftover,
            });
        }
        AssumePolicy::Word => {
            let mut words = std::mem::take(&mut parsed.leftover);
            words.append(&mut parsed.words);
            parsed.words = words;
            parsed
        }
        AssumePolicy::Lang => assume_langs(parsed, known_langs),
    };
    debug!(
        "distribute ({:?}): words={:?} from={:?} to={:?}",
        policy, parsed.words, parsed.from_langs, parsed.to_langs
    );
    Ok(parsed)
}

fn assume_langs(mut parsed: ParsedArgs, known_langs: &[String]) -> ParsedArgs {
    let (mut langs, mut words): (VecDeque<_>, VecDeque<_>) = std::mem::take(&mut parsed.leftover)
        .into_iter()
        .enumerate()
        .partition(|(_, token)| known_langs.contains(token));

    if parsed.words.is_empty() {
        if let Some((_, word)) = words.pop_front() {
            parsed.words.push(word);
        } else if langs.len() > 2 {
            // Three language-like tokens and no word: one of them has to be the word.
            if let Some((_, word)) = langs.pop_front() {
                parsed.words.push(word);
            }
        }
    }

    if parsed.from_langs.is_empty() {
        if let Some((_, lang)) = langs.pop_front() {
            parsed.from_langs.push(lang);
        }
    }

    if parsed.to_langs.is_empty() {
        parsed.to_langs.extend(langs.drain(..).map(|(_, lang)| lang));
    }

    let mut rest = words.into_iter().chain(langs).collect::<Vec<_>>();
    rest.sort_by_key(|(position, _)| *position);
    parsed.words.extend(rest.into_iter().map(|(_, word)| word));
    parsed
}
