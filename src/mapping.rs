use regex::{NoExpand, Regex};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::error::{ResolveError, Result};

/// One table of `pattern -> replacement` pairs as written in the settings.
pub type RuleSet = BTreeMap<String, String>;

/// Language code -> rule-sets, applied in order.
pub type MappingTable = HashMap<String, Vec<RuleSet>>;

#[derive(Debug, Clone)]
struct Rule {
    pattern: Regex,
    replacement: String,
}

/// Rewrites input spelling into search spelling, per source language.
///
/// Patterns are compiled once; every rule-set is pre-sorted so the longest
/// pattern is substituted first.
#[derive(Debug, Clone, Default)]
pub struct LangMapper {
    chains: HashMap<String, Vec<Vec<Rule>>>,
}

impl LangMapper {
    pub fn new(table: &MappingTable) -> Result<Self> {
        let mut chains = HashMap::new();
        for (lang, rule_sets) in table {
            let mut chain = Vec::with_capacity(rule_sets.len());
            for rule_set in rule_sets {
                let mut rules = Vec::with_capacity(rule_set.len());
                for (pattern, replacement) in ordered_rules(rule_set) {
                    let compiled = Regex::new(pattern).map_err(|err| {
                        ResolveError::Configuration(format!(
                            "invalid mapping pattern '{}' for '{}': {}",
                            pattern, lang, err
                        ))
                    })?;
                    rules.push(Rule {
                        pattern: compiled,
                        replacement: replacement.to_string(),
                    });
                }
                chain.push(rules);
            }
            chains.insert(lang.clone(), chain);
        }
        Ok(Self { chains })
    }

    pub fn apply(&self, from_lang: &str, word: &str) -> String {
        let Some(chain) = self.chains.get(from_lang) else {
            return word.to_string();
        };
        let mut mapped = word.to_string();
        for rules in chain {
            for rule in rules {
                mapped = rule
                    .pattern
                    .replace_all(&mapped, NoExpand(&rule.replacement))
                    .into_owned();
            }
        }
        if mapped != word {
            debug!("mapping ({}): {} -> {}", from_lang, word, mapped);
        }
        mapped
    }

    /// Maps every word, pairing word `i` with `from_langs[i % len]`.
    pub fn apply_cycled(&self, from_langs: &[String], words: &[String]) -> Vec<String> {
        if from_langs.is_empty() {
            return words.to_vec();
        }
        words
            .iter()
            .zip(from_langs.iter().cycle())
            .map(|(word, lang)| self.apply(lang, word))
            .collect()
    }
}

/// Longest pattern first; equal lengths keep the rule-set's key order.
pub fn ordered_rules(rule_set: &RuleSet) -> Vec<(&str, &str)> {
    let mut rules = rule_set
        .iter()
        .map(|(pattern, replacement)| (pattern.as_str(), replacement.as_str()))
        .collect::<Vec<_>>();
    rules.sort_by(|(left, _), (right, _)| right.chars().count().cmp(&left.chars().count()));
    rules
}
