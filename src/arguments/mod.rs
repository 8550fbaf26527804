use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::inference::InferVia;

pub mod distribute;
pub mod fill;

pub use distribute::distribute;
pub use fill::fill;

/// How unflagged tokens are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssumePolicy {
    /// Tokens matching a configured language are languages, the rest words.
    #[default]
    Lang,
    /// Every token is a word.
    Word,
    /// Unflagged tokens are an error.
    No,
}

impl FromStr for AssumePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "lang" => Ok(AssumePolicy::Lang),
            "word" => Ok(AssumePolicy::Word),
            "no" => Ok(AssumePolicy::No),
            other => Err(format!(
                "unknown assume policy '{}' (expected lang, word or no)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Lang,
    Word,
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "lang" => Ok(GroupBy::Lang),
            "word" => Ok(GroupBy::Word),
            other => Err(format!(
                "unknown grouping '{}' (expected lang or word)",
                other
            )),
        }
    }
}

/// Output modes, passed through to the lookup stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Modes {
    pub inflection: bool,
    pub definition: bool,
    pub wiktio: bool,
    pub indirect: bool,
}

impl Modes {
    /// Definition- or inflection-only lookups can do without a target.
    pub fn requires_target(&self) -> bool {
        self.wiktio || !(self.inflection || self.definition)
    }
}

/// Working record threaded through the pipeline stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub leftover: Vec<String>,
    pub words: Vec<String>,
    pub from_langs: Vec<String>,
    pub to_langs: Vec<String>,
    pub assume: Option<AssumePolicy>,
    pub infer_via: Option<InferVia>,
    pub group_by: Option<GroupBy>,
    pub reverse: bool,
    pub modes: Modes,
    pub loop_toggle: bool,
    pub config_edit: bool,
}

impl ParsedArgs {
    pub fn has_languages(&self) -> bool {
        !self.from_langs.is_empty() || !self.to_langs.is_empty()
    }

    /// Only toggles the loop; nothing to look up.
    pub fn is_loop_management(&self) -> bool {
        self.loop_toggle
            && !self.config_edit
            && !self.has_languages()
            && self.words.is_empty()
            && self.leftover.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_requirement_follows_modes() {
        assert!(Modes::default().requires_target());
        let definition = Modes {
            definition: true,
            ..Modes::default()
        };
        assert!(!definition.requires_target());
        let inflection_with_wiktio = Modes {
            inflection: true,
            wiktio: true,
            ..Modes::default()
        };
        assert!(inflection_with_wiktio.requires_target());
    }

    #[test]
    fn loop_management_needs_an_otherwise_empty_record() {
        let mut parsed = ParsedArgs {
            loop_toggle: true,
            ..ParsedArgs::default()
        };
        assert!(parsed.is_loop_management());
        parsed.leftover.push("Haus".to_string());
        assert!(!parsed.is_loop_management());
    }

    #[test]
    fn policies_parse_from_flags() {
        assert_eq!("word".parse::<AssumePolicy>(), Ok(AssumePolicy::Word));
        assert_eq!(" LANG ".parse::<AssumePolicy>(), Ok(AssumePolicy::Lang));
        assert!("maybe".parse::<AssumePolicy>().is_err());
        assert_eq!("word".parse::<GroupBy>(), Ok(GroupBy::Word));
    }
}
