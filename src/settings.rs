use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::arguments::{AssumePolicy, GroupBy, ParsedArgs};
use crate::inference::InferVia;
use crate::mapping::{MappingTable, RuleSet};
use crate::outstem::OutstemSymbols;
use crate::paths;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

/// The user's configuration after all settings files are merged.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Known languages, most recently used first.
    pub langs: Vec<String>,
    pub assume: AssumePolicy,
    pub infer_via: InferVia,
    pub group_by: GroupBy,
    pub outstem: OutstemSymbols,
    pub alphabets: HashMap<String, String>,
    pub mappings: MappingTable,
}

/// Flag overrides merged over the settings, fixed for one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effective {
    pub assume: AssumePolicy,
    pub infer_via: InferVia,
    pub group_by: GroupBy,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    system: Option<SystemSettings>,
    outstem: Option<OutstemSettings>,
    alphabets: Option<HashMap<String, String>>,
    mappings: Option<HashMap<String, Vec<RuleSet>>>,
}

#[derive(Debug, Default, Deserialize)]
struct SystemSettings {
    languages: Option<Vec<String>>,
    assume: Option<AssumePolicy>,
    infer_via: Option<InferVia>,
    group_by: Option<GroupBy>,
}

#[derive(Debug, Default, Deserialize)]
struct OutstemSettings {
    left_brackets: Option<Vec<String>>,
    right_brackets: Option<Vec<String>>,
    separators: Option<Vec<String>>,
    post_cutters: Option<Vec<String>>,
    pre_cutters: Option<Vec<String>>,
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(home) = paths::settings_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }

    Ok(settings)
}

/// Persists the language order into the local settings file, keeping
/// whatever else is already there.
pub fn save_languages(langs: &[String]) -> Result<PathBuf> {
    let path = paths::local_settings_path()
        .ok_or_else(|| anyhow!("cannot locate settings directory (HOME is not set)"))?;
    let mut table = if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read settings: {}", path.display()))?;
        content
            .parse::<toml::Table>()
            .with_context(|| format!("failed to parse settings: {}", path.display()))?
    } else {
        toml::Table::new()
    };

    let system = table
        .entry("system")
        .or_insert(toml::Value::Table(toml::Table::new()));
    let toml::Value::Table(system) = system else {
        return Err(anyhow!("[system] is not a table in {}", path.display()));
    };
    system.insert(
        "languages".to_string(),
        toml::Value::Array(langs.iter().cloned().map(toml::Value::String).collect()),
    );

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create settings directory: {}", parent.display()))?;
    }
    let rendered = toml::to_string_pretty(&table).with_context(|| "failed to render settings")?;
    fs::write(&path, rendered)
        .with_context(|| format!("failed to write settings: {}", path.display()))?;
    Ok(path)
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let parsed: SettingsFile =
            toml::from_str(content).with_context(|| "failed to parse settings")?;
        let mut settings = Settings::default();
        settings.merge(parsed);
        Ok(settings)
    }

    pub fn materialize(&self, parsed: &ParsedArgs) -> Effective {
        Effective {
            assume: parsed.assume.unwrap_or(self.assume),
            infer_via: parsed.infer_via.unwrap_or(self.infer_via),
            group_by: parsed.group_by.unwrap_or(self.group_by),
        }
    }

    /// Moves `used` to the front of `langs`. Returns whether the order changed.
    pub fn promote_langs(&mut self, used: &[String]) -> bool {
        let mut reordered: Vec<String> = Vec::with_capacity(self.langs.len() + used.len());
        for lang in used {
            let lang = lang.trim();
            if !lang.is_empty() && !reordered.iter().any(|known| known == lang) {
                reordered.push(lang.to_string());
            }
        }
        for lang in &self.langs {
            if !reordered.contains(lang) {
                reordered.push(lang.clone());
            }
        }
        if reordered == self.langs {
            return false;
        }
        self.langs = reordered;
        true
    }

    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(system) = incoming.system {
            if let Some(languages) = system.languages {
                self.langs = languages
                    .into_iter()
                    .map(|lang| lang.trim().to_string())
                    .filter(|lang| !lang.is_empty())
                    .collect();
            }
            if let Some(assume) = system.assume {
                self.assume = assume;
            }
            if let Some(infer_via) = system.infer_via {
                self.infer_via = infer_via;
            }
            if let Some(group_by) = system.group_by {
                self.group_by = group_by;
            }
        }
        if let Some(outstem) = incoming.outstem {
            if let Some(symbols) = outstem.left_brackets {
                self.outstem.left_brackets = symbols;
            }
            if let Some(symbols) = outstem.right_brackets {
                self.outstem.right_brackets = symbols;
            }
            if let Some(symbols) = outstem.separators {
                self.outstem.separators = symbols;
            }
            if let Some(symbols) = outstem.post_cutters {
                self.outstem.post_cutters = symbols;
            }
            if let Some(symbols) = outstem.pre_cutters {
                self.outstem.pre_cutters = symbols;
            }
        }
        if let Some(alphabets) = incoming.alphabets {
            self.alphabets.extend(alphabets);
        }
        if let Some(mappings) = incoming.mappings {
            self.mappings.extend(mappings);
        }
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = paths::settings_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}
