use anyhow::{Context, Result};

pub mod arguments;
pub mod error;
pub mod inference;
pub mod logging;
pub mod mapping;
pub mod outstem;
mod paths;
pub mod request;
pub mod settings;
#[cfg(test)]
mod test_util;

pub use arguments::{AssumePolicy, GroupBy, Modes, ParsedArgs};
pub use error::ResolveError;
pub use inference::{Detector, InferVia, ScriptDetector};
pub use request::{LoopContext, Outcome, Resolution, ResolvedRequest, Resolver, resolve};
pub use settings::Settings;

pub fn format_request(request: &ResolvedRequest, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(request)
            .with_context(|| "failed to serialize resolved request");
    }
    Ok(request.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_output_names_every_field() {
        let request = ResolvedRequest {
            from_lang: "en".to_string(),
            to_langs: vec!["pl".to_string()],
            words: vec!["obituary".to_string()],
            modes: Modes::default(),
            group_by: GroupBy::Lang,
        };
        let rendered = format_request(&request, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["from_lang"], "en");
        assert_eq!(value["to_langs"][0], "pl");
        assert_eq!(value["words"][0], "obituary");
        assert_eq!(value["group_by"], "lang");
        assert_eq!(value["modes"]["definition"], false);
    }
}
