use std::collections::HashSet;
use tracing::debug;

use crate::error::{ResolveError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutstemSymbols {
    pub left_brackets: Vec<String>,
    pub right_brackets: Vec<String>,
    pub separators: Vec<String>,
    pub post_cutters: Vec<String>,
    pub pre_cutters: Vec<String>,
}

impl Default for OutstemSymbols {
    fn default() -> Self {
        Self {
            left_brackets: vec!["[".to_string()],
            right_brackets: vec!["]".to_string()],
            separators: vec![",".to_string(), "|".to_string()],
            post_cutters: vec!["/".to_string()],
            pre_cutters: vec!["\\".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolKind {
    Left,
    Right,
    Separator,
    PostCut,
    PreCut,
}

#[derive(Debug, Clone, Copy)]
struct BracketSpan {
    start: usize,
    inner_start: usize,
    inner_end: usize,
    end: usize,
}

/// Expands compound word shorthand (`col[ou]r`, `gr[a|e]y`, `stopp/ed`)
/// into the literal forms it stands for.
#[derive(Debug, Clone)]
pub struct Outstemmer {
    symbols: OutstemSymbols,
}

impl Outstemmer {
    pub fn new(symbols: OutstemSymbols) -> Result<Self> {
        let named = [
            ("left brackets", &symbols.left_brackets),
            ("right brackets", &symbols.right_brackets),
            ("separators", &symbols.separators),
            ("post-cutters", &symbols.post_cutters),
            ("pre-cutters", &symbols.pre_cutters),
        ];
        for (name, set) in &named {
            if set.iter().any(|symbol| symbol.is_empty()) {
                return Err(ResolveError::Configuration(format!(
                    "empty symbol in outstem {}",
                    name
                )));
            }
        }
        for (index, (name_a, set_a)) in named.iter().enumerate() {
            for (name_b, set_b) in &named[index + 1..] {
                if let Some(shared) = set_a.iter().find(|symbol| set_b.contains(*symbol)) {
                    return Err(ResolveError::Configuration(format!(
                        "outstem symbol '{}' is used by both {} and {}",
                        shared, name_a, name_b
                    )));
                }
            }
        }
        Ok(Self { symbols })
    }

    /// Joins the whole input first, then expands every joined token.
    pub fn expand(&self, words: &[String]) -> Result<Vec<String>> {
        let joined = self.join(words)?;
        let expanded = tidy(joined.iter().flat_map(|token| self.outstem(token)));
        debug!("outstem: {:?} -> {:?}", words, expanded);
        Ok(expanded)
    }

    /// Re-joins tokens that an upstream whitespace split cut through an
    /// open bracket.
    pub fn join(&self, tokens: &[String]) -> Result<Vec<String>> {
        let balances = tokens
            .iter()
            .map(|token| self.balance(token))
            .collect::<Vec<_>>();
        if balances.iter().all(|balance| *balance == 0) {
            return Ok(tokens.to_vec());
        }
        if balances.iter().sum::<i64>() != 0 {
            return Err(ResolveError::Configuration(format!(
                "unterminated bracket in '{}'",
                tokens.join(" ")
            )));
        }

        let mut joined = Vec::new();
        let mut buffer: Vec<&str> = Vec::new();
        let mut running = 0;
        for (token, balance) in tokens.iter().zip(balances) {
            buffer.push(token);
            running += balance;
            if running == 0 {
                joined.push(buffer.join(" "));
                buffer.clear();
            }
        }
        debug!("outstem join: {:?} -> {:?}", tokens, joined);
        Ok(joined)
    }

    pub fn outstem(&self, word: &str) -> Vec<String> {
        self.outstem_bounded(word, 0, word.len())
    }

    // Every level removes at least one symbol, so the depth can never pass
    // the length of the word we started from.
    fn outstem_bounded(&self, word: &str, depth: usize, limit: usize) -> Vec<String> {
        debug_assert!(
            depth <= limit,
            "outstem recursion depth {} exceeded input length {}",
            depth,
            limit
        );

        if let Some(span) = self.find_bracket(word) {
            let mut alternatives = self.split_alternatives(&word[span.inner_start..span.inner_end]);
            if alternatives.len() == 1 {
                alternatives.insert(0, String::new());
            }
            let prefix = &word[..span.start];
            let suffix = &word[span.end..];
            return tidy(alternatives.iter().flat_map(|alternative| {
                let candidate = format!("{}{}{}", prefix, alternative, suffix);
                self.outstem_bounded(&candidate, depth + 1, limit)
            }));
        }

        if let Some((full, cutted)) = self.cut(word) {
            return tidy(
                [full, cutted]
                    .iter()
                    .flat_map(|candidate| self.outstem_bounded(candidate, depth + 1, limit)),
            );
        }

        tidy([word.to_string()])
    }

    fn balance(&self, token: &str) -> i64 {
        let mut balance = 0;
        let mut pos = 0;
        while pos < token.len() {
            match self.symbol_at(token, pos) {
                Some((SymbolKind::Left, len)) => {
                    balance += 1;
                    pos += len;
                }
                Some((SymbolKind::Right, len)) => {
                    balance -= 1;
                    pos += len;
                }
                Some((_, len)) => pos += len,
                None => pos += char_len_at(token, pos),
            }
        }
        balance
    }

    fn find_bracket(&self, word: &str) -> Option<BracketSpan> {
        let mut pos = 0;
        let mut depth = 0usize;
        let mut open = None;
        while pos < word.len() {
            match self.symbol_at(word, pos) {
                Some((SymbolKind::Left, len)) => {
                    if depth == 0 {
                        open = Some((pos, pos + len));
                    }
                    depth += 1;
                    pos += len;
                }
                Some((SymbolKind::Right, len)) => {
                    if depth > 0 {
                        depth -= 1;
                        if depth == 0 {
                            let (start, inner_start) = open?;
                            return Some(BracketSpan {
                                start,
                                inner_start,
                                inner_end: pos,
                                end: pos + len,
                            });
                        }
                    }
                    pos += len;
                }
                Some((_, len)) => pos += len,
                None => pos += char_len_at(word, pos),
            }
        }
        None
    }

    // Separators inside nested brackets belong to the nested group.
    fn split_alternatives(&self, interior: &str) -> Vec<String> {
        let mut alternatives = Vec::new();
        let mut current = String::new();
        let mut depth = 0usize;
        let mut pos = 0;
        while pos < interior.len() {
            let (kind, len) = match self.symbol_at(interior, pos) {
                Some((kind, len)) => (Some(kind), len),
                None => (None, char_len_at(interior, pos)),
            };
            match kind {
                Some(SymbolKind::Separator) if depth == 0 => {
                    alternatives.push(std::mem::take(&mut current));
                    pos += len;
                    continue;
                }
                Some(SymbolKind::Left) => depth += 1,
                Some(SymbolKind::Right) => depth = depth.saturating_sub(1),
                _ => {}
            }
            current.push_str(&interior[pos..pos + len]);
            pos += len;
        }
        alternatives.push(current);
        alternatives
    }

    /// Returns `(full, cutted)` for the first run of cut symbols.
    fn cut(&self, word: &str) -> Option<(String, String)> {
        let mut pos = 0;
        while pos < word.len() {
            match self.symbol_at(word, pos) {
                Some((kind @ (SymbolKind::PostCut | SymbolKind::PreCut), _)) => {
                    return Some(self.cut_run(word, pos, kind));
                }
                Some((_, len)) => pos += len,
                None => pos += char_len_at(word, pos),
            }
        }
        None
    }

    fn cut_run(&self, word: &str, start: usize, kind: SymbolKind) -> (String, String) {
        let mut end = start;
        let mut count = 0;
        while let Some((next, len)) = self.symbol_at(word, end) {
            if next != kind {
                break;
            }
            end += len;
            count += 1;
        }

        let before = &word[..start];
        let after = &word[end..];
        let full = format!("{}{}", before, after);
        let cutted = match kind {
            SymbolKind::PostCut => format!("{}{}", drop_last_chars(before, count), after),
            _ => format!("{}{}", before, drop_first_chars(after, count)),
        };
        (full, cutted)
    }

    fn symbol_at(&self, text: &str, pos: usize) -> Option<(SymbolKind, usize)> {
        let rest = &text[pos..];
        let groups = [
            (SymbolKind::Left, &self.symbols.left_brackets),
            (SymbolKind::Right, &self.symbols.right_brackets),
            (SymbolKind::Separator, &self.symbols.separators),
            (SymbolKind::PostCut, &self.symbols.post_cutters),
            (SymbolKind::PreCut, &self.symbols.pre_cutters),
        ];
        groups
            .iter()
            .flat_map(|(kind, symbols)| {
                symbols
                    .iter()
                    .filter(|symbol| rest.starts_with(symbol.as_str()))
                    .map(move |symbol| (*kind, symbol.len()))
            })
            .max_by_key(|(_, len)| *len)
    }
}

fn char_len_at(text: &str, pos: usize) -> usize {
    text[pos..].chars().next().map(char::len_utf8).unwrap_or(1)
}

fn drop_last_chars(text: &str, count: usize) -> &str {
    if count == 0 {
        return text;
    }
    match text.char_indices().rev().nth(count - 1) {
        Some((index, _)) => &text[..index],
        None => "",
    }
}

fn drop_first_chars(text: &str, count: usize) -> &str {
    match text.char_indices().nth(count) {
        Some((index, _)) => &text[index..],
        None => "",
    }
}

/// Trims, drops empties and deduplicates, keeping first-seen order.
fn tidy<I>(forms: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for form in forms {
        let trimmed = form.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_string()) {
            out.push(trimmed.to_string());
        }
    }
    out
}
