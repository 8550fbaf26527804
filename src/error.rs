use thiserror::Error;

/// Everything that can stop a single resolution call.
///
/// None of these are transient: the resolver holds no state between calls,
/// so calling it again after a failure is always safe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Overlapping outstem symbols, an unterminated bracket, or a mapping
    /// pattern that does not compile.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Positional tokens left over while the assume policy is `no`.
    #[error("unresolved arguments: {}", tokens.join(" "))]
    UnresolvedArguments { tokens: Vec<String> },

    #[error(
        "not enough default languages: {needed} needed, available: [{}]",
        available.join(", ")
    )]
    InsufficientDefaults {
        needed: usize,
        available: Vec<String>,
    },

    #[error("invalid execution: {0}")]
    InvalidExecution(String),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
