use thiserror::Error;

/// Internal failures of the strategy parser.
///
/// These never reach callers of [`super::parse`]; the orchestrator logs them
/// and reports the "nothing to visualize" outcome instead.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("no pattern registered for CONFIG field '{0}'")]
    UnknownField(&'static str),

    #[error("invalid numeric value '{value}' for '{field}'")]
    InvalidNumber { field: &'static str, value: String },
}
