//! Error types for the fail-fast class of failures.
//!
//! The crate splits failures into two classes. Configuration and authoring
//! mistakes surface here as [`ChromeError`] and abort startup. Transient
//! infrastructure failures (an unreachable fragment service, a cold cache)
//! never reach this type: the acquisition pipeline logs them and degrades to
//! an empty bundle instead, see [`crate::fragments`].

use thiserror::Error;

/// A configuration or authoring mistake.
#[derive(Debug, Error)]
pub enum ChromeError {
    /// A configured value failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// A URL in configuration could not be parsed.
    #[error("invalid url in configuration: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_the_offending_detail() {
        let err = ChromeError::Config("blocks.names must not be empty".to_owned());
        assert_eq!(
            err.to_string(),
            "configuration error: blocks.names must not be empty"
        );
    }

    #[test]
    fn url_parse_errors_convert() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let err = ChromeError::from(parse_err);
        assert!(err.to_string().starts_with("invalid url in configuration:"));
    }
}
