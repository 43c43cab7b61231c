//! Error type shared by every exercise pipeline.
//!
//! Library code never terminates the process; failures travel up to the
//! binary entry points, which print a diagnostic and exit non-zero.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing configuration: {0} is not set")]
    MissingConfig(String),

    #[error("could not load env file {path}: {reason}")]
    EnvFile { path: String, reason: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTML extraction failed: {0}")]
    Html(String),

    #[error("no input found: {0}")]
    EmptyInput(String),

    #[error("unrecognized model reply: {0}")]
    UnrecognizedReply(String),

    #[error("model returned no content")]
    EmptyCompletion,

    #[error("unsupported content: {0}")]
    Unsupported(String),

    #[error("malformed input: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub(crate) fn transport(url: &str, source: reqwest::Error) -> Self {
        Error::Transport {
            url: url.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_carries_body() {
        let err = Error::Status {
            url: "http://host/report".to_string(),
            status: 400,
            body: "{\"code\":-1}".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("{\"code\":-1}"));
    }

    #[test]
    fn test_missing_config_names_variable() {
        let err = Error::MissingConfig("OPENAI_API_KEY".to_string());
        assert_eq!(
            err.to_string(),
            "missing configuration: OPENAI_API_KEY is not set"
        );
    }
}
