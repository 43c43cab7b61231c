//! Environment Configuration
//!
//! All exercises read their secrets and hosts from environment variables,
//! usually seeded from a shared `.env` file. A required variable that is
//! absent (or empty) is an error; there is no default substitution.

use crate::error::{Error, Result};
use std::path::Path;
use tracing::{debug, info};

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_API_BASE: &str = "OPENAI_API_BASE";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const GEMINI_API_BASE: &str = "GEMINI_API_BASE";
pub const OLLAMA_HOST: &str = "OLLAMA_HOST";
pub const CENTRALA_HOST: &str = "CENTRALA_HOST";
pub const AI_DEVS_API_KEY: &str = "AI_DEVS_API_KEY";
pub const HOST: &str = "HOST";
pub const AGENT_USER: &str = "AGENT_USER";
pub const AGENT_PASSWORD: &str = "AGENT_PASSWORD";

/// Read-only view over the process environment.
#[derive(Debug, Clone, Default)]
pub struct Env {
    _private: (),
}

impl Env {
    /// Load variables from `env_file` (fatal if it cannot be read) or, when
    /// no file is given, from `./.env` if one exists.
    pub fn load(env_file: Option<&Path>) -> Result<Self> {
        match env_file {
            Some(path) => {
                dotenvy::from_path(path).map_err(|e| Error::EnvFile {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                info!("Loaded environment from {}", path.display());
            }
            None => match dotenvy::dotenv() {
                Ok(path) => info!("Loaded environment from {}", path.display()),
                Err(e) if e.not_found() => debug!("No .env file found, using process env"),
                Err(e) => {
                    return Err(Error::EnvFile {
                        path: ".env".to_string(),
                        reason: e.to_string(),
                    })
                }
            },
        }
        Ok(Self { _private: () })
    }

    /// Environment as it is, without touching any file.
    pub fn process() -> Self {
        Self { _private: () }
    }

    pub fn require(&self, name: &str) -> Result<String> {
        self.optional(name)
            .ok_or_else(|| Error::MissingConfig(name.to_string()))
    }

    pub fn optional(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.trim().is_empty())
    }

    /// Grading host and submission key.
    pub fn centrala(&self) -> Result<Credentials> {
        Ok(Credentials {
            host: self.require(CENTRALA_HOST)?,
            api_key: self.require(AI_DEVS_API_KEY)?,
        })
    }
}

/// Where answers go and the key they are submitted with.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub host: String,
    pub api_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn test_require_missing_variable() {
        std::env::remove_var("AIDEVS_TEST_MISSING");
        let env = Env::process();
        let err = env.require("AIDEVS_TEST_MISSING").unwrap_err();
        assert!(matches!(err, Error::MissingConfig(name) if name == "AIDEVS_TEST_MISSING"));
    }

    #[test]
    #[serial]
    fn test_empty_value_counts_as_missing() {
        std::env::set_var("AIDEVS_TEST_EMPTY", "  ");
        let env = Env::process();
        assert!(env.require("AIDEVS_TEST_EMPTY").is_err());
        std::env::remove_var("AIDEVS_TEST_EMPTY");
    }

    #[test]
    #[serial]
    fn test_load_explicit_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "AIDEVS_TEST_FROM_FILE=hello").unwrap();

        let env = Env::load(Some(file.path())).unwrap();
        assert_eq!(env.require("AIDEVS_TEST_FROM_FILE").unwrap(), "hello");
        std::env::remove_var("AIDEVS_TEST_FROM_FILE");
    }

    #[test]
    fn test_load_missing_explicit_file_is_fatal() {
        let err = Env::load(Some(Path::new("/definitely/not/here/.env"))).unwrap_err();
        assert!(matches!(err, Error::EnvFile { .. }));
    }

    #[test]
    #[serial]
    fn test_centrala_credentials() {
        std::env::set_var(CENTRALA_HOST, "https://centrala.example");
        std::env::set_var(AI_DEVS_API_KEY, "key-123");
        let creds = Env::process().centrala().unwrap();
        assert_eq!(creds.host, "https://centrala.example");
        assert_eq!(creds.api_key, "key-123");
        std::env::remove_var(CENTRALA_HOST);
        std::env::remove_var(AI_DEVS_API_KEY);
    }
}
