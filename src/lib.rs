//! AI Devs exercise pipelines
//!
//! Each exercise fetches some input, prompts a language model and submits
//! the answer to the grading host ("centrala").
//!
//! ## Module Structure
//!
//! - `config`: environment loading and required variables
//! - `http`: buffered HTTP helper shared by every client
//! - `centrala`: grading host client, answer envelopes, database API
//! - `llm/`: chat models (OpenAI, Gemini, Ollama) and speech transcription
//! - `prompt`: system-first message assembly
//! - `files`: local input directories
//! - `scrape/`: question extraction and article indexing
//! - `query_loop`: query/answer dialogue against the database API
//! - `censor`: censored-sentence checks
//! - `tasks/`: one pipeline per exercise
//! - `webhook`: drone navigation HTTP endpoint

/// Censored-sentence checks
pub mod censor;

/// Grading host client
pub mod centrala;

/// Environment configuration
pub mod config;

/// Error types
pub mod error;

/// Local input files
pub mod files;

/// HTTP helper
pub mod http;

/// Chat models and transcription
pub mod llm;

/// Prompt assembly
pub mod prompt;

/// Query/answer dialogue
pub mod query_loop;

/// HTML scraping and indexing
pub mod scrape;

/// Exercise pipelines
pub mod tasks;

/// Drone navigation webhook
pub mod webhook;

pub use centrala::{Centrala, Envelope};
pub use config::Env;
pub use error::{Error, Result};
pub use llm::{ChatMessage, ChatModel, Completion, ContentPart, Role};
pub use prompt::Prompt;
