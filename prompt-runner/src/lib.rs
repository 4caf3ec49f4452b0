//! Single-shot Gemini prompt runner.
//!
//! Configure a client from an explicit API key, bind it to a named model,
//! send one prompt and read back the generated text.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod runner;

#[cfg(test)]
mod test_support;

pub use prompt_runner_types as types;

pub use client::{ApiKey, Client, ClientBuilder, ClientConfig, HttpOptions};
pub use config::{RunnerConfig, DEFAULT_MODEL, DEFAULT_PROMPT};
pub use error::{Error, Result};
pub use models::{GenerativeModel, Models};
pub use runner::{response_text, PromptRunner};
