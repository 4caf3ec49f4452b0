//! Runner configuration: process environment plus an optional `.env` file.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use prompt_runner_types::config::GenerationConfig;
use prompt_runner_types::content::Content;
use prompt_runner_types::models::GenerateContentConfig;
use tracing::debug;

use crate::client::Client;
use crate::error::{Error, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_PROMPT: &str = "Explain how neural networks work in simple terms.";

const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];
const MODEL_VAR: &str = "GEMINI_MODEL";
const PROMPT_VAR: &str = "GEMINI_PROMPT";
const SYSTEM_INSTRUCTION_VAR: &str = "GEMINI_SYSTEM_INSTRUCTION";
const BASE_URL_VARS: &[&str] = &["GENAI_BASE_URL", "GEMINI_BASE_URL"];
const API_VERSION_VAR: &str = "GENAI_API_VERSION";
const TIMEOUT_VAR: &str = "GEMINI_TIMEOUT_SECS";
const TEMPERATURE_VAR: &str = "GEMINI_TEMPERATURE";
const MAX_OUTPUT_TOKENS_VAR: &str = "GEMINI_MAX_OUTPUT_TOKENS";

/// 进程环境变量查找；空白值视为未设置。
pub(crate) fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// 依次查找 `keys`，返回第一个非空值。
pub(crate) fn first_non_empty(
    lookup: impl Fn(&str) -> Option<String>,
    keys: &[&str],
) -> Option<String> {
    keys.iter()
        .filter_map(|key| lookup(*key))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn parse_var<T>(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    first_non_empty(lookup, &[key])
        .map(|raw| {
            raw.parse::<T>().map_err(|err| Error::InvalidConfig {
                message: format!("Invalid value for {key}: {raw:?} ({err})"),
            })
        })
        .transpose()
}

/// 浮点配置必须是有限值；NaN/inf 序列化后会变成 `null`。
fn parse_finite(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<f32>> {
    match parse_var::<f32>(lookup, key)? {
        Some(value) if !value.is_finite() => Err(Error::InvalidConfig {
            message: format!("Invalid value for {key}: {value} (must be finite)"),
        }),
        value => Ok(value),
    }
}

/// 单次运行所需的全部配置，凭据显式携带。
#[derive(Clone)]
pub struct RunnerConfig {
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) prompt: String,
    pub(crate) system_instruction: Option<String>,
    pub(crate) base_url: Option<String>,
    pub(crate) api_version: Option<String>,
    pub(crate) timeout: Option<u64>,
    pub(crate) temperature: Option<f32>,
    pub(crate) max_output_tokens: Option<i32>,
}

impl RunnerConfig {
    /// 使用默认模型与 prompt。
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            system_instruction: None,
            base_url: None,
            api_version: None,
            timeout: None,
            temperature: None,
            max_output_tokens: None,
        }
    }

    /// 通过任意查找函数读取配置，不触碰进程环境。
    ///
    /// # Errors
    /// 缺少 API Key 或数值无法解析时返回 `Error::InvalidConfig`。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = first_non_empty(&lookup, API_KEY_VARS).ok_or_else(|| Error::InvalidConfig {
            message: "GEMINI_API_KEY or GOOGLE_API_KEY not found".into(),
        })?;

        let mut config = Self::new(api_key);
        if let Some(model) = first_non_empty(&lookup, &[MODEL_VAR]) {
            config.model = model;
        }
        if let Some(prompt) = first_non_empty(&lookup, &[PROMPT_VAR]) {
            config.prompt = prompt;
        }
        config.system_instruction = first_non_empty(&lookup, &[SYSTEM_INSTRUCTION_VAR]);
        config.base_url = first_non_empty(&lookup, BASE_URL_VARS);
        config.api_version = first_non_empty(&lookup, &[API_VERSION_VAR]);
        config.timeout = parse_var(&lookup, TIMEOUT_VAR)?;
        config.temperature = parse_finite(&lookup, TEMPERATURE_VAR)?;
        config.max_output_tokens = parse_var(&lookup, MAX_OUTPUT_TOKENS_VAR)?;
        Ok(config)
    }

    /// 只读取进程环境变量。
    ///
    /// # Errors
    /// 同 [`RunnerConfig::from_lookup`]。
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    /// 读取进程环境变量，缺失的键再从 `dotenv_path` 文件补齐。
    ///
    /// 文件不存在时忽略；文件只被解析，不会写回进程环境。
    ///
    /// # Errors
    /// 文件无法解析、缺少 API Key 或数值无法解析时返回 `Error::InvalidConfig`。
    pub fn load(dotenv_path: impl AsRef<Path>) -> Result<Self> {
        let path = dotenv_path.as_ref();
        let file_vars = read_env_file(path, dotenvy::from_path_iter(path))?;
        Self::from_env_and_file(&file_vars)
    }

    /// 同 [`RunnerConfig::load`]，但从当前目录逐级向上查找 `filename`。
    ///
    /// # Errors
    /// 同 [`RunnerConfig::load`]。
    pub fn discover(filename: impl AsRef<Path>) -> Result<Self> {
        let filename = filename.as_ref();
        let file_vars = read_env_file(filename, dotenvy::from_filename_iter(filename))?;
        Self::from_env_and_file(&file_vars)
    }

    fn from_env_and_file(file_vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_lookup(|key| env_lookup(key).or_else(|| file_vars.get(key).cloned()))
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Some(secs);
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub const fn with_max_output_tokens(mut self, max_output_tokens: i32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub const fn timeout(&self) -> Option<u64> {
        self.timeout
    }

    /// 按配置构建客户端（不发起网络请求）。
    ///
    /// # Errors
    /// API Key 为空或非法、代理/头部无效时返回错误。
    pub fn build_client(&self) -> Result<Client> {
        let mut builder = Client::builder().api_key(self.api_key.clone());
        if let Some(base_url) = &self.base_url {
            builder = builder.base_url(base_url.clone());
        }
        if let Some(api_version) = &self.api_version {
            builder = builder.api_version(api_version.clone());
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    /// 每次请求携带的生成配置。
    #[must_use]
    pub fn generate_content_config(&self) -> GenerateContentConfig {
        let generation_config = GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            ..Default::default()
        };
        GenerateContentConfig {
            system_instruction: self.system_instruction.as_deref().map(Content::user),
            generation_config: Some(generation_config).filter(|cfg| !cfg.is_empty()),
        }
    }
}

impl fmt::Debug for RunnerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnerConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("prompt", &self.prompt)
            .field("system_instruction", &self.system_instruction)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

fn read_env_file(
    path: &Path,
    found: dotenvy::Result<dotenvy::Iter<File>>,
) -> Result<HashMap<String, String>> {
    let iter = match found {
        Ok(iter) => iter,
        Err(err) if err.not_found() => {
            debug!(path = %path.display(), "no env file, using process environment only");
            return Ok(HashMap::new());
        }
        Err(err) => return Err(err.into()),
    };
    iter.map(|item| item.map_err(Error::from)).collect()
}
