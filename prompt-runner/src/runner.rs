//! Single-shot prompt execution: configure, bind a model, send once, print.

use std::io::Write;

use prompt_runner_types::response::GenerateContentResponse;
use tracing::info;

use crate::config::RunnerConfig;
use crate::error::{Error, Result};
use crate::models::GenerativeModel;

/// 组合好的模型句柄与 prompt。
#[derive(Clone)]
pub struct PromptRunner {
    model: GenerativeModel,
    prompt: String,
}

impl PromptRunner {
    /// 按配置构建客户端与模型句柄，不发起网络请求。
    ///
    /// # Errors
    /// API Key 无效或客户端构建失败时返回错误。
    pub fn new(config: &RunnerConfig) -> Result<Self> {
        let client = config.build_client()?;
        let model = client
            .model(config.model())
            .with_config(config.generate_content_config());
        Ok(Self::from_parts(model, config.prompt()))
    }

    pub fn from_parts(model: GenerativeModel, prompt: impl Into<String>) -> Self {
        Self {
            model,
            prompt: prompt.into(),
        }
    }

    #[must_use]
    pub fn model(&self) -> &GenerativeModel {
        &self.model
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// 发送 prompt，把响应文本加换行写入 `out`，并返回该文本。
    ///
    /// 失败时 `out` 不会被写入任何内容。
    ///
    /// # Errors
    /// 请求失败、响应不含文本或写入失败时返回错误。
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<String> {
        let response = self.model.generate(&self.prompt).await?;
        emit(&response, out)
    }

    /// 阻塞版本的 [`PromptRunner::run`]，不能在异步运行时内部调用。
    ///
    /// # Errors
    /// 同 [`PromptRunner::run`]。
    pub fn run_blocking<W: Write>(&self, out: &mut W) -> Result<String> {
        let response = self.model.generate_blocking(&self.prompt)?;
        emit(&response, out)
    }
}

fn emit<W: Write>(response: &GenerateContentResponse, out: &mut W) -> Result<String> {
    let text = response_text(response)?;
    writeln!(out, "{text}")?;
    out.flush()?;

    if let Some(usage) = &response.usage_metadata {
        info!(
            prompt_tokens = usage.prompt_token_count,
            candidates_tokens = usage.candidates_token_count,
            total_tokens = usage.total_token_count,
            model_version = response.model_version.as_deref(),
            "generation complete"
        );
    }
    Ok(text)
}

/// 提取响应文本；没有文本时说明原因。
///
/// # Errors
/// 响应不含文本时返回 `Error::EmptyResponse`。
pub fn response_text(response: &GenerateContentResponse) -> Result<String> {
    response.text().ok_or_else(|| Error::EmptyResponse {
        reason: empty_reason(response),
    })
}

fn empty_reason(response: &GenerateContentResponse) -> String {
    if let Some(reason) = response.block_reason() {
        let detail = response
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason_message.as_deref());
        return match detail {
            Some(detail) => format!("prompt blocked ({reason:?}): {detail}"),
            None => format!("prompt blocked ({reason:?})"),
        };
    }
    match response.finish_reason() {
        Some(reason) => format!("generation stopped with finish reason {reason:?}"),
        None if response.candidates.is_empty() => "no candidates returned".to_string(),
        None => "candidate has no text parts".to_string(),
    }
}
