//! Models API surface.

use std::sync::Arc;

use prompt_runner_types::content::Content;
use prompt_runner_types::models::{GenerateContentConfig, GenerateContentRequest};
use prompt_runner_types::response::GenerateContentResponse;
use tracing::{debug, warn};

use crate::client::{transport_error, ClientInner};
use crate::error::{Error, Result};

mod http;

use self::http::{api_error, build_model_method_url};

#[derive(Clone)]
pub struct Models {
    pub(crate) inner: Arc<ClientInner>,
}

impl Models {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// 生成内容（默认配置）。
    ///
    /// # Errors
    /// 请求无效、网络失败、远端返回非 2xx 或响应无法解析时返回错误。
    pub async fn generate_content(
        &self,
        model: impl Into<String>,
        contents: Vec<Content>,
    ) -> Result<GenerateContentResponse> {
        self.generate_content_with_config(model, contents, GenerateContentConfig::default())
            .await
    }

    /// 生成内容（自定义配置）。
    ///
    /// # Errors
    /// 请求无效、网络失败、远端返回非 2xx 或响应无法解析时返回错误。
    pub async fn generate_content_with_config(
        &self,
        model: impl Into<String>,
        contents: Vec<Content>,
        config: GenerateContentConfig,
    ) -> Result<GenerateContentResponse> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(Error::InvalidRequest {
                message: "model name must not be empty".into(),
            });
        }
        if contents.is_empty() {
            return Err(Error::InvalidRequest {
                message: "contents must not be empty".into(),
            });
        }

        let request = GenerateContentRequest::new(contents, config);
        let url = build_model_method_url(&self.inner, &model, "generateContent");
        debug!(model = %model, "generateContent");

        let request = self.inner.http.post(url).json(&request);
        let response = self.inner.send(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = api_error(status, &body);
            warn!(status = status.as_u16(), error = %err, "generateContent failed");
            return Err(err);
        }

        let body = response.text().await.map_err(transport_error)?;
        serde_json::from_str(&body).map_err(|err| Error::Parse {
            message: format!("invalid generateContent response: {err}"),
        })
    }
}

/// 绑定到单个远端模型的句柄。
///
/// 创建句柄不会发起网络请求；每次 [`GenerativeModel::generate`] 发送一次请求。
#[derive(Clone)]
pub struct GenerativeModel {
    models: Models,
    name: String,
    config: GenerateContentConfig,
}

impl GenerativeModel {
    pub(crate) fn new(models: Models, name: impl Into<String>) -> Self {
        Self {
            models,
            name: name.into(),
            config: GenerateContentConfig::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 设置每次请求携带的生成配置。
    #[must_use]
    pub fn with_config(mut self, config: GenerateContentConfig) -> Self {
        self.config = config;
        self
    }

    /// 发送单个文本 prompt。返回的 future 必须 `.await` 之后才能读取结果。
    ///
    /// # Errors
    /// prompt 为空、网络失败、远端拒绝或响应无法解析时返回错误。
    pub async fn generate(&self, prompt: &str) -> Result<GenerateContentResponse> {
        if prompt.trim().is_empty() {
            return Err(Error::InvalidRequest {
                message: "prompt must not be empty".into(),
            });
        }
        self.models
            .generate_content_with_config(
                self.name.clone(),
                vec![Content::user(prompt)],
                self.config.clone(),
            )
            .await
    }

    /// 阻塞版本：在私有的单线程运行时上完成请求后返回。
    ///
    /// 不能在异步运行时内部调用，此时返回 `Error::InvalidConfig`。
    ///
    /// # Errors
    /// 同 [`GenerativeModel::generate`]；另外在运行时创建失败时返回 `Error::Io`。
    pub fn generate_blocking(&self, prompt: &str) -> Result<GenerateContentResponse> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(Error::InvalidConfig {
                message: "generate_blocking called inside an async runtime; use generate().await"
                    .into(),
            });
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.generate(prompt))
    }
}
