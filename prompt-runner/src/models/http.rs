use reqwest::StatusCode;
use serde::Deserialize;

use crate::client::ClientInner;
use crate::error::Error;

pub(super) fn transform_model_name(model: &str) -> String {
    let model = model.trim();
    if model.starts_with("models/") || model.starts_with("tunedModels/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

pub(super) fn build_model_method_url(inner: &ClientInner, model: &str, method: &str) -> String {
    let model = transform_model_name(model);
    let base = &inner.api_client.base_url;
    let version = &inner.api_client.api_version;
    format!("{base}{version}/{model}:{method}")
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// 将非 2xx 响应转换为 `Error::ApiError`，优先使用 Google 错误包中的 message。
pub(super) fn api_error(status: StatusCode, body: &str) -> Error {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) if !error.message.is_empty() => match error.status {
            Some(code) => format!("{code}: {}", error.message),
            None => error.message,
        },
        _ if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        _ => body.trim().to_string(),
    };
    Error::ApiError {
        status: status.as_u16(),
        message,
    }
}
