use super::types::{truncate_chars, ProbeResult, ProbeStatus};
use crate::client::ClientError;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// 非2xx响应体样本的最大字符数
pub const ERROR_BODY_SAMPLE_CHARS: usize = 200;
/// 流式首块样本的最大字符数
pub const FIRST_CHUNK_SAMPLE_CHARS: usize = 100;
/// 非流式内容样本的最大字符数
pub const CONTENT_SAMPLE_CHARS: usize = 50;

/// 对一次已拿到HTTP响应的探测进行归类
///
/// 状态判定优先级：非2xx → unhealthy；2xx流式读首块失败 → unhealthy；
/// 2xx非流式报文不合法 → unhealthy；其余 → healthy
pub async fn classify_response(
    backend: &str,
    model: &str,
    streaming: bool,
    response: reqwest::Response,
    elapsed: Duration,
) -> ProbeResult {
    let http_status = response.status().as_u16();

    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!("Backend {} returned HTTP {}", backend, http_status);
        return ProbeResult {
            backend: backend.to_string(),
            model: model.to_string(),
            status: ProbeStatus::Unhealthy,
            latency: elapsed,
            http_status: Some(http_status),
            error: Some(truncate_chars(&body, ERROR_BODY_SAMPLE_CHARS)),
            streaming,
            content: None,
            first_chunk: None,
        };
    }

    if streaming {
        classify_stream(backend, model, response, elapsed, http_status).await
    } else {
        classify_body(backend, model, response, elapsed, http_status).await
    }
}

/// 流式响应：只读第一个数据块作为诊断样本，不等整条流结束
async fn classify_stream(
    backend: &str,
    model: &str,
    mut response: reqwest::Response,
    elapsed: Duration,
    http_status: u16,
) -> ProbeResult {
    let base = ProbeResult {
        backend: backend.to_string(),
        model: model.to_string(),
        status: ProbeStatus::Healthy,
        latency: elapsed,
        http_status: Some(http_status),
        error: None,
        streaming: true,
        content: None,
        first_chunk: None,
    };

    match response.chunk().await {
        Ok(Some(chunk)) => {
            let text = String::from_utf8_lossy(&chunk);
            let first_line = text.lines().next().unwrap_or_default();
            ProbeResult {
                first_chunk: Some(truncate_chars(first_line, FIRST_CHUNK_SAMPLE_CHARS)),
                ..base
            }
        }
        Ok(None) => {
            // HTTP层已经成功，但流在首块前就结束，归为不健康
            ProbeResult {
                status: ProbeStatus::Unhealthy,
                error: Some("Streaming error: stream ended before first chunk".to_string()),
                ..base
            }
        }
        Err(e) => ProbeResult {
            status: ProbeStatus::Unhealthy,
            error: Some(format!("Streaming error: {e}")),
            ..base
        },
    }
}

/// 非流式响应：提取首个choice的消息内容作为诊断样本
async fn classify_body(
    backend: &str,
    model: &str,
    response: reqwest::Response,
    elapsed: Duration,
    http_status: u16,
) -> ProbeResult {
    let base = ProbeResult {
        backend: backend.to_string(),
        model: model.to_string(),
        status: ProbeStatus::Healthy,
        latency: elapsed,
        http_status: Some(http_status),
        error: None,
        streaming: false,
        content: None,
        first_chunk: None,
    };

    match response.json::<Value>().await {
        Ok(data) => {
            let content = data
                .get("choices")
                .and_then(|c| c.get(0))
                .and_then(|c| c.get("message"))
                .and_then(|m| m.get("content"))
                .and_then(|v| v.as_str())
                .unwrap_or_default();

            ProbeResult {
                content: if content.is_empty() {
                    None
                } else {
                    Some(truncate_chars(content, CONTENT_SAMPLE_CHARS))
                },
                ..base
            }
        }
        Err(e) => {
            // 状态行已经成功，报文不合法归为不健康
            ProbeResult {
                status: ProbeStatus::Unhealthy,
                error: Some(format!("Body parse error: {e}")),
                ..base
            }
        }
    }
}

/// 对一次没有拿到HTTP响应的探测进行归类
///
/// 超时结果的latency固定记为配置的超时时间；其他传输失败完整保留
/// 底层错误信息，展示层再做截断
pub fn classify_transport_failure(
    backend: &str,
    model: &str,
    streaming: bool,
    timeout: Duration,
    elapsed: Duration,
    error: &ClientError,
) -> ProbeResult {
    let (status, latency, error_text) = if error.is_timeout() {
        (ProbeStatus::Timeout, timeout, "Request timeout".to_string())
    } else {
        (ProbeStatus::Error, elapsed, error.to_string())
    };

    ProbeResult {
        backend: backend.to_string(),
        model: model.to_string(),
        status,
        latency,
        http_status: None,
        error: Some(error_text),
        streaming,
        content: None,
        first_chunk: None,
    }
}
