use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 探测结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// 2xx且响应可读
    Healthy,
    /// 非2xx，或2xx之后响应体/流不可读
    Unhealthy,
    /// 请求超时
    Timeout,
    /// 连接/DNS等传输层失败
    Error,
}

impl ProbeStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeStatus::Healthy)
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Healthy => write!(f, "healthy"),
            ProbeStatus::Unhealthy => write!(f, "unhealthy"),
            ProbeStatus::Timeout => write!(f, "timeout"),
            ProbeStatus::Error => write!(f, "error"),
        }
    }
}

/// 单次探测的结果
/// status决定哪些可选字段有意义：content只在非流式healthy出现，
/// first_chunk只在流式healthy出现，http_status只在拿到响应后出现
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub backend: String,
    pub model: String,
    pub status: ProbeStatus,
    /// 响应耗时；超时结果固定记为配置的超时时间
    pub latency: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub streaming: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_chunk: Option<String>,
}

impl ProbeResult {
    pub fn latency_secs(&self) -> f64 {
        self.latency.as_secs_f64()
    }
}

/// 一轮完整探测：请求的后端集合每个恰好对应一个结果
pub type Round = Vec<ProbeResult>;

/// 按字符边界截断，避免在多字节字符中间切断
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
