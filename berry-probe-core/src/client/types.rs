use serde::Deserialize;
use thiserror::Error;

// 定义客户端错误类型
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP请求失败: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("JSON解析失败: {0}")]
    JsonParseError(#[from] serde_json::Error),
    #[error("上游API返回错误: 状态码 {status}")]
    UpstreamError { status: u16, body: String },
}

impl ClientError {
    /// 是否为请求超时
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::RequestError(e) if e.is_timeout())
    }
}

/// `GET /smart-ai/weights` 的响应
#[derive(Debug, Clone, Deserialize)]
pub struct WeightsResponse {
    #[serde(default)]
    pub models: Vec<ModelWeights>,
    #[serde(default)]
    pub total_smart_ai_models: usize,
}

/// `GET /smart-ai/models/{model_name}/weights` 的响应
#[derive(Debug, Clone, Deserialize)]
pub struct ModelWeightsResponse {
    pub model: ModelWeights,
}

/// 单个模型的权重信息
#[derive(Debug, Clone, Deserialize)]
pub struct ModelWeights {
    pub name: String,
    #[serde(default)]
    pub backends: Vec<BackendWeightInfo>,
    #[serde(default)]
    pub stats: Option<ModelStats>,
}

/// 单个后端的权重信息
#[derive(Debug, Clone, Deserialize)]
pub struct BackendWeightInfo {
    pub provider: String,
    pub model: String,
    pub effective_weight: f64,
    pub confidence: f64,
    pub enabled: bool,
    #[serde(default)]
    pub is_premium: bool,
}

impl BackendWeightInfo {
    /// 后端键，与路由器内部的 "provider:model" 格式一致
    pub fn backend_key(&self) -> String {
        format!("{}:{}", self.provider, self.model)
    }
}

/// 模型级统计信息
#[derive(Debug, Clone, Deserialize)]
pub struct ModelStats {
    pub total_backends: usize,
    pub healthy_backends: usize,
    pub average_confidence: f64,
    #[serde(default)]
    pub premium_backends: usize,
}

/// `GET /models` 的响应
#[derive(Debug, Clone, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub id: String,
}
