use super::types::{ClientError, ModelList, ModelWeightsResponse, WeightsResponse};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// 路由器客户端
/// HTTP配置（请求头、base URL）在构造后只读，可被任意任务并发使用
#[derive(Clone)]
pub struct RouterClient {
    client: Client,
    base_url: String,
    auth_token: String,
}

impl RouterClient {
    /// 创建新的路由器客户端
    pub fn new(base_url: &str, auth_token: &str) -> Self {
        Self::with_connect_timeout(base_url, auth_token, Duration::from_secs(10))
    }

    pub fn with_connect_timeout(base_url: &str, auth_token: &str, connect_timeout: Duration) -> Self {
        // 只限制连接阶段；总超时是逐次探测的参数，在请求级别设置
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.auth_token)
    }

    /// 获取SmartAI权重分布
    pub async fn get_weights(
        &self,
        detailed: bool,
        enabled_only: bool,
    ) -> Result<WeightsResponse, ClientError> {
        let response = self
            .client
            .get(format!("{}/smart-ai/weights", self.base_url))
            .query(&[("detailed", detailed), ("enabled_only", enabled_only)])
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        Self::read_json(response).await
    }

    /// 获取单个模型的权重分布
    pub async fn get_model_weights(
        &self,
        model_name: &str,
        detailed: bool,
    ) -> Result<ModelWeightsResponse, ClientError> {
        let response = self
            .client
            .get(format!(
                "{}/smart-ai/models/{}/weights",
                self.base_url, model_name
            ))
            .query(&[("detailed", detailed)])
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        Self::read_json(response).await
    }

    /// 获取可用模型列表
    pub async fn list_models(&self) -> Result<ModelList, ClientError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        Self::read_json(response).await
    }

    /// 发送聊天完成请求
    /// 返回原始响应，响应体/流由调用方决定怎么读
    pub async fn chat_completions(
        &self,
        body: &Value,
        timeout: Duration,
    ) -> Result<reqwest::Response, ClientError> {
        debug!("POST {}/v1/chat/completions (timeout: {:?})", self.base_url, timeout);

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", self.auth_header())
            .json(body)
            .timeout(timeout)
            .send()
            .await?;

        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status().as_u16();
        let body = response.text().await?;

        if !(200..300).contains(&status) {
            return Err(ClientError::UpstreamError { status, body });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
