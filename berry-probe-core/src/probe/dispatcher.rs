use super::classifier;
use super::types::{ProbeResult, Round};
use crate::client::RouterClient;
use crate::config::ProbeConfig;
use crate::monitor::CycleReport;
use futures::stream::{self, StreamExt};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// 默认并行探测宽度
pub const DEFAULT_PARALLEL_PROBES: usize = 5;

/// 探测并发模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcurrencyMode {
    /// 有界并行，参数为工作任务数上限
    Parallel(usize),
    /// 按提交顺序逐个探测
    Serial,
}

impl Default for ConcurrencyMode {
    fn default() -> Self {
        ConcurrencyMode::Parallel(DEFAULT_PARALLEL_PROBES)
    }
}

/// 单轮探测参数
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// 探测请求使用的模型
    pub model: String,
    /// 单次请求总超时
    pub timeout: Duration,
    /// 是否用流式请求探测
    pub streaming: bool,
    pub concurrency: ConcurrencyMode,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            timeout: Duration::from_secs(30),
            streaming: false,
            concurrency: ConcurrencyMode::default(),
        }
    }
}

impl ProbeOptions {
    /// 从全局配置构造默认探测参数
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self {
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
            streaming: false,
            concurrency: ConcurrencyMode::Parallel(config.parallel_probes),
        }
    }
}

/// 探测结果的实时接收端
///
/// 并行模式下 `on_result` 按完成顺序到达，与提交顺序无关；
/// 实现必须允许被并发安全地调用
pub trait ProbeReporter: Send + Sync {
    /// 每个后端的探测一完成就回调一次
    fn on_result(&self, _result: &ProbeResult) {}
    /// 持续监控每个周期结束时回调一次
    fn on_cycle(&self, _report: &CycleReport) {}
}

/// 丢弃所有回调的占位实现
pub struct NullReporter;

impl ProbeReporter for NullReporter {}

/// 探测调度器
/// 通过路由器的backend参数对每个后端下发最小聊天请求
#[derive(Clone)]
pub struct ProbeDispatcher {
    client: Arc<RouterClient>,
    fallback_backends: Vec<String>,
    fallback_models: Vec<String>,
}

impl ProbeDispatcher {
    /// 创建新的探测调度器
    /// 回退列表是显式注入的配置，元数据接口不可用时生效
    pub fn new(
        client: Arc<RouterClient>,
        fallback_backends: Vec<String>,
        fallback_models: Vec<String>,
    ) -> Self {
        Self {
            client,
            fallback_backends,
            fallback_models,
        }
    }

    pub fn from_config(config: &ProbeConfig) -> Self {
        let client = Arc::new(RouterClient::new(&config.base_url, &config.auth_token));
        Self::new(
            client,
            config.fallback_backends.clone(),
            config.fallback_models.clone(),
        )
    }

    pub fn client(&self) -> &Arc<RouterClient> {
        &self.client
    }

    /// 获取当前启用的后端列表
    /// 查询失败时降级为配置的回退列表，而不是中断本次运行
    pub async fn available_backends(&self) -> Vec<String> {
        match self.client.get_weights(false, true).await {
            Ok(weights) => {
                let mut backends: Vec<String> = weights
                    .models
                    .iter()
                    .flat_map(|m| m.backends.iter())
                    .filter(|b| b.enabled)
                    .map(|b| b.provider.clone())
                    .collect();
                backends.sort();
                backends.dedup();
                backends
            }
            Err(e) => {
                warn!("Failed to fetch backend list: {}, using fallback list", e);
                self.fallback_backends.clone()
            }
        }
    }

    /// 获取可用模型列表，失败时降级为回退列表
    pub async fn available_models(&self) -> Vec<String> {
        match self.client.list_models().await {
            Ok(models) => models.data.into_iter().map(|m| m.id).collect(),
            Err(e) => {
                warn!("Failed to fetch model list: {}, using fallback list", e);
                self.fallback_models.clone()
            }
        }
    }

    /// 探测单个后端
    /// 所有失败都被归类进结果，从不向调用方传播错误
    pub async fn probe_backend(&self, backend: &str, options: &ProbeOptions) -> ProbeResult {
        let start = Instant::now();
        let payload = probe_payload(&options.model, backend, options.streaming);

        debug!(
            "Probing backend {} (model: {}, streaming: {})",
            backend, options.model, options.streaming
        );

        match self.client.chat_completions(&payload, options.timeout).await {
            Ok(response) => {
                classifier::classify_response(
                    backend,
                    &options.model,
                    options.streaming,
                    response,
                    start.elapsed(),
                )
                .await
            }
            Err(e) => classifier::classify_transport_failure(
                backend,
                &options.model,
                options.streaming,
                options.timeout,
                start.elapsed(),
                &e,
            ),
        }
    }

    /// 对一组后端执行一轮完整探测
    ///
    /// 每个请求的后端恰好产生一个结果。并行模式提交全部任务后按完成
    /// 顺序收集，每个结果一到达就推给reporter；单个后端失败不影响
    /// 同一轮的其余后端
    pub async fn probe_round(
        &self,
        backends: &[String],
        options: &ProbeOptions,
        reporter: &dyn ProbeReporter,
    ) -> Round {
        let mut round = Vec::with_capacity(backends.len());

        match options.concurrency {
            ConcurrencyMode::Parallel(width) => {
                let width = width.max(1);
                let probes: Vec<_> = backends
                    .iter()
                    .map(|backend| self.probe_backend(backend, options))
                    .collect();
                let mut results = stream::iter(probes).buffer_unordered(width);

                while let Some(result) = results.next().await {
                    reporter.on_result(&result);
                    round.push(result);
                }
            }
            ConcurrencyMode::Serial => {
                for backend in backends {
                    let result = self.probe_backend(backend, options).await;
                    reporter.on_result(&result);
                    round.push(result);
                }
            }
        }

        round
    }
}

/// 最小探测请求体：一条"ping"消息，极小的token预算
fn probe_payload(model: &str, backend: &str, streaming: bool) -> Value {
    json!({
        "model": model,
        "messages": [{"role": "user", "content": "ping"}],
        "backend": backend,
        "max_tokens": 5,
        "stream": streaming
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_payload_shape() {
        let payload = probe_payload("gpt-4o", "openai_official", true);
        assert_eq!(payload["model"], "gpt-4o");
        assert_eq!(payload["backend"], "openai_official");
        assert_eq!(payload["max_tokens"], 5);
        assert_eq!(payload["stream"], true);
        assert_eq!(payload["messages"][0]["role"], "user");
        assert_eq!(payload["messages"][0]["content"], "ping");
    }

    #[test]
    fn test_default_concurrency_is_bounded_parallel() {
        assert_eq!(
            ConcurrencyMode::default(),
            ConcurrencyMode::Parallel(DEFAULT_PARALLEL_PROBES)
        );
    }
}
