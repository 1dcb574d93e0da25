use anyhow::Result;
use serde::{Deserialize, Serialize};

/// 探测工具全局配置
/// 所有字段都有默认值，配置文件只需覆盖想改的部分
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProbeConfig {
    /// 路由器基础URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 认证令牌，原样透传给路由器
    #[serde(default = "default_auth_token")]
    pub auth_token: String,
    /// 探测请求使用的模型
    #[serde(default = "default_model")]
    pub model: String,
    /// 单次探测请求的总超时（秒）
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// 并行探测宽度
    #[serde(default = "default_parallel_probes")]
    pub parallel_probes: usize,
    /// 持续监控的周期间隔（秒）
    #[serde(default = "default_monitor_interval")]
    pub monitor_interval_seconds: u64,
    /// 基准测试轮数
    #[serde(default = "default_benchmark_rounds")]
    pub benchmark_rounds: usize,
    /// 基准测试轮间等待（秒）
    #[serde(default = "default_benchmark_delay")]
    pub benchmark_delay_seconds: u64,
    /// 权重变化事件阈值，变化绝对值超过该值才上报
    #[serde(default = "default_weight_change_threshold")]
    pub weight_change_threshold: f64,
    /// 元数据接口不可用时退回的后端列表
    #[serde(default = "default_fallback_backends")]
    pub fallback_backends: Vec<String>,
    /// 元数据接口不可用时退回的模型列表
    #[serde(default = "default_fallback_models")]
    pub fallback_models: Vec<String>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_token: default_auth_token(),
            model: default_model(),
            timeout_seconds: default_timeout(),
            parallel_probes: default_parallel_probes(),
            monitor_interval_seconds: default_monitor_interval(),
            benchmark_rounds: default_benchmark_rounds(),
            benchmark_delay_seconds: default_benchmark_delay(),
            weight_change_threshold: default_weight_change_threshold(),
            fallback_backends: default_fallback_backends(),
            fallback_models: default_fallback_models(),
        }
    }
}

impl ProbeConfig {
    /// 校验配置的合法性
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            anyhow::bail!("base_url cannot be empty");
        }
        if self.model.is_empty() {
            anyhow::bail!("model cannot be empty");
        }
        if self.timeout_seconds == 0 {
            anyhow::bail!("timeout_seconds must be greater than 0");
        }
        if self.parallel_probes == 0 {
            anyhow::bail!("parallel_probes must be greater than 0");
        }
        if self.monitor_interval_seconds == 0 {
            anyhow::bail!("monitor_interval_seconds must be greater than 0");
        }
        if self.benchmark_rounds == 0 {
            anyhow::bail!("benchmark_rounds must be greater than 0");
        }
        if self.weight_change_threshold <= 0.0 || self.weight_change_threshold >= 1.0 {
            anyhow::bail!(
                "weight_change_threshold must be within (0, 1), got {}",
                self.weight_change_threshold
            );
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_auth_token() -> String {
    "test-token".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_parallel_probes() -> usize {
    5
}

fn default_monitor_interval() -> u64 {
    60
}

fn default_benchmark_rounds() -> usize {
    3
}

fn default_benchmark_delay() -> u64 {
    5
}

fn default_weight_change_threshold() -> f64 {
    0.01
}

fn default_fallback_backends() -> Vec<String> {
    vec![
        "openai_official".to_string(),
        "anthropic_claude".to_string(),
        "google_gemini".to_string(),
    ]
}

fn default_fallback_models() -> Vec<String> {
    vec!["gpt-4o".to_string(), "claude-sonnet-4".to_string()]
}
