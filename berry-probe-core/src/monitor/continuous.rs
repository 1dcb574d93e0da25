use super::MonitorState;
use crate::probe::{ProbeDispatcher, ProbeOptions, ProbeReporter, Round};
use crate::stats::{aggregate, BackendStats};
use crate::weights::{diff_snapshots, WeightChange, WeightSnapshot, DEFAULT_CHANGE_THRESHOLD};
use anyhow::Result;
use parking_lot::RwLock;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// 持续监控参数
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    pub probe: ProbeOptions,
    /// 两个周期之间的等待时间
    pub interval: Duration,
    /// 权重变化事件阈值
    pub change_threshold: f64,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            probe: ProbeOptions::default(),
            interval: Duration::from_secs(60),
            change_threshold: DEFAULT_CHANGE_THRESHOLD,
        }
    }
}

/// 单个监控周期的汇总
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// 从1开始的周期序号
    pub cycle: usize,
    pub timestamp: String,
    pub results: Round,
    pub healthy: usize,
    pub total: usize,
    pub unhealthy_backends: Vec<String>,
    /// 开始监控以来所有轮次的累计统计
    pub stats: Vec<BackendStats>,
    pub weight_changes: Vec<WeightChange>,
}

/// 持续监控器
/// 驱动 探测 → 聚合 → 权重对比 的循环；周期之间的睡眠可被取消信号
/// 立即打断，不必等满整个间隔
pub struct ContinuousMonitor {
    dispatcher: ProbeDispatcher,
    options: MonitorOptions,
    state: RwLock<MonitorState>,
}

impl ContinuousMonitor {
    pub fn new(dispatcher: ProbeDispatcher, options: MonitorOptions) -> Self {
        Self {
            dispatcher,
            options,
            state: RwLock::new(MonitorState::Idle),
        }
    }

    pub fn state(&self) -> MonitorState {
        *self.state.read()
    }

    /// 创建一对取消信号端点；sender发送true即请求停止
    pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
        watch::channel(false)
    }

    /// 运行监控循环，直到收到取消信号
    pub async fn run(
        &self,
        backends: &[String],
        mut shutdown: watch::Receiver<bool>,
        reporter: &dyn ProbeReporter,
    ) -> Result<()> {
        *self.state.write() = MonitorState::Running;
        info!(
            "Starting continuous monitor for {} backends (interval: {:?})",
            backends.len(),
            self.options.interval
        );

        let mut rounds: Vec<Round> = Vec::new();
        let mut previous_snapshot: Option<WeightSnapshot> = None;
        let mut cycle = 0usize;

        loop {
            if *shutdown.borrow() {
                break;
            }

            cycle += 1;
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            debug!("Starting monitor cycle {}", cycle);

            let round = self
                .dispatcher
                .probe_round(backends, &self.options.probe, reporter)
                .await;

            let healthy = round.iter().filter(|r| r.status.is_healthy()).count();
            let total = round.len();
            let unhealthy_backends: Vec<String> = round
                .iter()
                .filter(|r| !r.status.is_healthy())
                .map(|r| r.backend.clone())
                .collect();

            rounds.push(round.clone());
            let stats = aggregate(&rounds);

            // 权重采样失败只把本周期降级为纯探测，不中断监控
            let weight_changes = match self.dispatcher.client().get_weights(false, true).await {
                Ok(response) => {
                    let current = WeightSnapshot::from_response(&response);
                    let changes = diff_snapshots(
                        previous_snapshot.as_ref(),
                        &current,
                        self.options.change_threshold,
                    );
                    // 在下一次读取之前整体替换上一次快照
                    previous_snapshot = Some(current);
                    changes
                }
                Err(e) => {
                    warn!("Weight snapshot fetch failed: {}", e);
                    Vec::new()
                }
            };

            if healthy < total {
                info!(
                    "Monitor cycle {}: {}/{} backends healthy, unhealthy: {}",
                    cycle,
                    healthy,
                    total,
                    unhealthy_backends.join(", ")
                );
            } else {
                debug!("Monitor cycle {}: all {} backends healthy", cycle, total);
            }

            reporter.on_cycle(&CycleReport {
                cycle,
                timestamp,
                results: round,
                healthy,
                total,
                unhealthy_backends,
                stats,
                weight_changes,
            });

            // 可中断睡眠：取消信号到达时立刻退出循环
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = tokio::time::sleep(self.options.interval) => {}
            }
        }

        *self.state.write() = MonitorState::Stopped;
        info!("Continuous monitor stopped after {} cycles", cycle);
        Ok(())
    }
}
