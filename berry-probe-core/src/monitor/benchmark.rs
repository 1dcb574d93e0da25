use super::MonitorState;
use crate::probe::{ConcurrencyMode, ProbeDispatcher, ProbeOptions, ProbeReporter, Round};
use crate::stats::{aggregate, BackendStats};
use anyhow::Result;
use parking_lot::RwLock;
use std::time::Duration;
use tracing::{debug, info};

/// 默认基准测试轮数
pub const DEFAULT_BENCHMARK_ROUNDS: usize = 3;
/// 默认轮间等待时间
pub const DEFAULT_ROUND_DELAY: Duration = Duration::from_secs(5);

/// 基准测试参数
#[derive(Debug, Clone)]
pub struct BenchmarkOptions {
    pub probe: ProbeOptions,
    pub rounds: usize,
    /// 只插在两轮之间；最后一轮结束后不再等待
    pub round_delay: Duration,
}

impl Default for BenchmarkOptions {
    fn default() -> Self {
        Self {
            probe: ProbeOptions::default(),
            rounds: DEFAULT_BENCHMARK_ROUNDS,
            round_delay: DEFAULT_ROUND_DELAY,
        }
    }
}

/// 基准测试执行器
/// 固定轮数、强制串行：并发探测会互相挤占带宽，串行保证各轮延迟可比
pub struct BenchmarkRunner {
    dispatcher: ProbeDispatcher,
    options: BenchmarkOptions,
    state: RwLock<MonitorState>,
}

impl BenchmarkRunner {
    pub fn new(dispatcher: ProbeDispatcher, options: BenchmarkOptions) -> Self {
        Self {
            dispatcher,
            options,
            state: RwLock::new(MonitorState::Idle),
        }
    }

    pub fn state(&self) -> MonitorState {
        *self.state.read()
    }

    /// 执行基准测试并返回最终聚合统计
    pub async fn run(
        &self,
        backends: &[String],
        reporter: &dyn ProbeReporter,
    ) -> Result<Vec<BackendStats>> {
        *self.state.write() = MonitorState::Running;

        // 无论调用方传什么并发模式，基准测试都串行执行
        let probe_options = ProbeOptions {
            concurrency: ConcurrencyMode::Serial,
            ..self.options.probe.clone()
        };

        info!(
            "Starting benchmark: {} backends, {} rounds",
            backends.len(),
            self.options.rounds
        );

        let mut rounds: Vec<Round> = Vec::with_capacity(self.options.rounds);

        for round_num in 1..=self.options.rounds {
            debug!("Benchmark round {}/{}", round_num, self.options.rounds);

            let round = self
                .dispatcher
                .probe_round(backends, &probe_options, reporter)
                .await;
            rounds.push(round);

            if round_num < self.options.rounds {
                tokio::time::sleep(self.options.round_delay).await;
            }
        }

        let stats = aggregate(&rounds);
        *self.state.write() = MonitorState::Terminated;
        info!("Benchmark finished after {} rounds", self.options.rounds);

        Ok(stats)
    }
}
