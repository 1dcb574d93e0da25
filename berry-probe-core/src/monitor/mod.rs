pub mod benchmark;
pub mod continuous;

pub use benchmark::{BenchmarkOptions, BenchmarkRunner, DEFAULT_BENCHMARK_ROUNDS, DEFAULT_ROUND_DELAY};
pub use continuous::{ContinuousMonitor, CycleReport, MonitorOptions};

use serde::Serialize;

/// 监控器状态机
///
/// 持续监控：Idle → Running → Stopped（被取消）
/// 基准测试：Idle → Running → Terminated（固定轮数跑完）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorState {
    Idle,
    Running,
    Stopped,
    Terminated,
}
