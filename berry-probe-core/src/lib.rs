//! Berry Probe Core Library
//!
//! This library provides the probing and aggregation engine for Berry API
//! backend monitoring including:
//! - Router HTTP client (weights, models, chat probes)
//! - Concurrent probe dispatch and outcome classification
//! - Multi-round statistics aggregation
//! - Weight snapshot diffing and cost exposure analysis
//! - Continuous monitoring and benchmark loops

pub mod client;
pub mod config;
pub mod monitor;
pub mod probe;
pub mod stats;
pub mod weights;

// Re-export commonly used types
pub use client::{
    BackendWeightInfo, ClientError, ModelList, ModelStats, ModelWeights, RouterClient,
    WeightsResponse,
};
pub use config::{load_config, load_config_from_path, ProbeConfig};
pub use monitor::{
    BenchmarkOptions, BenchmarkRunner, ContinuousMonitor, CycleReport, MonitorOptions,
    MonitorState,
};
pub use probe::{
    truncate_chars, ConcurrencyMode, NullReporter, ProbeDispatcher, ProbeOptions, ProbeReporter,
    ProbeResult, ProbeStatus, Round, DEFAULT_PARALLEL_PROBES,
};
pub use stats::{aggregate, BackendStats, LatencyStats};
pub use weights::{
    analyze_cost_distribution, diff_snapshots, model_health_reports, overall_summary,
    CostAssessment, CostDistribution, HealthGrade, ModelHealthReport, OverallSummary, WeightChange,
    WeightSnapshot, DEFAULT_CHANGE_THRESHOLD,
};
