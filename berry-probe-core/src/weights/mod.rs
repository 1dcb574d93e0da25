pub mod analysis;
pub mod snapshot;

pub use analysis::{
    analyze_cost_distribution, model_health_reports, overall_summary, CostAssessment,
    CostDistribution, HealthGrade, ModelHealthReport, OverallSummary, ProblemBackend,
    PROBLEM_CONFIDENCE_THRESHOLD,
};
pub use snapshot::{
    diff_snapshots, WeightChange, WeightEntry, WeightSnapshot, DEFAULT_CHANGE_THRESHOLD,
};
