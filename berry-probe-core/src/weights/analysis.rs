use crate::client::WeightsResponse;
use serde::Serialize;

/// premium权重占比高于该值视为成本暴露过高
pub const PREMIUM_RATIO_WARN: f64 = 0.5;
/// premium权重占比低于该值视为以便宜后端为主
pub const PREMIUM_RATIO_GOOD: f64 = 0.2;
/// 信心度低于该值的后端视为问题后端
pub const PROBLEM_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// 成本分布中的单个后端行
#[derive(Debug, Clone, Serialize)]
pub struct BackendCostLine {
    pub provider: String,
    pub weight: f64,
    pub confidence: f64,
    pub is_premium: bool,
}

/// 单个模型的成本分布
#[derive(Debug, Clone, Serialize)]
pub struct CostDistribution {
    pub model: String,
    pub total_weight: f64,
    pub premium_weight: f64,
    pub backends: Vec<BackendCostLine>,
}

/// 成本暴露评估
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostAssessment {
    /// premium权重过高，成本风险
    HighPremium,
    /// 分布合理
    Balanced,
    /// 主要使用便宜后端
    MostlyCheap,
}

impl CostDistribution {
    /// premium后端的权重占比；总权重为0时无意义，返回None
    pub fn premium_ratio(&self) -> Option<f64> {
        if self.total_weight > 0.0 {
            Some(self.premium_weight / self.total_weight)
        } else {
            None
        }
    }

    pub fn assessment(&self) -> Option<CostAssessment> {
        let ratio = self.premium_ratio()?;
        Some(if ratio > PREMIUM_RATIO_WARN {
            CostAssessment::HighPremium
        } else if ratio < PREMIUM_RATIO_GOOD {
            CostAssessment::MostlyCheap
        } else {
            CostAssessment::Balanced
        })
    }
}

/// 分析每个模型的权重在premium与便宜后端之间的分布
/// 只统计启用状态的后端
pub fn analyze_cost_distribution(response: &WeightsResponse) -> Vec<CostDistribution> {
    response
        .models
        .iter()
        .map(|model| {
            let mut total_weight = 0.0;
            let mut premium_weight = 0.0;
            let mut backends = Vec::new();

            for backend in &model.backends {
                if !backend.enabled {
                    continue;
                }

                total_weight += backend.effective_weight;
                if backend.is_premium {
                    premium_weight += backend.effective_weight;
                }

                backends.push(BackendCostLine {
                    provider: backend.provider.clone(),
                    weight: backend.effective_weight,
                    confidence: backend.confidence,
                    is_premium: backend.is_premium,
                });
            }

            CostDistribution {
                model: model.name.clone(),
                total_weight,
                premium_weight,
                backends,
            }
        })
        .collect()
}

/// 信心度不足的后端
#[derive(Debug, Clone, Serialize)]
pub struct ProblemBackend {
    pub provider: String,
    pub confidence: f64,
}

/// 健康等级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthGrade {
    /// 健康比例 >= 80%
    Good,
    /// 健康比例 >= 50%
    Fair,
    /// 其余
    Poor,
}

/// 单个模型的健康报告
#[derive(Debug, Clone, Serialize)]
pub struct ModelHealthReport {
    pub model: String,
    pub total_backends: usize,
    pub healthy_backends: usize,
    pub average_confidence: f64,
    pub problem_backends: Vec<ProblemBackend>,
}

impl ModelHealthReport {
    pub fn health_ratio(&self) -> f64 {
        if self.total_backends > 0 {
            self.healthy_backends as f64 / self.total_backends as f64
        } else {
            0.0
        }
    }

    pub fn grade(&self) -> HealthGrade {
        let ratio = self.health_ratio();
        if ratio >= 0.8 {
            HealthGrade::Good
        } else if ratio >= 0.5 {
            HealthGrade::Fair
        } else {
            HealthGrade::Poor
        }
    }
}

/// 为每个模型生成健康报告
/// 优先使用路由器返回的stats；缺失时从后端列表按信心度现算
pub fn model_health_reports(response: &WeightsResponse) -> Vec<ModelHealthReport> {
    response
        .models
        .iter()
        .map(|model| {
            let (total_backends, healthy_backends, average_confidence) = match &model.stats {
                Some(stats) => (
                    stats.total_backends,
                    stats.healthy_backends,
                    stats.average_confidence,
                ),
                None => {
                    let total = model.backends.len();
                    let healthy = model
                        .backends
                        .iter()
                        .filter(|b| b.confidence > PROBLEM_CONFIDENCE_THRESHOLD)
                        .count();
                    let avg = if total > 0 {
                        model.backends.iter().map(|b| b.confidence).sum::<f64>() / total as f64
                    } else {
                        0.0
                    };
                    (total, healthy, avg)
                }
            };

            let problem_backends = model
                .backends
                .iter()
                .filter(|b| b.confidence < PROBLEM_CONFIDENCE_THRESHOLD)
                .map(|b| ProblemBackend {
                    provider: b.provider.clone(),
                    confidence: b.confidence,
                })
                .collect();

            ModelHealthReport {
                model: model.name.clone(),
                total_backends,
                healthy_backends,
                average_confidence,
                problem_backends,
            }
        })
        .collect()
}

/// 跨模型的总体统计
#[derive(Debug, Clone, Serialize)]
pub struct OverallSummary {
    pub total_models: usize,
    pub total_backends: usize,
    pub healthy_backends: usize,
    pub premium_backends: usize,
}

impl OverallSummary {
    pub fn health_ratio(&self) -> Option<f64> {
        if self.total_backends > 0 {
            Some(self.healthy_backends as f64 / self.total_backends as f64)
        } else {
            None
        }
    }

    pub fn premium_ratio(&self) -> Option<f64> {
        if self.total_backends > 0 {
            Some(self.premium_backends as f64 / self.total_backends as f64)
        } else {
            None
        }
    }
}

pub fn overall_summary(response: &WeightsResponse) -> OverallSummary {
    let mut summary = OverallSummary {
        total_models: response.models.len(),
        total_backends: 0,
        healthy_backends: 0,
        premium_backends: 0,
    };

    for model in &response.models {
        match &model.stats {
            Some(stats) => {
                summary.total_backends += stats.total_backends;
                summary.healthy_backends += stats.healthy_backends;
                summary.premium_backends += stats.premium_backends;
            }
            None => {
                summary.total_backends += model.backends.len();
                summary.healthy_backends += model
                    .backends
                    .iter()
                    .filter(|b| b.confidence > PROBLEM_CONFIDENCE_THRESHOLD)
                    .count();
                summary.premium_backends +=
                    model.backends.iter().filter(|b| b.is_premium).count();
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> WeightsResponse {
        let body = r#"{
            "models": [{
                "name": "gpt-4o",
                "backends": [
                    {"provider": "expensive", "model": "m", "effective_weight": 0.6,
                     "confidence": 0.95, "enabled": true, "is_premium": true},
                    {"provider": "cheap", "model": "m", "effective_weight": 0.3,
                     "confidence": 0.5, "enabled": true, "is_premium": false},
                    {"provider": "off", "model": "m", "effective_weight": 0.5,
                     "confidence": 0.9, "enabled": false, "is_premium": true}
                ]
            }],
            "total_smart_ai_models": 1
        }"#;
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_cost_distribution_ignores_disabled() {
        let distributions = analyze_cost_distribution(&response());
        assert_eq!(distributions.len(), 1);

        let dist = &distributions[0];
        assert_eq!(dist.backends.len(), 2);
        assert!((dist.total_weight - 0.9).abs() < 1e-9);
        assert!((dist.premium_weight - 0.6).abs() < 1e-9);

        let ratio = dist.premium_ratio().unwrap();
        assert!((ratio - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(dist.assessment(), Some(CostAssessment::HighPremium));
    }

    #[test]
    fn test_premium_ratio_none_when_no_weight() {
        let dist = CostDistribution {
            model: "m".to_string(),
            total_weight: 0.0,
            premium_weight: 0.0,
            backends: vec![],
        };
        assert!(dist.premium_ratio().is_none());
        assert!(dist.assessment().is_none());
    }

    #[test]
    fn test_health_report_without_stats_derives_from_backends() {
        let reports = model_health_reports(&response());
        assert_eq!(reports.len(), 1);

        let report = &reports[0];
        // 3个后端中confidence>0.6的有2个（0.95与0.9），disabled也计入健康统计口径
        assert_eq!(report.total_backends, 3);
        assert_eq!(report.healthy_backends, 2);
        assert_eq!(report.grade(), HealthGrade::Fair);

        assert_eq!(report.problem_backends.len(), 1);
        assert_eq!(report.problem_backends[0].provider, "cheap");
    }

    #[test]
    fn test_overall_summary() {
        let summary = overall_summary(&response());
        assert_eq!(summary.total_models, 1);
        assert_eq!(summary.total_backends, 3);
        assert_eq!(summary.healthy_backends, 2);
        assert_eq!(summary.premium_backends, 2);
        assert!(summary.health_ratio().is_some());
    }
}
