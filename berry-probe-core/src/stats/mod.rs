use crate::probe::Round;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// 仅对healthy结果计算的延迟统计
#[derive(Debug, Clone, Serialize)]
pub struct LatencyStats {
    pub avg: Duration,
    pub min: Duration,
    pub max: Duration,
}

/// 单个后端跨轮次的聚合统计
#[derive(Debug, Clone, Serialize)]
pub struct BackendStats {
    pub backend: String,
    /// 该后端被探测的总次数（可能少于轮数，某轮缺席不计入）
    pub attempts: usize,
    pub healthy: usize,
    pub success_rate: f64,
    /// 全部探测失败时为None，调用方据此渲染"全部失败"而不是数值零
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<LatencyStats>,
}

impl BackendStats {
    pub fn all_failed(&self) -> bool {
        self.healthy == 0
    }
}

/// 将多轮探测结果折叠为按后端名排序的统计
pub fn aggregate(rounds: &[Round]) -> Vec<BackendStats> {
    let mut latencies: BTreeMap<&str, (usize, Vec<Duration>)> = BTreeMap::new();

    for round in rounds {
        for result in round {
            let entry = latencies.entry(result.backend.as_str()).or_default();
            entry.0 += 1;
            if result.status.is_healthy() {
                entry.1.push(result.latency);
            }
        }
    }

    latencies
        .into_iter()
        .map(|(backend, (attempts, healthy_latencies))| {
            let healthy = healthy_latencies.len();
            let latency = latency_stats(&healthy_latencies);

            BackendStats {
                backend: backend.to_string(),
                attempts,
                healthy,
                success_rate: healthy as f64 / attempts as f64,
                latency,
            }
        })
        .collect()
}

fn latency_stats(latencies: &[Duration]) -> Option<LatencyStats> {
    // 空集合不做数值统计
    let (first, rest) = latencies.split_first()?;

    let mut min = *first;
    let mut max = *first;
    let mut total = *first;
    for latency in rest {
        min = min.min(*latency);
        max = max.max(*latency);
        total += *latency;
    }

    Some(LatencyStats {
        avg: total / latencies.len() as u32,
        min,
        max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ProbeResult, ProbeStatus};

    fn result(backend: &str, status: ProbeStatus, latency_ms: u64) -> ProbeResult {
        ProbeResult {
            backend: backend.to_string(),
            model: "gpt-4o".to_string(),
            status,
            latency: Duration::from_millis(latency_ms),
            http_status: None,
            error: None,
            streaming: false,
            content: None,
            first_chunk: None,
        }
    }

    #[test]
    fn test_latency_only_over_healthy_results() {
        // 3轮中2轮健康：延迟统计只覆盖这2次
        let rounds = vec![
            vec![result("a", ProbeStatus::Healthy, 100)],
            vec![result("a", ProbeStatus::Timeout, 30_000)],
            vec![result("a", ProbeStatus::Healthy, 300)],
        ];

        let stats = aggregate(&rounds);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].attempts, 3);
        assert_eq!(stats[0].healthy, 2);
        assert!((stats[0].success_rate - 2.0 / 3.0).abs() < 1e-9);

        let latency = stats[0].latency.as_ref().unwrap();
        assert_eq!(latency.min, Duration::from_millis(100));
        assert_eq!(latency.max, Duration::from_millis(300));
        assert_eq!(latency.avg, Duration::from_millis(200));
    }

    #[test]
    fn test_all_failed_backend_has_no_latency_stats() {
        let rounds = vec![
            vec![result("a", ProbeStatus::Error, 10)],
            vec![result("a", ProbeStatus::Unhealthy, 20)],
        ];

        let stats = aggregate(&rounds);
        assert_eq!(stats[0].attempts, 2);
        assert_eq!(stats[0].healthy, 0);
        assert_eq!(stats[0].success_rate, 0.0);
        assert!(stats[0].all_failed());
        assert!(stats[0].latency.is_none());
    }

    #[test]
    fn test_backend_missing_from_a_round() {
        // b在第2轮缺席：它的分母只有1
        let rounds = vec![
            vec![
                result("a", ProbeStatus::Healthy, 100),
                result("b", ProbeStatus::Healthy, 150),
            ],
            vec![result("a", ProbeStatus::Healthy, 200)],
        ];

        let stats = aggregate(&rounds);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].backend, "a");
        assert_eq!(stats[0].attempts, 2);
        assert_eq!(stats[1].backend, "b");
        assert_eq!(stats[1].attempts, 1);
        assert_eq!(stats[1].success_rate, 1.0);
    }

    #[test]
    fn test_backends_sorted_by_name() {
        let rounds = vec![vec![
            result("zeta", ProbeStatus::Healthy, 100),
            result("alpha", ProbeStatus::Healthy, 100),
        ]];

        let stats = aggregate(&rounds);
        assert_eq!(stats[0].backend, "alpha");
        assert_eq!(stats[1].backend, "zeta");
    }

    #[test]
    fn test_empty_rounds() {
        assert!(aggregate(&[]).is_empty());
    }
}
