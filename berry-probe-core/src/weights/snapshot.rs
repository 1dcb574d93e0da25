use crate::client::WeightsResponse;
use serde::Serialize;
use std::collections::HashMap;

/// 默认权重变化事件阈值
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 0.01;

/// 快照中单个后端的条目
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightEntry {
    pub weight: f64,
    pub confidence: f64,
}

/// 某一时刻的权重分布快照
/// 只收录启用状态的后端；外层键为模型名，内层键为 "provider:model"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightSnapshot {
    models: HashMap<String, HashMap<String, WeightEntry>>,
}

impl WeightSnapshot {
    pub fn from_response(response: &WeightsResponse) -> Self {
        let mut models = HashMap::new();

        for model in &response.models {
            let mut backends = HashMap::new();
            for backend in &model.backends {
                if !backend.enabled {
                    continue;
                }
                backends.insert(
                    backend.backend_key(),
                    WeightEntry {
                        weight: backend.effective_weight,
                        confidence: backend.confidence,
                    },
                );
            }
            models.insert(model.name.clone(), backends);
        }

        Self { models }
    }

    pub fn is_empty(&self) -> bool {
        self.models.values().all(|backends| backends.is_empty())
    }

    pub fn get(&self, model: &str, backend_key: &str) -> Option<WeightEntry> {
        self.models.get(model)?.get(backend_key).copied()
    }

    /// 快照覆盖的 (模型, 后端键) 总数
    pub fn backend_count(&self) -> usize {
        self.models.values().map(|backends| backends.len()).sum()
    }
}

/// 权重变化事件
#[derive(Debug, Clone, Serialize)]
pub struct WeightChange {
    pub model: String,
    pub backend_key: String,
    pub previous: f64,
    pub current: f64,
    pub delta: f64,
}

/// 对比前后两次快照，产出变化绝对值超过阈值的事件
///
/// 首个周期没有上一次快照（previous为None），不产生事件。
/// 只比较两侧同时存在的键：单侧出现或消失的后端不产生事件，这是
/// 刻意保留的行为而非疏漏
pub fn diff_snapshots(
    previous: Option<&WeightSnapshot>,
    current: &WeightSnapshot,
    threshold: f64,
) -> Vec<WeightChange> {
    let Some(previous) = previous else {
        return Vec::new();
    };

    let mut changes = Vec::new();

    for (model_name, backends) in &current.models {
        let Some(prev_backends) = previous.models.get(model_name) else {
            continue;
        };

        for (backend_key, entry) in backends {
            let Some(prev_entry) = prev_backends.get(backend_key) else {
                continue;
            };

            let delta = entry.weight - prev_entry.weight;
            if delta.abs() > threshold {
                changes.push(WeightChange {
                    model: model_name.clone(),
                    backend_key: backend_key.clone(),
                    previous: prev_entry.weight,
                    current: entry.weight,
                    delta,
                });
            }
        }
    }

    // HashMap迭代顺序不稳定，排序保证输出可复现
    changes.sort_by(|a, b| {
        (a.model.as_str(), a.backend_key.as_str()).cmp(&(b.model.as_str(), b.backend_key.as_str()))
    });
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::WeightsResponse;

    fn snapshot(entries: &[(&str, &str, f64)]) -> WeightSnapshot {
        let mut models: HashMap<String, HashMap<String, WeightEntry>> = HashMap::new();
        for (model, backend_key, weight) in entries {
            models.entry(model.to_string()).or_default().insert(
                backend_key.to_string(),
                WeightEntry {
                    weight: *weight,
                    confidence: 0.9,
                },
            );
        }
        WeightSnapshot { models }
    }

    #[test]
    fn test_change_above_threshold_emits_event() {
        let prev = snapshot(&[("gpt-4o", "a:m", 0.500)]);
        let curr = snapshot(&[("gpt-4o", "a:m", 0.511)]);

        let changes = diff_snapshots(Some(&prev), &curr, DEFAULT_CHANGE_THRESHOLD);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].backend_key, "a:m");
        assert!((changes[0].delta - 0.011).abs() < 1e-9);
        assert!((changes[0].previous - 0.500).abs() < 1e-9);
        assert!((changes[0].current - 0.511).abs() < 1e-9);
    }

    #[test]
    fn test_change_below_threshold_is_silent() {
        let prev = snapshot(&[("gpt-4o", "a:m", 0.500)]);
        let curr = snapshot(&[("gpt-4o", "a:m", 0.505)]);

        let changes = diff_snapshots(Some(&prev), &curr, DEFAULT_CHANGE_THRESHOLD);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_first_cycle_without_previous_emits_nothing() {
        let curr = snapshot(&[("gpt-4o", "a:m", 0.9)]);
        assert!(diff_snapshots(None, &curr, DEFAULT_CHANGE_THRESHOLD).is_empty());
    }

    #[test]
    fn test_keys_present_on_one_side_are_skipped() {
        // 空的上一次快照：新出现的键不产生事件
        let prev = snapshot(&[]);
        let curr = snapshot(&[("gpt-4o", "a:m", 0.5)]);
        assert!(diff_snapshots(Some(&prev), &curr, DEFAULT_CHANGE_THRESHOLD).is_empty());

        // 消失的键同样不产生事件
        let prev = snapshot(&[("gpt-4o", "a:m", 0.5), ("gpt-4o", "b:m", 0.5)]);
        let curr = snapshot(&[("gpt-4o", "a:m", 0.5)]);
        assert!(diff_snapshots(Some(&prev), &curr, DEFAULT_CHANGE_THRESHOLD).is_empty());
    }

    #[test]
    fn test_changes_sorted_and_multiple_models() {
        let prev = snapshot(&[
            ("gpt-4o", "b:m", 0.5),
            ("gpt-4o", "a:m", 0.5),
            ("claude", "c:m", 0.2),
        ]);
        let curr = snapshot(&[
            ("gpt-4o", "b:m", 0.6),
            ("gpt-4o", "a:m", 0.3),
            ("claude", "c:m", 0.4),
        ]);

        let changes = diff_snapshots(Some(&prev), &curr, DEFAULT_CHANGE_THRESHOLD);
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0].model, "claude");
        assert_eq!(changes[1].backend_key, "a:m");
        assert!(changes[1].delta < 0.0);
        assert_eq!(changes[2].backend_key, "b:m");
        assert!(changes[2].delta > 0.0);
    }

    #[test]
    fn test_from_response_drops_disabled_backends() {
        let body = r#"{
            "models": [{
                "name": "gpt-4o",
                "backends": [
                    {"provider": "up", "model": "m", "effective_weight": 0.7,
                     "confidence": 0.9, "enabled": true, "is_premium": false},
                    {"provider": "down", "model": "m", "effective_weight": 0.3,
                     "confidence": 0.1, "enabled": false, "is_premium": false}
                ]
            }],
            "total_smart_ai_models": 1
        }"#;
        let response: WeightsResponse = serde_json::from_str(body).unwrap();

        let snapshot = WeightSnapshot::from_response(&response);
        assert_eq!(snapshot.backend_count(), 1);
        assert!(snapshot.get("gpt-4o", "up:m").is_some());
        assert!(snapshot.get("gpt-4o", "down:m").is_none());
    }
}
