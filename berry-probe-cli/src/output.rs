//! 控制台渲染
//!
//! 诊断日志走tracing，面向操作者的输出走println

use berry_probe_core::{
    analyze_cost_distribution, model_health_reports, overall_summary, truncate_chars,
    BackendStats, CostAssessment, CycleReport, HealthGrade, ProbeReporter, ProbeResult,
    ProbeStatus, WeightsResponse,
};

/// 展示时保留的错误信息最大字符数（结果里存的是完整信息）
const DISPLAY_ERROR_CHARS: usize = 200;

/// 把探测结果和周期报告实时打到终端
pub struct ConsoleReporter;

impl ProbeReporter for ConsoleReporter {
    fn on_result(&self, result: &ProbeResult) {
        match result.status {
            ProbeStatus::Healthy => {
                println!(
                    "✅ {}: healthy ({:.2}s)",
                    result.backend,
                    result.latency_secs()
                );
                if let Some(content) = &result.content {
                    println!("   Response: {}", content);
                } else if let Some(chunk) = &result.first_chunk {
                    println!("   First chunk: {}", chunk);
                }
            }
            ProbeStatus::Unhealthy => {
                let http_status = result
                    .http_status
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "N/A".to_string());
                println!(
                    "❌ {}: unhealthy (HTTP {}, {:.2}s)",
                    result.backend,
                    http_status,
                    result.latency_secs()
                );
                if let Some(error) = &result.error {
                    println!("   Error: {}", truncate_chars(error, DISPLAY_ERROR_CHARS));
                }
            }
            ProbeStatus::Timeout => {
                println!(
                    "⏰ {}: timeout ({:.2}s)",
                    result.backend,
                    result.latency_secs()
                );
            }
            ProbeStatus::Error => {
                println!(
                    "🔥 {}: error ({:.2}s)",
                    result.backend,
                    result.latency_secs()
                );
                if let Some(error) = &result.error {
                    println!("   Error: {}", truncate_chars(error, DISPLAY_ERROR_CHARS));
                }
            }
        }
    }

    fn on_cycle(&self, report: &CycleReport) {
        println!("\n⏰ {}", report.timestamp);
        println!("📊 {}/{} backends healthy", report.healthy, report.total);

        if !report.unhealthy_backends.is_empty() {
            println!(
                "🚨 Unhealthy backends: {}",
                report.unhealthy_backends.join(", ")
            );
        }

        for change in &report.weight_changes {
            let symbol = if change.delta > 0.0 { "📈" } else { "📉" };
            println!(
                "  {} {} - {}: {:.3} → {:.3} (Δ{:+.3})",
                symbol, change.model, change.backend_key, change.previous, change.current,
                change.delta
            );
        }

        println!("💤 Waiting for next cycle...");
    }
}

/// 打印单轮检查的收尾统计
pub fn print_round_summary(results: &[ProbeResult]) {
    let healthy = results
        .iter()
        .filter(|r| r.status == ProbeStatus::Healthy)
        .count();
    println!("\n📊 {}/{} backends healthy", healthy, results.len());

    if healthy < results.len() {
        let unhealthy: Vec<&str> = results
            .iter()
            .filter(|r| r.status != ProbeStatus::Healthy)
            .map(|r| r.backend.as_str())
            .collect();
        println!("🚨 Unhealthy backends: {}", unhealthy.join(", "));
    }
}

/// 打印基准测试的最终统计
pub fn print_benchmark_stats(stats: &[BackendStats], rounds: usize) {
    println!("\n📊 Performance statistics ({} rounds)", rounds);
    println!("{}", "=".repeat(50));

    for backend_stats in stats {
        match &backend_stats.latency {
            Some(latency) => {
                println!("✅ {}:", backend_stats.backend);
                println!(
                    "   Success rate: {:.1}%",
                    backend_stats.success_rate * 100.0
                );
                println!("   Avg latency: {:.2}s", latency.avg.as_secs_f64());
                println!("   Fastest: {:.2}s", latency.min.as_secs_f64());
                println!("   Slowest: {:.2}s", latency.max.as_secs_f64());
            }
            None => {
                println!("❌ {}: all attempts failed", backend_stats.backend);
            }
        }
        println!();
    }
}

/// 打印权重综合报告：成本分布 + 健康状态 + 总体统计
pub fn print_weight_report(response: &WeightsResponse) {
    println!("💰 Cost distribution");
    println!("{}", "=".repeat(50));

    for distribution in analyze_cost_distribution(response) {
        println!("\n📊 Model: {}", distribution.model);

        for line in &distribution.backends {
            let tag = if line.is_premium {
                "💎 premium"
            } else {
                "💚 cheap  "
            };
            println!(
                "  {} {}: {:.3} (confidence: {:.3})",
                tag, line.provider, line.weight, line.confidence
            );
        }

        if let Some(ratio) = distribution.premium_ratio() {
            println!("  📈 Premium weight share: {:.1}%", ratio * 100.0);
            match distribution.assessment() {
                Some(CostAssessment::HighPremium) => {
                    println!("  ⚠️  Premium backends carry most of the weight")
                }
                Some(CostAssessment::MostlyCheap) => {
                    println!("  ✅ Mostly served by cheap backends")
                }
                Some(CostAssessment::Balanced) => println!("  ℹ️  Weight distribution looks sane"),
                None => {}
            }
        }
    }

    println!("\n🏥 Health status");
    println!("{}", "=".repeat(50));

    for report in model_health_reports(response) {
        println!("\n📊 Model: {}", report.model);
        println!("  Total backends: {}", report.total_backends);
        println!("  Healthy backends: {}", report.healthy_backends);
        println!("  Average confidence: {:.3}", report.average_confidence);

        let ratio = report.health_ratio() * 100.0;
        match report.grade() {
            HealthGrade::Good => println!("  ✅ Health good ({:.1}%)", ratio),
            HealthGrade::Fair => println!("  ⚠️  Health degraded ({:.1}%)", ratio),
            HealthGrade::Poor => println!("  ❌ Health poor ({:.1}%)", ratio),
        }

        if !report.problem_backends.is_empty() {
            let problems: Vec<String> = report
                .problem_backends
                .iter()
                .map(|p| format!("{} (confidence: {:.3})", p.provider, p.confidence))
                .collect();
            println!("  🚨 Problem backends: {}", problems.join(", "));
        }
    }

    let summary = overall_summary(response);
    println!("\n📋 Overall");
    println!("{}", "=".repeat(30));
    println!("Smart AI models: {}", summary.total_models);
    println!("Total backends: {}", summary.total_backends);
    println!("Healthy backends: {}", summary.healthy_backends);
    println!("Premium backends: {}", summary.premium_backends);
    if let Some(ratio) = summary.health_ratio() {
        println!("Overall health: {:.1}%", ratio * 100.0);
    }
    if let Some(ratio) = summary.premium_ratio() {
        println!("Premium share: {:.1}%", ratio * 100.0);
    }
}
