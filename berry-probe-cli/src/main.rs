//! Berry Probe CLI Tool
//!
//! Command line health checking and monitoring for Berry API backends

mod output;

use anyhow::Result;
use berry_probe_core::{
    BenchmarkOptions, BenchmarkRunner, ConcurrencyMode, ContinuousMonitor, MonitorOptions,
    ProbeConfig, ProbeDispatcher, ProbeOptions, WeightsResponse,
};
use clap::{Parser, Subcommand};
use output::ConsoleReporter;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "berry-probe")]
#[command(about = "Health checking and monitoring tools for Berry API backends")]
struct Cli {
    /// Router base URL
    #[arg(long, global = true)]
    url: Option<String>,
    /// Auth token (passed through as-is)
    #[arg(long, global = true)]
    token: Option<String>,
    /// Model used for probe requests
    #[arg(long, global = true)]
    model: Option<String>,
    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
    /// Backends to probe (default: discovered from the router)
    #[arg(long, global = true, num_args = 1..)]
    backends: Option<Vec<String>>,
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single health check round over the backends
    Check {
        /// Probe with streaming requests
        #[arg(long)]
        streaming: bool,
        /// Probe backends one by one instead of in parallel
        #[arg(long)]
        serial: bool,
    },
    /// Continuously monitor backend health and weight drift
    Monitor {
        /// Seconds between check cycles
        #[arg(long, default_value_t = 60)]
        interval: u64,
    },
    /// Benchmark backend latency over multiple serial rounds
    Benchmark {
        /// Number of rounds
        #[arg(long, default_value_t = 3)]
        rounds: usize,
    },
    /// Show weight distribution, cost exposure and health reports
    Weights {
        /// Limit the report to a single model
        #[arg(long)]
        model: Option<String>,
        /// Ask the router for detailed per-backend health data
        #[arg(long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let dispatcher = ProbeDispatcher::from_config(&config);

    let backends = match cli.backends.clone() {
        Some(backends) => backends,
        None => dispatcher.available_backends().await,
    };

    if backends.is_empty() {
        anyhow::bail!("no backends to probe");
    }

    match cli.command {
        Commands::Check { streaming, serial } => {
            let options = ProbeOptions {
                model: config.model.clone(),
                timeout: Duration::from_secs(config.timeout_seconds),
                streaming,
                concurrency: if serial {
                    ConcurrencyMode::Serial
                } else {
                    ConcurrencyMode::Parallel(config.parallel_probes)
                },
            };

            println!("🏥 Checking {} backends...", backends.len());
            println!("Model: {}", options.model);
            println!("Timeout: {}s", config.timeout_seconds);
            println!("Streaming: {}", if streaming { "yes" } else { "no" });
            println!("Parallel: {}", if serial { "no" } else { "yes" });
            println!("{}", "-".repeat(50));

            let round = dispatcher
                .probe_round(&backends, &options, &ConsoleReporter)
                .await;
            output::print_round_summary(&round);
        }
        Commands::Monitor { interval } => {
            let options = MonitorOptions {
                probe: ProbeOptions::from_config(&config),
                interval: Duration::from_secs(interval),
                change_threshold: config.weight_change_threshold,
            };
            let monitor = ContinuousMonitor::new(dispatcher, options);

            println!(
                "🔄 Monitoring {} backends (interval: {}s)",
                backends.len(),
                interval
            );
            println!("Press Ctrl+C to stop");
            println!("{}", "=".repeat(60));

            let (shutdown_tx, shutdown_rx) = ContinuousMonitor::shutdown_channel();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = shutdown_tx.send(true);
                }
            });

            monitor.run(&backends, shutdown_rx, &ConsoleReporter).await?;
            println!("\n👋 Monitoring stopped");
        }
        Commands::Benchmark { rounds } => {
            let options = BenchmarkOptions {
                probe: ProbeOptions::from_config(&config),
                rounds,
                round_delay: Duration::from_secs(config.benchmark_delay_seconds),
            };
            let runner = BenchmarkRunner::new(dispatcher, options);

            println!(
                "🏃 Benchmarking {} backends over {} rounds",
                backends.len(),
                rounds
            );
            println!("{}", "=".repeat(50));

            let stats = runner.run(&backends, &ConsoleReporter).await?;
            output::print_benchmark_stats(&stats, rounds);
        }
        Commands::Weights { model, detailed } => {
            let client = dispatcher.client();
            let response: WeightsResponse = match model {
                Some(model_name) => {
                    let single = client.get_model_weights(&model_name, detailed).await?;
                    WeightsResponse {
                        models: vec![single.model],
                        total_smart_ai_models: 1,
                    }
                }
                None => client.get_weights(detailed, true).await?,
            };

            output::print_weight_report(&response);
        }
    }

    Ok(())
}

/// 合并配置：配置文件（可选）打底，命令行参数覆盖
fn resolve_config(cli: &Cli) -> Result<ProbeConfig> {
    let mut config = match &cli.config {
        Some(path) => berry_probe_core::load_config_from_path(path)?,
        None => ProbeConfig::default(),
    };

    if let Some(url) = &cli.url {
        config.base_url = url.clone();
    }
    if let Some(token) = &cli.token {
        config.auth_token = token.clone();
    }
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_seconds = timeout;
    }

    config.validate()?;
    Ok(config)
}
