use crate::config::PipelineConfig;
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Accept payment transactions and process them asynchronously
#[derive(Parser, Debug)]
#[command(name = "payments-pipeline")]
#[command(about = "Accept payment transactions and process them asynchronously", long_about = None)]
pub struct CliArgs {
    /// Log filter used when RUST_LOG is not set
    #[arg(long = "log", value_name = "FILTER", default_value = "info", global = true)]
    pub log_filter: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API
    Serve(ServeArgs),

    /// Drive an in-process pipeline with synthetic load and print a report
    LoadTest(LoadTestArgs),
}

/// Pipeline tuning shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Maximum number of transactions processed concurrently
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Maximum concurrent processor runs (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    /// Simulated queue hand-off time in milliseconds
    #[arg(long = "enqueue-delay-ms", value_name = "MS", default_value_t = 5)]
    pub enqueue_delay_ms: u64,

    /// Simulated processing time in milliseconds
    #[arg(long = "processing-delay-ms", value_name = "MS", default_value_t = 10)]
    pub processing_delay_ms: u64,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long = "bind", value_name = "ADDR", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Snapshot file; without it state lives only in memory
    #[arg(long = "storage-file", value_name = "PATH")]
    pub storage_file: Option<PathBuf>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

#[derive(Args, Debug)]
pub struct LoadTestArgs {
    /// Number of create requests to send
    #[arg(long = "requests", value_name = "COUNT", default_value_t = 100)]
    pub requests: usize,

    /// Maximum requests in flight at once
    #[arg(long = "concurrency", value_name = "COUNT", default_value_t = 10)]
    pub concurrency: usize,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

impl Command {
    pub fn pipeline_args(&self) -> &PipelineArgs {
        match self {
            Command::Serve(args) => &args.pipeline,
            Command::LoadTest(args) => &args.pipeline,
        }
    }
}

impl PipelineArgs {
    /// Create a PipelineConfig from CLI arguments
    ///
    /// Missing or zero worker counts fall back to the default.
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        let default = PipelineConfig::default();
        PipelineConfig::new(
            self.workers.unwrap_or(default.worker_count),
            Duration::from_millis(self.enqueue_delay_ms),
            Duration::from_millis(self.processing_delay_ms),
        )
    }
}
