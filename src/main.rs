//! Payments pipeline CLI
//!
//! # Usage
//!
//! ```bash
//! cargo run -- serve
//! cargo run -- serve --bind 0.0.0.0:8000 --storage-file state.json --workers 8
//! cargo run -- load-test --requests 1000 --concurrency 50
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (runtime could not start, snapshot unreadable, address in use, etc.)

use payments_pipeline::cli::{self, Command};
use payments_pipeline::config::PipelineConfig;
use payments_pipeline::core::InMemoryQueue;
use payments_pipeline::persistence::JsonFileStore;
use payments_pipeline::{http, loadgen, telemetry, Pipeline};
use std::process;
use std::sync::Arc;

fn main() {
    let args = cli::parse_args();
    telemetry::init_tracing(&args.log_filter);

    let config = args.command.pipeline_args().to_pipeline_config();

    // Multi-threaded runtime sized to the worker pool
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_count)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(args.command, config)) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(command: Command, config: PipelineConfig) -> Result<(), String> {
    match command {
        Command::Serve(args) => {
            let pipeline = match &args.storage_file {
                Some(path) => {
                    let store = Arc::new(JsonFileStore::new(path));
                    let queue = Arc::new(InMemoryQueue::new(config.enqueue_delay));
                    Pipeline::bootstrap(&config, store, queue)
                        .await
                        .map_err(|e| format!("Failed to load state from '{}': {}", path.display(), e))?
                }
                None => Pipeline::in_memory(&config),
            };

            let listener = tokio::net::TcpListener::bind(args.bind)
                .await
                .map_err(|e| format!("Failed to bind {}: {}", args.bind, e))?;

            http::serve(listener, pipeline.clone(), shutdown_signal())
                .await
                .map_err(|e| format!("Server error: {}", e))?;

            pipeline.shutdown().await;
            Ok(())
        }
        Command::LoadTest(args) => {
            let pipeline = Pipeline::in_memory(&config);
            let report = loadgen::run(
                &pipeline,
                loadgen::LoadProfile {
                    requests: args.requests,
                    concurrency: args.concurrency,
                },
            )
            .await;

            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| format!("Failed to render report: {}", e))?;
            println!("{}", json);
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
