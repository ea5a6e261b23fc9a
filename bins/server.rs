use std::process::ExitCode;

use clap::Parser;
use configs::{AppConfig, LogFormat};
use dotenvy::dotenv;
use service::storage::StorageKind;
use tracing::{error, info};
use uuid::Uuid;

/// In-memory notes server.
#[derive(Debug, Parser)]
#[command(name = "server", version, about)]
struct Cli {
    /// Use the linked-list backend instead of the hash map
    #[arg(long)]
    list: bool,

    /// Path to a TOML config file (overrides CONFIG_PATH)
    #[arg(long, value_name = "PATH")]
    config: Option<String>,
}

fn init_logging(cfg: &AppConfig) {
    let json = cfg.logging.format == LogFormat::Json;
    match cfg.logging.file.as_deref() {
        Some(path) => {
            if let Err(e) = common::utils::logging::init_logging_with_file(path, json) {
                common::utils::logging::init_logging_default();
                error!(service = "server", event = "log_file_failed", path, error = %e, "falling back to stdout logging");
            }
        }
        None if json => common::utils::logging::init_logging_json(),
        None => common::utils::logging::init_logging_default(),
    }
    info!(service = "server", event = "logger_init", "tracing subscriber initialized");
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenv().ok();
    if let Some(path) = &cli.config {
        std::env::set_var("CONFIG_PATH", path);
    }

    let mut cfg = match AppConfig::load_or_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = "server", event = "config_invalid", error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    if cli.list {
        cfg.storage.backend = StorageKind::List;
    }
    init_logging(&cfg);

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "server",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let worker_threads = cfg.server.worker_threads;
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads {
        builder.worker_threads(w);
    }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "server", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "server",
        event = "start",
        %service_id,
        pid,
        version,
        backend = %cfg.storage.backend,
        threads = worker_threads.unwrap_or_default(),
        "notes server starting"
    );

    rt.block_on(async move {
        let server_task = tokio::spawn(async move {
            let res = server::run(cfg).await;
            if let Err(e) = &res {
                error!(service = "server", event = "run_failed", error = %e, "server::run returned error");
            }
            res
        });

        tokio::select! {
            res = server_task => match res {
                Ok(Ok(())) => {
                    info!(service = "server", event = "stop", %service_id, pid, "server stopped normally");
                    ExitCode::SUCCESS
                }
                // already logged inside the task
                Ok(Err(_)) => ExitCode::FAILURE,
                Err(e) => {
                    error!(service = "server", event = "task_join_error", error = %e, "server task join error");
                    ExitCode::FAILURE
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!(service = "server", event = "shutdown_signal", %service_id, pid, "received Ctrl+C, shutting down");
                ExitCode::SUCCESS
            }
        }
    })
}
