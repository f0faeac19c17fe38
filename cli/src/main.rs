//! CLI entrypoint for skybit
//!
//! This is the main binary that wires together all layers using
//! dependency injection: config, brokerage, audit log, registry, dispatcher,
//! and finally the chosen command.

use anyhow::{Context, Result};
use clap::Parser;
use skybit_application::ports::audit_sink::{AuditSink, NoAuditSink};
use skybit_application::ports::tool_executor::ToolExecutorPort;
use skybit_application::{DispatchInput, DispatchToolCallUseCase};
use skybit_domain::tool::{CallArgs, ToolCall};
use skybit_infrastructure::brokerage::default_account_id;
use skybit_infrastructure::{
    ConfigLoader, FileConfig, GatewayDependencies, JsonlAuditLog, SnapTradeEnv, connect_brokerage,
    default_registry,
};
use skybit_presentation::{Cli, Command, ConsoleFormatter, GatewayServer, ToolResponse};
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli)?;

    info!("Starting skybit");

    let config = load_config(&cli)?;
    let dispatcher = build_dispatcher(&config)?;

    match cli.command() {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let addr: SocketAddr = bind
                .parse()
                .with_context(|| format!("invalid listen address '{}'", bind))?;
            serve(dispatcher, addr).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Tools => {
            println!(
                "{}",
                ConsoleFormatter::format_tools(dispatcher.executor().tool_spec())
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Call { name, args } => {
            let args: CallArgs =
                serde_json::from_str(&args).context("--args must be a JSON object")?;
            let outcome = dispatcher
                .execute(DispatchInput::new(ToolCall::new(name).with_arguments(args)))
                .await;
            let response = ToolResponse::from(outcome);
            println!("{}", ConsoleFormatter::format_response(&response));
            Ok(if response.ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over `-v` when set.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    });

    let Some(path) = &cli.log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("--log-file '{}' has no file name", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("failed to load configuration")?
    };
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Composition root: the one place every handler and backend is wired.
fn build_dispatcher(config: &FileConfig) -> Result<DispatchToolCallUseCase> {
    let snaptrade_env = SnapTradeEnv::from_process_env()?;
    let brokerage = connect_brokerage(&config.brokerage, &snaptrade_env)?;

    let audit: Arc<dyn AuditSink> = match config.audit.resolved_path() {
        Some(path) => {
            let log = JsonlAuditLog::open(&path);
            if log.is_writable() {
                info!(path = %path.display(), "Audit log ready");
            }
            Arc::new(log)
        }
        None => {
            warn!("No home directory for the audit log; audit.log will not persist");
            Arc::new(NoAuditSink)
        }
    };

    let registry = default_registry(GatewayDependencies {
        brokerage,
        default_account_id: default_account_id(&config.brokerage, &snaptrade_env),
        audit,
        policy: config.policy.clone(),
    })?;

    let stats = registry.stats();
    info!(tools = stats.total_tools, "Tool registry built");

    Ok(DispatchToolCallUseCase::new(Arc::new(registry)).with_params(config.dispatch_params()))
}

async fn serve(dispatcher: DispatchToolCallUseCase, addr: SocketAddr) -> Result<()> {
    let handle = GatewayServer::new(dispatcher)
        .start(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    println!("skybit tool gateway listening on http://{}/mcp", handle.local_addr());

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    info!("Shutting down");
    handle.shutdown().await?;
    Ok(())
}
