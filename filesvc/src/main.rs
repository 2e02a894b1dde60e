use clap::Parser;
use filesvc::{Application, Config, telemetry};

/// Resolves once the process is asked to stop; axum then drains in-flight requests
async fn shutdown_signal() {
    let signal = wait_for_signal().await;
    tracing::info!(signal, "Stop requested, finishing in-flight requests");
}

async fn interrupt() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Cannot listen for SIGINT");
        std::future::pending::<()>().await;
    }
    "SIGINT"
}

#[cfg(unix)]
async fn wait_for_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => tokio::select! {
            name = interrupt() => name,
            _ = terminate.recv() => "SIGTERM",
        },
        Err(e) => {
            tracing::warn!(error = %e, "Cannot listen for SIGTERM, only SIGINT stops the server");
            interrupt().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> &'static str {
    interrupt().await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = filesvc::config::Args::parse();

    let config = Config::load(&args)?;

    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    telemetry::init_telemetry(config.enable_otel_export)?;

    tracing::debug!(?args, "Parsed command line");

    Application::new(config).await?.serve(shutdown_signal()).await
}
