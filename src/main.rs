use anyhow::Result;
use docker_agent::checks::{ContainersCheck, ImagesCheck, SystemCheck};
use docker_agent::docker_repo::DaemonClient;
use docker_agent::*;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(s) => s,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let app_config = config::AppConfig::load()?;
    let daemon = Arc::new(DaemonClient::new(&app_config.docker.socket_path)?);
    tracing::info!(
        version = version::VERSION,
        socket = %daemon.socket_path().display(),
        "{} starting",
        version::NAME
    );

    let cancel = CancellationToken::new();
    let (report_tx, report_rx) = mpsc::channel(worker::REPORT_CHANNEL_CAPACITY);
    let reporter = worker::spawn_reporter(report_rx, std::io::stdout());

    let checks = app_config.checks.clone();
    let handles = vec![
        worker::spawn_check(
            Arc::new(ContainersCheck::new(daemon.clone(), checks.containers())),
            report_tx.clone(),
            cancel.clone(),
        ),
        worker::spawn_check(
            Arc::new(ImagesCheck::new(daemon.clone(), checks.images())),
            report_tx.clone(),
            cancel.clone(),
        ),
        worker::spawn_check(
            Arc::new(SystemCheck::new(daemon, checks.system())),
            report_tx,
            cancel.clone(),
        ),
    ];

    shutdown_signal().await;
    tracing::info!("Received shutdown signal");
    cancel.cancel();
    for handle in handles {
        let _ = handle.await;
    }
    let reports_written = reporter.await?;
    tracing::info!(reports_written, "shutdown complete");
    Ok(())
}
