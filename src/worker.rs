// Background check loops (one per check) and the reporter task they feed.
// Each loop runs its check on a fixed interval; successful snapshots go over a channel to the
// reporter, which writes them out as JSON lines.

use crate::checks::{self, Check, CheckError};
use crate::models::Snapshot;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// One successful check invocation, as handed to the reporter.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub check: &'static str,
    pub timestamp: u64,
    pub snapshot: Snapshot,
}

/// Channel capacity for reports (backpressure if the reporter falls behind).
pub const REPORT_CHANNEL_CAPACITY: usize = 32;

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, operation = "get_timestamp", "system time error");
            0
        })
}

/// Spawns the loop for one check. A disabled check logs once and the task ends.
/// The loop exits when `cancel` fires or the reporter channel closes.
pub fn spawn_check<C>(
    check: Arc<C>,
    report_tx: mpsc::Sender<Report>,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()>
where
    C: Check + 'static,
{
    let key = check.key();
    let period = check.interval();
    let check_span = tracing::span!(
        tracing::Level::DEBUG,
        "check",
        key,
        interval_secs = period.as_secs()
    );

    tokio::spawn(
        async move {
            if period.is_zero() {
                tracing::info!(check = key, "check disabled (interval 0), not scheduled");
                return;
            }

            let mut tick = interval(period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tick.tick() => {}
                }
                match checks::run(check.as_ref(), &cancel).await {
                    Ok(snapshot) => {
                        let report = Report {
                            check: key,
                            timestamp: now_secs(),
                            snapshot,
                        };
                        if report_tx.send(report).await.is_err() {
                            tracing::debug!(check = key, "report channel closed");
                            break;
                        }
                    }
                    Err(CheckError::Cancelled { .. }) => break,
                    // Already logged by checks::run; the next tick is the retry.
                    Err(_) => {}
                }
            }
            tracing::debug!(check = key, "check loop shutting down");
        }
        .instrument(check_span),
    )
}

/// Spawns the task that writes each report as one JSON line to `out`.
/// Ends when every sender has been dropped.
pub fn spawn_reporter<W>(
    mut report_rx: mpsc::Receiver<Report>,
    mut out: W,
) -> tokio::task::JoinHandle<u64>
where
    W: Write + Send + 'static,
{
    tokio::spawn(async move {
        let mut reports_written = 0u64;
        while let Some(report) = report_rx.recv().await {
            let written = serde_json::to_writer(&mut out, &report)
                .map_err(std::io::Error::from)
                .and_then(|_| out.write_all(b"\n"))
                .and_then(|_| out.flush());
            match written {
                Ok(()) => {
                    reports_written += 1;
                    tracing::debug!(check = report.check, operation = "write_report", "report written");
                }
                Err(e) => {
                    tracing::warn!(check = report.check, error = %e, operation = "write_report", "report write failed");
                }
            }
        }
        tracing::debug!(reports_written, "reporter shutting down");
        reports_written
    })
}
