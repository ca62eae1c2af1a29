// Check contract: key, interval, deadline-bounded gather, then shape into a snapshot.

mod containers;
mod images;
mod system;

pub use containers::{ContainersCheck, ContainersRaw};
pub use images::ImagesCheck;
pub use system::SystemCheck;

use crate::docker_repo::DaemonError;
use crate::models::Snapshot;
use crate::normalize::ShapeError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Hard cap on a single check's run time, whatever its interval.
pub const MAX_DEADLINE: Duration = Duration::from_secs(60);

/// Interval used when none is configured.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("{key} is disabled")]
    Disabled { key: &'static str },
    #[error("{key} timed out after {after:?}")]
    Timeout { key: &'static str, after: Duration },
    #[error("{key} cancelled")]
    Cancelled { key: &'static str },
    #[error("{key}: {source}")]
    Daemon {
        key: &'static str,
        #[source]
        source: DaemonError,
    },
    #[error("{key}: invalid response: {reason}")]
    InvalidResponse { key: &'static str, reason: String },
}

impl CheckError {
    pub fn daemon(key: &'static str) -> impl FnOnce(DaemonError) -> Self {
        move |source| CheckError::Daemon { key, source }
    }

    pub fn invalid(key: &'static str) -> impl FnOnce(ShapeError) -> Self {
        move |e| CheckError::InvalidResponse {
            key,
            reason: e.0,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            CheckError::Disabled { key }
            | CheckError::Timeout { key, .. }
            | CheckError::Cancelled { key }
            | CheckError::Daemon { key, .. }
            | CheckError::InvalidResponse { key, .. } => *key,
        }
    }
}

/// One periodic check as seen by the scheduler.
///
/// `gather` does all daemon I/O and runs under the deadline; `shape` is the pure
/// normalization step applied to a successful gather.
pub trait Check: Send + Sync {
    type Raw: Send;

    fn key(&self) -> &'static str;

    /// Poll interval; zero disables the check.
    fn interval(&self) -> Duration;

    fn gather(&self) -> impl Future<Output = Result<Self::Raw, CheckError>> + Send;

    fn shape(&self, raw: Self::Raw) -> Result<Snapshot, CheckError>;
}

/// `min(interval * 0.8, 60s)`; saturates instead of overflowing on huge intervals.
pub fn deadline(interval: Duration) -> Duration {
    interval
        .checked_mul(4)
        .map_or(MAX_DEADLINE, |d| d / 5)
        .min(MAX_DEADLINE)
}

/// Runs one check invocation. Cancellation wins over a simultaneous timeout; a timed-out or
/// cancelled run never yields a partial snapshot.
pub async fn run<C: Check>(check: &C, cancel: &CancellationToken) -> Result<Snapshot, CheckError> {
    let key = check.key();
    let interval = check.interval();
    if interval.is_zero() {
        return Err(CheckError::Disabled { key });
    }

    let after = deadline(interval);
    let gathered = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(check = key, "check cancelled");
            return Err(CheckError::Cancelled { key });
        }
        res = tokio::time::timeout(after, check.gather()) => res,
    };

    let result = match gathered {
        Err(_) => {
            warn!(check = key, timeout = ?after, "check timed out");
            return Err(CheckError::Timeout { key, after });
        }
        Ok(raw) => raw.and_then(|raw| check.shape(raw)),
    };
    if let Err(e) = &result {
        error!(check = key, error = %e, "check failed");
    }
    result
}
