// Docker Engine API client over the local unix socket (hyper http1, one connection per call)

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::client::conn::http1;
use hyper::{Method, Request, StatusCode, header};
use hyper_util::rt::TokioIo;
use regex::Regex;
use serde_json::Value;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use thiserror::Error;
use tokio::net::UnixStream;

/// Engine API version every request is pinned to.
pub const API_VERSION: &str = "v1.41";

/// Default location of the Docker socket.
pub const DEFAULT_SOCKET_PATH: &str = "/var/run/docker.sock";

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:https?|ftps?|tcp)://(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+(?:[A-Z]{2,6}\.?|[A-Z0-9-]{2,}\.?)|localhost|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})(?::\d+)?(?:/?|[/?]\S+)$",
    )
    .expect("URL pattern compiles")
});

static HOST_PORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.\-]+:\d{1,5}$").expect("host:port pattern compiles")
});

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("TCP not supported, expected a unix socket path: {address}")]
    TcpNotSupported { address: String },
    #[error("daemon call {path} failed: {cause}")]
    Call { path: String, cause: CallFailure },
}

/// Underlying cause of a failed daemon call.
#[derive(Debug, Error)]
pub enum CallFailure {
    #[error("connect: {0}")]
    Connect(#[source] std::io::Error),
    #[error("http: {0}")]
    Http(#[from] hyper::Error),
    #[error("request: {0}")]
    Request(#[from] hyper::http::Error),
    #[error("status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
}

impl DaemonError {
    pub fn call(path: &str, cause: CallFailure) -> Self {
        DaemonError::Call {
            path: path.to_string(),
            cause,
        }
    }
}

/// Anything that can answer a versioned GET against the daemon with a JSON body.
pub trait DaemonApi: Send + Sync {
    fn call(&self, path: &str) -> impl Future<Output = Result<Value, DaemonError>> + Send;
}

/// Returns true when `address` names a network endpoint rather than a socket path.
pub fn is_remote_address(address: &str) -> bool {
    URL_RE.is_match(address) || HOST_PORT_RE.is_match(address)
}

#[derive(Debug, Clone)]
pub struct DaemonClient {
    socket_path: Arc<PathBuf>,
}

impl DaemonClient {
    /// Builds a client for a unix socket. A `unix://` prefix is accepted; anything that
    /// looks like a host, IP or URL is rejected.
    pub fn new(address: &str) -> Result<Self, DaemonError> {
        if is_remote_address(address) {
            return Err(DaemonError::TcpNotSupported {
                address: address.to_string(),
            });
        }
        let path = address.strip_prefix("unix://").unwrap_or(address);
        Ok(Self {
            socket_path: Arc::new(PathBuf::from(path)),
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    async fn get_json(&self, uri: &str) -> Result<Value, CallFailure> {
        let stream = UnixStream::connect(self.socket_path.as_path())
            .await
            .map_err(CallFailure::Connect)?;
        let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await?;
        let connection = tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "daemon connection closed with error");
            }
        });

        let req = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::HOST, "docker")
            .header(header::ACCEPT, "application/json")
            .body(Empty::<Bytes>::new())?;
        let res = sender.send_request(req).await?;
        let status = res.status();
        let body = res.into_body().collect().await?.to_bytes();
        drop(sender);
        connection.abort();

        if !status.is_success() {
            return Err(CallFailure::Status {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

impl DaemonApi for DaemonClient {
    async fn call(&self, path: &str) -> Result<Value, DaemonError> {
        let uri = format!("/{API_VERSION}{path}");
        self.get_json(&uri)
            .await
            .map_err(|cause| DaemonError::call(path, cause))
    }
}

/// The daemon reports errors as `{"message": "..."}`; fall back to the status reason.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string())
}
