// SPDX-License-Identifier: MIT

//! Daemon client: dials the `claid` Unix socket, frames one request, and
//! awaits one response. Directly grounded on the teacher's `client.rs`
//! (`DaemonClient::connect`/`send`, env-overridable timeouts), reduced to
//! the `ping`/`status`/`shutdown` surface this crate exposes.

use std::path::PathBuf;
use std::time::Duration;

use clai_daemon::protocol::wire::{decode, encode, read_message, write_message};
use clai_daemon::{Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon not running (no socket at {0})")]
    DaemonNotRunning(PathBuf),
    #[error("could not determine a runtime directory for this user")]
    NoRuntimeDir,
    #[error("protocol error: {0}")]
    Protocol(#[from] clai_daemon::ProtocolError),
    #[error("unexpected response from daemon")]
    UnexpectedResponse,
    #[error("daemon rejected the request: {0}")]
    Rejected(String),
}

fn timeout_ms(var: &str, default_ms: u64) -> Duration {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis).unwrap_or(Duration::from_millis(default_ms))
}

/// Socket path the `claid` daemon binds, resolved the same way
/// `clai_daemon::config::Config::load` does (runtime dir, falling back to
/// state dir, falling back to home). That module is private to the daemon
/// binary, so this mirrors its path scheme rather than importing it.
pub fn socket_path() -> Result<PathBuf, ClientError> {
    let runtime_dir = dirs::runtime_dir().or_else(dirs::state_dir).or_else(dirs::home_dir).ok_or(ClientError::NoRuntimeDir)?;
    Ok(runtime_dir.join("clai").join("clai.sock"))
}

pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Connects to an already-running daemon. This crate is a manual
    /// control client, not an auto-starting one: if nothing is listening,
    /// the caller is told to start `claid` themselves.
    pub fn connect() -> Result<Self, ClientError> {
        let socket_path = socket_path()?;
        if !socket_path.exists() {
            return Err(ClientError::DaemonNotRunning(socket_path));
        }
        Ok(Self { socket_path })
    }

    #[cfg(test)]
    pub(crate) fn for_socket(socket_path: PathBuf) -> Self {
        Self { socket_path }
    }

    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let read_timeout = timeout_ms("CLAI_TIMEOUT_IPC_MS", 5_000);
        let write_timeout = read_timeout;

        let stream = UnixStream::connect(&self.socket_path).await.map_err(|_| ClientError::DaemonNotRunning(self.socket_path.clone()))?;
        let (mut reader, mut writer) = stream.into_split();

        let data = encode(request)?;
        tokio::time::timeout(write_timeout, write_message(&mut writer, &data)).await.map_err(|_| clai_daemon::ProtocolError::Timeout)??;

        let response_bytes = tokio::time::timeout(read_timeout, read_message(&mut reader)).await.map_err(|_| clai_daemon::ProtocolError::Timeout)??;
        Ok(decode(&response_bytes)?)
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn status(&self) -> Result<(String, usize, u64, u64), ClientError> {
        match self.send(&Request::GetStatus).await? {
            Response::Status { version, active_sessions, uptime_secs, commands_logged } => {
                Ok((version, active_sessions, uptime_secs, commands_logged))
            }
            other => Self::reject(other),
        }
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::Ok | Response::ShuttingDown => Ok(()),
            other => Self::reject(other),
        }
    }

    fn reject<T>(response: Response) -> Result<T, ClientError> {
        match response {
            Response::Error { message, .. } => Err(ClientError::Rejected(message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
