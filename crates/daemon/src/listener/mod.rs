// SPDX-License-Identifier: MIT

//! Listener task for handling socket I/O.
//!
//! The listener runs in a spawned task per connection, reading one request,
//! dispatching it against shared daemon state, and writing back one
//! response. Grounded on the teacher's `listener/mod.rs` accept loop.

mod command;
pub(crate) use command::drain_queue;
mod feedback;
mod history;
mod session;
mod status;
mod suggest;
#[cfg(test)]
pub(crate) mod test_support;
mod workflow;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::watch;
use tracing::{debug, error, warn};

use clai_collab::{BatchWriter, FeedbackStore, Provider, Store};
use clai_core::{CircuitBreaker, Clock, IngestionQueue, SessionRegistry, SnapshotStore};

use crate::dispatcher::Dispatcher;
use crate::protocol::{self, Request, Response, DEFAULT_TIMEOUT};

/// Shared daemon context handed to every RPC handler.
pub(crate) struct ListenCtx {
    pub store: Arc<dyn Store>,
    pub feedback_store: Option<Arc<dyn FeedbackStore>>,
    pub provider: Option<Arc<dyn Provider>>,
    pub dispatcher: Dispatcher,
    pub sessions: SessionRegistry,
    pub queue: IngestionQueue,
    pub circuit_breaker: CircuitBreaker,
    pub snapshots: SnapshotStore,
    pub batch_writer: Arc<dyn BatchWriter>,
    pub clock: Arc<dyn Clock>,
    pub start_time: Instant,
    pub last_activity_ms: AtomicU64,
    /// `command_id -> details captured at `CommandStarted``, for duration
    /// and raw-text bookkeeping on the matching `CommandEnded`. Looked up
    /// on a best-effort basis: a missing entry (no prior `CommandStarted`,
    /// e.g. the shell hook attached mid-command) falls back to a zero
    /// duration and empty text rather than an error.
    pub pending_commands: Mutex<HashMap<String, PendingCommand>>,
    pub shutdown: watch::Sender<bool>,
}

/// Details captured at `CommandStarted`, consumed by the matching
/// `CommandEnded`.
pub struct PendingCommand {
    pub started_at_ms: u64,
    pub raw_text: String,
    pub cwd: String,
    pub repo_key: Option<String>,
    pub branch: Option<String>,
}

impl ListenCtx {
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Every handler calls this first (spec.md §4.7): refresh the
    /// last-activity clock the idle watcher reads.
    pub fn touch_activity(&self) {
        self.last_activity_ms.store(self.now_ms(), Ordering::Relaxed);
    }
}

pub(crate) struct Listener {
    socket: UnixListener,
    ctx: Arc<ListenCtx>,
}

impl Listener {
    pub fn new(socket: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { socket, ctx }
    }

    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &ctx).await {
                            match e {
                                protocol::ProtocolError::ConnectionClosed => debug!("client disconnected"),
                                protocol::ProtocolError::Timeout => warn!("connection timeout"),
                                other => error!(error = %other, "connection error"),
                            }
                        }
                    });
                }
                Err(e) => error!(error = %e, "accept error"),
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, ctx: &ListenCtx) -> Result<(), protocol::ProtocolError> {
    let (mut reader, mut writer) = stream.into_split();

    let start = Instant::now();
    let request = protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await?;
    let method = request_name(&request);

    if request.is_query() {
        debug!(method, "rpc call");
    } else {
        tracing::info!(method, "rpc call");
    }

    ctx.touch_activity();
    let response = handle_request(request, ctx).await;
    let status = response_status(&response);
    let latency_ms = start.elapsed().as_millis();
    tracing::info!(method, status, latency_ms, "rpc");

    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;
    Ok(())
}

async fn handle_request(request: Request, ctx: &ListenCtx) -> Response {
    match request {
        Request::Ping => Response::Pong,
        Request::GetStatus => status::handle_get_status(ctx).await,

        Request::SessionStart { session_id, shell, os, hostname, username, cwd } => {
            session::handle_session_start(ctx, session_id, shell, os, hostname, username, cwd).await
        }
        Request::SessionEnd { session_id } => session::handle_session_end(ctx, session_id).await,

        Request::CommandStarted { session_id, command_id, raw_text, cwd, repo_key, branch } => {
            command::handle_command_started(ctx, session_id, command_id, raw_text, cwd, repo_key, branch).await
        }
        Request::CommandEnded { session_id, command_id, exit_code } => {
            command::handle_command_ended(ctx, session_id, command_id, exit_code).await
        }

        Request::Suggest { session_id, cwd, shell, prefix, version, max_results } => {
            suggest::handle_suggest(ctx, session_id, cwd, shell, prefix, version, max_results).await
        }
        Request::TextToCommand { session_id, prompt, cwd, shell } => {
            suggest::handle_text_to_command(ctx, session_id, prompt, cwd, shell).await
        }
        Request::NextStep { session_id, cwd, shell } => suggest::handle_next_step(ctx, session_id, cwd, shell).await,
        Request::Diagnose { session_id, command, output, cwd, shell } => {
            suggest::handle_diagnose(ctx, session_id, command, output, cwd, shell).await
        }

        Request::FetchHistory { session_id, global, filter, limit, offset, mode } => {
            history::handle_fetch_history(ctx, session_id, global, filter, limit, offset, mode).await
        }
        Request::ImportHistory { session_id, shell, if_not_exists } => {
            history::handle_import_history(ctx, session_id, shell, if_not_exists).await
        }

        Request::RecordFeedback { session_id, suggested_text, action } => {
            feedback::handle_feedback(ctx, session_id, suggested_text, action).await
        }
        Request::SuggestFeedback { session_id, suggested_text, action } => {
            feedback::handle_feedback(ctx, session_id, suggested_text, action).await
        }

        Request::WorkflowRunStart { run_id, name } => workflow::handle_run_start(ctx, run_id, name).await,
        Request::WorkflowStepUpdate { run_id, step, status } => {
            workflow::handle_step_update(ctx, run_id, step, status).await
        }
        Request::WorkflowRunEnd { run_id, status } => workflow::handle_run_end(ctx, run_id, status).await,
        Request::AnalyzeStepOutput { run_id, step, output } => {
            workflow::handle_analyze_step_output(ctx, run_id, step, output).await
        }
        Request::Shutdown => {
            let _ = ctx.shutdown.send(true);
            Response::ShuttingDown
        }
    }
}

fn request_name(request: &Request) -> &'static str {
    match request {
        Request::SessionStart { .. } => "SessionStart",
        Request::SessionEnd { .. } => "SessionEnd",
        Request::CommandStarted { .. } => "CommandStarted",
        Request::CommandEnded { .. } => "CommandEnded",
        Request::Suggest { .. } => "Suggest",
        Request::TextToCommand { .. } => "TextToCommand",
        Request::NextStep { .. } => "NextStep",
        Request::Diagnose { .. } => "Diagnose",
        Request::FetchHistory { .. } => "FetchHistory",
        Request::ImportHistory { .. } => "ImportHistory",
        Request::RecordFeedback { .. } => "RecordFeedback",
        Request::SuggestFeedback { .. } => "SuggestFeedback",
        Request::Ping => "Ping",
        Request::GetStatus => "GetStatus",
        Request::WorkflowRunStart { .. } => "WorkflowRunStart",
        Request::WorkflowStepUpdate { .. } => "WorkflowStepUpdate",
        Request::WorkflowRunEnd { .. } => "WorkflowRunEnd",
        Request::AnalyzeStepOutput { .. } => "AnalyzeStepOutput",
        Request::Shutdown => "Shutdown",
    }
}

fn response_status(response: &Response) -> &'static str {
    match response {
        Response::Error { .. } => "error",
        _ => "ok",
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
