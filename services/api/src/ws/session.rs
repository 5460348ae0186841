//! Manages the WebSocket connection lifecycle for one pipeline run.

use super::protocol::{ClientMessage, ServerMessage};
use crate::{
    models::{FailureResponse, PlanResponse},
    state::AppState,
};
use anyhow::{Result, anyhow};
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use learnpath_core::{RunOutcome, Topic};
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

const PROGRESS_BUFFER: usize = 32;

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Main handler for an individual WebSocket connection.
///
/// Waits for the `start` message, runs the pipeline while forwarding progress,
/// then sends exactly one terminal message and closes.
#[instrument(name = "ws_run", skip_all, fields(run_id))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let run_id = Uuid::new_v4();
    tracing::Span::current().record("run_id", &run_id.to_string());
    info!("New WebSocket connection. Awaiting start message...");

    let (mut socket_tx, mut socket_rx) = socket.split();

    let topic = match socket_rx.next().await {
        Some(Ok(Message::Text(text))) => parse_start(&text),
        Some(Ok(_)) => Err(anyhow!("First message was not a text `start` message.")),
        Some(Err(_)) | None => {
            info!("Client disconnected before sending start message.");
            return;
        }
    };
    let topic = match topic {
        Ok(topic) => topic,
        Err(e) => {
            warn!(error = %e, "Rejected WebSocket run");
            let _ = send_msg(
                &mut socket_tx,
                ServerMessage::Error {
                    message: e.to_string(),
                },
            )
            .await;
            let _ = socket_tx.close().await;
            return;
        }
    };

    if send_msg(
        &mut socket_tx,
        ServerMessage::Started {
            run_id,
            topic: topic.to_string(),
        },
    )
    .await
    .is_err()
    {
        error!("Failed to send Started message to client.");
        return;
    }

    let cancel = CancellationToken::new();
    let watcher = spawn_disconnect_watcher(socket_rx, cancel.clone());

    let outcome = match run_with_progress(&state, topic, &mut socket_tx, cancel).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(error = ?e, "Client went away during the run.");
            watcher.abort();
            return;
        }
    };
    watcher.abort();

    let terminal = match &outcome {
        RunOutcome::Complete(plan) => ServerMessage::Plan {
            plan: PlanResponse::from(plan),
        },
        RunOutcome::Failed(failure) => ServerMessage::Failed {
            failure: FailureResponse::from(failure),
        },
        RunOutcome::Cancelled => ServerMessage::Cancelled,
    };
    if let Err(e) = send_msg(&mut socket_tx, terminal).await {
        debug!(error = ?e, "Could not deliver the terminal message.");
    }
    let _ = socket_tx.close().await;
    info!("WebSocket run finished.");
}

fn parse_start(text: &str) -> Result<Topic> {
    match serde_json::from_str::<ClientMessage>(text)? {
        ClientMessage::Start { topic } => Ok(Topic::new(topic)?),
        ClientMessage::Cancel => Err(anyhow!("Nothing to cancel: no run has started.")),
    }
}

/// Runs the pipeline, forwarding each progress event as it arrives.
///
/// A failed send means the client is gone; the run is cancelled and the error
/// returned once the pipeline has stopped.
async fn run_with_progress(
    state: &AppState,
    topic: Topic,
    socket_tx: &mut SplitSink<WebSocket, Message>,
    cancel: CancellationToken,
) -> Result<RunOutcome> {
    let orchestrator = state.orchestrator();
    let (tx, mut rx) = mpsc::channel(PROGRESS_BUFFER);
    let run = orchestrator.run(topic, Some(tx), cancel.clone());
    tokio::pin!(run);

    let mut send_error = None;
    let outcome = loop {
        tokio::select! {
            outcome = &mut run => break outcome,
            Some(event) = rx.recv() => {
                if send_error.is_none() {
                    if let Err(e) = send_msg(socket_tx, ServerMessage::Progress { event }).await {
                        cancel.cancel();
                        send_error = Some(e);
                    }
                }
            }
        }
    };

    if let Some(e) = send_error {
        return Err(e);
    }
    while let Ok(event) = rx.try_recv() {
        send_msg(socket_tx, ServerMessage::Progress { event }).await?;
    }
    Ok(outcome)
}

/// Cancels the run when the client closes the socket or asks to cancel.
fn spawn_disconnect_watcher(
    mut socket_rx: SplitStream<WebSocket>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = socket_rx.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Ok(ClientMessage::Cancel) = serde_json::from_str(&text) {
                        info!("Client requested cancellation.");
                        break;
                    }
                    debug!("Ignoring client message during run.");
                }
                Ok(Message::Close(_)) | Err(_) => break,
                Ok(_) => {}
            }
        }
        cancel.cancel();
    })
}

/// Serializes and sends a `ServerMessage` to the client.
pub(crate) async fn send_msg(
    socket_tx: &mut SplitSink<WebSocket, Message>,
    msg: ServerMessage,
) -> Result<()> {
    let serialized = serde_json::to_string(&msg)?;
    socket_tx.send(Message::Text(serialized.into())).await?;
    Ok(())
}
