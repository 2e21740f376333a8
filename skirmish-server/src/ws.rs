//! WebSocket transport.
//!
//! One socket per participant. Everything the participant sees flows through
//! a single outbound queue: direct replies (snapshots on attach, rejections)
//! and the session broadcast a forwarding task drains into it. Rejections
//! never reach the other participant.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::registry::{MoveRequest, PieceRef, RegistryError};
use crate::AppState;

/// Outbound messages queued per participant before backpressure kicks in.
const OUTBOUND_BUFFER: usize = 32;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerMessage>(OUTBOUND_BUFFER);

    // Writer task: single point where frames leave the process.
    let mut writer: JoinHandle<()> = tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!(%err, "failed to encode server message");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Forwarding task for the session this participant is attached to.
    let mut forward: Option<JoinHandle<()>> = None;

    loop {
        tokio::select! {
            incoming = stream.next() => {
                let message = match incoming {
                    Some(Ok(message)) => message,
                    Some(Err(_)) | None => break,
                };
                let text = match message {
                    Message::Text(text) => text,
                    Message::Close(_) => break,
                    _ => continue,
                };
                match serde_json::from_str::<ClientMessage>(text.as_str()) {
                    Ok(request) => {
                        handle_message(request, &state, &out_tx, &mut forward).await;
                    }
                    Err(err) => {
                        reply(
                            &out_tx,
                            ServerMessage::InvalidMove {
                                message: format!("malformed request: {err}"),
                            },
                        )
                        .await;
                    }
                }
            }
            _ = &mut writer => break,
        }
    }

    if let Some(task) = forward {
        task.abort();
    }
    writer.abort();
}

async fn handle_message(
    request: ClientMessage,
    state: &AppState,
    out_tx: &mpsc::Sender<ServerMessage>,
    forward: &mut Option<JoinHandle<()>>,
) {
    match request {
        ClientMessage::InitializeGame {
            session,
            player_a_roster,
            player_b_roster,
        } => match state
            .registry
            .initialize(&session, &player_a_roster, &player_b_roster)
        {
            Ok(_) => attach(state, &session, out_tx, forward).await,
            Err(err) => reply_rejection(out_tx, &err).await,
        },
        ClientMessage::JoinGame { session } => attach(state, &session, out_tx, forward).await,
        ClientMessage::MakeMove {
            session,
            player,
            piece,
            from,
            to,
        } => {
            let piece = match (from, piece) {
                (Some(cell), _) => PieceRef::Cell(cell),
                (None, Some(kind)) => PieceRef::Kind(kind),
                (None, None) => {
                    reply(
                        out_tx,
                        ServerMessage::InvalidMove {
                            message: "move must name a source cell or a piece kind".to_owned(),
                        },
                    )
                    .await;
                    return;
                }
            };
            let request = MoveRequest { player, piece, to };
            if let Err(err) = state.registry.submit(&session, request) {
                // Requester only; the broadcast stays silent on rejection.
                reply_rejection(out_tx, &err).await;
            }
        }
    }
}

/// Subscribe to a session and start forwarding its broadcast into this
/// participant's outbound queue, replacing any previous attachment.
async fn attach(
    state: &AppState,
    session: &str,
    out_tx: &mpsc::Sender<ServerMessage>,
    forward: &mut Option<JoinHandle<()>>,
) {
    let (snapshot, mut receiver) = match state.registry.subscribe(session) {
        Ok(attached) => attached,
        Err(err) => {
            reply_rejection(out_tx, &err).await;
            return;
        }
    };

    reply(
        out_tx,
        ServerMessage::GameInitialized {
            board: snapshot.board,
            current_player: snapshot.current_player,
        },
    )
    .await;

    if let Some(previous) = forward.take() {
        previous.abort();
    }
    let out_tx = out_tx.clone();
    *forward = Some(tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if out_tx.send(event).await.is_err() {
                        break;
                    }
                }
                // A lagging participant skips to the freshest state; every
                // broadcast carries the full board, so nothing is lost.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }));
}

async fn reply(out_tx: &mpsc::Sender<ServerMessage>, message: ServerMessage) {
    let _ = out_tx.send(message).await;
}

async fn reply_rejection(out_tx: &mpsc::Sender<ServerMessage>, err: &RegistryError) {
    reply(
        out_tx,
        ServerMessage::InvalidMove {
            message: err.to_string(),
        },
    )
    .await;
}
