//! Session registry and sync layer.
//!
//! Owns the map from session identifier to live [`GameSession`] and turns
//! session transitions into outbound [`ServerMessage`] events. All mutation
//! of one session happens under that session's own lock, so at most one
//! `apply_move` runs at a time per session id and history order is exactly
//! admission order. Engine calls are synchronous and never await, so a
//! blocking `std::sync::Mutex` is the right tool here.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::broadcast;

use skirmish_core::{
    legal_destinations, Cell, GameSession, GameSnapshot, IllegalMove, PieceKind, Player,
    SetupError, Status,
};

use crate::protocol::ServerMessage;

/// Events buffered per session before a slow subscriber starts lagging.
const EVENT_BUFFER: usize = 32;

/// Errors the registry reports to the requesting participant.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown session")]
    SessionNotFound,

    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error(transparent)]
    Move(#[from] IllegalMove),
}

/// How a move request names the piece to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceRef {
    /// By source cell. The primary interface.
    Cell(Cell),
    /// By kind, resolved with a row-major board scan. Compatibility shim for
    /// clients that identify pieces by type; rosters guarantee uniqueness.
    Kind(PieceKind),
}

/// A move submission, transport-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub player: Player,
    pub piece: PieceRef,
    pub to: Cell,
}

/// One live session plus its event fan-out channel.
struct SessionHandle {
    game: Mutex<GameSession>,
    events: broadcast::Sender<ServerMessage>,
}

impl SessionHandle {
    fn new(game: GameSession) -> SessionHandle {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        SessionHandle {
            game: Mutex::new(game),
            events,
        }
    }
}

/// Maps session identifiers to live sessions and fans events out to the
/// participants attached to each.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Arc<SessionHandle>>>,
}

impl SessionRegistry {
    pub fn new() -> SessionRegistry {
        SessionRegistry::default()
    }

    /// Create a session, or reset an existing one in place (subscribers keep
    /// their event stream, matching the classic client's re-initialize).
    /// Broadcasts the initial state to anyone already attached.
    pub fn initialize(
        &self,
        id: &str,
        roster_a: &[PieceKind],
        roster_b: &[PieceKind],
    ) -> Result<GameSnapshot, RegistryError> {
        let game = GameSession::new(roster_a, roster_b)?;
        let snapshot = game.snapshot();

        let handle = {
            let mut sessions = self.sessions.lock().unwrap();
            if let Some(existing) = sessions.get(id) {
                *existing.game.lock().unwrap() = game;
                Arc::clone(existing)
            } else {
                let handle = Arc::new(SessionHandle::new(game));
                sessions.insert(id.to_owned(), Arc::clone(&handle));
                handle
            }
        };

        tracing::info!(session = id, "session initialized");
        let _ = handle.events.send(ServerMessage::GameInitialized {
            board: snapshot.board,
            current_player: snapshot.current_player,
        });
        Ok(snapshot)
    }

    /// Validate and apply one move.
    ///
    /// On success the new authoritative state is broadcast to every attached
    /// participant (`update_board`, or `game_over` when the move ended the
    /// game) and the snapshot is returned. On rejection nothing is broadcast
    /// and nothing changes; the reason goes back to the caller alone.
    pub fn submit(&self, id: &str, request: MoveRequest) -> Result<GameSnapshot, RegistryError> {
        let handle = self.handle(id)?;

        // Per-session serialization point: concurrent submissions for the
        // same id queue here and apply in lock order.
        let mut game = handle.game.lock().unwrap();
        let from = match request.piece {
            PieceRef::Cell(cell) => cell,
            PieceRef::Kind(kind) => game
                .locate_piece(request.player, kind)
                .ok_or(IllegalMove::NoPieceAtSource)?,
        };
        let outcome = game.apply_move(request.player, from, request.to)?;
        let snapshot = game.snapshot();
        drop(game);

        tracing::debug!(
            session = id,
            player = %request.player,
            %from,
            to = %request.to,
            captures = outcome.captures.len(),
            "move applied"
        );

        match outcome.status {
            Status::Over { winner } => {
                tracing::info!(session = id, %winner, "game over");
                let _ = handle.events.send(ServerMessage::GameOver { winner });
            }
            Status::Active => {
                let _ = handle.events.send(ServerMessage::UpdateBoard {
                    board: snapshot.board,
                    current_player: snapshot.current_player,
                    move_history: snapshot.history.clone(),
                });
            }
        }
        Ok(snapshot)
    }

    /// Attach to a session: current snapshot plus a receiver for everything
    /// broadcast from now on.
    pub fn subscribe(
        &self,
        id: &str,
    ) -> Result<(GameSnapshot, broadcast::Receiver<ServerMessage>), RegistryError> {
        let handle = self.handle(id)?;
        let receiver = handle.events.subscribe();
        let snapshot = handle.game.lock().unwrap().snapshot();
        Ok((snapshot, receiver))
    }

    /// Read-only copy of a session's current state.
    pub fn snapshot(&self, id: &str) -> Result<GameSnapshot, RegistryError> {
        let handle = self.handle(id)?;
        let snapshot = handle.game.lock().unwrap().snapshot();
        Ok(snapshot)
    }

    /// Legal destinations for the piece at `from`, for client highlighting.
    pub fn legal_destinations(&self, id: &str, from: Cell) -> Result<Vec<Cell>, RegistryError> {
        let handle = self.handle(id)?;
        let game = handle.game.lock().unwrap();
        Ok(legal_destinations(game.board(), from))
    }

    fn handle(&self, id: &str) -> Result<Arc<SessionHandle>, RegistryError> {
        self.sessions
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or(RegistryError::SessionNotFound)
    }
}
