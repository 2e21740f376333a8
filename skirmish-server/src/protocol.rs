//! Wire protocol for the WebSocket transport.
//!
//! Message tags mirror the event names of the classic Socket.IO client
//! (`initialize_game`, `make_move`, `game_initialized`, `update_board`,
//! `invalid_move`, `game_over`), so an existing client maps onto this
//! transport one-to-one. Every message names its session; clients that only
//! ever play one game can omit it and get `"default"`.

use serde::{Deserialize, Serialize};
use skirmish_core::{Board, Cell, PieceKind, Player};

fn default_session() -> String {
    "default".to_owned()
}

/// Requests a participant may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create (or reset) a session and attach to its event stream.
    InitializeGame {
        #[serde(default = "default_session")]
        session: String,
        player_a_roster: Vec<PieceKind>,
        player_b_roster: Vec<PieceKind>,
    },
    /// Attach to an existing session's event stream.
    JoinGame {
        #[serde(default = "default_session")]
        session: String,
    },
    /// Submit a move. The piece is named either by its source cell (`from`,
    /// the primary interface) or by its kind (`piece`, the compatibility
    /// shim for clients that identify pieces by type).
    MakeMove {
        #[serde(default = "default_session")]
        session: String,
        player: Player,
        #[serde(default)]
        piece: Option<PieceKind>,
        #[serde(default)]
        from: Option<Cell>,
        to: Cell,
    },
}

/// Events and replies the server sends.
///
/// `InvalidMove` only ever goes to the requesting participant; the other
/// three fan out to everyone attached to the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    GameInitialized {
        board: Board,
        current_player: Player,
    },
    UpdateBoard {
        board: Board,
        current_player: Player,
        move_history: Vec<String>,
    },
    InvalidMove {
        message: String,
    },
    GameOver {
        winner: Player,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_move_by_kind() {
        let json = r#"{"type":"make_move","player":"A","piece":"H1","to":{"row":2,"col":0}}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ClientMessage::MakeMove {
                session: "default".to_owned(),
                player: Player::A,
                piece: Some(PieceKind::HeroOrthogonal),
                from: None,
                to: Cell::new(2, 0),
            }
        );
    }

    #[test]
    fn test_make_move_by_cell() {
        let json = r#"
            {"type":"make_move","session":"table-9","player":"B",
             "from":{"row":0,"col":2},"to":{"row":1,"col":2}}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ClientMessage::MakeMove {
                session: "table-9".to_owned(),
                player: Player::B,
                piece: None,
                from: Some(Cell::new(0, 2)),
                to: Cell::new(1, 2),
            }
        );
    }

    #[test]
    fn test_initialize_game_rosters() {
        let json = r#"
            {"type":"initialize_game",
             "player_a_roster":["P","H1","H2"],
             "player_b_roster":["P","H1","H2"]}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::InitializeGame {
                session,
                player_a_roster,
                player_b_roster,
            } => {
                assert_eq!(session, "default");
                assert_eq!(player_a_roster.len(), 3);
                assert_eq!(player_b_roster[2], PieceKind::HeroDiagonal);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn test_server_message_tags() {
        let over = serde_json::to_value(ServerMessage::GameOver { winner: Player::A }).unwrap();
        assert_eq!(over["type"], "game_over");
        assert_eq!(over["winner"], "A");

        let invalid = serde_json::to_value(ServerMessage::InvalidMove {
            message: "not your turn".to_owned(),
        })
        .unwrap();
        assert_eq!(invalid["type"], "invalid_move");
        assert_eq!(invalid["message"], "not your turn");
    }

    #[test]
    fn test_update_board_shape() {
        let board = Board::new();
        let msg = ServerMessage::UpdateBoard {
            board,
            current_player: Player::B,
            move_history: vec!["A-P (4,0) -> (3,0)".to_owned()],
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "update_board");
        assert_eq!(json["current_player"], "B");
        assert_eq!(json["board"].as_array().unwrap().len(), 5);
        assert_eq!(json["move_history"][0], "A-P (4,0) -> (3,0)");
    }
}
