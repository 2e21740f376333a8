//! Game session state machine.
//!
//! A [`GameSession`] owns one board, the active player, and the append-only
//! move history. It is mutated only through [`GameSession::apply_move`];
//! rejection leaves it byte-for-byte unchanged. The lifecycle is
//! `Active -> Over { winner }` with no transition out of `Over`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resolver::{self, Resolution};
use crate::{Board, Cell, IllegalMove, Piece, PieceKind, Player, SetupError, BOARD_SIZE};

/// Session lifecycle. `Over` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Status {
    Active,
    Over { winner: Player },
}

impl Status {
    #[inline]
    pub fn is_over(self) -> bool {
        matches!(self, Status::Over { .. })
    }
}

/// One applied move, as recorded in session history.
///
/// The `Display` rendering is what the transport ships in `move_history`,
/// e.g. `A-H1 (4,0) -> (2,0) captures (3,0)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub player: Player,
    pub kind: PieceKind,
    pub from: Cell,
    pub to: Cell,
    pub captures: Vec<Cell>,
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{} {} -> {}",
            self.player, self.kind, self.from, self.to
        )?;
        if !self.captures.is_empty() {
            write!(f, " captures ")?;
            for (i, cell) in self.captures.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{cell}")?;
            }
        }
        Ok(())
    }
}

/// What a successful `apply_move` produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Cells captured by the move, in removal order.
    pub captures: Vec<Cell>,
    /// Session status after the move.
    pub status: Status,
}

/// Serialized copy of session state. This is what clients hold: a transmitted
/// snapshot, never a reference to the live session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub board: Board,
    pub current_player: Player,
    pub history: Vec<String>,
    pub status: Status,
}

/// One in-progress game: board, turn, history, lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    board: Board,
    current_player: Player,
    history: Vec<MoveRecord>,
    status: Status,
}

impl GameSession {
    /// Most pieces a roster can field: one per back-row cell.
    pub const MAX_ROSTER: usize = BOARD_SIZE as usize;

    /// Create a session with the given rosters.
    ///
    /// Player A's pieces fill row 4 from column 0, player B's fill row 0 from
    /// column 0, in roster order. A moves first.
    ///
    /// A roster is rejected when it is empty, longer than the back row, or
    /// repeats a kind (the kind-addressed wire interface requires at most one
    /// live piece per kind per player).
    pub fn new(roster_a: &[PieceKind], roster_b: &[PieceKind]) -> Result<GameSession, SetupError> {
        validate_roster(Player::A, roster_a)?;
        validate_roster(Player::B, roster_b)?;

        let mut board = Board::new();
        for (i, &kind) in roster_a.iter().enumerate() {
            board.place(
                Cell::new(BOARD_SIZE - 1, i as u8),
                Some(Piece::new(Player::A, kind)),
            );
        }
        for (i, &kind) in roster_b.iter().enumerate() {
            board.place(Cell::new(0, i as u8), Some(Piece::new(Player::B, kind)));
        }

        Ok(GameSession {
            board,
            current_player: Player::A,
            history: Vec::new(),
            status: Status::Active,
        })
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.status
    }

    /// Applied moves, oldest first.
    #[inline]
    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// Kind-addressed piece lookup, for clients that identify pieces by type
    /// rather than coordinate.
    pub fn locate_piece(&self, player: Player, kind: PieceKind) -> Option<Cell> {
        self.board.locate(player, kind)
    }

    /// Produce the serializable copy of the current state.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board,
            current_player: self.current_player,
            history: self.history.iter().map(MoveRecord::to_string).collect(),
            status: self.status,
        }
    }

    /// Validate and apply one move for `player`.
    ///
    /// On success the board is replaced, one history record is appended, and
    /// win detection runs immediately: if the opponent has no pieces left the
    /// session becomes `Over { winner: player }` and the turn does not flip;
    /// otherwise the turn passes to the opponent.
    ///
    /// On rejection the session is untouched.
    pub fn apply_move(
        &mut self,
        player: Player,
        from: Cell,
        to: Cell,
    ) -> Result<MoveOutcome, IllegalMove> {
        if self.status.is_over() {
            return Err(IllegalMove::GameAlreadyOver);
        }
        if player != self.current_player {
            return Err(IllegalMove::NotYourTurn);
        }

        let piece = self.board.occupant(from).ok_or(IllegalMove::NoPieceAtSource)?;
        if piece.owner != player {
            return Err(IllegalMove::NotYourTurn);
        }

        let Resolution { board, captures } = resolver::resolve(&self.board, from, to)?;

        self.board = board;
        self.history.push(MoveRecord {
            player,
            kind: piece.kind,
            from,
            to,
            captures: captures.clone(),
        });

        let opponent = player.opponent();
        if self.board.piece_count(opponent) == 0 {
            self.status = Status::Over { winner: player };
        } else {
            self.current_player = opponent;
        }

        Ok(MoveOutcome {
            captures,
            status: self.status,
        })
    }
}

fn validate_roster(player: Player, roster: &[PieceKind]) -> Result<(), SetupError> {
    if roster.is_empty() {
        return Err(SetupError::InvalidRoster(format!(
            "player {player} roster is empty"
        )));
    }
    if roster.len() > GameSession::MAX_ROSTER {
        return Err(SetupError::InvalidRoster(format!(
            "player {player} roster has {} pieces, back row holds {}",
            roster.len(),
            GameSession::MAX_ROSTER
        )));
    }
    for (i, kind) in roster.iter().enumerate() {
        if roster[..i].contains(kind) {
            return Err(SetupError::InvalidRoster(format!(
                "player {player} roster repeats {kind}"
            )));
        }
    }
    Ok(())
}
