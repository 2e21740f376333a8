//! Skirmish game logic: a two-player capture game on a 5x5 grid.
//!
//! # Board Layout
//!
//! ```text
//! Rows and columns are 0-based, row 0 at the top:
//!
//!        col 0  col 1  col 2  col 3  col 4
//! row 0  B  B  B  ...                       <- player B's back row
//! row 1
//! row 2
//! row 3
//! row 4  A  A  A  ...                       <- player A's back row
//! ```
//!
//! Each player fields a roster of typed pieces. A pawn steps one cell
//! orthogonally; the two hero kinds jump exactly two cells (orthogonally or
//! diagonally) and capture anything hostile on the intermediate cell as well
//! as on the destination. A player who loses every piece loses the game.
//!
//! The crate is pure and synchronous: [`resolver::resolve`] is a deterministic
//! function from (board, source, destination) to a successor board, and
//! [`session::GameSession`] is the only stateful entry point. Networking and
//! fan-out live in the server crate.

pub mod error;
pub mod resolver;
pub mod session;

pub use error::{IllegalMove, SetupError};
pub use resolver::{legal_destinations, resolve, Resolution};
pub use session::{GameSession, GameSnapshot, MoveOutcome, MoveRecord, Status};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Board side length. The grid is always `BOARD_SIZE` x `BOARD_SIZE`.
pub const BOARD_SIZE: u8 = 5;

/// Player identifier.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Player {
    A,
    B,
}

impl Player {
    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::A => write!(f, "A"),
            Player::B => write!(f, "B"),
        }
    }
}

/// Piece kind. Wire names match the classic client codes: `P`, `H1`, `H2`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    /// Single-step orthogonal mover.
    #[serde(rename = "P")]
    Pawn,
    /// Two-step orthogonal jumper with path capture.
    #[serde(rename = "H1")]
    HeroOrthogonal,
    /// Two-step diagonal jumper with path capture.
    #[serde(rename = "H2")]
    HeroDiagonal,
}

impl PieceKind {
    /// The coordinate offsets this kind may move by in one turn.
    pub fn offsets(self) -> &'static [(i8, i8)] {
        match self {
            PieceKind::Pawn => &[(-1, 0), (1, 0), (0, -1), (0, 1)],
            PieceKind::HeroOrthogonal => &[(-2, 0), (2, 0), (0, -2), (0, 2)],
            PieceKind::HeroDiagonal => &[(-2, -2), (-2, 2), (2, -2), (2, 2)],
        }
    }

    /// Whether moves of this kind pass through an intermediate cell.
    #[inline]
    pub fn is_two_step(self) -> bool {
        !matches!(self, PieceKind::Pawn)
    }

    /// Short code used in history records and logs.
    pub fn code(self) -> &'static str {
        match self {
            PieceKind::Pawn => "P",
            PieceKind::HeroOrthogonal => "H1",
            PieceKind::HeroDiagonal => "H2",
        }
    }

    /// Iterate over all piece kinds.
    pub fn all() -> impl Iterator<Item = PieceKind> {
        [
            PieceKind::Pawn,
            PieceKind::HeroOrthogonal,
            PieceKind::HeroDiagonal,
        ]
        .into_iter()
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A piece on the board: who owns it and how it moves.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub owner: Player,
    pub kind: PieceKind,
}

impl Piece {
    #[inline]
    pub fn new(owner: Player, kind: PieceKind) -> Piece {
        Piece { owner, kind }
    }
}

/// A coordinate on the grid. Valid cells have both components in `[0, 5)`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: u8,
    pub col: u8,
}

impl Cell {
    #[inline]
    pub fn new(row: u8, col: u8) -> Cell {
        Cell { row, col }
    }

    /// Check that both coordinates are on the grid.
    #[inline]
    pub fn in_bounds(self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    /// Offset from `self` to `other` as (row delta, col delta).
    #[inline]
    pub fn offset_to(self, other: Cell) -> (i8, i8) {
        (
            other.row as i8 - self.row as i8,
            other.col as i8 - self.col as i8,
        )
    }

    /// The cell at `self + (dr, dc)`, or `None` if it leaves the grid.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Cell> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if (0..BOARD_SIZE as i8).contains(&row) && (0..BOARD_SIZE as i8).contains(&col) {
            Some(Cell::new(row as u8, col as u8))
        } else {
            None
        }
    }

    /// The single cell halfway between two cells that are two steps apart.
    ///
    /// Only meaningful for hero offsets; both cells must be in bounds.
    #[inline]
    pub(crate) fn midpoint(self, other: Cell) -> Cell {
        Cell::new((self.row + other.row) / 2, (self.col + other.col) / 2)
    }

    /// Iterate over all cells in row-major order.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Cell::new(row, col)))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// The 5x5 grid of occupants. At most one piece per cell; the shape never
/// changes.
///
/// Serializes as a bare 5x5 grid of `null | {owner, kind}` values, which is
/// exactly the board snapshot format the transport sends.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Option<Piece>; BOARD_SIZE as usize]; BOARD_SIZE as usize],
}

impl Board {
    /// Create an empty board.
    #[inline]
    pub fn new() -> Board {
        Board::default()
    }

    /// Get the occupant of a cell. Out-of-bounds cells are always empty.
    #[inline]
    pub fn occupant(&self, cell: Cell) -> Option<Piece> {
        if cell.in_bounds() {
            self.cells[cell.row as usize][cell.col as usize]
        } else {
            None
        }
    }

    /// Set the occupant of a cell (`None` empties it).
    #[inline]
    pub fn place(&mut self, cell: Cell, occupant: Option<Piece>) {
        debug_assert!(cell.in_bounds());
        self.cells[cell.row as usize][cell.col as usize] = occupant;
    }

    /// Check if a cell is empty.
    #[inline]
    pub fn is_empty(&self, cell: Cell) -> bool {
        self.occupant(cell).is_none()
    }

    /// Count the pieces a player has left on the board.
    pub fn piece_count(&self, player: Player) -> usize {
        self.occupied()
            .filter(|(_, piece)| piece.owner == player)
            .count()
    }

    /// Find a player's piece of the given kind, scanning row-major.
    ///
    /// This backs the kind-addressed wire interface; roster validation
    /// guarantees at most one live piece per (player, kind).
    pub fn locate(&self, player: Player, kind: PieceKind) -> Option<Cell> {
        self.occupied()
            .find(|(_, piece)| piece.owner == player && piece.kind == kind)
            .map(|(cell, _)| cell)
    }

    /// Iterate over all occupied cells in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (Cell, Piece)> + '_ {
        Cell::all().filter_map(|cell| self.occupant(cell).map(|piece| (cell, piece)))
    }
}
