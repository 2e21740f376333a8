//! Move legality and capture resolution.
//!
//! [`resolve`] is the single source of truth for what a piece may do: it is a
//! pure function from (board, source, destination) to either a successor
//! board plus the captured cells, or the specific rejection reason. It is
//! turn-agnostic; turn enforcement belongs to the session.

use crate::{Board, Cell, IllegalMove};

/// The result of a legal move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Successor board: source emptied, captures removed, mover on the
    /// destination.
    pub board: Board,
    /// Captured cells in removal order: intermediate first, destination last.
    /// Empty for a non-capturing move.
    pub captures: Vec<Cell>,
}

/// Decide whether the piece at `from` may move to `to`, and compute the
/// resulting board if so.
///
/// Deterministic and side-effect free: identical inputs always produce
/// identical outputs. Pawn moves capture at most the destination; hero moves
/// additionally capture a hostile piece on the intermediate cell, and are
/// blocked outright when that cell holds a friendly piece.
pub fn resolve(board: &Board, from: Cell, to: Cell) -> Result<Resolution, IllegalMove> {
    let piece = board.occupant(from).ok_or(IllegalMove::NoPieceAtSource)?;

    if !to.in_bounds() {
        return Err(IllegalMove::OutOfBounds);
    }

    let delta = from.offset_to(to);
    if !piece.kind.offsets().contains(&delta) {
        return Err(IllegalMove::IllegalGeometry);
    }

    let mut captures = Vec::new();

    if piece.kind.is_two_step() {
        let mid = from.midpoint(to);
        match board.occupant(mid) {
            Some(blocker) if blocker.owner == piece.owner => {
                return Err(IllegalMove::BlockedByFriendly)
            }
            Some(_) => captures.push(mid),
            None => {}
        }
    }

    match board.occupant(to) {
        Some(target) if target.owner == piece.owner => return Err(IllegalMove::FriendlyFire),
        Some(_) => captures.push(to),
        None => {}
    }

    let mut next = *board;
    next.place(from, None);
    for &cell in &captures {
        next.place(cell, None);
    }
    next.place(to, Some(piece));

    Ok(Resolution {
        board: next,
        captures,
    })
}

/// All destinations the piece at `from` may legally move to.
///
/// This is the authoritative version of the highlight computation a client
/// performs locally; presentation layers may mirror the offset tables for
/// responsiveness but must re-validate through [`resolve`].
pub fn legal_destinations(board: &Board, from: Cell) -> Vec<Cell> {
    let Some(piece) = board.occupant(from) else {
        return Vec::new();
    };
    piece
        .kind
        .offsets()
        .iter()
        .filter_map(|&(dr, dc)| from.offset(dr, dc))
        .filter(|&to| resolve(board, from, to).is_ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Piece, PieceKind, Player};

    fn piece(owner: Player, kind: PieceKind) -> Option<Piece> {
        Some(Piece::new(owner, kind))
    }

    #[test]
    fn test_pawn_step_to_empty_cell() {
        let mut board = Board::new();
        board.place(Cell::new(4, 2), piece(Player::A, PieceKind::Pawn));

        let res = resolve(&board, Cell::new(4, 2), Cell::new(3, 2)).unwrap();
        assert!(res.captures.is_empty());
        assert_eq!(res.board.occupant(Cell::new(4, 2)), None);
        assert_eq!(
            res.board.occupant(Cell::new(3, 2)),
            piece(Player::A, PieceKind::Pawn)
        );
    }

    #[test]
    fn test_pawn_captures_opponent_on_destination() {
        let mut board = Board::new();
        board.place(Cell::new(2, 2), piece(Player::A, PieceKind::Pawn));
        board.place(Cell::new(2, 3), piece(Player::B, PieceKind::Pawn));

        let res = resolve(&board, Cell::new(2, 2), Cell::new(2, 3)).unwrap();
        assert_eq!(res.captures, vec![Cell::new(2, 3)]);
        assert_eq!(
            res.board.occupant(Cell::new(2, 3)),
            piece(Player::A, PieceKind::Pawn)
        );
        assert_eq!(res.board.piece_count(Player::B), 0);
    }

    #[test]
    fn test_pawn_cannot_capture_own_piece() {
        let mut board = Board::new();
        board.place(Cell::new(2, 2), piece(Player::A, PieceKind::Pawn));
        board.place(Cell::new(2, 3), piece(Player::A, PieceKind::HeroDiagonal));

        assert_eq!(
            resolve(&board, Cell::new(2, 2), Cell::new(2, 3)),
            Err(IllegalMove::FriendlyFire)
        );
    }

    #[test]
    fn test_pawn_rejects_two_step() {
        let mut board = Board::new();
        board.place(Cell::new(4, 2), piece(Player::A, PieceKind::Pawn));

        assert_eq!(
            resolve(&board, Cell::new(4, 2), Cell::new(2, 2)),
            Err(IllegalMove::IllegalGeometry)
        );
        assert_eq!(
            resolve(&board, Cell::new(4, 2), Cell::new(3, 3)),
            Err(IllegalMove::IllegalGeometry)
        );
    }

    #[test]
    fn test_empty_source_rejected() {
        let board = Board::new();
        assert_eq!(
            resolve(&board, Cell::new(2, 2), Cell::new(2, 3)),
            Err(IllegalMove::NoPieceAtSource)
        );
    }

    #[test]
    fn test_destination_off_board_rejected() {
        let mut board = Board::new();
        board.place(Cell::new(4, 4), piece(Player::A, PieceKind::Pawn));

        assert_eq!(
            resolve(&board, Cell::new(4, 4), Cell::new(5, 4)),
            Err(IllegalMove::OutOfBounds)
        );
    }

    #[test]
    fn test_hero_jump_over_empty_intermediate() {
        let mut board = Board::new();
        board.place(Cell::new(4, 0), piece(Player::A, PieceKind::HeroOrthogonal));

        let res = resolve(&board, Cell::new(4, 0), Cell::new(2, 0)).unwrap();
        assert!(res.captures.is_empty());
        assert_eq!(
            res.board.occupant(Cell::new(2, 0)),
            piece(Player::A, PieceKind::HeroOrthogonal)
        );
    }

    #[test]
    fn test_hero_path_capture() {
        // A's H1 at (4,0), B's pawn on the intermediate (3,0), empty
        // destination (2,0).
        let mut board = Board::new();
        board.place(Cell::new(4, 0), piece(Player::A, PieceKind::HeroOrthogonal));
        board.place(Cell::new(3, 0), piece(Player::B, PieceKind::Pawn));

        let res = resolve(&board, Cell::new(4, 0), Cell::new(2, 0)).unwrap();
        assert_eq!(res.captures, vec![Cell::new(3, 0)]);
        assert_eq!(res.board.occupant(Cell::new(3, 0)), None);
        assert_eq!(
            res.board.occupant(Cell::new(2, 0)),
            piece(Player::A, PieceKind::HeroOrthogonal)
        );
        assert_eq!(res.board.piece_count(Player::B), 0);
    }

    #[test]
    fn test_hero_double_capture() {
        let mut board = Board::new();
        board.place(Cell::new(4, 0), piece(Player::A, PieceKind::HeroOrthogonal));
        board.place(Cell::new(3, 0), piece(Player::B, PieceKind::Pawn));
        board.place(Cell::new(2, 0), piece(Player::B, PieceKind::HeroDiagonal));

        let res = resolve(&board, Cell::new(4, 0), Cell::new(2, 0)).unwrap();
        // Intermediate first, destination last.
        assert_eq!(res.captures, vec![Cell::new(3, 0), Cell::new(2, 0)]);
        assert_eq!(res.board.piece_count(Player::B), 0);
        assert_eq!(
            res.board.occupant(Cell::new(2, 0)),
            piece(Player::A, PieceKind::HeroOrthogonal)
        );
    }

    #[test]
    fn test_hero_blocked_by_friendly_intermediate() {
        // A friendly pawn on the intermediate cell blocks the jump outright.
        let mut board = Board::new();
        board.place(Cell::new(4, 0), piece(Player::A, PieceKind::HeroOrthogonal));
        board.place(Cell::new(3, 0), piece(Player::A, PieceKind::Pawn));

        assert_eq!(
            resolve(&board, Cell::new(4, 0), Cell::new(2, 0)),
            Err(IllegalMove::BlockedByFriendly)
        );
    }

    #[test]
    fn test_hero_friendly_destination_after_hostile_intermediate() {
        // A hostile intermediate does not rescue a friendly destination.
        let mut board = Board::new();
        board.place(Cell::new(4, 0), piece(Player::A, PieceKind::HeroOrthogonal));
        board.place(Cell::new(3, 0), piece(Player::B, PieceKind::Pawn));
        board.place(Cell::new(2, 0), piece(Player::A, PieceKind::Pawn));

        assert_eq!(
            resolve(&board, Cell::new(4, 0), Cell::new(2, 0)),
            Err(IllegalMove::FriendlyFire)
        );
    }

    #[test]
    fn test_hero_diagonal_path_capture() {
        let mut board = Board::new();
        board.place(Cell::new(4, 4), piece(Player::B, PieceKind::HeroDiagonal));
        board.place(Cell::new(3, 3), piece(Player::A, PieceKind::Pawn));

        let res = resolve(&board, Cell::new(4, 4), Cell::new(2, 2)).unwrap();
        assert_eq!(res.captures, vec![Cell::new(3, 3)]);
        assert_eq!(
            res.board.occupant(Cell::new(2, 2)),
            piece(Player::B, PieceKind::HeroDiagonal)
        );
    }

    #[test]
    fn test_hero_diagonal_rejects_orthogonal_jump() {
        let mut board = Board::new();
        board.place(Cell::new(2, 2), piece(Player::A, PieceKind::HeroDiagonal));

        assert_eq!(
            resolve(&board, Cell::new(2, 2), Cell::new(0, 2)),
            Err(IllegalMove::IllegalGeometry)
        );
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let mut board = Board::new();
        board.place(Cell::new(4, 0), piece(Player::A, PieceKind::HeroOrthogonal));
        board.place(Cell::new(3, 0), piece(Player::B, PieceKind::Pawn));

        let first = resolve(&board, Cell::new(4, 0), Cell::new(2, 0));
        let second = resolve(&board, Cell::new(4, 0), Cell::new(2, 0));
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_does_not_mutate_input() {
        let mut board = Board::new();
        board.place(Cell::new(4, 2), piece(Player::A, PieceKind::Pawn));
        let before = board;

        resolve(&board, Cell::new(4, 2), Cell::new(3, 2)).unwrap();
        assert_eq!(board, before);
    }

    /// Geometry exhaustiveness: with a lone mover on the board, acceptance
    /// must match the kind's offset set for every (source, destination) pair.
    #[test]
    fn test_geometry_exhaustive_per_kind() {
        for kind in PieceKind::all() {
            for from in Cell::all() {
                let mut board = Board::new();
                board.place(from, piece(Player::A, kind));

                for to in Cell::all() {
                    let expected = kind.offsets().contains(&from.offset_to(to));
                    let actual = resolve(&board, from, to).is_ok();
                    assert_eq!(
                        actual, expected,
                        "kind {kind:?}: {from} -> {to} acceptance mismatch"
                    );
                }
            }
        }
    }

    #[test]
    fn test_board_conservation() {
        // Piece count after = before - captures, for every legal move from a
        // mixed position.
        let mut board = Board::new();
        board.place(Cell::new(4, 0), piece(Player::A, PieceKind::HeroOrthogonal));
        board.place(Cell::new(4, 2), piece(Player::A, PieceKind::Pawn));
        board.place(Cell::new(3, 0), piece(Player::B, PieceKind::Pawn));
        board.place(Cell::new(2, 0), piece(Player::B, PieceKind::HeroDiagonal));
        let total = board.piece_count(Player::A) + board.piece_count(Player::B);

        for from in Cell::all() {
            for to in Cell::all() {
                if let Ok(res) = resolve(&board, from, to) {
                    let after =
                        res.board.piece_count(Player::A) + res.board.piece_count(Player::B);
                    assert_eq!(after, total - res.captures.len());
                    assert!(res.captures.len() <= 2);
                }
            }
        }
    }

    #[test]
    fn test_legal_destinations_pawn_center_and_corner() {
        let mut board = Board::new();
        board.place(Cell::new(2, 2), piece(Player::A, PieceKind::Pawn));
        assert_eq!(legal_destinations(&board, Cell::new(2, 2)).len(), 4);

        let mut board = Board::new();
        board.place(Cell::new(0, 0), piece(Player::A, PieceKind::Pawn));
        let dests = legal_destinations(&board, Cell::new(0, 0));
        assert_eq!(dests.len(), 2);
        assert!(dests.contains(&Cell::new(1, 0)));
        assert!(dests.contains(&Cell::new(0, 1)));
    }

    #[test]
    fn test_legal_destinations_excludes_blocked_and_friendly() {
        let mut board = Board::new();
        board.place(Cell::new(4, 0), piece(Player::A, PieceKind::HeroOrthogonal));
        board.place(Cell::new(3, 0), piece(Player::A, PieceKind::Pawn));
        board.place(Cell::new(4, 2), piece(Player::A, PieceKind::HeroDiagonal));

        let dests = legal_destinations(&board, Cell::new(4, 0));
        // (2,0) blocked by friendly intermediate, (4,2) friendly destination.
        assert!(!dests.contains(&Cell::new(2, 0)));
        assert!(!dests.contains(&Cell::new(4, 2)));
    }

    #[test]
    fn test_legal_destinations_empty_source() {
        let board = Board::new();
        assert!(legal_destinations(&board, Cell::new(2, 2)).is_empty());
    }
}
