//! Pseudo-legal move generation.
//!
//! One generator per piece kind, selected by `match` on [`PieceKind`]. Each
//! produces the piece's pseudo-legal destinations and, separately, the
//! squares it attacks. The two differ for pawns (diagonals are attacked even
//! when empty, forward steps never are) and for kings (every adjacent square
//! is attacked, but kings never capture kings). Castling targets need the
//! opponent's attack set and are produced by [`castle_target`].

use crate::engine::board::Position;
use crate::engine::pieces::{PieceSet, PieceState};
use crate::engine::types::{Bitboard, CastleSide, Color, Piece, PieceKind, Square};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-1, -2),
    (1, -2),
    (-2, -1),
    (2, -1),
    (-1, 2),
    (1, 2),
    (-2, 1),
    (2, 1),
];

const ORTHOGONAL: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

const DIAGONAL: [(i8, i8); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

const ADJACENT: [(i8, i8); 8] = [
    (0, -1),
    (0, 1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (-1, 1),
    (-1, -1),
    (1, -1),
];

/// Output of a single generator run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Generated {
    pub legal: Vec<Square>,
    pub attacked: Vec<Square>,
}

// =========================================================================
// Public API
// =========================================================================

/// Run the generator for `state`'s piece kind.
pub fn generate(pos: &Position, state: &PieceState) -> Generated {
    let from = state.square;
    let color = state.color();
    match state.kind() {
        PieceKind::Pawn => pawn_moves(pos, from, color, state.has_moved),
        PieceKind::Knight => knight_moves(pos, from, color),
        PieceKind::Bishop => slider_moves(pos, from, color, &[&DIAGONAL]),
        PieceKind::Rook => slider_moves(pos, from, color, &[&ORTHOGONAL]),
        PieceKind::Queen => slider_moves(pos, from, color, &[&ORTHOGONAL, &DIAGONAL]),
        PieceKind::King => king_moves(pos, from, color),
    }
}

// =========================================================================
// Pawn
// =========================================================================

fn pawn_moves(pos: &Position, from: Square, color: Color, has_moved: bool) -> Generated {
    let dir = pos.forward(color);
    let mut out = Generated::default();

    if let Some(one) = from.offset(0, dir)
        && pos.is_empty(one)
    {
        out.legal.push(one);
        if !has_moved
            && let Some(two) = from.offset(0, 2 * dir)
            && pos.is_empty(two)
        {
            out.legal.push(two);
        }
    }

    for df in [-1, 1] {
        let Some(to) = from.offset(df, dir) else {
            continue;
        };
        out.attacked.push(to);
        match pos.piece_at(to) {
            Some(target) if target.color != color => out.legal.push(to),
            None if is_en_passant_capture(pos, to, color) => out.legal.push(to),
            _ => {}
        }
    }
    out
}

/// A diagonal onto the en-passant target captures only if an enemy pawn
/// sits directly behind the target.
fn is_en_passant_capture(pos: &Position, to: Square, color: Color) -> bool {
    pos.en_passant == Some(to)
        && to
            .offset(0, -pos.forward(color))
            .and_then(|victim| pos.piece_at(victim))
            == Some(Piece::new(!color, PieceKind::Pawn))
}

// =========================================================================
// Knight
// =========================================================================

fn knight_moves(pos: &Position, from: Square, color: Color) -> Generated {
    let legal: Vec<Square> = KNIGHT_OFFSETS
        .iter()
        .filter_map(|&(df, dr)| from.offset(df, dr))
        .filter(|&to| pos.piece_at(to).is_none_or(|p| p.color != color))
        .collect();
    Generated {
        attacked: legal.clone(),
        legal,
    }
}

// =========================================================================
// Long-range pieces (bishop, rook, queen)
// =========================================================================

fn slider_moves(
    pos: &Position,
    from: Square,
    color: Color,
    direction_sets: &[&[(i8, i8); 4]],
) -> Generated {
    let mut legal = Vec::with_capacity(27);
    for &(df, dr) in direction_sets.iter().flat_map(|set| set.iter()) {
        let mut next = from.offset(df, dr);
        while let Some(to) = next {
            match pos.piece_at(to) {
                Some(blocker) => {
                    if blocker.color != color {
                        legal.push(to);
                    }
                    break;
                }
                None => legal.push(to),
            }
            next = to.offset(df, dr);
        }
    }
    Generated {
        attacked: legal.clone(),
        legal,
    }
}

// =========================================================================
// King (single steps; castling below)
// =========================================================================

fn king_moves(pos: &Position, from: Square, color: Color) -> Generated {
    let mut out = Generated::default();
    for (df, dr) in ADJACENT {
        let Some(to) = from.offset(df, dr) else {
            continue;
        };
        out.attacked.push(to);
        match pos.piece_at(to) {
            None => out.legal.push(to),
            Some(p) if p.color != color && p.kind != PieceKind::King => out.legal.push(to),
            Some(_) => {}
        }
    }
    out
}

// =========================================================================
// Castling
// =========================================================================

/// The king's destination when castling on `side` is currently allowed.
///
/// Requires the king and the rook on their home squares with no prior
/// move, every square strictly between them empty, and none of those
/// squares in `opponent_attacks`. Whether the king stands in check or lands
/// in check is left to the legality filter.
pub fn castle_target(
    pos: &Position,
    pieces: &PieceSet,
    color: Color,
    side: CastleSide,
    opponent_attacks: Bitboard,
) -> Option<Square> {
    let unmoved = |sq: Square, kind: PieceKind| {
        pieces
            .get(sq)
            .is_some_and(|s| s.piece == Piece::new(color, kind) && !s.has_moved)
    };
    if !unmoved(pos.king_home(color), PieceKind::King)
        || !unmoved(pos.rook_home(color, side), PieceKind::Rook)
    {
        return None;
    }

    let rank = pos.home_rank(color);
    let path_clear = side.between_files().all(|file| {
        let sq = Square::new(file, rank);
        pos.is_empty(sq) && !opponent_attacks.is_set(sq)
    });
    path_clear.then(|| Square::new(side.king_target_file(), rank))
}

// =========================================================================
// Tests
// =========================================================================
