//! Special-move handling.
//!
//! [`plan`] classifies a reachable move (double step, en passant, castle,
//! capture, promotion) and [`apply`] performs it on a position. The same
//! `apply` runs on the legality filter's scratch copy and on the canonical
//! position, so a simulated move and a committed move never diverge.

use crate::engine::attacks;
use crate::engine::board::Position;
use crate::engine::movegen;
use crate::engine::pieces::PieceSet;
use crate::engine::types::{CastleSide, Color, MoveKind, Piece, PieceKind, Rejection, Square};

/// A fully classified move, ready to apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MovePlan {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub kind: MoveKind,
    /// The removed piece and where it stood (behind `to` for en passant).
    pub captured: Option<(Square, Piece)>,
    /// Kind the pawn becomes on the far rank.
    pub promotion: Option<PieceKind>,
}

impl MovePlan {
    pub fn castle_side(&self) -> Option<CastleSide> {
        match self.kind {
            MoveKind::Castle(side) => Some(side),
            _ => None,
        }
    }
}

// =========================================================================
// Planning
// =========================================================================

/// Classify the move `from` → `to`. Reachability is the caller's concern.
///
/// A pawn reaching the far rank promotes to `promotion`, or to a queen when
/// none is given; asking for a promotion anywhere else is rejected.
pub fn plan(
    pos: &Position,
    from: Square,
    to: Square,
    promotion: Option<PieceKind>,
) -> Result<MovePlan, Rejection> {
    let piece = pos.piece_at(from).ok_or(Rejection::EmptySquare)?;
    let target = pos.piece_at(to);
    let mut captured = target.map(|p| (to, p));
    let is_pawn = piece.kind == PieceKind::Pawn;

    let kind = if is_pawn && from.rank.abs_diff(to.rank) == 2 {
        MoveKind::DoubleStep
    } else if is_pawn && from.file != to.file && target.is_none() {
        let victim = to
            .offset(0, -pos.forward(piece.color))
            .ok_or(Rejection::Unreachable)?;
        captured = pos.piece_at(victim).map(|p| (victim, p));
        MoveKind::EnPassant
    } else if piece.kind == PieceKind::King
        && let Some(side) = CastleSide::from_king_step(from, to)
    {
        MoveKind::Castle(side)
    } else if captured.is_some() {
        MoveKind::Capture
    } else {
        MoveKind::Quiet
    };

    let promotes = is_pawn && to.rank == pos.promotion_rank(piece.color);
    let promotion = match (promotes, promotion) {
        (true, None) => Some(PieceKind::Queen),
        (true, Some(kind)) if kind.is_promotion_target() => Some(kind),
        (false, None) => None,
        _ => return Err(Rejection::InvalidPromotion),
    };

    Ok(MovePlan {
        from,
        to,
        piece,
        kind,
        captured,
        promotion,
    })
}

/// Re-check castling eligibility against the board as it is now.
///
/// Generation-time eligibility can be stale by commit time, so the rook and
/// king flags and the path conditions are evaluated again from scratch.
pub fn confirm_castle(pos: &Position, color: Color, side: CastleSide) -> Result<(), Rejection> {
    let mut pieces = PieceSet::from_position(pos);
    let map = attacks::aggregate(pos, &mut pieces);
    movegen::castle_target(pos, &pieces, color, side, map.by(!color))
        .map(|_| ())
        .ok_or(Rejection::CastlingUnavailable)
}

// =========================================================================
// Application
// =========================================================================

/// Apply a planned move to `pos`: pieces, castling rights, en-passant
/// target and halfmove clock. Side to move is the turn controller's job.
pub fn apply(pos: &mut Position, plan: &MovePlan) {
    let color = plan.piece.color;

    if let Some((sq, _)) = plan.captured {
        pos.remove_piece(sq);
    }
    pos.remove_piece(plan.from);
    let landing = Piece::new(color, plan.promotion.unwrap_or(plan.piece.kind));
    pos.put_piece(plan.to, landing);

    if let Some(side) = plan.castle_side() {
        let rank = pos.home_rank(color);
        if let Some(rook) = pos.remove_piece(Square::new(side.rook_file(), rank)) {
            pos.put_piece(Square::new(side.rook_target_file(), rank), rook);
        }
    }

    update_castling_rights(pos, plan);

    // The target lives for exactly one reply.
    pos.en_passant = match plan.kind {
        MoveKind::DoubleStep => plan.from.offset(0, pos.forward(color)),
        _ => None,
    };

    if plan.piece.kind == PieceKind::Pawn || plan.captured.is_some() {
        pos.halfmove_clock = 0;
    } else {
        pos.halfmove_clock = pos.halfmove_clock.saturating_add(1);
    }
}

/// Moving the king drops both of its rights; touching a rook corner, by
/// leaving it or capturing on it, drops that corner's right.
fn update_castling_rights(pos: &mut Position, plan: &MovePlan) {
    if plan.piece.kind == PieceKind::King {
        pos.castling_rights.remove_all(plan.piece.color);
    }
    for color in Color::ALL {
        for side in CastleSide::ALL {
            let corner = pos.rook_home(color, side);
            if plan.from == corner || plan.to == corner {
                pos.castling_rights.remove(color, side);
            }
        }
    }
}
