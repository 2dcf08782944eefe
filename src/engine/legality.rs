//! Legality filter.
//!
//! Check-safety is decided by brute force: the complete move is applied to an
//! independent copy of the position, every attack set is recomputed on the
//! copy, and the move is refused if the mover's king ends up attacked.

use tracing::trace;

use crate::engine::attacks::{self, AttackMap};
use crate::engine::board::Position;
use crate::engine::pieces::PieceSet;
use crate::engine::special::{self, MovePlan};
use crate::engine::types::{ChessError, Rejection};

/// Verify that `plan` keeps the mover's king safe.
///
/// `current` is the attack map of `pos` as it stands; it is only consulted
/// for castling, which may not start from an attacked square.
pub fn check(pos: &Position, current: &AttackMap, plan: &MovePlan) -> Result<(), Rejection> {
    let color = plan.piece.color;

    if plan.castle_side().is_some() && current.is_attacked(plan.from, !color) {
        trace!(from = %pos.square_name(plan.from), "castling out of check refused");
        return Err(Rejection::CastlingUnavailable);
    }

    match leaves_king_attacked(pos, plan) {
        Ok(false) => Ok(()),
        Ok(true) => Err(Rejection::LeavesKingInCheck),
        Err(e) => {
            // A simulation that loses the king cannot be played.
            trace!(error = %e, "simulation failed");
            Err(Rejection::LeavesKingInCheck)
        }
    }
}

/// Simulate `plan` on a scratch copy and report whether the mover's king is
/// attacked afterwards. `pos` is never touched.
pub fn leaves_king_attacked(pos: &Position, plan: &MovePlan) -> Result<bool, ChessError> {
    let mut scratch = pos.clone();
    special::apply(&mut scratch, plan);

    let mut pieces = PieceSet::from_position(&scratch);
    let map = attacks::aggregate(&scratch, &mut pieces);
    let attacked = map.in_check(&scratch, plan.piece.color)?;

    trace!(
        from = %pos.square_name(plan.from),
        to = %pos.square_name(plan.to),
        attacked,
        "simulated move"
    );
    Ok(attacked)
}
