//! Attack-set aggregation.
//!
//! Runs every generator over a position, stores the results on each
//! `PieceState`, and unions attacked squares per color. Castling targets are
//! appended to king move lists in a second pass, because they depend on the
//! opponent's complete attack set. Castle targets are moves, not threats,
//! and never enter the attack sets.

use crate::engine::board::Position;
use crate::engine::movegen;
use crate::engine::pieces::PieceSet;
use crate::engine::types::{Bitboard, CastleSide, ChessError, Color, Piece, PieceKind, Square};

/// Squares attacked by each side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttackMap {
    sets: [Bitboard; 2],
}

impl AttackMap {
    #[inline]
    pub fn by(&self, color: Color) -> Bitboard {
        self.sets[color.index()]
    }

    /// Is `sq` attacked by any piece of colour `by`?
    #[inline]
    pub fn is_attacked(&self, sq: Square, by: Color) -> bool {
        self.sets[by.index()].is_set(sq)
    }

    /// Is `color`'s king attacked in `pos`?
    pub fn in_check(&self, pos: &Position, color: Color) -> Result<bool, ChessError> {
        let king = pos.king_square(color)?;
        Ok(self.is_attacked(king, !color))
    }
}

/// Regenerate every piece's move lists and return both attack sets.
///
/// Must be re-run whenever `pos` changes; a stale map feeds wrong answers
/// to both king safety and castling.
pub fn aggregate(pos: &Position, pieces: &mut PieceSet) -> AttackMap {
    let mut map = AttackMap::default();

    for state in pieces.iter_mut() {
        let generated = movegen::generate(pos, state);
        let set = &mut map.sets[state.color().index()];
        for &sq in &generated.attacked {
            set.set(sq);
        }
        state.legal_moves = generated.legal;
        state.attacked = generated.attacked;
    }

    for color in Color::ALL {
        let targets: Vec<Square> = CastleSide::ALL
            .iter()
            .filter_map(|&side| movegen::castle_target(pos, pieces, color, side, map.by(!color)))
            .collect();
        if targets.is_empty() {
            continue;
        }
        let king = Piece::new(color, PieceKind::King);
        if let Some(state) = pieces.get_mut(pos.king_home(color))
            && state.piece == king
        {
            state.legal_moves.extend(targets);
        }
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(fen: &str) -> (Position, PieceSet, AttackMap) {
        let pos = Position::from_fen(fen).unwrap();
        let mut pieces = PieceSet::from_position(&pos);
        let map = aggregate(&pos, &mut pieces);
        (pos, pieces, map)
    }

    fn sq(pos: &Position, name: &str) -> Square {
        pos.square(name).unwrap()
    }

    #[test]
    fn starting_position_attack_sets() {
        let (pos, _, map) = build(crate::engine::board::STARTING_FEN);
        for file in ["a", "b", "c", "d", "e", "f", "g", "h"] {
            assert!(map.is_attacked(sq(&pos, &format!("{file}3")), Color::White));
            assert!(map.is_attacked(sq(&pos, &format!("{file}6")), Color::Black));
            assert!(!map.is_attacked(sq(&pos, &format!("{file}4")), Color::White));
            assert!(!map.is_attacked(sq(&pos, &format!("{file}5")), Color::Black));
        }
        assert!(!map.in_check(&pos, Color::White).unwrap());
        assert!(!map.in_check(&pos, Color::Black).unwrap());
    }

    #[test]
    fn aggregate_fills_piece_move_lists() {
        let (pos, pieces, _) = build(crate::engine::board::STARTING_FEN);
        let total: usize = pieces
            .of_color(Color::White)
            .map(|s| s.legal_moves.len())
            .sum();
        assert_eq!(total, 20);
        let knight = pieces.get(sq(&pos, "b1")).unwrap();
        assert_eq!(knight.attacked, knight.legal_moves);
    }

    #[test]
    fn pawn_forward_squares_are_not_attacks() {
        let (pos, _, map) = build("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1");
        assert!(!map.is_attacked(sq(&pos, "e3"), Color::White));
        assert!(map.is_attacked(sq(&pos, "d3"), Color::White));
        assert!(map.is_attacked(sq(&pos, "f3"), Color::White));
    }

    #[test]
    fn check_detected_through_attack_set() {
        let (pos, _, map) = build("4k3/8/8/8/8/8/8/r3K3 w - - 0 1");
        assert!(map.in_check(&pos, Color::White).unwrap());
        assert!(!map.in_check(&pos, Color::Black).unwrap());
    }

    #[test]
    fn castle_targets_appended_to_king_but_not_attacked() {
        let (pos, pieces, map) = build("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let king = pieces.get(sq(&pos, "e1")).unwrap();
        assert!(king.can_reach(sq(&pos, "g1")));
        assert!(king.can_reach(sq(&pos, "c1")));
        assert!(!king.attacked.contains(&sq(&pos, "g1")));
        assert!(!king.attacked.contains(&sq(&pos, "c1")));
        assert!(!map.is_attacked(sq(&pos, "g8"), Color::White));
    }

    #[test]
    fn castle_target_withheld_when_path_attacked() {
        // Black rook on f8 covers f1.
        let (pos, pieces, _) = build("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        let king = pieces.get(sq(&pos, "e1")).unwrap();
        assert!(!king.can_reach(sq(&pos, "g1")));
        assert!(king.can_reach(sq(&pos, "c1")));
    }

    #[test]
    fn king_attacks_adjacent_squares_next_to_enemy_king() {
        let (pos, _, map) = build("8/8/8/3k4/8/4K3/8/8 w - - 0 1");
        // d4 and e4 are covered by both kings.
        assert!(map.is_attacked(sq(&pos, "e4"), Color::Black));
        assert!(map.is_attacked(sq(&pos, "d4"), Color::White));
    }
}
