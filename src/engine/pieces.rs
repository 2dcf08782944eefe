//! Per-piece derived state.
//!
//! A `PieceSet` is rebuilt from the canonical `Position` after every commit
//! rather than patched. Has-moved flags are recovered from the position
//! itself: castling rights for kings and rooks, the start rank for pawns.

use crate::engine::board::Position;
use crate::engine::types::{CastleSide, ChessError, Color, Piece, PieceKind, Square};

/// One piece on the board together with its cached move lists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PieceState {
    pub piece: Piece,
    pub square: Square,
    pub has_moved: bool,
    /// Pseudo-legal destinations, castle targets included for kings.
    pub legal_moves: Vec<Square>,
    /// Squares this piece threatens.
    pub attacked: Vec<Square>,
}

impl PieceState {
    fn new(pos: &Position, square: Square, piece: Piece) -> Self {
        PieceState {
            piece,
            square,
            has_moved: derive_has_moved(pos, square, piece),
            legal_moves: Vec::new(),
            attacked: Vec::new(),
        }
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.piece.color
    }

    #[inline]
    pub fn kind(&self) -> PieceKind {
        self.piece.kind
    }

    #[inline]
    pub fn can_reach(&self, to: Square) -> bool {
        self.legal_moves.contains(&to)
    }
}

fn derive_has_moved(pos: &Position, square: Square, piece: Piece) -> bool {
    let color = piece.color;
    match piece.kind {
        PieceKind::Pawn => square.rank != pos.pawn_start_rank(color),
        PieceKind::King => {
            square != pos.king_home(color) || !pos.castling_rights.has_any(color)
        }
        PieceKind::Rook => !CastleSide::ALL.iter().any(|&side| {
            square == pos.rook_home(color, side) && pos.castling_rights.has(color, side)
        }),
        PieceKind::Knight | PieceKind::Bishop | PieceKind::Queen => false,
    }
}

// ---------------------------------------------------------------------------
// PieceSet
// ---------------------------------------------------------------------------

/// Every piece on the board, in board order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PieceSet {
    states: Vec<PieceState>,
}

impl PieceSet {
    /// Build fresh state for every piece in `pos`. Move lists start empty
    /// until the aggregator runs.
    pub fn from_position(pos: &Position) -> Self {
        PieceSet {
            states: pos
                .pieces()
                .map(|(sq, piece)| PieceState::new(pos, sq, piece))
                .collect(),
        }
    }

    pub fn get(&self, sq: Square) -> Option<&PieceState> {
        self.states.iter().find(|s| s.square == sq)
    }

    pub fn get_mut(&mut self, sq: Square) -> Option<&mut PieceState> {
        self.states.iter_mut().find(|s| s.square == sq)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PieceState> {
        self.states.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PieceState> {
        self.states.iter_mut()
    }

    /// Pieces of one color.
    pub fn of_color(&self, color: Color) -> impl Iterator<Item = &PieceState> {
        self.states.iter().filter(move |s| s.color() == color)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Check that every state sits on the square `pos` records for it and
    /// that no piece is missing.
    pub fn verify_against(&self, pos: &Position) -> Result<(), ChessError> {
        if self.states.len() != pos.piece_count() {
            return Err(ChessError::InconsistentState(format!(
                "{} piece states for {} occupied squares",
                self.states.len(),
                pos.piece_count()
            )));
        }
        for state in &self.states {
            if pos.piece_at(state.square) != Some(state.piece) {
                return Err(ChessError::InconsistentState(format!(
                    "{} recorded on {} but the board disagrees",
                    state.piece,
                    pos.square_name(state.square)
                )));
            }
        }
        Ok(())
    }
}
