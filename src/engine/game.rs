//! Stateful game controller wrapping Position.
//!
//! `Game` owns the canonical position together with its derived piece
//! states and attack map, and is the only place a move is committed. Every
//! request is validated in full before anything is mutated, so a rejected
//! move leaves the game exactly as it was.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::engine::attacks::{self, AttackMap};
use crate::engine::board::{Position, STARTING_FEN};
use crate::engine::legality;
use crate::engine::pieces::{PieceSet, PieceState};
use crate::engine::special::{self, MovePlan};
use crate::engine::turn::Turn;
use crate::engine::types::{
    ChessError, Color, DrawReason, GameStatus, MoveKind, Piece, PieceKind, Rejection, Square,
};

// =========================================================================
// Requests and outcomes
// =========================================================================

/// A move as asked for by the input side: source, destination, and the side
/// claiming to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    pub side: Color,
    /// Promotion choice; a pawn reaching the far rank without one queens.
    pub promotion: Option<PieceKind>,
}

impl MoveRequest {
    pub fn new(from: Square, to: Square, side: Color) -> Self {
        MoveRequest {
            from,
            to,
            side,
            promotion: None,
        }
    }

    pub fn with_promotion(mut self, kind: PieceKind) -> Self {
        self.promotion = Some(kind);
        self
    }
}

/// What a committed move did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub kind: MoveKind,
    pub captured: Option<Piece>,
    pub promotion: Option<PieceKind>,
    /// Status of the game after the move.
    pub status: GameStatus,
    /// Whose move it is now.
    pub turn: Turn,
}

// =========================================================================
// Game
// =========================================================================

/// A chess game: canonical position, derived state, turn, and status.
#[derive(Clone, Debug)]
pub struct Game {
    // Canonical state
    position: Position,
    turn: Turn,

    // Derived from `position`, rebuilt after every commit
    pieces: PieceSet,
    attacks: AttackMap,
    status: GameStatus,

    // Metadata
    pub id: String,
    pub created_at: DateTime<Utc>,
    starting_fen: String,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Create a new game from the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Position::starting(), STARTING_FEN.to_string())
            .expect("starting position is consistent")
    }

    /// Create a game from a FEN string, decoded for white.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        Self::from_fen_as(fen, Color::White)
    }

    /// Create a game from a FEN string decoded for `perspective`.
    pub fn from_fen_as(fen: &str, perspective: Color) -> Result<Self, ChessError> {
        let position = Position::from_fen_as(fen, perspective)?;
        Self::from_position(position, fen.to_string())
    }

    fn from_position(position: Position, starting_fen: String) -> Result<Self, ChessError> {
        let mut game = Game {
            turn: Turn::for_side(position.side_to_move),
            position,
            pieces: PieceSet::default(),
            attacks: AttackMap::default(),
            status: GameStatus::Active,
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            starting_fen,
        };
        game.refresh()?;
        debug!(id = %game.id, fen = %game.starting_fen, status = %game.status, "game created");
        Ok(game)
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Current board position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Per-piece state for the current position.
    pub fn pieces(&self) -> &PieceSet {
        &self.pieces
    }

    pub fn piece_state(&self, sq: Square) -> Option<&PieceState> {
        self.pieces.get(sq)
    }

    /// Attack sets for the current position.
    pub fn attacks(&self) -> &AttackMap {
        &self.attacks
    }

    /// Current game status.
    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    /// Side to move.
    pub fn side_to_move(&self) -> Color {
        self.turn.side()
    }

    /// Caption text for the current turn.
    pub fn caption(&self) -> String {
        self.turn.caption()
    }

    /// Whether the game is over.
    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// Resolve an algebraic square name against this game's orientation.
    pub fn square(&self, name: &str) -> Result<Square, ChessError> {
        self.position.square(name)
    }

    pub fn square_name(&self, sq: Square) -> String {
        self.position.square_name(sq)
    }

    /// Current position as FEN.
    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    /// The FEN the game was created from.
    pub fn starting_fen(&self) -> &str {
        &self.starting_fen
    }

    pub fn fullmove_number(&self) -> u16 {
        self.position.fullmove_number
    }

    pub fn halfmove_clock(&self) -> u16 {
        self.position.halfmove_clock
    }

    // -----------------------------------------------------------------
    // Legal moves
    // -----------------------------------------------------------------

    /// Legal destinations for the piece on `sq`, for highlighting.
    ///
    /// Empty when the square is empty, holds a piece of the side not to
    /// move, or the game is over.
    pub fn legal_moves_from(&self, sq: Square) -> Vec<Square> {
        match self.pieces.get(sq) {
            Some(state) if state.color() == self.side_to_move() && !self.is_game_over() => self
                .legal_plans(state)
                .map(|plan| plan.to)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Every legal move of the side to move. Promotions are listed once per
    /// promotion kind.
    pub fn legal_moves(&self) -> Vec<MoveRequest> {
        if self.is_game_over() {
            return Vec::new();
        }
        let side = self.side_to_move();
        let mut out = Vec::new();
        for state in self.pieces.of_color(side) {
            for plan in self.legal_plans(state) {
                let request = MoveRequest::new(plan.from, plan.to, side);
                match plan.promotion {
                    Some(_) => out.extend(
                        PieceKind::PROMOTIONS
                            .iter()
                            .map(|&kind| request.with_promotion(kind)),
                    ),
                    None => out.push(request),
                }
            }
        }
        out
    }

    /// Pseudo-legal destinations of `state` that survive the legality filter.
    fn legal_plans<'a>(&'a self, state: &'a PieceState) -> impl Iterator<Item = MovePlan> + 'a {
        state.legal_moves.iter().filter_map(move |&to| {
            let plan = special::plan(&self.position, state.square, to, None).ok()?;
            legality::check(&self.position, &self.attacks, &plan)
                .is_ok()
                .then_some(plan)
        })
    }

    fn has_legal_move(&self, side: Color) -> bool {
        self.pieces
            .of_color(side)
            .any(|state| self.legal_plans(state).next().is_some())
    }

    // -----------------------------------------------------------------
    // Make move
    // -----------------------------------------------------------------

    /// Validate and commit a move.
    ///
    /// Checks run in order: game over, side to move, source piece,
    /// reachability, promotion, castling re-validation, check safety. The
    /// first failure is returned as `ChessError::IllegalMove` and nothing is
    /// changed.
    pub fn play(&mut self, request: MoveRequest) -> Result<MoveOutcome, ChessError> {
        let plan = self.validate(&request).map_err(|reason| {
            debug!(
                from = %self.square_name(request.from),
                to = %self.square_name(request.to),
                %reason,
                "move rejected"
            );
            self.illegal(&request, reason)
        })?;

        // Build the successor on a copy; the game only changes once it is
        // fully derived.
        let mut next = self.clone();
        special::apply(&mut next.position, &plan);
        next.turn = next.turn.advance(&mut next.position);
        next.refresh()?;
        *self = next;

        debug!(
            from = %self.square_name(plan.from),
            to = %self.square_name(plan.to),
            kind = ?plan.kind,
            status = %self.status,
            fen = %self.position.to_fen(),
            "move committed"
        );

        Ok(MoveOutcome {
            from: plan.from,
            to: plan.to,
            piece: plan.piece,
            kind: plan.kind,
            captured: plan.captured.map(|(_, piece)| piece),
            promotion: plan.promotion,
            status: self.status.clone(),
            turn: self.turn,
        })
    }

    fn validate(&self, request: &MoveRequest) -> Result<MovePlan, Rejection> {
        if self.status.is_game_over() {
            return Err(Rejection::GameOver);
        }
        if request.side != self.side_to_move() {
            return Err(Rejection::WrongSide);
        }
        let state = self.pieces.get(request.from).ok_or(Rejection::EmptySquare)?;
        if state.color() != request.side {
            return Err(Rejection::NotYourPiece);
        }
        if !state.can_reach(request.to) {
            return Err(Rejection::Unreachable);
        }

        let plan = special::plan(&self.position, request.from, request.to, request.promotion)?;
        if let Some(side) = plan.castle_side() {
            special::confirm_castle(&self.position, request.side, side)?;
        }
        legality::check(&self.position, &self.attacks, &plan)?;
        Ok(plan)
    }

    fn illegal(&self, request: &MoveRequest, reason: Rejection) -> ChessError {
        ChessError::IllegalMove {
            from: self.square_name(request.from),
            to: self.square_name(request.to),
            reason,
        }
    }

    // -----------------------------------------------------------------
    // Derived state
    // -----------------------------------------------------------------

    /// Rebuild piece states, attack sets and status from the position.
    fn refresh(&mut self) -> Result<(), ChessError> {
        let mut pieces = PieceSet::from_position(&self.position);
        self.attacks = attacks::aggregate(&self.position, &mut pieces);
        pieces.verify_against(&self.position)?;
        self.pieces = pieces;
        for color in Color::ALL {
            self.position.king_square(color)?;
        }
        let waiting = !self.side_to_move();
        if self.attacks.in_check(&self.position, waiting)? {
            return Err(ChessError::InconsistentState(format!(
                "{waiting} is in check but {} is to move",
                self.side_to_move()
            )));
        }
        self.status = self.compute_status()?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Status detection
    // -----------------------------------------------------------------

    fn compute_status(&self) -> Result<GameStatus, ChessError> {
        let side = self.side_to_move();
        let in_check = self.attacks.in_check(&self.position, side)?;

        if !self.has_legal_move(side) {
            return Ok(if in_check {
                GameStatus::Checkmate
            } else {
                GameStatus::Stalemate
            });
        }

        if self.position.halfmove_clock >= 100 {
            return Ok(GameStatus::Draw(DrawReason::FiftyMoveRule));
        }

        if self.is_insufficient_material() {
            return Ok(GameStatus::Draw(DrawReason::InsufficientMaterial));
        }

        Ok(if in_check {
            GameStatus::Check
        } else {
            GameStatus::Active
        })
    }

    /// Insufficient material detection.
    ///
    /// Draws: K vs K, K+B vs K, K+N vs K, K+B vs K+B (same color bishops).
    fn is_insufficient_material(&self) -> bool {
        let mut minors = [0u32; 2];
        let mut bishop_shades: [Option<u8>; 2] = [None; 2];

        for (sq, piece) in self.position.pieces() {
            match piece.kind {
                PieceKind::King => {}
                PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return false,
                PieceKind::Knight => minors[piece.color.index()] += 1,
                PieceKind::Bishop => {
                    minors[piece.color.index()] += 1;
                    bishop_shades[piece.color.index()] = Some(sq.shade());
                }
            }
        }

        match (minors[0], minors[1]) {
            (0, 0) | (1, 0) | (0, 1) => true,
            (1, 1) => matches!(bishop_shades, [Some(w), Some(b)] if w == b),
            _ => false,
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
