//! Square-to-piece chess position.
//!
//! `Position` is the canonical data model: an ordered map from occupied
//! squares to pieces, the side to move, castling rights, the en-passant
//! target, move counters, and the side the board was decoded for.

use std::collections::BTreeMap;

use crate::engine::types::{CastleSide, CastlingRights, ChessError, Color, Piece, PieceKind, Square};

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A complete chess position.
///
/// Squares are in board coordinates: rank 0 is the top row as decoded for
/// `perspective`. The side the board was decoded for sits on rank 7 and its
/// pawns advance toward rank 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// Occupied squares. The map itself guarantees one piece per square.
    board: BTreeMap<Square, Piece>,

    /// Whose turn it is.
    pub side_to_move: Color,

    /// Castling availability (K/Q/k/q).
    pub castling_rights: CastlingRights,

    /// En-passant target square (the square *behind* the double-stepped pawn).
    pub en_passant: Option<Square>,

    /// Half-move clock for the 50-move rule (reset on pawn move or capture).
    pub halfmove_clock: u16,

    /// Full-move number (starts at 1, incremented after Black moves).
    pub fullmove_number: u16,

    /// The side the board was decoded for.
    pub perspective: Color,
}

// ---------------------------------------------------------------------------
// Construction and geometry
// ---------------------------------------------------------------------------

impl Position {
    /// Create an empty board with no pieces.
    pub fn empty(perspective: Color) -> Self {
        Position {
            board: BTreeMap::new(),
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            perspective,
        }
    }

    /// Standard starting position.
    pub fn starting() -> Self {
        Self::from_fen(STARTING_FEN).expect("starting FEN is always valid")
    }

    /// Rank step a pawn of `color` takes when advancing.
    #[inline]
    pub fn forward(&self, color: Color) -> i8 {
        if color == self.perspective { -1 } else { 1 }
    }

    /// Rank holding `color`'s king and rooks at the start.
    #[inline]
    pub fn home_rank(&self, color: Color) -> u8 {
        if color == self.perspective { 7 } else { 0 }
    }

    /// Rank `color`'s pawns start on.
    #[inline]
    pub fn pawn_start_rank(&self, color: Color) -> u8 {
        if color == self.perspective { 6 } else { 1 }
    }

    /// Rank on which `color`'s pawns promote.
    #[inline]
    pub fn promotion_rank(&self, color: Color) -> u8 {
        self.home_rank(!color)
    }

    #[inline]
    pub fn king_home(&self, color: Color) -> Square {
        Square::new(CastleSide::KING_FILE, self.home_rank(color))
    }

    #[inline]
    pub fn rook_home(&self, color: Color, side: CastleSide) -> Square {
        Square::new(side.rook_file(), self.home_rank(color))
    }

    /// Parse an algebraic square name for this board's perspective.
    pub fn square(&self, name: &str) -> Result<Square, ChessError> {
        Square::parse(name, self.perspective)
            .ok_or_else(|| ChessError::InvalidSquare(name.to_string()))
    }

    /// Algebraic name of `sq` for this board's perspective.
    pub fn square_name(&self, sq: Square) -> String {
        sq.algebraic(self.perspective)
    }

    // -----------------------------------------------------------------------
    // Piece access
    // -----------------------------------------------------------------------

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board.get(&sq).copied()
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        !self.board.contains_key(&sq)
    }

    /// Place a piece, returning whatever stood there before.
    pub fn put_piece(&mut self, sq: Square, piece: Piece) -> Option<Piece> {
        self.board.insert(sq, piece)
    }

    pub fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        self.board.remove(&sq)
    }

    /// Occupied squares in board order (top rank first).
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.board.iter().map(|(&sq, &piece)| (sq, piece))
    }

    pub fn piece_count(&self) -> usize {
        self.board.len()
    }

    /// Locate `color`'s king. Zero or several kings is a broken position.
    pub fn king_square(&self, color: Color) -> Result<Square, ChessError> {
        let king = Piece::new(color, PieceKind::King);
        let mut found = self.pieces().filter(|&(_, p)| p == king).map(|(sq, _)| sq);
        match (found.next(), found.next()) {
            (Some(sq), None) => Ok(sq),
            (None, _) => Err(ChessError::InconsistentState(format!("{color} has no king"))),
            (Some(_), Some(_)) => Err(ChessError::InconsistentState(format!(
                "{color} has more than one king"
            ))),
        }
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as text, rank 0 at top, with algebraic labels.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in 0..8u8 {
            let label = self.square_name(Square::new(0, rank));
            s.push_str(&label[1..]);
            s.push(' ');
            for file in 0..8u8 {
                let ch = match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => piece.to_char(),
                    None => '.',
                };
                s.push(ch);
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

// ---------------------------------------------------------------------------
// FEN parsing & generation
// ---------------------------------------------------------------------------

impl Position {
    /// Parse a FEN string for white's perspective.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        Self::from_fen_as(fen, Color::White)
    }

    /// Parse a FEN string into a `Position` decoded for `perspective`.
    ///
    /// Validates all six fields and requires exactly one king per side.
    pub fn from_fen_as(fen: &str, perspective: Color) -> Result<Self, ChessError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(ChessError::InvalidFen(format!(
                "expected 6 fields, got {}",
                fields.len()
            )));
        }

        let mut pos = Position::empty(perspective);

        // ----- Field 1: Piece placement -----
        let rows: Vec<&str> = fields[0].split('/').collect();
        if rows.len() != 8 {
            return Err(ChessError::InvalidFen(format!(
                "expected 8 ranks, got {}",
                rows.len()
            )));
        }

        for (row_idx, row) in rows.iter().enumerate() {
            let rank = match perspective {
                Color::White => row_idx as u8,
                Color::Black => 7 - row_idx as u8,
            };
            let rank_number = 8 - row_idx;
            let mut file: u8 = 0;
            for ch in row.chars() {
                if file > 7 {
                    return Err(ChessError::InvalidFen(format!(
                        "too many squares in rank {rank_number}"
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidFen(format!(
                            "invalid empty count '{ch}' in rank {rank_number}"
                        )));
                    }
                    file += digit as u8;
                } else if let Some(piece) = Piece::from_char(ch) {
                    pos.put_piece(Square::new(file, rank), piece);
                    file += 1;
                } else {
                    return Err(ChessError::InvalidFen(format!(
                        "invalid character '{ch}' in piece placement"
                    )));
                }
            }
            if file != 8 {
                return Err(ChessError::InvalidFen(format!(
                    "rank {rank_number} has {file} squares instead of 8"
                )));
            }
        }

        for color in Color::ALL {
            pos.king_square(color)?;
        }

        // ----- Field 2: Side to move -----
        pos.side_to_move = Color::from_fen_char(fields[1]).ok_or_else(|| {
            ChessError::InvalidFen(format!("invalid side to move: '{}'", fields[1]))
        })?;

        // ----- Field 3: Castling availability -----
        pos.castling_rights = CastlingRights::from_fen(fields[2]).ok_or_else(|| {
            ChessError::InvalidFen(format!("invalid castling string: '{}'", fields[2]))
        })?;

        // ----- Field 4: En passant target square -----
        if fields[3] != "-" {
            let ep_sq = Square::parse(fields[3], perspective).ok_or_else(|| {
                ChessError::InvalidFen(format!("invalid en passant square: '{}'", fields[3]))
            })?;
            // The target sits behind a pawn the opponent just double-stepped.
            let expected = match pos.side_to_move {
                Color::White => '6',
                Color::Black => '3',
            };
            if !fields[3].ends_with(expected) {
                return Err(ChessError::InvalidFen(format!(
                    "en passant square {} is not on rank {expected} with {} to move",
                    fields[3], pos.side_to_move
                )));
            }
            pos.en_passant = Some(ep_sq);
        }

        // ----- Field 5: Halfmove clock -----
        pos.halfmove_clock = fields[4].parse::<u16>().map_err(|_| {
            ChessError::InvalidFen(format!("invalid halfmove clock: '{}'", fields[4]))
        })?;

        // ----- Field 6: Fullmove number -----
        pos.fullmove_number = fields[5].parse::<u16>().map_err(|_| {
            ChessError::InvalidFen(format!("invalid fullmove number: '{}'", fields[5]))
        })?;
        if pos.fullmove_number == 0 {
            return Err(ChessError::InvalidFen(
                "fullmove number must be >= 1".to_string(),
            ));
        }

        Ok(pos)
    }

    /// The piece-placement field alone.
    pub fn placement_fen(&self) -> String {
        let mut fen = String::with_capacity(72);
        for row_idx in 0..8u8 {
            let rank = match self.perspective {
                Color::White => row_idx,
                Color::Black => 7 - row_idx,
            };
            let mut empty_count = 0u8;
            for file in 0..8 {
                match self.piece_at(Square::new(file, rank)) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push((b'0' + empty_count) as char);
            }
            if row_idx < 7 {
                fen.push('/');
            }
        }
        fen
    }

    /// Export the position as a FEN string.
    pub fn to_fen(&self) -> String {
        let ep = match self.en_passant {
            Some(sq) => self.square_name(sq),
            None => "-".to_string(),
        };
        format!(
            "{} {} {} {} {} {}",
            self.placement_fen(),
            self.side_to_move.fen_char(),
            self.castling_rights.to_fen(),
            ep,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(pos: &Position, name: &str) -> Square {
        pos.square(name).unwrap()
    }

    // -------------------------------------------------------------------
    // Decoding
    // -------------------------------------------------------------------

    #[test]
    fn starting_position_layout() {
        let pos = Position::starting();
        assert_eq!(pos.piece_count(), 32);
        assert_eq!(pos.side_to_move, Color::White);
        assert_eq!(pos.castling_rights, CastlingRights::ALL);
        assert_eq!(pos.en_passant, None);
        assert_eq!(
            pos.piece_at(sq(&pos, "e1")),
            Some(Piece::new(Color::White, PieceKind::King))
        );
        assert_eq!(
            pos.piece_at(sq(&pos, "d8")),
            Some(Piece::new(Color::Black, PieceKind::Queen))
        );
        // Black's back rank is rank 0 when decoded for white.
        assert_eq!(sq(&pos, "a8"), Square::new(0, 0));
        assert!(pos.is_empty(sq(&pos, "e4")));
    }

    #[test]
    fn black_perspective_mirrors_ranks() {
        let pos = Position::from_fen_as(STARTING_FEN, Color::Black).unwrap();
        assert_eq!(
            pos.piece_at(Square::new(4, 7)),
            Some(Piece::new(Color::Black, PieceKind::King))
        );
        assert_eq!(
            pos.piece_at(Square::new(4, 0)),
            Some(Piece::new(Color::White, PieceKind::King))
        );
        assert_eq!(pos.forward(Color::Black), -1);
        assert_eq!(pos.forward(Color::White), 1);
        assert_eq!(pos.home_rank(Color::White), 0);
        assert_eq!(pos.pawn_start_rank(Color::White), 1);
        assert_eq!(pos.promotion_rank(Color::White), 7);
    }

    #[test]
    fn fen_fields_decoded() {
        let pos =
            Position::from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b Kq e3 3 7")
                .unwrap();
        assert_eq!(pos.side_to_move, Color::Black);
        assert_eq!(pos.castling_rights.to_fen(), "Kq");
        assert_eq!(pos.en_passant, Some(sq(&pos, "e3")));
        assert_eq!(pos.halfmove_clock, 3);
        assert_eq!(pos.fullmove_number, 7);
    }

    #[test]
    fn rejects_wrong_rank_count() {
        let err = Position::from_fen("8/8/8/8/8/8/8 w - - 0 1").unwrap_err();
        assert!(matches!(err, ChessError::InvalidFen(_)));
    }

    #[test]
    fn rejects_unknown_piece_letter() {
        let err = Position::from_fen("4k3/8/8/8/8/8/8/4KX2 w - - 0 1").unwrap_err();
        assert!(err.to_string().contains("invalid character 'X'"));
    }

    #[test]
    fn rejects_short_and_long_ranks() {
        assert!(Position::from_fen("4k3/8/8/8/8/8/8/4K2 w - - 0 1").is_err());
        assert!(Position::from_fen("4k3/8/8/8/8/8/8/4K4 w - - 0 1").is_err());
        assert!(Position::from_fen("4k3/9/8/8/8/8/8/4K3 w - - 0 1").is_err());
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - -").is_err());
        assert!(Position::from_fen("").is_err());
    }

    #[test]
    fn rejects_bad_side_castling_and_counters() {
        assert!(Position::from_fen("4k3/8/8/8/8/8/8/4K3 x - - 0 1").is_err());
        assert!(Position::from_fen("4k3/8/8/8/8/8/8/4K3 w KX - 0 1").is_err());
        assert!(Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - e4 0 1").is_err());
        assert!(Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - x 1").is_err());
        assert!(Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 0").is_err());
    }

    #[test]
    fn en_passant_rank_follows_side_to_move() {
        let white = "rnbqkbnr/ppp1pppp/8/3p4/8/8/PPPPPPPP/RNBQKBNR w KQkq d6 0 2";
        assert!(Position::from_fen(white).is_ok());
        assert!(Position::from_fen(&white.replace("d6", "d3")).is_err());

        let black = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
        assert!(Position::from_fen(black).is_ok());
        assert!(Position::from_fen(&black.replace("e3", "e6")).is_err());
    }

    #[test]
    fn rejects_missing_or_extra_kings() {
        let err = Position::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").unwrap_err();
        assert!(matches!(err, ChessError::InconsistentState(_)));
        let err = Position::from_fen("4k3/8/8/8/8/8/8/3KK3 w - - 0 1").unwrap_err();
        assert!(matches!(err, ChessError::InconsistentState(_)));
    }

    // -------------------------------------------------------------------
    // Encoding
    // -------------------------------------------------------------------

    #[test]
    fn fen_round_trip() {
        for fen in [
            STARTING_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        ] {
            for perspective in Color::ALL {
                let pos = Position::from_fen_as(fen, perspective).unwrap();
                assert_eq!(pos.to_fen(), fen, "perspective {perspective}");
            }
        }
    }

    #[test]
    fn placement_field_round_trip() {
        let pos = Position::starting();
        assert_eq!(
            pos.placement_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
        );
    }

    // -------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------

    #[test]
    fn put_and_remove_piece() {
        let mut pos = Position::starting();
        let e4 = sq(&pos, "e4");
        let pawn = Piece::new(Color::White, PieceKind::Pawn);
        assert_eq!(pos.put_piece(e4, pawn), None);
        assert_eq!(pos.piece_at(e4), Some(pawn));
        assert_eq!(pos.remove_piece(e4), Some(pawn));
        assert!(pos.is_empty(e4));
    }

    #[test]
    fn board_string_has_labels() {
        let pos = Position::starting();
        let s = pos.board_string();
        assert!(s.starts_with("8 r n b q k b n r"));
        assert!(s.ends_with("  a b c d e f g h"));
    }
}
