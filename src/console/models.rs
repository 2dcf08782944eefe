use serde::Serialize;

use crate::engine::{Game, MoveKind, MoveOutcome, Piece, PieceKind, Square};

// ---------------------------------------------------------------------------
// Response models
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub id: String,
    /// Rows top first, as rendered. Uppercase for White, lowercase for Black.
    pub board: Vec<Vec<Option<String>>>,
    pub fen: String,
    pub status: String,
    pub current_player: String,
    pub caption: String,
    pub check: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightView {
    pub square: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub piece: Option<Piece>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_moved: Option<bool>,
    pub moves: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveView {
    pub from: String,
    pub to: String,
    pub piece: Piece,
    pub kind: MoveKind,
    pub captured: Option<Piece>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
    pub status: String,
    pub fen: String,
    pub caption: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorView {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Build the 8×8 board array. Empty = None.
pub fn board_rows(game: &Game) -> Vec<Vec<Option<String>>> {
    let pos = game.position();
    (0..8u8)
        .map(|rank| {
            (0..8u8)
                .map(|file| {
                    pos.piece_at(Square::new(file, rank))
                        .map(|piece| piece.to_char().to_string())
                })
                .collect()
        })
        .collect()
}

pub fn board_view(game: &Game) -> BoardView {
    BoardView {
        id: game.id.clone(),
        board: board_rows(game),
        fen: game.to_fen(),
        status: game.status().to_string(),
        current_player: game.side_to_move().to_string(),
        caption: game.caption(),
        check: game
            .attacks()
            .in_check(game.position(), game.side_to_move())
            .unwrap_or(false),
        created_at: game.created_at.to_rfc3339(),
    }
}

pub fn highlight_view(game: &Game, sq: Square) -> HighlightView {
    let state = game.piece_state(sq);
    HighlightView {
        square: game.square_name(sq),
        piece: state.map(|s| s.piece),
        has_moved: state.map(|s| s.has_moved),
        moves: game
            .legal_moves_from(sq)
            .into_iter()
            .map(|to| game.square_name(to))
            .collect(),
    }
}

pub fn move_view(game: &Game, outcome: &MoveOutcome) -> MoveView {
    MoveView {
        from: game.square_name(outcome.from),
        to: game.square_name(outcome.to),
        piece: outcome.piece,
        kind: outcome.kind,
        captured: outcome.captured,
        promotion: outcome.promotion,
        status: outcome.status.to_string(),
        fen: game.to_fen(),
        caption: outcome.turn.caption(),
    }
}

pub fn error_view(code: &str, message: String) -> ErrorView {
    ErrorView {
        error: ErrorDetail {
            code: code.to_string(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_rows_starting_position() {
        let g = Game::new();
        let rows = board_rows(&g);
        assert_eq!(rows[0][0].as_deref(), Some("r"));
        assert_eq!(rows[7][4].as_deref(), Some("K"));
        assert_eq!(rows[3][0], None);
    }

    #[test]
    fn board_view_serializes_camel_case() {
        let g = Game::new();
        let json = serde_json::to_value(board_view(&g)).unwrap();
        assert_eq!(json["currentPlayer"], "white");
        assert_eq!(json["caption"], "Chess, w to move.");
        assert_eq!(json["check"], false);
        assert_eq!(json["status"], "active");
        assert_eq!(json["board"][7][0], "R");
        assert!(json["board"][4][4].is_null());
    }

    #[test]
    fn highlight_view_lists_destinations() {
        let g = Game::new();
        let view = highlight_view(&g, g.square("g1").unwrap());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["square"], "g1");
        assert_eq!(json["piece"]["kind"], "knight");
        let mut moves = view.moves.clone();
        moves.sort();
        assert_eq!(moves, vec!["f3", "h3"]);
        assert_eq!(json["hasMoved"], false);
    }

    #[test]
    fn highlight_view_reports_moved_pieces() {
        let mut g = Game::new();
        for (from, to) in [("e2", "e4"), ("e7", "e5")] {
            let req = crate::engine::MoveRequest::new(
                g.square(from).unwrap(),
                g.square(to).unwrap(),
                g.side_to_move(),
            );
            g.play(req).unwrap();
        }
        let json = serde_json::to_value(highlight_view(&g, g.square("e4").unwrap())).unwrap();
        assert_eq!(json["piece"]["kind"], "pawn");
        assert_eq!(json["hasMoved"], true);

        let empty = serde_json::to_value(highlight_view(&g, g.square("e3").unwrap())).unwrap();
        assert!(empty.get("piece").is_none());
        assert!(empty.get("hasMoved").is_none());
        assert_eq!(empty["moves"], serde_json::json!([]));
    }

    #[test]
    fn move_view_describes_outcome() {
        let mut g = Game::new();
        let req = crate::engine::MoveRequest::new(
            g.square("e2").unwrap(),
            g.square("e4").unwrap(),
            g.side_to_move(),
        );
        let outcome = g.play(req).unwrap();
        let json = serde_json::to_value(move_view(&g, &outcome)).unwrap();
        assert_eq!(json["from"], "e2");
        assert_eq!(json["to"], "e4");
        assert_eq!(json["kind"], "double_step");
        assert_eq!(json["piece"]["color"], "white");
        assert!(json["captured"].is_null());
        assert!(json.get("promotion").is_none());
        assert_eq!(json["caption"], "Chess, b to move.");
    }
}
