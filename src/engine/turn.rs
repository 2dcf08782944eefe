//! Turn controller.

use std::fmt;

use serde::Serialize;

use crate::engine::board::Position;
use crate::engine::types::Color;

/// Whose move it is. Advances once per committed move and never otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    WhiteToMove,
    BlackToMove,
}

impl Turn {
    pub fn for_side(color: Color) -> Self {
        match color {
            Color::White => Turn::WhiteToMove,
            Color::Black => Turn::BlackToMove,
        }
    }

    pub fn side(self) -> Color {
        match self {
            Turn::WhiteToMove => Color::White,
            Turn::BlackToMove => Color::Black,
        }
    }

    pub fn next(self) -> Self {
        Turn::for_side(!self.side())
    }

    /// Window caption text, e.g. `Chess, w to move.`
    pub fn caption(self) -> String {
        format!("Chess, {} to move.", self.side().fen_char())
    }

    /// Hand the move to the other side. The fullmove number counts up after
    /// black's move.
    pub fn advance(self, pos: &mut Position) -> Self {
        if self.side() == Color::Black {
            pos.fullmove_number = pos.fullmove_number.saturating_add(1);
        }
        let next = self.next();
        pos.side_to_move = next.side();
        next
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to move", self.side())
    }
}
