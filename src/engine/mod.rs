pub mod attacks;
pub mod board;
pub mod game;
pub mod legality;
pub mod movegen;
pub mod pieces;
pub mod special;
pub mod turn;
pub mod types;

pub use attacks::AttackMap;
pub use board::{Position, STARTING_FEN};
pub use game::{Game, MoveOutcome, MoveRequest};
pub use pieces::{PieceSet, PieceState};
pub use turn::Turn;
pub use types::*;
