//! Console command parsing.

use crate::engine::PieceKind;

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Move a piece, e.g. `e2e4`, `e2 e4`, `e7e8q`.
    Move {
        from: String,
        to: String,
        promotion: Option<PieceKind>,
    },
    /// List the legal destinations of the piece on a square.
    Moves(String),
    Board,
    Fen,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("invalid square: {0}")]
    BadSquare(String),

    #[error("invalid promotion piece: {0}")]
    BadPromotion(char),

    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
}

pub const HELP: &str = "\
commands:
  e2e4 | e2 e4 | e7e8q   move a piece (promotion letter q, r, b or n)
  moves <square>         legal destinations of the piece on <square>
  board                  show the board
  fen                    show the position string
  status                 show the game status
  help                   show this text
  quit                   leave";

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim().to_lowercase();
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => Err(CommandError::Empty),
            ["quit" | "exit"] => Ok(Command::Quit),
            ["help" | "?"] => Ok(Command::Help),
            ["board"] => Ok(Command::Board),
            ["fen"] => Ok(Command::Fen),
            ["status"] => Ok(Command::Status),
            ["moves"] => Err(CommandError::MissingArgument("square")),
            ["moves", sq] => Ok(Command::Moves(square_text(sq)?)),
            [from, to] if looks_like_square(from) => parse_move(from, to),
            [word] if word.is_ascii() && word.len() >= 4 && looks_like_square(&word[..2]) => {
                parse_move(&word[..2], &word[2..])
            }
            _ => Err(CommandError::Unknown(line.clone())),
        }
    }
}

fn parse_move(from: &str, rest: &str) -> Result<Command, CommandError> {
    if !rest.is_ascii() || !(2..=3).contains(&rest.len()) {
        return Err(CommandError::BadSquare(rest.to_string()));
    }
    let (to, suffix) = rest.split_at(2);
    let promotion = suffix
        .chars()
        .next()
        .map(|c| PieceKind::from_promotion_char(c).ok_or(CommandError::BadPromotion(c)))
        .transpose()?;
    Ok(Command::Move {
        from: square_text(from)?,
        to: square_text(to)?,
        promotion,
    })
}

fn square_text(s: &str) -> Result<String, CommandError> {
    if looks_like_square(s) {
        Ok(s.to_string())
    } else {
        Err(CommandError::BadSquare(s.to_string()))
    }
}

fn looks_like_square(s: &str) -> bool {
    matches!(s.as_bytes(), [b'a'..=b'h', b'1'..=b'8'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(from: &str, to: &str, promotion: Option<PieceKind>) -> Command {
        Command::Move {
            from: from.into(),
            to: to.into(),
            promotion,
        }
    }

    #[test]
    fn parses_move_forms() {
        assert_eq!(Command::parse("e2e4"), Ok(mv("e2", "e4", None)));
        assert_eq!(Command::parse("  E2 E4 "), Ok(mv("e2", "e4", None)));
        assert_eq!(
            Command::parse("e7e8n"),
            Ok(mv("e7", "e8", Some(PieceKind::Knight)))
        );
        assert_eq!(
            Command::parse("e7 e8q"),
            Ok(mv("e7", "e8", Some(PieceKind::Queen)))
        );
    }

    #[test]
    fn parses_keywords() {
        assert_eq!(Command::parse("board"), Ok(Command::Board));
        assert_eq!(Command::parse("FEN"), Ok(Command::Fen));
        assert_eq!(Command::parse("status"), Ok(Command::Status));
        assert_eq!(Command::parse("help"), Ok(Command::Help));
        assert_eq!(Command::parse("exit"), Ok(Command::Quit));
        assert_eq!(Command::parse("moves g1"), Ok(Command::Moves("g1".into())));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert_eq!(
            Command::parse("moves"),
            Err(CommandError::MissingArgument("square"))
        );
        assert_eq!(
            Command::parse("moves z9"),
            Err(CommandError::BadSquare("z9".into()))
        );
        assert_eq!(
            Command::parse("e7e8k"),
            Err(CommandError::BadPromotion('k'))
        );
        assert_eq!(
            Command::parse("e2e9"),
            Err(CommandError::BadSquare("e9".into()))
        );
        assert!(matches!(
            Command::parse("castle"),
            Err(CommandError::Unknown(_))
        ));
    }
}
