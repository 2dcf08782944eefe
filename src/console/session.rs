//! One console session: a game plus the reply format.

use serde::Serialize;

use crate::config::OutputFormat;
use crate::console::commands::{Command, CommandError, HELP};
use crate::console::models::{board_view, error_view, highlight_view, move_view};
use crate::engine::{ChessError, Game, MoveRequest, PieceKind};

/// Text to print for one input line, and whether the session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Reply {
            text: text.into(),
            quit: false,
        }
    }
}

pub struct Session {
    game: Game,
    output: OutputFormat,
}

impl Session {
    pub fn new(game: Game, output: OutputFormat) -> Self {
        Session { game, output }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Handle one line of input.
    pub fn handle(&mut self, line: &str) -> Reply {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(CommandError::Empty) => return Reply::text(""),
            Err(e) => return self.error("INVALID_COMMAND", e.to_string()),
        };

        match command {
            Command::Quit => Reply {
                text: String::new(),
                quit: true,
            },
            Command::Help => Reply::text(HELP),
            Command::Board | Command::Status => self.board(),
            Command::Fen => Reply::text(self.game.to_fen()),
            Command::Moves(name) => match self.game.square(&name) {
                Ok(sq) => {
                    let view = highlight_view(&self.game, sq);
                    match self.output {
                        OutputFormat::Json => self.json(&view),
                        OutputFormat::Text if view.moves.is_empty() => {
                            Reply::text(format!("{}: no legal moves", view.square))
                        }
                        OutputFormat::Text => {
                            Reply::text(format!("{}: {}", view.square, view.moves.join(" ")))
                        }
                    }
                }
                Err(e) => self.chess_error(e),
            },
            Command::Move {
                from,
                to,
                promotion,
            } => self.play(&from, &to, promotion),
        }
    }

    fn play(&mut self, from: &str, to: &str, promotion: Option<PieceKind>) -> Reply {
        let request = match (self.game.square(from), self.game.square(to)) {
            (Ok(from), Ok(to)) => MoveRequest {
                from,
                to,
                side: self.game.side_to_move(),
                promotion,
            },
            (Err(e), _) | (_, Err(e)) => return self.chess_error(e),
        };

        match self.game.play(request) {
            Ok(outcome) => {
                let view = move_view(&self.game, &outcome);
                match self.output {
                    OutputFormat::Json => self.json(&view),
                    OutputFormat::Text => Reply::text(format!(
                        "{} {} -> {}\n{}\n{}",
                        view.piece,
                        view.from,
                        view.to,
                        self.game.position().board_string(),
                        status_line(&self.game)
                    )),
                }
            }
            Err(e) => self.chess_error(e),
        }
    }

    fn board(&self) -> Reply {
        match self.output {
            OutputFormat::Json => self.json(&board_view(&self.game)),
            OutputFormat::Text => Reply::text(format!(
                "{}\n{}",
                self.game.position().board_string(),
                status_line(&self.game)
            )),
        }
    }

    fn chess_error(&self, err: ChessError) -> Reply {
        let code = match &err {
            ChessError::IllegalMove { .. } => "ILLEGAL_MOVE",
            ChessError::InvalidSquare(_) => "INVALID_SQUARE",
            ChessError::InvalidFen(_) => "INVALID_FEN",
            ChessError::InconsistentState(_) => "INTERNAL_ERROR",
        };
        self.error(code, err.to_string())
    }

    fn error(&self, code: &str, message: String) -> Reply {
        match self.output {
            OutputFormat::Json => self.json(&error_view(code, message)),
            OutputFormat::Text => Reply::text(format!("error: {message}")),
        }
    }

    fn json<T: Serialize>(&self, value: &T) -> Reply {
        match serde_json::to_string(value) {
            Ok(text) => Reply::text(text),
            Err(e) => Reply::text(format!("error: {e}")),
        }
    }
}

fn status_line(game: &Game) -> String {
    format!("{} [{}]", game.caption(), game.status())
}
