use chess_rules::config::AppConfig;
use chess_rules::console::Session;
use chess_rules::engine::Game;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing (structured logging) on stderr; stdout carries replies.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chess_rules=info".into()),
        )
        .init();

    let config = AppConfig::from_env();
    let game = match Game::from_fen_as(&config.start_fen, config.perspective) {
        Ok(game) => game,
        Err(e) => {
            tracing::error!(fen = %config.start_fen, "cannot start: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        id = %game.id,
        perspective = %config.perspective,
        "chess-rules v{} ready; {}",
        env!("CARGO_PKG_VERSION"),
        game.caption()
    );

    if let Err(e) = run(Session::new(game, config.output)).await {
        tracing::error!("console I/O failed: {e}");
        std::process::exit(1);
    }
}

/// Read commands from stdin until `quit` or end of input.
async fn run(mut session: Session) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let reply = session.handle(&line);
        if !reply.text.is_empty() {
            stdout.write_all(reply.text.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        if reply.quit {
            break;
        }
    }

    tracing::info!(
        id = %session.game().id,
        fen = %session.game().to_fen(),
        status = %session.game().status(),
        "session ended"
    );
    Ok(())
}
