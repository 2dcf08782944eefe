use crate::engine::{Color, STARTING_FEN};

/// How the console renders replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Session configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Initial position as a FEN string.
    pub start_fen: String,
    /// Side the board is decoded for.
    pub perspective: Color,
    /// Console reply format.
    pub output: OutputFormat,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup. Unknown or malformed
    /// values fall back to the defaults; the FEN is validated at start-up.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            start_fen: lookup("CHESS_START_FEN")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.start_fen),
            perspective: lookup("CHESS_PERSPECTIVE")
                .and_then(|v| Color::from_fen_char(v.trim()))
                .unwrap_or(defaults.perspective),
            output: lookup("CHESS_OUTPUT")
                .and_then(|v| OutputFormat::parse(&v))
                .unwrap_or(defaults.output),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            start_fen: STARTING_FEN.to_string(),
            perspective: Color::White,
            output: OutputFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config() {
        let config = AppConfig::default();
        assert_eq!(config.start_fen, STARTING_FEN);
        assert_eq!(config.perspective, Color::White);
        assert_eq!(config.output, OutputFormat::Text);
    }

    #[test]
    fn reads_all_keys() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CHESS_START_FEN", "4k3/8/8/8/8/8/8/4K3 w - - 0 1"),
            ("CHESS_PERSPECTIVE", "b"),
            ("CHESS_OUTPUT", "JSON"),
        ]));
        assert_eq!(config.start_fen, "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(config.perspective, Color::Black);
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CHESS_START_FEN", "  "),
            ("CHESS_PERSPECTIVE", "red"),
            ("CHESS_OUTPUT", "yaml"),
        ]));
        assert_eq!(config.start_fen, STARTING_FEN);
        assert_eq!(config.perspective, Color::White);
        assert_eq!(config.output, OutputFormat::Text);
    }
}
