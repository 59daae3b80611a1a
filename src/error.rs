use std::path::PathBuf;

use shakmaty::uci::ParseUciMoveError;
use thiserror::Error;

use crate::moves::Move;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("invalid fen '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },
}

#[derive(Debug, Error)]
pub enum MoveParseError {
    #[error("invalid uci move: {0}")]
    Uci(#[from] ParseUciMoveError),
    #[error("bad promotion piece in '{0}'")]
    Promotion(String),
    #[error("'{0}' is not a board move")]
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{0} is not a legal move in this position")]
pub struct IllegalMoveError(pub Move);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("search depth must be at least 1, got {0}")]
    InvalidDepth(u32),
    #[error("elo depth map is empty")]
    EmptyEloMap,
    #[error("elo depth map must strictly increase: ({prev_rating}, {prev_depth}) is followed by ({rating}, {depth})")]
    UnorderedEloMap {
        prev_rating: u32,
        prev_depth: u32,
        rating: u32,
        depth: u32,
    },
}
