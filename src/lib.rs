pub mod analysis;
pub mod board;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod evaluation;
pub mod moves;
pub mod rules;
pub mod search;
pub mod uci;

pub use analysis::{AnalysisResult, MoveClassification};
pub use board::{Board, GameState};
pub use config::EngineConfig;
pub use difficulty::{EloDepthEntry, EloDepthMap};
pub use error::{BoardError, ConfigError, IllegalMoveError, MoveParseError};
pub use evaluation::{Evaluator, Score, SCORE_INFINITY};
pub use moves::Move;
pub use rules::{Rules, ScopedMove};
pub use search::Search;
pub use uci::UciHandler;

pub use shakmaty::{Color, Piece, Role, Square};

#[cfg(test)]
mod tests {
    use super::*;

    fn perft(board: &mut Board, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }

        let mut nodes = 0;
        for mv in board.legal_moves() {
            let mut child = board.scoped(&mv).unwrap();
            nodes += perft(&mut *child, depth - 1);
        }
        nodes
    }

    #[test]
    fn test_perft_initial_position() {
        let mut board = Board::new();
        assert_eq!(perft(&mut board, 1), 20);
        assert_eq!(perft(&mut board, 2), 400);
        assert_eq!(perft(&mut board, 3), 8902);
        assert_eq!(board.history_len(), 0);
    }

    #[test]
    fn test_game_through_public_api() {
        let mut board = Board::new();
        let mut search = Search::new().with_seed(9);
        search.set_max_depth(2);

        for _ in 0..6 {
            let Some(mv) = search.find_best_move(&mut board) else {
                break;
            };
            let result = search.analyze_move(&board, &mv);
            assert_ne!(result.classification, MoveClassification::IllegalMove);
            board.make_move(&mv).unwrap();
        }
        assert_eq!(board.history_len(), 6);
    }
}
