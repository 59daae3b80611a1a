use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use shakmaty::Color;

use crate::config::EngineConfig;
use crate::difficulty::EloDepthMap;
use crate::error::ConfigError;
use crate::evaluation::{Evaluator, Score, SCORE_INFINITY};
use crate::moves::Move;
use crate::rules::{Rules, ScopedMove};

pub struct Search {
    evaluator: Evaluator,
    elo_map: EloDepthMap,
    max_depth: u32,
    rng: StdRng,
    nodes_searched: u64,
    rejected_moves: u64,
}

impl Default for Search {
    fn default() -> Self {
        Self::new()
    }
}

impl Search {
    pub fn new() -> Self {
        Self {
            evaluator: Evaluator::new(),
            elo_map: EloDepthMap::default(),
            max_depth: EngineConfig::default().depth,
            rng: StdRng::from_entropy(),
            nodes_searched: 0,
            rejected_moves: 0,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            evaluator: Evaluator::new(),
            elo_map: config.elo_map()?,
            max_depth: config.depth,
            rng,
            nodes_searched: 0,
            rejected_moves: 0,
        })
    }

    /// Replaces the random source used for move shuffling and weak play.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    pub fn evaluate<R: Rules>(&self, board: &R) -> Score {
        self.evaluator.evaluate(board)
    }

    /// Minimax with alpha-beta pruning. Scores are White-relative; White is the
    /// maximizing side. `board` is unchanged on return.
    pub fn alpha_beta<R: Rules>(
        &mut self,
        board: &mut R,
        depth: u32,
        mut alpha: Score,
        mut beta: Score,
        maximizing: bool,
    ) -> Score {
        self.nodes_searched += 1;

        // Leaf or finished game: static evaluation
        if depth == 0 || board.is_terminal() {
            return self.evaluator.evaluate(board);
        }

        let moves = self.order_moves(board);
        let mut searched = false;

        if maximizing {
            let mut best_score = -SCORE_INFINITY;
            for mv in &moves {
                let score = {
                    let Some(mut child) = self.play_generated(board, mv) else {
                        continue;
                    };
                    self.alpha_beta(&mut *child, depth - 1, alpha, beta, false)
                };
                searched = true;
                best_score = best_score.max(score);
                alpha = alpha.max(score);
                // Beta cutoff
                if beta <= alpha {
                    break;
                }
            }
            if searched {
                best_score
            } else {
                self.evaluator.evaluate(board)
            }
        } else {
            let mut best_score = SCORE_INFINITY;
            for mv in &moves {
                let score = {
                    let Some(mut child) = self.play_generated(board, mv) else {
                        continue;
                    };
                    self.alpha_beta(&mut *child, depth - 1, alpha, beta, true)
                };
                searched = true;
                best_score = best_score.min(score);
                beta = beta.min(score);
                // Alpha cutoff
                if beta <= alpha {
                    break;
                }
            }
            if searched {
                best_score
            } else {
                self.evaluator.evaluate(board)
            }
        }
    }

    /// Plain minimax over the full tree. Returns the same scores as
    /// [`Search::alpha_beta`] with an open window, only slower.
    pub fn minimax<R: Rules>(&mut self, board: &mut R, depth: u32, maximizing: bool) -> Score {
        self.nodes_searched += 1;

        if depth == 0 || board.is_terminal() {
            return self.evaluator.evaluate(board);
        }

        let mut best_score = if maximizing { -SCORE_INFINITY } else { SCORE_INFINITY };
        let mut searched = false;
        for mv in board.legal_moves() {
            let Some(mut child) = self.play_generated(board, &mv) else {
                continue;
            };
            let score = self.minimax(&mut *child, depth - 1, !maximizing);
            searched = true;
            best_score = if maximizing {
                best_score.max(score)
            } else {
                best_score.min(score)
            };
        }
        if searched {
            best_score
        } else {
            self.evaluator.evaluate(board)
        }
    }

    /// Plays a move taken from `legal_moves`. A rejected move breaks the
    /// `Rules` contract; it is logged and counted, then skipped.
    fn play_generated<'b, R: Rules>(
        &mut self,
        board: &'b mut R,
        mv: &Move,
    ) -> Option<ScopedMove<'b, R>> {
        match board.scoped(mv) {
            Ok(child) => Some(child),
            Err(e) => {
                self.rejected_moves += 1;
                warn!("rules rejected a generated move: {}", e);
                None
            }
        }
    }

    // Captures first; the sort is stable so generation order is kept otherwise.
    fn order_moves<R: Rules>(&self, board: &R) -> Vec<Move> {
        let mut moves = board.legal_moves();
        moves.sort_by_cached_key(|mv| !board.is_capture(mv));
        moves
    }

    /// Best move at the configured depth.
    pub fn find_best_move<R: Rules>(&mut self, board: &mut R) -> Option<Move> {
        self.find_best_move_at_depth(board, self.max_depth)
    }

    /// Picks a move for the side to move. At depth 1 or less the pick is
    /// uniformly random; deeper searches score every root move and keep the
    /// first best one in shuffled order. `None` means there are no legal moves.
    pub fn find_best_move_at_depth<R: Rules>(&mut self, board: &mut R, depth: u32) -> Option<Move> {
        let mut moves = board.legal_moves();
        if moves.is_empty() {
            return None;
        }
        // Weakest level: any legal move
        if depth <= 1 {
            return moves.choose(&mut self.rng).copied();
        }

        self.nodes_searched = 0;
        self.rejected_moves = 0;
        // Shuffle so equal scores are broken at random
        moves.shuffle(&mut self.rng);

        let maximizing = board.side_to_move() == Color::White;
        let mut best_move = None;
        let mut best_score = if maximizing { -SCORE_INFINITY } else { SCORE_INFINITY };

        for mv in moves {
            let score = {
                let Some(mut child) = self.play_generated(board, &mv) else {
                    continue;
                };
                self.alpha_beta(&mut *child, depth - 1, -SCORE_INFINITY, SCORE_INFINITY, !maximizing)
            };

            let improves = if maximizing {
                score > best_score
            } else {
                score < best_score
            };
            // A lost position still gets a move.
            if improves || best_move.is_none() {
                best_score = score;
                best_move = Some(mv);
            }
        }

        match best_move {
            Some(mv) => debug!(
                "depth {} best {} score {} nodes {}",
                depth, mv, best_score, self.nodes_searched
            ),
            None => warn!("no generated move could be played at the root"),
        }
        best_move
    }

    /// Chooses the search depth for a player rating and makes it the active depth.
    pub fn set_depth_for_rating(&mut self, rating: u32) -> u32 {
        let depth = self.elo_map.depth_for_rating(rating);
        self.max_depth = depth;
        info!("difficulty set for elo {}: depth {}", rating, depth);
        depth
    }

    pub fn set_max_depth(&mut self, depth: u32) {
        self.max_depth = depth.max(1);
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn get_nodes_searched(&self) -> u64 {
        self.nodes_searched
    }

    /// Generated moves the rules implementation refused to play during the
    /// last root search. Always 0 for a correct implementation.
    pub fn get_rejected_moves(&self) -> u64 {
        self.rejected_moves
    }
}
