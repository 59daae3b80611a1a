//! Grading a played move against the engine's own choice.
//!
//! The played move and the engine's best move are both applied to copies of
//! the position and the resulting static evaluations compared from the
//! mover's point of view.

use std::fmt;

use shakmaty::Role;

use crate::evaluation::{score_for, Score};
use crate::moves::Move;
use crate::rules::Rules;
use crate::search::Search;

const BLUNDER_THRESHOLD: Score = 200;
const MISTAKE_THRESHOLD: Score = 80;
const INACCURACY_THRESHOLD: Score = 30;
// A "good" move that still loses this much against the previous position is
// downgraded.
const WORSENING_THRESHOLD: Score = -30;

const MAX_ANALYSIS_DEPTH: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveClassification {
    BestMove,
    BestDefense,
    GoodMove,
    Inaccuracy,
    Mistake,
    Blunder,
    IllegalMove,
}

impl fmt::Display for MoveClassification {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            MoveClassification::BestMove => "best-move",
            MoveClassification::BestDefense => "best-defense",
            MoveClassification::GoodMove => "good-move",
            MoveClassification::Inaccuracy => "inaccuracy",
            MoveClassification::Mistake => "mistake",
            MoveClassification::Blunder => "blunder",
            MoveClassification::IllegalMove => "illegal-move",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    pub classification: MoveClassification,
    /// The engine's choice in the same position.
    pub best_move: Option<Move>,
    /// Centipawns the played move gives up compared with `best_move`.
    pub score_drop: Score,
    /// How the mover's evaluation changed from before the move to after it.
    pub eval_change: Score,
    pub explanation: String,
}

impl AnalysisResult {
    fn illegal() -> Self {
        Self {
            classification: MoveClassification::IllegalMove,
            best_move: None,
            score_drop: 0,
            eval_change: 0,
            explanation: "illegal move".to_string(),
        }
    }
}

/// Grades a move from the score it gave up against the best move (`drop`)
/// and the change in the mover's evaluation (`delta`).
pub fn classify(drop: Score, delta: Score, is_best_move: bool) -> MoveClassification {
    if is_best_move {
        return if delta >= 0 {
            MoveClassification::BestMove
        } else {
            MoveClassification::BestDefense
        };
    }

    if drop >= BLUNDER_THRESHOLD {
        MoveClassification::Blunder
    } else if drop >= MISTAKE_THRESHOLD {
        MoveClassification::Mistake
    } else if drop >= INACCURACY_THRESHOLD || delta < WORSENING_THRESHOLD {
        MoveClassification::Inaccuracy
    } else {
        MoveClassification::GoodMove
    }
}

pub fn analysis_depth(configured_depth: u32) -> u32 {
    (configured_depth + 1).min(MAX_ANALYSIS_DEPTH)
}

impl Search {
    /// Classifies `played` in `before`. The position passed in is never
    /// modified; all work happens on copies.
    pub fn analyze_move<R: Rules + Clone>(&mut self, before: &R, played: &Move) -> AnalysisResult {
        if !before.is_legal(played) {
            return AnalysisResult::illegal();
        }

        let mover = before.side_to_move();
        let depth = analysis_depth(self.max_depth());

        let eval_before = score_for(mover, self.evaluate(before));

        let mut scratch = before.clone();
        let best_move = self.find_best_move_at_depth(&mut scratch, depth);
        let eval_after_best = match &best_move {
            Some(mv) => self.evaluate_after(before, mv),
            None => None,
        };

        let Some(eval_after_player) = self.evaluate_after(before, played) else {
            return AnalysisResult::illegal();
        };
        let eval_after_player = score_for(mover, eval_after_player);
        let eval_after_best = eval_after_best.map_or(eval_after_player, |score| score_for(mover, score));

        let drop = eval_after_best - eval_after_player;
        let delta = eval_after_player - eval_before;
        let is_best_move = best_move.as_ref() == Some(played);
        let classification = classify(drop, delta, is_best_move);

        let explanation = explain(before, classification, best_move.as_ref(), drop);

        AnalysisResult {
            classification,
            best_move,
            score_drop: drop,
            eval_change: delta,
            explanation,
        }
    }

    // White-relative evaluation after `mv`, or `None` if it cannot be played.
    fn evaluate_after<R: Rules + Clone>(&self, before: &R, mv: &Move) -> Option<Score> {
        let mut after = before.clone();
        after.make_move(mv).ok()?;
        Some(self.evaluate(&after))
    }
}

fn explain<R: Rules + Clone>(
    before: &R,
    classification: MoveClassification,
    best_move: Option<&Move>,
    drop: Score,
) -> String {
    match classification {
        MoveClassification::BestMove => {
            return "Excellent! This is the strongest move, creating the largest advantage.".to_string()
        }
        MoveClassification::GoodMove => {
            return "Good move! You keep the pressure on and improve your position.".to_string()
        }
        MoveClassification::BestDefense => {
            return "Good defense. This was the best way to limit the damage in a difficult position."
                .to_string()
        }
        MoveClassification::IllegalMove => return "illegal move".to_string(),
        _ => {}
    }

    if let Some(best) = best_move {
        if let Some(opportunity) = describe_opportunity(before, best) {
            return format!(
                "The best move was {} to {}.",
                before.to_notation(best),
                opportunity
            );
        }
    }

    format!(
        "This move cost {:.2} points of positional value.",
        drop as f64 / 100.0
    )
}

// Tactical reasons to prefer `best`: what it captures and whether it checks.
fn describe_opportunity<R: Rules + Clone>(before: &R, best: &Move) -> Option<String> {
    let mut parts = Vec::new();

    if before.is_capture(best) {
        // En passant leaves the target square empty; the mover is a pawn then.
        let captured = before
            .piece_at(best.to)
            .or_else(|| before.piece_at(best.from))
            .map_or(Role::Pawn, |piece| piece.role);
        parts.push(format!("capture the enemy {}", role_name(captured)));
    }

    let mut after = before.clone();
    if after.make_move(best).is_ok() && after.is_check() {
        parts.push("give check".to_string());
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" and "))
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::Pawn => "pawn",
        Role::Knight => "knight",
        Role::Bishop => "bishop",
        Role::Rook => "rook",
        Role::Queen => "queen",
        Role::King => "king",
    }
}
