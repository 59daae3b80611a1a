//! The interface the engine needs from a chess rules implementation.
//!
//! The search, evaluator and classifier are written against [`Rules`] only.
//! [`crate::board::Board`] is the implementation shipped with the crate.

use std::ops::{Deref, DerefMut};

use shakmaty::{Color, Piece, Square};

use crate::error::IllegalMoveError;
use crate::moves::Move;

pub trait Rules {
    /// Legal moves for the side to move, in generation order.
    fn legal_moves(&self) -> Vec<Move>;

    fn is_capture(&self, mv: &Move) -> bool;

    /// Plays `mv`. An illegal move is rejected and leaves the position as it was.
    fn make_move(&mut self, mv: &Move) -> Result<(), IllegalMoveError>;

    /// Takes back the last move made with [`Rules::make_move`]. Does nothing
    /// when there is no move to take back.
    fn unmake_move(&mut self);

    fn is_checkmate(&self) -> bool;
    fn is_stalemate(&self) -> bool;
    fn is_insufficient_material(&self) -> bool;
    fn is_draw_by_repetition(&self) -> bool;
    fn is_fifty_move_rule(&self) -> bool;
    fn is_check(&self) -> bool;

    fn side_to_move(&self) -> Color;

    fn piece_at(&self, square: Square) -> Option<Piece>;

    /// Number of `color` pieces attacking `square`.
    fn attackers(&self, color: Color, square: Square) -> u32;

    /// Standard algebraic notation for a legal `mv`.
    fn to_notation(&self, mv: &Move) -> String;

    fn is_terminal(&self) -> bool {
        self.is_checkmate()
            || self.is_stalemate()
            || self.is_insufficient_material()
            || self.is_draw_by_repetition()
            || self.is_fifty_move_rule()
    }

    fn is_legal(&self, mv: &Move) -> bool {
        self.legal_moves().contains(mv)
    }

    fn piece_count(&self) -> usize {
        Square::ALL
            .iter()
            .filter(|&&square| self.piece_at(square).is_some())
            .count()
    }

    /// Plays `mv` for the lifetime of the returned guard. Dropping the guard
    /// takes the move back, whichever way the enclosing scope is left.
    fn scoped(&mut self, mv: &Move) -> Result<ScopedMove<'_, Self>, IllegalMoveError>
    where
        Self: Sized,
    {
        self.make_move(mv)?;
        Ok(ScopedMove { position: self })
    }
}

/// A position with one extra move applied; see [`Rules::scoped`].
pub struct ScopedMove<'a, R: Rules> {
    position: &'a mut R,
}

impl<R: Rules> Deref for ScopedMove<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.position
    }
}

impl<R: Rules> DerefMut for ScopedMove<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.position
    }
}

impl<R: Rules> Drop for ScopedMove<'_, R> {
    fn drop(&mut self) {
        self.position.unmake_move();
    }
}

