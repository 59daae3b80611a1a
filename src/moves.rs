use std::fmt;
use std::str::FromStr;

use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Role, Square};

use crate::error::MoveParseError;

/// A move as the engine sees it: origin, destination and an optional
/// promotion piece. Castling is written as the king's two-square step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub fn new_promotion(from: Square, to: Square, promotion: Role) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    /// Converts a rules-library move. Returns `None` for drops and null
    /// moves, which standard chess never produces.
    pub(crate) fn from_chess(mv: &shakmaty::Move) -> Option<Self> {
        match mv.to_uci(CastlingMode::Standard) {
            UciMove::Normal {
                from,
                to,
                promotion,
            } => Some(Self {
                from,
                to,
                promotion,
            }),
            _ => None,
        }
    }

    pub(crate) fn to_uci(self) -> UciMove {
        UciMove::Normal {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promotion) = self.promotion {
            write!(f, "{}", promotion.char())?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<UciMove>()? {
            UciMove::Normal {
                promotion: Some(Role::Pawn | Role::King),
                ..
            } => Err(MoveParseError::Promotion(s.to_string())),
            UciMove::Normal {
                from,
                to,
                promotion,
            } => Ok(Self {
                from,
                to,
                promotion,
            }),
            _ => Err(MoveParseError::Unsupported(s.to_string())),
        }
    }
}
