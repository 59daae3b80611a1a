use std::fmt;

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, File, Piece, Position, Rank, Square};

use crate::error::{BoardError, IllegalMoveError};
use crate::moves::Move;
use crate::rules::Rules;

const FIFTY_MOVE_HALFMOVES: u32 = 100;
const REPETITION_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Ongoing,
    Checkmate(Color), // winner
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        *self != GameState::Ongoing
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GameState::Ongoing => write!(f, "ongoing"),
            GameState::Checkmate(Color::White) => write!(f, "checkmate, white wins"),
            GameState::Checkmate(Color::Black) => write!(f, "checkmate, black wins"),
            GameState::Stalemate => write!(f, "draw by stalemate"),
            GameState::InsufficientMaterial => write!(f, "draw by insufficient material"),
            GameState::FiftyMoveRule => write!(f, "draw by the fifty-move rule"),
            GameState::ThreefoldRepetition => write!(f, "draw by threefold repetition"),
        }
    }
}

/// A game in progress: the current position plus everything needed to take
/// moves back and to spot repetitions.
#[derive(Debug, Clone)]
pub struct Board {
    position: Chess,
    undo_stack: Vec<Chess>,
    // Hash of every position reached so far, the current one last.
    hashes: Vec<Zobrist64>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self::from_position(Chess::default())
    }

    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let invalid = |reason: String| BoardError::InvalidFen {
            fen: fen.to_string(),
            reason,
        };
        let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{e}")))?;
        let position: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(format!("{e}")))?;
        Ok(Self::from_position(position))
    }

    fn from_position(position: Chess) -> Self {
        let hash = Self::hash_of(&position);
        Self {
            position,
            undo_stack: Vec::new(),
            hashes: vec![hash],
        }
    }

    fn hash_of(position: &Chess) -> Zobrist64 {
        position.zobrist_hash(EnPassantMode::Legal)
    }

    pub fn to_fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    /// Number of moves that can currently be taken back.
    pub fn history_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn hash(&self) -> u64 {
        self.hashes.last().map_or(0, |hash| hash.0)
    }

    fn find_legal(&self, mv: &Move) -> Option<shakmaty::Move> {
        mv.to_uci().to_move(&self.position).ok()
    }

    fn repetitions(&self) -> usize {
        match self.hashes.last() {
            Some(current) => self.hashes.iter().filter(|&hash| hash == current).count(),
            None => 0,
        }
    }

    pub fn game_state(&self) -> GameState {
        if self.position.is_checkmate() {
            GameState::Checkmate(!self.position.turn())
        } else if self.position.is_stalemate() {
            GameState::Stalemate
        } else if self.position.is_insufficient_material() {
            GameState::InsufficientMaterial
        } else if self.is_fifty_move_rule() {
            GameState::FiftyMoveRule
        } else if self.is_draw_by_repetition() {
            GameState::ThreefoldRepetition
        } else {
            GameState::Ongoing
        }
    }
}

impl Rules for Board {
    fn legal_moves(&self) -> Vec<Move> {
        self.position
            .legal_moves()
            .iter()
            .filter_map(Move::from_chess)
            .collect()
    }

    fn is_capture(&self, mv: &Move) -> bool {
        self.find_legal(mv).is_some_and(|m| m.is_capture())
    }

    fn make_move(&mut self, mv: &Move) -> Result<(), IllegalMoveError> {
        let chess_move = self.find_legal(mv).ok_or(IllegalMoveError(*mv))?;
        self.undo_stack.push(self.position.clone());
        self.position.play_unchecked(&chess_move);
        self.hashes.push(Self::hash_of(&self.position));
        Ok(())
    }

    fn unmake_move(&mut self) {
        if let Some(previous) = self.undo_stack.pop() {
            self.position = previous;
            self.hashes.pop();
        }
    }

    fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    fn is_insufficient_material(&self) -> bool {
        self.position.is_insufficient_material()
    }

    fn is_draw_by_repetition(&self) -> bool {
        self.repetitions() >= REPETITION_LIMIT
    }

    fn is_fifty_move_rule(&self) -> bool {
        self.position.halfmoves() >= FIFTY_MOVE_HALFMOVES
    }

    fn is_check(&self) -> bool {
        self.position.is_check()
    }

    fn side_to_move(&self) -> Color {
        self.position.turn()
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position.board().piece_at(square)
    }

    fn attackers(&self, color: Color, square: Square) -> u32 {
        let board = self.position.board();
        board.attacks_to(square, color, board.occupied()).count() as u32
    }

    fn to_notation(&self, mv: &Move) -> String {
        match self.find_legal(mv) {
            Some(chess_move) => SanPlus::from_move(self.position.clone(), &chess_move).to_string(),
            None => mv.to_string(),
        }
    }

    fn piece_count(&self) -> usize {
        self.position.board().occupied().count()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rank in (0..8).rev() {
            for file in 0..8 {
                let square = Square::from_coords(File::new(file), Rank::new(rank));
                let symbol = self.piece_at(square).map_or('.', |piece| piece.char());
                write!(f, "{symbol}")?;
                if file < 7 {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
