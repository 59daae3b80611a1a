use shakmaty::{Color, Role, Square};

use crate::rules::Rules;

/// Centipawns, positive when White is better.
pub type Score = i32;

/// Stands in for an infinite score. Small enough that the difference of
/// any two scores still fits in a `Score`.
pub const SCORE_INFINITY: Score = 1_000_000;

pub type PieceSquareTable = [[i32; 8]; 8];

/// Positional bonuses by piece type. Row 0 is the eighth rank as seen by
/// White; Black pieces read the tables rank-mirrored.
#[derive(Debug)]
pub struct PieceSquareTables {
    pub pawn: PieceSquareTable,
    pub knight: PieceSquareTable,
    pub bishop: PieceSquareTable,
    pub rook: PieceSquareTable,
    pub queen: PieceSquareTable,
    pub king_middle_game: PieceSquareTable,
    pub king_end_game: PieceSquareTable,
}

pub static PIECE_SQUARE_TABLES: PieceSquareTables = PieceSquareTables {
    pawn: [
        [0, 0, 0, 0, 0, 0, 0, 0],
        [50, 50, 50, 50, 50, 50, 50, 50],
        [10, 10, 20, 30, 30, 20, 10, 10],
        [5, 5, 10, 25, 25, 10, 5, 5],
        [0, 0, 0, 20, 20, 0, 0, 0],
        [5, -5, -10, 0, 0, -10, -5, 5],
        [5, 10, 10, -20, -20, 10, 10, 5],
        [0, 0, 0, 0, 0, 0, 0, 0],
    ],
    knight: [
        [-50, -40, -30, -30, -30, -30, -40, -50],
        [-40, -20, 0, 0, 0, 0, -20, -40],
        [-30, 0, 10, 15, 15, 10, 0, -30],
        [-30, 5, 15, 20, 20, 15, 5, -30],
        [-30, 0, 15, 20, 20, 15, 0, -30],
        [-30, 5, 10, 15, 15, 10, 5, -30],
        [-40, -20, 0, 5, 5, 0, -20, -40],
        [-50, -40, -30, -30, -30, -30, -40, -50],
    ],
    bishop: [
        [-20, -10, -10, -10, -10, -10, -10, -20],
        [-10, 0, 0, 0, 0, 0, 0, -10],
        [-10, 0, 5, 10, 10, 5, 0, -10],
        [-10, 5, 5, 10, 10, 5, 5, -10],
        [-10, 0, 10, 10, 10, 10, 0, -10],
        [-10, 10, 10, 10, 10, 10, 10, -10],
        [-10, 5, 0, 0, 0, 0, 5, -10],
        [-20, -10, -10, -10, -10, -10, -10, -20],
    ],
    rook: [
        [0, 0, 0, 0, 0, 0, 0, 0],
        [5, 10, 10, 10, 10, 10, 10, 5],
        [-5, 0, 0, 0, 0, 0, 0, -5],
        [-5, 0, 0, 0, 0, 0, 0, -5],
        [-5, 0, 0, 0, 0, 0, 0, -5],
        [-5, 0, 0, 0, 0, 0, 0, -5],
        [-5, 0, 0, 0, 0, 0, 0, -5],
        [0, 0, 0, 5, 5, 0, 0, 0],
    ],
    queen: [
        [-20, -10, -10, -5, -5, -10, -10, -20],
        [-10, 0, 0, 0, 0, 0, 0, -10],
        [-10, 0, 5, 5, 5, 5, 0, -10],
        [-5, 0, 5, 5, 5, 5, 0, -5],
        [0, 0, 5, 5, 5, 5, 0, -5],
        [-10, 5, 5, 5, 5, 5, 0, -10],
        [-10, 0, 5, 0, 0, 0, 0, -10],
        [-20, -10, -10, -5, -5, -10, -10, -20],
    ],
    // Keep the king behind its pawns while there is material on the board.
    king_middle_game: [
        [-30, -40, -40, -50, -50, -40, -40, -30],
        [-30, -40, -40, -50, -50, -40, -40, -30],
        [-30, -40, -40, -50, -50, -40, -40, -30],
        [-30, -40, -40, -50, -50, -40, -40, -30],
        [-20, -30, -30, -40, -40, -30, -30, -20],
        [-10, -20, -20, -20, -20, -20, -20, -10],
        [20, 20, 0, 0, 0, 0, 20, 20],
        [20, 30, 10, 0, 0, 10, 30, 20],
    ],
    // Bring it to the centre once the board has emptied.
    king_end_game: [
        [-50, -40, -30, -20, -20, -30, -40, -50],
        [-30, -20, -10, 0, 0, -10, -20, -30],
        [-30, -10, 20, 30, 30, 20, -10, -30],
        [-30, -10, 30, 40, 40, 30, -10, -30],
        [-30, -10, 30, 40, 40, 30, -10, -30],
        [-30, -10, 20, 30, 30, 20, -10, -30],
        [-30, -20, -10, 0, 0, -10, -20, -30],
        [-50, -40, -30, -20, -20, -30, -40, -50],
    ],
};

const CENTER_SQUARES: [Square; 4] = [Square::D4, Square::E4, Square::D5, Square::E5];

pub const fn piece_value(role: Role) -> Score {
    match role {
        Role::Pawn => 100,
        Role::Knight => 320,
        Role::Bishop => 330,
        Role::Rook => 500,
        Role::Queen => 900,
        Role::King => 20000,
    }
}

/// Converts a White-relative score to the point of view of `color`.
pub fn score_for(color: Color, score: Score) -> Score {
    match color {
        Color::White => score,
        Color::Black => -score,
    }
}

/// Static evaluation. Holds only shared, read-only data, so one instance can
/// score any number of positions.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    tables: &'static PieceSquareTables,

    bishop_pair_bonus: Score,
    center_attack_bonus: Score,
    doubled_pawn_penalty: Score,
    // Fewer pieces than this on the board means endgame.
    endgame_piece_count: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_tables(&PIECE_SQUARE_TABLES)
    }

    pub fn with_tables(tables: &'static PieceSquareTables) -> Self {
        Self {
            tables,
            bishop_pair_bonus: 50,
            center_attack_bonus: 5,
            doubled_pawn_penalty: 20,
            endgame_piece_count: 10,
        }
    }

    pub fn evaluate<R: Rules>(&self, board: &R) -> Score {
        // Game over
        if board.is_checkmate() {
            return match board.side_to_move() {
                Color::White => -SCORE_INFINITY,
                Color::Black => SCORE_INFINITY,
            };
        }
        if board.is_stalemate() || board.is_insufficient_material() {
            return 0;
        }

        // Game phase only picks the king table
        let is_endgame = self.is_endgame(board);
        let mut score = 0;
        let mut bishops = [0; 2];
        let mut pawns_per_file = [[0; 8]; 2];

        // Material and piece-square bonuses
        for square in Square::ALL {
            let Some(piece) = board.piece_at(square) else {
                continue;
            };
            let value = piece_value(piece.role)
                + self.positional_bonus(piece.role, piece.color, square, is_endgame);
            score += score_for(piece.color, value);

            // Tally bishops and pawn files for the structure terms
            let side = color_index(piece.color);
            match piece.role {
                Role::Bishop => bishops[side] += 1,
                Role::Pawn => pawns_per_file[side][square.file() as usize] += 1,
                _ => {}
            }
        }

        // Structure and activity
        score += self.evaluate_bishop_pair(bishops);
        score += self.evaluate_center_control(board);
        score += self.evaluate_doubled_pawns(pawns_per_file);

        score
    }

    fn is_endgame<R: Rules>(&self, board: &R) -> bool {
        board.piece_count() < self.endgame_piece_count
    }

    fn positional_bonus(&self, role: Role, color: Color, square: Square, is_endgame: bool) -> Score {
        let table = match role {
            Role::Pawn => &self.tables.pawn,
            Role::Knight => &self.tables.knight,
            Role::Bishop => &self.tables.bishop,
            Role::Rook => &self.tables.rook,
            Role::Queen => &self.tables.queen,
            Role::King if is_endgame => &self.tables.king_end_game,
            Role::King => &self.tables.king_middle_game,
        };

        let rank = square.rank() as usize;
        let row = match color {
            Color::White => 7 - rank,
            Color::Black => rank,
        };
        table[row][square.file() as usize]
    }

    fn evaluate_bishop_pair(&self, bishops: [u32; 2]) -> Score {
        let mut score = 0;
        if bishops[color_index(Color::White)] >= 2 {
            score += self.bishop_pair_bonus;
        }
        if bishops[color_index(Color::Black)] >= 2 {
            score -= self.bishop_pair_bonus;
        }
        score
    }

    fn evaluate_center_control<R: Rules>(&self, board: &R) -> Score {
        CENTER_SQUARES
            .iter()
            .map(|&square| {
                let white = board.attackers(Color::White, square) as Score;
                let black = board.attackers(Color::Black, square) as Score;
                (white - black) * self.center_attack_bonus
            })
            .sum()
    }

    fn evaluate_doubled_pawns(&self, pawns_per_file: [[Score; 8]; 2]) -> Score {
        let penalty = |counts: &[Score; 8]| -> Score {
            counts
                .iter()
                .filter(|&&count| count > 1)
                .map(|&count| self.doubled_pawn_penalty * (count - 1))
                .sum()
        };

        // A penalty for White lowers the score, one for Black raises it.
        penalty(&pawns_per_file[color_index(Color::Black)])
            - penalty(&pawns_per_file[color_index(Color::White)])
    }
}

fn color_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use shakmaty::fen::Fen;
    use shakmaty::{Piece, Setup};

    fn eval(fen: &str) -> Score {
        Evaluator::new().evaluate(&Board::from_fen(fen).unwrap())
    }

    /// The same position with colours swapped and the board flipped top to
    /// bottom. Castling rights and the en passant square are dropped.
    fn mirror_position(fen: &str) -> Board {
        let setup = fen.parse::<Fen>().unwrap().into_setup();

        let mut pieces = shakmaty::Board::empty();
        for square in Square::ALL {
            if let Some(piece) = setup.board.piece_at(square) {
                pieces.set_piece_at(
                    square.flip_vertical(),
                    Piece {
                        color: !piece.color,
                        role: piece.role,
                    },
                );
            }
        }

        let mirror = Setup {
            board: pieces,
            turn: !setup.turn,
            halfmoves: setup.halfmoves,
            fullmoves: setup.fullmoves,
            ..Setup::empty()
        };
        Board::from_fen(&Fen::from_setup(mirror).to_string()).unwrap()
    }

    #[test]
    fn test_initial_position_is_balanced() {
        let board = Board::new();
        assert_eq!(Evaluator::new().evaluate(&board), 0);
    }

    #[test]
    fn test_checkmate_scores() {
        // White is mated.
        assert_eq!(
            eval("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3"),
            -SCORE_INFINITY
        );
        // Black is mated.
        assert_eq!(eval("R5k1/5ppp/8/8/8/8/8/K7 b - - 0 1"), SCORE_INFINITY);
    }

    #[test]
    fn test_drawn_positions_score_zero() {
        assert_eq!(eval("k7/8/1Q6/8/8/8/8/1K6 b - - 0 1"), 0);
        assert_eq!(eval("8/8/4k3/8/8/3KB3/8/8 w - - 0 1"), 0);
    }

    #[test]
    fn test_material_dominates() {
        // White is a queen up.
        assert!(eval("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1") > 800);
        // Black is a rook up.
        assert!(eval("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/1NBQKBNR w Kkq - 0 1") < -400);
    }

    #[test]
    fn test_piece_square_bonus_is_mirrored_for_black() {
        let evaluator = Evaluator::new();
        for role in [Role::Pawn, Role::Knight, Role::Bishop, Role::Rook, Role::Queen, Role::King] {
            for square in Square::ALL {
                for is_endgame in [false, true] {
                    let white = evaluator.positional_bonus(role, Color::White, square, is_endgame);
                    let black = evaluator.positional_bonus(
                        role,
                        Color::Black,
                        square.flip_vertical(),
                        is_endgame,
                    );
                    assert_eq!(white, black, "{role:?} on {square}");
                }
            }
        }
    }

    #[test]
    fn test_king_table_depends_on_phase() {
        let evaluator = Evaluator::new();
        assert_eq!(evaluator.positional_bonus(Role::King, Color::White, Square::G1, false), 30);
        assert_eq!(evaluator.positional_bonus(Role::King, Color::White, Square::G1, true), -40);
        assert_eq!(evaluator.positional_bonus(Role::King, Color::White, Square::E4, true), 40);
    }

    #[test]
    fn test_endgame_threshold() {
        let evaluator = Evaluator::new();
        // Nine pieces.
        let board = Board::from_fen("4k3/pppp4/8/8/8/8/PPP5/4K3 w - - 0 1").unwrap();
        assert!(evaluator.is_endgame(&board));
        // Ten pieces.
        let board = Board::from_fen("4k3/pppp4/8/8/8/8/PPPP4/4K3 w - - 0 1").unwrap();
        assert!(!evaluator.is_endgame(&board));
    }

    #[test]
    fn test_bishop_pair() {
        let evaluator = Evaluator::new();
        assert_eq!(evaluator.evaluate_bishop_pair([2, 1]), 50);
        assert_eq!(evaluator.evaluate_bishop_pair([1, 2]), -50);
        assert_eq!(evaluator.evaluate_bishop_pair([2, 2]), 0);
        assert_eq!(evaluator.evaluate_bishop_pair([0, 0]), 0);
    }

    #[test]
    fn test_doubled_pawns() {
        let evaluator = Evaluator::new();
        let mut files = [[0; 8]; 2];
        files[0][4] = 3; // White tripled on e
        files[1][2] = 2; // Black doubled on c
        assert_eq!(evaluator.evaluate_doubled_pawns(files), 20 - 40);
    }

    #[test]
    fn test_center_control() {
        let evaluator = Evaluator::new();
        // 1.e4 adds one white attacker on d5.
        let mut board = Board::new();
        assert_eq!(evaluator.evaluate_center_control(&board), 0);
        board.make_move(&"e2e4".parse().unwrap()).unwrap();
        assert_eq!(evaluator.evaluate_center_control(&board), 5);
    }

    #[test]
    fn test_mirror_symmetry() {
        let positions = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1",
            "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w - - 2 3",
            "r2q1rk1/pp2bppp/2n1pn2/3p4/2PP4/2N1PN2/PP2BPPP/R2Q1RK1 b - - 3 9",
            "8/5k2/3p4/1p1Pp2p/pP2Pp1P/P4P1K/8/8 b - - 99 50",
            "4k3/8/8/3PP3/8/8/3P4/4K3 w - - 0 1",
            "2b1kb2/8/8/8/8/8/8/1B2KB2 w - - 0 1",
        ];
        let evaluator = Evaluator::new();
        for fen in positions {
            let board = Board::from_fen(fen).unwrap();
            let mirrored = mirror_position(fen);
            assert_eq!(
                evaluator.evaluate(&board),
                -evaluator.evaluate(&mirrored),
                "{fen}"
            );
        }
    }

    #[test]
    fn test_score_for() {
        assert_eq!(score_for(Color::White, 120), 120);
        assert_eq!(score_for(Color::Black, 120), -120);
    }
}
