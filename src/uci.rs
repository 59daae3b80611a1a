use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use log::{debug, warn};

use crate::board::Board;
use crate::moves::Move;
use crate::rules::Rules;
use crate::search::Search;

const ENGINE_NAME: &str = "Salmon Analyst";
const ENGINE_AUTHOR: &str = env!("CARGO_PKG_AUTHORS");

/// Line-based front end modelled on UCI, extended with commands for grading
/// moves (`analyze`, `play`), taking them back (`undo`), static evaluation
/// (`eval`) and printing the board (`d`).
pub struct UciHandler {
    board: Board,
    search: Search,
}

impl UciHandler {
    pub fn new(search: Search) -> Self {
        Self {
            board: Board::new(),
            search,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut reader = stdin.lock();
        let mut line = String::new();

        while reader.read_line(&mut line).context("failed to read command")? > 0 {
            let command = line.trim();
            if command == "quit" {
                break;
            }

            match self.handle_command(command) {
                Ok(response) => {
                    write!(stdout, "{response}")?;
                    stdout.flush()?;
                }
                Err(e) => warn!("ignoring '{}': {:#}", command, e),
            }
            line.clear();
        }
        Ok(())
    }

    pub fn handle_command(&mut self, command: &str) -> Result<String> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        let Some((&name, args)) = parts.split_first() else {
            return Ok(String::new());
        };
        debug!("command: {}", command);

        match name {
            "uci" => Ok(self.handle_uci()),
            "isready" => Ok("readyok\n".to_string()),
            "ucinewgame" => {
                self.board = Board::new();
                Ok(String::new())
            }
            "position" => self.handle_position(args).map(|_| String::new()),
            "go" => self.handle_go(args),
            "setoption" => self.handle_setoption(args).map(|_| String::new()),
            "analyze" => self.handle_analyze(args),
            "play" => self.handle_play(args),
            "undo" => {
                self.board.unmake_move();
                Ok(String::new())
            }
            "eval" => Ok(format!("eval {}\n", self.search.evaluate(&self.board))),
            "d" => Ok(format!("{}fen {}\n", self.board, self.board.to_fen())),
            "quit" => Ok(String::new()),
            _ => bail!("unknown command"),
        }
    }

    fn handle_uci(&self) -> String {
        format!(
            "id name {ENGINE_NAME}\n\
             id author {ENGINE_AUTHOR}\n\
             option name UCI_Elo type spin default 400 min 0 max 3000\n\
             option name Depth type spin default {} min 1 max 8\n\
             uciok\n",
            self.search.max_depth()
        )
    }

    fn handle_position(&mut self, args: &[&str]) -> Result<()> {
        let moves_at = args.iter().position(|&arg| arg == "moves");
        let (setup, moves) = match moves_at {
            Some(index) => (&args[..index], &args[index + 1..]),
            None => (args, &args[args.len()..]),
        };

        let mut board = match setup.split_first() {
            Some((&"startpos", _)) => Board::new(),
            Some((&"fen", fen)) => Board::from_fen(&fen.join(" "))?,
            _ => bail!("expected 'startpos' or 'fen'"),
        };

        for text in moves {
            let mv: Move = text.parse()?;
            board.make_move(&mv)?;
        }

        self.board = board;
        Ok(())
    }

    fn handle_go(&mut self, args: &[&str]) -> Result<String> {
        let depth = match args {
            ["depth", value, ..] => value.parse::<u32>().context("bad depth")?,
            _ => self.search.max_depth(),
        };

        let mut board = self.board.clone();
        Ok(match self.search.find_best_move_at_depth(&mut board, depth) {
            Some(mv) => format!("bestmove {mv}\n"),
            None => "bestmove (none)\n".to_string(),
        })
    }

    fn handle_setoption(&mut self, args: &[&str]) -> Result<()> {
        let (name, value) = match args {
            ["name", name, "value", value] => (*name, *value),
            _ => bail!("expected 'name <option> value <value>'"),
        };
        let value: u32 = value.parse().with_context(|| format!("bad value for {name}"))?;

        match name {
            "UCI_Elo" => {
                self.search.set_depth_for_rating(value);
            }
            "Depth" => self.search.set_max_depth(value),
            _ => bail!("unknown option {name}"),
        }
        Ok(())
    }

    fn handle_analyze(&mut self, args: &[&str]) -> Result<String> {
        let mv = parse_single_move(args)?;
        let result = self.search.analyze_move(&self.board, &mv);
        let best = result
            .best_move
            .map_or_else(|| "(none)".to_string(), |mv| mv.to_string());

        Ok(format!(
            "analysis {} best {} drop {} change {}\nexplanation {}\n",
            result.classification, best, result.score_drop, result.eval_change, result.explanation
        ))
    }

    fn handle_play(&mut self, args: &[&str]) -> Result<String> {
        let mut response = self.handle_analyze(args)?;
        let mv = parse_single_move(args)?;
        if self.board.make_move(&mv).is_ok() {
            let state = self.board.game_state();
            if state.is_over() {
                response.push_str(&format!("gameover {state}\n"));
            }
        }
        Ok(response)
    }
}

fn parse_single_move(args: &[&str]) -> Result<Move> {
    match args {
        [text] => Ok(text.parse()?),
        _ => Err(anyhow!("expected exactly one move")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> UciHandler {
        UciHandler::new(Search::new().with_seed(5))
    }

    #[test]
    fn test_handshake() {
        let mut uci = handler();
        let response = uci.handle_command("uci").unwrap();
        assert!(response.starts_with("id name Salmon Analyst\n"));
        assert!(response.contains(&format!("id author {}\n", env!("CARGO_PKG_AUTHORS"))));
        assert!(response.contains("option name UCI_Elo"));
        assert!(response.ends_with("uciok\n"));
        assert_eq!(uci.handle_command("isready").unwrap(), "readyok\n");
        assert_eq!(uci.handle_command("").unwrap(), "");
    }

    #[test]
    fn test_position_startpos_with_moves() {
        let mut uci = handler();
        uci.handle_command("position startpos moves e2e4 e7e5 g1f3").unwrap();
        assert_eq!(
            uci.board().to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2"
        );
        assert_eq!(uci.board().history_len(), 3);
    }

    #[test]
    fn test_position_fen() {
        let mut uci = handler();
        uci.handle_command("position fen 6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1 moves a1a8")
            .unwrap();
        assert!(uci.board().is_checkmate());
    }

    #[test]
    fn test_bad_position_keeps_board() {
        let mut uci = handler();
        uci.handle_command("position startpos moves e2e4").unwrap();
        let before = uci.board().to_fen();
        assert!(uci.handle_command("position startpos moves e2e5").is_err());
        assert!(uci.handle_command("position fen nonsense").is_err());
        assert!(uci.handle_command("position").is_err());
        assert_eq!(uci.board().to_fen(), before);
    }

    #[test]
    fn test_go_finds_mate() {
        let mut uci = handler();
        uci.handle_command("position fen 6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1")
            .unwrap();
        assert_eq!(uci.handle_command("go depth 2").unwrap(), "bestmove a1a8\n");
        assert_eq!(uci.handle_command("go").unwrap(), "bestmove a1a8\n");
    }

    #[test]
    fn test_go_without_moves() {
        let mut uci = handler();
        uci.handle_command("position startpos moves f2f3 e7e5 g2g4 d8h4")
            .unwrap();
        assert_eq!(uci.handle_command("go").unwrap(), "bestmove (none)\n");
    }

    #[test]
    fn test_setoption() {
        let mut uci = handler();
        uci.handle_command("setoption name UCI_Elo value 1200").unwrap();
        assert_eq!(uci.search.max_depth(), 4);
        uci.handle_command("setoption name Depth value 3").unwrap();
        assert_eq!(uci.search.max_depth(), 3);
        assert!(uci.handle_command("setoption name Hash value 16").is_err());
        assert!(uci.handle_command("setoption name Depth value many").is_err());
    }

    #[test]
    fn test_analyze_and_play() {
        let mut uci = handler();
        uci.handle_command("position startpos moves e2e4 d7d5 d1g4").unwrap();

        let response = uci.handle_command("analyze a7a6").unwrap();
        assert!(response.starts_with("analysis blunder best c8g4 drop "), "{response}");
        assert!(response.contains("explanation The best move was Bxg4"));
        assert_eq!(uci.board().history_len(), 3);

        let response = uci.handle_command("play c8g4").unwrap();
        assert!(response.starts_with("analysis best-move best c8g4 "), "{response}");
        assert_eq!(uci.board().history_len(), 4);

        uci.handle_command("undo").unwrap();
        assert_eq!(uci.board().history_len(), 3);
    }

    #[test]
    fn test_play_reports_game_over() {
        let mut uci = handler();
        uci.handle_command("position startpos moves f2f3 e7e5 g2g4").unwrap();
        let response = uci.handle_command("play d8h4").unwrap();
        assert!(response.ends_with("gameover checkmate, black wins\n"), "{response}");
    }

    #[test]
    fn test_illegal_analysis() {
        let mut uci = handler();
        let response = uci.handle_command("analyze e2e5").unwrap();
        assert_eq!(
            response,
            "analysis illegal-move best (none) drop 0 change 0\nexplanation illegal move\n"
        );
        assert!(uci.handle_command("analyze").is_err());
    }

    #[test]
    fn test_eval_and_display() {
        let mut uci = handler();
        assert_eq!(uci.handle_command("eval").unwrap(), "eval 0\n");
        let response = uci.handle_command("d").unwrap();
        assert!(response.starts_with("r n b q k b n r\n"));
        assert!(response.ends_with("fen rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1\n"));
    }

    #[test]
    fn test_unknown_command() {
        let mut uci = handler();
        assert!(uci.handle_command("fly").is_err());
        uci.handle_command("ucinewgame").unwrap();
        assert_eq!(uci.board().history_len(), 0);
    }
}
