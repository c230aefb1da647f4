use std::path::PathBuf;

use serde::Serialize;
use towerblocks_ai::{Candidate, Decision, evaluate_candidates, select_best};
use towerblocks_engine::{BitBoard, Piece, PieceKind, Playfield};

use crate::{
    logging,
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// ASCII board file: `#` filled, `.` empty, 10 cells per row, floor-aligned
    board_file: PathBuf,
    /// Falling shape (I, O, S, Z, J, L or T)
    #[clap(long, value_parser = parse_piece_kind)]
    piece: PieceKind,
    /// Also print every scored candidate in search order
    #[clap(long)]
    all: bool,
}

#[derive(Debug, Serialize)]
struct EvaluationReport {
    /// The falling shape at its spawn position, as `kind#rotation@x,y`.
    piece: Piece,
    decision: Option<Decision>,
    fitness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidates: Option<Vec<Candidate>>,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg {
        board_file,
        piece,
        all,
    } = arg;

    logging::init_stderr()?;
    let grid = util::read_board_file(board_file)?;
    let report = evaluate(grid, *piece, *all);
    Output::stdout().write_json(&report)
}

fn evaluate(grid: BitBoard, kind: PieceKind, all: bool) -> EvaluationReport {
    let piece = Piece::new(kind);
    let board = Playfield::from_parts(grid, piece);
    let candidates = evaluate_candidates(&board);
    let best = select_best(&candidates);
    EvaluationReport {
        piece,
        decision: best.map(Candidate::decision),
        fitness: best.map(|candidate| candidate.fitness),
        candidates: all.then(|| candidates.to_vec()),
    }
}

fn parse_piece_kind(s: &str) -> Result<PieceKind, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => PieceKind::from_char(c)
            .ok_or_else(|| format!("unknown piece `{s}`, expected one of IOSZJLT")),
        _ => Err(format!("expected a single piece letter, got `{s}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_piece_kind() {
        let test_cases = [
            ("I", Some(PieceKind::I)),
            ("t", Some(PieceKind::T)),
            ("L", Some(PieceKind::L)),
            ("X", None),
            ("", None),
            ("IO", None),
        ];
        for (input, expected) in test_cases {
            assert_eq!(parse_piece_kind(input).ok(), expected, "{input:?}");
        }
    }

    #[test]
    fn test_evaluate_line_completion() {
        let grid = BitBoard::from_ascii("#########.");
        let report = evaluate(grid, PieceKind::I, false);
        assert_eq!(
            report.decision,
            Some(Decision {
                rotation: 1,
                column: 9
            })
        );
        assert!(report.candidates.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["piece"], "I#0@5,0");
        assert_eq!(json["decision"]["column"], 9);
        assert!(json.get("candidates").is_none());
    }

    #[test]
    fn test_evaluate_all_lists_candidates() {
        let report = evaluate(BitBoard::INITIAL, PieceKind::O, true);
        let candidates = report.candidates.unwrap();
        assert_eq!(candidates.len(), 36);
        assert_eq!(candidates[0].decision(), report.decision.unwrap());
    }

    #[test]
    fn test_evaluate_tall_stack() {
        let mut art = String::new();
        for _ in 0..20 {
            art.push_str("#########.\n");
        }
        let report = evaluate(BitBoard::from_ascii(&art), PieceKind::T, false);
        assert!(report.decision.is_some());
        assert!(report.fitness.is_some());
    }
}
