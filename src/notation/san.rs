//! Standard Algebraic Notation: generating it from an executed move, and
//! resolving it back to a legal move.
//!
//! Generation (disambiguation rules, check/mate suffix) is grounded in
//! `original_source/chess/notation.py`'s `NotationGenerator`. Resolution is
//! grounded in `original_source/chess/pgn_loader.py`'s `SAN_PATTERN` regex
//! and its candidate-narrowing logic in `_find_source_square`.

use std::sync::OnceLock;

use regex::Regex;

use crate::board::Board;
use crate::error::{ChessError, Result};
use crate::model::{CastlingSide, Move, PieceKind, PromotionKind, Square};
use crate::movegen;
use crate::notation::squares::parse_square;
use crate::state::GameState;

fn san_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([KQRBN])?([a-h])?([1-8])?(x)?([a-h][1-8])(?:=([QRBN]))?[+#]?$").unwrap()
    })
}

/// Render `mv` (already executed) as SAN, given the position as it stood
/// immediately before the move.
pub fn move_to_san(mv: &Move, board_before: &Board, state_before: &GameState) -> Result<String> {
    let mut san = String::new();

    if mv.is_castling {
        san.push_str(if mv.to.file() == crate::model::File::g_ { "O-O" } else { "O-O-O" });
    } else if mv.piece.kind == PieceKind::Pawn {
        if mv.captured.is_some() {
            san.push_str(&mv.from.file().to_string());
            san.push('x');
        }
        san.push_str(&mv.to.to_string());
        if let Some(promoted) = mv.promoted_to {
            san.push('=');
            san.push(promoted.letter());
        }
    } else {
        san.push(mv.piece.kind.letter());
        san.push_str(&disambiguation(mv, board_before, state_before)?);
        if mv.captured.is_some() {
            san.push('x');
        }
        san.push_str(&mv.to.to_string());
    }

    let (board_after, state_after) = crate::executor::simulate_after(board_before, state_before, mv);
    let opponent = mv.piece.color.opponent();
    if movegen::is_in_check(&board_after, opponent) {
        let has_reply = !movegen::legal_moves(&board_after, &state_after, opponent)?.is_empty();
        san.push(if has_reply { '+' } else { '#' });
    }

    Ok(san)
}

/// File-only, rank-only, or both-disambiguation suffix for a non-pawn,
/// non-castling move, per `notation.py`'s `_get_disambiguation`.
fn disambiguation(mv: &Move, board_before: &Board, state_before: &GameState) -> Result<String> {
    let siblings: Vec<Move> = movegen::legal_moves(board_before, state_before, mv.piece.color)?
        .into_iter()
        .filter(|other| {
            other.from != mv.from && other.piece.kind == mv.piece.kind && other.to == mv.to
        })
        .collect();

    if siblings.is_empty() {
        return Ok(String::new());
    }

    if !siblings.iter().any(|other| other.from.file() == mv.from.file()) {
        Ok(mv.from.file().to_string())
    } else if !siblings.iter().any(|other| other.from.rank() == mv.from.rank()) {
        Ok(mv.from.rank().to_string())
    } else {
        Ok(format!("{}{}", mv.from.file(), mv.from.rank()))
    }
}

struct ParsedSan {
    piece: PieceKind,
    disambig_file: Option<crate::model::File>,
    disambig_rank: Option<crate::model::Rank>,
    dest: Square,
    promotion: Option<PromotionKind>,
}

fn parse_san_token(san: &str) -> Result<ParsedSan> {
    let caps = san_regex()
        .captures(san)
        .ok_or_else(|| ChessError::BadSanSyntax(san.to_string()))?;

    let piece = match caps.get(1) {
        Some(m) => PieceKind::from_letter(m.as_str().chars().next().unwrap())
            .ok_or_else(|| ChessError::BadSanSyntax(san.to_string()))?,
        None => PieceKind::Pawn,
    };
    let disambig_file = caps.get(2).map(|m| {
        let c = m.as_str().chars().next().unwrap();
        crate::model::File::from_u8(c as u8 - b'a')
    });
    let disambig_rank = caps.get(3).map(|m| {
        let c = m.as_str().chars().next().unwrap();
        crate::model::Rank::from_u8(c as u8 - b'1')
    });
    let dest = caps
        .get(5)
        .and_then(|m| parse_square(m.as_str()))
        .ok_or_else(|| ChessError::BadSanSyntax(san.to_string()))?;
    let promotion = match caps.get(6) {
        Some(m) => Some(
            PromotionKind::from_letter(m.as_str().chars().next().unwrap())
                .ok_or_else(|| ChessError::BadSanSyntax(san.to_string()))?,
        ),
        None => None,
    };

    Ok(ParsedSan { piece, disambig_file, disambig_rank, dest, promotion })
}

fn is_castling_token(san: &str) -> Option<CastlingSide> {
    match san.trim_end_matches(['+', '#']) {
        "O-O" | "0-0" => Some(CastlingSide::Kingside),
        "O-O-O" | "0-0-0" => Some(CastlingSide::Queenside),
        _ => None,
    }
}

/// Resolve `san` against the legal moves available to the side to move,
/// erroring on unparseable text, no match, or more than one match.
pub fn resolve_san(san: &str, board: &Board, state: &GameState) -> Result<Move> {
    let color = state.active_color;
    let legal = movegen::legal_moves(board, state, color)?;

    if let Some(side) = is_castling_token(san) {
        return legal
            .into_iter()
            .find(|mv| {
                mv.is_castling
                    && match side {
                        CastlingSide::Kingside => mv.to.file() == crate::model::File::g_,
                        CastlingSide::Queenside => mv.to.file() == crate::model::File::c_,
                    }
            })
            .ok_or_else(|| ChessError::IllegalMove(san.to_string()));
    }

    let parsed = parse_san_token(san)?;

    let candidates: Vec<Move> = legal
        .into_iter()
        .filter(|mv| {
            mv.piece.kind == parsed.piece
                && mv.to == parsed.dest
                && parsed.disambig_file.map_or(true, |f| mv.from.file() == f)
                && parsed.disambig_rank.map_or(true, |r| mv.from.rank() == r)
        })
        .collect();

    if candidates.is_empty() {
        return Err(ChessError::IllegalMove(san.to_string()));
    }

    let matching_promotion: Vec<Move> = candidates
        .iter()
        .copied()
        .filter(|mv| mv.promoted_to == parsed.promotion.map(PieceKind::from))
        .collect();

    if matching_promotion.is_empty() {
        // Every candidate needs a promotion kind the SAN text didn't supply.
        return Err(ChessError::BadSanSyntax(san.to_string()));
    }

    if matching_promotion.len() > 1 {
        let squares: Vec<Square> = matching_promotion.iter().map(|mv| mv.from).collect();
        return Err(ChessError::AmbiguousMove(san.to_string(), squares));
    }

    Ok(matching_promotion[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::executor;

    #[test]
    fn generates_simple_pawn_push() {
        let mut board = Board::startpos();
        let mut state = GameState::startpos();
        let board_before = board.clone();
        let state_before = state.clone();
        let mv = executor::execute(&mut board, &mut state, Square::e2, Square::e4, None).unwrap();
        assert_eq!(move_to_san(&mv, &board_before, &state_before).unwrap(), "e4");
    }

    #[test]
    fn resolves_simple_pawn_push() {
        let board = Board::startpos();
        let state = GameState::startpos();
        let mv = resolve_san("e4", &board, &state).unwrap();
        assert_eq!((mv.from, mv.to), (Square::e2, Square::e4));
    }

    #[test]
    fn disambiguates_two_knights_on_same_destination() {
        let mut board = Board::empty();
        board.set(Square::e1, Some(crate::model::Piece::new(crate::model::Color::White, PieceKind::King)));
        board.set(Square::e8, Some(crate::model::Piece::new(crate::model::Color::Black, PieceKind::King)));
        board.set(Square::b1, Some(crate::model::Piece::new(crate::model::Color::White, PieceKind::Knight)));
        board.set(Square::f1, Some(crate::model::Piece::new(crate::model::Color::White, PieceKind::Knight)));
        let state = GameState::bare();
        let mv = resolve_san("Nd2", &board, &state).unwrap();
        assert_eq!(mv.from, Square::b1);

        let board_before = board.clone();
        let san = move_to_san(&mv, &board_before, &state).unwrap();
        assert_eq!(san, "Nbd2");
    }

    #[test]
    fn rejects_garbage_san() {
        let board = Board::startpos();
        let state = GameState::startpos();
        assert!(matches!(resolve_san("zz9", &board, &state), Err(ChessError::BadSanSyntax(_))));
    }
}
