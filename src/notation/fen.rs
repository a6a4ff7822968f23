//! Forsyth-Edwards Notation: the compact six-field text form of a position.
//!
//! Field-by-field validation is grounded in `original_source/chess/fen.py`'s
//! `FENParser`, including its rank-index convention (FEN's first rank is
//! rank 8, so it maps to the highest internal rank index) and its per-field
//! error granularity, reflected here as one [`FenError`] variant per field.
//!
//! FEN names the en-passant target as the square *behind* the pawn that just
//! double-pushed; this crate's internal representation (see `model::Move`
//! and `state::GameState`) instead stores that pawn's own landing square, so
//! this module is the one place the two are converted between.

use crate::board::Board;
use crate::error::{FenError, Result};
use crate::model::{CastlingRights, Color, File, Piece, Rank, Square};
use crate::notation::squares::parse_square;
use crate::state::GameState;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub fn parse(fen: &str) -> Result<(Board, GameState)> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(FenError::FieldCount(fields.len()).into());
    }

    let board = parse_piece_placement(fields[0])?;
    let active_color = parse_active_color(fields[1])?;
    let castling_rights = parse_castling(fields[2])?;
    let en_passant_target = parse_en_passant(fields[3])?;
    let halfmove_clock = parse_halfmove(fields[4])?;
    let fullmove_number = parse_fullmove(fields[5])?;

    let mut state = GameState::bare();
    state.active_color = active_color;
    state.castling_rights = castling_rights;
    state.en_passant_target = en_passant_target;
    state.halfmove_clock = halfmove_clock;
    state.fullmove_number = fullmove_number;

    Ok((board, state))
}

fn parse_piece_placement(placement: &str) -> Result<Board> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::RankCount(ranks.len()).into());
    }

    let mut board = Board::empty();
    for (fen_rank_idx, rank_text) in ranks.iter().enumerate() {
        // FEN lists rank 8 first; internal rank index counts up from rank 1.
        let rank = Rank::from_u8(7 - fen_rank_idx as u8);
        let mut file_ix: u32 = 0;
        for c in rank_text.chars() {
            if let Some(skip) = c.to_digit(10) {
                if !(1..=8).contains(&skip) {
                    return Err(FenError::RankWidth { rank: rank.ix() as u8 + 1, sum: file_ix + skip }.into());
                }
                file_ix += skip;
            } else {
                let piece = Piece::from_fen_letter(c).ok_or(FenError::BadPieceChar(c))?;
                if file_ix >= 8 {
                    return Err(FenError::RankWidth { rank: rank.ix() as u8 + 1, sum: file_ix + 1 }.into());
                }
                let square = Square::from_file_rank(File::from_u8(file_ix as u8), rank);
                board.set(square, Some(piece));
                file_ix += 1;
            }
        }
        if file_ix != 8 {
            return Err(FenError::RankWidth { rank: rank.ix() as u8 + 1, sum: file_ix }.into());
        }
    }

    Ok(board)
}

fn parse_active_color(text: &str) -> Result<Color> {
    match text {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        other => Err(FenError::BadActiveColor(other.to_string()).into()),
    }
}

fn parse_castling(text: &str) -> Result<CastlingRights> {
    if text == "-" {
        return Ok(CastlingRights::NONE);
    }
    if text.is_empty() || text.len() > 4 {
        return Err(FenError::BadCastling(text.to_string()).into());
    }
    let mut rights = CastlingRights::NONE;
    for c in text.chars() {
        match c {
            'K' => rights.white_kingside = true,
            'Q' => rights.white_queenside = true,
            'k' => rights.black_kingside = true,
            'q' => rights.black_queenside = true,
            _ => return Err(FenError::BadCastling(text.to_string()).into()),
        }
    }
    Ok(rights)
}

fn parse_en_passant(text: &str) -> Result<Option<Square>> {
    if text == "-" {
        return Ok(None);
    }
    let behind = parse_square(text).ok_or_else(|| FenError::BadEnPassant(text.to_string()))?;
    let pawn_square = match behind.rank() {
        Rank::_3 => Square::from_file_rank(behind.file(), Rank::_4),
        Rank::_6 => Square::from_file_rank(behind.file(), Rank::_5),
        _ => return Err(FenError::BadEnPassant(text.to_string()).into()),
    };
    Ok(Some(pawn_square))
}

fn parse_halfmove(text: &str) -> Result<u32> {
    text.parse::<u32>().map_err(|_| FenError::BadHalfmove(text.to_string()).into())
}

fn parse_fullmove(text: &str) -> Result<u32> {
    let n: u32 = text.parse().map_err(|_| FenError::BadFullmove(text.to_string()))?;
    if n == 0 {
        return Err(FenError::BadFullmove(text.to_string()).into());
    }
    Ok(n)
}

pub fn to_fen(board: &Board, state: &GameState) -> String {
    let mut out = String::new();

    for fen_rank_idx in 0..8u8 {
        let rank = Rank::from_u8(7 - fen_rank_idx);
        let mut empty_run = 0u32;
        for file_ix in 0..8u8 {
            let square = Square::from_file_rank(File::from_u8(file_ix), rank);
            match board.get(square) {
                None => empty_run += 1,
                Some(piece) => {
                    if empty_run > 0 {
                        out.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    out.push(piece.fen_letter());
                }
            }
        }
        if empty_run > 0 {
            out.push_str(&empty_run.to_string());
        }
        if fen_rank_idx != 7 {
            out.push('/');
        }
    }

    out.push(' ');
    out.push(match state.active_color {
        Color::White => 'w',
        Color::Black => 'b',
    });

    out.push(' ');
    let rights = state.castling_rights;
    if !rights.any() {
        out.push('-');
    } else {
        if rights.white_kingside {
            out.push('K');
        }
        if rights.white_queenside {
            out.push('Q');
        }
        if rights.black_kingside {
            out.push('k');
        }
        if rights.black_queenside {
            out.push('q');
        }
    }

    out.push(' ');
    match state.en_passant_target {
        // The board-level representation stores en passant as the pawn's own
        // landing square; FEN names the square behind it instead.
        Some(pawn_square) => {
            let behind_rank = match pawn_square.rank() {
                Rank::_4 => Rank::_3,
                Rank::_5 => Rank::_6,
                other => other,
            };
            let target = Square::from_file_rank(pawn_square.file(), behind_rank);
            out.push_str(&target.to_string());
        }
        None => out.push('-'),
    }

    out.push(' ');
    out.push_str(&state.halfmove_clock.to_string());
    out.push(' ');
    out.push_str(&state.fullmove_number.to_string());

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_fen_round_trips() {
        let (board, state) = parse(STARTING_FEN).unwrap();
        assert_eq!(board, Board::startpos());
        assert_eq!(to_fen(&board, &state), STARTING_FEN);
    }

    #[test]
    fn rejects_wrong_field_count() {
        let err = parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -").unwrap_err();
        assert!(matches!(err, crate::error::ChessError::Fen(FenError::FieldCount(5))));
    }

    #[test]
    fn rejects_short_rank() {
        let err = parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap_err();
        assert!(matches!(err, crate::error::ChessError::Fen(FenError::RankWidth { .. })));
    }

    #[test]
    fn en_passant_square_converts_to_pawn_square() {
        let fen = "rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3";
        let (_, state) = parse(fen).unwrap();
        assert_eq!(state.en_passant_target, Some(Square::d5));
    }
}
