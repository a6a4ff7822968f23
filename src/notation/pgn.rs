//! Portable Game Notation: tag pairs plus movetext.
//!
//! Grounded directly in `original_source/chess/pgn.py`'s `PGNParser` for tag
//! parsing and the movetext preprocessing pipeline (strip comments, strip
//! nested variations by depth-counting, strip annotations and NAGs, strip
//! move numbers, extract the result marker, tokenize, normalize castling)
//! and in `pgn_loader.py`'s `PGNLoader` for replaying the resulting SAN list
//! against the rules engine.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::board::Board;
use crate::error::{ChessError, PgnError, Result};
use crate::movegen;
use crate::notation::{fen, san};
use crate::state::GameState;

/// The seven-tag-roster fields plus any extra tags, and the SAN move list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnGame {
    pub event: String,
    pub site: String,
    pub date: String,
    pub round: String,
    pub white: String,
    pub black: String,
    pub result: String,
    pub extra_tags: IndexMap<String, String>,
    pub moves: Vec<String>,
    pub fen: Option<String>,
}

impl Default for PgnGame {
    fn default() -> Self {
        Self {
            event: "?".to_string(),
            site: "?".to_string(),
            date: "????.??.??".to_string(),
            round: "?".to_string(),
            white: "?".to_string(),
            black: "?".to_string(),
            result: "*".to_string(),
            extra_tags: IndexMap::new(),
            moves: Vec::new(),
            fen: None,
        }
    }
}

fn tag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^\[(\w+)\s+"([^"]*)"\]$"#).unwrap())
}

fn comment_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[^}]*\}").unwrap())
}

fn annotation_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[!?]+").unwrap())
}

fn nag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\d+").unwrap())
}

fn move_number_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+\.+").unwrap())
}

fn result_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"1-0|0-1|1/2-1/2|\*").unwrap())
}

pub fn parse(pgn: &str) -> Result<PgnGame> {
    if pgn.trim().is_empty() {
        return Err(PgnError::Empty.into());
    }

    let mut game = PgnGame::default();
    let mut movetext_lines = Vec::new();

    for line in pgn.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(caps) = tag_pattern().captures(line) {
            apply_tag(&mut game, &caps[1], &caps[2]);
        } else {
            movetext_lines.push(line);
        }
    }

    let movetext = movetext_lines.join(" ");
    game.moves = parse_movetext(&movetext);

    if game.result == "*" {
        if let Some(m) = result_pattern().find(&movetext) {
            game.result = m.as_str().to_string();
        }
    }

    Ok(game)
}

fn apply_tag(game: &mut PgnGame, name: &str, value: &str) {
    match name {
        "Event" => game.event = value.to_string(),
        "Site" => game.site = value.to_string(),
        "Date" => game.date = value.to_string(),
        "Round" => game.round = value.to_string(),
        "White" => game.white = value.to_string(),
        "Black" => game.black = value.to_string(),
        "Result" => game.result = value.to_string(),
        "FEN" => game.fen = Some(value.to_string()),
        other => {
            game.extra_tags.insert(other.to_string(), value.to_string());
        }
    }
}

/// Reduce raw movetext down to a bare list of SAN tokens, in the exact
/// order `original_source` strips things: comments, then nested
/// variations (depth-counted, not regex, because of nesting), then
/// annotation glyphs, then NAGs, then move numbers, then the result
/// marker, before finally tokenizing on whitespace.
pub(crate) fn parse_movetext(movetext: &str) -> Vec<String> {
    let text = comment_pattern().replace_all(movetext, "");

    let mut without_variations = String::with_capacity(text.len());
    let mut depth = 0i32;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ if depth == 0 => without_variations.push(c),
            _ => {}
        }
    }

    let text = annotation_pattern().replace_all(&without_variations, "");
    let text = nag_pattern().replace_all(&text, "");
    let text = move_number_pattern().replace_all(&text, "");
    let text = result_pattern().replace_all(&text, "");

    text.split_whitespace()
        .filter_map(|token| {
            let token = token.trim_matches('.');
            if token.is_empty() || !is_valid_san_token(token) {
                return None;
            }
            Some(match token {
                "0-0-0" => "O-O-O".to_string(),
                "0-0" => "O-O".to_string(),
                other => other.to_string(),
            })
        })
        .collect()
}

fn is_valid_san_token(token: &str) -> bool {
    if matches!(token, "O-O" | "O-O-O" | "0-0" | "0-0-0") {
        return true;
    }
    let stripped = token.trim_end_matches(['+', '#']);
    if stripped.is_empty() {
        return false;
    }
    let has_square = stripped
        .as_bytes()
        .windows(2)
        .any(|w| w[0].is_ascii_lowercase() && (b'a'..=b'h').contains(&w[0]) && (b'1'..=b'8').contains(&w[1]));
    if !has_square {
        return false;
    }
    matches!(stripped.chars().next(), Some(c) if "KQRBNabcdefgh".contains(c))
}

/// Replay a parsed PGN game against the rules engine, returning the
/// resulting board and state. Starts from the `FEN` tag if present,
/// otherwise the standard starting position.
pub fn load(game: &PgnGame) -> Result<(Board, GameState)> {
    let (mut board, mut state) = match &game.fen {
        Some(fen_str) => fen::parse(fen_str).map_err(|e| match e {
            ChessError::Fen(fen_err) => PgnError::BadFenTag(fen_err).into(),
            other => other,
        })?,
        None => (Board::startpos(), GameState::startpos()),
    };

    for (index, san_text) in game.moves.iter().enumerate() {
        let mv = san::resolve_san(san_text, &board, &state).map_err(|e| PgnError::MoveFailed {
            index,
            san: san_text.clone(),
            source: Box::new(e),
        })?;
        crate::executor::execute(&mut board, &mut state, mv.from, mv.to, mv.promoted_to.map(promotion_kind))
            .map_err(|e| PgnError::MoveFailed { index, san: san_text.clone(), source: Box::new(e) })?;
    }

    Ok((board, state))
}

fn promotion_kind(kind: crate::model::PieceKind) -> crate::model::PromotionKind {
    match kind {
        crate::model::PieceKind::Knight => crate::model::PromotionKind::Knight,
        crate::model::PieceKind::Bishop => crate::model::PromotionKind::Bishop,
        crate::model::PieceKind::Rook => crate::model::PromotionKind::Rook,
        crate::model::PieceKind::Queen => crate::model::PromotionKind::Queen,
        other => unreachable!("non-promotable piece kind {other:?} stored as promoted_to"),
    }
}

/// Render a game's move history back out to PGN tag pairs plus movetext.
pub fn to_pgn(game: &PgnGame) -> String {
    let mut out = String::new();
    out.push_str(&format!("[Event \"{}\"]\n", game.event));
    out.push_str(&format!("[Site \"{}\"]\n", game.site));
    out.push_str(&format!("[Date \"{}\"]\n", game.date));
    out.push_str(&format!("[Round \"{}\"]\n", game.round));
    out.push_str(&format!("[White \"{}\"]\n", game.white));
    out.push_str(&format!("[Black \"{}\"]\n", game.black));
    out.push_str(&format!("[Result \"{}\"]\n", game.result));
    for (key, value) in &game.extra_tags {
        out.push_str(&format!("[{key} \"{value}\"]\n"));
    }
    out.push('\n');

    for (i, mv) in game.moves.iter().enumerate() {
        if i % 2 == 0 {
            out.push_str(&format!("{}. ", i / 2 + 1));
        }
        out.push_str(mv);
        out.push(' ');
    }
    out.push_str(&game.result);
    out
}

/// Build a [`PgnGame`] from a live position and the SAN move list that
/// reached it, deriving the `Result` tag from the current position rather
/// than trusting a caller-supplied one: checkmate gives the side to move's
/// opponent the win, stalemate is a draw, anything else is an open `"*"`.
pub fn generate_pgn(board: &Board, state: &GameState, moves: &[String]) -> Result<PgnGame> {
    let to_move = state.active_color;
    let result = if movegen::is_checkmate(board, state, to_move)? {
        match to_move {
            crate::model::Color::White => "0-1",
            crate::model::Color::Black => "1-0",
        }
    } else if movegen::is_stalemate(board, state, to_move)? {
        "1/2-1/2"
    } else {
        "*"
    };

    Ok(PgnGame { result: result.to_string(), moves: moves.to_vec(), ..PgnGame::default() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Square;

    #[test]
    fn parses_tags_and_moves() {
        let pgn = "[Event \"Test\"]\n[White \"Alice\"]\n[Black \"Bob\"]\n\n1. e4 e5 2. Nf3 Nc6 *";
        let game = parse(pgn).unwrap();
        assert_eq!(game.event, "Test");
        assert_eq!(game.white, "Alice");
        assert_eq!(game.moves, vec!["e4", "e5", "Nf3", "Nc6"]);
    }

    #[test]
    fn strips_comments_and_variations() {
        let pgn = "1. e4 {a good move} e5 (1... c5 2. Nf3) 2. Nf3 *";
        let game = parse(pgn).unwrap();
        assert_eq!(game.moves, vec!["e4", "e5", "Nf3"]);
    }

    #[test]
    fn normalizes_numeric_castling() {
        let pgn = "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6 4. O-O Be7 5. 0-0-0 *";
        let game = parse(pgn).unwrap();
        assert!(game.moves.contains(&"O-O".to_string()));
        assert!(game.moves.contains(&"O-O-O".to_string()));
    }

    #[test]
    fn rejects_empty_pgn() {
        assert!(matches!(parse("   "), Err(ChessError::Pgn(PgnError::Empty))));
    }

    #[test]
    fn loads_a_short_game() {
        let pgn = "1. e4 e5 2. Nf3 Nc6 *";
        let game = parse(pgn).unwrap();
        let (board, state) = load(&game).unwrap();
        assert_eq!(state.move_count(), 4);
        assert!(board.get(Square::e4).is_some());
    }

    #[test]
    fn generate_pgn_derives_checkmate_result_from_the_position() {
        let pgn = "1. e4 e5 2. Bc4 Bc5 3. Qh5 Nf6 4. Qxf7#";
        let game = parse(pgn).unwrap();
        let (board, state) = load(&game).unwrap();
        let generated = generate_pgn(&board, &state, &game.moves).unwrap();
        assert_eq!(generated.result, "1-0", "black is checkmated, white wins");
        assert_eq!(generated.moves, game.moves);
    }

    #[test]
    fn generate_pgn_leaves_an_open_game_unresolved() {
        let pgn = "1. e4 e5 2. Nf3 Nc6 3. Bb5 *";
        let game = parse(pgn).unwrap();
        let (board, state) = load(&game).unwrap();
        let generated = generate_pgn(&board, &state, &game.moves).unwrap();
        assert_eq!(generated.result, "*");
    }
}
