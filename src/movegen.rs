//! Move generation: pseudo-legal candidates, king-safety filtering, attack
//! detection, and castling.
//!
//! The attack detector is grounded in the teacher's own description of ray
//! casting from `src/model.rs`'s `CompassRose` doc comment (squares reached
//! by walking a direction vector); here it's run in reverse from the target
//! square outward, checking each piece kind's own offsets against what
//! actually sits at the far end -- one algorithm serves every sliding and
//! leaping piece. Castling's validation order (rights, king's home square,
//! empty-between squares, a present rook else a fatal state error, not
//! currently in check, not passing through or landing on an attacked
//! square) follows `original_source/chess/move_generator.py`'s
//! `_get_castling_moves` exactly, including appending castling only after
//! the check-safety filter has already run (`original_source`'s
//! `get_legal_moves` calls `_get_castling_moves` as a separate step).

use crate::board::Board;
use crate::error::{ChessError, Result};
use crate::model::{
    CastlingRights, CastlingRules, CastlingSide, Color, Move, Piece, PieceKind, PreMoveState,
    PromotionKind, Square,
};
use crate::state::GameState;

const PROMOTION_KINDS: [PromotionKind; 4] = [
    PromotionKind::Queen,
    PromotionKind::Rook,
    PromotionKind::Bishop,
    PromotionKind::Knight,
];

/// Is `square` attacked by any piece of `by_color` on `board`?
pub fn is_attacked(board: &Board, square: Square, by_color: Color) -> bool {
    // Leapers and sliders: walk each offset of the piece kind we're probing
    // for, from the target square outward, and see if the attacker sits at
    // the far end (one square away for leapers, any distance for sliders,
    // stopping at the first occupied square either way).
    for kind in [PieceKind::Knight, PieceKind::Bishop, PieceKind::Rook, PieceKind::Queen, PieceKind::King] {
        for &(df, dr) in kind.offsets() {
            if kind.is_sliding() {
                let mut cur = square;
                while let Some(next) = cur.offset(df, dr) {
                    match board.get(next) {
                        None => {
                            cur = next;
                            continue;
                        }
                        Some(piece) => {
                            if piece.color == by_color && piece.kind == kind {
                                return true;
                            }
                            break;
                        }
                    }
                }
            } else if let Some(next) = square.offset(df, dr) {
                if let Some(piece) = board.get(next) {
                    if piece.color == by_color && piece.kind == kind {
                        return true;
                    }
                }
            }
        }
    }

    // Pawns attack diagonally forward; reversed, a pawn attacking `square`
    // sits one rank behind it (relative to its own forward direction) on
    // either adjacent file.
    let behind = -by_color.pawn_direction();
    for df in [-1, 1] {
        if let Some(from) = square.offset(df, behind) {
            if let Some(piece) = board.get(from) {
                if piece.color == by_color && piece.kind == PieceKind::Pawn {
                    return true;
                }
            }
        }
    }

    false
}

pub fn is_in_check(board: &Board, color: Color) -> bool {
    match board.find_king(color) {
        Some(king_sq) => is_attacked(board, king_sq, color.opponent()),
        None => false,
    }
}

/// Apply a move's effects to a board. Shared by legal-move simulation and
/// by [`crate::executor`].
pub(crate) fn apply_move(board: &mut Board, mv: &Move) {
    board.set(mv.from, None);

    if mv.is_castling {
        if let (Some(rook_from), Some(rook_to)) = (mv.castling_rook_from, mv.castling_rook_to) {
            board.set(rook_from, None);
            board.set(rook_to, Some(Piece::new(mv.piece.color, PieceKind::Rook)));
        }
    }

    if mv.is_en_passant {
        if let Some((_, captured_sq)) = mv.captured {
            board.set(captured_sq, None);
        }
    }

    let placed = if mv.is_promotion {
        Piece::new(mv.piece.color, mv.promoted_to.expect("promotion move without a kind"))
    } else {
        mv.piece
    };
    board.set(mv.to, Some(placed));
}

/// Reverse a move's effects on a board. The exact inverse of [`apply_move`].
pub(crate) fn revert_move(board: &mut Board, mv: &Move) {
    board.set(mv.to, None);

    if mv.is_castling {
        if let (Some(rook_from), Some(rook_to)) = (mv.castling_rook_from, mv.castling_rook_to) {
            board.set(rook_to, None);
            board.set(rook_from, Some(Piece::new(mv.piece.color, PieceKind::Rook)));
        }
    }

    board.set(mv.from, Some(mv.piece));

    if let Some((captured_piece, captured_sq)) = mv.captured {
        board.set(captured_sq, Some(captured_piece));
    }
}

fn pre_state(state: &GameState) -> PreMoveState {
    PreMoveState {
        castling_rights: state.castling_rights,
        en_passant_target: state.en_passant_target,
        halfmove_clock: state.halfmove_clock,
        fullmove_number: state.fullmove_number,
    }
}

fn base_move(from: Square, to: Square, piece: Piece, state: &GameState) -> Move {
    Move {
        from,
        to,
        piece,
        captured: None,
        en_passant_target: None,
        is_en_passant: false,
        is_castling: false,
        castling_rook_from: None,
        castling_rook_to: None,
        is_promotion: false,
        promoted_to: None,
        pre_state: pre_state(state),
    }
}

/// Every move `color` could play ignoring whether it leaves its own king in
/// check. Castling is intentionally excluded here; see [`legal_moves`].
fn pseudo_legal_moves(board: &Board, state: &GameState, color: Color) -> Vec<Move> {
    let mut moves = Vec::new();
    for (from, piece) in board.iter().filter(|(_, p)| p.color == color) {
        if piece.kind == PieceKind::Pawn {
            generate_pawn_moves(board, state, from, piece, &mut moves);
        } else if piece.kind.is_sliding() {
            for &(df, dr) in piece.kind.offsets() {
                let mut cur = from;
                while let Some(next) = cur.offset(df, dr) {
                    match board.get(next) {
                        None => {
                            moves.push(base_move(from, next, piece, state));
                            cur = next;
                        }
                        Some(occupant) => {
                            if occupant.color != color {
                                let mut mv = base_move(from, next, piece, state);
                                mv.captured = Some((occupant, next));
                                moves.push(mv);
                            }
                            break;
                        }
                    }
                }
            }
        } else {
            for &(df, dr) in piece.kind.offsets() {
                if let Some(next) = from.offset(df, dr) {
                    match board.get(next) {
                        None => moves.push(base_move(from, next, piece, state)),
                        Some(occupant) if occupant.color != color => {
                            let mut mv = base_move(from, next, piece, state);
                            mv.captured = Some((occupant, next));
                            moves.push(mv);
                        }
                        _ => {}
                    }
                }
            }
        }
    }
    moves
}

fn generate_pawn_moves(board: &Board, state: &GameState, from: Square, piece: Piece, out: &mut Vec<Move>) {
    let color = piece.color;
    let dir = color.pawn_direction();
    let promotes = |sq: Square| sq.rank() == color.promotion_rank();

    let push_promotions = |to: Square, mv: Move, out: &mut Vec<Move>| {
        if promotes(to) {
            for kind in PROMOTION_KINDS {
                let mut promoted = mv;
                promoted.is_promotion = true;
                promoted.promoted_to = Some(kind);
                out.push(promoted);
            }
        } else {
            out.push(mv);
        }
    };

    if let Some(one) = from.offset(0, dir) {
        if board.get(one).is_none() {
            let mv = base_move(from, one, piece, state);
            push_promotions(one, mv, out);

            if from.rank() == color.pawn_home_rank() {
                if let Some(two) = from.offset(0, dir * 2) {
                    if board.get(two).is_none() {
                        let mut mv = base_move(from, two, piece, state);
                        mv.en_passant_target = Some(two);
                        out.push(mv);
                    }
                }
            }
        }
    }

    for df in [-1, 1] {
        let Some(to) = from.offset(df, dir) else { continue };
        if let Some(occupant) = board.get(to) {
            if occupant.color != color {
                let mut mv = base_move(from, to, piece, state);
                mv.captured = Some((occupant, to));
                push_promotions(to, mv, out);
            }
        } else {
            let captured_sq = Square::from_file_rank(to.file(), from.rank());
            if state.en_passant_target == Some(captured_sq) {
                if let Some(captured_piece) = board.get(captured_sq) {
                    let mut mv = base_move(from, to, piece, state);
                    mv.is_en_passant = true;
                    mv.captured = Some((captured_piece, captured_sq));
                    out.push(mv);
                }
            }
        }
    }
}

fn castling_moves(board: &Board, state: &GameState, color: Color) -> Result<Vec<Move>> {
    let rules = &CastlingRules::STANDARD;
    let mut moves = Vec::new();

    if is_in_check(board, color) {
        return Ok(moves);
    }

    for side in [CastlingSide::Kingside, CastlingSide::Queenside] {
        let has_right = match side {
            CastlingSide::Kingside => state.castling_rights.kingside(color),
            CastlingSide::Queenside => state.castling_rights.queenside(color),
        };
        if !has_right {
            continue;
        }

        let king_start = rules.king_start(color);
        let king_end = rules.king_end(color, side);
        let rook_start = rules.rook_start(color, side);
        let rook_end = rules.rook_end(color, side);

        match board.get(king_start) {
            Some(p) if p.color == color && p.kind == PieceKind::King => {}
            _ => continue,
        }

        let between = squares_between(king_start, rook_start);
        if between.iter().any(|&sq| board.get(sq).is_some()) {
            continue;
        }

        match board.get(rook_start) {
            Some(p) if p.color == color && p.kind == PieceKind::Rook => {}
            _ => {
                return Err(ChessError::InvalidState(color, rook_start));
            }
        }

        let king_path = squares_between_inclusive(king_start, king_end);
        if king_path.iter().any(|&sq| is_attacked(board, sq, color.opponent())) {
            continue;
        }

        let mut mv = base_move(
            king_start,
            king_end,
            Piece::new(color, PieceKind::King),
            state,
        );
        mv.is_castling = true;
        mv.castling_rook_from = Some(rook_start);
        mv.castling_rook_to = Some(rook_end);
        moves.push(mv);
    }

    Ok(moves)
}

/// The squares strictly between `a` and `b` on the same rank, exclusive.
fn squares_between(a: Square, b: Square) -> Vec<Square> {
    let rank = a.rank();
    let (lo, hi) = (a.file().ix().min(b.file().ix()), a.file().ix().max(b.file().ix()));
    ((lo + 1)..hi)
        .map(|f| Square::from_file_rank(crate::model::File::from_u8(f as u8), rank))
        .collect()
}

/// The squares from `a` to `b` inclusive, walking one step at a time toward `b`.
fn squares_between_inclusive(a: Square, b: Square) -> Vec<Square> {
    let rank = a.rank();
    let (lo, hi) = (a.file().ix().min(b.file().ix()), a.file().ix().max(b.file().ix()));
    (lo..=hi)
        .map(|f| Square::from_file_rank(crate::model::File::from_u8(f as u8), rank))
        .collect()
}

/// All moves `color` may legally play: pseudo-legal moves that don't leave
/// its own king in check, plus castling (checked separately and appended
/// after, matching `original_source`).
pub fn legal_moves(board: &Board, state: &GameState, color: Color) -> Result<Vec<Move>> {
    let mut legal = Vec::new();
    for mv in pseudo_legal_moves(board, state, color) {
        let mut sim = board.clone();
        apply_move(&mut sim, &mv);
        if !is_in_check(&sim, color) {
            legal.push(mv);
        }
    }
    legal.extend(castling_moves(board, state, color)?);
    Ok(legal)
}

pub fn legal_moves_from(board: &Board, state: &GameState, color: Color, from: Square) -> Result<Vec<Move>> {
    Ok(legal_moves(board, state, color)?
        .into_iter()
        .filter(|mv| mv.from == from)
        .collect())
}

pub fn is_checkmate(board: &Board, state: &GameState, color: Color) -> Result<bool> {
    Ok(is_in_check(board, color) && legal_moves(board, state, color)?.is_empty())
}

pub fn is_stalemate(board: &Board, state: &GameState, color: Color) -> Result<bool> {
    Ok(!is_in_check(board, color) && legal_moves(board, state, color)?.is_empty())
}
