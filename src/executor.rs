//! Applies legal moves to a board/state pair and supports full undo, redo,
//! and history-index jumps.
//!
//! Grounded in `original_source/chess/move_executor.py`'s `MoveExecutor`:
//! classify (castling, en passant, or normal), apply to the board, update
//! castling rights, then record. One deliberate correctness fix relative to
//! the original: `_update_castling_rights` there re-reads the captured piece
//! from the board *after* the move has already been applied, which means it
//! inspects the post-move occupant of the destination square rather than
//! whatever was actually captured. Here the captured piece and its original
//! square are read off the already-classified [`Move`] record, computed
//! before any board mutation, so a rook captured on its home corner reliably
//! clears the matching right. Likewise undo here restores castling rights,
//! the en-passant target, and both move clocks from the move's own
//! snapshot, rather than leaving them stale the way the original does.

use crate::board::Board;
use crate::error::{ChessError, Result};
use crate::model::{CastlingSide, Color, Move, Piece, PieceKind, PromotionKind, Square};
use crate::movegen::{self, legal_moves};
use crate::state::GameState;

#[cfg(feature = "logging")]
use log::debug;

/// Execute the legal move from `from` to `to`, choosing among `legal_moves`
/// candidates. `promotion` is required iff the move lands a pawn on the back
/// rank, and otherwise must be absent.
pub fn execute(
    board: &mut Board,
    state: &mut GameState,
    from: Square,
    to: Square,
    promotion: Option<PromotionKind>,
) -> Result<Move> {
    let color = state.active_color;
    let same_square: Vec<Move> = legal_moves(board, state, color)?
        .into_iter()
        .filter(|mv| mv.from == from && mv.to == to)
        .collect();

    if same_square.is_empty() {
        return Err(ChessError::IllegalMove(format!("{from}{to}")));
    }

    let mut chosen = if same_square[0].is_promotion {
        let want = PieceKind::from(promotion.ok_or(ChessError::PromotionRequired)?);
        same_square
            .into_iter()
            .find(|mv| mv.promoted_to == Some(want))
            .ok_or_else(|| ChessError::IllegalMove(format!("{from}{to}={want:?}")))?
    } else {
        same_square.into_iter().next().unwrap()
    };

    apply_and_record(board, state, &mut chosen);

    #[cfg(feature = "logging")]
    debug!("executed {:?} -> {:?} ({:?})", from, to, chosen.piece.kind);

    Ok(chosen)
}

fn apply_and_record(board: &mut Board, state: &mut GameState, mv: &mut Move) {
    movegen::apply_move(board, mv);
    advance_state(state, mv);
    state.push_executed(*mv);
}

/// Update every transient field `mv` affects, without touching history.
/// Shared by `execute`/`redo` and by [`simulate_after`].
fn advance_state(state: &mut GameState, mv: &Move) {
    update_castling_rights(state, mv);
    state.en_passant_target = mv.en_passant_target;
    state.halfmove_clock = if mv.resets_halfmove_clock() { 0 } else { state.halfmove_clock + 1 };
    if state.active_color == Color::Black {
        state.fullmove_number += 1;
    }
    state.active_color = state.active_color.opponent();
}

/// Compute the board/state that would result from playing `mv`, without
/// recording it anywhere. Used by SAN generation to detect check and mate.
pub(crate) fn simulate_after(board: &Board, state: &GameState, mv: &Move) -> (Board, GameState) {
    let mut sim_board = board.clone();
    let mut sim_state = state.clone();
    movegen::apply_move(&mut sim_board, mv);
    advance_state(&mut sim_state, mv);
    (sim_board, sim_state)
}

fn update_castling_rights(state: &mut GameState, mv: &Move) {
    use crate::model::CastlingRules;
    let rules = &CastlingRules::STANDARD;

    if mv.piece.kind == PieceKind::King {
        state.castling_rights.clear_color(mv.piece.color);
    }

    if mv.piece.kind == PieceKind::Rook {
        clear_right_if_rook_left_corner(state, rules, mv.piece.color, mv.from);
    }

    if let Some((captured, captured_sq)) = mv.captured {
        if captured.kind == PieceKind::Rook {
            clear_right_if_rook_left_corner(state, rules, captured.color, captured_sq);
        }
    }
}

fn clear_right_if_rook_left_corner(
    state: &mut GameState,
    rules: &crate::model::CastlingRules,
    color: Color,
    square: Square,
) {
    if square == rules.rook_start(color, CastlingSide::Kingside) {
        state.castling_rights.set_kingside(color, false);
    } else if square == rules.rook_start(color, CastlingSide::Queenside) {
        state.castling_rights.set_queenside(color, false);
    }
}

/// Undo the most recently executed move, restoring the board and every
/// piece of transient state from the move's own pre-move snapshot.
pub fn undo(board: &mut Board, state: &mut GameState) -> Result<Move> {
    let mv = state.pop_history().ok_or_else(|| ChessError::RangeError { requested: 0, max: 0 })?;
    movegen::revert_move(board, &mv);

    state.castling_rights = mv.pre_state.castling_rights;
    state.en_passant_target = mv.pre_state.en_passant_target;
    state.halfmove_clock = mv.pre_state.halfmove_clock;
    state.fullmove_number = mv.pre_state.fullmove_number;
    state.active_color = mv.piece.color;

    state.push_redo(mv);
    Ok(mv)
}

/// Redo the most recently undone move, exactly reapplying its recorded
/// effects (no reclassification, since the move is already fully formed).
pub fn redo(board: &mut Board, state: &mut GameState) -> Result<Move> {
    let mv = state.pop_redo().ok_or_else(|| ChessError::RangeError { requested: 0, max: 0 })?;
    movegen::apply_move(board, &mv);
    advance_state(state, &mv);
    state.push_history_raw(mv);
    Ok(mv)
}

/// Jump to an arbitrary point in history by undoing/redoing as needed.
/// `target_index` is the number of moves that should be in `history()`
/// afterward, i.e. `0` rewinds to the start of the game.
pub fn jump_to_history_index(board: &mut Board, state: &mut GameState, target_index: usize) -> Result<()> {
    let max = state.history().len() + state.redo_stack().len();
    if target_index > max {
        return Err(ChessError::RangeError { requested: target_index, max });
    }

    while state.history().len() > target_index {
        undo(board, state)?;
    }
    while state.history().len() < target_index {
        redo(board, state)?;
    }
    Ok(())
}

/// Whether a pawn moving from `from` to `to` would land on the back rank
/// and therefore require a promotion choice.
pub fn is_promotion_move(board: &Board, from: Square, to: Square) -> bool {
    matches!(board.get(from), Some(Piece { kind: PieceKind::Pawn, color }) if to.rank() == color.promotion_rank())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PromotionKind;

    #[test]
    fn execute_and_undo_roundtrips_startpos() {
        let mut board = Board::startpos();
        let mut state = GameState::startpos();
        let before = board.clone();

        execute(&mut board, &mut state, Square::e2, Square::e4, None).unwrap();
        assert_ne!(board, before);

        undo(&mut board, &mut state).unwrap();
        assert_eq!(board, before);
        assert_eq!(state.active_color, Color::White);
        assert_eq!(state.castling_rights, crate::model::CastlingRights::ALL);
        assert_eq!(state.en_passant_target, None);
        assert_eq!(state.halfmove_clock, 0);
        assert_eq!(state.fullmove_number, 1);
        assert!(state.can_redo());
        assert!(!state.can_undo());
    }

    #[test]
    fn undo_then_redo_is_identity() {
        let mut board = Board::startpos();
        let mut state = GameState::startpos();
        execute(&mut board, &mut state, Square::e2, Square::e4, None).unwrap();
        let after_move = board.clone();
        let state_after_move = state.clone();

        undo(&mut board, &mut state).unwrap();
        redo(&mut board, &mut state).unwrap();

        assert_eq!(board, after_move);
        assert_eq!(state, state_after_move);
    }

    #[test]
    fn promotion_requires_a_kind() {
        let mut board = Board::empty();
        board.set(Square::e7, Some(Piece::new(Color::White, PieceKind::Pawn)));
        board.set(Square::e1, Some(Piece::new(Color::White, PieceKind::King)));
        board.set(Square::a8, Some(Piece::new(Color::Black, PieceKind::King)));
        let mut state = GameState::bare();
        state.active_color = Color::White;

        let err = execute(&mut board, &mut state, Square::e7, Square::e8, None).unwrap_err();
        assert!(matches!(err, ChessError::PromotionRequired));

        let mv = execute(&mut board, &mut state, Square::e7, Square::e8, Some(PromotionKind::Queen)).unwrap();
        assert_eq!(mv.promoted_to, Some(PieceKind::Queen));
        assert_eq!(board.get(Square::e8).unwrap().kind, PieceKind::Queen);
    }

    #[test]
    fn capturing_a_rook_on_its_corner_clears_the_right() {
        let mut board = Board::empty();
        board.set(Square::e1, Some(Piece::new(Color::White, PieceKind::King)));
        board.set(Square::e8, Some(Piece::new(Color::Black, PieceKind::King)));
        board.set(Square::h8, Some(Piece::new(Color::Black, PieceKind::Rook)));
        board.set(Square::h1, Some(Piece::new(Color::White, PieceKind::Rook)));
        let mut state = GameState::bare();
        state.active_color = Color::White;
        state.castling_rights.black_kingside = true;

        execute(&mut board, &mut state, Square::h1, Square::h8, None).unwrap();
        assert!(!state.castling_rights.black_kingside);
    }
}
