//! Property tests over random legal games: universal invariants that must
//! hold no matter which legal moves get played, not just the handful of
//! scenarios `scenarios.rs` spells out.
//!
//! Move choice is driven by a tiny xorshift PRNG seeded directly by
//! proptest's generated `u64`, rather than a hand-rolled `Arbitrary` over
//! `Move` -- proptest shrinks the seed, not the game tree, but a failing
//! seed is still perfectly reproducible.

use chess_study_core::model::Color;
use chess_study_core::notation::fen;
use chess_study_core::{executor, movegen, Board, GameState};
use proptest::prelude::*;

struct Xorshift(u64);

impl Xorshift {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn pick<T>(&mut self, choices: &[T]) -> usize {
        (self.next_u64() as usize) % choices.len()
    }
}

/// Play up to `max_plies` random legal moves from the starting position,
/// stopping early at checkmate/stalemate. Returns the sequence of
/// `(board, state)` snapshots *before* each move played, oldest first.
fn play_random_game(seed: u64, max_plies: u32) -> Vec<(Board, GameState)> {
    let mut rng = Xorshift(seed | 1);
    let mut board = Board::startpos();
    let mut state = GameState::startpos();
    let mut snapshots = Vec::new();

    for _ in 0..max_plies {
        let color = state.active_color;
        let moves = movegen::legal_moves(&board, &state, color).expect("legal_moves must not error mid-game");
        if moves.is_empty() {
            break;
        }
        snapshots.push((board.clone(), state.clone()));
        let choice = rng.pick(&moves);
        let mv = moves[choice];
        let promotion = mv.promoted_to.and_then(|kind| {
            use chess_study_core::model::PieceKind::*;
            use chess_study_core::model::PromotionKind;
            Some(match kind {
                Knight => PromotionKind::Knight,
                Bishop => PromotionKind::Bishop,
                Rook => PromotionKind::Rook,
                Queen => PromotionKind::Queen,
                _ => return None,
            })
        });
        executor::execute(&mut board, &mut state, mv.from, mv.to, promotion)
            .expect("a move just enumerated as legal must execute cleanly");
    }

    snapshots
}

proptest! {
    #[test]
    fn every_position_in_a_random_game_has_exactly_one_king_per_side(seed in any::<u64>()) {
        let snapshots = play_random_game(seed, 40);
        for (board, _) in &snapshots {
            prop_assert_eq!(board.king_count(Color::White), 1);
            prop_assert_eq!(board.king_count(Color::Black), 1);
        }
    }

    #[test]
    fn legal_moves_never_leave_the_mover_in_check(seed in any::<u64>()) {
        let snapshots = play_random_game(seed, 40);
        for (board, state) in &snapshots {
            let color = state.active_color;
            for mv in movegen::legal_moves(board, state, color).unwrap() {
                let mut sim_board = board.clone();
                let mut sim_state = state.clone();
                let promotion = mv.promoted_to.map(|_| chess_study_core::model::PromotionKind::Queen).filter(|_| mv.is_promotion);
                executor::execute(&mut sim_board, &mut sim_state, mv.from, mv.to, promotion).unwrap();
                prop_assert!(!movegen::is_in_check(&sim_board, color));
            }
        }
    }

    #[test]
    fn execute_then_undo_restores_the_exact_board_and_state(seed in any::<u64>()) {
        let mut board = Board::startpos();
        let mut state = GameState::startpos();
        let mut rng = Xorshift(seed | 1);

        let plies = 1 + (rng.next_u64() % 15) as u32;
        let mut played = Vec::new();

        for _ in 0..plies {
            let color = state.active_color;
            let moves = movegen::legal_moves(&board, &state, color).unwrap();
            if moves.is_empty() {
                break;
            }
            let before_board = board.clone();
            let before_state = state.clone();
            let choice = rng.pick(&moves);
            let mv = moves[choice];
            let promotion = mv.promoted_to.map(|_| chess_study_core::model::PromotionKind::Queen).filter(|_| mv.is_promotion);
            executor::execute(&mut board, &mut state, mv.from, mv.to, promotion).unwrap();
            played.push((before_board, before_state));
        }

        for (before_board, before_state) in played.into_iter().rev() {
            executor::undo(&mut board, &mut state).unwrap();
            prop_assert_eq!(&board, &before_board);
            prop_assert_eq!(state.active_color, before_state.active_color);
            prop_assert_eq!(state.castling_rights, before_state.castling_rights);
            prop_assert_eq!(state.en_passant_target, before_state.en_passant_target);
            prop_assert_eq!(state.halfmove_clock, before_state.halfmove_clock);
            prop_assert_eq!(state.fullmove_number, before_state.fullmove_number);
        }
    }

    #[test]
    fn every_reached_position_round_trips_through_fen(seed in any::<u64>()) {
        let snapshots = play_random_game(seed, 30);
        for (board, state) in &snapshots {
            let text = fen::to_fen(board, state);
            let (parsed_board, parsed_state) = fen::parse(&text).expect("a position this engine reached must be valid FEN");
            prop_assert_eq!(&parsed_board, board);
            prop_assert_eq!(parsed_state.active_color, state.active_color);
            prop_assert_eq!(parsed_state.castling_rights, state.castling_rights);
            prop_assert_eq!(parsed_state.en_passant_target, state.en_passant_target);
        }
    }

    #[test]
    fn halfmove_clock_only_resets_on_pawn_moves_or_captures(seed in any::<u64>()) {
        let mut board = Board::startpos();
        let mut state = GameState::startpos();
        let mut rng = Xorshift(seed | 1);

        for _ in 0..25 {
            let color = state.active_color;
            let moves = movegen::legal_moves(&board, &state, color).unwrap();
            if moves.is_empty() {
                break;
            }
            let before_clock = state.halfmove_clock;
            let choice = rng.pick(&moves);
            let mv = moves[choice];
            let resets = mv.resets_halfmove_clock();
            let promotion = mv.promoted_to.map(|_| chess_study_core::model::PromotionKind::Queen).filter(|_| mv.is_promotion);
            executor::execute(&mut board, &mut state, mv.from, mv.to, promotion).unwrap();

            if resets {
                prop_assert_eq!(state.halfmove_clock, 0);
            } else {
                prop_assert_eq!(state.halfmove_clock, before_clock + 1);
            }
        }
    }
}
