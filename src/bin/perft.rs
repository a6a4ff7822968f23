//! Perft: count leaf positions reachable within a fixed depth from the
//! starting position, a standard move-generator correctness smoke test.
//!
//! Grounded in the teacher's own `main_perft` precedent (a depth-driven
//! `enumerate` walk over `CompactBitBoard`); this version walks
//! [`chess_study_core::movegen::legal_moves`] and applies each candidate
//! through the public [`chess_study_core::executor`] API (execute, then
//! undo) rather than reaching into move-generation internals, since a
//! `[[bin]]` target compiles against the library crate like any other
//! downstream consumer.

use std::env;
use std::time::Instant;

use chess_study_core::model::{Color, PieceKind, PromotionKind};
use chess_study_core::{board::Board, executor, movegen, state::GameState};

fn promotion_kind(kind: PieceKind) -> Option<PromotionKind> {
    match kind {
        PieceKind::Knight => Some(PromotionKind::Knight),
        PieceKind::Bishop => Some(PromotionKind::Bishop),
        PieceKind::Rook => Some(PromotionKind::Rook),
        PieceKind::Queen => Some(PromotionKind::Queen),
        PieceKind::Pawn | PieceKind::King => None,
    }
}

fn perft(board: &mut Board, state: &mut GameState, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let color = state.active_color;
    let moves = match movegen::legal_moves(board, state, color) {
        Ok(moves) => moves,
        Err(e) => panic!("legal_moves failed mid-perft: {e}"),
    };

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for candidate in &moves {
        let promotion = candidate.promoted_to.and_then(promotion_kind);
        executor::execute(board, state, candidate.from, candidate.to, promotion)
            .expect("a move just enumerated as legal must execute cleanly");
        nodes += perft(board, state, depth - 1);
        executor::undo(board, state).expect("every executed move must undo cleanly");
    }
    nodes
}

fn main() {
    let depth: u32 = env::args().nth(1).and_then(|s| s.parse().ok()).unwrap_or(4);

    let mut board = Board::startpos();
    let mut state = GameState::startpos();

    println!("perft from the starting position, depth {depth}");
    for d in 1..=depth {
        let start = Instant::now();
        let nodes = perft(&mut board, &mut state, d);
        let elapsed = start.elapsed();
        println!("  depth {d}: {nodes} nodes in {elapsed:?}");
    }

    assert_eq!(state.active_color, Color::White, "perft must return the board to the starting side to move");
    assert_eq!(board, Board::startpos(), "perft must leave the board unmodified");
}
