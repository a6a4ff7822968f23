//! Text notations for positions and moves: FEN, SAN, and PGN.

pub mod fen;
pub mod pgn;
pub mod san;
pub mod squares;
