//! Error types for every fallible boundary of the rules engine.
//!
//! Every variant is distinguished structurally (not by a formatted string)
//! so a caller can match down to the offending field, move index, or
//! out-of-range value without re-parsing a message.

use thiserror::Error;

use crate::model::Square;

/// Top level error for the whole crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// A square index or coordinate fell outside the 8x8 board.
    #[error("square out of bounds: {0:?}")]
    OutOfBounds(SquareRef),

    /// FEN parsing failed.
    #[error(transparent)]
    Fen(#[from] FenError),

    /// PGN parsing or loading failed.
    #[error(transparent)]
    Pgn(#[from] PgnError),

    /// A SAN string did not match the SAN grammar.
    #[error("malformed SAN: {0:?}")]
    BadSanSyntax(String),

    /// A SAN string resolved to no legal move.
    #[error("no legal move resolves SAN {0:?}")]
    IllegalMove(String),

    /// A SAN string resolved to more than one legal move.
    #[error("ambiguous SAN {0:?}: matched squares {1:?}")]
    AmbiguousMove(String, Vec<Square>),

    /// `execute` was called on a promoting pawn move without a promotion kind.
    #[error("promotion piece kind required for move ending on the back rank")]
    PromotionRequired,

    /// Castling rights claim a rook that isn't where the rights say it is.
    ///
    /// Indicates either a bug in how rights are maintained, or a hand-crafted
    /// FEN/PGN that asserts rights inconsistent with the position.
    #[error("castling rights for {0:?} claim a rook at {1:?} but none is there")]
    InvalidState(crate::model::Color, Square),

    /// A history-index jump target fell outside `[0, history.len() + redo.len()]`.
    #[error("history index {requested} out of range 0..={max}")]
    RangeError { requested: usize, max: usize },

    /// An opening-catalog row was malformed (wrong column count, empty moves).
    #[error("bad opening catalog row: {0}")]
    BadCatalogRow(String),
}

/// Placeholder square reference used when the offending coordinates
/// didn't even form a valid `Square`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquareRef {
    pub file: i16,
    pub rank: i16,
}

/// Errors raised while parsing or generating a FEN string. Each variant
/// names the specific field at fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("expected 6 whitespace-separated fields, found {0}")]
    FieldCount(usize),

    #[error("piece placement: expected 8 ranks separated by '/', found {0}")]
    RankCount(usize),

    #[error("piece placement: rank {rank} sums to {sum} files, expected 8")]
    RankWidth { rank: u8, sum: u32 },

    #[error("piece placement: unrecognized character {0:?}")]
    BadPieceChar(char),

    #[error("active color: expected 'w' or 'b', found {0:?}")]
    BadActiveColor(String),

    #[error("castling rights: expected '-' or a subset of \"KQkq\", found {0:?}")]
    BadCastling(String),

    #[error("en passant target: expected '-' or a square on rank 3 or 6, found {0:?}")]
    BadEnPassant(String),

    #[error("halfmove clock: expected a non-negative integer, found {0:?}")]
    BadHalfmove(String),

    #[error("fullmove number: expected a positive integer, found {0:?}")]
    BadFullmove(String),
}

/// Errors raised while parsing or loading a PGN game.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PgnError {
    #[error("empty PGN string")]
    Empty,

    #[error("invalid FEN tag: {0}")]
    BadFenTag(FenError),

    #[error("move {index} ({san:?}): {source}")]
    MoveFailed {
        index: usize,
        san: String,
        #[source]
        source: Box<ChessError>,
    },
}

pub type Result<T> = std::result::Result<T, ChessError>;
