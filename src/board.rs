//! The simple, human-comprehensible board representation: a flat array
//! mapping each square directly to an optional occupant.
//!
//! Grounded in the teacher's `Mailbox<T>` (`src/model/mailbox.rs`), whose own
//! doc comment calls this "the basis of the simple and most obvious
//! representation" -- exactly the mailbox style this engine is built on,
//! deliberately in place of the teacher's bitboard core.

use crate::error::{ChessError, Result, SquareRef};
use crate::model::{Color, Piece, PieceKind, Square};

/// A chessboard: each of the 64 squares holds at most one piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; 64],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    pub fn empty() -> Self {
        Self { squares: [None; 64] }
    }

    /// The standard chess starting position.
    pub fn startpos() -> Self {
        let mut board = Self::empty();
        use PieceKind::*;
        let back_rank = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];
        for (file, kind) in back_rank.iter().enumerate() {
            board.set(
                Square::from_u8(file as u8),
                Some(Piece::new(Color::White, *kind)),
            );
            board.set(
                Square::from_u8(8 + file as u8),
                Some(Piece::new(Color::White, Pawn)),
            );
            board.set(
                Square::from_u8(48 + file as u8),
                Some(Piece::new(Color::Black, Pawn)),
            );
            board.set(
                Square::from_u8(56 + file as u8),
                Some(Piece::new(Color::Black, *kind)),
            );
        }
        board
    }

    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.ix()]
    }

    #[inline]
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[sq.ix()] = piece;
    }

    /// Get the piece at a raw `(file, rank)` coordinate pair, failing with
    /// `OutOfBounds` instead of panicking when the coordinates fall outside
    /// the board. Grounded on `original_source/chess/board.py`'s
    /// `get_piece`, which takes the same raw ints and raises on the same
    /// condition.
    pub fn get_raw(&self, file: i16, rank: i16) -> Result<Option<Piece>> {
        let sq = Square::try_from_coords(file, rank).ok_or(ChessError::OutOfBounds(SquareRef { file, rank }))?;
        Ok(self.get(sq))
    }

    /// Set the piece at a raw `(file, rank)` coordinate pair, failing with
    /// `OutOfBounds` instead of panicking when the coordinates fall outside
    /// the board. Grounded on `original_source/chess/board.py`'s
    /// `set_piece`.
    pub fn set_raw(&mut self, file: i16, rank: i16, piece: Option<Piece>) -> Result<()> {
        let sq = Square::try_from_coords(file, rank).ok_or(ChessError::OutOfBounds(SquareRef { file, rank }))?;
        self.set(sq, piece);
        Ok(())
    }

    /// Find the (unique, by construction) king of `color`.
    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.iter()
            .find(|(_, piece)| piece.color == color && piece.kind == PieceKind::King)
            .map(|(sq, _)| sq)
    }

    /// Every occupied square and its piece.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(ix, cell)| cell.map(|piece| (Square::from_u8(ix as u8), piece)))
    }

    /// Count kings of a given color -- used by proptest invariants to catch
    /// impossible positions (zero or more than one king per side).
    pub fn king_count(&self, color: Color) -> usize {
        self.iter()
            .filter(|(_, piece)| piece.color == color && piece.kind == PieceKind::King)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_has_32_pieces() {
        let board = Board::startpos();
        assert_eq!(board.iter().count(), 32);
    }

    #[test]
    fn startpos_kings_on_e_file() {
        let board = Board::startpos();
        assert_eq!(board.find_king(Color::White), Some(Square::e1));
        assert_eq!(board.find_king(Color::Black), Some(Square::e8));
    }

    #[test]
    fn empty_board_has_no_pieces() {
        let board = Board::empty();
        assert_eq!(board.iter().count(), 0);
    }

    #[test]
    fn set_then_get_roundtrips() {
        let mut board = Board::empty();
        let piece = Piece::new(Color::White, PieceKind::Queen);
        board.set(Square::d4, Some(piece));
        assert_eq!(board.get(Square::d4), Some(piece));
        board.set(Square::d4, None);
        assert_eq!(board.get(Square::d4), None);
    }

    #[test]
    fn raw_coordinates_roundtrip_in_range() {
        let mut board = Board::empty();
        let piece = Piece::new(Color::Black, PieceKind::Knight);
        board.set_raw(2, 5, Some(piece)).unwrap();
        assert_eq!(board.get_raw(2, 5).unwrap(), Some(piece));
        assert_eq!(board.get(Square::c6), Some(piece));
    }

    #[test]
    fn raw_coordinates_out_of_bounds_fail() {
        let board = Board::empty();
        let err = board.get_raw(8, 0).unwrap_err();
        assert_eq!(err, ChessError::OutOfBounds(crate::error::SquareRef { file: 8, rank: 0 }));

        let err = board.get_raw(-1, 3).unwrap_err();
        assert_eq!(err, ChessError::OutOfBounds(crate::error::SquareRef { file: -1, rank: 3 }));
    }
}
