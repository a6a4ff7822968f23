//! Core data types for representing a chess position: squares, colors,
//! piece kinds, and the fully-reversible move record.
//!
//! Board occupancy itself lives in [`crate::board::Board`]; this module is
//! purely the vocabulary every other module in the crate shares.

use std::fmt;

use strum::{EnumIter, VariantNames};

/// Representation of the squares on a chessboard.
///
/// This enum uses the convention of numbering squares starting with
/// a1 = 0 and then counting up over the files first, b1 = 1, c1 = 2, ...
/// and then the ranks, a2 = 8, a3 = 16, ... ending with h8 = 63.
///
/// This is the so called file-major little-endian layout.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, VariantNames, EnumIter)]
#[repr(u8)]
#[rustfmt::skip]
pub enum Square {
    a1 = 0o00, b1 = 0o01, c1 = 0o02, d1 = 0o03, e1 = 0o04, f1 = 0o05, g1 = 0o06, h1 = 0o07,
    a2 = 0o10, b2 = 0o11, c2 = 0o12, d2 = 0o13, e2 = 0o14, f2 = 0o15, g2 = 0o16, h2 = 0o17,
    a3 = 0o20, b3 = 0o21, c3 = 0o22, d3 = 0o23, e3 = 0o24, f3 = 0o25, g3 = 0o26, h3 = 0o27,
    a4 = 0o30, b4 = 0o31, c4 = 0o32, d4 = 0o33, e4 = 0o34, f4 = 0o35, g4 = 0o36, h4 = 0o37,
    a5 = 0o40, b5 = 0o41, c5 = 0o42, d5 = 0o43, e5 = 0o44, f5 = 0o45, g5 = 0o46, h5 = 0o47,
    a6 = 0o50, b6 = 0o51, c6 = 0o52, d6 = 0o53, e6 = 0o54, f6 = 0o55, g6 = 0o56, h6 = 0o57,
    a7 = 0o60, b7 = 0o61, c7 = 0o62, d7 = 0o63, e7 = 0o64, f7 = 0o65, g7 = 0o66, h7 = 0o67,
    a8 = 0o70, b8 = 0o71, c8 = 0o72, d8 = 0o73, e8 = 0o74, f8 = 0o75, g8 = 0o76, h8 = 0o77,
}

impl Square {
    /// Use this Square as an array index.
    #[inline]
    pub fn ix(self) -> usize {
        self as usize
    }

    /// Infallible conversion from a u8 by way of truncating the
    /// extraneous bits.
    #[inline]
    pub fn from_u8(ix: u8) -> Self {
        unsafe { std::mem::transmute::<u8, Self>(ix & 0x3Fu8) }
    }

    #[inline]
    pub fn file(self) -> File {
        File::from_u8(self as u8 & 0x7)
    }

    #[inline]
    pub fn rank(self) -> Rank {
        Rank::from_u8((self as u8 & 0x38) >> 3)
    }

    #[inline]
    pub fn from_file_rank(file: File, rank: Rank) -> Self {
        Self::from_u8(file as u8 | (rank as u8) << 3)
    }

    /// Attempt to build a square from raw, possibly out-of-range, file/rank
    /// coordinates, as encountered when walking off the edge of the board.
    pub fn try_from_coords(file: i16, rank: i16) -> Option<Self> {
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Self::from_file_rank(File::from_u8(file as u8), Rank::from_u8(rank as u8)))
        } else {
            None
        }
    }

    /// Offset this square by `(df, dr)` files/ranks, `None` if that leaves the board.
    pub fn offset(self, df: i8, dr: i8) -> Option<Self> {
        let file = self.file().ix() as i16 + df as i16;
        let rank = self.rank().ix() as i16 + dr as i16;
        Self::try_from_coords(file, rank)
    }

    /// Mirror chessboard north to south.
    #[inline]
    pub fn mirror_ns(self) -> Self {
        Self::from_u8(self as u8 ^ 0x38u8)
    }

    /// Mirror chessboard east to west.
    #[inline]
    pub fn mirror_ew(self) -> Self {
        Self::from_u8(self as u8 ^ 0x7u8)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::VARIANTS[self.ix()])
    }
}

/// A rank (row), rank 1 = 0 .. rank 8 = 7.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Rank {
    _1 = 0,
    _2 = 1,
    _3 = 2,
    _4 = 3,
    _5 = 4,
    _6 = 5,
    _7 = 6,
    _8 = 7,
}

impl Rank {
    pub const VARIANTS: &'static [&'static str] = &["1", "2", "3", "4", "5", "6", "7", "8"];

    #[inline]
    pub fn ix(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_u8(ix: u8) -> Self {
        unsafe { std::mem::transmute::<u8, Self>(ix & 0x7) }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::VARIANTS[self.ix()])
    }
}

/// A file (column), a = 0 .. h = 7.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum File {
    a_ = 0,
    b_ = 1,
    c_ = 2,
    d_ = 3,
    e_ = 4,
    f_ = 5,
    g_ = 6,
    h_ = 7,
}

impl File {
    pub const VARIANTS: &'static [&'static str] = &["a", "b", "c", "d", "e", "f", "g", "h"];

    #[inline]
    pub fn ix(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_u8(ix: u8) -> Self {
        unsafe { std::mem::transmute::<u8, Self>(ix & 0x7) }
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::VARIANTS[self.ix()])
    }
}

/// The color of a player or a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    /// Opposing color.
    #[inline]
    pub fn opponent(self) -> Self {
        unsafe { std::mem::transmute(self as u8 ^ 1) }
    }

    /// Associated array index.
    #[inline]
    pub fn ix(self) -> usize {
        self as usize
    }

    /// The rank pawns of this color start on.
    #[inline]
    pub fn pawn_home_rank(self) -> Rank {
        match self {
            Self::White => Rank::_2,
            Self::Black => Rank::_7,
        }
    }

    /// The rank a pawn of this color promotes on.
    #[inline]
    pub fn promotion_rank(self) -> Rank {
        match self {
            Self::White => Rank::_8,
            Self::Black => Rank::_1,
        }
    }

    /// +1 for White's forward direction, -1 for Black's.
    #[inline]
    pub fn pawn_direction(self) -> i8 {
        match self {
            Self::White => 1,
            Self::Black => -1,
        }
    }

    /// The back rank the king and rooks start on for this color.
    #[inline]
    pub fn back_rank(self) -> Rank {
        match self {
            Self::White => Rank::_1,
            Self::Black => Rank::_8,
        }
    }
}

/// The kind of a chess piece, independent of color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// A piece kind a pawn can promote to: everything but pawn and king.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PromotionKind {
    Knight,
    Bishop,
    Rook,
    Queen,
}

impl From<PromotionKind> for PieceKind {
    fn from(value: PromotionKind) -> Self {
        match value {
            PromotionKind::Knight => PieceKind::Knight,
            PromotionKind::Bishop => PieceKind::Bishop,
            PromotionKind::Rook => PieceKind::Rook,
            PromotionKind::Queen => PieceKind::Queen,
        }
    }
}

impl PromotionKind {
    pub fn from_letter(c: char) -> Option<Self> {
        Some(match c.to_ascii_uppercase() {
            'N' => Self::Knight,
            'B' => Self::Bishop,
            'R' => Self::Rook,
            'Q' => Self::Queen,
            _ => return None,
        })
    }

    pub fn letter(self) -> char {
        PieceKind::from(self).letter()
    }
}

impl PieceKind {
    /// Static step-vector descriptor for this kind. Empty for pawns, whose
    /// motion is color-dependent and handled specially by the move generator.
    pub fn offsets(self) -> &'static [(i8, i8)] {
        const ROOK: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        const BISHOP: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
        const QUEEN: [(i8, i8); 8] = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ];
        const KNIGHT: [(i8, i8); 8] = [
            (1, 2),
            (2, 1),
            (2, -1),
            (1, -2),
            (-1, -2),
            (-2, -1),
            (-2, 1),
            (-1, 2),
        ];
        match self {
            PieceKind::Pawn => &[],
            PieceKind::Knight => &KNIGHT,
            PieceKind::Bishop => &BISHOP,
            PieceKind::Rook => &ROOK,
            PieceKind::Queen => &QUEEN,
            PieceKind::King => &QUEEN,
        }
    }

    /// Whether this piece slides along its offsets (as opposed to taking a
    /// single step), used by the move generator to decide ray-walk vs. leap.
    #[inline]
    pub fn is_sliding(self) -> bool {
        matches!(self, PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop)
    }

    /// Upper-case letter used for this kind in FEN/SAN (pawns have none).
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => '\0',
            PieceKind::Knight => 'N',
            PieceKind::Bishop => 'B',
            PieceKind::Rook => 'R',
            PieceKind::Queen => 'Q',
            PieceKind::King => 'K',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        Some(match c.to_ascii_uppercase() {
            'N' => PieceKind::Knight,
            'B' => PieceKind::Bishop,
            'R' => PieceKind::Rook,
            'Q' => PieceKind::Queen,
            'K' => PieceKind::King,
            'P' => PieceKind::Pawn,
            _ => return None,
        })
    }
}

/// A chess piece sitting on the board.
///
/// Piece identity has no meaning across moves: a promoted pawn becomes a
/// fresh `Piece` of the chosen kind, and a captured piece is simply dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub fn new(color: Color, kind: PieceKind) -> Self {
        Self { color, kind }
    }

    /// FEN/board letter: upper-case for White, lower-case for Black.
    pub fn fen_letter(self) -> char {
        let letter = if self.kind == PieceKind::Pawn {
            'P'
        } else {
            self.kind.letter()
        };
        match self.color {
            Color::White => letter,
            Color::Black => letter.to_ascii_lowercase(),
        }
    }

    pub fn from_fen_letter(c: char) -> Option<Self> {
        let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
        let kind = PieceKind::from_letter(c)?;
        Some(Self::new(color, kind))
    }
}

/// The four castling rights, independent of whether they're presently
/// usable in the current position (that's the move generator's job).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub const NONE: Self = Self {
        white_kingside: false,
        white_queenside: false,
        black_kingside: false,
        black_queenside: false,
    };

    pub const ALL: Self = Self {
        white_kingside: true,
        white_queenside: true,
        black_kingside: true,
        black_queenside: true,
    };

    pub fn kingside(self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    pub fn queenside(self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    pub fn set_kingside(&mut self, color: Color, value: bool) {
        match color {
            Color::White => self.white_kingside = value,
            Color::Black => self.black_kingside = value,
        }
    }

    pub fn set_queenside(&mut self, color: Color, value: bool) {
        match color {
            Color::White => self.white_queenside = value,
            Color::Black => self.black_queenside = value,
        }
    }

    pub fn clear_color(&mut self, color: Color) {
        self.set_kingside(color, false);
        self.set_queenside(color, false);
    }

    pub fn any(self) -> bool {
        self.white_kingside || self.white_queenside || self.black_kingside || self.black_queenside
    }
}

/// Which side of the board a castling move goes toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastlingSide {
    Kingside,
    Queenside,
}

/// The classic (non-Chess960) squares the king and rooks move to and from,
/// indexed by [`Color`] and [`CastlingSide`]. The one configuration this
/// engine supports; see `SPEC_FULL.md` for why Chess960 is out of scope.
#[derive(Debug, Clone, Copy)]
pub struct CastlingRules {
    pub king_start: [Square; 2],
    pub king_end: [[Square; 2]; 2],
    pub rook_start: [[Square; 2]; 2],
    pub rook_end: [[Square; 2]; 2],
}

impl CastlingRules {
    pub const STANDARD: CastlingRules = CastlingRules {
        king_start: [Square::e1, Square::e8],
        king_end: [[Square::g1, Square::c1], [Square::g8, Square::c8]],
        rook_start: [[Square::h1, Square::a1], [Square::h8, Square::a8]],
        rook_end: [[Square::f1, Square::d1], [Square::f8, Square::d8]],
    };

    fn side_ix(side: CastlingSide) -> usize {
        match side {
            CastlingSide::Kingside => 0,
            CastlingSide::Queenside => 1,
        }
    }

    pub fn king_start(&self, color: Color) -> Square {
        self.king_start[color.ix()]
    }

    pub fn king_end(&self, color: Color, side: CastlingSide) -> Square {
        self.king_end[color.ix()][Self::side_ix(side)]
    }

    pub fn rook_start(&self, color: Color, side: CastlingSide) -> Square {
        self.rook_start[color.ix()][Self::side_ix(side)]
    }

    pub fn rook_end(&self, color: Color, side: CastlingSide) -> Square {
        self.rook_end[color.ix()][Self::side_ix(side)]
    }
}

/// A fully reversible record of one executed move.
///
/// Carries a snapshot of every piece of irreversible state as it stood
/// *before* the move, so that [`crate::executor::undo`] never needs to
/// replay history to reconstruct rights, the en-passant target, or the
/// move counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,

    /// The captured piece, if any, and the square it was captured from
    /// (differs from `to` only for en passant).
    pub captured: Option<(Piece, Square)>,

    /// The en-passant target this move establishes (`Some` iff this move is
    /// a pawn double push), stored as the pawn's own landing square.
    pub en_passant_target: Option<Square>,

    pub is_en_passant: bool,
    pub is_castling: bool,
    pub castling_rook_from: Option<Square>,
    pub castling_rook_to: Option<Square>,

    pub is_promotion: bool,
    pub promoted_to: Option<PieceKind>,

    /// State as it stood immediately before this move was applied.
    pub pre_state: PreMoveState,
}

/// The portion of [`crate::state::GameState`] a move can irreversibly
/// change, captured at execute time so undo is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreMoveState {
    pub castling_rights: CastlingRights,
    pub en_passant_target: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Move {
    /// True if this move is a pawn move or a capture: the halfmove-clock
    /// reset condition.
    pub fn resets_halfmove_clock(&self) -> bool {
        self.piece.kind == PieceKind::Pawn || self.captured.is_some()
    }
}
