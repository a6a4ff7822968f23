//! Chumsky parsers for the atomic textual unit every notation is built from:
//! a single square like `e4`.
//!
//! Grounded directly in the teacher's `src/notation/square.rs`, which builds
//! the same file/rank/square combinators; kept as the one place this crate
//! leans on `chumsky` rather than hand-rolled parsing, since a square token
//! is exactly the kind of tiny fixed grammar the teacher reaches for it for.

use chumsky::prelude::*;

use crate::model::{File, Rank, Square};

pub fn file_parser<'s>() -> impl Parser<'s, &'s str, File, extra::Err<Rich<'s, char>>> {
    one_of("abcdefgh").map(|c: char| File::from_u8(c as u8 - b'a'))
}

pub fn rank_parser<'s>() -> impl Parser<'s, &'s str, Rank, extra::Err<Rich<'s, char>>> {
    one_of("12345678").map(|c: char| Rank::from_u8(c as u8 - b'1'))
}

pub fn square_parser<'s>() -> impl Parser<'s, &'s str, Square, extra::Err<Rich<'s, char>>> {
    file_parser()
        .then(rank_parser())
        .map(|(file, rank)| Square::from_file_rank(file, rank))
}

/// Parse a single square, e.g. for an en-passant target or a SAN destination.
pub fn parse_square(text: &str) -> Option<Square> {
    square_parser().parse(text).into_result().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_square_round_trips() {
        for sq in Square::iter() {
            assert_eq!(parse_square(&sq.to_string()), Some(sq));
        }
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_square("z9"), None);
        assert_eq!(parse_square("e"), None);
    }
}
