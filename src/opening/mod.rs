//! Opening-book lookup over a trie of SAN move sequences.

pub mod trie;

pub use trie::{Focus, Opening, OpeningBook};
