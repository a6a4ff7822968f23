//! A prefix trie over SAN move sequences that relates positions to the
//! openings whose book line passes through them.
//!
//! Grounded directly in `original_source/chess/patterns/openings.py`'s
//! `OpeningTrie`: every node stores the *set* of openings whose line visits
//! it, and classification (a single named opening, a single disambiguated
//! variation, or the ambiguous "Book Move" sentinel) is derived from that
//! set's shape at lookup time rather than stored up front.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::{ChessError, Result};
use crate::notation::pgn;

pub const BOOK_MOVE: &str = "Book Move";

/// A named opening, optionally narrowed to one of its named variations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Opening {
    pub opening_name: String,
    pub variation_name: Option<String>,
}

impl Opening {
    pub fn new(opening_name: impl Into<String>, variation_name: Option<String>) -> Self {
        Self { opening_name: opening_name.into(), variation_name }
    }

    fn book_move() -> Self {
        Self { opening_name: BOOK_MOVE.to_string(), variation_name: None }
    }

    pub fn is_book_move(&self) -> bool {
        self.opening_name == BOOK_MOVE
    }

    /// `"<opening>: <variation>"`, or just `"<opening>"` when there's no
    /// variation to disambiguate with.
    pub fn display_name(&self) -> String {
        match &self.variation_name {
            Some(v) => format!("{}: {}", self.opening_name, v),
            None => self.opening_name.clone(),
        }
    }
}

#[derive(Debug, Default)]
struct TrieNode {
    children: IndexMap<String, TrieNode>,
    openings: HashSet<Opening>,
}

/// A catalog of named openings, indexed by the SAN move sequence that
/// reaches them, supporting classification of both exact lines and their
/// prefixes.
#[derive(Debug, Default)]
pub struct OpeningBook {
    root: TrieNode,
}

/// The sample catalog bundled with this crate.
const EMBEDDED_CATALOG: &str = include_str!("../../data/famous_openings.csv");

impl OpeningBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog bundled with this crate (`data/famous_openings.csv`).
    pub fn embedded() -> Result<Self> {
        Self::from_catalog_str(EMBEDDED_CATALOG)
    }

    /// Build a book from CSV text with columns
    /// `opening_name,variation_name,type,side,eco_code,moves`, skipping
    /// every row whose `type` isn't `Opening` and parsing `moves` as
    /// movetext (so PGN move numbers and dots are tolerated), matching
    /// `original_source`'s `OpeningTrie.from_csv`.
    pub fn from_catalog_str(csv: &str) -> Result<Self> {
        let mut book = Self::new();
        let mut lines = csv.lines();
        let header = lines.next().ok_or_else(|| ChessError::BadCatalogRow("empty catalog".to_string()))?;
        let columns: Vec<&str> = header.split(',').map(str::trim).collect();

        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != columns.len() {
                return Err(ChessError::BadCatalogRow(line.to_string()));
            }
            let row: IndexMap<&str, &str> = columns.iter().copied().zip(fields.iter().copied()).collect();

            if row.get("type").copied() != Some("Opening") {
                continue;
            }

            let opening_name = row
                .get("opening_name")
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ChessError::BadCatalogRow(line.to_string()))?;
            let variation_name = row.get("variation_name").filter(|s| !s.is_empty()).map(|s| s.to_string());
            let moves_text = row.get("moves").copied().unwrap_or("");
            let san_moves = pgn::parse_movetext(moves_text);

            if !san_moves.is_empty() {
                book.insert(&san_moves, opening_name, variation_name);
            }
        }

        Ok(book)
    }

    /// Record that `moves` is a line of `opening_name` (optionally
    /// `variation_name`), adding the opening to every node the line passes
    /// through, root included.
    pub fn insert(&mut self, moves: &[String], opening_name: &str, variation_name: Option<String>) {
        let opening = Opening::new(opening_name, variation_name);
        self.root.openings.insert(opening.clone());
        let mut node = &mut self.root;
        for mv in moves {
            node = node.children.entry(mv.clone()).or_default();
            node.openings.insert(opening.clone());
        }
    }

    /// Classify the position reached after `moves`: `None` if it's not on
    /// any book line, `Some(book_move)` if more than one named opening
    /// passes through it, `Some(opening)` otherwise (with a variation name
    /// attached only if every opening through this node agrees on one).
    pub fn lookup(&self, moves: &[String]) -> Option<Opening> {
        let node = self.node_at(moves)?;
        classify(node)
    }

    /// For every move playable from the position reached by `moves`, what
    /// classification the resulting position has.
    pub fn get_continuations(&self, moves: &[String]) -> Vec<(String, Option<Opening>)> {
        let Some(node) = self.node_at(moves) else { return Vec::new() };
        node.children
            .iter()
            .map(|(mv, child)| (mv.clone(), classify(child)))
            .collect()
    }

    fn node_at(&self, moves: &[String]) -> Option<&TrieNode> {
        let mut node = &self.root;
        for mv in moves {
            node = node.children.get(mv)?;
        }
        Some(node)
    }

    /// Every distinct opening name in the catalog, sorted, excluding the
    /// book-move sentinel.
    pub fn get_all_openings(&self) -> Vec<String> {
        let mut names: HashSet<String> = HashSet::new();
        collect_openings(&self.root, &mut names);
        let mut names: Vec<String> = names.into_iter().collect();
        names.sort();
        names
    }

    /// Every distinct variation name recorded for `opening_name`, sorted.
    pub fn get_variations_for_opening(&self, opening_name: &str) -> Vec<String> {
        let mut variations: HashSet<String> = HashSet::new();
        collect_variations(&self.root, opening_name, &mut variations);
        let mut variations: Vec<String> = variations.into_iter().collect();
        variations.sort();
        variations
    }

    /// Navigation support for a UI overlay tracking a played line: the
    /// rolled-up classification at every ply of `played` (the "path"), plus
    /// the book moves available from the node at `current_move_count` that
    /// weren't actually played (the "available moves"). When `filter` is
    /// `Some((opening_name, variation_name))`, only nodes some opening in
    /// the filter's set actually passes through are kept among the
    /// available moves.
    pub fn focus(&self, played: &[String], current_move_count: usize, filter: Option<(&str, Option<&str>)>) -> Focus {
        let mut path = Vec::with_capacity(played.len() + 1);
        let mut node = &self.root;
        path.push(classify(node));
        for mv in played {
            match node.children.get(mv) {
                Some(child) => {
                    node = child;
                    path.push(classify(node));
                }
                None => break,
            }
        }

        let mut current_node = &self.root;
        for mv in played.iter().take(current_move_count) {
            match current_node.children.get(mv) {
                Some(child) => current_node = child,
                None => break,
            }
        }

        let played_next = played.get(current_move_count);
        let mut available_moves: Vec<(String, Option<Opening>)> = current_node
            .children
            .iter()
            .filter(|(mv, _)| Some(*mv) != played_next)
            .map(|(mv, child)| (mv.clone(), classify(child)))
            .collect();

        if let Some((opening_name, variation_name)) = filter {
            available_moves.retain(|(mv, _)| {
                let Some(child) = current_node.children.get(mv) else { return false };
                child.openings.iter().any(|o| {
                    o.opening_name == opening_name
                        && variation_name.map_or(true, |v| o.variation_name.as_deref() == Some(v))
                })
            });
        }

        Focus { path, available_moves }
    }
}

/// The result of [`OpeningBook::focus`]: the classification along a played
/// line, and the un-played book continuations from the current point in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Focus {
    pub path: Vec<Option<Opening>>,
    pub available_moves: Vec<(String, Option<Opening>)>,
}

fn classify(node: &TrieNode) -> Option<Opening> {
    if node.openings.is_empty() {
        return None;
    }

    let unique_names: HashSet<&str> = node.openings.iter().map(|o| o.opening_name.as_str()).collect();
    if unique_names.len() > 1 {
        return Some(Opening::book_move());
    }
    let name = (*unique_names.iter().next().unwrap()).to_string();

    let variations: HashSet<&str> = node.openings.iter().filter_map(|o| o.variation_name.as_deref()).collect();
    if variations.len() == 1 {
        let variation = (*variations.iter().next().unwrap()).to_string();
        return Some(Opening::new(name, Some(variation)));
    }

    Some(Opening::new(name, None))
}

fn collect_openings(node: &TrieNode, out: &mut HashSet<String>) {
    for opening in &node.openings {
        if !opening.is_book_move() {
            out.insert(opening.opening_name.clone());
        }
    }
    for child in node.children.values() {
        collect_openings(child, out);
    }
}

fn collect_variations(node: &TrieNode, opening_name: &str, out: &mut HashSet<String>) {
    for opening in &node.openings {
        if opening.opening_name == opening_name {
            if let Some(v) = &opening.variation_name {
                out.insert(v.clone());
            }
        }
    }
    for child in node.children.values() {
        collect_variations(child, opening_name, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moves(ms: &[&str]) -> Vec<String> {
        ms.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_opening_resolves_exactly() {
        let mut book = OpeningBook::new();
        book.insert(&moves(&["e4", "e5"]), "Open Game", None);
        assert_eq!(
            book.lookup(&moves(&["e4", "e5"])),
            Some(Opening::new("Open Game", None))
        );
    }

    #[test]
    fn shared_prefix_is_a_book_move() {
        let mut book = OpeningBook::new();
        book.insert(&moves(&["e4", "e5", "Nf3"]), "Open Game", None);
        book.insert(&moves(&["e4", "c5"]), "Sicilian Defense", None);
        assert_eq!(book.lookup(&moves(&["e4"])), Some(Opening::new(BOOK_MOVE, None)));
    }

    #[test]
    fn single_variation_is_named() {
        let mut book = OpeningBook::new();
        book.insert(&moves(&["e4", "e5", "Nf3", "Nc6", "Bb5"]), "Ruy Lopez", Some("Morphy Defense".to_string()));
        let opening = book.lookup(&moves(&["e4", "e5", "Nf3", "Nc6", "Bb5"])).unwrap();
        assert_eq!(opening.opening_name, "Ruy Lopez");
        assert_eq!(opening.variation_name.as_deref(), Some("Morphy Defense"));
    }

    #[test]
    fn unknown_line_is_none() {
        let book = OpeningBook::new();
        assert_eq!(book.lookup(&moves(&["a4"])), None);
    }

    #[test]
    fn embedded_catalog_loads() {
        let book = OpeningBook::embedded().unwrap();
        assert!(!book.get_all_openings().is_empty());
    }

    #[test]
    fn focus_reports_path_and_off_path_continuations() {
        let mut book = OpeningBook::new();
        book.insert(&moves(&["e4", "e5", "Nf3", "Nc6", "Bb5"]), "Ruy Lopez", Some("Morphy Defense".to_string()));
        book.insert(&moves(&["e4", "e5", "Nf3", "Nc6", "Bc4"]), "Italian Game", None);
        book.insert(&moves(&["e4", "c5"]), "Sicilian Defense", None);

        let played = moves(&["e4", "e5", "Nf3", "Nc6"]);
        let focus = book.focus(&played, 4, None);

        assert_eq!(focus.path.len(), 5, "root plus four played plies");
        assert_eq!(focus.path[0], Some(Opening::new(BOOK_MOVE, None)), "root sees every catalog entry");

        let san_options: Vec<&str> = focus.available_moves.iter().map(|(s, _)| s.as_str()).collect();
        assert!(san_options.contains(&"Bb5"));
        assert!(san_options.contains(&"Bc4"));
    }

    #[test]
    fn focus_filters_to_a_chosen_opening_and_variation() {
        let mut book = OpeningBook::new();
        book.insert(&moves(&["e4", "e5", "Nf3", "Nc6", "Bb5"]), "Ruy Lopez", Some("Morphy Defense".to_string()));
        book.insert(&moves(&["e4", "e5", "Nf3", "Nc6", "Bc4"]), "Italian Game", None);

        let played = moves(&["e4", "e5", "Nf3", "Nc6"]);
        let focus = book.focus(&played, 4, Some(("Ruy Lopez", Some("Morphy Defense"))));

        assert_eq!(focus.available_moves.len(), 1);
        assert_eq!(focus.available_moves[0].0, "Bb5");
    }

    #[test]
    fn focus_skips_the_move_actually_played() {
        let mut book = OpeningBook::new();
        book.insert(&moves(&["e4", "e5", "Nf3"]), "Open Game", None);
        book.insert(&moves(&["e4", "c5"]), "Sicilian Defense", None);

        let played = moves(&["e4", "e5"]);
        let focus = book.focus(&played, 1, None);
        let san_options: Vec<&str> = focus.available_moves.iter().map(|(s, _)| s.as_str()).collect();
        assert!(!san_options.contains(&"e5"), "the played move itself isn't an \"available\" alternative");
        assert!(san_options.contains(&"c5"));
    }
}
