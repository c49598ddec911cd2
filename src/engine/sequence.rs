//! Append-only record of committed symbols.

use crate::classifier::Symbol;
use std::time::Instant;

/// Ordered symbols committed during the current session.
///
/// Grows one symbol at a time and is only ever emptied as a whole.
#[derive(Debug, Clone, Default)]
pub struct RecognizedSequence {
    symbols: Vec<Symbol>,
    last_commit: Option<Instant>,
}

impl RecognizedSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `symbol`. Returns false and leaves the sequence untouched when
    /// the symbol is empty.
    pub fn append(&mut self, symbol: Symbol, at: Instant) -> bool {
        if symbol.is_empty() {
            return false;
        }
        self.symbols.push(symbol);
        self.last_commit = Some(at);
        true
    }

    /// Space-joined text, rebuilt on every call.
    pub fn text(&self) -> String {
        self.symbols.join(" ")
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn last(&self) -> Option<&Symbol> {
        self.symbols.last()
    }

    pub fn last_commit(&self) -> Option<Instant> {
        self.last_commit
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
        self.last_commit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_text() {
        let mut sequence = RecognizedSequence::new();
        assert_eq!(sequence.text(), "");

        let t = Instant::now();
        assert!(sequence.append("HELLO".to_string(), t));
        assert!(sequence.append("MY".to_string(), t));
        assert!(sequence.append("NAME".to_string(), t));

        assert_eq!(sequence.text(), "HELLO MY NAME");
        assert_eq!(sequence.len(), 3);
        assert_eq!(sequence.last().map(String::as_str), Some("NAME"));
        assert_eq!(sequence.last_commit(), Some(t));
    }

    #[test]
    fn test_rejects_empty_symbol() {
        let mut sequence = RecognizedSequence::new();
        assert!(!sequence.append(String::new(), Instant::now()));
        assert!(sequence.is_empty());
        assert!(sequence.last_commit().is_none());
    }

    #[test]
    fn test_clear() {
        let mut sequence = RecognizedSequence::new();
        sequence.append("YES".to_string(), Instant::now());
        sequence.clear();
        assert!(sequence.is_empty());
        assert_eq!(sequence.text(), "");
        assert!(sequence.last_commit().is_none());
    }
}
