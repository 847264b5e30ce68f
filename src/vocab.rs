//! Vocabulary and pretrained embedding map types.
//!
//! Loading these from disk is a collaborator concern; the trainer only needs
//! the index↔word correspondence (column i of the word matrix is vocabulary
//! index i) and, optionally, a word→vector map to seed the word matrix.

use std::collections::HashMap;

/// Reserved key substituted when a vocabulary word has no pretrained vector.
pub const UNKNOWN_TOKEN: &str = "*UNKNOWN*";

/// Bidirectional vocabulary mapping.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    index_to_word: Vec<String>,
    word_to_index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from an ordered word list. Position in the list is
    /// the vocabulary index.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let index_to_word: Vec<String> = words.into_iter().map(Into::into).collect();
        let word_to_index = index_to_word
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect();
        Self {
            index_to_word,
            word_to_index,
        }
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.index_to_word.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.index_to_word.is_empty()
    }

    /// Word at a vocabulary index.
    pub fn word(&self, index: usize) -> Option<&str> {
        self.index_to_word.get(index).map(String::as_str)
    }

    /// Index of a word.
    pub fn index(&self, word: &str) -> Option<usize> {
        self.word_to_index.get(word).copied()
    }
}

/// Pretrained word→vector map used to seed the word matrix.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingMap {
    vectors: HashMap<String, Vec<f32>>,
}

impl EmbeddingMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a vector for a word.
    pub fn insert(&mut self, word: impl Into<String>, vector: Vec<f32>) {
        self.vectors.insert(word.into(), vector);
    }

    /// Look up a word's vector.
    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.vectors.get(word).map(Vec::as_slice)
    }

    /// Vector for a word, falling back to the unknown token.
    pub fn get_or_unknown(&self, word: &str) -> Option<&[f32]> {
        self.get(word).or_else(|| self.get(UNKNOWN_TOKEN))
    }
}
