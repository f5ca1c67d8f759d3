//! Fallback tokenizer for models shipped without a `tokenizer.json`.
//!
//! Maps every word to a vocabulary id by hashing it, wrapped in BERT's
//! `[CLS]`/`[SEP]` markers. It is only an approximation of a real
//! WordPiece vocabulary, but it keeps BERT-shaped models runnable.

/// `[CLS]` token id.
pub const CLS_TOKEN_ID: i64 = 101;

/// `[SEP]` token id.
pub const SEP_TOKEN_ID: i64 = 102;

/// BERT-base vocabulary size.
pub const VOCAB_SIZE: u32 = 30528;

/// Ids below this are reserved for special tokens.
const FIRST_WORD_ID: i64 = 100;

/// Default maximum sequence length, markers included.
pub const DEFAULT_MAX_SEQUENCE_LENGTH: usize = 512;

/// Word-hashing tokenizer.
#[derive(Debug, Clone, Copy)]
pub struct WordHashTokenizer {
    max_length: usize,
}

impl WordHashTokenizer {
    /// Create a tokenizer producing at most `max_length` ids.
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length: max_length.max(2),
        }
    }

    /// Maximum sequence length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Encode `text` as `[CLS] word... [SEP]`.
    pub fn encode(&self, text: &str) -> Vec<i64> {
        let mut ids = Vec::with_capacity(self.max_length.min(text.len() + 2));
        ids.push(CLS_TOKEN_ID);

        let words = text
            .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
            .filter(|word| !word.is_empty());

        for word in words {
            if ids.len() >= self.max_length - 1 {
                break;
            }
            ids.push(word_id(word));
        }

        ids.push(SEP_TOKEN_ID);
        ids
    }
}

impl Default for WordHashTokenizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SEQUENCE_LENGTH)
    }
}

fn word_id(word: &str) -> i64 {
    let hash = word.bytes().fold(0u32, |hash, byte| {
        hash.wrapping_mul(31)
            .wrapping_add(u32::from(byte.to_ascii_lowercase()))
    });
    let id = i64::from(hash % VOCAB_SIZE);
    if id < FIRST_WORD_ID {
        id + FIRST_WORD_ID
    } else {
        id
    }
}
