//! Response pattern the learner cycles through.

use bytes::Bytes;
use std::fmt;

/// Default reply pattern: the bit encoding of `'.'`.
pub const DEFAULT_PATTERN: &[u8] = b"00101110";

/// Immutable, non-empty sequence of reply bytes.
///
/// Reply `n` is `pattern[n % len]`, so the reply stream is periodic with
/// the pattern's length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    bytes: Bytes,
}

impl Pattern {
    pub fn new(bytes: impl Into<Bytes>) -> Result<Self, PatternError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(PatternError::Empty);
        }
        Ok(Self { bytes })
    }

    /// Build a pattern that spells `text` in the environment's bit encoding.
    pub fn from_text(text: &str) -> Result<Self, PatternError> {
        Self::new(crate::bits::encode(text))
    }

    /// Reply byte for cycle `n`.
    pub fn reply(&self, n: u64) -> u8 {
        let idx = (n % self.bytes.len() as u64) as usize;
        self.bytes[idx]
    }

    /// Number of cycles before the replies repeat.
    pub fn period(&self) -> usize {
        self.bytes.len()
    }

    #[cfg(test)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self {
            bytes: Bytes::from_static(DEFAULT_PATTERN),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.bytes))
    }
}

/// Pattern construction errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    Empty,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::Empty => write!(f, "reply pattern must not be empty"),
        }
    }
}

impl std::error::Error for PatternError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern() {
        let pattern = Pattern::default();
        assert_eq!(pattern.as_bytes(), b"00101110");
        assert_eq!(pattern.period(), 8);
        assert_eq!(pattern.to_string(), "00101110");
    }

    #[test]
    fn test_reply_indexing() {
        let pattern = Pattern::default();
        let replies: Vec<u8> = (0..8).map(|n| pattern.reply(n)).collect();
        assert_eq!(replies, b"00101110");
    }

    #[test]
    fn test_reply_is_periodic() {
        let pattern = Pattern::default();
        for n in 0..64 {
            assert_eq!(pattern.reply(n), pattern.reply(n + 8));
        }
        assert_eq!(pattern.reply(u64::MAX), pattern.as_bytes()[(u64::MAX % 8) as usize]);
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert_eq!(Pattern::new(Vec::<u8>::new()), Err(PatternError::Empty));
        assert_eq!(Pattern::from_text(""), Err(PatternError::Empty));
    }

    #[test]
    fn test_period_follows_length() {
        assert_eq!(Pattern::new(&b"01"[..]).unwrap().period(), 2);
        assert_eq!(Pattern::from_text("ab").unwrap().period(), 16);
    }

    #[test]
    fn test_from_text() {
        let pattern = Pattern::from_text(".").unwrap();
        assert_eq!(pattern, Pattern::default());

        let pattern = Pattern::from_text("a").unwrap();
        assert_eq!(pattern.reply(1), b'1');
        assert_eq!(pattern.reply(7), b'1');
        assert_eq!(pattern.reply(8), b'0');
    }
}
