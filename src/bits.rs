//! Bit codec used by the environment.
//!
//! The environment talks one bit per step. Characters travel as their code
//! point written in binary, zero-padded to 8 digits, most significant bit
//! first. Eight zero bits stand for silence and decode to a space.

/// Character produced when a silence byte is decoded.
pub const SILENCE_TOKEN: char = ' ';

/// Encode text into ASCII `'0'`/`'1'` digits, 8 per character.
///
/// Code points above 0xFF keep all of their digits, so they take more than
/// 8 positions. The environment only uses ASCII in practice.
pub fn encode(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 8);
    for c in text.chars() {
        out.extend_from_slice(format!("{:08b}", c as u32).as_bytes());
    }
    out
}

/// Accumulates observed bits and yields a character for every 8 of them.
#[derive(Debug, Default)]
pub struct BitDecoder {
    value: u8,
    filled: u8,
}

impl BitDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one observed message.
    ///
    /// Anything other than a single `'0'` or `'1'` resets the partial byte.
    pub fn push(&mut self, message: &[u8]) -> Option<char> {
        let bit = match message {
            b"0" => 0,
            b"1" => 1,
            _ => {
                self.reset();
                return None;
            }
        };

        self.value = (self.value << 1) | bit;
        self.filled += 1;

        if self.filled < 8 {
            return None;
        }

        let value = self.value;
        self.reset();
        if value == 0 {
            Some(SILENCE_TOKEN)
        } else {
            Some(char::from(value))
        }
    }

    /// Number of bits buffered toward the next character.
    #[cfg(test)]
    pub fn pending(&self) -> u8 {
        self.filled
    }

    fn reset(&mut self) {
        self.value = 0;
        self.filled = 0;
    }
}
