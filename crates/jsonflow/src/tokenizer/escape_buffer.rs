//! Accumulates the four hexadecimal digits of a `\uXXXX` escape.
//!
//! JSON escapes name UTF-16 code units, so the buffer yields a `u16`; pairing
//! surrogates into a `char` is left to the tokenizer, which may see the two
//! halves of a pair in different chunks.

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct UnicodeEscapeBuffer {
    value: u16,
    len: u8,
}

impl UnicodeEscapeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.value = 0;
        self.len = 0;
    }

    /// Feeds one byte of the escape.
    ///
    /// - Returns `Ok(None)` while fewer than four digits have been seen.
    /// - Returns `Ok(Some(unit))` on the fourth digit and resets the buffer.
    /// - Returns `Err(byte)` if `byte` is not an ASCII hex digit.
    pub fn feed(&mut self, byte: u8) -> Result<Option<u16>, u8> {
        let digit = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            _ => return Err(byte),
        };

        self.value = (self.value << 4) | u16::from(digit);
        self.len += 1;

        if self.len == 4 {
            let unit = self.value;
            self.reset();
            Ok(Some(unit))
        } else {
            Ok(None)
        }
    }
}
