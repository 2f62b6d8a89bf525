//! BitReader: reads a packed, most-significant-bit-first bitstream from a byte slice.
//!
//! Every read returns `None` once the data is exhausted, which is how the entropy decoder
//! detects a truncated stream.

const BIT_MASK: u8 = 0xff;

/// Reads bits from an in-memory buffer.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    cursor: usize,
    bit_index: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new BitReader positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            cursor: 0,
            bit_index: 0,
        }
    }

    /// Return bit as Option<usize> (1 or 0), or None if there is no more data to read
    pub fn bit(&mut self) -> Option<usize> {
        let byte = *self.data.get(self.cursor)?;
        let bit = (byte & BIT_MASK >> self.bit_index) >> (7 - self.bit_index);
        self.bit_index += 1;
        if self.bit_index == 8 {
            self.bit_index = 0;
            self.cursor += 1;
        }
        Some(bit as usize)
    }

    /// Return Option<Bool> *true* if the next bit is 1, *false* if 0, consuming the bit,
    /// or None if there is no more data to read
    pub fn bool_bit(&mut self) -> Option<bool> {
        self.bit().map(|bit| bit == 1)
    }

    /// Return Option<usize> of the next n bits, or None if fewer than n bits remain. Nothing
    /// is consumed when the request cannot be satisfied.
    pub fn bint(&mut self, n: usize) -> Option<usize> {
        if n > self.remaining_bits() || n > usize::BITS as usize {
            return None;
        }
        let mut result = 0_usize;
        for _ in 0..n {
            result = result << 1 | self.bit()?;
        }
        Some(result)
    }

    /// Returns a byte as an Option<u8>, or None if there is no more data to read. This is
    /// a convenience function, and calls bint(8).
    pub fn byte(&mut self) -> Option<u8> {
        self.bint(8).map(|byte| byte as u8)
    }

    /// Number of bits not yet read.
    pub fn remaining_bits(&self) -> usize {
        (self.data.len() - self.cursor.min(self.data.len())) * 8 - self.bit_index
    }

    /// Debugging function. Report current position in the buffer.
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.cursor, self.bit_index)
    }
}
