//! Error kinds reported by the codec.
//!
//! Every fallible stage returns a `CodecError`. None of these conditions is transient, so
//! nothing in the library retries or recovers from them. Turning them into messages and exit
//! codes is left to the caller (see `main.rs`).

use thiserror::Error;

/// Structural and data-integrity faults found while compressing or decompressing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A header is shorter than its fixed layout or declares impossible values.
    #[error("malformed {header} header: {reason}")]
    MalformedHeader {
        /// Which header failed to parse.
        header: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// The entropy decoder ran out of bits before the declared symbol count was reached.
    #[error("corrupt bitstream: data ran out at symbol {decoded} of {expected}")]
    CorruptBitstream {
        /// Index of the symbol that could not be completed.
        decoded: u64,
        /// Symbol count declared by the header.
        expected: u64,
    },

    /// Input length does not fit the requested matrix, or the matrix is too small.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Input ran out in the middle of a block.
    #[error("truncated data in block {block}: needed {needed} bytes, decoded {decoded}")]
    TruncatedBlockData {
        block: usize,
        needed: usize,
        decoded: usize,
    },

    /// A run count expanded past the end of its block.
    #[error("run overflows block {block}: block holds {needed} bytes, run produced {produced}")]
    BlockOverrun {
        block: usize,
        needed: usize,
        produced: usize,
    },

    /// Bytes remain after everything the headers describe has been decoded.
    #[error("{0} trailing bytes after the end of the encoded data")]
    TrailingData(usize),
}

impl CodecError {
    /// Shorthand used by the header parsers.
    pub(crate) fn malformed<S: Into<String>>(header: &'static str, reason: S) -> Self {
        CodecError::MalformedHeader {
            header,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::CodecError;

    #[test]
    fn display_test() {
        let err = CodecError::CorruptBitstream {
            decoded: 7,
            expected: 10,
        };
        assert_eq!(
            err.to_string(),
            "corrupt bitstream: data ran out at symbol 7 of 10"
        );
        let err = CodecError::malformed("huffman", "need 9 bytes, found 3");
        assert_eq!(
            err.to_string(),
            "malformed huffman header: need 9 bytes, found 3"
        );
    }
}
