//! Lossless byte compressor.
//!
//! Data goes through up to three stages:
//! - an optional diff model, replacing each byte by its difference to the previous one,
//! - run length encoding, either flat over the byte sequence or adaptive over a 2D matrix
//!   cut into blocks (suited to 8-bit grayscale images),
//! - adaptive Huffman coding (FGK), which needs no code table in the output.
//!
//! The compressed stream is self-describing, so decompression takes no options.
//!
//! Basic usage to compress a 512 pixel wide raw image is as follows:
//!
//! `$> huff_codec -c -m -a -w 512 -i image.raw -o image.huf`
//!
//! and to get it back:
//!
//! `$> huff_codec -d -i image.huf -o image.raw`
//!
pub mod bitstream;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use compression::{compress::compress, decompress::decompress};
pub use error::CodecError;
pub use tools::options::{BlockSearch, CompressOptions};
