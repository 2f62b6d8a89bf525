//! The compression module chains the codec stages into complete streams.
//!
//! Compression happens in the following steps:
//! - Diff model (optional): turn each byte into its difference to the previous byte.
//! - Run length encoding: flat RLE over the byte sequence, or adaptive block RLE over the
//!   data seen as a 2D matrix (per block scan direction, searched block size).
//! - Adaptive Huffman coding: FGK coding of the RLE output.
//!
//! The stream starts with a 9 byte header giving the number of Huffman coded bytes and which
//! optional stages ran. Decompression reads that header and undoes the steps in reverse.
//!

pub mod compress;
pub mod decompress;
pub mod headers;
