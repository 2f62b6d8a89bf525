//! The tools module provides the byte transforms and settings used by the codec.
//!
//! The tools are:
//! - adaptive_rle: Block based RLE over a 2D matrix, with per block scan direction and a
//!   searched block size.
//! - cli: Command line interface of the huff_codec binary.
//! - diff_model: Reversible delta transform applied before RLE.
//! - options: Compression settings.
//! - rle: Flat run length encoding and its incremental decoder.
//!
pub mod adaptive_rle;
pub mod cli;
pub mod diff_model;
pub mod options;
pub mod rle;
