//! The huffman_coding module holds the entropy coder of the codec: adaptive Huffman coding
//! following the FGK (Faller, Gallager, Knuth) algorithm.
//!
//! No code table is stored in the output. Encoder and decoder start from the same tree (a
//! single NYT node) and update it identically after every symbol, so the decoder rebuilds the
//! codes as it goes. Symbols seen for the first time are sent as the NYT code plus 8 raw bits.
//!
//! Coding is inherently sequential: every symbol depends on the tree left by the previous one.

pub mod fgk_tree;
pub mod huffman;
