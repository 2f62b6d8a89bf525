//! Codec options - the settings that control how data is compressed.
//!
//! Decompression needs no options: everything it needs is recorded in the headers.

/// Default matrix width, suited to 512 pixel wide 8-bit grayscale images.
pub const DEFAULT_WIDTH: u64 = 512;
/// Smallest (and first) block size tried by the adaptive block search.
pub const MIN_BLOCK_SIZE: usize = 8;
/// How many times the adaptive block search doubles the block size at most.
pub const MAX_DOUBLINGS: usize = 5;

/// Bounds of the adaptive RLE block size search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSearch {
    /// First block size tried. Also the smallest matrix dimension accepted.
    pub initial_block_size: usize,
    /// Maximum number of times the block size is doubled after the first try.
    pub max_doublings: usize,
}

impl BlockSearch {
    /// Instantiated with the standard search bounds
    pub fn new() -> Self {
        Self {
            initial_block_size: MIN_BLOCK_SIZE,
            max_doublings: MAX_DOUBLINGS,
        }
    }
}

impl Default for BlockSearch {
    fn default() -> Self {
        Self::new()
    }
}

/// Defines all settings that control compression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressOptions {
    /// Replace bytes by their difference to the previous byte before RLE
    pub use_diff_model: bool,
    /// Use adaptive block RLE on a 2D matrix instead of flat RLE
    pub use_adaptive_rle: bool,
    /// Width of the 2D matrix (only used by adaptive block RLE)
    pub matrix_width: u64,
    /// Block size search bounds for adaptive block RLE
    pub block_search: BlockSearch,
}

impl CompressOptions {
    /// Default settings: flat RLE, no diff model, 512 wide matrix
    pub fn new() -> Self {
        Self {
            use_diff_model: false,
            use_adaptive_rle: false,
            matrix_width: DEFAULT_WIDTH,
            block_search: BlockSearch::new(),
        }
    }
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self::new()
    }
}
