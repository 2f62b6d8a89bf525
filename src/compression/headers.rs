//! The two fixed-layout headers that make a compressed stream self-describing.
//!
//! ```text
//! Huffman header:       [8B byte count][1B flags]
//!                         flags bit 7 = diff model applied
//!                         flags bit 6 = adaptive block RLE applied (else flat RLE)
//! Adaptive RLE header:  [8B width][8B height][8B block size][ceil(blocks/8) B scan directions]
//! ```
//!
//! Integers are little endian. Scan directions are one bit per block, most significant bit
//! first, 1 = horizontal. Unused bits in the last direction byte are written as zero and
//! ignored when reading.

use log::trace;

use crate::bitstream::{bitreader::BitReader, bitwriter::BitWriter};
use crate::error::CodecError;
use crate::tools::adaptive_rle::ScanDir;

/// Size of the Huffman header in bytes.
pub const HUFF_HEADER_LEN: usize = 9;
/// Size of the fixed part of the adaptive RLE header (width, height, block size).
pub const ADAPT_RLE_FIXED_LEN: usize = 24;

const DIFF_MODEL_FLAG: u8 = 0x80;
const ADAPT_RLE_FLAG: u8 = 0x40;

const HUFF: &str = "huffman";
const ADAPT: &str = "adaptive RLE";

/// Read a little endian u64 at `at`. The caller has already checked the length.
fn read_u64(data: &[u8], at: usize) -> u64 {
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&data[at..at + 8]);
    u64::from_le_bytes(bytes)
}

/// Leading header of every compressed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuffHeader {
    /// Number of bytes (symbols) that went into the Huffman coder.
    pub byte_count: u64,
    /// The diff model was applied before RLE.
    pub diff_model: bool,
    /// Adaptive block RLE was used instead of flat RLE.
    pub adaptive_rle: bool,
}

impl HuffHeader {
    pub fn new(byte_count: u64, diff_model: bool, adaptive_rle: bool) -> Self {
        Self {
            byte_count,
            diff_model,
            adaptive_rle,
        }
    }

    /// Serialize the header.
    pub fn to_bytes(&self) -> [u8; HUFF_HEADER_LEN] {
        let mut out = [0_u8; HUFF_HEADER_LEN];
        out[..8].copy_from_slice(&self.byte_count.to_le_bytes());
        if self.diff_model {
            out[8] |= DIFF_MODEL_FLAG;
        }
        if self.adaptive_rle {
            out[8] |= ADAPT_RLE_FLAG;
        }
        out
    }

    /// Parse the header from the start of `data`. Returns the header and the bytes after it.
    pub fn parse(data: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        if data.len() < HUFF_HEADER_LEN {
            return Err(CodecError::malformed(
                HUFF,
                format!("need {} bytes, found {}", HUFF_HEADER_LEN, data.len()),
            ));
        }
        let byte_count = read_u64(data, 0);
        let flags = data[8];
        if flags & !(DIFF_MODEL_FLAG | ADAPT_RLE_FLAG) != 0 {
            return Err(CodecError::malformed(
                HUFF,
                format!("unknown flag bits in {:#010b}", flags),
            ));
        }
        let header = Self::new(
            byte_count,
            flags & DIFF_MODEL_FLAG != 0,
            flags & ADAPT_RLE_FLAG != 0,
        );
        trace!("Parsed {:?}", header);
        Ok((header, &data[HUFF_HEADER_LEN..]))
    }
}

/// Number of blocks covering a width x height matrix, or None on overflow.
/// `block_size` must not be zero.
pub fn block_count(width: u64, height: u64, block_size: u64) -> Option<u64> {
    let across = width / block_size + (width % block_size != 0) as u64;
    let down = height / block_size + (height % block_size != 0) as u64;
    across.checked_mul(down)
}

/// Header written in front of adaptive block RLE data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptRleHeader {
    pub width: u64,
    pub height: u64,
    pub block_size: u64,
    /// Scan direction of every block, in row-major block order.
    pub scan_dirs: Vec<ScanDir>,
}

impl AdaptRleHeader {
    /// Serialize the header.
    pub fn to_bytes(&self) -> Vec<u8> {
        let dir_len = (self.scan_dirs.len() + 7) / 8;
        let mut out = Vec::with_capacity(ADAPT_RLE_FIXED_LEN + dir_len);
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.block_size.to_le_bytes());

        let mut bw = BitWriter::new(dir_len);
        self.scan_dirs
            .iter()
            .for_each(|dir| bw.out_bit(dir.is_horizontal()));
        out.extend(bw.into_bytes());
        out
    }

    /// Serialized size of a header describing `blocks` blocks.
    pub fn encoded_len(blocks: usize) -> usize {
        ADAPT_RLE_FIXED_LEN + (blocks + 7) / 8
    }

    /// Parse the header from the start of `data`. Returns the header and the bytes after it.
    pub fn parse(data: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        if data.len() < ADAPT_RLE_FIXED_LEN {
            return Err(CodecError::malformed(
                ADAPT,
                format!("need {} bytes, found {}", ADAPT_RLE_FIXED_LEN, data.len()),
            ));
        }
        let width = read_u64(data, 0);
        let height = read_u64(data, 8);
        let block_size = read_u64(data, 16);
        if width == 0 || height == 0 {
            return Err(CodecError::malformed(
                ADAPT,
                format!("empty {}x{} matrix", width, height),
            ));
        }
        if block_size == 0 {
            return Err(CodecError::malformed(ADAPT, "block size is zero"));
        }

        // Check the direction bytes are all there before reading them
        let blocks = block_count(width, height, block_size)
            .ok_or_else(|| CodecError::malformed(ADAPT, "block count overflows"))?;
        let dir_len = usize::try_from(blocks / 8 + (blocks % 8 != 0) as u64)
            .map_err(|_| CodecError::malformed(ADAPT, "block count overflows"))?;
        let rest = &data[ADAPT_RLE_FIXED_LEN..];
        if rest.len() < dir_len {
            return Err(CodecError::malformed(
                ADAPT,
                format!(
                    "{} blocks need {} direction bytes, found {}",
                    blocks,
                    dir_len,
                    rest.len()
                ),
            ));
        }

        let mut br = BitReader::new(&rest[..dir_len]);
        let scan_dirs = (0..blocks)
            .map(|_| br.bool_bit().map(ScanDir::from_bit))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| CodecError::malformed(ADAPT, "direction bits ran out"))?;

        let header = Self {
            width,
            height,
            block_size,
            scan_dirs,
        };
        trace!(
            "Parsed adaptive RLE header: {}x{}, block size {}, {} blocks",
            width,
            height,
            block_size,
            blocks
        );
        Ok((header, &rest[dir_len..]))
    }
}
