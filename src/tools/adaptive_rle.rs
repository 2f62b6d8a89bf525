/*
Adaptive block RLE treats the input as a 2D matrix (an 8-bit grayscale image, say) and cuts
it into square blocks. Each block is run length encoded twice, once scanned row by row and
once column by column, and the shorter result is kept. The block size itself is searched:
starting at the initial size, it is doubled a bounded number of times (or until it no longer
fits the matrix) and the size giving the smallest total output wins.

Every candidate size and every block is independent of the others, so the search runs on
rayon. The reduction is keyed on (length, block size) and blocks are collected in order, so
the output is the same as a sequential search would give: ties prefer horizontal scans and
the smaller block size.

Blocks at the right and bottom edges are clipped to the matrix, never padded.
*/

use log::{debug, info};
use rayon::prelude::*;

use super::options::BlockSearch;
use super::rle::{rle_encode, RleDecoder};
use crate::compression::headers::AdaptRleHeader;
use crate::error::CodecError;

/// Most decoded bytes a single encoded byte can account for (3 literals and a count of 255
/// make 258 bytes out of 4). Used to reject headers that promise more than the data can hold.
const MAX_EXPANSION: usize = 65;

/// Order in which the bytes of a block are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDir {
    /// Row by row (row-major). Recorded as a 1 bit.
    Horizontal,
    /// Column by column (column-major). Recorded as a 0 bit.
    Vertical,
}

impl ScanDir {
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            ScanDir::Horizontal
        } else {
            ScanDir::Vertical
        }
    }

    pub fn is_horizontal(self) -> bool {
        self == ScanDir::Horizontal
    }
}

/// An axis-aligned tile of the matrix, already clipped to the matrix edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Block {
    /// Number of bytes in the block.
    pub(crate) fn len(&self) -> usize {
        self.width * self.height
    }
}

/// A flat row-major byte buffer viewed as a width x height matrix.
#[derive(Debug, Clone, Copy)]
pub struct Matrix<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> Matrix<'a> {
    /// View `data` as rows of `width` bytes. The length must be a multiple of the width.
    pub fn new(data: &'a [u8], width: usize) -> Result<Self, CodecError> {
        if width == 0 {
            return Err(CodecError::InvalidDimensions(
                "matrix width is zero".to_string(),
            ));
        }
        if data.len() % width != 0 {
            return Err(CodecError::InvalidDimensions(format!(
                "{} bytes do not divide into rows of {}",
                data.len(),
                width
            )));
        }
        Ok(Self {
            data,
            width,
            height: data.len() / width,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Collect the bytes of `block` in the given scan order.
    pub fn scan(&self, block: &Block, dir: ScanDir) -> Vec<u8> {
        let mut out = Vec::with_capacity(block.len());
        match dir {
            ScanDir::Horizontal => {
                for row in block.y..block.y + block.height {
                    let start = row * self.width + block.x;
                    out.extend_from_slice(&self.data[start..start + block.width]);
                }
            }
            ScanDir::Vertical => {
                for col in block.x..block.x + block.width {
                    for row in block.y..block.y + block.height {
                        out.push(self.data[row * self.width + col]);
                    }
                }
            }
        }
        out
    }
}

/// Write bytes produced by Matrix::scan back into their place in a row-major buffer.
fn scatter(out: &mut [u8], width: usize, block: &Block, dir: ScanDir, bytes: &[u8]) {
    match dir {
        ScanDir::Horizontal => {
            for (r, row) in bytes.chunks(block.width).enumerate() {
                let start = (block.y + r) * width + block.x;
                out[start..start + block.width].copy_from_slice(row);
            }
        }
        ScanDir::Vertical => {
            for (c, col) in bytes.chunks(block.height).enumerate() {
                for (r, &byte) in col.iter().enumerate() {
                    out[(block.y + r) * width + block.x + c] = byte;
                }
            }
        }
    }
}

/// Cut a width x height matrix into blocks of `block_size`, in row-major block order.
pub fn block_layout(width: usize, height: usize, block_size: usize) -> Vec<Block> {
    (0..height)
        .step_by(block_size)
        .flat_map(|y| {
            (0..width).step_by(block_size).map(move |x| Block {
                x,
                y,
                width: block_size.min(width - x),
                height: block_size.min(height - y),
            })
        })
        .collect()
}

/// Block sizes tried by the search: the initial size, doubled up to max_doublings times,
/// stopping before a size exceeds either matrix dimension.
pub fn candidate_sizes(width: usize, height: usize, search: &BlockSearch) -> Vec<usize> {
    let mut sizes = Vec::with_capacity(search.max_doublings + 1);
    let mut size = search.initial_block_size;
    while size <= width && size <= height && sizes.len() <= search.max_doublings {
        sizes.push(size);
        size = match size.checked_mul(2) {
            Some(next) => next,
            None => break,
        };
    }
    sizes
}

/// RLE one block both ways and keep the shorter result (ties go to horizontal).
fn encode_block(matrix: &Matrix<'_>, block: &Block) -> (ScanDir, Vec<u8>) {
    let horizontal = rle_encode(&matrix.scan(block, ScanDir::Horizontal));
    let vertical = rle_encode(&matrix.scan(block, ScanDir::Vertical));
    if vertical.len() < horizontal.len() {
        (ScanDir::Vertical, vertical)
    } else {
        (ScanDir::Horizontal, horizontal)
    }
}

/// Full adaptive RLE output (header and block data) for one block size.
pub fn encode_with_block_size(matrix: &Matrix<'_>, block_size: usize) -> Vec<u8> {
    let blocks = block_layout(matrix.width, matrix.height, block_size);
    let encoded: Vec<(ScanDir, Vec<u8>)> = blocks
        .par_iter()
        .map(|block| encode_block(matrix, block))
        .collect();

    let header = AdaptRleHeader {
        width: matrix.width as u64,
        height: matrix.height as u64,
        block_size: block_size as u64,
        scan_dirs: encoded.iter().map(|(dir, _)| *dir).collect(),
    };
    let data_len: usize = encoded.iter().map(|(_, data)| data.len()).sum();
    let mut out = Vec::with_capacity(AdaptRleHeader::encoded_len(blocks.len()) + data_len);
    out.extend(header.to_bytes());
    encoded
        .iter()
        .for_each(|(_, data)| out.extend_from_slice(data));
    out
}

/// Adaptive block RLE of `data` viewed as a matrix `width` bytes wide. Tries every candidate
/// block size and returns the smallest encoding.
pub fn adapt_rle_encode(
    data: &[u8],
    width: usize,
    search: &BlockSearch,
) -> Result<Vec<u8>, CodecError> {
    if search.initial_block_size == 0 {
        return Err(CodecError::InvalidDimensions(
            "initial block size is zero".to_string(),
        ));
    }
    let matrix = Matrix::new(data, width)?;
    if matrix.width < search.initial_block_size || matrix.height < search.initial_block_size {
        return Err(CodecError::InvalidDimensions(format!(
            "{}x{} matrix is smaller than the {}x{} minimum block",
            matrix.width, matrix.height, search.initial_block_size, search.initial_block_size
        )));
    }

    let sizes = candidate_sizes(matrix.width, matrix.height, search);
    debug!("Trying block sizes {:?}", sizes);
    let best = sizes
        .par_iter()
        .map(|&block_size| {
            let encoded = encode_with_block_size(&matrix, block_size);
            debug!(
                "Block size {} encodes to {} bytes",
                block_size,
                encoded.len()
            );
            (block_size, encoded)
        })
        .min_by_key(|(block_size, encoded)| (encoded.len(), *block_size));

    match best {
        Some((block_size, encoded)) => {
            info!(
                "Adaptive RLE: {}x{} matrix, block size {}, {} -> {} bytes",
                matrix.width,
                matrix.height,
                block_size,
                data.len(),
                encoded.len()
            );
            Ok(encoded)
        }
        None => Err(CodecError::InvalidDimensions(format!(
            "no block size fits a {}x{} matrix",
            matrix.width, matrix.height
        ))),
    }
}

/// Convert a header field to usize, reporting a malformed header if it does not fit.
fn header_usize(value: u64, what: &str) -> Result<usize, CodecError> {
    usize::try_from(value).map_err(|_| {
        CodecError::malformed("adaptive RLE", format!("{} {} is too large", what, value))
    })
}

/// Undo adapt_rle_encode.
pub fn adapt_rle_decode(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let (header, body) = AdaptRleHeader::parse(data)?;
    let width = header_usize(header.width, "width")?;
    let height = header_usize(header.height, "height")?;
    let block_size = header_usize(header.block_size, "block size")?;

    let pixels = width.checked_mul(height).ok_or_else(|| {
        CodecError::malformed("adaptive RLE", format!("{}x{} matrix overflows", width, height))
    })?;
    if pixels > body.len().saturating_mul(MAX_EXPANSION) {
        return Err(CodecError::malformed(
            "adaptive RLE",
            format!(
                "{}x{} matrix cannot be encoded in {} bytes",
                width,
                height,
                body.len()
            ),
        ));
    }

    let mut out = vec![0_u8; pixels];
    let mut buf = Vec::with_capacity(block_size.saturating_mul(block_size).min(pixels));
    let mut pos = 0;
    let layout = block_layout(width, height, block_size);

    for (i, (block, &dir)) in layout.iter().zip(header.scan_dirs.iter()).enumerate() {
        let needed = block.len();
        let mut decoder = RleDecoder::new();
        buf.clear();

        // Block boundaries do not line up with runs, so feed the decoder a byte at a time
        while buf.len() < needed {
            let byte = match body.get(pos) {
                Some(&byte) => byte,
                None => {
                    return Err(CodecError::TruncatedBlockData {
                        block: i,
                        needed,
                        decoded: buf.len(),
                    })
                }
            };
            pos += 1;
            decoder.push(byte, &mut buf);
        }
        if buf.len() > needed {
            return Err(CodecError::BlockOverrun {
                block: i,
                needed,
                produced: buf.len(),
            });
        }
        scatter(&mut out, width, block, dir, &buf);
    }

    if pos < body.len() {
        return Err(CodecError::TrailingData(body.len() - pos));
    }
    debug!(
        "Adaptive RLE decoded {} blocks into {} bytes",
        layout.len(),
        out.len()
    );
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    /// Smooth test image with some noise, like a photo.
    fn test_image(width: usize, height: usize, seed: u64) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..width * height)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                let base = ((x / 5 + y / 3) * 9) as u8;
                if rng.gen_ratio(1, 10) {
                    base.wrapping_add(rng.gen_range(0..4))
                } else {
                    base
                }
            })
            .collect()
    }

    fn chosen_header(encoded: &[u8]) -> AdaptRleHeader {
        AdaptRleHeader::parse(encoded).unwrap().0
    }

    #[test]
    fn too_small_matrix_test() {
        let search = BlockSearch::default();
        // 7x7 is below the 8x8 minimum
        assert!(matches!(
            adapt_rle_encode(&[0; 49], 7, &search),
            Err(CodecError::InvalidDimensions(_))
        ));
        // 64x4 is too short
        assert!(matches!(
            adapt_rle_encode(&[0; 256], 64, &search),
            Err(CodecError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn width_must_divide_length_test() {
        let search = BlockSearch::default();
        assert!(matches!(
            adapt_rle_encode(&[0; 100], 8, &search),
            Err(CodecError::InvalidDimensions(_))
        ));
        assert!(matches!(
            adapt_rle_encode(&[0; 64], 0, &search),
            Err(CodecError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn candidate_sizes_test() {
        let search = BlockSearch::default();
        // Exactly one block: one candidate only
        assert_eq!(candidate_sizes(8, 8, &search), vec![8]);
        assert_eq!(candidate_sizes(64, 64, &search), vec![8, 16, 32, 64]);
        assert_eq!(candidate_sizes(16, 1000, &search), vec![8, 16]);
        // Bounded by the number of doublings
        assert_eq!(
            candidate_sizes(1024, 1024, &search),
            vec![8, 16, 32, 64, 128, 256]
        );
        let search = BlockSearch {
            initial_block_size: 8,
            max_doublings: 0,
        };
        assert_eq!(candidate_sizes(1024, 1024, &search), vec![8]);
    }

    #[test]
    fn block_layout_test() {
        let layout = block_layout(20, 10, 8);
        assert_eq!(layout.len(), 6);
        assert_eq!(
            layout[0],
            Block {
                x: 0,
                y: 0,
                width: 8,
                height: 8
            }
        );
        assert_eq!(
            layout[2],
            Block {
                x: 16,
                y: 0,
                width: 4,
                height: 8
            }
        );
        assert_eq!(
            layout[5],
            Block {
                x: 16,
                y: 8,
                width: 4,
                height: 2
            }
        );
        assert_eq!(layout.iter().map(|b| b.len()).sum::<usize>(), 200);
    }

    #[test]
    fn scan_and_scatter_test() {
        let data: Vec<u8> = (0..12).collect();
        let matrix = Matrix::new(&data, 4).unwrap();
        let block = Block {
            x: 1,
            y: 0,
            width: 2,
            height: 3,
        };
        let h = matrix.scan(&block, ScanDir::Horizontal);
        let v = matrix.scan(&block, ScanDir::Vertical);
        assert_eq!(h, vec![1, 2, 5, 6, 9, 10]);
        assert_eq!(v, vec![1, 5, 9, 2, 6, 10]);

        let mut out = vec![0; 12];
        scatter(&mut out, 4, &block, ScanDir::Vertical, &v);
        assert_eq!(out, vec![0, 1, 2, 0, 0, 5, 6, 0, 0, 9, 10, 0]);
        let mut out2 = vec![0; 12];
        scatter(&mut out2, 4, &block, ScanDir::Horizontal, &h);
        assert_eq!(out, out2);
    }

    #[test]
    fn single_uniform_block_test() {
        let data = vec![77_u8; 64];
        let encoded = adapt_rle_encode(&data, 8, &BlockSearch::default()).unwrap();
        let header = chosen_header(&encoded);
        assert_eq!((header.width, header.height, header.block_size), (8, 8, 8));
        assert_eq!(header.scan_dirs, vec![ScanDir::Horizontal]);
        // Header, one direction byte, then 3 literals, a count and the final literal
        assert_eq!(&encoded[24..], &[0b1000_0000, 77, 77, 77, 60, 77]);
        assert_eq!(adapt_rle_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn vertical_stripes_test() {
        // Every column is constant, every row is all different
        let data: Vec<u8> = (0..16 * 16).map(|i| ((i % 16) * 13) as u8).collect();
        let search = BlockSearch {
            initial_block_size: 8,
            max_doublings: 0,
        };
        let encoded = adapt_rle_encode(&data, 16, &search).unwrap();
        let header = chosen_header(&encoded);
        assert_eq!(header.scan_dirs, vec![ScanDir::Vertical; 4]);
        assert_eq!(adapt_rle_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn uniform_data_prefers_large_blocks_test() {
        let data = vec![3_u8; 64 * 64];
        let encoded = adapt_rle_encode(&data, 64, &BlockSearch::default()).unwrap();
        assert_eq!(chosen_header(&encoded).block_size, 64);
        assert_eq!(adapt_rle_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn search_is_deterministic_test() {
        let data = test_image(48, 40, 3);
        let search = BlockSearch::default();
        let first = adapt_rle_encode(&data, 48, &search).unwrap();
        let second = adapt_rle_encode(&data, 48, &search).unwrap();
        assert_eq!(first, second);
        // And no candidate beats the one picked
        let matrix = Matrix::new(&data, 48).unwrap();
        for size in candidate_sizes(48, 40, &search) {
            assert!(encode_with_block_size(&matrix, size).len() >= first.len());
        }
    }

    #[test]
    fn clipped_edges_round_trip_test() {
        for (width, height, seed) in [(37, 23, 1), (8, 100, 2), (100, 9, 3), (64, 64, 4)] {
            let data = test_image(width, height, seed);
            let encoded = adapt_rle_encode(&data, width, &BlockSearch::default()).unwrap();
            assert_eq!(adapt_rle_decode(&encoded).unwrap(), data, "{}x{}", width, height);
        }
    }

    #[test]
    fn random_round_trip_test() {
        let mut rng = StdRng::seed_from_u64(99);
        let data: Vec<u8> = (0..40 * 24).map(|_| rng.gen_range(0..3)).collect();
        let encoded = adapt_rle_encode(&data, 40, &BlockSearch::default()).unwrap();
        assert_eq!(adapt_rle_decode(&encoded).unwrap(), data);
    }

    #[test]
    fn truncated_block_data_test() {
        let data = test_image(32, 32, 5);
        let encoded = adapt_rle_encode(&data, 32, &BlockSearch::default()).unwrap();
        let result = adapt_rle_decode(&encoded[..encoded.len() - 1]);
        assert!(matches!(
            result,
            Err(CodecError::TruncatedBlockData { .. })
        ));
    }

    #[test]
    fn trailing_data_test() {
        let data = test_image(16, 16, 6);
        let mut encoded = adapt_rle_encode(&data, 16, &BlockSearch::default()).unwrap();
        encoded.extend_from_slice(&[1, 2]);
        assert_eq!(adapt_rle_decode(&encoded), Err(CodecError::TrailingData(2)));
    }

    #[test]
    fn run_past_block_end_test() {
        let mut encoded = AdaptRleHeader {
            width: 8,
            height: 8,
            block_size: 8,
            scan_dirs: vec![ScanDir::Horizontal],
        }
        .to_bytes();
        encoded.extend_from_slice(&[1, 1, 1, 255]);
        assert_eq!(
            adapt_rle_decode(&encoded),
            Err(CodecError::BlockOverrun {
                block: 0,
                needed: 64,
                produced: 258
            })
        );
    }

    #[test]
    fn oversized_header_test() {
        let mut encoded = AdaptRleHeader {
            width: 1000,
            height: 1000,
            block_size: 1000,
            scan_dirs: vec![ScanDir::Horizontal],
        }
        .to_bytes();
        encoded.extend_from_slice(&[1, 2, 3]);
        assert!(matches!(
            adapt_rle_decode(&encoded),
            Err(CodecError::MalformedHeader { .. })
        ));
    }
}
