use log::{debug, info};

use super::headers::{HuffHeader, HUFF_HEADER_LEN};
use crate::error::CodecError;
use crate::huffman_coding::huffman::huf_encode;
use crate::tools::{
    adaptive_rle::adapt_rle_encode, diff_model::apply_diff_model, options::CompressOptions,
    rle::rle_encode,
};

/*
    Compression runs in three stages over the whole input:

    - Diff model (optional): replace each byte by its difference to the previous one.
    - RLE: either flat RLE over the byte sequence, or adaptive block RLE over the data viewed
      as a matrix of opts.matrix_width columns.
    - Adaptive Huffman coding of the RLE output.

    The Huffman header in front records which stages ran and how many bytes went into the
    Huffman coder, so decompression needs no options.
*/

/// Compress `data` as described by `opts`. Returns the complete compressed stream.
pub fn compress(data: &[u8], opts: &CompressOptions) -> Result<Vec<u8>, CodecError> {
    let mut buf = data.to_vec();
    if opts.use_diff_model {
        apply_diff_model(&mut buf);
        debug!("Applied the diff model to {} bytes", buf.len());
    }

    let rle = if opts.use_adaptive_rle {
        let width = usize::try_from(opts.matrix_width).map_err(|_| {
            CodecError::InvalidDimensions(format!("width {} is too large", opts.matrix_width))
        })?;
        adapt_rle_encode(&buf, width, &opts.block_search)?
    } else {
        rle_encode(&buf)
    };
    debug!("RLE: {} -> {} bytes", buf.len(), rle.len());

    let header = HuffHeader::new(rle.len() as u64, opts.use_diff_model, opts.use_adaptive_rle);
    let bits = huf_encode(&rle);

    let mut out = Vec::with_capacity(HUFF_HEADER_LEN + bits.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend(bits);

    info!(
        "Compressed {} bytes into {} bytes ({:.1}%)",
        data.len(),
        out.len(),
        if data.is_empty() {
            100.0
        } else {
            out.len() as f64 * 100.0 / data.len() as f64
        }
    );
    Ok(out)
}
