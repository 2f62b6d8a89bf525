use log::{debug, info};

use super::headers::HuffHeader;
use crate::error::CodecError;
use crate::huffman_coding::huffman::huf_decode;
use crate::tools::{adaptive_rle::adapt_rle_decode, diff_model::revert_diff_model, rle::rle_decode};

/// Decompress a stream produced by `compress`. Everything needed is read from the headers.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let (header, body) = HuffHeader::parse(data)?;
    debug!(
        "Stream holds {} Huffman coded bytes (diff model: {}, adaptive RLE: {})",
        header.byte_count, header.diff_model, header.adaptive_rle
    );

    let rle = huf_decode(body, header.byte_count)?;

    let mut out = if header.adaptive_rle {
        adapt_rle_decode(&rle)?
    } else {
        rle_decode(&rle)
    };
    debug!("RLE: {} -> {} bytes", rle.len(), out.len());

    if header.diff_model {
        revert_diff_model(&mut out);
    }

    info!("Decompressed {} bytes into {} bytes", data.len(), out.len());
    Ok(out)
}
