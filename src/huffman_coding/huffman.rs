use log::{debug, trace};

use super::fgk_tree::FgkTree;
use crate::bitstream::{bitreader::BitReader, bitwriter::BitWriter};
use crate::error::CodecError;

/// Encode a byte sequence with a fresh adaptive Huffman tree. The last byte is padded with
/// zero bits.
pub fn huf_encode(data: &[u8]) -> Vec<u8> {
    let mut tree = FgkTree::new();
    // Most data shrinks, so the input size is a good first guess
    let mut bw = BitWriter::new(data.len());
    for &symbol in data {
        bw.out_bits(&tree.encode(symbol));
        tree.update(symbol);
    }
    trace!(
        "Huffman encoded {} bytes, ending at {} with {} tree nodes",
        data.len(),
        bw.loc(),
        tree.len()
    );
    bw.into_bytes()
}

/// Decode `count` symbols from an adaptive Huffman bitstream.
///
/// Fails with `CorruptBitstream` if the bits run out before `count` symbols are decoded, and
/// with `TrailingData` if a whole byte or more is left over afterwards.
pub fn huf_decode(bits: &[u8], count: u64) -> Result<Vec<u8>, CodecError> {
    let mut tree = FgkTree::new();
    let mut br = BitReader::new(bits);

    // Every symbol takes at least one bit, so the count in a corrupt header can't make us
    // allocate more than the input could ever hold.
    let capacity = usize::try_from(count)
        .unwrap_or(usize::MAX)
        .min(br.remaining_bits());
    let mut out = Vec::with_capacity(capacity);

    for decoded in 0..count {
        match tree.decode(&mut br) {
            Some(symbol) => {
                tree.update(symbol);
                out.push(symbol);
            }
            None => {
                debug!(
                    "Bitstream ran out at {} after {} of {} symbols",
                    br.loc(),
                    decoded,
                    count
                );
                trace!("Tree at failure:\n{}", tree);
                return Err(CodecError::CorruptBitstream {
                    decoded,
                    expected: count,
                });
            }
        }
    }

    let left = br.remaining_bits();
    if left >= 8 {
        debug!("{} bits left after the last symbol", left);
        return Err(CodecError::TrailingData(left / 8));
    }
    Ok(out)
}
