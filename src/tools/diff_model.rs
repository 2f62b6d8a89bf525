/*
The differential model replaces every byte by its difference to the byte before it, so smooth
data (gradients in grayscale images, slowly changing samples) turns into long stretches of
small values and repeated bytes that the RLE and Huffman stages handle well.

All arithmetic wraps at 256, which is what makes the transform exactly reversible.
*/

/// Replace each byte with its difference from the previous original byte (in place).
/// The first byte is taken relative to 0.
pub fn apply_diff_model(data: &mut [u8]) {
    let mut prev = 0_u8;
    for byte in data.iter_mut() {
        let current = *byte;
        *byte = current.wrapping_sub(prev);
        prev = current;
    }
}

/// Undo apply_diff_model (in place) by accumulating the differences.
pub fn revert_diff_model(data: &mut [u8]) {
    let mut prev = 0_u8;
    for byte in data.iter_mut() {
        *byte = byte.wrapping_add(prev);
        prev = *byte;
    }
}
