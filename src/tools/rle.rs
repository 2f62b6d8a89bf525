/*
Flat run length encoding.

Logic: Copy the input to the output while counting how many identical bytes in a row have been
written. Once three identical bytes have been written (and more input follows), write one count
byte telling how many further copies of that byte come next (0-255), then start counting from
scratch. A run of n >= 4 bytes therefore becomes three literals plus n - 3, and runs longer
than 258 simply start over with three new literals.

The final byte of the input is never folded into a count. A count is only written when input
remains after the third literal, so the decoder can stop cleanly when the data ends right
after a run of three.

Decoding mirrors this exactly: after three identical bytes the next byte is a count. The
RleDecoder below does this one byte at a time, which lets the adaptive block decoder stop
at block boundaries that do not line up with run boundaries.
*/

/// Number of identical literals after which a count byte follows.
pub const RUN_TRIGGER: usize = 3;
/// Largest number of extra copies a single count byte can describe.
pub const MAX_EXTRA: usize = u8::MAX as usize;

/// Encode runs of three or more identical bytes. Returns the RLE data.
pub fn rle_encode(v: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(v.len() + v.len() / 64 + 1);
    let mut idx = 0;
    // Identical bytes written in a row since the last count byte
    let mut run = 0;
    let mut last = 0_u8;

    while idx < v.len() {
        let byte = v[idx];
        out.push(byte);
        idx += 1;
        run = if run > 0 && byte == last { run + 1 } else { 1 };
        last = byte;

        if run == RUN_TRIGGER && idx < v.len() {
            // Count the copies that follow, leaving the final byte of the input alone
            let limit = (v.len() - 1 - idx).min(MAX_EXTRA);
            let extra = v[idx..idx + limit]
                .iter()
                .take_while(|&&b| b == byte)
                .count();
            out.push(extra as u8);
            idx += extra;
            run = 0;
        }
    }
    out
}

/// Undo rle_encode.
pub fn rle_decode(v: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(v.len() * 2);
    let mut decoder = RleDecoder::new();
    v.iter().for_each(|&byte| decoder.push(byte, &mut out));
    out
}

/// Incremental RLE decoder. Feed it encoded bytes one at a time.
#[derive(Debug, Default, Clone)]
pub struct RleDecoder {
    last: u8,
    run: usize,
}

impl RleDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one input byte, appending whatever it expands to onto `out`.
    pub fn push(&mut self, byte: u8, out: &mut Vec<u8>) {
        if self.run == RUN_TRIGGER {
            out.resize(out.len() + byte as usize, self.last);
            self.run = 0;
            return;
        }
        out.push(byte);
        self.run = if self.run > 0 && byte == self.last {
            self.run + 1
        } else {
            1
        };
        self.last = byte;
    }
}
