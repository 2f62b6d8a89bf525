/// Packs bits, most significant bit first, into a byte vector.
#[derive(Debug, Default)]
pub struct BitWriter {
    /// Output buffer holding all complete bytes written so far.
    pub output: Vec<u8>,
    /// Private queue to hold bits that are waiting to be put as bytes into the output buffer.
    queue: u64,
    /// Count of valid bits in the queue.
    q_bits: u8,
}

impl BitWriter {
    /// Create a new BitWriter whose output buffer can hold `size` bytes before growing.
    pub fn new(size: usize) -> Self {
        Self {
            output: Vec::with_capacity(size),
            queue: 0,
            q_bits: 0,
        }
    }

    /// Move complete bytes from the queue to the output buffer once the queue is nearly full.
    fn push_queue(&mut self) {
        if self.q_bits > 56 {
            while self.q_bits > 7 {
                let byte = (self.queue >> (self.q_bits - 8)) as u8;
                self.output.push(byte);
                self.q_bits -= 8;
            }
        }
    }

    /// Put a single bit on the stream.
    pub fn out_bit(&mut self, bit: bool) {
        self.push_queue();
        self.queue <<= 1;
        self.queue |= bit as u64;
        self.q_bits += 1;
    }

    /// Put a sequence of bits on the stream, first element first.
    pub fn out_bits(&mut self, bits: &[bool]) {
        bits.iter().for_each(|&bit| self.out_bit(bit));
    }

    /// Number of bits written so far, including those still queued.
    pub fn bit_len(&self) -> usize {
        self.output.len() * 8 + self.q_bits as usize
    }

    /// Flushes every queued bit to the output buffer, padding the last byte with 0s in the
    /// least significant bits. Returns the number of padding bits added (0-7).
    pub fn flush(&mut self) -> u8 {
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte);
            self.q_bits -= 8;
        }
        let mut padding = 0;
        if self.q_bits > 0 {
            padding = 8 - self.q_bits;
            self.output.push((self.queue << padding) as u8);
            self.q_bits = 0;
        }
        padding
    }

    /// Flush and hand over the packed bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.flush();
        self.output
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.bit_len() / 8, self.bit_len() % 8)
    }
}

#[cfg(test)]
mod test {
    use super::BitWriter;

    /// The bits of a byte, most significant first.
    fn byte_bits(byte: u8) -> Vec<bool> {
        (0..8).rev().map(|i| (byte >> i) & 1 == 1).collect()
    }

    #[test]
    fn whole_byte_test() {
        let mut bw = BitWriter::new(1);
        bw.out_bits(&byte_bits(b'x'));
        bw.flush();
        assert_eq!(bw.output, "x".as_bytes());
    }

    #[test]
    fn out_bits_test() {
        let mut bw = BitWriter::new(2);
        bw.out_bits(&[true, false, true]);
        assert_eq!(bw.loc(), "[0.3]");
        assert_eq!(bw.flush(), 5);
        assert_eq!(bw.output, vec![0b1010_0000]);
    }

    #[test]
    fn mixed_width_test() {
        let mut bw = BitWriter::new(4);
        bw.out_bit(true);
        bw.out_bits(&byte_bits(0xff));
        bw.out_bits(&[false; 7]);
        assert_eq!(bw.bit_len(), 16);
        assert_eq!(bw.flush(), 0);
        assert_eq!(bw.output, vec![0xff, 0x80]);
    }

    #[test]
    fn long_stream_test() {
        // Enough bits to cycle the queue several times
        let mut bw = BitWriter::new(0);
        for i in 0..100_u8 {
            bw.out_bits(&byte_bits(i));
            bw.out_bit(i % 2 == 1);
        }
        let out = bw.into_bytes();
        assert_eq!(out.len(), (100 * 9 + 7) / 8);
        // 00000000 0 00000001 1 00000010 ...
        assert_eq!(out[0], 0);
        assert_eq!(out[1], 0b0000_0000);
        assert_eq!(out[2], 0b1100_0000);
    }

    #[test]
    fn empty_flush_test() {
        let mut bw = BitWriter::new(0);
        assert_eq!(bw.flush(), 0);
        assert!(bw.output.is_empty());
    }
}
