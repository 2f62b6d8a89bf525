//! The bitstream module is the bit-level I/O layer of the codec.
//!
//! The adaptive Huffman coder produces codes of arbitrary length (a degenerate tree can be a
//! few hundred levels deep), so codes are handled as bit sequences and packed here, most
//! significant bit first. The same packing is used for the scan direction field of the
//! adaptive RLE header.
//!
//! Both halves work on in-memory buffers only. Reading or writing files is left to the caller.
//!
pub mod bitreader;
pub mod bitwriter;
