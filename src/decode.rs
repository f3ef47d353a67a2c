/*!
Incremental UTF-8 decoding of byte windows.

The reader uses this to turn whatever the source hands it into text, without
caring where the source split multi-byte characters.
*/

use std::mem;

/// The character that replaces invalid UTF-8.
const REPLACEMENT: char = '\u{FFFD}';

/// An incremental UTF-8 decoder for byte windows.
///
/// A multi-byte sequence split across two windows is held back until the
/// rest of it arrives, so the decoded text does not depend on where the
/// windows were cut. Invalid sequences are replaced with U+FFFD using the
/// substitution of maximal subparts.
#[derive(Clone, Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    /// Create a decoder with nothing pending.
    pub fn new() -> Utf8Decoder {
        Utf8Decoder::default()
    }

    /// Decode `bytes`, appending complete characters to `out`.
    ///
    /// A trailing incomplete sequence is kept until the next call.
    pub fn decode(&mut self, bytes: &[u8], out: &mut String) {
        if self.pending.is_empty() {
            let tail = decode_complete(bytes, out);
            self.pending.extend_from_slice(&bytes[tail..]);
        } else {
            let mut buf = mem::replace(&mut self.pending, vec![]);
            buf.extend_from_slice(bytes);
            let tail = decode_complete(&buf, out);
            self.pending.extend_from_slice(&buf[tail..]);
        }
    }

    /// Flush whatever is pending at the end of the stream.
    ///
    /// Any leftover bytes cannot form a character, so they become U+FFFD.
    pub fn finish(&mut self, out: &mut String) {
        let mut bytes = &self.pending[..];
        while !bytes.is_empty() {
            let (ch, size) = bstr::decode_utf8(bytes);
            out.push(ch.unwrap_or(REPLACEMENT));
            bytes = &bytes[size..];
        }
        self.pending.clear();
    }

    /// Returns true if an incomplete sequence is waiting for more bytes.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Decode `bytes` into `out`, stopping before an invalid sequence that runs
/// into the end of `bytes`. Returns the offset of that tail.
fn decode_complete(bytes: &[u8], out: &mut String) -> usize {
    let mut pos = 0;
    while pos < bytes.len() {
        let (ch, size) = bstr::decode_utf8(&bytes[pos..]);
        match ch {
            Some(ch) => out.push(ch),
            // More bytes might complete it.
            None if pos + size == bytes.len() => return pos,
            None => out.push(REPLACEMENT),
        }
        pos += size;
    }
    pos
}
