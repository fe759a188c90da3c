use std::io::{self, Write};

use memchr::memchr;

/// UTF-8 byte-order mark.
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Output buffer capacity. 512KiB keeps flush syscalls rare while the
/// buffer still fits comfortably in cache.
pub const OUT_BUF_CAP: usize = 512 * 1024;

/// `\r` broadcast into all 8 lanes of a u64.
const CR_LANES: u64 = 0x0D0D_0D0D_0D0D_0D0D;

const LANE_LSB: u64 = 0x0101_0101_0101_0101;
const LANE_MSB: u64 = 0x8080_8080_8080_8080;

/// True if any byte of `x` is zero.
/// Classic SWAR presence test: subtracting 1 per lane borrows into bit 7
/// exactly for lanes that were 0x00, and `& !x` masks out lanes whose
/// own bit 7 was already set. Exact for all inputs, no false positives.
#[inline]
fn has_zero_byte(x: u64) -> bool {
    x.wrapping_sub(LANE_LSB) & !x & LANE_MSB != 0
}

/// True if any of the 8 bytes of `word` is a carriage return.
#[inline]
fn word_has_cr(word: u64) -> bool {
    has_zero_byte(word ^ CR_LANES)
}

/// Drop a leading UTF-8 BOM. Only inputs longer than the mark itself are
/// stripped; a 3-byte input that is exactly the mark passes through.
#[inline]
pub fn strip_bom(data: &[u8]) -> &[u8] {
    if data.len() > UTF8_BOM.len() && data[..3] == UTF8_BOM {
        &data[3..]
    } else {
        data
    }
}

/// Fixed-capacity output buffer that flushes to the destination when a
/// write would overflow it. All destination writes go through
/// `write_all`, so a short write surfaces as an error instead of
/// silently truncating the output.
pub struct OutBuf<W: Write> {
    dst: W,
    buf: Vec<u8>,
    cap: usize,
}

impl<W: Write> OutBuf<W> {
    pub fn new(dst: W) -> Self {
        Self::with_capacity(OUT_BUF_CAP, dst)
    }

    pub fn with_capacity(cap: usize, dst: W) -> Self {
        OutBuf {
            dst,
            buf: Vec::with_capacity(cap),
            cap,
        }
    }

    /// Append `bytes`, flushing first if they would not fit. A request
    /// at least as large as the whole buffer bypasses it and goes
    /// straight to the destination.
    pub fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.buf.len() + bytes.len() > self.cap {
            self.flush()?;
        }
        if bytes.len() >= self.cap {
            return self.dst.write_all(bytes);
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    #[inline]
    fn push(&mut self, byte: u8) -> io::Result<()> {
        if self.buf.len() == self.cap {
            self.flush()?;
        }
        self.buf.push(byte);
        Ok(())
    }

    /// Write out any buffered bytes and reset the buffer.
    pub fn flush(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            self.dst.write_all(&self.buf)?;
            self.buf.clear();
        }
        Ok(())
    }
}

/// Copy bytes one at a time, collapsing `\r\n` pairs into `\n`, until
/// the cursor reaches `stop`. The pair lookahead is bounds-checked
/// against the full buffer, so a `\r` as the very last byte is emitted
/// unchanged, and a pair straddling `stop` is still collapsed (the
/// returned cursor then lands one past `stop`).
fn substitute_until<W: Write>(
    data: &[u8],
    mut i: usize,
    stop: usize,
    out: &mut OutBuf<W>,
) -> io::Result<usize> {
    while i < stop {
        if data[i] == b'\r' && i + 1 < data.len() && data[i + 1] == b'\n' {
            out.push(b'\n')?;
            i += 2;
        } else {
            out.push(data[i])?;
            i += 1;
        }
    }
    Ok(i)
}

/// Convert CRLF line endings in `data` to LF, writing the result to
/// `out`. A leading UTF-8 BOM is dropped. The output is flushed before
/// returning.
///
/// The bulk of the input is scanned 8 bytes at a time: each word is
/// tested for a carriage return with the SWAR mask above and copied
/// verbatim when clean, which is the dominant path for typical text.
/// Flagged words fall back to byte-wise substitution up to the next
/// word boundary; the sub-word tail is always scanned byte-wise.
pub fn convert_bytes(data: &[u8], out: &mut impl Write) -> io::Result<()> {
    let data = strip_bom(data);
    let mut sink = OutBuf::new(&mut *out);

    // No carriage returns anywhere: one bulk copy.
    if memchr(b'\r', data).is_none() {
        sink.write(data)?;
        return sink.flush();
    }

    let trunc = data.len() - data.len() % 8;
    let mut i = 0;

    while i < trunc {
        if i % 8 == 0 {
            // i < trunc and trunc is a multiple of 8, so the full word
            // is in bounds.
            let word = u64::from_ne_bytes(data[i..i + 8].try_into().unwrap());
            if !word_has_cr(word) {
                sink.write(&data[i..i + 8])?;
                i += 8;
                continue;
            }
        }
        // Finish this word byte-wise. A consumed pair may step across
        // the boundary, leaving the cursor unaligned; the next round
        // then substitutes up to the following boundary.
        let stop = (i / 8 + 1) * 8;
        i = substitute_until(data, i, stop, &mut sink)?;
    }

    substitute_until(data, i, data.len(), &mut sink)?;
    sink.flush()
}
