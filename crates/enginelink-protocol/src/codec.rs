//! Gzip and base64 primitives used by the envelope format.

use std::io::{self, Read, Write};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::error::DecompressError;

/// Smallest output buffer the decoder starts with.
pub const MIN_DECOMPRESS_BUFFER: usize = 32 * 1024;

/// Gzip-compresses `data` at the fastest level.
pub fn compress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 2), Compression::fast());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Inflates a gzip stream whose size is unknown up front.
///
/// The output buffer starts at `max(2 * input, 32 KiB)` and doubles
/// whenever it fills, never growing past `max_size`. A stream that
/// still has bytes left once the cap is reached fails with
/// [`DecompressError::LimitExceeded`].
pub fn decompress(data: &[u8], max_size: usize) -> Result<Vec<u8>, DecompressError> {
    let mut decoder = GzDecoder::new(data);
    let mut out = vec![0u8; initial_buffer(data.len(), max_size)];
    let mut filled = 0;

    loop {
        if filled == out.len() {
            if out.len() >= max_size {
                let mut probe = [0u8; 1];
                if read_some(&mut decoder, &mut probe)? == 0 {
                    break;
                }
                return Err(DecompressError::LimitExceeded { limit: max_size });
            }
            let grown = out.len().saturating_mul(2).clamp(1, max_size);
            tracing::trace!(from = out.len(), to = grown, "growing decompression buffer");
            out.resize(grown, 0);
        }

        match read_some(&mut decoder, &mut out[filled..])? {
            0 => break,
            n => filled += n,
        }
    }

    out.truncate(filled);
    Ok(out)
}

fn initial_buffer(input_len: usize, max_size: usize) -> usize {
    input_len
        .saturating_mul(2)
        .max(MIN_DECOMPRESS_BUFFER)
        .min(max_size)
}

fn read_some(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

/// Standard-alphabet, padded base64.
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn decode_base64(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(text)
}
