//! Flate (zlib) stream coder using the flate2 crate.

use crate::error::{PdfError, Result};
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{Read, Write};

/// Compress data with zlib at the default level.
pub fn flateencode(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|()| encoder.finish())
        .map_err(|e| PdfError::EncodeError(format!("flate: {e}")))
}

/// Decompress zlib data.
pub fn flatedecode(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut output = Vec::new();
    decoder
        .read_to_end(&mut output)
        .map_err(|e| PdfError::DecodeError(format!("flate: {e}")))?;
    Ok(output)
}
