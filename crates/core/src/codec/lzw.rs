//! LZW stream coder using the weezl crate (PDF variant: MSB first, 8-bit).

use crate::error::{PdfError, Result};
use weezl::{BitOrder, decode::Decoder, encode::Encoder};

/// Encode data as LZW.
pub fn lzwencode(data: &[u8]) -> Result<Vec<u8>> {
    Encoder::new(BitOrder::Msb, 8)
        .encode(data)
        .map_err(|e| PdfError::EncodeError(format!("lzw: {e}")))
}

/// Decode LZW-encoded data.
pub fn lzwdecode(data: &[u8]) -> Result<Vec<u8>> {
    Decoder::new(BitOrder::Msb, 8)
        .decode(data)
        .map_err(|e| PdfError::DecodeError(format!("lzw: {e}")))
}
