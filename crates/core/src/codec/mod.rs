//! Codec modules for PDF stream filters.
//!
//! This module contains:
//! - `flate`: Flate (zlib) compression
//! - `lzw`: LZW compression
//! - `runlength`: Run-length coding
//! - `asciihex`: ASCIIHex coding
//!
//! Every filter is reversible: `decode(encode(x)) == x`. Chains encode
//! in listed order and decode in reverse.

pub mod asciihex;
pub mod flate;
pub mod lzw;
pub mod runlength;

use crate::error::{PdfError, Result};

pub use asciihex::{asciihexdecode, asciihexencode};
pub use flate::{flatedecode, flateencode};
pub use lzw::{lzwdecode, lzwencode};
pub use runlength::{rldecode, rlencode};

/// Named stream filters recognized by the pipeline.
///
/// Closed set; anything else is an `UnknownFilter` error at the
/// boundary rather than a silent pass-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    FlateDecode,
    LZWDecode,
    RunLengthDecode,
    ASCIIHexDecode,
}

impl Filter {
    /// The /Filter name this transform is recorded under.
    pub const fn name(self) -> &'static str {
        match self {
            Self::FlateDecode => "FlateDecode",
            Self::LZWDecode => "LZWDecode",
            Self::RunLengthDecode => "RunLengthDecode",
            Self::ASCIIHexDecode => "ASCIIHexDecode",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "FlateDecode" | "Fl" => Ok(Self::FlateDecode),
            "LZWDecode" | "LZW" => Ok(Self::LZWDecode),
            "RunLengthDecode" | "RL" => Ok(Self::RunLengthDecode),
            "ASCIIHexDecode" | "AHx" => Ok(Self::ASCIIHexDecode),
            other => Err(PdfError::UnknownFilter(other.to_string())),
        }
    }

    /// Apply the encode direction of this filter.
    pub fn encode(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::FlateDecode => flateencode(data),
            Self::LZWDecode => lzwencode(data),
            Self::RunLengthDecode => rlencode(data),
            Self::ASCIIHexDecode => asciihexencode(data),
        }
    }

    /// Apply the decode direction of this filter.
    pub fn decode(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::FlateDecode => flatedecode(data),
            Self::LZWDecode => lzwdecode(data),
            Self::RunLengthDecode => rldecode(data),
            Self::ASCIIHexDecode => asciihexdecode(data),
        }
    }
}

/// Encode `data` through `chain` in listed order.
pub fn encode_chain(chain: &[Filter], data: &[u8]) -> Result<Vec<u8>> {
    let mut out = data.to_vec();
    for filter in chain {
        out = filter.encode(&out)?;
    }
    Ok(out)
}

/// Decode `data` through `chain` in reverse of the encode order.
pub fn decode_chain(chain: &[Filter], data: &[u8]) -> Result<Vec<u8>> {
    let mut out = data.to_vec();
    for filter in chain.iter().rev() {
        out = filter.decode(&out)?;
    }
    Ok(out)
}
