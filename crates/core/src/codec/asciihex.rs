//! ASCIIHex stream coder.

use crate::error::{PdfError, Result};

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Encode data as ASCII hex digits with a trailing '>' EOD marker.
pub fn asciihexencode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() * 2 + 1);
    for byte in data {
        out.push(HEX[(byte >> 4) as usize]);
        out.push(HEX[(byte & 0x0f) as usize]);
    }
    out.push(b'>');
    Ok(out)
}

/// Decode ASCIIHex data.
///
/// Whitespace is skipped, '>' terminates, and an odd trailing digit is
/// padded with zero per the PDF filter rules.
pub fn asciihexdecode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() / 2);
    let mut pending: Option<u8> = None;

    for &byte in data {
        if byte == b'>' {
            break;
        }
        if byte.is_ascii_whitespace() {
            continue;
        }
        let nibble = match byte {
            b'0'..=b'9' => byte - b'0',
            b'a'..=b'f' => byte - b'a' + 10,
            b'A'..=b'F' => byte - b'A' + 10,
            other => {
                return Err(PdfError::DecodeError(format!(
                    "asciihex: invalid digit {other:#04x}"
                )));
            }
        };
        match pending.take() {
            Some(high) => out.push((high << 4) | nibble),
            None => pending = Some(nibble),
        }
    }

    if let Some(high) = pending {
        out.push(high << 4);
    }

    Ok(out)
}
