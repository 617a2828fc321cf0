//! RunLength stream coder.
//!
//! Format:
//! - Length byte 0-127: copy next (length + 1) bytes literally
//! - Length byte 128: end of data (EOD marker)
//! - Length byte 129-255: repeat next byte (257 - length) times

use crate::error::Result;

/// Encode data as RunLength with a trailing EOD marker.
///
/// Runs of three or more identical bytes become repeat sequences;
/// everything else is emitted as literal runs of up to 128 bytes.
pub fn rlencode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];
        let mut run = 1;
        while i + run < data.len() && data[i + run] == byte && run < 128 {
            run += 1;
        }

        if run >= 3 {
            out.push((257 - run) as u8);
            out.push(byte);
            i += run;
            continue;
        }

        // Literal run: scan forward until a 3-byte repeat starts or we
        // hit the 128-byte literal limit.
        let start = i;
        let mut end = i + 1;
        while end < data.len() && end - start < 128 {
            if end + 2 < data.len() && data[end] == data[end + 1] && data[end] == data[end + 2] {
                break;
            }
            end += 1;
        }
        out.push((end - start - 1) as u8);
        out.extend_from_slice(&data[start..end]);
        i = end;
    }

    out.push(128); // EOD
    Ok(out)
}

/// Decode RunLength-encoded data.
///
/// Truncated input is tolerated: if the stream ends mid-sequence,
/// decoding stops without error.
pub fn rldecode(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let length = data[i];
        i += 1;

        match length {
            128 => break, // EOD
            0..=127 => {
                let count = length as usize + 1;
                if i + count <= data.len() {
                    result.extend_from_slice(&data[i..i + count]);
                    i += count;
                }
            }
            129..=255 => {
                if i < data.len() {
                    let count = 257 - length as usize;
                    let byte = data[i];
                    i += 1;
                    result.extend(std::iter::repeat_n(byte, count));
                }
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_mixed() {
        let data = b"aaaaaaabcdefgggggggggggghij";
        let encoded = rlencode(data).unwrap();
        assert_eq!(rldecode(&encoded).unwrap(), data.to_vec());
    }

    #[test]
    fn round_trip_long_literal() {
        let data: Vec<u8> = (0..=255u8).collect();
        let encoded = rlencode(&data).unwrap();
        assert_eq!(rldecode(&encoded).unwrap(), data);
    }

    #[test]
    fn round_trip_long_run() {
        let data = vec![0x42u8; 500];
        let encoded = rlencode(&data).unwrap();
        assert!(encoded.len() < data.len());
        assert_eq!(rldecode(&encoded).unwrap(), data);
    }

    #[test]
    fn decode_stops_at_eod() {
        let encoded = [1u8, b'h', b'i', 128, 0, b'x'];
        assert_eq!(rldecode(&encoded).unwrap(), b"hi".to_vec());
    }

    #[test]
    fn decode_tolerates_truncation() {
        assert_eq!(rldecode(&[200u8]).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn empty_input() {
        let encoded = rlencode(b"").unwrap();
        assert_eq!(encoded, vec![128]);
        assert_eq!(rldecode(&encoded).unwrap(), Vec::<u8>::new());
    }
}
