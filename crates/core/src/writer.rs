//! Single indirect-object serializer.
//!
//! Produces the classic `N G obj ... endobj` layout for one object,
//! with `stream`/`endstream` framing for stream payloads. The /Length
//! entry is synthesized from the stored byte count; references are
//! written as `N G R` without chasing the graph.

use crate::error::Result;
use crate::model::objects::{PdfObjRef, PdfObject, PdfStream};

/// Serialize one object. With a reference the output is a full
/// indirect object; without one, just the object body.
pub fn serialize_object(reference: Option<PdfObjRef>, object: &PdfObject) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    if let Some(r) = reference {
        out.extend_from_slice(format!("{} {} obj\n", r.objid, r.genno).as_bytes());
    }
    write_object(&mut out, object);
    if reference.is_some() {
        out.extend_from_slice(b"\nendobj\n");
    }
    Ok(out)
}

fn write_object(out: &mut Vec<u8>, object: &PdfObject) {
    match object {
        PdfObject::Null => out.extend_from_slice(b"null"),
        PdfObject::Bool(true) => out.extend_from_slice(b"true"),
        PdfObject::Bool(false) => out.extend_from_slice(b"false"),
        PdfObject::Int(n) => out.extend_from_slice(n.to_string().as_bytes()),
        PdfObject::Real(n) => write_real(out, *n),
        PdfObject::Name(name) => write_name(out, name),
        PdfObject::String(bytes) => write_literal_string(out, bytes),
        PdfObject::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b' ');
                }
                write_object(out, item);
            }
            out.push(b']');
        }
        PdfObject::Dict(dict) => write_dict(out, dict.iter()),
        PdfObject::Stream(stream) => write_stream(out, stream),
        PdfObject::Ref(r) => out.extend_from_slice(format!("{} {} R", r.objid, r.genno).as_bytes()),
    }
}

fn write_real(out: &mut Vec<u8>, value: f64) {
    // Trim a trailing ".0" so integral reals match common writer output.
    let text = format!("{value}");
    out.extend_from_slice(text.strip_suffix(".0").unwrap_or(&text).as_bytes());
}

fn write_name(out: &mut Vec<u8>, name: &str) {
    out.push(b'/');
    for byte in name.bytes() {
        // The delimiter/whitespace set plus '#' itself must be escaped.
        if byte.is_ascii_graphic() && !b"()<>[]{}/%#".contains(&byte) {
            out.push(byte);
        } else {
            out.extend_from_slice(format!("#{byte:02X}").as_bytes());
        }
    }
}

fn write_literal_string(out: &mut Vec<u8>, bytes: &[u8]) {
    out.push(b'(');
    for &byte in bytes {
        match byte {
            b'(' | b')' | b'\\' => {
                out.push(b'\\');
                out.push(byte);
            }
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            0x20..=0x7e => out.push(byte),
            other => out.extend_from_slice(format!("\\{other:03o}").as_bytes()),
        }
    }
    out.push(b')');
}

fn write_dict<'a>(out: &mut Vec<u8>, entries: impl Iterator<Item = (&'a String, &'a PdfObject)>) {
    // Sorted keys keep the output deterministic across runs.
    let mut sorted: Vec<_> = entries.collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    out.extend_from_slice(b"<<");
    for (key, value) in sorted {
        out.push(b' ');
        write_name(out, key);
        out.push(b' ');
        write_object(out, value);
    }
    out.extend_from_slice(b" >>");
}

fn write_stream(out: &mut Vec<u8>, stream: &PdfStream) {
    let raw = stream.raw();
    let mut attrs: Vec<(&String, &PdfObject)> = stream
        .attrs
        .iter()
        .filter(|(key, _)| key.as_str() != "Length")
        .collect();
    let length_key = "Length".to_string();
    let length_value = PdfObject::Int(raw.len() as i64);
    attrs.push((&length_key, &length_value));
    write_dict(out, attrs.into_iter());
    out.extend_from_slice(b"\nstream\n");
    out.extend_from_slice(raw);
    out.extend_from_slice(b"\nendstream");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn body(object: &PdfObject) -> String {
        String::from_utf8_lossy(&serialize_object(None, object).unwrap()).into_owned()
    }

    #[test]
    fn scalars() {
        assert_eq!(body(&PdfObject::Null), "null");
        assert_eq!(body(&PdfObject::Bool(true)), "true");
        assert_eq!(body(&PdfObject::Int(-42)), "-42");
        assert_eq!(body(&PdfObject::Real(0.5)), "0.5");
        assert_eq!(body(&PdfObject::Real(3.0)), "3");
        assert_eq!(body(&PdfObject::Ref(PdfObjRef::new(4, 0))), "4 0 R");
    }

    #[test]
    fn name_escaping() {
        assert_eq!(body(&PdfObject::Name("Type".to_string())), "/Type");
        assert_eq!(
            body(&PdfObject::Name("A B#(C".to_string())),
            "/A#20B#23#28C"
        );
    }

    #[test]
    fn string_escaping() {
        assert_eq!(
            body(&PdfObject::String(b"a(b)\\\n\x01".to_vec())),
            "(a\\(b\\)\\\\\\n\\001)"
        );
    }

    #[test]
    fn arrays_and_dicts() {
        let arr = PdfObject::Array(vec![
            PdfObject::Int(1),
            PdfObject::Name("Fit".to_string()),
            PdfObject::Null,
        ]);
        assert_eq!(body(&arr), "[1 /Fit null]");

        let dict = PdfObject::dict_from([
            ("Type", PdfObject::Name("Annot".to_string())),
            ("F", PdfObject::Int(4)),
        ]);
        assert_eq!(body(&dict), "<< /F 4 /Type /Annot >>");
    }

    #[test]
    fn stream_framing_synthesizes_length() {
        let mut attrs = HashMap::new();
        attrs.insert("Length".to_string(), PdfObject::Int(999)); // stale, must be replaced
        let stream = PdfObject::Stream(Box::new(PdfStream::new(attrs, &b"BT ET"[..])));
        let text = body(&stream);
        assert_eq!(text, "<< /Length 5 >>\nstream\nBT ET\nendstream");
    }

    #[test]
    fn indirect_object_framing() {
        let bytes = serialize_object(Some(PdfObjRef::new(12, 0)), &PdfObject::Int(7)).unwrap();
        assert_eq!(String::from_utf8_lossy(&bytes), "12 0 obj\n7\nendobj\n");
    }
}
