//! PDF object types.
//!
//! The fundamental value type crossing the engine/binding boundary:
//! names, numbers, strings, arrays, dictionaries, streams, and
//! indirect references.

use crate::error::{PdfError, Result};
use bytes::Bytes;
use std::collections::HashMap;

/// PDF object - the fundamental value type in PDF.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfObject {
    /// Null object
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Real (floating point) value
    Real(f64),
    /// Name object (e.g., /Type, /Subtype)
    Name(String),
    /// String (byte array)
    String(Vec<u8>),
    /// Array of objects
    Array(Vec<Self>),
    /// Dictionary (name -> object mapping)
    Dict(HashMap<String, Self>),
    /// Stream (dictionary attributes + binary payload)
    Stream(Box<PdfStream>),
    /// Indirect object reference
    Ref(PdfObjRef),
}

impl PdfObject {
    /// Build a dictionary object from key/value pairs.
    pub fn dict_from(entries: impl IntoIterator<Item = (&'static str, Self)>) -> Self {
        Self::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn as_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            _ => Err(self.type_error("bool")),
        }
    }

    pub const fn as_int(&self) -> Result<i64> {
        match self {
            Self::Int(n) => Ok(*n),
            _ => Err(self.type_error("int")),
        }
    }

    pub const fn as_real(&self) -> Result<f64> {
        match self {
            Self::Real(n) => Ok(*n),
            _ => Err(self.type_error("real")),
        }
    }

    /// Numeric value with int coerced to f64 (the one sanctioned coercion).
    pub const fn as_num(&self) -> Result<f64> {
        match self {
            Self::Int(n) => Ok(*n as f64),
            Self::Real(n) => Ok(*n),
            _ => Err(self.type_error("number")),
        }
    }

    pub fn as_name(&self) -> Result<&str> {
        match self {
            Self::Name(s) => Ok(s),
            _ => Err(self.type_error("name")),
        }
    }

    pub fn as_string(&self) -> Result<&[u8]> {
        match self {
            Self::String(s) => Ok(s),
            _ => Err(self.type_error("string")),
        }
    }

    pub const fn as_array(&self) -> Result<&Vec<Self>> {
        match self {
            Self::Array(arr) => Ok(arr),
            _ => Err(self.type_error("array")),
        }
    }

    pub const fn as_dict(&self) -> Result<&HashMap<String, Self>> {
        match self {
            Self::Dict(d) => Ok(d),
            _ => Err(self.type_error("dict")),
        }
    }

    pub fn as_dict_mut(&mut self) -> Result<&mut HashMap<String, Self>> {
        let got = self.type_name();
        match self {
            Self::Dict(d) => Ok(d),
            _ => Err(PdfError::TypeError {
                expected: "dict",
                got,
            }),
        }
    }

    pub fn as_stream(&self) -> Result<&PdfStream> {
        match self {
            Self::Stream(s) => Ok(s),
            _ => Err(self.type_error("stream")),
        }
    }

    pub fn as_stream_mut(&mut self) -> Result<&mut PdfStream> {
        let got = self.type_name();
        match self {
            Self::Stream(s) => Ok(s),
            _ => Err(PdfError::TypeError {
                expected: "stream",
                got,
            }),
        }
    }

    pub const fn as_reference(&self) -> Result<PdfObjRef> {
        match self {
            Self::Ref(r) => Ok(*r),
            _ => Err(self.type_error("ref")),
        }
    }

    /// Keyed lookup on dictionaries and stream attribute dictionaries.
    pub fn get_key(&self, key: &str) -> Result<Option<&Self>> {
        match self {
            Self::Dict(d) => Ok(d.get(key)),
            Self::Stream(s) => Ok(s.get(key)),
            _ => Err(self.type_error("dict")),
        }
    }

    /// Keyed insert on dictionaries and stream attribute dictionaries.
    pub fn set_key(&mut self, key: &str, value: Self) -> Result<()> {
        match self {
            Self::Dict(d) => {
                d.insert(key.to_string(), value);
                Ok(())
            }
            Self::Stream(s) => {
                s.set(key, value);
                Ok(())
            }
            _ => Err(self.type_error("dict")),
        }
    }

    /// Keyed removal on dictionaries and stream attribute dictionaries.
    pub fn remove_key(&mut self, key: &str) -> Result<Option<Self>> {
        match self {
            Self::Dict(d) => Ok(d.remove(key)),
            Self::Stream(s) => Ok(s.attrs.remove(key)),
            _ => Err(self.type_error("dict")),
        }
    }

    pub const fn has_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Type tag used for diagnostics and cached by object wrappers.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Real(_) => "real",
            Self::Name(_) => "name",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Dict(_) => "dict",
            Self::Stream(_) => "stream",
            Self::Ref(_) => "ref",
        }
    }

    const fn type_error(&self, expected: &'static str) -> PdfError {
        PdfError::TypeError {
            expected,
            got: self.type_name(),
        }
    }
}

/// PDF indirect object reference: (object number, generation number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PdfObjRef {
    pub objid: u32,
    pub genno: u32,
}

impl PdfObjRef {
    pub const fn new(objid: u32, genno: u32) -> Self {
        Self { objid, genno }
    }
}

impl std::fmt::Display for PdfObjRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} R", self.objid, self.genno)
    }
}

/// PDF stream - dictionary attributes + binary payload.
///
/// The payload here is whatever the writer stored, possibly already
/// passed through an encode filter chain; the chain is recorded under
/// the /Filter attribute. Append sessions and filter selection are the
/// binding layer's business, not this type's.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PdfStream {
    /// Stream dictionary attributes.
    pub attrs: HashMap<String, PdfObject>,
    /// Stored (possibly encoded) payload.
    raw: Bytes,
}

impl PdfStream {
    pub fn new(attrs: HashMap<String, PdfObject>, raw: impl Into<Bytes>) -> Self {
        Self {
            attrs,
            raw: raw.into(),
        }
    }

    /// Stored payload, undecoded.
    pub fn raw(&self) -> &[u8] {
        self.raw.as_ref()
    }

    /// Stored payload as shared bytes.
    pub fn raw_bytes(&self) -> Bytes {
        self.raw.clone()
    }

    /// Stored byte count.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Replace the stored payload.
    pub fn set_raw(&mut self, data: impl Into<Bytes>) {
        self.raw = data.into();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&PdfObject> {
        self.attrs.get(name)
    }

    pub fn set(&mut self, name: &str, value: PdfObject) {
        self.attrs.insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors_report_expected_and_got() {
        let obj = PdfObject::Name("Type1".to_string());
        let err = obj.as_int().unwrap_err();
        match err {
            PdfError::TypeError { expected, got } => {
                assert_eq!(expected, "int");
                assert_eq!(got, "name");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn as_num_coerces_int_to_f64() {
        assert_eq!(PdfObject::Int(3).as_num().unwrap(), 3.0);
        assert_eq!(PdfObject::Real(0.5).as_num().unwrap(), 0.5);
        assert!(PdfObject::Null.as_num().is_err());
    }

    #[test]
    fn keyed_access_works_on_dicts_and_streams() {
        let mut dict = PdfObject::dict_from([("Type", PdfObject::Name("Annot".to_string()))]);
        assert!(dict.get_key("Type").unwrap().is_some());
        dict.set_key("F", PdfObject::Int(4)).unwrap();
        assert_eq!(dict.get_key("F").unwrap().unwrap().as_int().unwrap(), 4);

        let mut stream = PdfObject::Stream(Box::new(PdfStream::new(HashMap::new(), &b"abc"[..])));
        stream.set_key("Length", PdfObject::Int(3)).unwrap();
        assert!(stream.get_key("Length").unwrap().is_some());
        assert!(stream.has_stream());

        let mut arr = PdfObject::Array(vec![]);
        assert!(arr.set_key("X", PdfObject::Null).is_err());
    }

    #[test]
    fn stream_payload_replacement() {
        let mut s = PdfStream::default();
        assert!(s.is_empty());
        s.set_raw(b"hello".to_vec());
        assert_eq!(s.raw(), b"hello");
        assert_eq!(s.len(), 5);
    }
}
