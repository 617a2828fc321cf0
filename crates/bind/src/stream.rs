//! Stream controller: the append-session state machine over one stream
//! object.
//!
//! A controller is either idle or appending. While appending, writes
//! accumulate in a staged plaintext buffer and the backing object is
//! untouched; ending the session encodes the buffer through the session
//! filter chain and commits payload, /Filter, and /Length in one step.
//! Reads of the committed payload work in either representation, but
//! serialization handoff is refused mid-session.

use crate::diag::{DiagLevel, DiagSink};
use crate::error::{BindError, Result};
use crate::object::ObjectWrapper;
use crate::registry::{HandleId, HandleKind, WrapperHandle};
use std::collections::HashMap;
use std::sync::Arc;
use vellum_core::codec::{decode_chain, encode_chain, Filter};
use vellum_core::{PdfObjRef, PdfObject, PdfStream};

/// Controller state. All transitions are explicit: `begin_append` is
/// the only way in, `end_append` the only way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    Idle,
    Appending,
}

impl StreamMode {
    const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Appending => "appending",
        }
    }
}

/// Options for opening an append session.
pub struct AppendOptions {
    /// Discard the existing payload instead of staging its decoded
    /// form as the starting point.
    pub clear_existing: bool,
    /// Filter chain to encode with at commit. `None` reuses the chain
    /// retained from a previous session, if any.
    pub filters: Option<Vec<Filter>>,
    /// Dispose of the session chain at commit. When false the
    /// controller retains it as the default for later sessions.
    pub delete_filters_after: bool,
}

impl Default for AppendOptions {
    fn default() -> Self {
        Self {
            clear_existing: true,
            filters: None,
            delete_filters_after: true,
        }
    }
}

/// Immutable capture of a committed stream, safe to move to a worker
/// thread. Holds no handles.
#[derive(Debug, Clone)]
pub struct StreamSnapshot {
    pub reference: Option<PdfObjRef>,
    pub attrs: HashMap<String, PdfObject>,
    pub raw: Vec<u8>,
}

/// Append-session state machine over one stream object.
pub struct StreamController {
    obj: ObjectWrapper,
    mode: StreamMode,
    staged: Vec<u8>,
    session_chain: Vec<Filter>,
    delete_filters_after: bool,
    default_chain: Vec<Filter>,
    sink: Arc<dyn DiagSink>,
}

impl StreamController {
    /// Take control of a stream object. Non-stream objects are refused.
    pub fn new(obj: ObjectWrapper) -> Result<Self> {
        let value = obj.value()?;
        if !value.has_stream() {
            return Err(BindError::TypeMismatch {
                expected: "stream",
                got: value.type_name(),
            });
        }
        let sink = obj.ctx().borrow().diag();
        Ok(Self {
            obj,
            mode: StreamMode::Idle,
            staged: Vec::new(),
            session_chain: Vec::new(),
            delete_filters_after: true,
            default_chain: Vec::new(),
            sink,
        })
    }

    pub const fn object(&self) -> &ObjectWrapper {
        &self.obj
    }

    pub const fn mode(&self) -> StreamMode {
        self.mode
    }

    pub const fn is_appending(&self) -> bool {
        matches!(self.mode, StreamMode::Appending)
    }

    /// Open an append session. At most one session may be active per
    /// backing entity, across however many controllers alias it.
    pub fn begin_append(&mut self, options: AppendOptions) -> Result<()> {
        if self.is_appending() {
            return Err(self.state_error("beginAppend"));
        }
        self.obj
            .ctx()
            .borrow_mut()
            .begin_append_session(self.obj.id())?;
        let staged = if options.clear_existing {
            Vec::new()
        } else {
            match self.get_copy(true) {
                Ok(existing) => existing,
                Err(e) => {
                    self.obj
                        .ctx()
                        .borrow_mut()
                        .end_append_session(self.obj.id());
                    return Err(e);
                }
            }
        };
        self.staged = staged;
        self.session_chain = options
            .filters
            .unwrap_or_else(|| self.default_chain.clone());
        self.delete_filters_after = options.delete_filters_after;
        self.mode = StreamMode::Appending;
        self.sink.event(
            DiagLevel::Debug,
            "stream",
            &format!(
                "append session opened, staged {} bytes, chain {:?}",
                self.staged.len(),
                self.session_chain
            ),
        );
        Ok(())
    }

    /// Stage bytes. Valid only while appending.
    pub fn append(&mut self, data: &[u8]) -> Result<()> {
        if !self.is_appending() {
            return Err(self.state_error("append"));
        }
        self.staged.extend_from_slice(data);
        Ok(())
    }

    /// Stage UTF-8 text.
    pub fn append_str(&mut self, text: &str) -> Result<()> {
        self.append(text.as_bytes())
    }

    /// Replace the staged buffer wholesale. Valid only while appending.
    pub fn set(&mut self, data: &[u8]) -> Result<()> {
        if !self.is_appending() {
            return Err(self.state_error("set"));
        }
        self.staged.clear();
        self.staged.extend_from_slice(data);
        Ok(())
    }

    /// Commit: encode the staged buffer through the session chain and
    /// write payload, /Filter, and /Length to the backing object. On
    /// encode failure nothing is committed and the session stays open.
    pub fn end_append(&mut self) -> Result<()> {
        if !self.is_appending() {
            return Err(self.state_error("endAppend"));
        }
        let encoded = encode_chain(&self.session_chain, &self.staged)?;
        let chain = self.session_chain.clone();
        let length = encoded.len();
        self.obj.ctx().borrow_mut().mutate(self.obj.id(), |obj| {
            let stream = obj.as_stream_mut()?;
            stream.set_raw(encoded);
            stream.set("Length", PdfObject::Int(length as i64));
            match filter_attr(&chain) {
                Some(attr) => stream.set("Filter", attr),
                None => {
                    stream.attrs.remove("Filter");
                }
            }
            Ok(())
        })?;
        self.obj
            .ctx()
            .borrow_mut()
            .end_append_session(self.obj.id());
        if self.delete_filters_after {
            self.session_chain.clear();
        } else {
            self.default_chain = std::mem::take(&mut self.session_chain);
        }
        let staged = self.staged.len();
        self.staged.clear();
        self.mode = StreamMode::Idle;
        self.sink.event(
            DiagLevel::Debug,
            "stream",
            &format!("append session committed, {staged} -> {length} bytes"),
        );
        Ok(())
    }

    /// Committed payload byte count (post-filter, as stored).
    pub fn len(&self) -> Result<usize> {
        let value = self.obj.value()?;
        Ok(value.as_stream()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Copy the committed payload out. With `filtered` the recorded
    /// /Filter chain is decoded in reverse; without it the stored
    /// bytes come back as-is. Works in either mode, always reading the
    /// committed representation.
    pub fn get_copy(&self, filtered: bool) -> Result<Vec<u8>> {
        let value = self.obj.value()?;
        let stream = value.as_stream()?;
        let raw = stream.raw().to_vec();
        if !filtered {
            return Ok(raw);
        }
        let chain = recorded_chain(stream)?;
        Ok(decode_chain(&chain, &raw)?)
    }

    /// Capture the committed stream for serialization handoff. Refused
    /// mid-session: staged bytes never leak into a snapshot.
    pub fn freeze(&self) -> Result<StreamSnapshot> {
        if self.is_appending() {
            return Err(self.state_error("write"));
        }
        let value = self.obj.value()?;
        let stream = value.as_stream()?;
        Ok(StreamSnapshot {
            reference: self.obj.reference(),
            attrs: stream.attrs.clone(),
            raw: stream.raw().to_vec(),
        })
    }

    const fn state_error(&self, operation: &'static str) -> BindError {
        BindError::InvalidState {
            operation,
            state: self.mode.name(),
        }
    }
}

impl WrapperHandle for StreamController {
    fn kind(&self) -> HandleKind {
        HandleKind::Stream
    }

    fn handle_id(&self) -> HandleId {
        self.obj.id()
    }
}

impl Drop for StreamController {
    fn drop(&mut self) {
        // An abandoned session must not wedge the entity's append slot.
        if self.is_appending() {
            if let Ok(mut registry) = self.obj.ctx().try_borrow_mut() {
                registry.end_append_session(self.obj.id());
            }
        }
    }
}

/// The /Filter attribute value for a chain: absent for none, a name
/// for one, an array for several.
fn filter_attr(chain: &[Filter]) -> Option<PdfObject> {
    match chain {
        [] => None,
        [single] => Some(PdfObject::Name(single.name().to_string())),
        several => Some(PdfObject::Array(
            several
                .iter()
                .map(|f| PdfObject::Name(f.name().to_string()))
                .collect(),
        )),
    }
}

/// Read the filter chain recorded under /Filter.
fn recorded_chain(stream: &PdfStream) -> Result<Vec<Filter>> {
    let Some(attr) = stream.get("Filter") else {
        return Ok(Vec::new());
    };
    match attr {
        PdfObject::Name(name) => Ok(vec![Filter::from_name(name)?]),
        PdfObject::Array(items) => items
            .iter()
            .map(|item| Ok(Filter::from_name(item.as_name()?)?))
            .collect(),
        other => Err(BindError::TypeMismatch {
            expected: "name or array",
            got: other.type_name(),
        }),
    }
}
