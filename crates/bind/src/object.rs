//! Generic object wrapper: keyed access and stream compression over a
//! single registered handle.

use crate::diag::DiagLevel;
use crate::error::{BindError, Result};
use crate::registry::{
    ConstructionIntent, Ctx, HandleId, HandleKind, Ownership, SharedObject, WrapperHandle,
};
use std::cell::OnceCell;
use std::rc::Rc;
use vellum_core::codec::Filter;
use vellum_core::{writer, PdfObjRef, PdfObject};

/// A host-visible view of one PDF object. Owns a registry handle and
/// releases it on drop; all reads clone out, all writes go through the
/// registry so aliasing handles observe them.
pub struct ObjectWrapper {
    ctx: Ctx,
    id: HandleId,
    type_tag: OnceCell<&'static str>,
}

impl std::fmt::Debug for ObjectWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectWrapper")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl ObjectWrapper {
    /// Wrap an entity owned outside the registry.
    pub fn from_external(ctx: &Ctx, entity: SharedObject) -> Result<Self> {
        Self::with_intent(
            ctx,
            ConstructionIntent::FromExternal {
                kind: HandleKind::Object,
                entity,
            },
        )
    }

    /// Copy a plain value into a private registry-owned copy.
    pub fn copy_of(ctx: &Ctx, value: PdfObject) -> Result<Self> {
        Self::with_intent(
            ctx,
            ConstructionIntent::CopyOf {
                kind: HandleKind::Object,
                value,
            },
        )
    }

    /// Borrow a vault-resident indirect object. The vault keeps
    /// ownership; dropping the wrapper never removes the object.
    pub fn from_reference(ctx: &Ctx, reference: PdfObjRef) -> Result<Self> {
        let id = ctx
            .borrow_mut()
            .adopt_indirect(HandleKind::Object, reference)?;
        Ok(Self::attach(Rc::clone(ctx), id))
    }

    pub(crate) fn with_intent(ctx: &Ctx, intent: ConstructionIntent) -> Result<Self> {
        let id = ctx.borrow_mut().resolve(intent)?;
        Ok(Self::attach(Rc::clone(ctx), id))
    }

    pub(crate) fn attach(ctx: Ctx, id: HandleId) -> Self {
        Self {
            ctx,
            id,
            type_tag: OnceCell::new(),
        }
    }

    pub fn ctx(&self) -> &Ctx {
        &self.ctx
    }

    pub const fn id(&self) -> HandleId {
        self.id
    }

    pub fn ownership(&self) -> Result<Ownership> {
        self.ctx.borrow().ownership_of(self.id)
    }

    /// The indirect reference behind this wrapper, when vault-resident.
    pub fn reference(&self) -> Option<PdfObjRef> {
        self.ctx.borrow().reference_of(self.id).ok().flatten()
    }

    /// The object's type tag, resolved once and cached for the life of
    /// the wrapper.
    pub fn type_tag(&self) -> Result<&'static str> {
        if let Some(tag) = self.type_tag.get() {
            return Ok(*tag);
        }
        let tag = self.ctx.borrow().value(self.id)?.type_name();
        Ok(*self.type_tag.get_or_init(|| tag))
    }

    /// Clone the backing value out.
    pub fn value(&self) -> Result<PdfObject> {
        self.ctx.borrow().value(self.id)
    }

    pub fn has_stream(&self) -> Result<bool> {
        Ok(self.value()?.has_stream())
    }

    /// Keyed lookup, cloning the entry out. Absent keys are `Ok(None)`.
    pub fn get_key(&self, key: &str) -> Result<Option<PdfObject>> {
        Ok(self.value()?.get_key(key)?.cloned())
    }

    pub fn set_key(&self, key: &str, value: PdfObject) -> Result<()> {
        self.ctx
            .borrow_mut()
            .mutate(self.id, |obj| Ok(obj.set_key(key, value)?))
    }

    pub fn remove_key(&self, key: &str) -> Result<Option<PdfObject>> {
        self.ctx
            .borrow_mut()
            .mutate(self.id, |obj| Ok(obj.remove_key(key)?))
    }

    /// Manufacture a parent-bounded wrapper over the value at `key`.
    /// Absent keys are `Ok(None)`.
    pub fn child(&self, key: &str) -> Result<Option<Self>> {
        if self.get_key(key)?.is_none() {
            return Ok(None);
        }
        let id = self
            .ctx
            .borrow_mut()
            .adopt_child(self.id, HandleKind::Object, &[key])?;
        Ok(Some(Self::attach(Rc::clone(&self.ctx), id)))
    }

    /// Flate-compress the stream payload in place and record the
    /// filter. Fails on non-stream objects without touching them.
    pub fn flate_compress_stream(&self) -> Result<()> {
        let value = self.value()?;
        if !value.has_stream() {
            return Err(BindError::TypeMismatch {
                expected: "stream",
                got: value.type_name(),
            });
        }
        let raw = value.as_stream()?.raw().to_vec();
        let encoded = Filter::FlateDecode.encode(&raw)?;
        let length = encoded.len();
        self.ctx.borrow_mut().mutate(self.id, move |obj| {
            let stream = obj.as_stream_mut()?;
            stream.set_raw(encoded);
            stream.set("Filter", PdfObject::Name("FlateDecode".to_string()));
            stream.set("Length", PdfObject::Int(length as i64));
            Ok(())
        })?;
        self.ctx.borrow().diag().event(
            DiagLevel::Debug,
            "object",
            &format!("flate compressed stream: {raw_len} -> {length}", raw_len = raw.len()),
        );
        Ok(())
    }

    /// Serialize as a single object, with `N G obj` framing when the
    /// backing entity is vault-resident.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let value = self.value()?;
        Ok(writer::serialize_object(self.reference(), &value)?)
    }

    /// Serialize to a file on the calling thread.
    pub fn write_sync(&self, path: &str) -> Result<()> {
        let bytes = self.serialize()?;
        std::fs::write(path, bytes).map_err(|e| BindError::Serialization(format!("{path}: {e}")))
    }
}

impl WrapperHandle for ObjectWrapper {
    fn kind(&self) -> HandleKind {
        HandleKind::Object
    }

    fn handle_id(&self) -> HandleId {
        self.id
    }
}

impl Drop for ObjectWrapper {
    fn drop(&mut self) {
        if let Ok(mut registry) = self.ctx.try_borrow_mut() {
            registry.release(self.id);
        }
    }
}
