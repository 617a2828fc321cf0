//! Form XObject wrapper: reusable content fragments with their own
//! bounding box and resource dictionary.

use crate::error::{BindError, Result};
use crate::object::ObjectWrapper;
use crate::registry::{ConstructionIntent, Ctx, HandleId, HandleKind, SharedObject, WrapperHandle};
use crate::stream::StreamController;
use crate::values::Rect;
use std::rc::Rc;
use vellum_core::PdfObjRef;

/// A form XObject. Derived construction allocates a fresh form stream
/// in the document's vault; external construction wraps an existing
/// entity without taking ownership.
pub struct XObject {
    obj: ObjectWrapper,
}

impl XObject {
    /// Create a fresh form XObject with the given bounding box. The
    /// entity lives in the vault and is freed when the wrapper drops.
    pub fn new(ctx: &Ctx, bounds: Rect) -> Result<Self> {
        let obj = ObjectWrapper::with_intent(
            ctx,
            ConstructionIntent::Derived {
                kind: HandleKind::XObject,
                bounds,
            },
        )?;
        Ok(Self { obj })
    }

    /// Wrap an externally owned form XObject entity.
    pub fn from_external(ctx: &Ctx, entity: SharedObject) -> Result<Self> {
        let obj = ObjectWrapper::with_intent(
            ctx,
            ConstructionIntent::FromExternal {
                kind: HandleKind::XObject,
                entity,
            },
        )?;
        Ok(Self { obj })
    }

    /// Wrap a vault-resident form XObject by reference, borrowed.
    pub fn from_reference(ctx: &Ctx, reference: PdfObjRef) -> Result<Self> {
        let id = ctx
            .borrow_mut()
            .adopt_indirect(HandleKind::XObject, reference)?;
        Ok(Self {
            obj: ObjectWrapper::attach(Rc::clone(ctx), id),
        })
    }

    pub const fn object(&self) -> &ObjectWrapper {
        &self.obj
    }

    pub fn reference(&self) -> Option<PdfObjRef> {
        self.obj.reference()
    }

    /// The content object itself, as a parent-bounded alias. The form's
    /// drawing operators live in its own stream payload.
    pub fn contents(&self) -> Result<ObjectWrapper> {
        let id = self
            .obj
            .ctx()
            .borrow_mut()
            .adopt_child(self.obj.id(), HandleKind::Stream, &[])?;
        Ok(ObjectWrapper::attach(Rc::clone(self.obj.ctx()), id))
    }

    /// A controller over the form's content stream, ready for an
    /// append session.
    pub fn contents_for_appending(&self) -> Result<StreamController> {
        StreamController::new(self.contents()?)
    }

    /// The /Resources dictionary, as a parent-bounded wrapper.
    pub fn resources(&self) -> Result<Option<ObjectWrapper>> {
        if self.obj.get_key("Resources")?.is_none() {
            return Ok(None);
        }
        let id = self.obj.ctx().borrow_mut().adopt_child(
            self.obj.id(),
            HandleKind::Object,
            &["Resources"],
        )?;
        Ok(Some(ObjectWrapper::attach(Rc::clone(self.obj.ctx()), id)))
    }

    /// The bounding box recorded under /BBox.
    pub fn bounding_box(&self) -> Result<Rect> {
        match self.obj.get_key("BBox")? {
            Some(value) => Rect::from_array(&value),
            None => Err(BindError::TypeMismatch {
                expected: "rect array of 4 numbers",
                got: "null",
            }),
        }
    }
}

impl WrapperHandle for XObject {
    fn kind(&self) -> HandleKind {
        HandleKind::XObject
    }

    fn handle_id(&self) -> HandleId {
        self.obj.id()
    }
}
