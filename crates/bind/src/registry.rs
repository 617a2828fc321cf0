//! Handle registry: ownership and lifetime tracking for wrappers.
//!
//! Every wrapper owns exactly one handle here. The registry records how
//! each handle relates to its backing entity - a private owned copy, a
//! borrowed view of an externally owned entity, or a parent-bounded
//! view reached through a dictionary key path - and is the single place
//! that decides what destruction frees.
//!
//! Reads clone values out; writes go through [`Registry::mutate`],
//! which resolves the handle's key path against the backing root at
//! call time. Parent-bounded handles therefore never hold interior
//! pointers and cannot dangle: resolving one after an ancestor was
//! released reports [`BindError::StaleHandle`] instead.

use crate::diag::{DiagLevel, DiagSink};
use crate::error::{BindError, Result};
use crate::values::Rect;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;
use vellum_core::{PdfObjRef, PdfObject, PdfStream, PdfVault};

/// Shared document context. Wrappers hold a clone of this and borrow it
/// per operation; the binding layer is single-threaded by contract.
pub type Ctx = Rc<RefCell<Registry>>;

/// An entity owned outside the registry, shared with it by reference
/// counting. The external analog of a native pointer whose lifetime the
/// wrapper does not control.
pub type SharedObject = Rc<RefCell<PdfObject>>;

/// Opaque handle identity. Never reused within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(u64);

/// Identity of a registry-owned private copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(u64);

/// Who owns the backing entity, and so what release is allowed to free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The registry owns a private copy; release frees exactly that copy.
    Owned,
    /// The entity is owned elsewhere; release drops only this view.
    BorrowedExternal,
    /// The entity lives inside a parent wrapper's entity; release frees
    /// nothing, and resolution fails once an ancestor is released.
    BorrowedFromParent,
}

/// Wrapper category, checked when one wrapper is passed to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Object,
    Stream,
    XObject,
    Annotation,
    Action,
    Destination,
    FileSpec,
    Color,
}

impl HandleKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Stream => "stream",
            Self::XObject => "xobject",
            Self::Annotation => "annotation",
            Self::Action => "action",
            Self::Destination => "destination",
            Self::FileSpec => "filespec",
            Self::Color => "color",
        }
    }

    /// The native shape a value must have to back this kind.
    const fn expected_shape(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Stream | Self::XObject => "stream",
            Self::Annotation | Self::Action | Self::FileSpec => "dict",
            Self::Destination | Self::Color => "array",
        }
    }

    fn accepts(self, value: &PdfObject) -> bool {
        match self {
            Self::Object => true,
            Self::Stream | Self::XObject => value.has_stream(),
            Self::Annotation | Self::Action | Self::FileSpec => {
                matches!(value, PdfObject::Dict(_))
            }
            Self::Destination | Self::Color => matches!(value, PdfObject::Array(_)),
        }
    }
}

/// How a handle reaches its backing entity.
#[derive(Debug, Clone)]
pub enum NativeRef {
    /// A vault-resident indirect object.
    Indirect(PdfObjRef),
    /// A registry-owned private copy.
    Slot(SlotId),
    /// An externally owned entity shared by reference counting.
    Shared(SharedObject),
    /// A value nested inside another handle's entity, reached by key
    /// path. An empty path aliases the parent's entity itself.
    Field { parent: HandleId, path: Vec<String> },
}

/// The three ways a wrapper comes into being.
pub enum ConstructionIntent {
    /// Wrap an entity owned elsewhere. The caller asserts the entity
    /// outlives every operation on the wrapper; the registry only drops
    /// its shared reference on release.
    FromExternal {
        kind: HandleKind,
        entity: SharedObject,
    },
    /// Copy a plain value into a registry-owned private copy.
    CopyOf { kind: HandleKind, value: PdfObject },
    /// Create a fresh entity inside the document from placement
    /// arguments. Currently only form XObjects are derived this way.
    Derived { kind: HandleKind, bounds: Rect },
}

#[derive(Debug)]
struct HandleEntry {
    kind: HandleKind,
    ownership: Ownership,
    native: NativeRef,
}

/// Identity of the root entity behind a stream handle, used to enforce
/// one active append session per entity no matter how many handles
/// alias it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum AppendKey {
    Indirect(PdfObjRef),
    Slot(SlotId),
    Shared(usize),
}

/// Ownership and lifetime book-keeping for every live wrapper.
pub struct Registry {
    vault: PdfVault,
    entries: HashMap<HandleId, HandleEntry>,
    slots: HashMap<SlotId, PdfObject>,
    append_sessions: HashSet<AppendKey>,
    next_handle: u64,
    next_slot: u64,
    sink: Arc<dyn DiagSink>,
}

impl Registry {
    pub fn new(sink: Arc<dyn DiagSink>) -> Ctx {
        Rc::new(RefCell::new(Self {
            vault: PdfVault::new(),
            entries: HashMap::new(),
            slots: HashMap::new(),
            append_sessions: HashSet::new(),
            next_handle: 1,
            next_slot: 1,
            sink,
        }))
    }

    pub fn vault(&self) -> &PdfVault {
        &self.vault
    }

    pub fn vault_mut(&mut self) -> &mut PdfVault {
        &mut self.vault
    }

    pub fn diag(&self) -> Arc<dyn DiagSink> {
        Arc::clone(&self.sink)
    }

    /// Construct a handle per the caller's intent.
    pub fn resolve(&mut self, intent: ConstructionIntent) -> Result<HandleId> {
        match intent {
            ConstructionIntent::FromExternal { kind, entity } => {
                if !kind.accepts(&entity.borrow()) {
                    return Err(BindError::TypeMismatch {
                        expected: kind.expected_shape(),
                        got: entity.borrow().type_name(),
                    });
                }
                Ok(self.install(kind, Ownership::BorrowedExternal, NativeRef::Shared(entity)))
            }
            ConstructionIntent::CopyOf { kind, value } => {
                if !kind.accepts(&value) {
                    return Err(BindError::TypeMismatch {
                        expected: kind.expected_shape(),
                        got: value.type_name(),
                    });
                }
                let slot = SlotId(self.next_slot);
                self.next_slot += 1;
                self.slots.insert(slot, value);
                Ok(self.install(kind, Ownership::Owned, NativeRef::Slot(slot)))
            }
            ConstructionIntent::Derived { kind, bounds } => {
                if kind != HandleKind::XObject {
                    return Err(BindError::TypeMismatch {
                        expected: "xobject",
                        got: kind.name(),
                    });
                }
                let mut attrs = HashMap::new();
                attrs.insert("Type".to_string(), PdfObject::Name("XObject".to_string()));
                attrs.insert("Subtype".to_string(), PdfObject::Name("Form".to_string()));
                attrs.insert("FormType".to_string(), PdfObject::Int(1));
                attrs.insert("BBox".to_string(), bounds.to_array());
                attrs.insert("Resources".to_string(), PdfObject::Dict(HashMap::new()));
                let stream = PdfObject::Stream(Box::new(PdfStream::new(attrs, Vec::new())));
                let reference = self.vault.allocate(stream);
                Ok(self.install(kind, Ownership::Owned, NativeRef::Indirect(reference)))
            }
        }
    }

    /// Wrap a vault-resident object without copying. The vault owns the
    /// entity; the handle is a borrowed view of it.
    pub fn adopt_indirect(&mut self, kind: HandleKind, reference: PdfObjRef) -> Result<HandleId> {
        let object = self.vault.require(reference)?;
        if !kind.accepts(object) {
            return Err(BindError::TypeMismatch {
                expected: kind.expected_shape(),
                got: object.type_name(),
            });
        }
        Ok(self.install(kind, Ownership::BorrowedExternal, NativeRef::Indirect(reference)))
    }

    /// Manufacture a parent-bounded handle over a value nested inside
    /// another handle's entity. The path must resolve at adoption time.
    pub fn adopt_child(
        &mut self,
        parent: HandleId,
        kind: HandleKind,
        path: &[&str],
    ) -> Result<HandleId> {
        let parent_kind = self.kind_of(parent)?;
        let path: Vec<String> = path.iter().map(|s| (*s).to_string()).collect();
        let probe = NativeRef::Field {
            parent,
            path: path.clone(),
        };
        let value = self.value_of_native(&probe)?;
        if !kind.accepts(&value) {
            return Err(BindError::TypeMismatch {
                expected: kind.expected_shape(),
                got: value.type_name(),
            });
        }
        self.sink.event(
            DiagLevel::Trace,
            "registry",
            &format!("adopt child of {}: {:?}", parent_kind.name(), path),
        );
        Ok(self.install(kind, Ownership::BorrowedFromParent, probe))
    }

    fn install(&mut self, kind: HandleKind, ownership: Ownership, native: NativeRef) -> HandleId {
        let id = HandleId(self.next_handle);
        self.next_handle += 1;
        self.entries.insert(
            id,
            HandleEntry {
                kind,
                ownership,
                native,
            },
        );
        id
    }

    /// Drop a handle. What gets freed depends on ownership: owned
    /// copies are removed from their slot or the vault, borrowed views
    /// free nothing. Releasing an already-released handle is a no-op.
    pub fn release(&mut self, id: HandleId) {
        let Some(entry) = self.entries.remove(&id) else {
            return;
        };
        if entry.ownership == Ownership::Owned {
            match entry.native {
                NativeRef::Slot(slot) => {
                    self.slots.remove(&slot);
                }
                NativeRef::Indirect(reference) => {
                    self.vault.remove(reference);
                }
                NativeRef::Shared(_) | NativeRef::Field { .. } => {}
            }
        }
        self.sink.event(
            DiagLevel::Trace,
            "registry",
            &format!("released {} handle", entry.kind.name()),
        );
    }

    pub fn is_live(&self, id: HandleId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn kind_of(&self, id: HandleId) -> Result<HandleKind> {
        self.entries
            .get(&id)
            .map(|e| e.kind)
            .ok_or(BindError::StaleHandle)
    }

    pub fn ownership_of(&self, id: HandleId) -> Result<Ownership> {
        self.entries
            .get(&id)
            .map(|e| e.ownership)
            .ok_or(BindError::StaleHandle)
    }

    /// The indirect reference behind a handle, when its root entity is
    /// vault-resident. Owned copies and external entities have none.
    pub fn reference_of(&self, id: HandleId) -> Result<Option<PdfObjRef>> {
        let (root, _) = self.root_of(id)?;
        match &self.entries[&root].native {
            NativeRef::Indirect(reference) => Ok(Some(*reference)),
            _ => Ok(None),
        }
    }

    /// Clone the backing value out.
    pub fn value(&self, id: HandleId) -> Result<PdfObject> {
        let entry = self.entries.get(&id).ok_or(BindError::StaleHandle)?;
        self.value_of_native(&entry.native)
    }

    fn value_of_native(&self, native: &NativeRef) -> Result<PdfObject> {
        let (root, path) = self.root_of_native(native)?;
        let mut current = match root {
            RootRef::Indirect(reference) => self.vault.require(reference)?.clone(),
            RootRef::Slot(slot) => self.slots.get(&slot).ok_or(BindError::StaleHandle)?.clone(),
            RootRef::Shared(entity) => entity.borrow().clone(),
        };
        for key in &path {
            current = match current.get_key(key)? {
                Some(value) => value.clone(),
                None => {
                    return Err(BindError::Engine(vellum_core::PdfError::KeyError(
                        key.clone(),
                    )));
                }
            };
        }
        Ok(current)
    }

    /// Mutate the backing value in place. The key path is resolved
    /// against the root at call time, so the closure sees current data.
    pub fn mutate<R>(
        &mut self,
        id: HandleId,
        f: impl FnOnce(&mut PdfObject) -> Result<R>,
    ) -> Result<R> {
        let entry = self.entries.get(&id).ok_or(BindError::StaleHandle)?;
        let (root, path) = self.root_of_native(&entry.native)?;
        match root {
            RootRef::Indirect(reference) => {
                let object = self.vault.require_mut(reference)?;
                f(navigate_mut(object, &path)?)
            }
            RootRef::Slot(slot) => {
                let object = self.slots.get_mut(&slot).ok_or(BindError::StaleHandle)?;
                f(navigate_mut(object, &path)?)
            }
            RootRef::Shared(entity) => {
                let mut borrowed = entity.borrow_mut();
                f(navigate_mut(&mut borrowed, &path)?)
            }
        }
    }

    /// Claim the append session for the entity behind a stream handle.
    /// Fails while another session on the same entity is active.
    pub fn begin_append_session(&mut self, id: HandleId) -> Result<()> {
        let key = self.append_key(id)?;
        if !self.append_sessions.insert(key) {
            return Err(BindError::InvalidState {
                operation: "beginAppend",
                state: "appending",
            });
        }
        Ok(())
    }

    /// Relinquish an append session. Idempotent.
    pub fn end_append_session(&mut self, id: HandleId) {
        if let Ok(key) = self.append_key(id) {
            self.append_sessions.remove(&key);
        }
    }

    fn append_key(&self, id: HandleId) -> Result<AppendKey> {
        let (root, _) = self.root_of(id)?;
        Ok(match &self.entries[&root].native {
            NativeRef::Indirect(reference) => AppendKey::Indirect(*reference),
            NativeRef::Slot(slot) => AppendKey::Slot(*slot),
            NativeRef::Shared(entity) => AppendKey::Shared(Rc::as_ptr(entity) as usize),
            NativeRef::Field { .. } => unreachable!("root native is never a field"),
        })
    }

    /// Walk `Field` links up to the root handle, accumulating the key
    /// path root-first. Any released ancestor makes the handle stale.
    fn root_of(&self, id: HandleId) -> Result<(HandleId, Vec<String>)> {
        let mut path_rev: Vec<String> = Vec::new();
        let mut current = id;
        loop {
            let entry = self.entries.get(&current).ok_or(BindError::StaleHandle)?;
            match &entry.native {
                NativeRef::Field { parent, path } => {
                    for key in path.iter().rev() {
                        path_rev.push(key.clone());
                    }
                    current = *parent;
                }
                _ => {
                    path_rev.reverse();
                    return Ok((current, path_rev));
                }
            }
        }
    }

    fn root_of_native(&self, native: &NativeRef) -> Result<(RootRef, Vec<String>)> {
        match native {
            NativeRef::Indirect(reference) => Ok((RootRef::Indirect(*reference), Vec::new())),
            NativeRef::Slot(slot) => Ok((RootRef::Slot(*slot), Vec::new())),
            NativeRef::Shared(entity) => Ok((RootRef::Shared(Rc::clone(entity)), Vec::new())),
            NativeRef::Field { parent, path } => {
                let (root_id, mut root_path) = self.root_of(*parent)?;
                root_path.extend(path.iter().cloned());
                let root_entry = &self.entries[&root_id];
                match &root_entry.native {
                    NativeRef::Indirect(reference) => Ok((RootRef::Indirect(*reference), root_path)),
                    NativeRef::Slot(slot) => Ok((RootRef::Slot(*slot), root_path)),
                    NativeRef::Shared(entity) => {
                        Ok((RootRef::Shared(Rc::clone(entity)), root_path))
                    }
                    NativeRef::Field { .. } => unreachable!("root native is never a field"),
                }
            }
        }
    }
}

enum RootRef {
    Indirect(PdfObjRef),
    Slot(SlotId),
    Shared(SharedObject),
}

fn navigate_mut<'a>(object: &'a mut PdfObject, path: &[String]) -> Result<&'a mut PdfObject> {
    let mut current = object;
    for key in path {
        let got = current.type_name();
        current = match current {
            PdfObject::Dict(dict) => dict.get_mut(key),
            PdfObject::Stream(stream) => stream.attrs.get_mut(key),
            _ => {
                return Err(BindError::TypeMismatch {
                    expected: "dict",
                    got,
                });
            }
        }
        .ok_or_else(|| BindError::Engine(vellum_core::PdfError::KeyError(key.clone())))?;
    }
    Ok(current)
}

/// Implemented by every wrapper so kind checks can be performed when
/// one wrapper is passed to another's setter.
pub trait WrapperHandle {
    fn kind(&self) -> HandleKind;
    fn handle_id(&self) -> HandleId;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::NullSink;

    fn ctx() -> Ctx {
        Registry::new(Arc::new(NullSink))
    }

    #[test]
    fn copy_of_is_a_private_copy() {
        let ctx = ctx();
        let original = PdfObject::dict_from([("K", PdfObject::Int(1))]);
        let id = ctx
            .borrow_mut()
            .resolve(ConstructionIntent::CopyOf {
                kind: HandleKind::Object,
                value: original.clone(),
            })
            .unwrap();
        ctx.borrow_mut()
            .mutate(id, |obj| Ok(obj.set_key("K", PdfObject::Int(2))?))
            .unwrap();
        // The source value is untouched; only the registry copy changed.
        assert_eq!(original.get_key("K").unwrap().unwrap().as_int().unwrap(), 1);
        let copy = ctx.borrow().value(id).unwrap();
        assert_eq!(copy.get_key("K").unwrap().unwrap().as_int().unwrap(), 2);
    }

    #[test]
    fn external_entity_survives_handle_release() {
        let ctx = ctx();
        let entity: SharedObject = Rc::new(RefCell::new(PdfObject::dict_from([(
            "A",
            PdfObject::Bool(true),
        )])));
        let first = ctx
            .borrow_mut()
            .resolve(ConstructionIntent::FromExternal {
                kind: HandleKind::Object,
                entity: Rc::clone(&entity),
            })
            .unwrap();
        let second = ctx
            .borrow_mut()
            .resolve(ConstructionIntent::FromExternal {
                kind: HandleKind::Object,
                entity: Rc::clone(&entity),
            })
            .unwrap();
        ctx.borrow_mut().release(first);
        // The other view still reads the shared entity.
        let value = ctx.borrow().value(second).unwrap();
        assert!(value.get_key("A").unwrap().is_some());
    }

    #[test]
    fn field_handle_goes_stale_when_parent_released() {
        let ctx = ctx();
        let parent = ctx
            .borrow_mut()
            .resolve(ConstructionIntent::CopyOf {
                kind: HandleKind::Object,
                value: PdfObject::dict_from([(
                    "Inner",
                    PdfObject::dict_from([("X", PdfObject::Int(9))]),
                )]),
            })
            .unwrap();
        let child = ctx
            .borrow_mut()
            .adopt_child(parent, HandleKind::Object, &["Inner"])
            .unwrap();
        assert_eq!(
            ctx.borrow()
                .value(child)
                .unwrap()
                .get_key("X")
                .unwrap()
                .unwrap()
                .as_int()
                .unwrap(),
            9
        );
        ctx.borrow_mut().release(parent);
        assert!(matches!(
            ctx.borrow().value(child),
            Err(BindError::StaleHandle)
        ));
    }

    #[test]
    fn release_is_idempotent() {
        let ctx = ctx();
        let id = ctx
            .borrow_mut()
            .resolve(ConstructionIntent::CopyOf {
                kind: HandleKind::Object,
                value: PdfObject::Null,
            })
            .unwrap();
        ctx.borrow_mut().release(id);
        ctx.borrow_mut().release(id);
        assert!(!ctx.borrow().is_live(id));
    }

    #[test]
    fn derived_xobject_is_vault_resident_until_release() {
        let ctx = ctx();
        let id = ctx
            .borrow_mut()
            .resolve(ConstructionIntent::Derived {
                kind: HandleKind::XObject,
                bounds: Rect::new(0.0, 0.0, 100.0, 50.0),
            })
            .unwrap();
        let reference = ctx.borrow().reference_of(id).unwrap().unwrap();
        assert!(ctx.borrow().vault().contains(reference));
        ctx.borrow_mut().release(id);
        assert!(!ctx.borrow().vault().contains(reference));
    }

    #[test]
    fn copy_of_checks_the_kind_shape() {
        let ctx = ctx();
        let err = ctx
            .borrow_mut()
            .resolve(ConstructionIntent::CopyOf {
                kind: HandleKind::Annotation,
                value: PdfObject::Int(3),
            })
            .unwrap_err();
        match err {
            BindError::TypeMismatch { expected, got } => {
                assert_eq!(expected, "dict");
                assert_eq!(got, "int");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn one_append_session_per_entity() {
        let ctx = ctx();
        let entity: SharedObject = Rc::new(RefCell::new(PdfObject::Stream(Box::new(
            PdfStream::default(),
        ))));
        let a = ctx
            .borrow_mut()
            .resolve(ConstructionIntent::FromExternal {
                kind: HandleKind::Stream,
                entity: Rc::clone(&entity),
            })
            .unwrap();
        let b = ctx
            .borrow_mut()
            .resolve(ConstructionIntent::FromExternal {
                kind: HandleKind::Stream,
                entity: Rc::clone(&entity),
            })
            .unwrap();
        ctx.borrow_mut().begin_append_session(a).unwrap();
        // A second session through an aliasing handle is refused.
        assert!(matches!(
            ctx.borrow_mut().begin_append_session(b),
            Err(BindError::InvalidState { .. })
        ));
        ctx.borrow_mut().end_append_session(a);
        ctx.borrow_mut().begin_append_session(b).unwrap();
    }
}
