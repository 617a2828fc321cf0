//! Object vault: the in-memory store of indirect objects.
//!
//! Arena-style identity: objects are addressed by their
//! (object number, generation) reference, never by transitive
//! ownership. Cycles in the object graph are therefore just data.

use crate::error::{PdfError, Result};
use crate::model::objects::{PdfObjRef, PdfObject};
use std::collections::HashMap;

/// In-memory store of indirect objects, addressed by reference.
#[derive(Debug, Default)]
pub struct PdfVault {
    objects: HashMap<PdfObjRef, PdfObject>,
    next_objid: u32,
}

impl PdfVault {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            next_objid: 1,
        }
    }

    /// Insert an object under an explicit reference.
    pub fn insert(&mut self, reference: PdfObjRef, object: PdfObject) {
        if reference.objid >= self.next_objid {
            self.next_objid = reference.objid + 1;
        }
        self.objects.insert(reference, object);
    }

    /// Store an object under a freshly allocated reference.
    pub fn allocate(&mut self, object: PdfObject) -> PdfObjRef {
        let reference = PdfObjRef::new(self.next_objid, 0);
        self.next_objid += 1;
        self.objects.insert(reference, object);
        reference
    }

    /// Object lookup by reference.
    pub fn get(&self, reference: PdfObjRef) -> Option<&PdfObject> {
        self.objects.get(&reference)
    }

    pub fn get_mut(&mut self, reference: PdfObjRef) -> Option<&mut PdfObject> {
        self.objects.get_mut(&reference)
    }

    /// Lookup that fails with `ObjectNotFound` instead of `None`.
    pub fn require(&self, reference: PdfObjRef) -> Result<&PdfObject> {
        self.objects
            .get(&reference)
            .ok_or(PdfError::ObjectNotFound(reference.objid, reference.genno))
    }

    pub fn require_mut(&mut self, reference: PdfObjRef) -> Result<&mut PdfObject> {
        self.objects
            .get_mut(&reference)
            .ok_or(PdfError::ObjectNotFound(reference.objid, reference.genno))
    }

    /// Remove an object, returning it if present.
    pub fn remove(&mut self, reference: PdfObjRef) -> Option<PdfObject> {
        self.objects.remove(&reference)
    }

    pub fn contains(&self, reference: PdfObjRef) -> bool {
        self.objects.contains_key(&reference)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_hands_out_fresh_references() {
        let mut vault = PdfVault::new();
        let a = vault.allocate(PdfObject::Int(1));
        let b = vault.allocate(PdfObject::Int(2));
        assert_ne!(a, b);
        assert_eq!(vault.get(a).unwrap().as_int().unwrap(), 1);
        assert_eq!(vault.get(b).unwrap().as_int().unwrap(), 2);
    }

    #[test]
    fn insert_reserves_the_numbering_range() {
        let mut vault = PdfVault::new();
        vault.insert(PdfObjRef::new(7, 0), PdfObject::Null);
        let fresh = vault.allocate(PdfObject::Bool(true));
        assert!(fresh.objid > 7);
    }

    #[test]
    fn require_reports_missing_reference() {
        let vault = PdfVault::new();
        let err = vault.require(PdfObjRef::new(9, 1)).unwrap_err();
        assert!(matches!(err, PdfError::ObjectNotFound(9, 1)));
    }
}
