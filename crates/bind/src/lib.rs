//! vellum-bind - Host-facing binding layer over the vellum PDF object
//! model.
//!
//! Exposes the object graph through handle-owning wrappers whose
//! lifetimes the handle registry tracks: generic object wrappers, the
//! stream append-session controller, form XObjects, annotations, and
//! the small value wrappers they exchange. Serialization of committed
//! streams runs on background threads, with results delivered through
//! a completion queue.
//!
//! The layer is single-threaded by contract except for the worker:
//! wrappers share a [`registry::Ctx`] and borrow it per operation.

pub mod annotation;
pub mod diag;
pub mod error;
pub mod object;
pub mod registry;
pub mod stream;
pub mod values;
pub mod worker;
pub mod xobject;

pub use annotation::{Annotation, AnnotationFlags, AnnotationKind};
pub use diag::{DiagLevel, DiagSink, NullSink, TracingSink};
pub use error::{BindError, Result};
pub use object::ObjectWrapper;
pub use registry::{
    ConstructionIntent, Ctx, HandleId, HandleKind, Ownership, Registry, SharedObject,
    WrapperHandle,
};
pub use stream::{AppendOptions, StreamController, StreamMode, StreamSnapshot};
pub use values::{Action, Color, ColorValue, Destination, FileSpec, Rect};
pub use worker::{Completion, CompletionQueue, SerializationOutput, SerializationWorker, Ticket};
pub use xobject::XObject;
