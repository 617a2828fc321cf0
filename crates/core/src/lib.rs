//! vellum-core - In-memory PDF object model for the vellum binding layer.
//!
//! This crate is the "engine" side of the vellum workspace: the object
//! model (indirect objects, dictionaries, arrays, streams), an object
//! vault addressed by (object number, generation) references, the
//! stream filter codecs, a serializer for single indirect objects, and
//! the document permission flags. Everything host-facing (handles,
//! wrappers, the stream state machine, the background serializer) lives
//! in `vellum-bind`.

pub mod codec;
pub mod error;
pub mod model;
pub mod security;
pub mod vault;
pub mod writer;

pub use error::{PdfError, Result};
pub use model::objects::{PdfObjRef, PdfObject, PdfStream};
pub use vault::PdfVault;
