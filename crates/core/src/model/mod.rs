//! PDF object model.

pub mod objects;
