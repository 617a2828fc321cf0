//! Plain value types and small value-object wrappers: rectangles,
//! colors, actions, destinations, and file specifications.

use crate::error::{BindError, Result};
use crate::object::ObjectWrapper;
use crate::registry::{ConstructionIntent, Ctx, HandleId, HandleKind, WrapperHandle};
use vellum_core::PdfObject;

/// Axis-aligned rectangle in PDF user-space units, stored as origin
/// plus extent. The native /Rect form is `[llx lly urx ury]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, bottom: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            bottom,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn top(&self) -> f64 {
        self.bottom + self.height
    }

    /// Parse the native `[llx lly urx ury]` form.
    pub fn from_array(value: &PdfObject) -> Result<Self> {
        let items = value.as_array()?;
        if items.len() != 4 {
            return Err(BindError::TypeMismatch {
                expected: "rect array of 4 numbers",
                got: value.type_name(),
            });
        }
        let llx = items[0].as_num()?;
        let lly = items[1].as_num()?;
        let urx = items[2].as_num()?;
        let ury = items[3].as_num()?;
        Ok(Self::new(llx, lly, urx - llx, ury - lly))
    }

    pub fn to_array(&self) -> PdfObject {
        PdfObject::Array(vec![
            PdfObject::Real(self.left),
            PdfObject::Real(self.bottom),
            PdfObject::Real(self.right()),
            PdfObject::Real(self.top()),
        ])
    }
}

/// A color in one of the three supported spaces. Which space a
/// component array denotes is decided purely by its arity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    Greyscale(f64),
    Rgb(f64, f64, f64),
    Cmyk(f64, f64, f64, f64),
}

impl Color {
    /// Interpret a component slice by arity: 0 means no color set,
    /// 1 greyscale, 3 RGB, 4 CMYK. Anything else is unsupported.
    pub fn from_components(components: &[f64]) -> Result<Option<Self>> {
        match components {
            [] => Ok(None),
            [g] => Ok(Some(Self::Greyscale(*g))),
            [r, g, b] => Ok(Some(Self::Rgb(*r, *g, *b))),
            [c, m, y, k] => Ok(Some(Self::Cmyk(*c, *m, *y, *k))),
            other => Err(BindError::UnsupportedEncoding(other.len())),
        }
    }

    pub fn from_array(value: &PdfObject) -> Result<Option<Self>> {
        let items = value.as_array()?;
        let components = items
            .iter()
            .map(PdfObject::as_num)
            .collect::<vellum_core::Result<Vec<f64>>>()?;
        Self::from_components(&components)
    }

    pub fn components(&self) -> Vec<f64> {
        match *self {
            Self::Greyscale(g) => vec![g],
            Self::Rgb(r, g, b) => vec![r, g, b],
            Self::Cmyk(c, m, y, k) => vec![c, m, y, k],
        }
    }

    pub fn to_array(&self) -> PdfObject {
        PdfObject::Array(self.components().into_iter().map(PdfObject::Real).collect())
    }
}

/// Registry-backed color value, usable wherever a setter expects a
/// color wrapper rather than raw components.
pub struct ColorValue {
    obj: ObjectWrapper,
    color: Color,
}

impl ColorValue {
    pub fn new(ctx: &Ctx, color: Color) -> Result<Self> {
        let obj = ObjectWrapper::with_intent(
            ctx,
            ConstructionIntent::CopyOf {
                kind: HandleKind::Color,
                value: color.to_array(),
            },
        )?;
        Ok(Self { obj, color })
    }

    pub const fn color(&self) -> Color {
        self.color
    }

    pub const fn object(&self) -> &ObjectWrapper {
        &self.obj
    }
}

impl WrapperHandle for ColorValue {
    fn kind(&self) -> HandleKind {
        HandleKind::Color
    }

    fn handle_id(&self) -> HandleId {
        self.obj.id()
    }
}

/// An action dictionary: what happens when an annotation is activated.
pub struct Action {
    obj: ObjectWrapper,
}

impl Action {
    /// A URI action resolving to the given target.
    pub fn uri(ctx: &Ctx, uri: &str) -> Result<Self> {
        let value = PdfObject::dict_from([
            ("Type", PdfObject::Name("Action".to_string())),
            ("S", PdfObject::Name("URI".to_string())),
            ("URI", PdfObject::String(uri.as_bytes().to_vec())),
        ]);
        Self::copy_of(ctx, value)
    }

    /// A JavaScript action carrying the given script.
    pub fn javascript(ctx: &Ctx, script: &str) -> Result<Self> {
        let value = PdfObject::dict_from([
            ("Type", PdfObject::Name("Action".to_string())),
            ("S", PdfObject::Name("JavaScript".to_string())),
            ("JS", PdfObject::String(script.as_bytes().to_vec())),
        ]);
        Self::copy_of(ctx, value)
    }

    fn copy_of(ctx: &Ctx, value: PdfObject) -> Result<Self> {
        let obj = ObjectWrapper::with_intent(
            ctx,
            ConstructionIntent::CopyOf {
                kind: HandleKind::Action,
                value,
            },
        )?;
        Ok(Self { obj })
    }

    pub(crate) const fn attach(obj: ObjectWrapper) -> Self {
        Self { obj }
    }

    /// The action subtype name (URI, JavaScript, GoTo, ...).
    pub fn action_type(&self) -> Result<Option<String>> {
        self.string_key_as_name("S")
    }

    pub fn uri_value(&self) -> Result<Option<String>> {
        self.string_key("URI")
    }

    pub fn script(&self) -> Result<Option<String>> {
        self.string_key("JS")
    }

    fn string_key(&self, key: &str) -> Result<Option<String>> {
        Ok(match self.obj.get_key(key)? {
            Some(value) => Some(String::from_utf8_lossy(value.as_string()?).into_owned()),
            None => None,
        })
    }

    fn string_key_as_name(&self, key: &str) -> Result<Option<String>> {
        Ok(match self.obj.get_key(key)? {
            Some(value) => Some(value.as_name()?.to_string()),
            None => None,
        })
    }

    pub const fn object(&self) -> &ObjectWrapper {
        &self.obj
    }
}

impl WrapperHandle for Action {
    fn kind(&self) -> HandleKind {
        HandleKind::Action
    }

    fn handle_id(&self) -> HandleId {
        self.obj.id()
    }
}

/// An explicit destination array targeting a page.
pub struct Destination {
    obj: ObjectWrapper,
}

impl Destination {
    /// Fit the whole page in the window.
    pub fn fit(ctx: &Ctx, page: vellum_core::PdfObjRef) -> Result<Self> {
        let value = PdfObject::Array(vec![
            PdfObject::Ref(page),
            PdfObject::Name("Fit".to_string()),
        ]);
        Self::copy_of(ctx, value)
    }

    /// Position the page at the given coordinates and zoom.
    pub fn xyz(ctx: &Ctx, page: vellum_core::PdfObjRef, left: f64, top: f64, zoom: f64) -> Result<Self> {
        let value = PdfObject::Array(vec![
            PdfObject::Ref(page),
            PdfObject::Name("XYZ".to_string()),
            PdfObject::Real(left),
            PdfObject::Real(top),
            PdfObject::Real(zoom),
        ]);
        Self::copy_of(ctx, value)
    }

    fn copy_of(ctx: &Ctx, value: PdfObject) -> Result<Self> {
        let obj = ObjectWrapper::with_intent(
            ctx,
            ConstructionIntent::CopyOf {
                kind: HandleKind::Destination,
                value,
            },
        )?;
        Ok(Self { obj })
    }

    pub(crate) const fn attach(obj: ObjectWrapper) -> Self {
        Self { obj }
    }

    /// The target page reference (first array element).
    pub fn page(&self) -> Result<vellum_core::PdfObjRef> {
        let value = self.obj.value()?;
        let items = value.as_array()?;
        match items.first() {
            Some(item) => Ok(item.as_reference()?),
            None => Err(BindError::TypeMismatch {
                expected: "destination array",
                got: "array",
            }),
        }
    }

    /// The fit mode name (second array element).
    pub fn fit_mode(&self) -> Result<String> {
        let value = self.obj.value()?;
        let items = value.as_array()?;
        match items.get(1) {
            Some(item) => Ok(item.as_name()?.to_string()),
            None => Err(BindError::TypeMismatch {
                expected: "destination array",
                got: "array",
            }),
        }
    }

    pub const fn object(&self) -> &ObjectWrapper {
        &self.obj
    }
}

impl WrapperHandle for Destination {
    fn kind(&self) -> HandleKind {
        HandleKind::Destination
    }

    fn handle_id(&self) -> HandleId {
        self.obj.id()
    }
}

/// A file specification dictionary, optionally carrying embedded data.
pub struct FileSpec {
    obj: ObjectWrapper,
}

impl FileSpec {
    pub fn new(ctx: &Ctx, file_name: &str, data: Option<&[u8]>) -> Result<Self> {
        let mut value = PdfObject::dict_from([
            ("Type", PdfObject::Name("Filespec".to_string())),
            ("F", PdfObject::String(file_name.as_bytes().to_vec())),
            ("UF", PdfObject::String(file_name.as_bytes().to_vec())),
        ]);
        if let Some(data) = data {
            let mut attrs = std::collections::HashMap::new();
            attrs.insert("Type".to_string(), PdfObject::Name("EmbeddedFile".to_string()));
            let stream = PdfObject::Stream(Box::new(vellum_core::PdfStream::new(
                attrs,
                data.to_vec(),
            )));
            value.set_key("EF", PdfObject::dict_from([("F", stream)]))?;
        }
        let obj = ObjectWrapper::with_intent(
            ctx,
            ConstructionIntent::CopyOf {
                kind: HandleKind::FileSpec,
                value,
            },
        )?;
        Ok(Self { obj })
    }

    pub(crate) const fn attach(obj: ObjectWrapper) -> Self {
        Self { obj }
    }

    pub fn file_name(&self) -> Result<Option<String>> {
        Ok(match self.obj.get_key("F")? {
            Some(value) => Some(String::from_utf8_lossy(value.as_string()?).into_owned()),
            None => None,
        })
    }

    /// The embedded payload, when one was attached.
    pub fn embedded_data(&self) -> Result<Option<Vec<u8>>> {
        let Some(ef) = self.obj.get_key("EF")? else {
            return Ok(None);
        };
        let Some(file) = ef.get_key("F")? else {
            return Ok(None);
        };
        Ok(Some(file.as_stream()?.raw().to_vec()))
    }

    pub const fn object(&self) -> &ObjectWrapper {
        &self.obj
    }
}

impl WrapperHandle for FileSpec {
    fn kind(&self) -> HandleKind {
        HandleKind::FileSpec
    }

    fn handle_id(&self) -> HandleId {
        self.obj.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::NullSink;
    use crate::registry::Registry;
    use std::sync::Arc;

    fn ctx() -> Ctx {
        Registry::new(Arc::new(NullSink))
    }

    #[test]
    fn rect_round_trips_through_the_native_form() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        let parsed = Rect::from_array(&rect.to_array()).unwrap();
        assert_eq!(parsed, rect);
        assert_eq!(parsed.right(), 110.0);
        assert_eq!(parsed.top(), 70.0);
    }

    #[test]
    fn color_arity_discrimination() {
        assert_eq!(Color::from_components(&[]).unwrap(), None);
        assert_eq!(
            Color::from_components(&[0.5]).unwrap(),
            Some(Color::Greyscale(0.5))
        );
        assert_eq!(
            Color::from_components(&[1.0, 0.0, 0.0]).unwrap(),
            Some(Color::Rgb(1.0, 0.0, 0.0))
        );
        assert_eq!(
            Color::from_components(&[0.0, 0.1, 0.2, 0.3]).unwrap(),
            Some(Color::Cmyk(0.0, 0.1, 0.2, 0.3))
        );
        assert!(matches!(
            Color::from_components(&[0.0, 0.1]),
            Err(BindError::UnsupportedEncoding(2))
        ));
    }

    #[test]
    fn uri_action_exposes_its_target() {
        let ctx = ctx();
        let action = Action::uri(&ctx, "https://example.com").unwrap();
        assert_eq!(action.action_type().unwrap().unwrap(), "URI");
        assert_eq!(action.uri_value().unwrap().unwrap(), "https://example.com");
        assert_eq!(action.script().unwrap(), None);
    }

    #[test]
    fn filespec_carries_embedded_data() {
        let ctx = ctx();
        let spec = FileSpec::new(&ctx, "notes.txt", Some(b"hello")).unwrap();
        assert_eq!(spec.file_name().unwrap().unwrap(), "notes.txt");
        assert_eq!(spec.embedded_data().unwrap().unwrap(), b"hello");

        let bare = FileSpec::new(&ctx, "empty.txt", None).unwrap();
        assert_eq!(bare.embedded_data().unwrap(), None);
    }

    #[test]
    fn destination_accessors() {
        let ctx = ctx();
        let page = vellum_core::PdfObjRef::new(3, 0);
        let dest = Destination::xyz(&ctx, page, 0.0, 792.0, 1.0).unwrap();
        assert_eq!(dest.page().unwrap(), page);
        assert_eq!(dest.fit_mode().unwrap(), "XYZ");
    }
}
