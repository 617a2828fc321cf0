//! Annotation wrapper: typed access to an annotation dictionary.
//!
//! The subtype is resolved once at construction and cached; unknown
//! subtype names map to [`AnnotationKind::Unknown`] rather than
//! failing. Setters that take other wrappers check the wrapper kind
//! before touching the dictionary, so a mismatch never leaves a
//! partial write behind.

use crate::diag::DiagLevel;
use crate::error::{BindError, Result};
use crate::object::ObjectWrapper;
use crate::registry::{ConstructionIntent, Ctx, HandleId, HandleKind, SharedObject, WrapperHandle};
use crate::values::{Action, Color, Destination, FileSpec, Rect};
use bitflags::bitflags;
use std::rc::Rc;
use vellum_core::PdfObject;

bitflags! {
    /// Annotation flag bits (the /F entry).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AnnotationFlags: u32 {
        const INVISIBLE = 1 << 0;
        const HIDDEN = 1 << 1;
        const PRINT = 1 << 2;
        const NO_ZOOM = 1 << 3;
        const NO_ROTATE = 1 << 4;
        const NO_VIEW = 1 << 5;
        const READ_ONLY = 1 << 6;
        const LOCKED = 1 << 7;
        const TOGGLE_NO_VIEW = 1 << 8;
        const LOCKED_CONTENTS = 1 << 9;
    }
}

/// The closed set of annotation subtypes. Subtype names outside the
/// set are carried as `Unknown`, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    Text,
    Link,
    FreeText,
    Line,
    Square,
    Circle,
    Polygon,
    PolyLine,
    Highlight,
    Underline,
    Squiggly,
    StrikeOut,
    Stamp,
    Caret,
    Ink,
    Popup,
    FileAttachment,
    Sound,
    Movie,
    Widget,
    Screen,
    PrinterMark,
    TrapNet,
    Watermark,
    ThreeD,
    RichMedia,
    WebMedia,
    Unknown,
}

impl AnnotationKind {
    /// The /Subtype name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Link => "Link",
            Self::FreeText => "FreeText",
            Self::Line => "Line",
            Self::Square => "Square",
            Self::Circle => "Circle",
            Self::Polygon => "Polygon",
            Self::PolyLine => "PolyLine",
            Self::Highlight => "Highlight",
            Self::Underline => "Underline",
            Self::Squiggly => "Squiggly",
            Self::StrikeOut => "StrikeOut",
            Self::Stamp => "Stamp",
            Self::Caret => "Caret",
            Self::Ink => "Ink",
            Self::Popup => "Popup",
            Self::FileAttachment => "FileAttachment",
            Self::Sound => "Sound",
            Self::Movie => "Movie",
            Self::Widget => "Widget",
            Self::Screen => "Screen",
            Self::PrinterMark => "PrinterMark",
            Self::TrapNet => "TrapNet",
            Self::Watermark => "Watermark",
            Self::ThreeD => "3D",
            Self::RichMedia => "RichMedia",
            Self::WebMedia => "WebMedia",
            Self::Unknown => "Unknown",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "Text" => Self::Text,
            "Link" => Self::Link,
            "FreeText" => Self::FreeText,
            "Line" => Self::Line,
            "Square" => Self::Square,
            "Circle" => Self::Circle,
            "Polygon" => Self::Polygon,
            "PolyLine" => Self::PolyLine,
            "Highlight" => Self::Highlight,
            "Underline" => Self::Underline,
            "Squiggly" => Self::Squiggly,
            "StrikeOut" => Self::StrikeOut,
            "Stamp" => Self::Stamp,
            "Caret" => Self::Caret,
            "Ink" => Self::Ink,
            "Popup" => Self::Popup,
            "FileAttachment" => Self::FileAttachment,
            "Sound" => Self::Sound,
            "Movie" => Self::Movie,
            "Widget" => Self::Widget,
            "Screen" => Self::Screen,
            "PrinterMark" => Self::PrinterMark,
            "TrapNet" => Self::TrapNet,
            "Watermark" => Self::Watermark,
            "3D" => Self::ThreeD,
            "RichMedia" => Self::RichMedia,
            "WebMedia" => Self::WebMedia,
            _ => Self::Unknown,
        }
    }
}

/// Typed view of one annotation dictionary.
pub struct Annotation {
    obj: ObjectWrapper,
    kind: AnnotationKind,
}

impl Annotation {
    /// Create a fresh annotation of the given subtype and rectangle as
    /// a registry-owned copy.
    pub fn create(ctx: &Ctx, kind: AnnotationKind, rect: Rect) -> Result<Self> {
        let value = PdfObject::dict_from([
            ("Type", PdfObject::Name("Annot".to_string())),
            ("Subtype", PdfObject::Name(kind.name().to_string())),
            ("Rect", rect.to_array()),
        ]);
        let obj = ObjectWrapper::with_intent(
            ctx,
            ConstructionIntent::CopyOf {
                kind: HandleKind::Annotation,
                value,
            },
        )?;
        Ok(Self { obj, kind })
    }

    /// Wrap an externally owned annotation dictionary.
    pub fn from_external(ctx: &Ctx, entity: SharedObject) -> Result<Self> {
        let obj = ObjectWrapper::with_intent(
            ctx,
            ConstructionIntent::FromExternal {
                kind: HandleKind::Annotation,
                entity,
            },
        )?;
        let kind = Self::resolve_kind(&obj)?;
        Ok(Self { obj, kind })
    }

    fn resolve_kind(obj: &ObjectWrapper) -> Result<AnnotationKind> {
        Ok(match obj.get_key("Subtype")? {
            Some(value) => AnnotationKind::from_name(value.as_name()?),
            None => AnnotationKind::Unknown,
        })
    }

    pub const fn object(&self) -> &ObjectWrapper {
        &self.obj
    }

    /// The subtype resolved at construction.
    pub const fn annotation_kind(&self) -> AnnotationKind {
        self.kind
    }

    /// Flag bits from /F; absent means none set.
    pub fn flags(&self) -> Result<AnnotationFlags> {
        Ok(match self.obj.get_key("F")? {
            Some(value) => AnnotationFlags::from_bits_truncate(value.as_int()? as u32),
            None => AnnotationFlags::empty(),
        })
    }

    pub fn set_flags(&self, flags: AnnotationFlags) -> Result<()> {
        self.obj.set_key("F", PdfObject::Int(i64::from(flags.bits())))
    }

    pub fn rect(&self) -> Result<Rect> {
        match self.obj.get_key("Rect")? {
            Some(value) => Rect::from_array(&value),
            None => Ok(Rect::default()),
        }
    }

    pub fn set_rect(&self, rect: Rect) -> Result<()> {
        self.obj.set_key("Rect", rect.to_array())
    }

    /// The /T entry (title or field label).
    pub fn title(&self) -> Result<Option<String>> {
        self.string_key("T")
    }

    pub fn set_title(&self, title: &str) -> Result<()> {
        self.obj
            .set_key("T", PdfObject::String(title.as_bytes().to_vec()))
    }

    /// The /Contents entry (displayed text).
    pub fn content(&self) -> Result<Option<String>> {
        self.string_key("Contents")
    }

    pub fn set_content(&self, content: &str) -> Result<()> {
        self.obj
            .set_key("Contents", PdfObject::String(content.as_bytes().to_vec()))
    }

    /// The /Open entry on popup-bearing annotations.
    pub fn open(&self) -> Result<bool> {
        Ok(match self.obj.get_key("Open")? {
            Some(value) => value.as_bool()?,
            None => false,
        })
    }

    pub fn set_open(&self, open: bool) -> Result<()> {
        self.obj.set_key("Open", PdfObject::Bool(open))
    }

    /// /QuadPoints for markup annotations; absent means empty.
    pub fn quad_points(&self) -> Result<Vec<f64>> {
        let Some(value) = self.obj.get_key("QuadPoints")? else {
            return Ok(Vec::new());
        };
        Ok(value
            .as_array()?
            .iter()
            .map(PdfObject::as_num)
            .collect::<vellum_core::Result<Vec<f64>>>()?)
    }

    pub fn set_quad_points(&self, points: &[f64]) -> Result<()> {
        self.obj.set_key(
            "QuadPoints",
            PdfObject::Array(points.iter().copied().map(PdfObject::Real).collect()),
        )
    }

    /// The /C color, decoded by component arity. Absent is `Ok(None)`.
    pub fn color(&self) -> Result<Option<Color>> {
        match self.obj.get_key("C")? {
            Some(value) => Color::from_array(&value),
            None => Ok(None),
        }
    }

    /// Record a color wrapper's components under /C. Wrong wrapper
    /// kinds are refused before anything is written.
    pub fn set_color(&self, value: &dyn WrapperHandle) -> Result<()> {
        let native = self.checked_value(value, HandleKind::Color)?;
        self.obj.set_key("C", native)
    }

    /// The activation action under /A, if any.
    pub fn action(&self) -> Result<Option<Action>> {
        Ok(self
            .field_child("A", HandleKind::Action)?
            .map(Action::attach))
    }

    pub fn set_action(&self, value: &dyn WrapperHandle) -> Result<()> {
        let native = self.checked_value(value, HandleKind::Action)?;
        self.obj.set_key("A", native)
    }

    /// The link destination under /Dest, if any.
    pub fn destination(&self) -> Result<Option<Destination>> {
        Ok(self
            .field_child("Dest", HandleKind::Destination)?
            .map(Destination::attach))
    }

    pub fn set_destination(&self, value: &dyn WrapperHandle) -> Result<()> {
        let native = self.checked_value(value, HandleKind::Destination)?;
        self.obj.set_key("Dest", native)
    }

    /// The file specification under /FS, if any.
    pub fn attachment(&self) -> Result<Option<FileSpec>> {
        Ok(self
            .field_child("FS", HandleKind::FileSpec)?
            .map(FileSpec::attach))
    }

    pub fn set_attachment(&self, value: &dyn WrapperHandle) -> Result<()> {
        let native = self.checked_value(value, HandleKind::FileSpec)?;
        self.obj.set_key("FS", native)
    }

    pub fn has_appearance_stream(&self) -> Result<bool> {
        Ok(self.obj.get_key("AP")?.is_some())
    }

    /// Install a form XObject as the normal appearance. The /AP entry
    /// points at the form by reference when it is vault-resident,
    /// otherwise a copy is embedded.
    pub fn set_appearance_stream(&self, value: &dyn WrapperHandle) -> Result<()> {
        if value.kind() != HandleKind::XObject {
            return Err(BindError::TypeMismatch {
                expected: HandleKind::XObject.name(),
                got: value.kind().name(),
            });
        }
        let registry = self.obj.ctx().borrow();
        let normal = match registry.reference_of(value.handle_id())? {
            Some(reference) => PdfObject::Ref(reference),
            None => registry.value(value.handle_id())?,
        };
        drop(registry);
        self.obj
            .set_key("AP", PdfObject::dict_from([("N", normal)]))?;
        self.obj.ctx().borrow().diag().event(
            DiagLevel::Debug,
            "annotation",
            &format!("appearance stream set on {}", self.kind.name()),
        );
        Ok(())
    }

    /// Record a /Border array of horizontal radius, vertical radius,
    /// and border width.
    pub fn set_border_style(&self, horizontal: f64, vertical: f64, width: f64) -> Result<()> {
        self.obj.set_key(
            "Border",
            PdfObject::Array(vec![
                PdfObject::Real(horizontal),
                PdfObject::Real(vertical),
                PdfObject::Real(width),
            ]),
        )
    }

    /// Fetch another wrapper's backing value after checking its kind.
    fn checked_value(&self, value: &dyn WrapperHandle, expected: HandleKind) -> Result<PdfObject> {
        if value.kind() != expected {
            return Err(BindError::TypeMismatch {
                expected: expected.name(),
                got: value.kind().name(),
            });
        }
        self.obj.ctx().borrow().value(value.handle_id())
    }

    /// Manufacture a parent-bounded wrapper over the value at `key`.
    fn field_child(&self, key: &str, kind: HandleKind) -> Result<Option<ObjectWrapper>> {
        if self.obj.get_key(key)?.is_none() {
            return Ok(None);
        }
        let id = self
            .obj
            .ctx()
            .borrow_mut()
            .adopt_child(self.obj.id(), kind, &[key])?;
        Ok(Some(ObjectWrapper::attach(Rc::clone(self.obj.ctx()), id)))
    }

    fn string_key(&self, key: &str) -> Result<Option<String>> {
        Ok(match self.obj.get_key(key)? {
            Some(value) => Some(String::from_utf8_lossy(value.as_string()?).into_owned()),
            None => None,
        })
    }
}

impl WrapperHandle for Annotation {
    fn kind(&self) -> HandleKind {
        HandleKind::Annotation
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
    use crate::values::ColorValue;
    use std::sync::Arc;

    fn ctx() -> Ctx {
        Registry::new(Arc::new(NullSink))
    }

    #[test]
    fn subtype_names_round_trip_through_the_closed_set() {
        for kind in [
            AnnotationKind::Text,
            AnnotationKind::Link,
            AnnotationKind::Highlight,
            AnnotationKind::Widget,
            AnnotationKind::ThreeD,
            AnnotationKind::WebMedia,
        ] {
            assert_eq!(AnnotationKind::from_name(kind.name()), kind);
        }
        assert_eq!(
            AnnotationKind::from_name("NotARealSubtype"),
            AnnotationKind::Unknown
        );
    }

    #[test]
    fn flags_default_to_empty_and_round_trip() {
        let ctx = ctx();
        let annot =
            Annotation::create(&ctx, AnnotationKind::Text, Rect::new(0.0, 0.0, 20.0, 20.0))
                .unwrap();
        assert_eq!(annot.flags().unwrap(), AnnotationFlags::empty());
        annot
            .set_flags(AnnotationFlags::PRINT | AnnotationFlags::READ_ONLY)
            .unwrap();
        assert_eq!(
            annot.flags().unwrap(),
            AnnotationFlags::PRINT | AnnotationFlags::READ_ONLY
        );
    }

    #[test]
    fn color_is_none_until_set() {
        let ctx = ctx();
        let annot =
            Annotation::create(&ctx, AnnotationKind::Square, Rect::new(0.0, 0.0, 5.0, 5.0))
                .unwrap();
        assert_eq!(annot.color().unwrap(), None);
        let red = ColorValue::new(&ctx, Color::Rgb(1.0, 0.0, 0.0)).unwrap();
        annot.set_color(&red).unwrap();
        assert_eq!(annot.color().unwrap(), Some(Color::Rgb(1.0, 0.0, 0.0)));
    }

    #[test]
    fn wrong_wrapper_kind_is_refused_without_mutation() {
        let ctx = ctx();
        let annot = Annotation::create(&ctx, AnnotationKind::Link, Rect::default()).unwrap();
        let action = Action::uri(&ctx, "https://example.com").unwrap();
        // An action passed where a color belongs.
        let err = annot.set_color(&action).unwrap_err();
        match err {
            BindError::TypeMismatch { expected, got } => {
                assert_eq!(expected, "color");
                assert_eq!(got, "action");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(annot.color().unwrap(), None);
    }

    #[test]
    fn action_round_trip() {
        let ctx = ctx();
        let annot = Annotation::create(&ctx, AnnotationKind::Link, Rect::default()).unwrap();
        assert!(annot.action().unwrap().is_none());
        let action = Action::javascript(&ctx, "app.alert('hi');").unwrap();
        annot.set_action(&action).unwrap();
        let read_back = annot.action().unwrap().unwrap();
        assert_eq!(read_back.script().unwrap().unwrap(), "app.alert('hi');");
    }

    #[test]
    fn text_fields_round_trip() {
        let ctx = ctx();
        let annot = Annotation::create(&ctx, AnnotationKind::Text, Rect::default()).unwrap();
        assert_eq!(annot.title().unwrap(), None);
        annot.set_title("reviewer").unwrap();
        annot.set_content("looks good").unwrap();
        annot.set_open(true).unwrap();
        assert_eq!(annot.title().unwrap().unwrap(), "reviewer");
        assert_eq!(annot.content().unwrap().unwrap(), "looks good");
        assert!(annot.open().unwrap());
    }
}
