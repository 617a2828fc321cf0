//! Annotation wrapper behavior across the full accessor surface.

use std::sync::Arc;
use vellum_bind::diag::NullSink;
use vellum_bind::registry::{Ctx, Registry};
use vellum_bind::{
    Action, Annotation, AnnotationFlags, AnnotationKind, BindError, Color, ColorValue,
    Destination, FileSpec, Rect, WrapperHandle, XObject,
};
use vellum_core::PdfObjRef;

fn ctx() -> Ctx {
    Registry::new(Arc::new(NullSink))
}

#[test]
fn created_annotation_carries_subtype_and_rect() {
    let ctx = ctx();
    let rect = Rect::new(72.0, 700.0, 120.0, 20.0);
    let annot = Annotation::create(&ctx, AnnotationKind::Highlight, rect).unwrap();
    assert_eq!(annot.annotation_kind(), AnnotationKind::Highlight);
    assert_eq!(annot.rect().unwrap(), rect);

    let value = annot.object().value().unwrap();
    assert_eq!(
        value.get_key("Subtype").unwrap().unwrap().as_name().unwrap(),
        "Highlight"
    );
}

#[test]
fn external_annotation_resolves_its_kind_once() {
    let ctx = ctx();
    let entity: vellum_bind::SharedObject = std::rc::Rc::new(std::cell::RefCell::new(
        vellum_core::PdfObject::dict_from([
            ("Type", vellum_core::PdfObject::Name("Annot".to_string())),
            ("Subtype", vellum_core::PdfObject::Name("Widget".to_string())),
        ]),
    ));
    let annot = Annotation::from_external(&ctx, std::rc::Rc::clone(&entity)).unwrap();
    assert_eq!(annot.annotation_kind(), AnnotationKind::Widget);

    // Mutating the subtype afterwards does not change the cached kind.
    entity
        .borrow_mut()
        .set_key("Subtype", vellum_core::PdfObject::Name("Link".to_string()))
        .unwrap();
    assert_eq!(annot.annotation_kind(), AnnotationKind::Widget);
}

#[test]
fn unknown_subtype_is_carried_not_rejected() {
    let ctx = ctx();
    let entity: vellum_bind::SharedObject = std::rc::Rc::new(std::cell::RefCell::new(
        vellum_core::PdfObject::dict_from([(
            "Subtype",
            vellum_core::PdfObject::Name("VendorSpecial".to_string()),
        )]),
    ));
    let annot = Annotation::from_external(&ctx, entity).unwrap();
    assert_eq!(annot.annotation_kind(), AnnotationKind::Unknown);
}

#[test]
fn quad_points_round_trip_and_default_empty() {
    let ctx = ctx();
    let annot = Annotation::create(&ctx, AnnotationKind::Highlight, Rect::default()).unwrap();
    assert!(annot.quad_points().unwrap().is_empty());
    let points = [10.0, 20.0, 30.0, 20.0, 10.0, 40.0, 30.0, 40.0];
    annot.set_quad_points(&points).unwrap();
    assert_eq!(annot.quad_points().unwrap(), points);
}

#[test]
fn color_setter_requires_a_color_wrapper() {
    let ctx = ctx();
    let annot = Annotation::create(&ctx, AnnotationKind::Square, Rect::default()).unwrap();
    let grey = ColorValue::new(&ctx, Color::Greyscale(0.25)).unwrap();
    annot.set_color(&grey).unwrap();
    assert_eq!(annot.color().unwrap(), Some(Color::Greyscale(0.25)));

    let dest = Destination::fit(&ctx, PdfObjRef::new(1, 0)).unwrap();
    assert!(matches!(
        annot.set_color(&dest),
        Err(BindError::TypeMismatch { expected: "color", got: "destination" })
    ));
    // The earlier color is still in place.
    assert_eq!(annot.color().unwrap(), Some(Color::Greyscale(0.25)));
}

#[test]
fn cmyk_color_round_trips() {
    let ctx = ctx();
    let annot = Annotation::create(&ctx, AnnotationKind::Circle, Rect::default()).unwrap();
    let cmyk = ColorValue::new(&ctx, Color::Cmyk(0.1, 0.2, 0.3, 0.4)).unwrap();
    annot.set_color(&cmyk).unwrap();
    assert_eq!(annot.color().unwrap(), Some(Color::Cmyk(0.1, 0.2, 0.3, 0.4)));
}

#[test]
fn action_and_destination_are_optional_and_settable() {
    let ctx = ctx();
    let annot = Annotation::create(&ctx, AnnotationKind::Link, Rect::default()).unwrap();
    assert!(annot.action().unwrap().is_none());
    assert!(annot.destination().unwrap().is_none());

    let action = Action::uri(&ctx, "https://example.com/doc").unwrap();
    annot.set_action(&action).unwrap();
    let back = annot.action().unwrap().unwrap();
    assert_eq!(back.uri_value().unwrap().unwrap(), "https://example.com/doc");

    let page = PdfObjRef::new(4, 0);
    let dest = Destination::xyz(&ctx, page, 0.0, 792.0, 1.5).unwrap();
    annot.set_destination(&dest).unwrap();
    let back = annot.destination().unwrap().unwrap();
    assert_eq!(back.page().unwrap(), page);
    assert_eq!(back.fit_mode().unwrap(), "XYZ");
}

#[test]
fn attachment_round_trip() {
    let ctx = ctx();
    let annot =
        Annotation::create(&ctx, AnnotationKind::FileAttachment, Rect::default()).unwrap();
    assert!(annot.attachment().unwrap().is_none());

    let spec = FileSpec::new(&ctx, "report.csv", Some(b"a,b\n1,2\n")).unwrap();
    annot.set_attachment(&spec).unwrap();
    let back = annot.attachment().unwrap().unwrap();
    assert_eq!(back.file_name().unwrap().unwrap(), "report.csv");
    assert_eq!(back.embedded_data().unwrap().unwrap(), b"a,b\n1,2\n");
}

#[test]
fn appearance_stream_links_a_vault_resident_form_by_reference() {
    let ctx = ctx();
    let annot = Annotation::create(&ctx, AnnotationKind::Stamp, Rect::default()).unwrap();
    assert!(!annot.has_appearance_stream().unwrap());

    let form = XObject::new(&ctx, Rect::new(0.0, 0.0, 50.0, 50.0)).unwrap();
    annot.set_appearance_stream(&form).unwrap();
    assert!(annot.has_appearance_stream().unwrap());

    let ap = annot.object().get_key("AP").unwrap().unwrap();
    let normal = ap.get_key("N").unwrap().unwrap();
    assert_eq!(normal.as_reference().unwrap(), form.reference().unwrap());
}

#[test]
fn appearance_stream_rejects_non_xobject_wrappers() {
    let ctx = ctx();
    let annot = Annotation::create(&ctx, AnnotationKind::Stamp, Rect::default()).unwrap();
    let action = Action::uri(&ctx, "https://example.com").unwrap();
    assert!(matches!(
        annot.set_appearance_stream(&action),
        Err(BindError::TypeMismatch { expected: "xobject", got: "action" })
    ));
    assert!(!annot.has_appearance_stream().unwrap());
}

#[test]
fn border_style_writes_the_border_array() {
    let ctx = ctx();
    let annot = Annotation::create(&ctx, AnnotationKind::Link, Rect::default()).unwrap();
    annot.set_border_style(1.0, 1.0, 2.0).unwrap();
    let border = annot.object().get_key("Border").unwrap().unwrap();
    let items = border.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[2].as_num().unwrap(), 2.0);
}

#[test]
fn flag_bits_accumulate() {
    let ctx = ctx();
    let annot = Annotation::create(&ctx, AnnotationKind::Text, Rect::default()).unwrap();
    annot.set_flags(AnnotationFlags::HIDDEN).unwrap();
    let more = annot.flags().unwrap() | AnnotationFlags::NO_VIEW;
    annot.set_flags(more).unwrap();
    assert_eq!(
        annot.flags().unwrap(),
        AnnotationFlags::HIDDEN | AnnotationFlags::NO_VIEW
    );
}

#[test]
fn wrapper_kinds_are_reported() {
    let ctx = ctx();
    let annot = Annotation::create(&ctx, AnnotationKind::Text, Rect::default()).unwrap();
    assert_eq!(annot.kind().name(), "annotation");
}
