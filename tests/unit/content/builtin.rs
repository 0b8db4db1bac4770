use super::*;
use crate::content::image::PixelBuffer;
use crate::content::parameters::PropertyParameters;
use crate::foundation::core::PixelFormat;
use crate::host::properties::Properties;
use crate::service::handshake::{RenderOutcome, RenderSignal};
use std::time::Duration;

fn content(props: &Properties) -> SceneContent {
    SceneContent::new(
        Size::new(2, 2),
        Arc::new(PropertyParameters::new(props.clone())),
    )
    .unwrap()
}

fn inline(doc: &str) -> ResourceLocator {
    ResourceLocator::Inline(doc.to_string())
}

fn render(content: &mut SceneContent, time: f64, target: &Image) -> RenderOutcome {
    let signal = RenderSignal::new();
    content.render_content(
        RenderRequest {
            time,
            target: target.clone(),
            scale: None,
        },
        signal.arm(),
    );
    signal.wait(Some(Duration::from_secs(5)))
}

#[test]
fn fill_renders_asynchronously() {
    let props = Properties::new();
    let mut c = content(&props);
    c.load_content(&inline(r#"{"effect":{"kind":"fill","color":[128,128,128,255]}}"#)).unwrap();
    let buf = PixelBuffer::zeroed(12);
    let target = Image::with_format(buf.clone(), Size::new(2, 2), PixelFormat::Rgb24).unwrap();
    assert_eq!(render(&mut c, 0.0, &target), RenderOutcome::Completed);
    assert_eq!(buf.to_vec(), vec![128; 12]);
}

#[test]
fn color_parameter_overrides_fill() {
    let props = Properties::new();
    props.set_string("color", "10, 20, 30");
    let mut c = content(&props);
    c.load_content(&inline(r#"{"effect":{"kind":"fill","color":[0,0,0,0]}}"#)).unwrap();
    let buf = PixelBuffer::zeroed(4);
    let target = Image::with_format(buf.clone(), Size::new(1, 1), PixelFormat::Rgb24a).unwrap();
    assert_eq!(render(&mut c, 0.0, &target), RenderOutcome::Completed);
    assert_eq!(buf.to_vec(), vec![10, 20, 30, 255]);
}

#[test]
fn source_may_share_the_output_buffer() {
    let props = Properties::new();
    let mut c = content(&props);
    c.load_content(&inline(r#"{"effect":{"kind":"source"}}"#)).unwrap();
    let buf = PixelBuffer::new(vec![5, 6, 7]);
    let target = Image::with_format(buf.clone(), Size::new(1, 1), PixelFormat::Rgb24).unwrap();
    c.set_image("source", Some(target.clone()));
    assert_eq!(render(&mut c, 0.0, &target), RenderOutcome::Completed);
    assert_eq!(buf.to_vec(), vec![5, 6, 7]);
}

#[test]
fn missing_slot_fails_the_render() {
    let props = Properties::new();
    let mut c = content(&props);
    c.load_content(&inline(r#"{"effect":{"kind":"crossfade"}}"#)).unwrap();
    let target =
        Image::with_format(PixelBuffer::zeroed(3), Size::new(1, 1), PixelFormat::Rgb24).unwrap();
    assert!(matches!(
        render(&mut c, 0.5, &target),
        RenderOutcome::Failed(_)
    ));
}

#[test]
fn unloaded_content_fails_the_render() {
    let props = Properties::new();
    let mut c = content(&props);
    let target =
        Image::with_format(PixelBuffer::zeroed(3), Size::new(1, 1), PixelFormat::Rgb24).unwrap();
    assert!(matches!(
        render(&mut c, 0.0, &target),
        RenderOutcome::Failed(_)
    ));
}

#[test]
fn size_changes_are_validated() {
    let props = Properties::new();
    let mut c = content(&props);
    assert!(c.set_content_size(Size::new(0, 4)).is_err());
    c.set_content_size(Size::new(8, 4)).unwrap();
    assert_eq!(c.content_size(), Size::new(8, 4));
    let params = Arc::new(PropertyParameters::new(props));
    assert!(SceneContent::new(Size::new(0, 0), params).is_err());
}

#[test]
fn parse_color_accepts_rgb_and_rgba() {
    assert_eq!(parse_color("1,2,3"), Some([1, 2, 3, 255]));
    assert_eq!(parse_color("1,2,3,4"), Some([1, 2, 3, 4]));
    assert_eq!(parse_color(""), None);
    assert_eq!(parse_color("1,2"), None);
    assert_eq!(parse_color("1,2,300"), None);
}
