use super::*;

fn snap(size: Size, format: PixelFormat, px: [u8; 4]) -> Snapshot {
    let bpp = format.bytes_per_pixel();
    Snapshot {
        bytes: px[..bpp].repeat(size.pixel_count()),
        size,
        format,
    }
}

#[test]
fn parse_fill_and_wipe() {
    let doc = SceneDocument::parse(r#"{"effect":{"kind":"fill","color":[1,2,3,4]}}"#).unwrap();
    assert_eq!(doc.effect, SceneEffect::Fill { color: [1, 2, 3, 4] });
    assert!(doc.image_type_map().is_empty());

    let doc =
        SceneDocument::parse(r#"{"effect":{"kind":"wipe","dir":"ttb","soft_edge":7.0}}"#).unwrap();
    assert_eq!(
        doc.effect,
        SceneEffect::Wipe {
            dir: WipeDir::TopToBottom,
            soft_edge: 1.0
        }
    );
}

#[test]
fn parse_errors_are_serde_errors() {
    let err = SceneDocument::parse(r#"{"effect":{"kind":"sparkles"}}"#).unwrap_err();
    assert!(err.to_string().contains("serialization error:"));
}

#[test]
fn default_slots_follow_effect() {
    let doc = SceneDocument::parse(r#"{"effect":{"kind":"crossfade"}}"#).unwrap();
    assert_eq!(doc.slot_name(ImageType::Source).as_deref(), Some("source"));
    assert_eq!(doc.slot_name(ImageType::Target).as_deref(), Some("target"));

    let doc = SceneDocument::parse(
        r#"{"effect":{"kind":"source"},"images":{"video":"source","logo":"extra"}}"#,
    )
    .unwrap();
    assert_eq!(doc.slot_name(ImageType::Source).as_deref(), Some("video"));
    assert_eq!(doc.slot_name(ImageType::Target), None);
}

#[test]
fn fill_paints_every_pixel() {
    let size = Size::new(3, 2);
    let mut dst = vec![0u8; PixelFormat::Rgb24.buffer_len(size)];
    let inputs = PaintInputs {
        time: 0.0,
        source: None,
        target: None,
    };
    paint(
        &SceneEffect::Fill {
            color: [128, 128, 128, 255],
        },
        &inputs,
        &mut dst,
        size,
        PixelFormat::Rgb24,
    )
    .unwrap();
    assert!(dst.iter().all(|&v| v == 128));
}

#[test]
fn crossfade_midpoint_mixes_inputs() {
    let size = Size::new(2, 2);
    let inputs = PaintInputs {
        time: 0.5,
        source: Some(snap(size, PixelFormat::Rgb24a, [0, 0, 0, 255])),
        target: Some(snap(size, PixelFormat::Rgb24a, [200, 100, 50, 255])),
    };
    let mut dst = vec![0u8; PixelFormat::Rgb24a.buffer_len(size)];
    paint(
        &SceneEffect::Crossfade,
        &inputs,
        &mut dst,
        size,
        PixelFormat::Rgb24a,
    )
    .unwrap();
    assert_eq!(&dst[..4], &[100, 50, 25, 255]);
}

#[test]
fn wipe_reveals_target_from_the_left() {
    let size = Size::new(4, 1);
    let inputs = PaintInputs {
        time: 0.5,
        source: Some(snap(size, PixelFormat::Rgb24, [0, 0, 0, 0])),
        target: Some(snap(size, PixelFormat::Rgb24, [255, 255, 255, 0])),
    };
    let mut dst = vec![7u8; PixelFormat::Rgb24.buffer_len(size)];
    paint(
        &SceneEffect::Wipe {
            dir: WipeDir::LeftToRight,
            soft_edge: 0.0,
        },
        &inputs,
        &mut dst,
        size,
        PixelFormat::Rgb24,
    )
    .unwrap();
    assert_eq!(dst, vec![255, 255, 255, 255, 255, 255, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn missing_slot_is_reported() {
    let size = Size::new(1, 1);
    let inputs = PaintInputs {
        time: 0.0,
        source: None,
        target: None,
    };
    let mut dst = vec![0u8; 3];
    let err = paint(
        &SceneEffect::Source,
        &inputs,
        &mut dst,
        size,
        PixelFormat::Rgb24,
    )
    .unwrap_err();
    assert!(err.to_string().contains("'source'"));
}

#[test]
fn source_is_resampled_to_target_size() {
    let src = Snapshot {
        bytes: vec![10, 10, 10, 20, 20, 20],
        size: Size::new(2, 1),
        format: PixelFormat::Rgb24,
    };
    let inputs = PaintInputs {
        time: 0.0,
        source: Some(src),
        target: None,
    };
    let size = Size::new(4, 1);
    let mut dst = vec![0u8; PixelFormat::Rgb24a.buffer_len(size)];
    paint(
        &SceneEffect::Source,
        &inputs,
        &mut dst,
        size,
        PixelFormat::Rgb24a,
    )
    .unwrap();
    assert_eq!(
        dst,
        vec![10, 10, 10, 255, 10, 10, 10, 255, 20, 20, 20, 255, 20, 20, 20, 255]
    );
}
