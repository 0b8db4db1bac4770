use super::*;

#[test]
fn get_image_converts_formats() {
    let img = FrameImage::solid(Size::new(2, 1), PixelFormat::Rgb24, [1, 2, 3, 0]);
    let mut frame = Frame::new(0, img);

    let rgba = frame
        .get_image(ImageRequest::new(PixelFormat::Rgb24a))
        .unwrap();
    assert_eq!(rgba.to_vec(), vec![1, 2, 3, 255, 1, 2, 3, 255]);

    let rgb = frame.get_image(ImageRequest::new(PixelFormat::Rgb24)).unwrap();
    assert_eq!(rgb.to_vec(), vec![1, 2, 3, 1, 2, 3]);
}

#[test]
fn same_format_shares_the_buffer() {
    let img = FrameImage::solid(Size::new(1, 1), PixelFormat::Rgb24a, [0, 0, 0, 0]);
    let buffer = img.buffer.clone();
    let mut frame = Frame::new(0, img);
    let got = frame
        .get_image(ImageRequest::new(PixelFormat::Rgb24a).writable(true))
        .unwrap();
    assert!(got.buffer.ptr_eq(&buffer));
}

#[test]
fn pushed_producers_run_last_in_first_out() {
    let img = FrameImage::solid(Size::new(1, 1), PixelFormat::Rgb24, [10, 10, 10, 0]);
    let mut frame = Frame::new(3, img);
    frame.push_get_image(|frame, req| {
        let img = frame.get_image(req)?;
        img.buffer.write()[0] += 1;
        Ok(img)
    });
    frame.push_get_image(|frame, req| {
        let img = frame.get_image(req)?;
        img.buffer.write()[0] *= 2;
        Ok(img)
    });

    let out = frame.get_image(ImageRequest::new(PixelFormat::Rgb24)).unwrap();
    assert_eq!(out.to_vec()[0], 22);
}

#[test]
fn unavailable_frame_reports_buffer_error() {
    let mut frame = Frame::unavailable(0, "decoder gone");
    let err = frame
        .get_image(ImageRequest::new(PixelFormat::Rgb24))
        .unwrap_err();
    assert_eq!(err.code(), 2);
}

#[test]
fn resolution_scale_defaults_to_one() {
    let frame = Frame::unavailable(0, "x");
    assert_eq!(frame.resolution_scale(), 1.0);
    frame.properties().set_double(CONSUMER_SCALE_PROPERTY, 0.5);
    assert_eq!(frame.resolution_scale(), 0.5);
    frame.properties().set_double(CONSUMER_SCALE_PROPERTY, -1.0);
    assert_eq!(frame.resolution_scale(), 1.0);
}

#[test]
fn consumer_stop_state_is_visible() {
    let consumer = Consumer::new();
    let frame = Frame::unavailable(0, "x").with_consumer(Arc::clone(&consumer));
    assert!(!frame.consumer_is_stopped());
    consumer.stop();
    assert!(frame.consumer_is_stopped());
    assert!(!Frame::unavailable(0, "x").consumer_is_stopped());
}
