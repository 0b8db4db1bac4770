use super::*;

#[test]
fn new_checks_declared_size() {
    let buf = PixelBuffer::zeroed(2 * 2 * 4);
    assert!(Image::new(buf.clone(), 2, 2, 16, true).is_ok());
    assert!(Image::new(buf.clone(), 2, 2, 12, true).is_err());
    assert!(Image::new(buf, 2, 2, 12, false).is_ok());
}

#[test]
fn new_rejects_short_buffer() {
    let buf = PixelBuffer::zeroed(10);
    let err = Image::new(buf, 2, 2, 16, true).unwrap_err();
    assert!(err.to_string().contains("exceeds buffer length"));
}

#[test]
fn views_share_pixels() {
    let buf = PixelBuffer::zeroed(3);
    let img = Image::with_format(buf.clone(), Size::new(1, 1), PixelFormat::Rgb24).unwrap();
    img.pixels_mut().unwrap()[0] = 9;
    assert_eq!(buf.to_vec(), vec![9, 0, 0]);
    assert!(img.buffer.ptr_eq(&buf));
}

#[test]
fn read_only_view_refuses_writes() {
    let buf = PixelBuffer::zeroed(3);
    let img = Image::with_format(buf, Size::new(1, 1), PixelFormat::Rgb24)
        .unwrap()
        .into_read_only();
    assert!(!img.is_writable());
    assert!(img.pixels_mut().is_err());
    assert_eq!(img.snapshot(), vec![0, 0, 0]);
}

#[test]
fn read_only_clones_stay_read_only() {
    let buf = PixelBuffer::new(vec![7; 4]);
    let img = Image::with_format(buf.clone(), Size::new(1, 1), PixelFormat::Rgb24a)
        .unwrap()
        .into_read_only();
    let copy = img.clone();
    assert!(!copy.is_writable());
    assert!(copy.pixels_mut().is_err());
    assert_eq!(buf.to_vec(), vec![7; 4]);
}

#[test]
fn try_into_inner_requires_sole_handle() {
    let buf = PixelBuffer::new(vec![1, 2]);
    let other = buf.clone();
    let buf = buf.try_into_inner().unwrap_err();
    drop(other);
    assert_eq!(buf.try_into_inner().unwrap(), vec![1, 2]);
}
