use super::*;

#[test]
fn buffer_len_follows_format() {
    let s = Size::new(4, 3);
    assert_eq!(PixelFormat::Rgb24.buffer_len(s), 36);
    assert_eq!(PixelFormat::Rgb24a.buffer_len(s), 48);
    assert_eq!(PixelFormat::from_alpha(true), PixelFormat::Rgb24a);
    assert!(!PixelFormat::from_alpha(false).has_alpha());
}

#[test]
fn non_empty_rejects_zero_dimensions() {
    assert!(Size::non_empty(0, 10).is_err());
    assert!(Size::non_empty(10, 0).is_err());
    assert_eq!(Size::non_empty(2, 2).unwrap(), Size::new(2, 2));
}

#[test]
fn normalized_time_divides_without_clamping() {
    assert_eq!(normalized_time(5, 10), 0.5);
    assert_eq!(normalized_time(15, 10), 1.5);
    assert_eq!(normalized_time(-2, 4), -0.5);
    assert_eq!(normalized_time(3, 0), 0.0);
}
