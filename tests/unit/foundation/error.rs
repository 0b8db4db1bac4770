use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        VfxError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(VfxError::buffer("x").to_string().contains("buffer error:"));
    assert!(VfxError::content("x").to_string().contains("content error:"));
    assert!(
        VfxError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn codes_are_non_zero() {
    assert_eq!(VfxError::buffer("x").code(), 2);
    assert_eq!(VfxError::content("x").code(), 1);
    assert_eq!(VfxError::validation("x").code(), 1);
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = VfxError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.code(), 1);
}
