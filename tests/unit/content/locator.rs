use super::*;

#[test]
fn parse_recognizes_prefixes() {
    assert_eq!(
        ResourceLocator::parse("plain:fx/a.json").unwrap(),
        ResourceLocator::Plain(PathBuf::from("fx/a.json"))
    );
    assert_eq!(
        ResourceLocator::parse("json:{\"kind\":\"source\"}").unwrap(),
        ResourceLocator::Inline("{\"kind\":\"source\"}".to_string())
    );
    assert_eq!(
        ResourceLocator::parse("file:///tmp/a.json").unwrap(),
        ResourceLocator::File(PathBuf::from("/tmp/a.json"))
    );
    assert_eq!(
        ResourceLocator::parse(" fx/b.json ").unwrap(),
        ResourceLocator::File(PathBuf::from("fx/b.json"))
    );
}

#[test]
fn only_plain_prefix_is_plain() {
    assert!(ResourceLocator::parse("plain:x").unwrap().is_plain());
    assert!(!ResourceLocator::parse("x").unwrap().is_plain());
    assert!(!ResourceLocator::parse("json:{}").unwrap().is_plain());
}

#[test]
fn parse_rejects_empty() {
    assert!(ResourceLocator::parse("  ").is_err());
}

#[test]
fn missing_file_is_a_content_error() {
    let err = ResourceLocator::parse("/definitely/not/here.json")
        .unwrap()
        .read_to_string()
        .unwrap_err();
    assert!(err.to_string().contains("content error:"));
}
