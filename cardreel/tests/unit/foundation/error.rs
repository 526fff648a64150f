use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(ReelError::asset("x").to_string().contains("asset error:"));
    assert!(ReelError::render("x").to_string().contains("render error:"));
    assert!(ReelError::encode("x").to_string().contains("encode error:"));
    assert!(
        ReelError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert_eq!(ReelError::Cancelled.to_string(), "render cancelled");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
