use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LyricError::config("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        LyricError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(LyricError::render("x").to_string().contains("render error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LyricError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
