use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        AnimyteError::parse("x")
            .to_string()
            .contains("parse error:")
    );
    assert!(
        AnimyteError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        AnimyteError::render("x")
            .to_string()
            .contains("render fault:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AnimyteError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
