use super::*;

use std::sync::mpsc;
use std::time::Duration;

const DOC: &str = r#"{"ip":0,"op":60,"fr":30,"w":100,"h":100,"layers":[]}"#;
const OTHER_DOC: &str = r#"{"ip":0,"op":120,"fr":30,"w":200,"h":200,"layers":[]}"#;

fn loader() -> Arc<CompositionLoader> {
    Arc::new(CompositionLoader::new(NonZeroUsize::new(4).unwrap()))
}

#[test]
fn content_keys_are_stable_and_distinct() {
    assert_eq!(
        CompositionLoader::content_key(DOC),
        CompositionLoader::content_key(DOC)
    );
    assert_ne!(
        CompositionLoader::content_key(DOC),
        CompositionLoader::content_key(OTHER_DOC)
    );
}

#[test]
fn synchronous_loads_cache_by_key() {
    let loader = loader();
    let first = loader.load_json(Some("doc"), DOC).unwrap();
    let second = loader.load_json(Some("doc"), DOC).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(loader.cached("doc").is_some());
}

#[test]
fn keyless_loads_fall_back_to_the_content_hash() {
    let loader = loader();
    let first = loader.load_json(None, DOC).unwrap();
    let second = loader.load_json(None, DOC).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(loader.cached(&CompositionLoader::content_key(DOC)).is_some());
}

#[test]
fn malformed_documents_are_a_parse_error() {
    let loader = loader();
    let error = loader.load_json(Some("bad"), "{\"not\":\"a document\"}");
    assert!(matches!(error, Err(AnimyteError::Parse(_))));
    assert!(loader.cached("bad").is_none());
}

#[test]
fn background_loads_deliver_to_the_listener() {
    let loader = loader();
    let (tx, rx) = mpsc::channel();
    loader.load_in_background(
        "doc",
        DOC.to_owned(),
        Box::new(move |result| {
            tx.send(result).unwrap();
        }),
    );

    let result = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    let composition = result.unwrap();
    assert_eq!(composition.range.end, 60.0);
    // The parsed composition is cached for later synchronous loads.
    let cached = loader.cached("doc").unwrap();
    assert!(Arc::ptr_eq(&cached, &composition));
}

#[test]
fn background_parse_failures_fan_the_error() {
    let loader = loader();
    let (tx, rx) = mpsc::channel();
    loader.load_in_background(
        "bad",
        "[1, 2, 3]".to_owned(),
        Box::new(move |result| {
            tx.send(result).unwrap();
        }),
    );

    let result = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert!(matches!(result, Err(error) if matches!(*error, AnimyteError::Parse(_))));
}

#[test]
fn cache_hits_deliver_before_returning() {
    let loader = loader();
    loader.load_json(Some("doc"), DOC).unwrap();

    let (tx, rx) = mpsc::channel();
    let handle = loader.load_in_background(
        "doc",
        DOC.to_owned(),
        Box::new(move |result| {
            tx.send(result).unwrap();
        }),
    );
    assert!(rx.try_recv().unwrap().is_ok());

    // Cancelling after delivery is a harmless no-op.
    handle.cancel();
}

#[test]
fn clearing_the_cache_forces_a_reparse() {
    let loader = loader();
    let first = loader.load_json(Some("doc"), DOC).unwrap();
    loader.clear_cache();
    let second = loader.load_json(Some("doc"), DOC).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}
