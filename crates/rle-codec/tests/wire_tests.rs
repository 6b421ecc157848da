//! JSON wire shapes for runs and streams.

use rle_codec::{encode, CodecError, EncodedStream, NamedRun, Run, RunShape, ShapedRuns};

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_run_serializes_as_pair() {
    let json = serde_json::to_string(&Run::new(3, 7)).unwrap();
    assert_eq!(json, "[3,7]");
}

#[test]
fn test_stream_serializes_as_array_of_pairs() {
    let stream = encode(&[3, 3, 3, 7, 7, 2]);
    let json = serde_json::to_string(&stream).unwrap();
    assert_eq!(json, "[[3,3],[2,7],[1,2]]");
}

#[test]
fn test_shaped_pairs() {
    let shaped = ShapedRuns::new(encode(&[3, 3, 3]), RunShape::Pairs);
    assert_eq!(serde_json::to_string(&shaped).unwrap(), "[[3,3]]");
}

#[test]
fn test_shaped_named() {
    let shaped = ShapedRuns::new(encode(&[3, 3, 3, 0]), RunShape::Named);
    assert_eq!(
        serde_json::to_string(&shaped).unwrap(),
        r#"[{"V":3,"C":3},{"V":0,"C":1}]"#
    );
}

#[test]
fn test_empty_stream_serializes_as_empty_array() {
    let shaped = ShapedRuns::new(EncodedStream::new(), RunShape::Named);
    assert_eq!(serde_json::to_string(&shaped).unwrap(), "[]");
}

// ============================================================================
// Deserialization
// ============================================================================

#[test]
fn test_deserialize_pairs() {
    let stream: EncodedStream = serde_json::from_str("[[3,3],[2,7],[1,2]]").unwrap();
    assert_eq!(stream.decode().unwrap(), vec![3, 3, 3, 7, 7, 2]);
}

#[test]
fn test_deserialize_named() {
    let stream: EncodedStream =
        serde_json::from_str(r#"[{"V":3,"C":3},{"C":2,"V":7}]"#).unwrap();
    assert_eq!(stream.runs(), &[Run::new(3, 3), Run::new(2, 7)]);
}

#[test]
fn test_deserialize_mixed_shapes() {
    let stream: EncodedStream = serde_json::from_str(r#"[[1,5],{"V":6,"C":2}]"#).unwrap();
    assert_eq!(stream.decode().unwrap(), vec![5, 6, 6]);
}

#[test]
fn test_deserialize_rejects_zero_count() {
    let err = serde_json::from_str::<EncodedStream>("[[0,3]]").unwrap_err();
    assert!(err.to_string().contains(&CodecError::InvalidCount(0).to_string()));
}

#[test]
fn test_deserialize_rejects_negative_count() {
    let err = serde_json::from_str::<Run>(r#"{"V":1,"C":-4}"#).unwrap_err();
    assert!(err.to_string().contains("-4"));
}

#[test]
fn test_named_run_field_names() {
    let json = serde_json::to_string(&NamedRun { value: -1, count: 9 }).unwrap();
    assert_eq!(json, r#"{"V":-1,"C":9}"#);
}

#[test]
fn test_deserialize_rejects_zero_count_named() {
    let err = serde_json::from_str::<Run>(r#"{"V":1,"C":0}"#).unwrap_err();
    assert!(err.to_string().contains(&CodecError::InvalidCount(0).to_string()));

    assert!(serde_json::from_str::<EncodedStream>(r#"[{"V":1,"C":0}]"#).is_err());
    assert!(serde_json::from_str::<EncodedStream>(r#"[[2,4],{"C":0,"V":4}]"#).is_err());
}
