use super::*;
use serde_json::json;

fn decode_json(value: serde_json::Value) -> Result<CandidateMessage, MessageError> {
    CandidateMessage::decode(&serde_json::to_vec(&value).unwrap())
}

#[test]
fn test_decode_minimal_payload() {
    let msg = decode_json(json!({"id": 1, "expected": "Paris", "answer": "Paris"})).unwrap();

    assert_eq!(msg.id, json!(1));
    assert_eq!(msg.expected, "Paris");
    assert_eq!(msg.answer, "Paris");
    assert_eq!(msg.retries, RetryLedger::new(0));
    assert!(msg.score.is_none());
    assert!(msg.extra.is_empty());
}

#[test]
fn test_missing_retries_equals_explicit_zero() {
    let absent = decode_json(json!({"id": 9, "expected": "a", "answer": "b"})).unwrap();
    let zero = decode_json(json!({"id": 9, "expected": "a", "answer": "b", "retries": 0})).unwrap();

    assert_eq!(absent, zero);
}

#[test]
fn test_decode_missing_expected_is_malformed() {
    let err = decode_json(json!({"id": 1, "answer": "Paris"})).unwrap_err();
    assert!(matches!(err, MessageError::Malformed { .. }));
    assert!(err.to_string().contains("expected"));
}

#[test]
fn test_decode_missing_id_is_malformed() {
    let err = decode_json(json!({"expected": "Paris", "answer": "Paris"})).unwrap_err();
    assert!(matches!(err, MessageError::Malformed { .. }));
}

#[test]
fn test_decode_negative_retries_is_malformed() {
    let err = decode_json(json!({"id": 1, "expected": "a", "answer": "b", "retries": -1}))
        .unwrap_err();
    assert!(matches!(err, MessageError::Malformed { .. }));
}

#[test]
fn test_decode_invalid_bytes_is_malformed() {
    assert!(matches!(
        CandidateMessage::decode(b"not json"),
        Err(MessageError::Malformed { .. })
    ));
    assert!(matches!(
        CandidateMessage::decode(&[0xff, 0xfe, 0x00]),
        Err(MessageError::Malformed { .. })
    ));
}

#[test]
fn test_unknown_fields_are_preserved() {
    let msg = decode_json(json!({
        "id": "q-17",
        "expected": "Paris",
        "answer": "Lyon",
        "question": "Capital of France?",
        "model": "gen-v2"
    }))
    .unwrap();

    assert_eq!(msg.extra.get("question"), Some(&json!("Capital of France?")));

    let regenerated = msg.into_regeneration(RetryLedger::new(1));
    let encoded: serde_json::Value =
        serde_json::from_slice(&regenerated.encode().unwrap()).unwrap();

    assert_eq!(encoded["question"], json!("Capital of France?"));
    assert_eq!(encoded["model"], json!("gen-v2"));
    assert_eq!(encoded["retries"], json!(1));
}

#[test]
fn test_into_validated_attaches_fresh_score() {
    let msg = CandidateMessage::new(1, "Paris", "Paris").into_validated(1.0);
    let encoded: serde_json::Value = serde_json::from_slice(&msg.encode().unwrap()).unwrap();

    assert_eq!(encoded["score"], json!(1.0));
    assert_eq!(encoded["retries"], json!(0));
}

#[test]
fn test_into_validated_replaces_stale_score() {
    let stale = decode_json(json!({"id": 5, "expected": "a", "answer": "a", "score": 0.2})).unwrap();
    let validated = stale.into_validated(0.9);
    assert_eq!(validated.score, Some(0.9));
}

#[test]
fn test_into_regeneration_strips_score() {
    let stale = decode_json(json!({"id": 5, "expected": "a", "answer": "b", "score": 0.2})).unwrap();
    let regenerated = stale.into_regeneration(RetryLedger::new(1));

    assert!(regenerated.score.is_none());
    let encoded: serde_json::Value =
        serde_json::from_slice(&regenerated.encode().unwrap()).unwrap();
    assert!(encoded.get("score").is_none());
}

#[test]
fn test_key_rendering() {
    assert_eq!(CandidateMessage::new(42, "a", "b").key(), "42");
    assert_eq!(CandidateMessage::new("q-1", "a", "b").key(), "q-1");
}

#[test]
fn test_ledger_bounds() {
    let ledger = RetryLedger::new(1);
    assert!(ledger.has_remaining(2));
    assert!(!ledger.advance().has_remaining(2));
    assert!(!RetryLedger::new(0).has_remaining(0));
    assert_eq!(ledger.advance().count(), 2);
}

#[test]
fn test_ledger_advance_saturates() {
    assert_eq!(RetryLedger::new(u32::MAX).advance().count(), u32::MAX);
}

#[test]
fn test_ledger_serializes_as_integer() {
    assert_eq!(serde_json::to_value(RetryLedger::new(3)).unwrap(), json!(3));
    assert_eq!(RetryLedger::new(3).to_string(), "3");
}
