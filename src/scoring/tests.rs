use super::error::ScoringError;
use super::mock::{FixedScorer, ScriptedScorer};
use super::scorer::{LexicalScorer, Scorer, ensure_unit_interval};
use std::sync::Arc;

#[test]
fn test_identical_answers_score_one() {
    let scorer = LexicalScorer::new();
    assert_eq!(scorer.score("Paris", "Paris").unwrap(), 1.0);
}

#[test]
fn test_normalization_ignores_case_and_spacing() {
    let scorer = LexicalScorer::new();
    let score = scorer
        .score("The capital is Paris", "  the   CAPITAL is\tparis ")
        .unwrap();
    assert_eq!(score, 1.0);
}

#[test]
fn test_unrelated_answers_score_below_threshold() {
    let scorer = LexicalScorer::new();
    let score = scorer.score("Paris", "London").unwrap();
    assert!(score < 0.7, "got {score}");
}

#[test]
fn test_near_match_scores_above_threshold() {
    let scorer = LexicalScorer::new();
    let score = scorer.score("Paris, France", "Paris France").unwrap();
    assert!(score >= 0.7, "got {score}");
}

#[test]
fn test_lexical_scores_stay_in_unit_interval() {
    let scorer = LexicalScorer::new();
    let pairs = [
        ("", ""),
        ("", "something"),
        ("a", "b"),
        ("long reference answer", "x"),
        ("ñandú", "nandu"),
    ];
    for (reference, candidate) in pairs {
        let score = scorer.score(reference, candidate).unwrap();
        assert!(ensure_unit_interval(score).is_ok(), "{reference:?} vs {candidate:?}: {score}");
    }
}

#[test]
fn test_scoring_is_idempotent() {
    let scorer = LexicalScorer::new();
    let first = scorer.score("Madrid", "Barcelona").unwrap();
    let second = scorer.score("Madrid", "Barcelona").unwrap();
    assert_eq!(first.to_bits(), second.to_bits());

    let stub = FixedScorer::new(0.42);
    assert_eq!(stub.score("a", "b").unwrap(), stub.score("a", "b").unwrap());
}

#[test]
fn test_ensure_unit_interval() {
    assert_eq!(ensure_unit_interval(0.0).unwrap(), 0.0);
    assert_eq!(ensure_unit_interval(1.0).unwrap(), 1.0);
    assert!(matches!(
        ensure_unit_interval(1.01),
        Err(ScoringError::OutOfRange { .. })
    ));
    assert!(matches!(
        ensure_unit_interval(-0.5),
        Err(ScoringError::OutOfRange { .. })
    ));
    assert!(ensure_unit_interval(f64::NAN).is_err());
    assert!(ensure_unit_interval(f64::INFINITY).is_err());
}

#[test]
fn test_scripted_scorer() {
    let scorer = ScriptedScorer::new(0.1)
        .with("Paris", 1.0)
        .fail_on("boom");

    assert_eq!(scorer.score("Paris", "Paris").unwrap(), 1.0);
    assert_eq!(scorer.score("Paris", "London").unwrap(), 0.1);
    assert!(matches!(
        scorer.score("Paris", "boom"),
        Err(ScoringError::ComputationFailed { .. })
    ));
}

#[test]
fn test_shared_scorer_delegates() {
    let shared: Arc<dyn Scorer> = Arc::new(FixedScorer::new(0.8));
    assert_eq!(shared.score("x", "y").unwrap(), 0.8);

    let boxed: Box<dyn Scorer> = Box::new(LexicalScorer::new());
    assert_eq!(boxed.score("x", "x").unwrap(), 1.0);
}

#[test]
fn test_error_display() {
    let err = ScoringError::OutOfRange { score: 1.5 };
    assert!(err.to_string().contains("1.5"));
}
