use super::*;
use crate::model::{CreditHistory, Decision, ValidationError};
use crate::provider::{MockAiProvider, ProviderError};

fn sample_profile() -> ClientProfile {
    ClientProfile {
        age: 30,
        monthly_income: 3000.0,
        total_debt: 1000.0,
        credit_history: CreditHistory::Good,
        stable_employment: true,
        requested_amount: 5000.0,
        term_months: 12,
    }
}

fn canned_response() -> String {
    r#"{
        "decision": "Approved",
        "score": 82.0,
        "annual_rate": 14.0,
        "explanation": "Stable income, good history, similar cases repaid.",
        "monthly_payment": 450.0,
        "debt_ratio": 18.0,
        "key_factors": ["income", "history"]
    }"#
    .to_string()
}

fn evaluator_with(provider: Arc<MockAiProvider>) -> RagEvaluator {
    let index = Arc::new(RetrievalIndex::new());
    index.ingest(vec![
        vec![("age".to_string(), "31".to_string()), ("outcome".to_string(), "paid".to_string())],
        vec![("age".to_string(), "60".to_string()), ("outcome".to_string(), "defaulted".to_string())],
    ]);

    RagEvaluator::new(index, provider.clone(), provider)
}

#[tokio::test]
async fn test_evaluate_assembles_result() {
    let provider = Arc::new(MockAiProvider::new());
    let evaluator = evaluator_with(provider.clone());

    let cancel = CancelFlag::new();
    evaluator
        .index()
        .build_index(provider.as_ref(), 10, &cancel, |_| {})
        .await
        .expect("build succeeds");

    provider.push_response(Ok(canned_response()));

    let result = evaluator
        .evaluate(&sample_profile(), &cancel)
        .await
        .expect("evaluation succeeds");

    assert_eq!(result.decision, Decision::Approved);
    assert_eq!(result.total_score, 82.0);
    assert!((result.annual_rate - 0.14).abs() < 1e-9);
    assert_eq!(result.band, None);
    assert_eq!(result.factors, None);
    assert_eq!(result.key_factors, vec!["income", "history"]);

    let cases = result.similar_cases.expect("rag results carry cases");
    assert_eq!(cases.len(), 2);

    // the payment comes from the local amortization at the assigned rate,
    // not from the generated figure
    let expected =
        crate::model::finance::amortized_monthly_payment(5000.0, 0.14, 12);
    assert!((result.monthly_payment - expected).abs() < 1e-9);
    assert_ne!(result.monthly_payment, 450.0);
}

#[tokio::test]
async fn test_evaluate_with_unindexed_base_has_no_cases() {
    let provider = Arc::new(MockAiProvider::new());
    let evaluator = evaluator_with(provider.clone());

    // no build_index: records exist but carry no embeddings
    provider.push_response(Ok(canned_response()));

    let cancel = CancelFlag::new();
    let result = evaluator
        .evaluate(&sample_profile(), &cancel)
        .await
        .expect("evaluation succeeds without context");

    assert_eq!(result.similar_cases, Some(vec![]));
}

#[tokio::test]
async fn test_evaluate_rejects_invalid_profile() {
    let provider = Arc::new(MockAiProvider::new());
    let evaluator = evaluator_with(provider.clone());

    let profile = ClientProfile {
        monthly_income: 0.0,
        ..sample_profile()
    };

    let cancel = CancelFlag::new();
    let result = evaluator.evaluate(&profile, &cancel).await;

    assert!(matches!(
        result,
        Err(RagError::Validation(ValidationError::NonPositiveIncome { .. }))
    ));
    assert_eq!(provider.generate_calls(), 0, "fails before any provider call");
}

#[tokio::test]
async fn test_evaluate_surfaces_parse_error() {
    let provider = Arc::new(MockAiProvider::new());
    let evaluator = evaluator_with(provider.clone());

    provider.push_response(Ok("I cannot evaluate this applicant.".to_string()));

    let cancel = CancelFlag::new();
    let result = evaluator.evaluate(&sample_profile(), &cancel).await;

    assert!(matches!(
        result,
        Err(RagError::Parse(ParseError::NoJsonObject))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_evaluate_retries_generation() {
    let provider = Arc::new(MockAiProvider::new());
    let evaluator = evaluator_with(provider.clone());

    provider.push_response(Err(ProviderError::RateLimited {
        message: "429".to_string(),
    }));
    provider.push_response(Ok(canned_response()));

    let cancel = CancelFlag::new();
    let result = evaluator
        .evaluate(&sample_profile(), &cancel)
        .await
        .expect("second attempt succeeds");

    assert_eq!(result.decision, Decision::Approved);
    assert_eq!(provider.generate_calls(), 2);
}

#[test]
fn test_parse_bare_json() {
    let decision = parser::parse_decision(&canned_response()).expect("parses");
    assert_eq!(decision.decision, Decision::Approved);
    assert_eq!(decision.score, 82.0);
    assert!((decision.annual_rate - 0.14).abs() < 1e-9);
}

#[test]
fn test_parse_fenced_json() {
    let fenced = format!("```json\n{}\n```", canned_response());
    let decision = parser::parse_decision(&fenced).expect("fences stripped");
    assert_eq!(decision.decision, Decision::Approved);
}

#[test]
fn test_parse_json_with_surrounding_prose() {
    let noisy = format!(
        "Here is my assessment:\n{}\nLet me know if you need more.",
        canned_response()
    );
    let decision = parser::parse_decision(&noisy).expect("object extracted");
    assert_eq!(decision.decision, Decision::Approved);
}

#[test]
fn test_parse_rejects_missing_required_field() {
    let incomplete = r#"{"decision": "Approved", "score": 80.0}"#;
    assert!(matches!(
        parser::parse_decision(incomplete),
        Err(ParseError::Schema(_))
    ));
}

#[test]
fn test_parse_rejects_no_object() {
    assert!(matches!(
        parser::parse_decision("no json here"),
        Err(ParseError::NoJsonObject)
    ));
}

#[test]
fn test_parse_rejects_unknown_decision() {
    let odd = canned_response().replace("Approved", "Maybe");
    assert!(matches!(
        parser::parse_decision(&odd),
        Err(ParseError::UnknownDecision { .. })
    ));
}

#[test]
fn test_parse_rejects_out_of_range_score() {
    let odd = canned_response().replace("82.0", "182.0");
    assert!(matches!(
        parser::parse_decision(&odd),
        Err(ParseError::ScoreOutOfRange { .. })
    ));
}

#[test]
fn test_parse_decision_is_case_insensitive() {
    let lower = canned_response().replace("Approved", "approved");
    let decision = parser::parse_decision(&lower).expect("parses");
    assert_eq!(decision.decision, Decision::Approved);
}
