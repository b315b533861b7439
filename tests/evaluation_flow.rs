//! End-to-end evaluation flow over mock collaborators.

mod common;

use anyhow::Result;

use credo::audit::{AnalystDecision, AuditFilter, DecisionMethod, EntryStatus};
use credo::{Decision, EvaluationError, LedgerError};

use common::fixtures::{build_stack, rag_response, reference_profile, weak_profile};

#[tokio::test]
async fn test_full_evaluation_and_analyst_flow() -> Result<()> {
    let stack = build_stack().await;

    stack
        .index
        .build_index(
            stack.provider.as_ref(),
            credo::DEFAULT_BATCH_SIZE,
            &credo::CancelFlag::new(),
            |_| {},
        )
        .await?;

    stack
        .provider
        .push_response(Ok(rag_response("Approved", 82.0)));

    let record = stack
        .evaluator
        .evaluate(Some("analyst-7"), &reference_profile())
        .await?;

    // both engines ran over the same profile
    assert_eq!(record.scorecard.decision, Decision::Approved);
    assert_eq!(record.scorecard.band.as_deref(), Some("AA - Very Good"));
    assert_eq!(record.rag.decision, Decision::Approved);
    let cases = record.rag.similar_cases.as_ref().expect("cases attached");
    assert_eq!(cases.len(), 3);

    // pending until the analyst decides
    let ledger = stack.evaluator.ledger();
    let entry = ledger.get(&record.id).await.expect("logged");
    assert_eq!(entry.status, EntryStatus::Pending);
    assert_eq!(entry.user, "analyst-7");

    ledger
        .update_analyst_decision(
            &record.id,
            AnalystDecision::new(
                DecisionMethod::Rag,
                Decision::Approved,
                "RAG context matches repaid cases",
                None,
            ),
        )
        .await?;

    let decided = ledger.get(&record.id).await.expect("still there");
    assert_eq!(decided.status, EntryStatus::Approved);

    // the transition is exactly-once
    let second = ledger
        .update_analyst_decision(
            &record.id,
            AnalystDecision::new(DecisionMethod::Scorecard, Decision::Rejected, "", None),
        )
        .await;
    assert!(matches!(second, Err(LedgerError::AlreadyDecided { .. })));

    // persisted through the store collaborator on every mutation
    assert_eq!(stack.store.save_count(), 2);
    assert_eq!(stack.store.persisted().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_disagreement_is_quantified_and_filterable() -> Result<()> {
    let stack = build_stack().await;

    // RAG rejects the applicant the scorecard approves
    stack
        .provider
        .push_response(Ok(rag_response("Rejected", 45.0)));
    let disagreeing = stack.evaluator.evaluate(None, &reference_profile()).await?;

    // both reject the weak applicant
    stack
        .provider
        .push_response(Ok(rag_response("Rejected", 30.0)));
    let agreeing = stack.evaluator.evaluate(None, &weak_profile()).await?;

    assert!(disagreeing.comparison.score_delta < 0.0);
    assert!(
        disagreeing
            .comparison
            .score_delta_label
            .starts_with('-')
    );

    let ledger = stack.evaluator.ledger();
    let stats = ledger.statistics().await;
    assert_eq!(stats.total, 2);
    assert_eq!(stats.agreement_rate_pct, 50.0);
    assert_eq!(stats.pending, 2);

    ledger
        .update_analyst_decision(
            &agreeing.id,
            AnalystDecision::new(DecisionMethod::Scorecard, Decision::Rejected, "weak", None),
        )
        .await?;

    let rejected = ledger
        .filter(&AuditFilter {
            status: Some(EntryStatus::Rejected),
            ..Default::default()
        })
        .await;
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].id, agreeing.id);

    let by_method = ledger
        .filter(&AuditFilter {
            method: Some(DecisionMethod::Scorecard),
            ..Default::default()
        })
        .await;
    assert_eq!(by_method.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_csv_export_covers_all_entries() -> Result<()> {
    let stack = build_stack().await;

    for score in [82.0, 55.0] {
        stack
            .provider
            .push_response(Ok(rag_response("Approved", score)));
        stack.evaluator.evaluate(None, &reference_profile()).await?;
    }

    let csv_text = stack.evaluator.ledger().export_csv().await?;
    assert_eq!(csv_text.trim_end().lines().count(), 3, "header + 2 entries");

    let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
    for record in reader.records() {
        let record = record?;
        assert_eq!(&record[10], "Approved"); // Decision_RAG
        assert_eq!(&record[21], "Pending"); // Status
    }

    let stats_json = stack.evaluator.ledger().export_stats_json().await?;
    let stats: serde_json::Value = serde_json::from_str(&stats_json)?;
    assert_eq!(stats["total"], 2);

    Ok(())
}

#[tokio::test]
async fn test_malformed_generation_fails_only_that_request() -> Result<()> {
    let stack = build_stack().await;

    stack
        .provider
        .push_response(Ok("```json\n{\"decision\": \"Approved\"}\n```".to_string()));

    let failed = stack.evaluator.evaluate(None, &reference_profile()).await;
    assert!(matches!(failed, Err(EvaluationError::Rag(_))));
    assert!(stack.evaluator.ledger().is_empty().await);

    // the next well-formed evaluation goes through
    stack
        .provider
        .push_response(Ok(rag_response("Approved", 82.0)));
    let record = stack.evaluator.evaluate(None, &reference_profile()).await?;
    assert_eq!(record.rag.decision, Decision::Approved);
    assert_eq!(stack.evaluator.ledger().len().await, 1);

    Ok(())
}
