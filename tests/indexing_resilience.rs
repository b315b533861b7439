//! Degradation behavior of the batch-embedding loop under provider
//! failures.

mod common;

use anyhow::Result;

use credo::{CancelFlag, IndexProgress, ProviderError, RetrievalError};

use common::fixtures::build_stack;

#[tokio::test(start_paused = true)]
async fn test_rate_limited_batch_recovers_with_progress() -> Result<()> {
    let stack = build_stack().await;

    stack.provider.push_embed_failure(ProviderError::RateLimited {
        message: "quota exceeded".to_string(),
    });

    let cancel = CancelFlag::new();
    let mut events = Vec::new();
    let embedded = stack
        .index
        .build_index(stack.provider.as_ref(), 10, &cancel, |p| events.push(p))
        .await?;

    assert_eq!(embedded, 3);
    assert_eq!(stack.index.unembedded_count(), 0);

    // a "waiting" message, then resumed progress
    assert!(matches!(events[0], IndexProgress::Backoff { attempt: 1, .. }));
    assert!(matches!(
        events[1],
        IndexProgress::BatchEmbedded { processed: 3, total: 3 }
    ));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_batch_degrades_search_not_build() -> Result<()> {
    let stack = build_stack().await;

    // the first batch of 2 exhausts its three attempts
    for _ in 0..3 {
        stack.provider.push_embed_failure(ProviderError::Unavailable {
            message: "backend down".to_string(),
        });
    }

    let cancel = CancelFlag::new();
    let embedded = stack
        .index
        .build_index(stack.provider.as_ref(), 2, &cancel, |_| {})
        .await?;

    // 3 records, batch size 2: first batch skipped, second embedded
    assert_eq!(embedded, 1);
    assert_eq!(stack.index.unembedded_count(), 2);

    // search still works, ranking only the embedded records
    let hits = stack
        .index
        .search(stack.provider.as_ref(), "age: 40, income: 4500", 10, &cancel)
        .await?;
    assert_eq!(hits.len(), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_auth_failure_aborts_the_build() {
    let stack = build_stack().await;

    stack.provider.push_embed_failure(ProviderError::Auth {
        message: "invalid api key".to_string(),
    });

    let cancel = CancelFlag::new();
    let result = stack
        .index
        .build_index(stack.provider.as_ref(), 10, &cancel, |_| {})
        .await;

    assert!(matches!(
        result,
        Err(RetrievalError::Provider(ProviderError::Auth { .. }))
    ));
}

#[tokio::test]
async fn test_cancellation_aborts_the_build() {
    let stack = build_stack().await;

    let cancel = CancelFlag::new();
    cancel.cancel();

    let result = stack
        .index
        .build_index(stack.provider.as_ref(), 10, &cancel, |_| {})
        .await;

    assert!(matches!(
        result,
        Err(RetrievalError::Provider(ProviderError::Cancelled))
    ));
    assert_eq!(stack.index.unembedded_count(), 3, "base untouched");
}
