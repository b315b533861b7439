//! Auditable evaluation ledger.
//!
//! Append-only store of evaluations and their eventual human decision.
//! Entries are prepended (newest first) and persisted through the
//! [`AuditStore`] collaborator on every mutation. The analyst decision on an
//! entry transitions exactly once; concurrent submissions are serialized by
//! a ledger-wide async lock.

pub mod error;
pub mod export;
pub mod store;
pub mod types;


pub use error::{LedgerError, StoreError};
#[cfg(any(test, feature = "mock"))]
pub use store::MemoryStore;
pub use store::{AuditStore, JsonFileStore};
pub use types::{
    Adjustments, AnalystDecision, AuditFilter, AuditLogEntry, DecisionMethod, EntryStatus,
    LedgerStats,
};

use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::compare::ComparisonResult;
use crate::model::{ClientProfile, Decision, EvaluationResult};
use crate::model::finance::round1;

/// Default horizon for [`AuditLedger::purge_older_than`].
pub const DEFAULT_PURGE_DAYS: i64 = 90;

/// User recorded when the caller does not attribute the evaluation.
pub const SYSTEM_USER: &str = "system";

/// The evaluation ledger.
pub struct AuditLedger {
    store: Arc<dyn AuditStore>,
    entries: Mutex<Vec<AuditLogEntry>>,
}

impl AuditLedger {
    /// Opens the ledger, loading existing entries from the store.
    pub async fn open(store: Arc<dyn AuditStore>) -> Result<Self, LedgerError> {
        let entries = store.load().await?;
        info!(entries = entries.len(), "audit ledger loaded");

        Ok(Self {
            store,
            entries: Mutex::new(entries),
        })
    }

    /// Records an evaluation as a new Pending entry (prepended) and persists
    /// the log. Returns the generated id.
    pub async fn log_evaluation(
        &self,
        user: Option<&str>,
        profile: &ClientProfile,
        rag: &EvaluationResult,
        scorecard: &EvaluationResult,
        comparison: &ComparisonResult,
    ) -> Result<String, LedgerError> {
        let entry = AuditLogEntry {
            id: generate_id(),
            timestamp: Utc::now(),
            user: user.unwrap_or(SYSTEM_USER).to_string(),
            profile: profile.clone(),
            rag: rag.clone(),
            scorecard: scorecard.clone(),
            comparison: comparison.clone(),
            analyst: None,
            status: EntryStatus::Pending,
        };
        let id = entry.id.clone();

        let mut entries = self.entries.lock().await;
        entries.insert(0, entry);
        self.store.save(&entries).await?;

        debug!(id = %id, "evaluation logged");
        Ok(id)
    }

    /// Sets the analyst decision on an entry and derives its final status.
    ///
    /// Fails with [`LedgerError::NotFound`] for an unknown id and with
    /// [`LedgerError::AlreadyDecided`] if the decision was already set; in
    /// the latter case the entry is left unchanged (exactly-once
    /// transition). The whole read-modify-write runs under the ledger lock.
    pub async fn update_analyst_decision(
        &self,
        id: &str,
        decision: AnalystDecision,
    ) -> Result<(), LedgerError> {
        let mut entries = self.entries.lock().await;

        let entry = entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| LedgerError::NotFound { id: id.to_string() })?;

        if entry.analyst.is_some() {
            return Err(LedgerError::AlreadyDecided { id: id.to_string() });
        }

        entry.status = match decision.decision {
            Decision::Approved => EntryStatus::Approved,
            Decision::Rejected => EntryStatus::Rejected,
        };
        entry.analyst = Some(decision);

        self.store.save(&entries).await?;

        info!(id = %id, "analyst decision recorded");
        Ok(())
    }

    /// Looks up one entry by id.
    pub async fn get(&self, id: &str) -> Option<AuditLogEntry> {
        self.entries
            .lock()
            .await
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
    }

    /// All entries, newest first.
    pub async fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Entries matching the AND-combined criteria.
    pub async fn filter(&self, filter: &AuditFilter) -> Vec<AuditLogEntry> {
        self.entries
            .lock()
            .await
            .iter()
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect()
    }

    /// Aggregated statistics over the full log.
    pub async fn statistics(&self) -> LedgerStats {
        let entries = self.entries.lock().await;
        compute_stats(&entries)
    }

    /// CSV with the fixed column order; empty string for an empty log.
    pub async fn export_csv(&self) -> Result<String, LedgerError> {
        let entries = self.entries.lock().await;
        if entries.is_empty() {
            return Ok(String::new());
        }

        Ok(export::entries_to_csv(&entries)?)
    }

    /// Pretty-printed JSON of the statistics snapshot.
    pub async fn export_stats_json(&self) -> Result<String, LedgerError> {
        let stats = self.statistics().await;
        Ok(serde_json::to_string_pretty(&stats)?)
    }

    /// Removes entries older than `days` days, persists the reduced log and
    /// returns how many were removed.
    pub async fn purge_older_than(&self, days: i64) -> Result<usize, LedgerError> {
        let cutoff = Utc::now() - Duration::days(days);

        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|entry| entry.timestamp >= cutoff);
        let removed = before - entries.len();

        if removed > 0 {
            self.store.save(&entries).await?;
            info!(removed, days, "old audit entries purged");
        }

        Ok(removed)
    }
}

/// Process-unique id: millisecond timestamp plus a random suffix.
fn generate_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("LOG-{}-{}", Utc::now().timestamp_millis(), &suffix[..8])
}

fn compute_stats(entries: &[AuditLogEntry]) -> LedgerStats {
    let total = entries.len();
    let approved = entries
        .iter()
        .filter(|e| e.status == EntryStatus::Approved)
        .count();
    let rejected = entries
        .iter()
        .filter(|e| e.status == EntryStatus::Rejected)
        .count();
    let pending = entries
        .iter()
        .filter(|e| e.status == EntryStatus::Pending)
        .count();

    // every entry stores both results, so agreement and latency aggregate
    // over the whole log
    let agreeing = entries
        .iter()
        .filter(|e| e.rag.decision == e.scorecard.decision)
        .count();

    let decided: Vec<&AnalystDecision> = entries.iter().filter_map(|e| e.analyst.as_ref()).collect();
    let count_method = |method: DecisionMethod| -> usize {
        decided.iter().filter(|d| d.method == method).count()
    };

    let pct = |part: usize| -> f64 {
        if total == 0 {
            0.0
        } else {
            round1(part as f64 / total as f64 * 100.0)
        }
    };
    let avg_ms = |pick: fn(&AuditLogEntry) -> u64| -> f64 {
        if total == 0 {
            0.0
        } else {
            let sum: u64 = entries.iter().map(pick).sum();
            (sum as f64 / total as f64).round()
        }
    };

    LedgerStats {
        total,
        approved,
        rejected,
        pending,
        approval_rate_pct: pct(approved),
        agreement_rate_pct: pct(agreeing),
        decisions_rag: count_method(DecisionMethod::Rag),
        decisions_scorecard: count_method(DecisionMethod::Scorecard),
        decisions_adjusted: count_method(DecisionMethod::Adjusted),
        avg_latency_rag_ms: avg_ms(|e| e.rag.latency_ms),
        avg_latency_scorecard_ms: avg_ms(|e| e.scorecard.latency_ms),
    }
}
