//! CSV export of the ledger.

use super::types::AuditLogEntry;

/// Fixed column order. Free-text fields are quoted by the writer with
/// internal quotes doubled (RFC 4180).
const CSV_HEADER: [&str; 24] = [
    "ID",
    "Date",
    "User",
    "Client_Age",
    "Client_Income",
    "Client_Debt",
    "Client_History",
    "Client_Employment",
    "Requested_Amount",
    "Term_Months",
    "Decision_RAG",
    "Score_RAG",
    "Rate_RAG",
    "Decision_Scorecard",
    "Score_Scorecard",
    "Rate_Scorecard",
    "Score_Delta",
    "Rate_Delta",
    "Final_Method",
    "Final_Decision",
    "Justification",
    "Status",
    "Latency_RAG_ms",
    "Latency_Scorecard_ms",
];

/// Renders the entries in the fixed column order. The caller handles the
/// empty-log case.
pub(crate) fn entries_to_csv(entries: &[AuditLogEntry]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for entry in entries {
        let (method, decision, justification) = match &entry.analyst {
            Some(analyst) => (
                analyst.method.label().to_string(),
                analyst.decision.label().to_string(),
                analyst.justification.clone(),
            ),
            None => (String::new(), String::new(), String::new()),
        };

        writer.write_record([
            entry.id.clone(),
            entry.timestamp.to_rfc3339(),
            entry.user.clone(),
            entry.profile.age.to_string(),
            entry.profile.monthly_income.to_string(),
            entry.profile.total_debt.to_string(),
            entry.profile.credit_history.label().to_string(),
            if entry.profile.stable_employment { "Yes" } else { "No" }.to_string(),
            entry.profile.requested_amount.to_string(),
            entry.profile.term_months.to_string(),
            entry.rag.decision.label().to_string(),
            format!("{:.1}", entry.rag.total_score),
            format!("{:.1}%", entry.rag.rate_pct()),
            entry.scorecard.decision.label().to_string(),
            format!("{:.1}", entry.scorecard.total_score),
            format!("{:.1}%", entry.scorecard.rate_pct()),
            entry.comparison.score_delta_label.clone(),
            entry.comparison.rate_delta_label.clone(),
            method,
            decision,
            justification,
            entry.status.label().to_string(),
            entry.rag.latency_ms.to_string(),
            entry.scorecard.latency_ms.to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
