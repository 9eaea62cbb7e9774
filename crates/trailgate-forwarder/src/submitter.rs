//! Submission and per-item reconciliation.

use crate::{AuditIngestClient, SubmitError};
use tracing::{debug, error, info, warn};
use trailgate_audit_types::{Inconsistency, OutboundBatch, SubmissionOutcome};

/// Submit `batch` in one call and partition the per-item results.
///
/// A call that does not complete is an error. A completed call always
/// yields an outcome, however many items the remote side rejected.
pub async fn submit(
    client: &dyn AuditIngestClient,
    batch: &OutboundBatch,
) -> Result<SubmissionOutcome, SubmitError> {
    let response = client.put_audit_events(batch).await?;
    let outcome = SubmissionOutcome::reconcile(batch, response);
    log_outcome(&outcome);
    Ok(outcome)
}

/// Emit the diagnostics for a reconciled outcome.
pub fn log_outcome(outcome: &SubmissionOutcome) {
    info!(count = outcome.accepted.len(), "audit events accepted");
    for item in &outcome.accepted {
        debug!(id = %item.id, event_id = %item.event_id, "audit event accepted");
    }

    if !outcome.rejected.is_empty() {
        error!(count = outcome.rejected.len(), "batch had rejected events");
        for item in &outcome.rejected {
            error!(
                id = %item.id,
                error_code = %item.error_code,
                error_message = %item.error_message,
                "audit event rejected"
            );
        }
    }

    for inconsistency in &outcome.inconsistencies {
        let problem = match inconsistency {
            Inconsistency::Unaccounted { .. } => "missing from both result lists",
            Inconsistency::Duplicated { .. } => "listed more than once",
            Inconsistency::Unknown { .. } => "not part of the request",
        };
        warn!(id = %inconsistency.id(), problem, "result accounting mismatch");
    }
}
