//! Submission responses and their reconciliation.

use crate::OutboundBatch;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An item the remote side accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedEvent {
    /// Wrapper id sent with the item.
    pub id: String,
    /// Identifier assigned by the remote side.
    #[serde(rename = "eventID")]
    pub event_id: String,
}

/// An item the remote side rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectedEvent {
    /// Wrapper id sent with the item.
    pub id: String,
    /// Remote error code.
    pub error_code: String,
    /// Remote error message.
    pub error_message: String,
}

/// Body of a completed submission call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutAuditEventsResponse {
    /// Explicitly accepted items.
    #[serde(default)]
    pub successful: Vec<AcceptedEvent>,
    /// Explicitly rejected items.
    #[serde(default)]
    pub failed: Vec<RejectedEvent>,
}

/// A response entry that does not line up with what was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// Sent, but listed in neither partition.
    Unaccounted { id: String },
    /// Listed as both accepted and rejected, or more than once.
    Duplicated { id: String },
    /// Listed, but never sent.
    Unknown { id: String },
}

impl Inconsistency {
    /// The wrapper id concerned.
    pub fn id(&self) -> &str {
        match self {
            Self::Unaccounted { id } | Self::Duplicated { id } | Self::Unknown { id } => id,
        }
    }
}

/// Per-item result of one submission, checked against the batch sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionOutcome {
    /// Accepted items.
    pub accepted: Vec<AcceptedEvent>,
    /// Rejected items.
    pub rejected: Vec<RejectedEvent>,
    /// Accounting problems found while reconciling.
    pub inconsistencies: Vec<Inconsistency>,
}

impl SubmissionOutcome {
    /// Partition a response against the wrappers that were sent.
    ///
    /// Only the explicit success and failure lists are trusted: a wrapper
    /// missing from both is reported as unaccounted, never as accepted. The
    /// first listing of a sent id wins; later listings are duplicates.
    pub fn reconcile(batch: &OutboundBatch, response: PutAuditEventsResponse) -> Self {
        let sent: HashSet<String> = batch.iter().map(|w| w.id.to_string()).collect();
        let mut seen: HashSet<String> = HashSet::new();
        let mut outcome = Self::default();

        for item in response.successful {
            if outcome.track(&sent, &mut seen, &item.id) {
                outcome.accepted.push(item);
            }
        }
        for item in response.failed {
            if outcome.track(&sent, &mut seen, &item.id) {
                outcome.rejected.push(item);
            }
        }

        for wrapper in batch.iter() {
            let id = wrapper.id.to_string();
            if !seen.contains(&id) {
                outcome.inconsistencies.push(Inconsistency::Unaccounted { id });
            }
        }

        outcome
    }

    /// Record a listed id; false when it must not be counted.
    fn track(&mut self, sent: &HashSet<String>, seen: &mut HashSet<String>, id: &str) -> bool {
        if !sent.contains(id) {
            self.inconsistencies.push(Inconsistency::Unknown { id: id.to_string() });
            return false;
        }
        if !seen.insert(id.to_string()) {
            self.inconsistencies.push(Inconsistency::Duplicated { id: id.to_string() });
            return false;
        }
        true
    }
}
