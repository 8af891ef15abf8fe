//! Sequential bulk import of loader candidates.
//!
//! Items are persisted one at a time in input order. A failed item is
//! recorded and the run moves on; the loop always reaches the end. There is
//! no cancellation once a run has started.

use std::time::Duration;

use ingest_core::candidate::CandidateRecord;
use ingest_core::content::ContentRecord;
use ingest_core::outcome::{ImportOutcome, ImportProgress, MISSING_CONTENT_PATH};

use crate::services::{ContentStore, ServiceError};

/// Import every candidate through `store`, reporting progress after each one.
///
/// `persist_timeout` bounds each individual store call; an expired call is
/// recorded as that item's failure.
pub async fn run_bulk_import<F>(
    items: &[CandidateRecord],
    store: &dyn ContentStore,
    persist_timeout: Option<Duration>,
    mut on_progress: F,
) -> ImportOutcome
where
    F: FnMut(ImportProgress),
{
    let total = items.len();
    let mut outcome = ImportOutcome::default();

    tracing::info!(total, "Starting bulk import");

    for (index, candidate) in items.iter().enumerate() {
        let record = candidate.to_content_record();

        if record.content_path.is_empty() {
            tracing::warn!(item_index = index, title = %record.title, "Skipping item without content path");
            outcome.record_failure(&record.title, MISSING_CONTENT_PATH);
        } else {
            match persist(store, &record, persist_timeout).await {
                Ok(()) => outcome.record_success(),
                Err(e) => {
                    let label = candidate
                        .raw_title()
                        .unwrap_or_else(|| index.to_string());
                    tracing::warn!(item_index = index, title = %label, error = %e, "Failed to import item");
                    outcome.record_failure(&label, &e.detail());
                }
            }
        }

        on_progress(ImportProgress::new(index + 1, total));
    }

    tracing::info!(
        total,
        succeeded = outcome.success_count,
        failed = outcome.failed_count,
        "Bulk import finished"
    );

    outcome
}

async fn persist(
    store: &dyn ContentStore,
    record: &ContentRecord,
    timeout: Option<Duration>,
) -> Result<(), ServiceError> {
    let call = store.create_content(record);
    let created = match timeout {
        Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
            ServiceError::Transport(format!("Timed out after {}s", limit.as_secs()))
        })?,
        None => call.await,
    }?;
    tracing::debug!(content_id = created.id, "Imported item");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
