use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ingest_client::config::{ClientConfig, RunConfig};
use ingest_client::{ApiClient, HttpContentStore, HttpScriptService};
use ingest_core::workflow::WorkflowMode;
use ingest_workflow::ImportWorkflow;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ingest_client=info,ingest_workflow=info".into());
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // --- Configuration ---
    let config = ClientConfig::from_env().context("Invalid client configuration")?;
    let run = RunConfig::from_env().context("Invalid run configuration")?;
    tracing::info!(api_url = %config.api_url, script_id = run.script_id, "Loaded configuration");

    // --- Collaborators ---
    let api = ApiClient::new(&config)?;
    let scripts = Arc::new(HttpScriptService::new(api.clone()));
    let store = Arc::new(HttpContentStore::new(api));

    let mut workflow = ImportWorkflow::new(scripts, store, config.workflow.clone());
    workflow.refresh_scripts().await?;

    if !workflow.loader_scripts().iter().any(|s| s.id == run.script_id) {
        bail!("Script {} is not a content loader", run.script_id);
    }

    // --- Progress reporting ---
    let mut updates = workflow.subscribe();
    let progress_handle = tokio::spawn(async move {
        let mut last = None;
        while updates.changed().await.is_ok() {
            let progress = updates.borrow_and_update().import_progress;
            if progress != last {
                match progress {
                    Some(p) if p.is_complete() => tracing::info!(total = p.total, "All items processed"),
                    Some(p) => tracing::info!(
                        current = p.current,
                        total = p.total,
                        percent = p.percent(),
                        "Import progress"
                    ),
                    None => {}
                }
                last = progress;
            }
        }
    });

    // --- Run ---
    workflow.open();
    workflow.select_loader_tab();
    workflow.select_script(run.script_id);
    workflow.set_params_text(run.script_params);

    for field in workflow.parameter_fields() {
        tracing::debug!(name = %field.name, value = %field.value, "Loader parameter");
    }

    workflow.run_loader().await;

    let result = match workflow.state().mode {
        WorkflowMode::Manual => workflow
            .submit_manual()
            .await
            .map(|item| {
                tracing::info!(content_id = item.id, title = %item.title, "Created content item");
            })
            .map_err(anyhow::Error::from),
        WorkflowMode::BulkReview => {
            tracing::info!(count = workflow.state().found_items.len(), "Importing loader batch");
            match workflow.confirm_import().await {
                Some(outcome) => {
                    for error in &outcome.errors {
                        tracing::warn!(%error, "Item not imported");
                    }
                    tracing::info!(
                        total = outcome.total(),
                        succeeded = outcome.success_count,
                        failed = outcome.failed_count,
                        "Import complete"
                    );
                    Ok(())
                }
                None => Err(anyhow!("Import could not be started")),
            }
        }
        _ => {
            let message = workflow
                .state()
                .loader_error
                .clone()
                .unwrap_or_else(|| "Loader did not produce any content".into());
            tracing::error!(error = %message, "Loader failed");
            Err(anyhow!(message))
        }
    };

    workflow.close();
    drop(workflow);
    if let Err(e) = progress_handle.await {
        tracing::warn!(error = %e, "Progress reporter task failed");
    }

    result
}
