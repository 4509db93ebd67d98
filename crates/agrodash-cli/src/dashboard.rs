//! Dashboard and budget command handlers.

use std::time::Duration;

use agrodash_client::BackendClient;
use agrodash_core::{Actor, AppConfig};
use agrodash_dashboard::{load_budget, CycleOptions, DashboardSession};

use crate::print_json;

/// Run one aggregation cycle and print the resulting state.
///
/// Source failures do not make this command fail; they show up as field
/// errors in the printed state and as a warning summary on stderr.
pub(crate) async fn run_dashboard(
    config: &AppConfig,
    actor: Actor,
    with_report: bool,
) -> anyhow::Result<()> {
    let client = BackendClient::from_config(config)?;
    let mut session = DashboardSession::new(client, actor, CycleOptions::from_config(config));

    let report = session.refresh().await.clone();
    if !report.issues.is_empty() {
        tracing::warn!(
            issues = report.issues.len(),
            fallback = ?report.fallback,
            "dashboard loaded with issues"
        );
    }

    if with_report {
        print_json(&serde_json::json!({
            "state": session.state(),
            "report": report,
        }))
    } else {
        print_json(&session.state())
    }
}

/// Load crop budget summaries and print the derived overview.
///
/// An empty crop list prints the empty field; a failed fetch is an error.
pub(crate) async fn run_budget(config: &AppConfig, actor: &Actor) -> anyhow::Result<()> {
    let client = BackendClient::from_config(config)?;
    let deadline = Duration::from_secs(config.request_timeout_secs);
    let load = load_budget(&client, actor, deadline).await;

    if let Some(message) = load.overview.error() {
        anyhow::bail!(
            "{message}: {}",
            load.source.error.as_deref().unwrap_or("unknown error")
        );
    }
    print_json(&load.overview)
}
