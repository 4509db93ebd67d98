//! Feed command handlers.
//!
//! Every command loads the feed first so mutations are checked against the
//! items the backend currently returns.

use std::time::Duration;

use agrodash_client::BackendClient;
use agrodash_core::{Actor, AppConfig, FeedKey, Role};
use agrodash_dashboard::{FeedController, MutationOutcome};
use serde::Serialize;

use crate::print_json;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MutationReport {
    key: String,
    applied: bool,
    unread_count: usize,
}

async fn load_controller(
    config: &AppConfig,
    actor: Actor,
    role: Role,
) -> anyhow::Result<FeedController> {
    let client = BackendClient::from_config(config)?;
    let deadline = Duration::from_secs(config.request_timeout_secs);
    let mut controller = FeedController::new(client, actor, role, deadline);

    let state = controller.refresh().await;
    for error in [&state.alerts_error, &state.notifications_error]
        .into_iter()
        .flatten()
    {
        tracing::warn!(error = %error, "feed source unavailable");
    }
    Ok(controller)
}

pub(crate) async fn run_feed(config: &AppConfig, actor: Actor, role: Role) -> anyhow::Result<()> {
    let controller = load_controller(config, actor, role).await?;
    print_json(&serde_json::json!({
        "unreadCount": controller.unread_count(),
        "items": controller.items(),
    }))
}

pub(crate) async fn run_mark_read(
    config: &AppConfig,
    actor: Actor,
    role: Role,
    key: FeedKey,
) -> anyhow::Result<()> {
    let mut controller = load_controller(config, actor, role).await?;
    let outcome = controller.mark_read(key).await?;
    print_json(&MutationReport {
        key: key.to_string(),
        applied: outcome == MutationOutcome::Applied,
        unread_count: controller.unread_count(),
    })
}

pub(crate) async fn run_dismiss(
    config: &AppConfig,
    actor: Actor,
    role: Role,
    key: FeedKey,
) -> anyhow::Result<()> {
    let mut controller = load_controller(config, actor, role).await?;
    let outcome = controller.dismiss(key).await?;
    print_json(&MutationReport {
        key: key.to_string(),
        applied: outcome == MutationOutcome::Applied,
        unread_count: controller.unread_count(),
    })
}

pub(crate) async fn run_read_all(
    config: &AppConfig,
    actor: Actor,
    role: Role,
) -> anyhow::Result<()> {
    let mut controller = load_controller(config, actor, role).await?;
    let marked = controller.mark_all_read().await?;
    print_json(&serde_json::json!({
        "marked": marked,
        "unreadCount": controller.unread_count(),
    }))
}
