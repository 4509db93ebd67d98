//! Crop budget loading.
//!
//! The budget view has a single source with no fallback tier. It still goes
//! through [`fetch_source`] so a slow or broken budget route gets the same
//! deadline and classification as every dashboard source.

use std::time::Duration;

use agrodash_client::BackendClient;
use agrodash_core::{budget_overview, Actor, BudgetOverview};
use serde::Serialize;

use crate::source::{fetch_source, SourceId, SourceSummary};
use crate::state::Field;

/// Derived budget overview plus the outcome of the fetch behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetLoad {
    pub overview: Field<BudgetOverview>,
    pub source: SourceSummary,
}

/// Fetch crop budget summaries under `deadline` and derive the overview.
///
/// An empty crop list is `Field::Empty`; a failed fetch is
/// `Field::Failed("Failed to load crop budgets")`.
pub async fn load_budget(client: &BackendClient, actor: &Actor, deadline: Duration) -> BudgetLoad {
    let fetched = fetch_source(
        SourceId::CropBudget,
        deadline,
        client.get_crop_budget_summaries(actor),
    )
    .await;
    let source = fetched.summary();
    let overview = Field::from_outcome(
        fetched.outcome.map(|crops| budget_overview(&crops)),
        "crop budgets",
    );

    if let Some(overview) = overview.value() {
        if !overview.excluded_crops.is_empty() {
            tracing::info!(
                count = overview.excluded_crops.len(),
                "crops without a planned budget were excluded"
            );
        }
    }

    BudgetLoad { overview, source }
}
