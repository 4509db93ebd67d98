//! Fallback resolution against the coarse aggregate endpoint.
//!
//! The aggregate snapshot is fetched lazily and at most once per cycle; the
//! profile chain, the services chain, and the content fallback all share it.
//! Every write into [`DashboardState`] goes through
//! [`Field::fill_if_empty`], so fallback data never replaces data a primary
//! source already delivered.

use std::time::Duration;

use agrodash_client::BackendClient;
use agrodash_core::{Actor, AggregateDashboard, Profile};
use serde::Serialize;
use tokio::sync::OnceCell;

use crate::error::FALLBACK_FAILURE_MESSAGE;
use crate::source::{fetch_source, Outcome, SourceId, SourceOutcome, SourceSummary};
use crate::state::{DashboardState, Field};

pub(crate) const PROFILE_FAILURE_MESSAGE: &str = "Failed to load profile from all sources";

/// Lazily fetched aggregate snapshot shared within one cycle.
pub(crate) struct AggregateSnapshot<'a> {
    client: &'a BackendClient,
    actor: &'a Actor,
    deadline: Duration,
    cell: OnceCell<SourceOutcome<AggregateDashboard>>,
}

impl<'a> AggregateSnapshot<'a> {
    pub(crate) fn new(client: &'a BackendClient, actor: &'a Actor, deadline: Duration) -> Self {
        Self {
            client,
            actor,
            deadline,
            cell: OnceCell::new(),
        }
    }

    /// Fetch on first use; concurrent callers wait for the same request.
    pub(crate) async fn get(&self) -> &SourceOutcome<AggregateDashboard> {
        self.cell
            .get_or_init(|| {
                fetch_source(
                    SourceId::AggregateDashboard,
                    self.deadline,
                    self.client.get_aggregate_dashboard(self.actor),
                )
            })
            .await
    }

    /// Outcome summary if the snapshot was requested this cycle.
    pub(crate) fn summary(&self) -> Option<SourceSummary> {
        self.cell.get().map(SourceOutcome::summary)
    }
}

/// Which profile tier produced the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileTier {
    Dedicated,
    DirectLookup,
    AggregateSummary,
}

pub(crate) struct ProfileResolution {
    pub(crate) field: Field<Profile>,
    pub(crate) tier: Option<ProfileTier>,
    pub(crate) attempts: Vec<SourceSummary>,
}

/// Resolve the profile through its three tiers, stopping at the first one
/// with content. Failures between tiers are logged and otherwise ignored.
pub(crate) async fn resolve_profile(
    client: &BackendClient,
    actor: &Actor,
    deadline: Duration,
    aggregate: &AggregateSnapshot<'_>,
) -> ProfileResolution {
    let mut attempts = Vec::with_capacity(2);

    let dedicated = fetch_source(SourceId::Profile, deadline, client.get_profile(actor)).await;
    attempts.push(dedicated.summary());
    if let Outcome::Success(profile) = dedicated.outcome {
        return ProfileResolution {
            field: Field::Ready(profile),
            tier: Some(ProfileTier::Dedicated),
            attempts,
        };
    }
    tracing::debug!(
        status = ?attempts[0].status,
        "profile endpoint gave nothing, trying direct lookup"
    );

    let lookup = fetch_source(SourceId::UserLookup, deadline, client.lookup_user(actor)).await;
    attempts.push(lookup.summary());
    if let Outcome::Success(profile) = lookup.outcome {
        return ProfileResolution {
            field: Field::Ready(profile),
            tier: Some(ProfileTier::DirectLookup),
            attempts,
        };
    }
    tracing::debug!("direct user lookup gave nothing, trying aggregate summary");

    let summary = aggregate
        .get()
        .await
        .outcome
        .payload()
        .and_then(|snapshot| snapshot.summary.clone());

    let mut field = Field::Failed(PROFILE_FAILURE_MESSAGE.to_string());
    if field.fill_if_empty(summary) {
        return ProfileResolution {
            field,
            tier: Some(ProfileTier::AggregateSummary),
            attempts,
        };
    }

    tracing::warn!("profile unavailable from every tier");
    ProfileResolution {
        field,
        tier: None,
        attempts,
    }
}

pub(crate) struct ServicesResolution {
    pub(crate) field: Field<Vec<String>>,
    pub(crate) primary: SourceSummary,
    pub(crate) from_aggregate: bool,
}

/// Dedicated services endpoint first, aggregate `services` second.
pub(crate) async fn resolve_services(
    client: &BackendClient,
    actor: &Actor,
    deadline: Duration,
    aggregate: &AggregateSnapshot<'_>,
) -> ServicesResolution {
    let primary = fetch_source(SourceId::Services, deadline, client.get_services(actor)).await;
    let summary = primary.summary();
    let mut field = Field::from_outcome(primary.outcome, "services");
    if field.is_ready() {
        return ServicesResolution {
            field,
            primary: summary,
            from_aggregate: false,
        };
    }

    let fallback = aggregate
        .get()
        .await
        .outcome
        .payload()
        .map(|snapshot| snapshot.services.clone());
    let from_aggregate = field.fill_if_empty(fallback);
    if from_aggregate {
        tracing::debug!("services filled from aggregate snapshot");
    }

    ServicesResolution {
        field,
        primary: summary,
        from_aggregate,
    }
}

/// Apply an aggregate snapshot to `state` under merge-if-empty.
///
/// Returns the names of the fields that were written. Applying the same
/// snapshot twice writes nothing the second time.
pub fn apply_fallback(
    state: &mut DashboardState,
    snapshot: &AggregateDashboard,
) -> Vec<&'static str> {
    let mut filled = Vec::new();

    if state.profile.fill_if_empty(snapshot.summary.clone()) {
        filled.push("profile");
    }
    if state.services.fill_if_empty(Some(snapshot.services.clone())) {
        filled.push("services");
    }
    if state
        .recent_products
        .fill_if_empty(Some(snapshot.recent.products.clone()))
    {
        filled.push("recent_products");
    }
    if state
        .recent_orders
        .fill_if_empty(Some(snapshot.recent.orders.clone()))
    {
        filled.push("recent_orders");
    }
    if state
        .recent_notifications
        .fill_if_empty(Some(snapshot.recent.notifications.clone()))
    {
        filled.push("recent_notifications");
    }

    filled
}

/// Attach the terminal fallback error to every recent-content field that
/// still has no data.
pub(crate) fn mark_fallback_failure(state: &mut DashboardState) {
    if !state.recent_products.is_ready() {
        state.recent_products = fallback_failed();
    }
    if !state.recent_orders.is_ready() {
        state.recent_orders = fallback_failed();
    }
    if !state.recent_notifications.is_ready() {
        state.recent_notifications = fallback_failed();
    }
}

fn fallback_failed<T>() -> Field<T> {
    Field::Failed(FALLBACK_FAILURE_MESSAGE.to_string())
}
