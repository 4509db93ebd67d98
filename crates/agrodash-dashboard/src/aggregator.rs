//! One aggregation cycle: fan out, classify, fall back, report.

use std::time::Duration;

use agrodash_client::BackendClient;
use agrodash_core::{Actor, AppConfig};
use serde::Serialize;

use crate::error::DashboardError;
use crate::fallback::{
    apply_fallback, mark_fallback_failure, resolve_profile, resolve_services, AggregateSnapshot,
    ProfileTier,
};
use crate::source::{fetch_source, Outcome, SourceId, SourceStatus, SourceSummary};
use crate::state::{DashboardState, Field};

const CONTENT_GROUP: &str = "recent content";

/// Knobs for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOptions {
    /// Row limit for each recent-content endpoint.
    pub recent_limit: u32,
    /// Deadline applied to every individual source call.
    pub source_timeout: Duration,
}

impl CycleOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            recent_limit: config.recent_limit,
            source_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

impl Default for CycleOptions {
    fn default() -> Self {
        Self {
            recent_limit: 5,
            source_timeout: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    FullSuccess,
    PartialSuccess,
    TotalFailure,
}

/// Classify a group by how many of its sources produced content.
#[must_use]
pub fn classify_group(statuses: &[SourceStatus]) -> GroupStatus {
    let succeeded = statuses
        .iter()
        .filter(|s| **s == SourceStatus::Success)
        .count();
    match succeeded {
        0 => GroupStatus::TotalFailure,
        n if n == statuses.len() => GroupStatus::FullSuccess,
        _ => GroupStatus::PartialSuccess,
    }
}

/// The content fallback runs only when no content source produced data.
#[must_use]
pub fn needs_fallback(content: &[SourceStatus]) -> bool {
    content.iter().all(|s| *s != SourceStatus::Success)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FallbackStatus {
    NotNeeded,
    Applied { fields: Vec<&'static str> },
    /// The aggregate endpoint answered with nothing.
    Empty,
    Failed { message: String },
}

/// Everything the cycle learned besides the state itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationReport {
    pub sources: Vec<SourceSummary>,
    pub content: GroupStatus,
    pub needs_fallback: bool,
    pub fallback: FallbackStatus,
    pub profile_tier: Option<ProfileTier>,
    pub services_from_aggregate: bool,
    pub issues: Vec<DashboardError>,
}

#[derive(Debug, Clone)]
pub struct CycleResult {
    pub state: DashboardState,
    pub report: AggregationReport,
}

/// Run one aggregation cycle for `actor`.
///
/// Every source runs concurrently and to completion; none of them can fail
/// the cycle. The returned state is built from scratch and is meant to be
/// published wholesale.
pub async fn run_cycle(
    client: &BackendClient,
    actor: &Actor,
    options: &CycleOptions,
) -> CycleResult {
    let deadline = options.source_timeout;
    let limit = options.recent_limit;
    let aggregate = AggregateSnapshot::new(client, actor, deadline);

    tracing::debug!(limit, "starting aggregation cycle");

    let (metrics, profile, services, products, orders, notifications) = futures::join!(
        fetch_source(SourceId::Metrics, deadline, client.get_metrics(actor)),
        resolve_profile(client, actor, deadline, &aggregate),
        resolve_services(client, actor, deadline, &aggregate),
        fetch_source(
            SourceId::RecentProducts,
            deadline,
            client.get_recent_products(actor, limit)
        ),
        fetch_source(
            SourceId::RecentOrders,
            deadline,
            client.get_recent_orders(actor, limit)
        ),
        fetch_source(
            SourceId::RecentNotifications,
            deadline,
            client.get_recent_notifications(actor, limit)
        )
    );

    let mut sources = Vec::with_capacity(8);
    sources.push(metrics.summary());
    sources.extend(profile.attempts.iter().cloned());
    sources.push(services.primary.clone());
    let content_summaries = [products.summary(), orders.summary(), notifications.summary()];
    sources.extend(content_summaries.iter().cloned());

    let content_statuses: Vec<SourceStatus> = content_summaries.iter().map(|s| s.status).collect();
    let content = classify_group(&content_statuses);
    let fallback_needed = needs_fallback(&content_statuses);

    let mut state = DashboardState {
        metrics: Field::from_outcome(metrics.outcome, "metrics"),
        profile: profile.field,
        services: services.field,
        recent_products: Field::from_outcome(products.outcome, "recent products"),
        recent_orders: Field::from_outcome(orders.outcome, "recent orders"),
        recent_notifications: Field::from_outcome(notifications.outcome, "recent notifications"),
    };

    let mut issues: Vec<DashboardError> = sources.iter().filter_map(source_issue).collect();
    match content {
        GroupStatus::FullSuccess => {}
        GroupStatus::PartialSuccess => issues.push(DashboardError::PartialSourceFailure {
            group: CONTENT_GROUP,
            failed: content_statuses
                .iter()
                .filter(|s| **s != SourceStatus::Success)
                .count(),
            total: content_statuses.len(),
        }),
        GroupStatus::TotalFailure => issues.push(DashboardError::TotalSourceFailure {
            group: CONTENT_GROUP,
            total: content_statuses.len(),
        }),
    }

    let fallback = if fallback_needed {
        tracing::info!("no recent content from any source, using aggregate snapshot");
        match &aggregate.get().await.outcome {
            Outcome::Success(snapshot) => {
                let fields = apply_fallback(&mut state, snapshot);
                tracing::debug!(count = fields.len(), "fallback fields filled");
                FallbackStatus::Applied { fields }
            }
            Outcome::Empty => FallbackStatus::Empty,
            Outcome::Failed(failure) => {
                mark_fallback_failure(&mut state);
                issues.push(DashboardError::FallbackFailure {
                    message: failure.message.clone(),
                });
                FallbackStatus::Failed {
                    message: failure.message.clone(),
                }
            }
        }
    } else {
        FallbackStatus::NotNeeded
    };

    if let Some(summary) = aggregate.summary() {
        sources.push(summary);
    }

    let report = AggregationReport {
        sources,
        content,
        needs_fallback: fallback_needed,
        fallback,
        profile_tier: profile.tier,
        services_from_aggregate: services.from_aggregate,
        issues,
    };

    tracing::info!(
        content = ?report.content,
        issues = report.issues.len(),
        "aggregation cycle finished"
    );

    CycleResult { state, report }
}

fn source_issue(summary: &SourceSummary) -> Option<DashboardError> {
    match summary.status {
        SourceStatus::Success => None,
        SourceStatus::Empty => Some(DashboardError::EmptyResult {
            source_id: summary.source,
        }),
        SourceStatus::Failed => Some(DashboardError::NetworkFailure {
            source_id: summary.source,
            message: summary.error.clone().unwrap_or_default(),
        }),
    }
}
