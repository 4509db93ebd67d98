use agrodash_client::ClientError;
use agrodash_core::FeedKey;
use serde::Serialize;
use thiserror::Error;

use crate::source::SourceId;

/// Message attached to the recent-content fields when the aggregate fallback
/// also fails.
pub const FALLBACK_FAILURE_MESSAGE: &str = "Failed to load recent data from all sources";

/// Issues recorded during one aggregation cycle.
///
/// These are reported, never returned as `Err`: a cycle always produces a
/// state, and these describe what went wrong while building it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DashboardError {
    #[error("{source_id}: request did not complete: {message}")]
    NetworkFailure { source_id: SourceId, message: String },

    #[error("{source_id}: request completed with no content")]
    EmptyResult { source_id: SourceId },

    #[error("{failed} of {total} {group} sources failed or returned no content")]
    PartialSourceFailure {
        group: &'static str,
        failed: usize,
        total: usize,
    },

    #[error("all {total} {group} sources failed or returned no content")]
    TotalSourceFailure { group: &'static str, total: usize },

    #[error("Failed to load recent data from all sources: {message}")]
    FallbackFailure { message: String },
}

/// Errors from feed mutations.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed item {0} not found")]
    NotFound(FeedKey),

    /// The server rejected or never received the mutation; the local change
    /// has been rolled back.
    #[error("mutation for {key} failed: {source}")]
    Mutation {
        key: FeedKey,
        #[source]
        source: ClientError,
    },

    #[error("mutation for {key} timed out after {timeout_ms}ms")]
    Timeout { key: FeedKey, timeout_ms: u64 },
}
