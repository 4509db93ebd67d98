//! Resilient dashboard aggregation over the agrodash backend.
//!
//! A [`DashboardSession`] runs aggregation cycles: every source is fetched
//! concurrently under its own deadline, failures become per-field errors, and
//! the aggregate endpoint fills whatever the dedicated endpoints left empty.
//! A [`FeedController`] owns the merged alert/notification feed and applies
//! mutations optimistically with rollback. [`load_budget`] feeds the crop
//! budget view through the same bounded source fetch.

pub mod aggregator;
pub mod budget;
pub mod error;
pub mod fallback;
pub mod feed;
pub mod session;
pub mod source;
pub mod state;

pub use aggregator::{
    classify_group, needs_fallback, run_cycle, AggregationReport, CycleOptions, CycleResult,
    FallbackStatus, GroupStatus,
};
pub use budget::{load_budget, BudgetLoad};
pub use error::{DashboardError, FeedError, FALLBACK_FAILURE_MESSAGE};
pub use fallback::{apply_fallback, ProfileTier};
pub use feed::{FeedController, MutationOutcome};
pub use session::DashboardSession;
pub use source::{
    fetch_source, FailureKind, IntoPayload, Outcome, SourceFailure, SourceId, SourceOutcome,
    SourceStatus, SourceSummary,
};
pub use state::{DashboardState, Field};
