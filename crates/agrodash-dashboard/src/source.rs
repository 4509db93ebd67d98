//! Source fetcher: one bounded backend call turned into a [`SourceOutcome`].
//!
//! Nothing in here returns an error. A request that fails, times out, or
//! returns garbage becomes [`Outcome::Failed`]; a request that succeeds with
//! nothing in it becomes [`Outcome::Empty`]. Callers decide what to do with
//! either.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use agrodash_client::ClientError;
use agrodash_core::Payload;
use serde::Serialize;

/// Logical backend source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Metrics,
    Profile,
    UserLookup,
    Services,
    RecentProducts,
    RecentOrders,
    RecentNotifications,
    AggregateDashboard,
    Alerts,
    Notifications,
    CropBudget,
}

impl SourceId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceId::Metrics => "metrics",
            SourceId::Profile => "profile",
            SourceId::UserLookup => "user_lookup",
            SourceId::Services => "services",
            SourceId::RecentProducts => "recent_products",
            SourceId::RecentOrders => "recent_orders",
            SourceId::RecentNotifications => "recent_notifications",
            SourceId::AggregateDashboard => "aggregate_dashboard",
            SourceId::Alerts => "alerts",
            SourceId::Notifications => "notifications",
            SourceId::CropBudget => "crop_budget",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection refused, reset, DNS, TLS.
    Network,
    Timeout,
    NotFound,
    Status(u16),
    Decode,
    /// 2xx response carrying an error envelope.
    Api,
    /// The request could not be built (bad base URL).
    Request,
}

/// Why a source produced no usable outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl SourceFailure {
    #[must_use]
    pub fn timed_out(deadline: Duration) -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: format!("no response within {}ms", deadline.as_millis()),
        }
    }
}

impl From<&ClientError> for SourceFailure {
    fn from(err: &ClientError) -> Self {
        let kind = match err {
            _ if err.is_timeout() => FailureKind::Timeout,
            ClientError::Http(_) => FailureKind::Network,
            ClientError::NotFound { .. } => FailureKind::NotFound,
            ClientError::UnexpectedStatus { status, .. } => FailureKind::Status(*status),
            ClientError::Deserialize { .. } => FailureKind::Decode,
            ClientError::Api { .. } => FailureKind::Api,
            ClientError::InvalidBaseUrl { .. } => FailureKind::Request,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Success,
    Empty,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Empty,
    Failed(SourceFailure),
}

impl<T> Outcome<T> {
    #[must_use]
    pub fn status(&self) -> SourceStatus {
        match self {
            Outcome::Success(_) => SourceStatus::Success,
            Outcome::Empty => SourceStatus::Empty,
            Outcome::Failed(_) => SourceStatus::Failed,
        }
    }

    #[must_use]
    pub fn payload(&self) -> Option<&T> {
        match self {
            Outcome::Success(payload) => Some(payload),
            Outcome::Empty | Outcome::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn into_payload(self) -> Option<T> {
        match self {
            Outcome::Success(payload) => Some(payload),
            Outcome::Empty | Outcome::Failed(_) => None,
        }
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(payload) => Outcome::Success(f(payload)),
            Outcome::Empty => Outcome::Empty,
            Outcome::Failed(failure) => Outcome::Failed(failure),
        }
    }

    #[must_use]
    pub fn failure(&self) -> Option<&SourceFailure> {
        match self {
            Outcome::Failed(failure) => Some(failure),
            Outcome::Success(_) | Outcome::Empty => None,
        }
    }
}

/// Result of one source fetch within one aggregation cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceOutcome<T> {
    pub source: SourceId,
    pub outcome: Outcome<T>,
}

impl<T> SourceOutcome<T> {
    #[must_use]
    pub fn status(&self) -> SourceStatus {
        self.outcome.status()
    }

    #[must_use]
    pub fn summary(&self) -> SourceSummary {
        SourceSummary {
            source: self.source,
            status: self.status(),
            error: self.outcome.failure().map(|f| f.message.clone()),
        }
    }
}

/// Payload-free record of an outcome, kept for the cycle report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub source: SourceId,
    pub status: SourceStatus,
    pub error: Option<String>,
}

/// What a client call returns, reduced to "content or nothing".
pub trait IntoPayload {
    type Payload;

    /// `None` when the decoded response carries no content.
    fn into_payload(self) -> Option<Self::Payload>;
}

impl<T> IntoPayload for Vec<T> {
    type Payload = Vec<T>;

    fn into_payload(self) -> Option<Vec<T>> {
        (!self.is_empty()).then_some(self)
    }
}

impl<T: Payload> IntoPayload for Option<T> {
    type Payload = T;

    fn into_payload(self) -> Option<T> {
        self.filter(|value| !value.is_empty_payload())
    }
}

/// Run one backend call under `deadline` and classify the result.
///
/// Never fails and never retries.
pub async fn fetch_source<R, Fut>(
    source: SourceId,
    deadline: Duration,
    request: Fut,
) -> SourceOutcome<R::Payload>
where
    R: IntoPayload,
    Fut: Future<Output = Result<R, ClientError>>,
{
    let outcome = match tokio::time::timeout(deadline, request).await {
        Ok(Ok(response)) => match response.into_payload() {
            Some(payload) => Outcome::Success(payload),
            None => Outcome::Empty,
        },
        Ok(Err(err)) => Outcome::Failed(SourceFailure::from(&err)),
        Err(_) => Outcome::Failed(SourceFailure::timed_out(deadline)),
    };

    match &outcome {
        Outcome::Success(_) => tracing::debug!(source = %source, "source returned content"),
        Outcome::Empty => tracing::debug!(source = %source, "source returned no content"),
        Outcome::Failed(failure) => tracing::warn!(
            source = %source,
            kind = ?failure.kind,
            error = %failure,
            "source fetch failed"
        ),
    }

    SourceOutcome { source, outcome }
}
