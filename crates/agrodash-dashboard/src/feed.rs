//! Unified alert and notification feed with optimistic mutations.
//!
//! Local state changes are published before the backend call is awaited.
//! If the call fails or times out, the affected collection is restored from
//! a snapshot taken just before the change and the error is returned.

use std::time::Duration;

use agrodash_client::{BackendClient, ClientError};
use agrodash_core::{Actor, Alert, FeedItem, FeedKey, FeedSource, FeedState, Notification, Role};
use tokio::sync::watch;
use tokio::time::error::Elapsed;

use crate::error::FeedError;
use crate::source::{fetch_source, Outcome, SourceId, SourceOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The change was applied locally and confirmed by the backend.
    Applied,
    /// Nothing to do; no request was sent.
    Unchanged,
}

/// Pre-mutation copy of the one collection a mutation touches.
enum CollectionSnapshot {
    Alerts(Vec<Alert>),
    Notifications(Vec<Notification>),
}

impl CollectionSnapshot {
    fn capture(state: &FeedState, source: FeedSource) -> Self {
        match source {
            FeedSource::Alert => Self::Alerts(state.alerts.clone()),
            FeedSource::Notification => Self::Notifications(state.notifications.clone()),
        }
    }

    fn restore(self, state: &mut FeedState) {
        match self {
            Self::Alerts(alerts) => state.alerts = alerts,
            Self::Notifications(notifications) => state.notifications = notifications,
        }
    }
}

/// Single writer of the feed state for one actor and role.
pub struct FeedController {
    client: BackendClient,
    actor: Actor,
    role: Role,
    deadline: Duration,
    state: watch::Sender<FeedState>,
}

impl FeedController {
    #[must_use]
    pub fn new(client: BackendClient, actor: Actor, role: Role, deadline: Duration) -> Self {
        let (state, _) = watch::channel(FeedState::default());
        Self {
            client,
            actor,
            role,
            deadline,
            state,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> FeedState {
        self.state.borrow().clone()
    }

    /// The merged feed, derived from the current collections.
    #[must_use]
    pub fn items(&self) -> Vec<FeedItem> {
        self.state.borrow().items()
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.state.borrow().unread_count()
    }

    /// Load both collections concurrently and publish them together.
    ///
    /// A failing source leaves its collection empty with an inline error;
    /// the other source is unaffected.
    pub async fn refresh(&mut self) -> FeedState {
        let (alerts, notifications) = futures::join!(
            fetch_source(
                SourceId::Alerts,
                self.deadline,
                self.client.get_alerts(&self.actor)
            ),
            fetch_source(
                SourceId::Notifications,
                self.deadline,
                self.client.get_notifications(&self.actor, self.role)
            )
        );

        let (alerts, alerts_error) = split_outcome(alerts, "alerts");
        let (notifications, notifications_error) = split_outcome(notifications, "notifications");
        let state = FeedState {
            alerts,
            notifications,
            alerts_error,
            notifications_error,
        };

        tracing::debug!(
            alerts = state.alerts.len(),
            notifications = state.notifications.len(),
            unread = state.unread_count(),
            "feed refreshed"
        );

        self.state.send_replace(state.clone());
        state
    }

    /// Mark one item read, optimistically.
    ///
    /// An item that is already read is left alone and no request is sent.
    ///
    /// # Errors
    ///
    /// - [`FeedError::NotFound`] if `key` is not in the feed.
    /// - [`FeedError::Mutation`] or [`FeedError::Timeout`] if the backend
    ///   call fails; the local change has been rolled back.
    pub async fn mark_read(&mut self, key: FeedKey) -> Result<MutationOutcome, FeedError> {
        let is_read = self.state.borrow().is_read(key);
        match is_read {
            None => return Err(FeedError::NotFound(key)),
            Some(true) => return Ok(MutationOutcome::Unchanged),
            Some(false) => {}
        }

        let snapshot = CollectionSnapshot::capture(&self.state.borrow(), key.source);
        self.state.send_modify(|state| {
            state.mark_read(key);
        });

        let request = async {
            match key.source {
                FeedSource::Alert => self.client.mark_alert_read(key.id, &self.actor).await,
                FeedSource::Notification => {
                    self.client
                        .mark_notification_read(key.id, &self.actor, self.role)
                        .await
                }
            }
        };
        let result = tokio::time::timeout(self.deadline, request).await;
        self.settle(key, snapshot, result)
    }

    /// Remove one item from its own collection, optimistically.
    ///
    /// # Errors
    ///
    /// Same as [`FeedController::mark_read`].
    pub async fn dismiss(&mut self, key: FeedKey) -> Result<MutationOutcome, FeedError> {
        if !self.state.borrow().contains(key) {
            return Err(FeedError::NotFound(key));
        }

        let snapshot = CollectionSnapshot::capture(&self.state.borrow(), key.source);
        self.state.send_modify(|state| {
            state.remove(key);
        });

        let request = async {
            match key.source {
                FeedSource::Alert => self.client.dismiss_alert(key.id, &self.actor).await,
                FeedSource::Notification => {
                    self.client
                        .dismiss_notification(key.id, &self.actor, self.role)
                        .await
                }
            }
        };
        let result = tokio::time::timeout(self.deadline, request).await;
        self.settle(key, snapshot, result)
    }

    /// Mark every unread item read, one request per item.
    ///
    /// Items are processed alerts first. Each item is optimistic on its own,
    /// so on error the items already confirmed stay read and only the failing
    /// item is rolled back.
    ///
    /// # Errors
    ///
    /// The first error from [`FeedController::mark_read`]; later items are
    /// not attempted.
    pub async fn mark_all_read(&mut self) -> Result<usize, FeedError> {
        let keys = self.state.borrow().unread_keys();
        let mut applied = 0;
        for key in keys {
            if self.mark_read(key).await? == MutationOutcome::Applied {
                applied += 1;
            }
        }
        tracing::debug!(count = applied, "marked all feed items read");
        Ok(applied)
    }

    fn settle(
        &self,
        key: FeedKey,
        snapshot: CollectionSnapshot,
        result: Result<Result<(), ClientError>, Elapsed>,
    ) -> Result<MutationOutcome, FeedError> {
        let err = match result {
            Ok(Ok(())) => {
                tracing::debug!(key = %key, "feed mutation confirmed");
                return Ok(MutationOutcome::Applied);
            }
            Ok(Err(source)) => FeedError::Mutation { key, source },
            Err(_) => FeedError::Timeout {
                key,
                timeout_ms: u64::try_from(self.deadline.as_millis()).unwrap_or(u64::MAX),
            },
        };

        tracing::warn!(key = %key, error = %err, "feed mutation failed, restoring snapshot");
        self.state.send_modify(|state| snapshot.restore(state));
        Err(err)
    }
}

fn split_outcome<T>(outcome: SourceOutcome<Vec<T>>, scope: &str) -> (Vec<T>, Option<String>) {
    match outcome.outcome {
        Outcome::Success(items) => (items, None),
        Outcome::Empty => (Vec::new(), None),
        Outcome::Failed(_) => (Vec::new(), Some(format!("Failed to load {scope}"))),
    }
}
