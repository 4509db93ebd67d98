//! Unified alert/notification feed.
//!
//! Budget alerts and transactional notifications come from two endpoints with
//! two id spaces. [`merge_feed`] projects both into one list of [`FeedItem`]s
//! ordered newest first. The projection is recomputed from the source
//! collections on every read and never patched in place, so it cannot drift
//! from its inputs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{Alert, AlertType, Notification, NotificationType};

/// Which collection a feed item belongs to.
///
/// Ids are only unique within one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    Alert,
    Notification,
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedSource::Alert => f.write_str("alert"),
            FeedSource::Notification => f.write_str("notification"),
        }
    }
}

impl std::str::FromStr for FeedSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alert" | "alerts" => Ok(FeedSource::Alert),
            "notification" | "notifications" => Ok(FeedSource::Notification),
            other => Err(format!("unknown feed source '{other}'")),
        }
    }
}

/// Namespaced identity of a feed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FeedKey {
    pub source: FeedSource,
    pub id: i64,
}

impl FeedKey {
    #[must_use]
    pub fn alert(id: i64) -> Self {
        Self {
            source: FeedSource::Alert,
            id,
        }
    }

    #[must_use]
    pub fn notification(id: i64) -> Self {
        Self {
            source: FeedSource::Notification,
            id,
        }
    }
}

impl std::fmt::Display for FeedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.source, self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FeedKind {
    Alert(AlertType),
    Notification(NotificationType),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeedOriginal {
    Alert(Alert),
    Notification(Notification),
}

/// Normalized view over one alert or notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: i64,
    pub source: FeedSource,
    pub title: String,
    pub body: String,
    pub kind: FeedKind,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub original: FeedOriginal,
}

impl FeedItem {
    #[must_use]
    pub fn key(&self) -> FeedKey {
        FeedKey {
            source: self.source,
            id: self.id,
        }
    }
}

impl From<&Alert> for FeedItem {
    fn from(alert: &Alert) -> Self {
        let title = if alert.crop_name.is_empty() {
            alert.alert_type.label().to_string()
        } else {
            format!("{}: {}", alert.crop_name, alert.alert_type.label())
        };
        Self {
            id: alert.id,
            source: FeedSource::Alert,
            title,
            body: alert.message.clone(),
            kind: FeedKind::Alert(alert.alert_type),
            is_read: alert.is_read,
            created_at: alert.created_at,
            original: FeedOriginal::Alert(alert.clone()),
        }
    }
}

impl From<&Notification> for FeedItem {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id,
            source: FeedSource::Notification,
            title: notification.title.clone(),
            body: notification.body.clone(),
            kind: FeedKind::Notification(notification.kind),
            is_read: notification.is_read,
            created_at: notification.created_at,
            original: FeedOriginal::Notification(notification.clone()),
        }
    }
}

/// Merge alerts and notifications into one feed, newest first.
///
/// Alerts are placed before notifications and the sort is stable, so items
/// with identical timestamps keep their input order with alerts first.
#[must_use]
pub fn merge_feed(alerts: &[Alert], notifications: &[Notification]) -> Vec<FeedItem> {
    let mut items: Vec<FeedItem> = alerts
        .iter()
        .map(FeedItem::from)
        .chain(notifications.iter().map(FeedItem::from))
        .collect();
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    items
}

/// The two source collections behind the feed.
///
/// Local mutations operate on these collections; the merged feed is always
/// derived from them through [`FeedState::items`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedState {
    pub alerts: Vec<Alert>,
    pub notifications: Vec<Notification>,
    /// Inline error for the alert source from the last load.
    pub alerts_error: Option<String>,
    /// Inline error for the notification source from the last load.
    pub notifications_error: Option<String>,
}

impl FeedState {
    #[must_use]
    pub fn items(&self) -> Vec<FeedItem> {
        merge_feed(&self.alerts, &self.notifications)
    }

    /// Unread alerts plus unread notifications, counted per collection.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.alerts.iter().filter(|a| !a.is_read).count()
            + self.notifications.iter().filter(|n| !n.is_read).count()
    }

    #[must_use]
    pub fn contains(&self, key: FeedKey) -> bool {
        self.is_read(key).is_some()
    }

    /// Read flag of the item behind `key`, or `None` if it is not present.
    #[must_use]
    pub fn is_read(&self, key: FeedKey) -> Option<bool> {
        match key.source {
            FeedSource::Alert => self
                .alerts
                .iter()
                .find(|a| a.id == key.id)
                .map(|a| a.is_read),
            FeedSource::Notification => self
                .notifications
                .iter()
                .find(|n| n.id == key.id)
                .map(|n| n.is_read),
        }
    }

    /// Flag the item as read. Returns `true` if an unread item was changed.
    pub fn mark_read(&mut self, key: FeedKey) -> bool {
        match key.source {
            FeedSource::Alert => match self.alerts.iter_mut().find(|a| a.id == key.id) {
                Some(alert) if !alert.is_read => {
                    alert.is_read = true;
                    true
                }
                _ => false,
            },
            FeedSource::Notification => {
                match self.notifications.iter_mut().find(|n| n.id == key.id) {
                    Some(notification) if !notification.is_read => {
                        notification.is_read = true;
                        true
                    }
                    _ => false,
                }
            }
        }
    }

    /// Remove exactly one item from its own collection.
    ///
    /// Returns `true` if an item was removed. The other collection is never
    /// touched, even when it holds an item with the same numeric id.
    pub fn remove(&mut self, key: FeedKey) -> bool {
        match key.source {
            FeedSource::Alert => match self.alerts.iter().position(|a| a.id == key.id) {
                Some(idx) => {
                    self.alerts.remove(idx);
                    true
                }
                None => false,
            },
            FeedSource::Notification => {
                match self.notifications.iter().position(|n| n.id == key.id) {
                    Some(idx) => {
                        self.notifications.remove(idx);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Keys of every unread item, alerts first.
    #[must_use]
    pub fn unread_keys(&self) -> Vec<FeedKey> {
        self.alerts
            .iter()
            .filter(|a| !a.is_read)
            .map(|a| FeedKey::alert(a.id))
            .chain(
                self.notifications
                    .iter()
                    .filter(|n| !n.is_read)
                    .map(|n| FeedKey::notification(n.id)),
            )
            .collect()
    }
}
