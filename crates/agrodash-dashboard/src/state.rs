//! Dashboard state container.

use agrodash_core::{Metrics, Notification, Order, Payload, Product, Profile};
use serde::Serialize;

use crate::source::Outcome;

/// One dashboard field as the presentation layer sees it.
///
/// `Ready` only ever holds non-empty data; empty responses become `Empty`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Field<T> {
    Loading,
    Empty,
    Ready(T),
    Failed(String),
}

impl<T> Field<T> {
    /// Convert a source outcome; failures get a message scoped to `scope`.
    #[must_use]
    pub fn from_outcome(outcome: Outcome<T>, scope: &str) -> Self {
        match outcome {
            Outcome::Success(value) => Field::Ready(value),
            Outcome::Empty => Field::Empty,
            Outcome::Failed(_) => Field::Failed(format!("Failed to load {scope}")),
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Field::Ready(_))
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Ready(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Field::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

impl<T: Payload> Field<T> {
    /// Merge-if-empty: take `candidate` only when this field holds no data.
    ///
    /// Returns `true` if the field was written. A `Ready` field is never
    /// touched, and an empty candidate never replaces anything.
    pub fn fill_if_empty(&mut self, candidate: Option<T>) -> bool {
        if self.is_ready() {
            return false;
        }
        match candidate {
            Some(value) if !value.is_empty_payload() => {
                *self = Field::Ready(value);
                true
            }
            _ => false,
        }
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Loading
    }
}

/// Normalized dashboard payloads for one actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardState {
    pub metrics: Field<Metrics>,
    pub profile: Field<Profile>,
    pub services: Field<Vec<String>>,
    pub recent_products: Field<Vec<Product>>,
    pub recent_orders: Field<Vec<Order>>,
    pub recent_notifications: Field<Vec<Notification>>,
}

impl DashboardState {
    /// Every field `Loading`; the state published while a cycle is in flight.
    #[must_use]
    pub fn loading() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{FailureKind, SourceFailure};

    #[test]
    fn fill_if_empty_writes_empty_and_failed_fields() {
        let mut empty: Field<Vec<String>> = Field::Empty;
        assert!(empty.fill_if_empty(Some(vec!["Soil testing".to_string()])));
        assert!(empty.is_ready());

        let mut failed: Field<Vec<String>> = Field::Failed("Failed to load services".into());
        assert!(failed.fill_if_empty(Some(vec!["Cold storage".to_string()])));
        assert_eq!(failed.value().map(Vec::len), Some(1));
    }

    #[test]
    fn fill_if_empty_never_overwrites_ready() {
        let mut field = Field::Ready(vec!["Primary".to_string()]);
        assert!(!field.fill_if_empty(Some(vec!["Fallback".to_string()])));
        assert_eq!(field, Field::Ready(vec!["Primary".to_string()]));
    }

    #[test]
    fn fill_if_empty_ignores_empty_candidate() {
        let mut field: Field<Vec<String>> = Field::Failed("Failed to load services".into());
        assert!(!field.fill_if_empty(Some(Vec::new())));
        assert!(!field.fill_if_empty(None));
        assert_eq!(field.error(), Some("Failed to load services"));
    }

    #[test]
    fn from_outcome_scopes_failure_message() {
        let field: Field<Vec<u8>> = Field::from_outcome(
            Outcome::Failed(SourceFailure {
                kind: FailureKind::Network,
                message: "connection refused".to_string(),
            }),
            "recent orders",
        );
        assert_eq!(field.error(), Some("Failed to load recent orders"));
    }

    #[test]
    fn loading_state_has_no_content() {
        let state = DashboardState::loading();
        assert_eq!(state.metrics, Field::Loading);
        assert_eq!(state.recent_notifications, Field::Loading);
        assert!(state.recent_products.value().is_none());
        assert!(state.recent_orders.error().is_none());
    }
}
