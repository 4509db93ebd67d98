//! Response envelopes accepted from the backend.
//!
//! The backend is inconsistent about wrapping: the same list may arrive bare,
//! under `data`, or under its resource name. These envelopes absorb that
//! variation so the client methods return plain domain records.

use agrodash_core::{AggregateDashboard, Notification, Order, Product, Profile, RecentContent};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped(WrappedList<T>),
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct WrappedList<T> {
    #[serde(
        alias = "items",
        alias = "results",
        alias = "products",
        alias = "orders",
        alias = "notifications",
        alias = "alerts",
        alias = "crops",
        default
    )]
    data: Option<Vec<T>>,
}

impl<T> ListEnvelope<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            ListEnvelope::Bare(items) => items,
            ListEnvelope::Wrapped(wrapped) => wrapped.data.unwrap_or_default(),
        }
    }
}

/// Single object, either bare or nested under `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ObjectEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> ObjectEnvelope<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            ObjectEnvelope::Wrapped { data } | ObjectEnvelope::Bare(data) => data,
        }
    }
}

/// `services` arrives as `{ "services": [...] }` or as a bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ServicesEnvelope {
    Bare(Vec<String>),
    Wrapped {
        #[serde(default)]
        services: Vec<String>,
    },
}

impl ServicesEnvelope {
    pub(crate) fn into_vec(self) -> Vec<String> {
        let services = match self {
            ServicesEnvelope::Bare(items) | ServicesEnvelope::Wrapped { services: items } => items,
        };
        services
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl Default for ServicesEnvelope {
    fn default() -> Self {
        ServicesEnvelope::Bare(Vec::new())
    }
}

#[derive(Debug, Default, Deserialize)]
struct RecentWire {
    #[serde(default)]
    products: Option<ListEnvelope<Product>>,
    #[serde(default)]
    orders: Option<ListEnvelope<Order>>,
    #[serde(default)]
    notifications: Option<ListEnvelope<Notification>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AggregateWire {
    #[serde(default)]
    summary: Option<Profile>,
    #[serde(default)]
    services: Option<ServicesEnvelope>,
    #[serde(alias = "recentData", alias = "recent_data", default)]
    recent: Option<RecentWire>,
}

impl From<AggregateWire> for AggregateDashboard {
    fn from(wire: AggregateWire) -> Self {
        let recent = wire.recent.unwrap_or_default();
        AggregateDashboard {
            summary: wire.summary,
            services: wire.services.unwrap_or_default().into_vec(),
            recent: RecentContent {
                products: recent.products.map(ListEnvelope::into_vec).unwrap_or_default(),
                orders: recent.orders.map(ListEnvelope::into_vec).unwrap_or_default(),
                notifications: recent
                    .notifications
                    .map(ListEnvelope::into_vec)
                    .unwrap_or_default(),
            },
        }
    }
}
