//! Typed records for every payload the dashboard backend returns.
//!
//! Backend responses are loosely shaped: fields may be camelCase or
//! snake_case, and most of them may be missing. Every record here accepts
//! both spellings and models absent fields as `Option` (or an empty
//! collection), so shape checks happen once at deserialization time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decides whether a successfully decoded payload carries any content.
///
/// A payload that decodes but reports `true` here is "the server said no
/// data", which callers must keep distinct from "the request failed".
pub trait Payload {
    fn is_empty_payload(&self) -> bool;
}

impl<T> Payload for Vec<T> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Payload> Payload for Option<T> {
    fn is_empty_payload(&self) -> bool {
        self.as_ref().is_none_or(Payload::is_empty_payload)
    }
}

// ---------------------------------------------------------------------------
// Actor / role
// ---------------------------------------------------------------------------

/// Reference to the user whose dashboard is being loaded.
///
/// Every backend operation accepts either the numeric user id or the
/// account email.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Actor {
    Id(i64),
    Email(String),
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Id(id) => write!(f, "{id}"),
            Actor::Email(email) => f.write_str(email),
        }
    }
}

impl FromStr for Actor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("actor must not be empty".to_string());
        }
        if let Ok(id) = trimmed.parse::<i64>() {
            return Ok(Actor::Id(id));
        }
        if trimmed.contains('@') {
            return Ok(Actor::Email(trimmed.to_string()));
        }
        Err(format!(
            "actor '{trimmed}' is neither a numeric id nor an email"
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Farmer,
    Business,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Farmer => "farmer",
            Role::Business => "business",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "farmer" => Ok(Role::Farmer),
            "business" | "agribusiness" => Ok(Role::Business),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Alerts and notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Warning,
    #[serde(alias = "overBudget", alias = "over-budget")]
    OverBudget,
    #[serde(alias = "customThreshold", alias = "custom-threshold", alias = "custom")]
    CustomThreshold,
}

impl AlertType {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AlertType::Warning => "Budget warning",
            AlertType::OverBudget => "Over budget",
            AlertType::CustomThreshold => "Custom threshold reached",
        }
    }
}

/// Budget alert raised by the backend for one crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: i64,
    #[serde(alias = "crop_name", alias = "crop", default)]
    pub crop_name: String,
    #[serde(alias = "alert_type", alias = "type")]
    pub alert_type: AlertType,
    #[serde(default)]
    pub message: String,
    #[serde(alias = "is_read", alias = "read", default)]
    pub is_read: bool,
    #[serde(alias = "created_at", default)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Order,
    Request,
    Message,
    #[default]
    #[serde(other)]
    Other,
}

/// Transactional notification (orders, service requests, messages).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(alias = "message", default)]
    pub body: String,
    #[serde(rename = "type", alias = "notificationType", alias = "notification_type", default)]
    pub kind: NotificationType,
    #[serde(alias = "is_read", alias = "read", default)]
    pub is_read: bool,
    #[serde(alias = "created_at", default)]
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Dashboard payloads
// ---------------------------------------------------------------------------

/// Headline counters for the dashboard summary cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    #[serde(alias = "total_products", alias = "totalProducts", default)]
    pub products: Option<u64>,
    #[serde(alias = "total_orders", alias = "totalOrders", default)]
    pub orders: Option<u64>,
    #[serde(alias = "pending_orders", default)]
    pub pending_orders: Option<u64>,
    #[serde(alias = "total_revenue", alias = "totalRevenue", default)]
    pub revenue: Option<Decimal>,
}

impl Payload for Metrics {
    fn is_empty_payload(&self) -> bool {
        self.products.is_none()
            && self.orders.is_none()
            && self.pending_orders.is_none()
            && self.revenue.is_none()
    }
}

/// Profile summary shown in the dashboard header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(alias = "fullName", alias = "full_name", alias = "username", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(alias = "phoneNumber", alias = "phone_number", default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(
        alias = "businessName",
        alias = "business_name",
        alias = "farm_name",
        default
    )]
    pub farm_name: Option<String>,
}

impl Payload for Profile {
    fn is_empty_payload(&self) -> bool {
        self.id.is_none()
            && self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.farm_name.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    #[serde(alias = "title", alias = "product_name", alias = "productName", default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(alias = "created_at", default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    #[serde(alias = "product_name", default)]
    pub product_name: Option<String>,
    #[serde(alias = "buyer_name", alias = "customerName", default)]
    pub buyer_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(alias = "totalPrice", alias = "total_price", alias = "amount", default)]
    pub total: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(alias = "created_at", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Planned versus actual spend for one crop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropBudgetSummary {
    #[serde(alias = "cropName", alias = "crop_name")]
    pub name: String,
    #[serde(alias = "planned_budget", alias = "budget", default)]
    pub planned_budget: Decimal,
    #[serde(alias = "total_spent", alias = "spent", default)]
    pub total_spent: Decimal,
    #[serde(alias = "remaining_budget", alias = "remaining", default)]
    pub remaining_budget: Decimal,
}

/// Recent-content block of the aggregate snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecentContent {
    pub products: Vec<Product>,
    pub orders: Vec<Order>,
    pub notifications: Vec<Notification>,
}

/// Coarse snapshot returned by the aggregate dashboard endpoint.
///
/// Only consulted when the dedicated endpoints came back empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateDashboard {
    pub summary: Option<Profile>,
    pub services: Vec<String>,
    pub recent: RecentContent,
}

impl Payload for AggregateDashboard {
    fn is_empty_payload(&self) -> bool {
        self.summary.is_empty_payload()
            && self.services.is_empty()
            && self.recent.products.is_empty()
            && self.recent.orders.is_empty()
            && self.recent.notifications.is_empty()
    }
}
