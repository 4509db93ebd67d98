//! HTTP client for the dashboard REST backend.
//!
//! Wraps `reqwest` with base-URL handling, actor/role query parameters, status
//! classification, and tolerant decoding of the backend's loosely shaped
//! payloads. Every read method returns an already-normalized domain record;
//! a `null` or empty body decodes to `None` / an empty `Vec`.

use std::time::Duration;

use agrodash_core::{
    Actor, AggregateDashboard, Alert, AppConfig, CropBudgetSummary, Metrics, Notification, Order,
    Product, Profile, Role,
};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::wire::{AggregateWire, ListEnvelope, ObjectEnvelope, ServicesEnvelope};

/// Client for the dashboard backend.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    /// Creates a client from the application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if the
    /// configured base URL does not parse.
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::with_options(
            &config.api_base_url,
            Duration::from_secs(config.request_timeout_secs),
            Duration::from_secs(config.connect_timeout_secs),
            &config.user_agent,
        )
    }

    /// Creates a client with default timeouts (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// See [`BackendClient::with_options`].
    pub fn with_base_url(base_url: &str) -> Result<Self, ClientError> {
        Self::with_options(
            base_url,
            Duration::from_secs(15),
            Duration::from_secs(10),
            "agrodash/0.1 (dashboard-client)",
        )
    }

    /// Creates a client with explicit timeouts and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute http(s) URL.
    pub fn with_options(
        base_url: &str,
        request_timeout: Duration,
        connect_timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .user_agent(user_agent)
            .build()?;

        // Relative joins only append when the base path ends in a slash.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ClientError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                base_url: base_url.to_owned(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    // -----------------------------------------------------------------------
    // Dashboard sources
    // -----------------------------------------------------------------------

    /// Headline counters (`GET dashboard/metrics`).
    ///
    /// # Errors
    ///
    /// - [`ClientError::Http`] on network failure or timeout.
    /// - [`ClientError::NotFound`] / [`ClientError::UnexpectedStatus`] on non-2xx.
    /// - [`ClientError::Api`] if a 2xx body is an error envelope.
    /// - [`ClientError::Deserialize`] if the body does not match the expected shape.
    pub async fn get_metrics(&self, actor: &Actor) -> Result<Option<Metrics>, ClientError> {
        let url = self.build_url("dashboard/metrics", actor, &[])?;
        let body: Option<ObjectEnvelope<Metrics>> = self.get_json(url, "getMetrics").await?;
        Ok(body.map(ObjectEnvelope::into_inner))
    }

    /// Dedicated profile endpoint (`GET dashboard/profile`).
    ///
    /// # Errors
    ///
    /// Same as [`BackendClient::get_metrics`].
    pub async fn get_profile(&self, actor: &Actor) -> Result<Option<Profile>, ClientError> {
        let url = self.build_url("dashboard/profile", actor, &[])?;
        let body: Option<ObjectEnvelope<Profile>> = self.get_json(url, "getProfile").await?;
        Ok(body.map(ObjectEnvelope::into_inner))
    }

    /// Direct user lookup by id (`GET users/{id}`) or by email
    /// (`GET users/lookup?email=`).
    ///
    /// A 404 means "no such user" and is returned as `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Same as [`BackendClient::get_metrics`], except that 404 is not an error.
    pub async fn lookup_user(&self, actor: &Actor) -> Result<Option<Profile>, ClientError> {
        let url = match actor {
            Actor::Id(id) => self.build_url(&format!("users/{id}"), actor, &[])?,
            Actor::Email(email) => {
                self.build_url("users/lookup", actor, &[("email", email.as_str())])?
            }
        };
        match self
            .get_json::<ObjectEnvelope<Profile>>(url, "lookupUser")
            .await
        {
            Ok(body) => Ok(body.map(ObjectEnvelope::into_inner)),
            Err(ClientError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Services offered by the actor (`GET dashboard/services`).
    ///
    /// # Errors
    ///
    /// Same as [`BackendClient::get_metrics`].
    pub async fn get_services(&self, actor: &Actor) -> Result<Vec<String>, ClientError> {
        let url = self.build_url("dashboard/services", actor, &[])?;
        let body: Option<ServicesEnvelope> = self.get_json(url, "getServices").await?;
        Ok(body.map(ServicesEnvelope::into_vec).unwrap_or_default())
    }

    /// # Errors
    ///
    /// Same as [`BackendClient::get_metrics`].
    pub async fn get_recent_products(
        &self,
        actor: &Actor,
        limit: u32,
    ) -> Result<Vec<Product>, ClientError> {
        self.get_list("dashboard/recent/products", actor, limit, "getRecentProducts")
            .await
    }

    /// # Errors
    ///
    /// Same as [`BackendClient::get_metrics`].
    pub async fn get_recent_orders(
        &self,
        actor: &Actor,
        limit: u32,
    ) -> Result<Vec<Order>, ClientError> {
        self.get_list("dashboard/recent/orders", actor, limit, "getRecentOrders")
            .await
    }

    /// # Errors
    ///
    /// Same as [`BackendClient::get_metrics`].
    pub async fn get_recent_notifications(
        &self,
        actor: &Actor,
        limit: u32,
    ) -> Result<Vec<Notification>, ClientError> {
        self.get_list(
            "dashboard/recent/notifications",
            actor,
            limit,
            "getRecentNotifications",
        )
        .await
    }

    /// Coarse aggregate snapshot (`GET dashboard`), used only as a fallback.
    ///
    /// # Errors
    ///
    /// Same as [`BackendClient::get_metrics`].
    pub async fn get_aggregate_dashboard(
        &self,
        actor: &Actor,
    ) -> Result<Option<AggregateDashboard>, ClientError> {
        let url = self.build_url("dashboard", actor, &[])?;
        let body: Option<ObjectEnvelope<AggregateWire>> =
            self.get_json(url, "getAggregateDashboard").await?;
        Ok(body.map(|env| AggregateDashboard::from(env.into_inner())))
    }

    /// Per-crop planned versus spent figures (`GET budget/crops`).
    ///
    /// # Errors
    ///
    /// Same as [`BackendClient::get_metrics`].
    pub async fn get_crop_budget_summaries(
        &self,
        actor: &Actor,
    ) -> Result<Vec<CropBudgetSummary>, ClientError> {
        let url = self.build_url("budget/crops", actor, &[])?;
        let body: Option<ListEnvelope<CropBudgetSummary>> =
            self.get_json(url, "getCropBudgetSummaries").await?;
        Ok(body.map(ListEnvelope::into_vec).unwrap_or_default())
    }

    // -----------------------------------------------------------------------
    // Alerts
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Same as [`BackendClient::get_metrics`].
    pub async fn get_alerts(&self, actor: &Actor) -> Result<Vec<Alert>, ClientError> {
        let url = self.build_url("alerts", actor, &[])?;
        let body: Option<ListEnvelope<Alert>> = self.get_json(url, "getAlerts").await?;
        Ok(body.map(ListEnvelope::into_vec).unwrap_or_default())
    }

    /// `PATCH alerts/{id}/read`.
    ///
    /// # Errors
    ///
    /// [`ClientError::Http`] on network failure; [`ClientError::NotFound`] or
    /// [`ClientError::UnexpectedStatus`] on non-2xx.
    pub async fn mark_alert_read(&self, id: i64, actor: &Actor) -> Result<(), ClientError> {
        let url = self.build_url(&format!("alerts/{id}/read"), actor, &[])?;
        self.mutate(Method::PATCH, url).await
    }

    /// `DELETE alerts/{id}`.
    ///
    /// # Errors
    ///
    /// Same as [`BackendClient::mark_alert_read`].
    pub async fn dismiss_alert(&self, id: i64, actor: &Actor) -> Result<(), ClientError> {
        let url = self.build_url(&format!("alerts/{id}"), actor, &[])?;
        self.mutate(Method::DELETE, url).await
    }

    // -----------------------------------------------------------------------
    // Notifications
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Same as [`BackendClient::get_metrics`].
    pub async fn get_notifications(
        &self,
        actor: &Actor,
        role: Role,
    ) -> Result<Vec<Notification>, ClientError> {
        let url = self.build_url("notifications", actor, &[("role", role.as_str())])?;
        let body: Option<ListEnvelope<Notification>> =
            self.get_json(url, "getNotifications").await?;
        Ok(body.map(ListEnvelope::into_vec).unwrap_or_default())
    }

    /// `PATCH notifications/{id}/read?role=`.
    ///
    /// # Errors
    ///
    /// Same as [`BackendClient::mark_alert_read`].
    pub async fn mark_notification_read(
        &self,
        id: i64,
        actor: &Actor,
        role: Role,
    ) -> Result<(), ClientError> {
        let url = self.build_url(
            &format!("notifications/{id}/read"),
            actor,
            &[("role", role.as_str())],
        )?;
        self.mutate(Method::PATCH, url).await
    }

    /// `DELETE notifications/{id}?role=`.
    ///
    /// # Errors
    ///
    /// Same as [`BackendClient::mark_alert_read`].
    pub async fn dismiss_notification(
        &self,
        id: i64,
        actor: &Actor,
        role: Role,
    ) -> Result<(), ClientError> {
        let url = self.build_url(
            &format!("notifications/{id}"),
            actor,
            &[("role", role.as_str())],
        )?;
        self.mutate(Method::DELETE, url).await
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    /// Builds the request URL for `path` with the `actor` parameter and any
    /// extra query pairs, all percent-encoded.
    fn build_url(
        &self,
        path: &str,
        actor: &Actor,
        extra: &[(&str, &str)],
    ) -> Result<Url, ClientError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join '{path}': {e}"),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("actor", &actor.to_string());
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        actor: &Actor,
        limit: u32,
        context: &str,
    ) -> Result<Vec<T>, ClientError> {
        let limit = limit.to_string();
        let url = self.build_url(path, actor, &[("limit", limit.as_str())])?;
        let body: Option<ListEnvelope<T>> = self.get_json(url, context).await?;
        Ok(body.map(ListEnvelope::into_vec).unwrap_or_default())
    }

    /// Sends a GET request, asserts a 2xx status, and decodes the body.
    ///
    /// An empty or `null` body decodes to `None`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<Option<T>, ClientError> {
        tracing::debug!(op = context, path = url.path(), "backend GET");
        let response = self.client.get(url.clone()).send().await?;
        let response = Self::check_status(response, &url)?;
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| ClientError::Deserialize {
                context: context.to_owned(),
                source: e,
            })?;
        Self::check_api_error(&value, context)?;
        serde_json::from_value::<Option<T>>(value).map_err(|e| ClientError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    /// Rejects a 2xx body that is an error envelope: `"success": false`,
    /// `"status": "error"`, or a non-null top-level `error`.
    fn check_api_error(body: &serde_json::Value, context: &str) -> Result<(), ClientError> {
        let Some(object) = body.as_object() else {
            return Ok(());
        };

        let success = object.get("success").and_then(serde_json::Value::as_bool);
        let status = object.get("status").and_then(serde_json::Value::as_str);
        let unsuccessful =
            success == Some(false) || status.is_some_and(|s| s.eq_ignore_ascii_case("error"));
        let error = object
            .get("error")
            .filter(|e| !e.is_null() && e.as_bool() != Some(false));

        if !unsuccessful && error.is_none() {
            return Ok(());
        }

        let message = error
            .and_then(|e| {
                e.as_str()
                    .or_else(|| e.get("message").and_then(serde_json::Value::as_str))
            })
            .or_else(|| object.get("message").and_then(serde_json::Value::as_str))
            .unwrap_or("unknown error")
            .to_string();
        Err(ClientError::Api {
            context: context.to_owned(),
            message,
        })
    }

    async fn mutate(&self, method: Method, url: Url) -> Result<(), ClientError> {
        tracing::debug!(method = %method, path = url.path(), "backend mutation");
        let response = self.client.request(method, url.clone()).send().await?;
        Self::check_status(response, &url)?;
        Ok(())
    }

    fn check_status(
        response: reqwest::Response,
        url: &Url,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
