use async_trait::async_trait;
use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, ETAG, IF_NONE_MATCH};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::api_types::{ApiBootstrapResponse, ApiUser};
use super::context::{TenantContext, TENANT_HEADER};
use super::error::ApiError;
use super::types::{
  BootstrapSnapshot, EventSummary, FormDefinition, FormSubmission, InventoryItem, StockLevel,
  Ticket, UserSummary,
};

/// Outcome of a conditional bootstrap request.
#[derive(Debug)]
pub enum BootstrapFetch {
  /// Server sent new data along with its freshness token
  Fresh {
    snapshot: BootstrapSnapshot,
    token: String,
  },
  /// The token we sent is still current
  NotModified,
  /// Network failure or non-success status
  Failed(ApiError),
}

/// Calls the sync layer makes against the dashboard API.
///
/// Implementations never retry; retry policy belongs to the caller.
#[async_trait]
pub trait DashboardApi: Send + Sync + 'static {
  /// `GET /bootstrap`, conditional on `freshness_token` when present.
  async fn fetch_bootstrap(&self, freshness_token: Option<&str>) -> BootstrapFetch;

  async fn tickets(&self) -> Result<Vec<Ticket>, ApiError>;

  async fn events(&self) -> Result<Vec<EventSummary>, ApiError>;

  async fn forms(&self) -> Result<Vec<FormDefinition>, ApiError>;

  async fn form_submissions(&self) -> Result<Vec<FormSubmission>, ApiError>;

  async fn inventory(&self) -> Result<Vec<InventoryItem>, ApiError>;

  async fn stock_levels(&self) -> Result<Vec<StockLevel>, ApiError>;

  async fn admin_users(&self) -> Result<Vec<UserSummary>, ApiError>;
}

/// reqwest-backed dashboard API client, scoped to one tenant.
#[derive(Clone)]
pub struct DashboardClient {
  http: reqwest::Client,
  base: Url,
  context: TenantContext,
}

impl DashboardClient {
  pub fn new(base_url: &str, context: TenantContext, timeout: Duration) -> Result<Self> {
    // A trailing slash makes `Url::join` append rather than replace the last segment.
    let normalized = if base_url.ends_with('/') {
      base_url.to_string()
    } else {
      format!("{}/", base_url)
    };
    let base =
      Url::parse(&normalized).map_err(|e| eyre!("Invalid server url {}: {}", base_url, e))?;

    let http = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base,
      context,
    })
  }

  pub fn context(&self) -> &TenantContext {
    &self.context
  }

  fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
    Ok(self.base.join(path.trim_start_matches('/'))?)
  }

  /// Bearer credential when present, tenant header otherwise. Never both.
  fn scoped_headers(&self) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();
    match self.context.credential() {
      Some(credential) => {
        let mut value = HeaderValue::from_str(&credential.bearer())?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
      }
      None => {
        headers.insert(
          HeaderName::from_static(TENANT_HEADER),
          HeaderValue::from_str(self.context.tenant().as_str())?,
        );
      }
    }
    Ok(headers)
  }

  async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
    let url = self.endpoint(path)?;
    let response = self
      .http
      .get(url)
      .headers(self.scoped_headers()?)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(ApiError::Status(status.as_u16()));
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
  }

  async fn try_fetch_bootstrap(
    &self,
    freshness_token: Option<&str>,
  ) -> Result<BootstrapFetch, ApiError> {
    let url = self.endpoint("bootstrap")?;
    let mut headers = self.scoped_headers()?;
    if let Some(token) = freshness_token {
      headers.insert(IF_NONE_MATCH, HeaderValue::from_str(token)?);
    }

    let response = self.http.get(url).headers(headers).send().await?;
    let status = response.status();
    if status == StatusCode::NOT_MODIFIED {
      return Ok(BootstrapFetch::NotModified);
    }
    if !status.is_success() {
      return Err(ApiError::Status(status.as_u16()));
    }

    let header_token = response
      .headers()
      .get(ETAG)
      .and_then(|v| v.to_str().ok())
      .map(ToString::to_string);
    let bytes = response.bytes().await?;
    let body: ApiBootstrapResponse = serde_json::from_slice(&bytes)?;

    // Without an ETag, hash the body so the next revalidation is still conditional.
    let token = header_token.unwrap_or_else(|| hex::encode(Sha256::digest(&bytes)));

    Ok(BootstrapFetch::Fresh {
      snapshot: body.into_snapshot(Utc::now()),
      token,
    })
  }
}

#[async_trait]
impl DashboardApi for DashboardClient {
  async fn fetch_bootstrap(&self, freshness_token: Option<&str>) -> BootstrapFetch {
    match self.try_fetch_bootstrap(freshness_token).await {
      Ok(fetch) => {
        debug!(
          tenant = %self.context.tenant(),
          not_modified = matches!(fetch, BootstrapFetch::NotModified),
          "bootstrap request completed"
        );
        fetch
      }
      Err(e) => {
        warn!(tenant = %self.context.tenant(), error = %e, "bootstrap request failed");
        BootstrapFetch::Failed(e)
      }
    }
  }

  async fn tickets(&self) -> Result<Vec<Ticket>, ApiError> {
    self.get_list("tickets").await
  }

  async fn events(&self) -> Result<Vec<EventSummary>, ApiError> {
    self.get_list("events").await
  }

  async fn forms(&self) -> Result<Vec<FormDefinition>, ApiError> {
    self.get_list("forms").await
  }

  async fn form_submissions(&self) -> Result<Vec<FormSubmission>, ApiError> {
    self.get_list("forms/submissions").await
  }

  async fn inventory(&self) -> Result<Vec<InventoryItem>, ApiError> {
    self.get_list("inventory").await
  }

  async fn stock_levels(&self) -> Result<Vec<StockLevel>, ApiError> {
    self.get_list("inventory/stock").await
  }

  async fn admin_users(&self) -> Result<Vec<UserSummary>, ApiError> {
    let users: Vec<ApiUser> = self.get_list("admin/users").await?;
    Ok(users.into_iter().map(ApiUser::into_summary).collect())
  }
}
