//! Betfair HTTP Client - Session-authenticated REST API Client
//!
//! Wraps reqwest with concurrency limiting, SSO login and the two headers
//! every betting call carries: `X-Application` (app key) and
//! `X-Authentication` (session token). Tokens are renewed lazily through
//! [`SessionManager`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, Identity};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::session::SessionManager;
use super::types::{
  ApiErrorBody, CertLoginResponse, EventTypeResult, ListEventTypesRequest,
  ListMarketBookRequest, ListMarketCatalogueRequest, LoginResponse, MarketBook,
  MarketCatalogue,
};
use crate::config::BetfairConfig;
use crate::ports::{ClientError, ClientResult};

/// Error codes meaning the session token is no longer accepted.
const SESSION_ERROR_CODES: [&str; 3] =
  ["INVALID_SESSION_INFORMATION", "NO_SESSION", "INVALID_SESSION"];

/// Configuration for the exchange HTTP client.
#[derive(Debug, Clone)]
pub struct BetfairApiConfig {
  /// Betting REST root.
  pub base_url: String,
  /// Interactive login root.
  pub sso_url: String,
  /// Certificate login root.
  pub cert_sso_url: String,
  pub app_key: String,
  pub username: String,
  pub password: String,
  /// PEM certificate and key paths for certificate login.
  pub cert_identity: Option<(String, String)>,
  /// Request timeout.
  pub timeout: Duration,
  /// Session token validity window.
  pub session_ttl: Duration,
  /// Maximum concurrent requests.
  pub max_concurrent: usize,
}

impl From<&BetfairConfig> for BetfairApiConfig {
  fn from(config: &BetfairConfig) -> Self {
    Self {
      base_url: config.base_url.trim_end_matches('/').to_string(),
      sso_url: config.sso_url.trim_end_matches('/').to_string(),
      cert_sso_url: config.cert_sso_url.trim_end_matches('/').to_string(),
      app_key: config.app_key.clone(),
      username: config.username.clone(),
      password: config.password.clone(),
      cert_identity: config
        .cert_identity_paths()
        .map(|(cert, key)| (cert.to_string(), key.to_string())),
      timeout: Duration::from_secs(config.timeout_seconds),
      session_ttl: Duration::from_secs(config.session_ttl_minutes * 60),
      max_concurrent: 5,
    }
  }
}

/// Session-authenticated HTTP client for the exchange betting API.
pub struct BetfairApi {
  /// Underlying HTTP client.
  http: Client,
  /// Client configuration.
  config: BetfairApiConfig,
  /// Shared session token.
  session: SessionManager,
  /// Concurrency limiter.
  semaphore: Arc<Semaphore>,
}

impl BetfairApi {
  /// Create a new exchange client. No network traffic happens here.
  pub fn new(config: BetfairApiConfig) -> ClientResult<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(5)
      .build()?;

    Ok(Self {
      http,
      session: SessionManager::new(config.session_ttl),
      semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
      config,
    })
  }

  /// Current session token, logging in first when needed.
  pub async fn session_token(&self) -> ClientResult<String> {
    self.session.token(|| self.login()).await
  }

  /// `listMarketCatalogue`
  pub async fn list_market_catalogue(
    &self,
    request: &ListMarketCatalogueRequest,
  ) -> ClientResult<Vec<MarketCatalogue>> {
    self.post("listMarketCatalogue", request).await
  }

  /// `listMarketBook`
  pub async fn list_market_book(
    &self,
    request: &ListMarketBookRequest,
  ) -> ClientResult<Vec<MarketBook>> {
    self.post("listMarketBook", request).await
  }

  /// `listEventTypes` (category listing).
  pub async fn list_event_types(&self) -> ClientResult<Vec<EventTypeResult>> {
    self.post("listEventTypes", &ListEventTypesRequest::default()).await
  }

  /// POST a betting operation with app key and session headers.
  async fn post<Req, Resp>(&self, operation: &str, body: &Req) -> ClientResult<Resp>
  where
    Req: Serialize + Sync,
    Resp: DeserializeOwned + Send,
  {
    let token = self.session_token().await?;
    let url = format!("{}/{operation}/", self.config.base_url);

    let _permit = self
      .semaphore
      .acquire()
      .await
      .map_err(|_| ClientError::Malformed("request limiter closed".to_string()))?;

    let response = self
      .http
      .post(&url)
      .header("X-Application", &self.config.app_key)
      .header("X-Authentication", &token)
      .header(ACCEPT, "application/json")
      .json(body)
      .send()
      .await?;

    let status = response.status();
    if status.is_success() {
      debug!(operation, status = status.as_u16(), "Exchange call succeeded");
      return decode_body(&response.text().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let err = classify_api_error(status.as_u16(), &text);
    if matches!(err, ClientError::Auth(_)) {
      warn!(operation, "Session rejected, dropping cached token");
      self.session.invalidate().await;
    }
    Err(err)
  }

  /// Log in, preferring certificate login when a client identity is configured.
  async fn login(&self) -> ClientResult<String> {
    match &self.config.cert_identity {
      Some((cert, key)) => self.cert_login(cert, key).await,
      None => self.interactive_login().await,
    }
  }

  async fn cert_login(&self, cert_path: &str, key_path: &str) -> ClientResult<String> {
    let identity = load_identity(cert_path, key_path).await?;
    let client = Client::builder()
      .timeout(self.config.timeout)
      .identity(identity)
      .build()?;

    let response = client
      .post(format!("{}/api/certlogin", self.config.cert_sso_url))
      .header("X-Application", &self.config.app_key)
      .form(&[
        ("username", self.config.username.as_str()),
        ("password", self.config.password.as_str()),
      ])
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(ClientError::Auth(format!("certificate login returned HTTP {status}")));
    }

    let body: CertLoginResponse = decode_body(&response.text().await?)?;
    match body.session_token {
      Some(token) if body.login_status == "SUCCESS" => Ok(token),
      _ => Err(ClientError::Auth(body.login_status)),
    }
  }

  async fn interactive_login(&self) -> ClientResult<String> {
    let response = self
      .http
      .post(format!("{}/api/login", self.config.sso_url))
      .header("X-Application", &self.config.app_key)
      .header(ACCEPT, "application/json")
      .form(&[
        ("username", self.config.username.as_str()),
        ("password", self.config.password.as_str()),
      ])
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(ClientError::Auth(format!("login returned HTTP {status}")));
    }

    let body: LoginResponse = decode_body(&response.text().await?)?;
    match body.token {
      Some(token) if body.status == "SUCCESS" && !token.is_empty() => Ok(token),
      _ => Err(ClientError::Auth(
        body.error.filter(|e| !e.is_empty()).unwrap_or(body.status),
      )),
    }
  }
}

/// Read a PEM certificate and key into one client identity.
async fn load_identity(cert_path: &str, key_path: &str) -> ClientResult<Identity> {
  let read = |path: &str| {
    let path = path.to_string();
    async move {
      tokio::fs::read(&path)
        .await
        .map_err(|e| ClientError::Auth(format!("cannot read {path}: {e}")))
    }
  };

  let mut pem = read(cert_path).await?;
  pem.push(b'\n');
  pem.extend(read(key_path).await?);

  Identity::from_pem(&pem)
    .map_err(|e| ClientError::Auth(format!("invalid client certificate: {e}")))
}

/// Decode a successful response body. A shape mismatch is `Malformed`.
fn decode_body<T: DeserializeOwned>(text: &str) -> ClientResult<T> {
  Ok(serde_json::from_str(text)?)
}

/// Turn a rejected betting call into the matching error category.
pub fn classify_api_error(status: u16, body: &str) -> ClientError {
  let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
  match parsed.error_code() {
    Some(code) if SESSION_ERROR_CODES.contains(&code) => {
      ClientError::Auth(format!("session rejected ({code})"))
    }
    Some("INVALID_APP_KEY") => ClientError::Api {
      status,
      message: "INVALID_APP_KEY: application key not activated or invalid".to_string(),
    },
    Some(code) => ClientError::Api { status, message: code.to_string() },
    None => ClientError::Api {
      status,
      message: if body.trim().is_empty() {
        "empty response body".to_string()
      } else {
        body.trim().to_string()
      },
    },
  }
}
