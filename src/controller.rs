//! UniFi Controller API Client
//!
//! Logs in once and fetches the configured client list over the same
//! cookie-backed session. Single attempt per call, no retries.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Credentials;
use crate::error::ControllerError;
use crate::records::ClientRecord;

const LOGIN_PATH: &str = "/api/auth/login";
const CLIENTS_PATH: &str = "/proxy/network/api/s/default/rest/user";

/// How to reach the controller
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller IP or hostname
    pub address: String,
    /// Validate the controller's TLS certificate. UniFi appliances ship with
    /// self-signed certificates, so this is off unless asked for.
    pub verify_tls: bool,
    /// Replaces `https://{address}:443` when set
    pub base_url: Option<String>,
}

impl ControllerConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            verify_tls: false,
            base_url: None,
        }
    }

    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Point the client somewhere other than the standard HTTPS endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}:443", self.address),
        }
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Controller session
pub struct ControllerClient {
    client: Client,
    base_url: String,
}

impl ControllerClient {
    /// Build a client with its own cookie jar
    pub fn new(config: &ControllerConfig) -> Result<Self, ControllerError> {
        if !config.verify_tls {
            debug!("TLS certificate verification disabled for controller");
        }

        let client = Client::builder()
            .user_agent(concat!("unifi-pihole-sync/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(ControllerError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    /// Authenticate; the session cookie is kept for later calls
    pub async fn login(&self, credentials: &Credentials) -> Result<(), ControllerError> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        info!("Attempting to login to UniFi Controller...");

        let request = LoginRequest {
            username: &credentials.username,
            password: &credentials.password,
        };

        let body = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(ControllerError::Auth)?
            .text()
            .await
            .map_err(ControllerError::Auth)?;

        info!("Login successful");
        debug!("Login response: {}", body);
        Ok(())
    }

    /// Fetch every client record known to the default site
    pub async fn fetch_clients(&self) -> Result<Vec<ClientRecord>, ControllerError> {
        let url = format!("{}{}", self.base_url, CLIENTS_PATH);
        info!("Querying UniFi Controller for client data...");

        let data: Value = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(ControllerError::Query)?
            .json()
            .await
            .map_err(ControllerError::Query)?;

        info!("Query successful");
        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!(
                "Query response: {}",
                serde_json::to_string_pretty(&data).unwrap_or_default()
            );
        }

        let clients = parse_clients(&data);
        info!(count = clients.len(), "Number of clients returned");
        Ok(clients)
    }
}

/// Extract client records from the `data` array of a response body
///
/// A missing or non-array `data` gives an empty list. Elements that do not
/// look like client records are skipped.
pub fn parse_clients(body: &Value) -> Vec<ClientRecord> {
    let Some(items) = body.get("data").and_then(Value::as_array) else {
        warn!("Response has no data array");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match ClientRecord::deserialize(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Skipping malformed client record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    const SESSION_COOKIE: &str = "TOKEN=abc123";

    async fn login_ok(Json(body): Json<Value>) -> impl IntoResponse {
        if body["username"] == "admin" && body["password"] == "secret" {
            (
                StatusCode::OK,
                [(header::SET_COOKIE, format!("{}; Path=/", SESSION_COOKIE))],
                Json(json!({ "username": "admin" })),
            )
                .into_response()
        } else {
            StatusCode::UNAUTHORIZED.into_response()
        }
    }

    async fn clients_with_cookie(headers: HeaderMap) -> impl IntoResponse {
        let authed = headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains(SESSION_COOKIE))
            .unwrap_or(false);

        if !authed {
            return StatusCode::UNAUTHORIZED.into_response();
        }

        Json(json!({
            "meta": { "rc": "ok" },
            "data": [
                { "last_ip": "10.0.0.5", "name": "Living Room TV", "mac": "aa:bb:cc:00:00:01" },
                { "last_ip": "10.0.0.6", "hostname": "printer.local" }
            ]
        }))
        .into_response()
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: &str) -> ControllerClient {
        ControllerClient::new(&ControllerConfig::new("unused").with_base_url(base_url)).unwrap()
    }

    fn creds(password: &str) -> Credentials {
        Credentials {
            controller: "unused".to_string(),
            username: "admin".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_default_base_url() {
        let config = ControllerConfig::new("192.168.1.1");
        assert_eq!(config.base_url(), "https://192.168.1.1:443");
        assert!(!config.verify_tls);
    }

    #[test]
    fn test_parse_clients_tolerates_missing_data() {
        assert!(parse_clients(&json!({})).is_empty());
        assert!(parse_clients(&json!({ "data": "nope" })).is_empty());
        assert!(parse_clients(&json!([1, 2, 3])).is_empty());
    }

    #[test]
    fn test_parse_clients_skips_malformed_items() {
        let body = json!({
            "data": [
                { "last_ip": "10.0.0.1", "name": "a" },
                42,
                { "last_ip": "10.0.0.2", "name": null }
            ]
        });
        let clients = parse_clients(&body);

        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].name.as_deref(), Some("a"));
        assert_eq!(clients[1].name, None);
    }

    #[tokio::test]
    async fn test_login_then_fetch_shares_session() {
        let base = serve(
            Router::new()
                .route(LOGIN_PATH, post(login_ok))
                .route(CLIENTS_PATH, get(clients_with_cookie)),
        )
        .await;
        let client = client_for(&base);

        client.login(&creds("secret")).await.unwrap();
        let clients = client.fetch_clients().await.unwrap();

        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].last_ip.as_deref(), Some("10.0.0.5"));
        assert_eq!(clients[1].hostname.as_deref(), Some("printer.local"));
    }

    #[tokio::test]
    async fn test_rejected_login_is_auth_error() {
        let base = serve(Router::new().route(LOGIN_PATH, post(login_ok))).await;

        let err = client_for(&base).login(&creds("wrong")).await.unwrap_err();

        assert!(matches!(err, ControllerError::Auth(_)));
    }

    #[tokio::test]
    async fn test_fetch_without_login_is_query_error() {
        let base = serve(Router::new().route(CLIENTS_PATH, get(clients_with_cookie))).await;

        let err = client_for(&base).fetch_clients().await.unwrap_err();

        assert!(matches!(err, ControllerError::Query(_)));
    }

    #[tokio::test]
    async fn test_non_json_body_is_query_error() {
        let base = serve(Router::new().route(CLIENTS_PATH, get(|| async { "<html>oops</html>" }))).await;

        let err = client_for(&base).fetch_clients().await.unwrap_err();

        assert!(matches!(err, ControllerError::Query(_)));
    }

    #[tokio::test]
    async fn test_unreachable_controller_is_auth_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(&format!("http://{}", addr))
            .login(&creds("secret"))
            .await
            .unwrap_err();

        assert!(matches!(err, ControllerError::Auth(_)));
    }
}
