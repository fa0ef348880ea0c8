//! HTTP client for the local backend

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use deskhost_core::prelude::*;

/// Where the backend listens unless configured otherwise
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

pub const HELLO_PATH: &str = "/api/hello";
pub const USER_PATH: &str = "/api/user";
pub const SHUTDOWN_PATH: &str = "/shutdown";

/// Asks the backend to shut itself down.
///
/// Best effort: an error only means the request could not be delivered.
#[trait_variant::make(ShutdownRequest: Send)]
pub trait LocalShutdownRequest {
    async fn request_shutdown(&self) -> Result<()>;
}

/// `GET /api/hello` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hello {
    pub msg: String,
}

/// `POST /api/user` payload, echoed back by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
    pub salary: f64,
    #[serde(default)]
    pub tax: Option<f64>,
}

/// `POST /shutdown` response body, when the backend sends one
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShutdownStatus {
    pub status: String,
}

/// Client for the backend's local HTTP API
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
}

impl BackendClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| Error::invalid_url(base_url, e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(http_error)?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Error::invalid_url(format!("{}{}", self.base, path), e.to_string()))
    }

    /// `GET /api/hello`
    pub async fn hello(&self) -> Result<Hello> {
        let url = self.endpoint(HELLO_PATH)?;
        trace!("GET {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(http_error)?;
        response.json::<Hello>().await.map_err(http_error)
    }

    /// `POST /api/user`
    pub async fn create_user(&self, user: &User) -> Result<User> {
        let url = self.endpoint(USER_PATH)?;
        debug!("POST {} ({})", url, user.name);
        let response = self
            .http
            .post(url)
            .json(user)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(http_error)?;
        response.json::<User>().await.map_err(http_error)
    }
}

impl ShutdownRequest for BackendClient {
    async fn request_shutdown(&self) -> Result<()> {
        let url = self.endpoint(SHUTDOWN_PATH)?;
        info!("Requesting graceful shutdown: POST {}", url);

        let response = self.http.post(url).send().await.map_err(http_error)?;
        let status = response.status();
        if !status.is_success() {
            warn!("Shutdown endpoint answered {}", status);
            return Ok(());
        }

        match response.json::<ShutdownStatus>().await {
            Ok(body) => debug!("Backend shutdown status: {}", body.status),
            Err(e) => trace!("Shutdown response had no status body: {}", e),
        }
        Ok(())
    }
}

fn http_error(e: reqwest::Error) -> Error {
    Error::http(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::serve_once;

    fn client(base: &str) -> BackendClient {
        BackendClient::new(base, Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_invalid_base_url() {
        let result = BackendClient::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(Error::InvalidUrl { .. })));
    }

    #[test]
    fn test_endpoints_join_base() {
        let client = client(DEFAULT_BASE_URL);
        assert_eq!(
            client.endpoint(SHUTDOWN_PATH).unwrap().as_str(),
            "http://127.0.0.1:5000/shutdown"
        );
        assert_eq!(
            client.endpoint(HELLO_PATH).unwrap().as_str(),
            "http://127.0.0.1:5000/api/hello"
        );
    }

    #[test]
    fn test_user_optional_fields_default() {
        let user: User = serde_json::from_str(r#"{"name":"Ada","salary":1200.5}"#).unwrap();
        assert_eq!(user.job, None);
        assert_eq!(user.tax, None);
        assert_eq!(user.salary, 1200.5);
    }

    #[tokio::test]
    async fn test_hello_parses_message() {
        let (base, request) = serve_once(200, r#"{"msg":"Hello from Python backend!"}"#).await;

        let hello = client(&base).hello().await.unwrap();

        assert_eq!(hello.msg, "Hello from Python backend!");
        assert!(request.await.unwrap().starts_with("GET /api/hello"));
    }

    #[tokio::test]
    async fn test_create_user_round_trips_payload() {
        let body = r#"{"name":"Ada","job":"engineer","salary":100.0,"tax":null}"#;
        let (base, request) = serve_once(200, body).await;

        let user = User {
            name: "Ada".to_string(),
            job: Some("engineer".to_string()),
            salary: 100.0,
            tax: None,
        };
        let echoed = client(&base).create_user(&user).await.unwrap();

        assert_eq!(echoed, user);
        let request = request.await.unwrap();
        assert!(request.starts_with("POST /api/user"));
        assert!(request.contains(r#""name":"Ada""#));
    }

    #[tokio::test]
    async fn test_hello_server_error() {
        let (base, _request) = serve_once(500, "{}").await;
        let result = client(&base).hello().await;
        assert!(matches!(result, Err(Error::Http { .. })));
    }

    #[tokio::test]
    async fn test_shutdown_request_posts() {
        let (base, request) = serve_once(200, r#"{"status":"stopping"}"#).await;

        ShutdownRequest::request_shutdown(&client(&base))
            .await
            .unwrap();

        assert!(request.await.unwrap().starts_with("POST /shutdown"));
    }

    #[tokio::test]
    async fn test_shutdown_non_success_status_is_not_an_error() {
        let (base, _request) = serve_once(404, r#"{"detail":"Not Found"}"#).await;
        let result = ShutdownRequest::request_shutdown(&client(&base)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_unreachable_backend() {
        // Port 1 is never served in the test environment
        let result = ShutdownRequest::request_shutdown(&client("http://127.0.0.1:1")).await;
        assert!(matches!(result, Err(Error::Http { .. })));
    }
}
