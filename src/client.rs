//! Depined API client.
//!
//! Wraps a single [`wreq::Client`] that emulates Chrome's TLS and HTTP/2
//! fingerprint, and sends a static, browser-like header set with every
//! request. The user agent is drawn once when the client is built and reused
//! for every request made by this process.

use std::time::Instant;

use rand::seq::SliceRandom;
use serde::Serialize;
use wreq::header::{self, HeaderMap, HeaderValue};
use wreq::{Method, StatusCode};
use wreq_util::Emulation;

use crate::config::Settings;
use crate::credential::Token;
use crate::error::{AgentError, Result};

/// Browser User-Agent strings; one is picked per process.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Linux; Android 10; K) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Mobile Safari/537.36",
];

const ACCEPT: &str = "application/json, text/plain, */*";
const REFERER: &str = "https://api.depined.org/";
const ORIGIN: &str = "https://api.depined.org";

/// Body of every connectivity ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectPayload {
    connected: bool,
}

impl ConnectPayload {
    /// The only payload the agent ever sends: `{"connected": true}`.
    pub const CONNECTED: Self = Self { connected: true };
}

/// Status and raw body of an API response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub text: String,
}

impl ApiResponse {
    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::MalformedResponse`] carrying the raw body when it
    /// is not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        serde_json::from_str(&self.text).map_err(|e| AgentError::MalformedResponse {
            body: self.text.clone(),
            reason: e.to_string(),
        })
    }
}

/// Select a random User-Agent string from [`USER_AGENTS`].
pub fn random_user_agent() -> &'static str {
    let mut rng = rand::thread_rng();
    USER_AGENTS
        .choose(&mut rng)
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// HTTP adapter for the Depined API.
pub struct DepinedClient {
    client: wreq::Client,
    headers: HeaderMap,
    settings: Settings,
    user_agent: &'static str,
}

impl DepinedClient {
    /// Builds a client authenticated with `token`.
    ///
    /// The transport presents a Chrome fingerprint. The header set is fixed
    /// here: JSON content type, bearer authorization, a randomly chosen
    /// browser user agent and the usual `Accept`, `Referer`, `Origin`, `DNT`
    /// and `Connection` headers. These replace the emulation profile's own
    /// defaults on every request. No request timeout is configured.
    ///
    /// # Errors
    ///
    /// - [`AgentError::InvalidCredential`] if the token is not a valid header value
    /// - [`AgentError::Client`] if the underlying client cannot be built
    pub fn new(token: &Token, settings: Settings) -> Result<Self> {
        let user_agent = random_user_agent();
        let headers = default_headers(token, user_agent)?;

        let client = wreq::Client::builder()
            .emulation(Emulation::Chrome143)
            .gzip(true)
            .brotli(true)
            .zstd(true)
            .build()
            .map_err(|e| AgentError::Client(format!("failed to build HTTP client: {e}")))?;

        log::debug!("HTTP client ready user_agent={}", user_agent);

        Ok(Self {
            client,
            headers,
            settings,
            user_agent,
        })
    }

    /// The user agent chosen for this process.
    pub fn user_agent(&self) -> &'static str {
        self.user_agent
    }

    /// Posts a connectivity ping.
    pub async fn widget_connect(&self, payload: &ConnectPayload) -> Result<ApiResponse> {
        let url = self.settings.widget_connect_url();
        self.request(Method::POST, &url, Some(payload)).await
    }

    /// Fetches the current epoch earnings.
    pub async fn epoch_earnings(&self) -> Result<ApiResponse> {
        let url = self.settings.epoch_earnings_url();
        self.request::<()>(Method::GET, &url, None).await
    }

    /// Sends a request with the static header set and reads the full body.
    ///
    /// Any status is returned as-is; only network and body read failures
    /// become [`AgentError::Transport`].
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse> {
        let start = Instant::now();
        let mut builder = self
            .client
            .request(method.clone(), url)
            .headers(self.headers.clone());
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            log::debug!("Request failed method={} url={}: {}", method, url, e);
            AgentError::Transport(e)
        })?;

        let status = response.status();
        let text = response.text().await?;

        log::debug!(
            "Request completed method={} url={} status={} duration_ms={}",
            method,
            url,
            status.as_u16(),
            start.elapsed().as_millis()
        );

        Ok(ApiResponse { status, text })
    }
}

fn default_headers(token: &Token, user_agent: &'static str) -> Result<HeaderMap> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
        .map_err(|e| AgentError::InvalidCredential(format!("token is not a valid header value: {e}")))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::AUTHORIZATION, auth);
    headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
    headers.insert(header::USER_AGENT, HeaderValue::from_static(user_agent));
    headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
    headers.insert(header::REFERER, HeaderValue::from_static(REFERER));
    headers.insert(header::ORIGIN, HeaderValue::from_static(ORIGIN));
    headers.insert(header::DNT, HeaderValue::from_static("1"));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> DepinedClient {
        let token = Token::parse("test-token").unwrap();
        let settings = Settings {
            api_base: server.uri(),
            ..Default::default()
        };
        DepinedClient::new(&token, settings).unwrap()
    }

    #[test]
    fn payload_serializes_to_connected_true() {
        let value = serde_json::to_value(ConnectPayload::CONNECTED).unwrap();
        assert_eq!(value, json!({"connected": true}));
    }

    #[test]
    fn random_user_agent_comes_from_pool() {
        for _ in 0..20 {
            assert!(USER_AGENTS.contains(&random_user_agent()));
        }
        assert_eq!(USER_AGENTS.len(), 3);
    }

    #[test]
    fn token_with_newline_is_invalid_credential() {
        let token = Token::parse("abc\ndef").unwrap();
        let err = DepinedClient::new(&token, Settings::default()).err().unwrap();
        assert!(matches!(err, AgentError::InvalidCredential(_)));
    }

    #[test]
    fn default_headers_are_complete() {
        let token = Token::parse("abc").unwrap();
        let headers = default_headers(&token, USER_AGENTS[1]).unwrap();
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers[header::AUTHORIZATION], "Bearer abc");
        assert!(headers[header::AUTHORIZATION].is_sensitive());
        assert_eq!(headers[header::USER_AGENT], USER_AGENTS[1]);
        assert_eq!(headers[header::ACCEPT], ACCEPT);
        assert_eq!(headers[header::REFERER], REFERER);
        assert_eq!(headers[header::ORIGIN], ORIGIN);
        assert_eq!(headers[header::DNT], "1");
        assert_eq!(headers[header::CONNECTION], "keep-alive");
        assert_eq!(headers["x-requested-with"], "XMLHttpRequest");
    }

    #[tokio::test]
    async fn widget_connect_posts_payload_with_headers() {
        let server = MockServer::start().await;
        let client = test_client(&server);

        Mock::given(method("POST"))
            .and(path("/api/user/widget-connect"))
            .and(header_eq("authorization", "Bearer test-token"))
            .and(header_eq("content-type", "application/json"))
            .and(body_json(json!({"connected": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let response = client
            .widget_connect(&ConnectPayload::CONNECTED)
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json().unwrap(), json!({"ok": true}));
    }

    #[tokio::test]
    async fn user_agent_is_stable_across_requests() {
        let server = MockServer::start().await;
        let client = test_client(&server);

        Mock::given(method("GET"))
            .and(path("/api/stats/epoch-earnings"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(3)
            .mount(&server)
            .await;

        for _ in 0..3 {
            client.epoch_earnings().await.unwrap();
        }

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
        for request in requests {
            let ua = request.headers.get("user-agent").unwrap();
            assert_eq!(ua.to_str().unwrap(), client.user_agent());
        }
    }

    #[tokio::test]
    async fn static_headers_replace_emulation_defaults() {
        let server = MockServer::start().await;
        let client = test_client(&server);

        Mock::given(method("GET"))
            .and(path("/api/stats/epoch-earnings"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        client.epoch_earnings().await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let headers = &requests[0].headers;
        let value = |name: &str| headers.get(name).unwrap().to_str().unwrap().to_string();
        assert!(USER_AGENTS.contains(&value("user-agent").as_str()));
        assert_eq!(value("accept"), ACCEPT);
        assert_eq!(value("referer"), REFERER);
        assert_eq!(value("origin"), ORIGIN);
        assert_eq!(value("dnt"), "1");
        assert_eq!(value("x-requested-with"), "XMLHttpRequest");
        assert_eq!(value("authorization"), "Bearer test-token");
    }

    #[tokio::test]
    async fn non_200_status_is_returned_not_raised() {
        let server = MockServer::start().await;
        let client = test_client(&server);

        Mock::given(method("GET"))
            .and(path("/api/stats/epoch-earnings"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let response = client.epoch_earnings().await.unwrap();
        assert_eq!(response.status, StatusCode::FORBIDDEN);
        assert_eq!(response.text, "forbidden");
    }

    #[test]
    fn json_on_html_body_is_malformed() {
        let response = ApiResponse {
            status: StatusCode::OK,
            text: "<html>challenge</html>".into(),
        };
        match response.json() {
            Err(AgentError::MalformedResponse { body, .. }) => {
                assert_eq!(body, "<html>challenge</html>")
            }
            other => panic!("expected malformed response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let token = Token::parse("t").unwrap();
        let settings = Settings {
            api_base: "http://127.0.0.1:1".into(),
            ..Default::default()
        };
        let client = DepinedClient::new(&token, settings).unwrap();
        let err = client.epoch_earnings().await.unwrap_err();
        assert!(matches!(err, AgentError::Transport(_)));
    }
}
