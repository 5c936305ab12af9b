use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::Client as ReqwestClient;
use tracing::debug;

use super::{Transport, TransportConfig, TransportError, TransportRequest, TransportResponse};

/// reqwest-backed transport with fixed headers and a default per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: ReqwestClient,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(config.default_headers())
            .build()
            .map_err(|err| TransportError::Builder(err.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(classify_error)?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_retry_after);
        debug!(method = %request.method, url = %request.url, %status, "received HTTP response");

        let body = response.text().await.map_err(classify_error)?;

        Ok(TransportResponse {
            status,
            retry_after,
            body,
        })
    }
}

fn classify_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else if err.is_body() || err.is_decode() {
        TransportError::Read(err.to_string())
    } else if err.is_builder() {
        TransportError::Request(err.to_string())
    } else if err.is_request() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Read(err.to_string())
    }
}

/// Only the delta-seconds form is honored; HTTP dates fall back to backoff.
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::net::TcpListener;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport() -> HttpTransport {
        HttpTransport::new(&TransportConfig::default()).expect("http transport")
    }

    #[test]
    fn parses_numeric_retry_after() {
        assert_eq!(parse_retry_after(" 3 "), Some(Duration::from_secs(3)));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[tokio::test]
    async fn sends_fixed_headers_and_raw_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(header("content-type", "application/json;charset=UTF-8"))
            .and(header("user-agent", "MnetSignupBot/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"success\":true}"))
            .expect(1)
            .mount(&server)
            .await;

        let request = TransportRequest::post_json(
            format!("{}/echo", server.uri()),
            &serde_json::json!({ "email": "a@example.com" }),
        )
        .expect("encodes");
        let response = transport().send(&request).await.expect("response");

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, "{\"success\":true}");

        let requests = server.received_requests().await.unwrap();
        let accept = requests[0]
            .headers
            .get("accept")
            .and_then(|value| value.to_str().ok());
        assert_eq!(accept, Some(crate::transport::ACCEPT_VALUE));
        assert_eq!(requests[0].body, br#"{"email":"a@example.com"}"#.to_vec());
    }

    #[tokio::test]
    async fn surfaces_error_statuses_without_failing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "2"))
            .mount(&server)
            .await;

        let response = transport()
            .send(&TransportRequest::get(server.uri()))
            .await
            .expect("response");

        assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.retry_after, Some(Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn explicit_timeout_overrides_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let request = TransportRequest::get(server.uri()).with_timeout(Duration::from_millis(50));
        let err = transport().send(&request).await.expect_err("times out");

        assert!(matches!(err, TransportError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn configured_timeout_applies_without_override() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(&TransportConfig {
            timeout: Duration::from_millis(50),
            ..TransportConfig::default()
        })
        .expect("http transport");
        let err = transport
            .send(&TransportRequest::get(server.uri()))
            .await
            .expect_err("times out");

        assert!(matches!(err, TransportError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn refused_connection_is_retryable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = transport()
            .send(&TransportRequest::get(format!("http://{addr}")))
            .await
            .expect_err("nothing is listening");

        assert!(err.is_retryable(), "got {err:?}");
    }
}
