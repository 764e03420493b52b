//! Blocking HTTP transport.

use std::time::Duration;

use airtab_core::{Error, Method, Transport, check_for_service_error};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use tracing::{debug, instrument, trace, warn};

use crate::config::Config;
use crate::error::ConfigError;
use crate::rate_limit::RateLimiter;

/// Performs table requests over HTTPS.
///
/// Every request carries the bearer API key, waits for the rate limiter and
/// is retried according to the configured [`RetryPolicy`](crate::RetryPolicy).
/// Responses are checked for the service's error envelope.
///
/// The transport is blocking; do not call it from inside an async runtime
/// without moving to a blocking thread first.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    config: Config,
    limiter: Option<RateLimiter>,
}

impl HttpTransport {
    /// Create a transport for `config`.
    ///
    /// # Errors
    ///
    /// Fails if the API key is not a valid header value or the HTTP client
    /// cannot be initialised.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key()))
            .map_err(|_| ConfigError::InvalidApiKey)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .user_agent(config.user_agent())
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        let limiter = config.rate_limit().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            limiter,
        })
    }

    /// Create a transport configured from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(Config::from_env()?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn send(&self, method: Method, url: &str, body: Option<&[u8]>) -> reqwest::Result<Response> {
        let mut request = self.client.request(http_method(method), url);
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_vec());
        }
        request.send()
    }
}

impl Transport for HttpTransport {
    #[instrument(skip(self, body), fields(base = %self.config.base_id()))]
    fn request(
        &self,
        method: Method,
        path: &str,
        query: &str,
        body: Option<&[u8]>,
    ) -> airtab_core::Result<Vec<u8>> {
        let url = self.config.endpoint(path, query);
        let retry = self.config.retry();
        let mut attempt = 0;

        loop {
            if let Some(limiter) = &self.limiter {
                limiter.wait();
            }

            debug!(%method, %url, attempt, "sending request");
            match self.send(method, &url, body) {
                Ok(response) => {
                    let status = response.status();
                    trace!(status = %status, "response");

                    if is_retryable_status(method, status) && attempt < retry.max_retries {
                        let delay = retry_after(&response)
                            .unwrap_or_else(|| retry.backoff(attempt))
                            .min(retry.max_backoff);
                        warn!(
                            status = status.as_u16(),
                            attempt = attempt + 1,
                            max = retry.max_retries,
                            ?delay,
                            "retrying request"
                        );
                        std::thread::sleep(delay);
                        attempt += 1;
                        continue;
                    }

                    let bytes = response
                        .bytes()
                        .map_err(|e| Error::request(method, path, e.to_string()))?;
                    return into_result(method, path, status, bytes.to_vec());
                }
                Err(e) if is_retryable_failure(method, &e) && attempt < retry.max_retries => {
                    let delay = retry.backoff(attempt);
                    warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max = retry.max_retries,
                        ?delay,
                        "request failed, retrying"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(Error::request(method, path, e.to_string())),
            }
        }
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Turn a final response into the body or a request error.
///
/// The error envelope wins over the status code: a 200 carrying
/// `{"error": ...}` is still an error.
fn into_result(
    method: Method,
    path: &str,
    status: StatusCode,
    bytes: Vec<u8>,
) -> airtab_core::Result<Vec<u8>> {
    if let Err(service) = check_for_service_error(&bytes) {
        let message = if status.is_success() {
            service.to_string()
        } else {
            format!("HTTP {}: {service}", status.as_u16())
        };
        return Err(Error::request(method, path, message));
    }
    if !status.is_success() {
        return Err(Error::request(
            method,
            path,
            format!("HTTP {}", status.as_u16()),
        ));
    }
    Ok(bytes)
}

/// Whether a response status is worth another attempt.
///
/// A create is not idempotent: after a server error it may already have
/// been committed, so only a rate-limit rejection is retried.
fn is_retryable_status(method: Method, status: StatusCode) -> bool {
    match method {
        Method::Post => status == StatusCode::TOO_MANY_REQUESTS,
        _ => status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error(),
    }
}

/// Whether a failed send is worth another attempt.
///
/// A connect error means the request never left; a timed out create may
/// have been committed.
fn is_retryable_failure(method: Method, err: &reqwest::Error) -> bool {
    err.is_connect() || (err.is_timeout() && method != Method::Post)
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(Method::Get, StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(Method::Get, StatusCode::BAD_GATEWAY));
        assert!(is_retryable_status(Method::Patch, StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable_status(Method::Delete, StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_retryable_status(Method::Get, StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(Method::Patch, StatusCode::UNPROCESSABLE_ENTITY));
    }

    #[test]
    fn creates_retry_only_rate_limits() {
        assert!(is_retryable_status(Method::Post, StatusCode::TOO_MANY_REQUESTS));
        assert!(!is_retryable_status(Method::Post, StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_retryable_status(Method::Post, StatusCode::SERVICE_UNAVAILABLE));
    }

    #[test]
    fn error_envelope_on_success_status() {
        let err = into_result(
            Method::Get,
            "Main",
            StatusCode::OK,
            br#"{"error":{"type":"NOT_FOUND","message":"Could not find table"}}"#.to_vec(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "client request error: GET Main: NOT_FOUND: Could not find table"
        );
    }

    #[test]
    fn error_status_with_envelope() {
        let err = into_result(
            Method::Patch,
            "Main/rec1",
            StatusCode::UNPROCESSABLE_ENTITY,
            br#"{"error":{"type":"INVALID_VALUE_FOR_COLUMN","message":"Field \"Rating\" cannot accept the provided value"}}"#.to_vec(),
        )
        .unwrap_err();
        assert!(err.to_string().starts_with(
            "client request error: PATCH Main/rec1: HTTP 422: INVALID_VALUE_FOR_COLUMN"
        ));
    }

    #[test]
    fn error_status_without_envelope() {
        let err = into_result(Method::Delete, "Main/rec1", StatusCode::FORBIDDEN, b"{}".to_vec())
            .unwrap_err();
        assert_eq!(err.to_string(), "client request error: DELETE Main/rec1: HTTP 403");
    }

    #[test]
    fn success_body_passes_through() {
        let body = br#"{"records":[]}"#.to_vec();
        assert_eq!(
            into_result(Method::Get, "Main", StatusCode::OK, body.clone()).unwrap(),
            body
        );
    }

    #[test]
    fn invalid_api_key_rejected() {
        let config = Config::builder("bad\nkey", "appABC").build().unwrap();
        assert_eq!(
            HttpTransport::new(config).unwrap_err(),
            ConfigError::InvalidApiKey
        );
    }
}
