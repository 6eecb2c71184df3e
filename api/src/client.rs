use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::wire::{Envelope, ErrorBody};
use log::{debug, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const API_PREFIX: &str = "/api";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_reqwest().as_str())
    }
}

/// League REST API client.
///
/// Cheap to clone: clones share the connection pool. Use [`ApiClient::scoped`]
/// to tie a clone's requests to the lifetime of a view.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
    cancel: Option<CancellationToken>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .user_agent(concat!("bodega-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_owned(),
            token: config.api_token.clone(),
            timeout: config.request_timeout,
            cancel: None,
        }
    }

    /// Client against an explicit base URL with no default token.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let config = Config {
            api_base_url: base_url.into(),
            api_token: None,
            ..Config::development()
        };
        Self::new(&config)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// A clone whose requests are abandoned once `token` is cancelled.
    pub fn scoped(&self, token: CancellationToken) -> Self {
        Self {
            cancel: Some(token),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: Option<&str>,
    ) -> ApiResult<Envelope<T>> {
        self.request::<T, ()>(Method::Get, endpoint, None, token).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        token: Option<&str>,
    ) -> ApiResult<Envelope<T>> {
        self.request(Method::Post, endpoint, Some(body), token).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        token: Option<&str>,
    ) -> ApiResult<Envelope<T>> {
        self.request(Method::Put, endpoint, Some(body), token).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: Option<&str>,
    ) -> ApiResult<Envelope<T>> {
        self.request::<T, ()>(Method::Delete, endpoint, None, token).await
    }

    /// Resolve `endpoint` (path plus optional query string) against `<base>/api`.
    pub fn url_for(&self, endpoint: &str) -> ApiResult<Url> {
        let raw = format!("{}{API_PREFIX}{endpoint}", self.base_url);
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })
    }

    /// Send one request and unwrap the envelope.
    ///
    /// Non-2xx and `"error"` envelopes become [`ApiError::Request`]; failures
    /// before a response arrives become [`ApiError::Transport`].
    pub async fn request<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> ApiResult<Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url_for(endpoint)?;
        let url_str = url.to_string();

        let mut builder = self
            .client
            .request(method.as_reqwest(), url)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(bearer) = token.or(self.token.as_deref()) {
            builder = builder.header(AUTHORIZATION, format!("Bearer {bearer}"));
        }

        if let Some(body) = body
            && matches!(method, Method::Post | Method::Put)
        {
            let payload = serde_json::to_vec(body).map_err(|source| ApiError::Encode {
                url: url_str.clone(),
                source,
            })?;
            builder = builder.body(payload);
        }

        debug!("{method} {url_str}");

        let exchange = async {
            let response = builder.send().await.map_err(|source| ApiError::Transport {
                url: url_str.clone(),
                source,
            })?;
            let status = response.status();
            let bytes = response.bytes().await.map_err(|source| ApiError::Transport {
                url: url_str.clone(),
                source,
            })?;
            Ok::<_, ApiError>((status, bytes))
        };

        let (status, bytes) = self.cancellable(&url_str, exchange).await?;
        let result = decode_envelope::<T>(&url_str, status, &bytes);
        if let Err(e) = &result {
            warn!("{method} {url_str} failed: {e}");
        }
        result
    }

    /// Race `fut` against this client's cancellation token, if any.
    pub(crate) async fn cancellable<F, R>(&self, url: &str, fut: F) -> ApiResult<R>
    where
        F: Future<Output = ApiResult<R>>,
    {
        race_cancel(self.cancel.as_ref(), url, fut).await
    }
}

/// Resolve `fut`, or [`ApiError::Cancelled`] as soon as `cancel` fires.
pub(crate) async fn race_cancel<F, R>(
    cancel: Option<&CancellationToken>,
    url: &str,
    fut: F,
) -> ApiResult<R>
where
    F: Future<Output = ApiResult<R>>,
{
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("cancelled {url}");
                Err(ApiError::Cancelled { url: url.to_owned() })
            }
            result = fut => result,
        },
        None => fut.await,
    }
}

pub(crate) fn decode_envelope<T: DeserializeOwned>(
    url: &str,
    status: StatusCode,
    bytes: &[u8],
) -> ApiResult<Envelope<T>> {
    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(bytes)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| format!("HTTP error: {}", status.as_u16()));
        return Err(ApiError::Request {
            url: url.to_owned(),
            status,
            message,
        });
    }

    let envelope: Envelope<T> =
        serde_json::from_slice(bytes).map_err(|source| ApiError::Decode {
            url: url.to_owned(),
            source,
        })?;

    if !envelope.is_success() {
        return Err(ApiError::Request {
            url: url.to_owned(),
            status,
            message: envelope
                .failure_message()
                .unwrap_or_else(|| "request failed".to_owned()),
        });
    }

    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[test]
    fn url_for_appends_api_prefix() {
        let client = ApiClient::with_base_url("http://localhost:8000/");
        assert_eq!(
            client.url_for("/players?limit=5").unwrap().as_str(),
            "http://localhost:8000/api/players?limit=5"
        );
    }

    #[test]
    fn url_for_rejects_garbage_base() {
        let client = ApiClient::with_base_url("not a url");
        assert!(matches!(
            client.url_for("/health"),
            Err(ApiError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn non_success_status_uses_envelope_message() {
        let body = br#"{"status":"error","message":"not found"}"#;
        let err = decode_envelope::<()>("u", StatusCode::NOT_FOUND, body).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "not found");
    }

    #[test]
    fn non_success_status_without_message_is_generic() {
        let err = decode_envelope::<()>("u", StatusCode::BAD_GATEWAY, b"<html>").unwrap_err();
        assert_eq!(err.to_string(), "HTTP error: 502");
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn error_envelope_on_2xx_is_a_request_error() {
        let body = br#"{"status":"error","message":"query failed"}"#;
        let err = decode_envelope::<()>("u", StatusCode::OK, body).unwrap_err();
        assert!(err.is_request());
        assert_eq!(err.to_string(), "query failed");
    }

    #[test]
    fn undecodable_success_body_is_a_decode_error() {
        let err = decode_envelope::<Vec<u32>>("u", StatusCode::OK, b"not json").unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn get_sends_json_content_type_and_bearer() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/health")
            .match_header("content-type", "application/json")
            .match_header("authorization", "Bearer t0ken")
            .with_status(200)
            .with_body(r#"{"status":"success","message":"ok","data":{"status":"ok","timestamp":"now"}}"#)
            .create_async()
            .await;

        let client = ApiClient::with_base_url(server.url());
        let env = client
            .get::<serde_json::Value>("/health", Some("t0ken"))
            .await
            .unwrap();
        assert_eq!(env.data.unwrap()["status"], "ok");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn default_token_applies_when_none_given() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/events/e1")
            .match_header("authorization", "Bearer from-config")
            .with_status(200)
            .with_body(r#"{"status":"success","message":"deleted"}"#)
            .create_async()
            .await;

        let client = ApiClient::with_base_url(server.url()).with_token("from-config");
        let env = client.delete::<()>("/events/e1", None).await.unwrap();
        assert_eq!(env.message, "deleted");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn post_and_put_serialize_the_body() {
        let mut server = Server::new_async().await;
        let post = server
            .mock("POST", "/api/events")
            .match_body(Matcher::Json(json!({"name": "Winter Cup"})))
            .with_status(201)
            .with_body(r#"{"status":"success","message":"created","data":{"id":"e9"}}"#)
            .create_async()
            .await;
        let put = server
            .mock("PUT", "/api/events/e9")
            .match_body(Matcher::Json(json!({"name": "Winter Cup II"})))
            .with_status(200)
            .with_body(r#"{"status":"success","message":"updated"}"#)
            .create_async()
            .await;

        let client = ApiClient::with_base_url(server.url());
        let created = client
            .post::<serde_json::Value, _>("/events", &json!({"name": "Winter Cup"}), None)
            .await
            .unwrap();
        assert_eq!(created.data.unwrap()["id"], "e9");
        client
            .put::<serde_json::Value, _>("/events/e9", &json!({"name": "Winter Cup II"}), None)
            .await
            .unwrap();
        post.assert_async().await;
        put.assert_async().await;
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("no wire form"))
        }
    }

    #[tokio::test]
    async fn body_that_fails_to_serialize_is_an_encode_error() {
        let client = ApiClient::with_base_url("http://127.0.0.1:9");
        let err = client
            .post::<(), _>("/events", &Unserializable, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Encode);
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        // Port 9 (discard) is not served on loopback in CI.
        let client = ApiClient::with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2));
        let err = client.get::<()>("/health", None).await.unwrap_err();
        assert!(err.is_transport(), "expected transport error, got {err:?}");
    }

    #[tokio::test]
    async fn cancelled_scope_abandons_the_request() {
        let server = Server::new_async().await;
        let token = CancellationToken::new();
        token.cancel();

        let client = ApiClient::with_base_url(server.url()).scoped(token);
        let err = client.get::<()>("/health", None).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    async fn slow_health(server: &mut mockito::ServerGuard) -> mockito::Mock {
        server
            .mock("GET", "/api/health")
            .with_status(200)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_millis(1000));
                w.write_all(br#"{"status":"success","message":"ok"}"#)
            })
            .create_async()
            .await
    }

    #[tokio::test]
    async fn slow_response_past_the_timeout_is_a_transport_error() {
        let mut server = Server::new_async().await;
        let mock = slow_health(&mut server).await;

        let client = ApiClient::with_base_url(server.url()).with_timeout(Duration::from_millis(200));
        let err = client.get::<()>("/health", None).await.unwrap_err();
        assert!(err.is_transport(), "expected transport error, got {err:?}");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn cancelling_mid_flight_abandons_the_request() {
        let mut server = Server::new_async().await;
        let mock = slow_health(&mut server).await;

        let token = CancellationToken::new();
        let client = ApiClient::with_base_url(server.url()).scoped(token.clone());
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            token.cancel();
        });

        let err = client.get::<()>("/health", None).await.unwrap_err();
        assert!(err.is_cancelled(), "expected cancellation, got {err:?}");
        mock.assert_async().await;
    }
}
