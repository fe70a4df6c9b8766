//! Authenticated JSON gateway to a Fineract tenant.
//!
//! # Design
//! `RequestHandler` keeps the build/parse split: `build_request` produces an
//! `HttpRequest` with tenant and auth headers, `parse_response` turns an
//! `HttpResponse` into decoded JSON or an `ApiError`. `make_request` glues the
//! two around a `Transport`. Entities hold the handler through an `Arc` and
//! only ever call `make_request`.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::FineractConfig;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};

pub const TENANT_HEADER: &str = "Fineract-Platform-TenantId";

pub struct RequestHandler {
    config: FineractConfig,
    authorization: String,
    transport: Box<dyn Transport>,
}

impl RequestHandler {
    pub fn new(config: FineractConfig, transport: impl Transport + 'static) -> Self {
        let credentials = format!("{}:{}", config.username, config.password);
        Self {
            authorization: format!("Basic {}", STANDARD.encode(credentials)),
            config,
            transport: Box::new(transport),
        }
    }

    /// Handler talking to a live server over `ureq`.
    pub fn connect(config: FineractConfig) -> Self {
        let transport = UreqTransport::new(config.verify_tls);
        Self::new(config, transport)
    }

    pub fn config(&self) -> &FineractConfig {
        &self.config
    }

    /// Describe a call as an `HttpRequest` without executing it.
    ///
    /// `path` is relative to the configured base URL and may already carry a
    /// query string (`/clients/7?command=activate`); `params` are appended to
    /// it, form-encoded.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        params: &[(&str, String)],
    ) -> Result<HttpRequest> {
        let raw = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&raw).map_err(|e| ApiError::Config(format!("{raw}: {e}")))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }

        let mut headers = vec![
            (TENANT_HEADER.to_string(), self.config.tenant.clone()),
            ("authorization".to_string(), self.authorization.clone()),
            ("accept".to_string(), "application/json".to_string()),
        ];
        let body = match body {
            Some(value) => {
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(
                    serde_json::to_string(value)
                        .map_err(|e| ApiError::SerializationError(e.to_string()))?,
                )
            }
            None => None,
        };

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    /// Decode a response body, mapping non-success statuses to errors.
    ///
    /// An empty 2xx body decodes to `Value::Null`.
    pub fn parse_response(&self, response: HttpResponse) -> Result<Value> {
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn make_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        params: &[(&str, String)],
    ) -> Result<Value> {
        let request = self.build_request(method, path, body, params)?;
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(&request)?;
        debug!(status = response.status, "received response");
        self.parse_response(response)
    }

    pub fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value> {
        self.make_request(HttpMethod::Get, path, None, params)
    }

    pub fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.make_request(HttpMethod::Post, path, Some(body), &[])
    }

    pub fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.make_request(HttpMethod::Put, path, Some(body), &[])
    }

    pub fn delete(&self, path: &str) -> Result<Value> {
        self.make_request(HttpMethod::Delete, path, None, &[])
    }
}

impl fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHandler")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Any 2xx passes. 404 is `NotFound`; other statuses keep their body in
/// `HttpError`.
fn check_status(response: &HttpResponse) -> Result<()> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    warn!(status = response.status, "request failed");
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::stub::{stub_handler, StubReply};

    fn handler() -> RequestHandler {
        RequestHandler::connect(FineractConfig::new("http://localhost:3000/api/v1"))
    }

    #[test]
    fn build_get_request_appends_params() {
        let req = handler()
            .build_request(
                HttpMethod::Get,
                "/loans",
                None,
                &[("sqlSearch", "l.client_id=7".to_string())],
            )
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        let url = Url::parse(&req.url).unwrap();
        assert_eq!(url.path(), "/api/v1/loans");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("sqlSearch".to_string(), "l.client_id=7".to_string())]);
        assert!(req.body.is_none());
        assert!(req.header("content-type").is_none());
    }

    #[test]
    fn build_request_keeps_command_in_path() {
        let req = handler()
            .build_request(HttpMethod::Post, "/clients/7?command=activate", Some(&json!({})), &[])
            .unwrap();
        assert_eq!(req.url, "http://localhost:3000/api/v1/clients/7?command=activate");
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some("{}"));
    }

    #[test]
    fn build_request_sets_tenant_and_basic_auth() {
        let req = handler().build_request(HttpMethod::Get, "clients", None, &[]).unwrap();
        assert_eq!(req.header(TENANT_HEADER), Some("default"));
        // mifos:password
        assert_eq!(req.header("Authorization"), Some("Basic bWlmb3M6cGFzc3dvcmQ="));
        assert_eq!(req.url, "http://localhost:3000/api/v1/clients");
    }

    #[test]
    fn parse_response_not_found() {
        let response = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: String::new(),
        };
        let err = handler().parse_response(response).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_response_server_error_keeps_body() {
        let response = HttpResponse {
            status: 403,
            headers: Vec::new(),
            body: "forbidden".to_string(),
        };
        let err = handler().parse_response(response).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 403, ref body } if body == "forbidden"));
    }

    #[test]
    fn parse_response_empty_body_is_null() {
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: String::new(),
        };
        assert_eq!(handler().parse_response(response).unwrap(), Value::Null);
    }

    #[test]
    fn parse_response_bad_json() {
        let response = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: "not json".to_string(),
        };
        let err = handler().parse_response(response).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn make_request_goes_through_transport() {
        let (handler, recorded) = stub_handler(vec![StubReply::ok(json!({"id": 1}))]);
        let value = handler.get("/clients/1", &[]).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded.last().url, "http://localhost:3000/clients/1");
    }

    #[test]
    fn make_request_surfaces_transport_errors() {
        let (handler, _) = stub_handler(vec![]);
        let err = handler.get("/clients/1", &[]).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
