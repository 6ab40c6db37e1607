//! Blocking HTTPS invoker for the managed forecasting runtime.
//!
//! One user action triggers at most one in-flight call; the invocation blocks
//! the calling thread until the service responds or the HTTP client's default
//! timeout fires. Nothing is retried.

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

use crate::data::endpoint::EndpointTarget;
use crate::error::{AppError, ErrorKind};

pub const DEFAULT_REGION: &str = "eu-north-1";

/// How much of an error body to quote back to the user.
const BODY_SNIPPET_LEN: usize = 200;

/// Hosting region from the environment, without requiring credentials.
///
/// Used by read-only commands (like the endpoint listing) that never invoke.
pub fn region_from_env() -> String {
    dotenvy::dotenv().ok();
    std::env::var("STOCKCAST_REGION").unwrap_or_else(|_| DEFAULT_REGION.to_string())
}

/// Runtime credentials, read once at process start and treated as read-only
/// for the process lifetime.
#[derive(Debug, Clone)]
pub struct RuntimeCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

impl RuntimeCredentials {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let access_key_id = std::env::var("STOCKCAST_ACCESS_KEY_ID").map_err(|_| {
            AppError::new(
                ErrorKind::Config,
                "Missing STOCKCAST_ACCESS_KEY_ID in environment (.env).",
            )
        })?;
        let secret_access_key = std::env::var("STOCKCAST_SECRET_ACCESS_KEY").map_err(|_| {
            AppError::new(
                ErrorKind::Config,
                "Missing STOCKCAST_SECRET_ACCESS_KEY in environment (.env).",
            )
        })?;
        let region = region_from_env();
        Ok(Self {
            access_key_id,
            secret_access_key,
            region,
        })
    }
}

/// A serialized request body plus its declared content type.
#[derive(Debug, Clone)]
pub struct EncodedRequest {
    pub body: Vec<u8>,
    pub content_type: &'static str,
}

/// Raw response bytes plus the declared response content type.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub body: Vec<u8>,
    pub content_type: String,
}

/// HTTP client wrapper owning the process credentials.
pub struct RuntimeClient {
    client: Client,
    credentials: RuntimeCredentials,
}

impl RuntimeClient {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(RuntimeCredentials::from_env()?))
    }

    pub fn new(credentials: RuntimeCredentials) -> Self {
        Self {
            client: Client::new(),
            credentials,
        }
    }

    pub fn region(&self) -> &str {
        &self.credentials.region
    }

    /// Invoke a deployment with a serialized payload.
    ///
    /// Failure taxonomy: transport errors map to `Network`, any non-2xx status
    /// (including the service's model-evaluation failures) maps to
    /// `RemoteModel` with a snippet of the body.
    pub fn invoke(
        &self,
        target: &EndpointTarget,
        request: &EncodedRequest,
    ) -> Result<RawResponse, AppError> {
        self.post(&target.invocation_url(), request)
    }

    fn post(&self, url: &str, request: &EncodedRequest) -> Result<RawResponse, AppError> {
        debug!(
            "POST {url} ({} bytes, {})",
            request.body.len(),
            request.content_type
        );

        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, request.content_type)
            .header("x-access-key-id", &self.credentials.access_key_id)
            .header("x-secret-access-key", &self.credentials.secret_access_key)
            .body(request.body.clone())
            .send()
            .map_err(|e| AppError::new(ErrorKind::Network, format!("Endpoint request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(AppError::new(
                ErrorKind::RemoteModel,
                format!(
                    "Endpoint returned {status}: {}",
                    body_snippet(&body)
                ),
            ));
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/json")
            .to_string();

        let body = resp
            .bytes()
            .map_err(|e| {
                AppError::new(
                    ErrorKind::Network,
                    format!("Failed to read endpoint response: {e}"),
                )
            })?
            .to_vec();

        debug!("response: {} bytes, {content_type}", body.len());

        Ok(RawResponse { body, content_type })
    }
}

fn body_snippet(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(empty body)".to_string();
    }
    trimmed.chars().take(BODY_SNIPPET_LEN).collect()
}
