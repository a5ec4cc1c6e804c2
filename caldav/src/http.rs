// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP client wrapper with authentication and `ETag` handling.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};

use crate::config::{AuthMethod, CalDavConfig};
use crate::error::CalDavError;
use crate::types::{ETag, Href};

/// HTTP client for `CalDAV` operations.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    auth: AuthMethod,
}

impl HttpClient {
    /// Creates a new HTTP client.
    pub fn new(config: &CalDavConfig) -> Result<Self, CalDavError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self {
            client,
            auth: config.auth.clone(),
        })
    }

    /// Builds a request with authentication headers.
    pub fn build_request(&self, method: Method, url: &str) -> RequestBuilder {
        let req = self.client.request(method, url);
        match &self.auth {
            AuthMethod::Basic { username, password } => req.basic_auth(username, Some(password)),
            AuthMethod::Bearer { token } => req.bearer_auth(token),
            AuthMethod::None => req,
        }
    }

    /// Builds a request for a WebDAV extension method such as PROPFIND or REPORT.
    pub fn build_dav_request(&self, method: &str, url: &str) -> Result<RequestBuilder, CalDavError> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| CalDavError::Http(format!("Invalid method: {e}")))?;
        Ok(self.build_request(method, url))
    }

    /// Executes a request and maps error statuses onto [`CalDavError`].
    pub async fn execute(&self, req: RequestBuilder) -> Result<Response, CalDavError> {
        let resp = req.send().await?;
        let status = resp.status();
        tracing::debug!(%status, url = %resp.url(), "caldav response");

        match status {
            s if s.is_success() => Ok(resp),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(CalDavError::Auth(status.to_string()))
            }
            StatusCode::NOT_FOUND => Err(CalDavError::NotFound(Href::from(resp.url().path()))),
            StatusCode::PRECONDITION_FAILED => Err(CalDavError::PreconditionFailed(
                resp.headers()
                    .get("ETag")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown")
                    .to_string(),
            )),
            status => {
                let text = resp
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unable to read response".to_string());
                Err(CalDavError::Http(format!("{status}: {text}")))
            }
        }
    }

    /// Adds If-Match header for conditional updates.
    pub fn if_match(req: RequestBuilder, etag: Option<&ETag>) -> RequestBuilder {
        match etag {
            Some(etag) => req.header("If-Match", etag.as_str()),
            None => req,
        }
    }

    /// Adds `If-None-Match: *` so a create never overwrites an existing object.
    pub fn if_none_match_any(req: RequestBuilder) -> RequestBuilder {
        req.header("If-None-Match", "*")
    }

    /// Extracts the `ETag` from response headers, if present.
    pub fn extract_etag(resp: &Response) -> Option<ETag> {
        resp.headers()
            .get("ETag")
            .and_then(|v| v.to_str().ok())
            .map(ETag::from)
    }
}
