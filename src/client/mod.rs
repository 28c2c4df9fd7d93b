//! HTTP adapter for the remote matcher and affidavit service

use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::settings::MatcherSettings;
use crate::traits::*;
use crate::types::*;

const RECONCILE_PATH: &str = "reconcile";
const AFFIDAVIT_PATH: &str = "api/generate-affidavit";
const HEALTH_PATH: &str = "health";

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: String,
}

/// Client for the matcher service
#[derive(Debug, Clone)]
pub struct HttpMatcher {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpMatcher {
    pub fn new(base_url: &str) -> ReconcileResult<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn from_settings(settings: &MatcherSettings) -> ReconcileResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Self::with_client(&settings.base_url, http)
    }

    fn with_client(base_url: &str, http: reqwest::Client) -> ReconcileResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ReconcileError::Validation(format!("invalid base_url: {err}")))?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Check the service health endpoint
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let endpoint = self.endpoint(HEALTH_PATH)?;
        let res = self.http.get(endpoint).send().await.map_err(transport)?;
        if !res.status().is_success() {
            return Err(failure(res, Operation::Health).await);
        }
        res.json::<HealthStatus>().await.map_err(transport)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::transport(format!("invalid endpoint {path}: {err}")))
    }
}

#[async_trait]
impl RemoteMatcher for HttpMatcher {
    async fn reconcile(&self, request: &ReconcileRequest) -> Result<ReconcileResponse, ClientError> {
        let endpoint = self.endpoint(RECONCILE_PATH)?;
        tracing::debug!(%endpoint, cardholder = %request.cardholder_name, "sending reconcile request");

        let res = self
            .http
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(transport)?;

        if res.status().is_success() {
            return res.json::<ReconcileResponse>().await.map_err(transport);
        }

        Err(failure(res, Operation::Reconcile).await)
    }
}

#[async_trait]
impl AffidavitService for HttpMatcher {
    async fn generate_affidavit(
        &self,
        request: &AffidavitRequest,
    ) -> Result<AffidavitDocument, ClientError> {
        let endpoint = self.endpoint(AFFIDAVIT_PATH)?;
        tracing::debug!(%endpoint, vendor = %request.vendor, "requesting affidavit");

        let res = self
            .http
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(transport)?;

        if !res.status().is_success() {
            return Err(failure(res, Operation::Affidavit).await);
        }

        let bytes = res.bytes().await.map_err(transport)?;
        Ok(AffidavitDocument {
            file_name: request.file_name(),
            bytes: bytes.to_vec(),
        })
    }
}

fn transport(err: reqwest::Error) -> ClientError {
    ClientError::transport(err.to_string())
}

/// Classify a non-success response by whether its body carries `{detail}`
async fn failure(res: Response, operation: Operation) -> ClientError {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();

    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) if !err.detail.trim().is_empty() => ClientError::Detail {
            status: status.as_u16(),
            detail: err.detail,
        },
        _ => ClientError::Unparsable {
            operation,
            status: status.as_u16(),
            status_line: status_line(status),
        },
    }
}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_join_base_url() {
        let client = HttpMatcher::new("http://localhost:8000").unwrap();
        assert_eq!(
            client.endpoint(RECONCILE_PATH).unwrap().as_str(),
            "http://localhost:8000/reconcile"
        );
        assert_eq!(
            client.endpoint(AFFIDAVIT_PATH).unwrap().as_str(),
            "http://localhost:8000/api/generate-affidavit"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            HttpMatcher::new("not a url"),
            Err(ReconcileError::Validation(_))
        ));
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(StatusCode::BAD_GATEWAY), "502 Bad Gateway");
    }
}
