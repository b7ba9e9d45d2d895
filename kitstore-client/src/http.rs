//! HTTP kit transport.
//!
//! Kits are fetched with `GET {base_url}/{endpoint}?hash=<hash>`; the body is
//! a JSON `KitFetchResponse`. One attempt per call, bounded by the configured
//! request timeout.

use async_trait::async_trait;
use kitstore_core::{KitFetchResponse, KitHash, KitTransport, TransportConfig, TransportError};

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub struct HttpKitTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpKitTransport {
    pub fn new(config: &TransportConfig) -> ClientResult<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }
}

#[async_trait]
impl KitTransport for HttpKitTransport {
    async fn get_kit(
        &self,
        endpoint: &str,
        hash: &KitHash,
    ) -> Result<KitFetchResponse, TransportError> {
        let url = self.url_for(endpoint);
        tracing::debug!(%url, %hash, "GET kit");

        let response = self
            .client
            .get(&url)
            .query(&[("hash", hash.as_str())])
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body: KitFetchResponse =
            response
                .json()
                .await
                .map_err(|e| TransportError::InvalidResponse {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                })?;

        if !body.status.is_ok() {
            return Err(TransportError::AppStatus {
                endpoint: endpoint.to_string(),
                code: body.status.code,
                name: body.status.name,
                desc: body.status.desc,
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_url_joining() {
        let transport =
            HttpKitTransport::new(&TransportConfig::new("http://127.0.0.1:4000/_/api/1.0/"))
                .unwrap();
        assert_eq!(transport.base_url(), "http://127.0.0.1:4000/_/api/1.0");
        assert_eq!(
            transport.url_for("merkle/pvl"),
            "http://127.0.0.1:4000/_/api/1.0/merkle/pvl"
        );
        assert_eq!(
            transport.url_for("/merkle/pvl"),
            "http://127.0.0.1:4000/_/api/1.0/merkle/pvl"
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = HttpKitTransport::new(&TransportConfig::new("")).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));

        let zero = TransportConfig::new("http://localhost").with_timeout(Duration::ZERO);
        assert!(HttpKitTransport::new(&zero).is_err());
    }
}
