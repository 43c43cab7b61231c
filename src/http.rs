//! Buffered HTTP helper
//!
//! One request per call, body fully buffered, any non-2xx status is an error
//! carrying the response body. No retries.

use crate::error::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::transport("client builder", e))?;
        Ok(Self { client })
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(url, e))?;
        read_text(url, resp).await
    }

    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {} (binary)", url);
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        let bytes = resp.bytes().await.map_err(|e| Error::transport(url, e))?;
        Ok(bytes.to_vec())
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<String> {
        debug!("POST {}", url);
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::transport(url, e))?;
        read_text(url, resp).await
    }

    pub async fn post_json_as<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.post_json(url, body).await?;
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<String> {
        debug!("POST {} (form)", url);
        let resp = self
            .client
            .post(url)
            .form(fields)
            .send()
            .await
            .map_err(|e| Error::transport(url, e))?;
        read_text(url, resp).await
    }
}

/// Buffer the body and turn a non-2xx status into `Error::Status`.
pub(crate) async fn read_text(url: &str, resp: reqwest::Response) -> Result<String> {
    let status = resp.status();
    let body = resp.text().await.map_err(|e| Error::transport(url, e))?;
    if !status.is_success() {
        return Err(Error::Status {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}
