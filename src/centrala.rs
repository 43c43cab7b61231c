//! Grading host client
//!
//! The grading host ("centrala") hands out challenge input and validates
//! answers. Every submission is wrapped in the same envelope:
//!
//! ```text
//! {"task": "<name>", "apikey": "<key>", "answer": <string | map | object>}
//! ```

use crate::config::Credentials;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

/// Answer envelope POSTed to `{host}/report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<A> {
    pub task: String,
    pub apikey: String,
    pub answer: A,
}

impl<A: Serialize> Envelope<A> {
    pub fn new(task: &str, apikey: &str, answer: A) -> Self {
        Self {
            task: task.to_string(),
            apikey: apikey.to_string(),
            answer,
        }
    }
}

/// Query envelope POSTed to `{host}/apidb`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest<'a> {
    pub task: &'a str,
    pub apikey: &'a str,
    pub query: &'a str,
}

/// Reply of the database API.
#[derive(Debug, Clone, Deserialize)]
pub struct DbResponse<T> {
    #[serde(default = "Vec::new")]
    pub reply: Vec<T>,
    #[serde(default)]
    pub error: String,
}

/// Something that can run a SQL query and hand back its raw reply.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<String>;
}

pub struct Centrala {
    http: HttpClient,
    creds: Credentials,
}

impl Centrala {
    pub fn new(http: HttpClient, creds: Credentials) -> Self {
        Self {
            http,
            creds: Credentials {
                host: creds.host.trim_end_matches('/').to_string(),
                api_key: creds.api_key,
            },
        }
    }

    pub fn host(&self) -> &str {
        &self.creds.host
    }

    pub fn api_key(&self) -> &str {
        &self.creds.api_key
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn envelope<A: Serialize>(&self, task: &str, answer: A) -> Envelope<A> {
        Envelope::new(task, &self.creds.api_key, answer)
    }

    /// Submit an answer. The raw body is logged and returned.
    pub async fn report<A: Serialize>(&self, task: &str, answer: A) -> Result<String> {
        let envelope = self.envelope(task, answer);
        self.send_envelope(&envelope).await
    }

    pub async fn send_envelope<A: Serialize>(&self, envelope: &Envelope<A>) -> Result<String> {
        let url = format!("{}/report", self.creds.host);
        debug!("Submitting {}: {}", envelope.task, serde_json::to_string(&envelope.answer)?);

        match self.http.post_json(&url, envelope).await {
            Ok(body) => {
                info!("Report for '{}' accepted: {}", envelope.task, body);
                Ok(body)
            }
            Err(Error::Status { url, status, body }) => {
                warn!("Report for '{}' rejected ({}): {}", envelope.task, status, body);
                Err(Error::Status { url, status, body })
            }
            Err(e) => Err(e),
        }
    }

    /// Fetch `{host}/data/{apikey}/{name}`.
    pub async fn data_file(&self, name: &str) -> Result<String> {
        let url = format!("{}/data/{}/{}", self.creds.host, self.creds.api_key, name);
        self.http.get_text(&url).await
    }

    /// Run a typed query and return its rows.
    pub async fn select<T: serde::de::DeserializeOwned>(&self, sql: &str) -> Result<Vec<T>> {
        let raw = self.execute(sql).await?;
        let parsed: DbResponse<T> = serde_json::from_str(&raw)?;
        if !parsed.error.is_empty() && parsed.error != "OK" {
            return Err(Error::Malformed(format!("query '{}': {}", sql, parsed.error)));
        }
        Ok(parsed.reply)
    }
}

#[async_trait]
impl QueryExecutor for Centrala {
    async fn execute(&self, sql: &str) -> Result<String> {
        let url = format!("{}/apidb", self.creds.host);
        let request = QueryRequest {
            task: "database",
            apikey: &self.creds.api_key,
            query: sql,
        };
        info!("DB query: {}", sql);
        self.http.post_json(&url, &request).await
    }
}

/// Persist the exact JSON that is about to be submitted.
pub fn save_envelope<A: Serialize>(path: &Path, envelope: &Envelope<A>) -> Result<()> {
    let json = serde_json::to_string(envelope)?;
    std::fs::write(path, json).map_err(|e| Error::io(path, e))?;
    info!("Envelope written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::collections::BTreeMap;

    fn centrala(base: &str) -> Centrala {
        Centrala::new(
            HttpClient::new().unwrap(),
            Credentials {
                host: format!("{}/", base),
                api_key: "test-key".to_string(),
            },
        )
    }

    #[test]
    fn test_envelope_round_trip() {
        let mut answer = BTreeMap::new();
        answer.insert("01".to_string(), "Kraków".to_string());
        answer.insert("02".to_string(), "truskawka".to_string());
        let envelope = Envelope::new("arxiv", "key", answer);

        let json = serde_json::to_string(&envelope).unwrap();
        let parsed: Envelope<BTreeMap<String, String>> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, envelope);
    }

    #[test]
    fn test_envelope_wire_names() {
        let envelope = Envelope::new("CENZURA", "k", "text".to_string());
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["task"], "CENZURA");
        assert_eq!(value["apikey"], "k");
        assert_eq!(value["answer"], "text");
    }

    #[tokio::test]
    async fn test_report_posts_envelope() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/report").json_body(serde_json::json!({
                "task": "wektory",
                "apikey": "test-key",
                "answer": "2024-02-21"
            }));
            then.status(200).body(r#"{"code":0,"message":"{{FLG:OK}}"}"#);
        });

        let body = centrala(&server.base_url())
            .report("wektory", "2024-02-21".to_string())
            .await
            .unwrap();
        assert!(body.contains("FLG"));
        mock.assert();
    }

    #[tokio::test]
    async fn test_report_rejected_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/report");
            then.status(400).body(r#"{"code":-300,"message":"wrong"}"#);
        });

        let result = centrala(&server.base_url())
            .report("wektory", "1999-01-01".to_string())
            .await;
        assert!(matches!(result, Err(Error::Status { status: 400, .. })));
    }

    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_rejected_report_body_is_logged() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/report");
            then.status(400).body(r#"{"code":-300,"message":"wrong"}"#);
        });

        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let result = centrala(&server.base_url())
            .report("wektory", "1999-01-01".to_string())
            .await;

        match result {
            Err(Error::Status { body, .. }) => assert!(body.contains("-300")),
            other => panic!("unexpected result: {other:?}"),
        }
        let logged = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("rejected (400)"));
        assert!(logged.contains(r#"{"code":-300,"message":"wrong"}"#));
    }

    #[tokio::test]
    async fn test_data_file_path() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/data/test-key/cenzura.txt");
            then.status(200).body("Jan Kowalski, ul. Długa 5");
        });

        let text = centrala(&server.base_url())
            .data_file("cenzura.txt")
            .await
            .unwrap();
        assert_eq!(text, "Jan Kowalski, ul. Długa 5");
    }

    #[tokio::test]
    async fn test_select_parses_rows() {
        #[derive(Deserialize)]
        struct Row {
            dc_id: String,
        }

        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/apidb").json_body(serde_json::json!({
                "task": "database",
                "apikey": "test-key",
                "query": "select dc_id from datacenters"
            }));
            then.status(200)
                .body(r#"{"reply":[{"dc_id":"4278"},{"dc_id":"9294"}],"error":"OK"}"#);
        });

        let rows: Vec<Row> = centrala(&server.base_url())
            .select("select dc_id from datacenters")
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].dc_id, "9294");
    }

    #[tokio::test]
    async fn test_select_surfaces_db_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/apidb");
            then.status(200)
                .body(r#"{"reply":[],"error":"Table 'banana.nope' doesn't exist"}"#);
        });

        let result: Result<Vec<serde_json::Value>> =
            centrala(&server.base_url()).select("select * from nope").await;
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn test_save_envelope_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final.json");
        save_envelope(&path, &Envelope::new("JSON", "k", 42)).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, r#"{"task":"JSON","apikey":"k","answer":42}"#);
    }
}
