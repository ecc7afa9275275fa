//! Thin client over the external MemoRAG document backend.
//!
//! Displays system health and query results; the backend itself is
//! separate infrastructure and requires no session.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::{ClientError, ClientResult};

/// System metrics block of the status response.
#[derive(Debug, Default, Deserialize)]
pub struct SystemMetrics {
    #[serde(default)]
    pub queries_total: i64,
    #[serde(default)]
    pub queries_per_minute: f64,
    #[serde(default)]
    pub avg_latency_ms: f64,
    #[serde(default)]
    pub memory_usage_mb: f64,
    #[serde(default)]
    pub document_count: i64,
    #[serde(default)]
    pub chunk_count: i64,
    #[serde(default)]
    pub entity_count: i64,
    #[serde(default)]
    pub relation_count: i64,
    #[serde(default)]
    pub uptime_seconds: f64,
}

/// System status response.
#[derive(Debug, Deserialize)]
pub struct SystemStatus {
    pub status: String,
    #[serde(default)]
    pub metrics: SystemMetrics,
    #[serde(default)]
    pub lm_studio_connected: bool,
}

/// One source chunk backing an answer.
#[derive(Debug, Deserialize)]
pub struct ChunkInfo {
    #[serde(default)]
    pub doc_title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
}

/// Provenance block of a query response.
#[derive(Debug, Default, Deserialize)]
pub struct ProvenanceInfo {
    #[serde(default)]
    pub chunks: Vec<ChunkInfo>,
}

/// Query response.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub processing_time_ms: Option<f64>,
    #[serde(default)]
    pub provenance: Option<ProvenanceInfo>,
}

#[derive(Serialize)]
struct QueryBody<'a> {
    question: &'a str,
    mode: &'a str,
    include_provenance: bool,
}

/// Client for the MemoRAG backend.
pub struct MemoRagClient {
    http: reqwest::Client,
    base_url: String,
}

impl MemoRagClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch system status.
    pub async fn status(&self) -> ClientResult<SystemStatus> {
        let response = self
            .http
            .get(format!("{}/api/system/status", self.base_url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: "MemoRAG status request failed".to_string(),
            });
        }

        Ok(response.json().await?)
    }

    /// Run a query in auto mode with provenance.
    pub async fn query(&self, question: &str) -> ClientResult<QueryResponse> {
        let response = self
            .http
            .post(format!("{}/api/query", self.base_url))
            .json(&QueryBody {
                question,
                mode: "auto",
                include_provenance: true,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: "MemoRAG query failed".to_string(),
            });
        }

        Ok(response.json().await?)
    }
}

/// Render system status as plain text.
pub fn render_status(status: &SystemStatus) -> String {
    let m = &status.metrics;
    format!(
        "MemoRAG system: {}\n\
         Model backend connected: {}\n\
         Documents: {}  Chunks: {}  Entities: {}  Relations: {}\n\
         Queries: {} total, {:.1}/min, {:.0} ms avg latency\n\
         Memory: {:.0} MB  Uptime: {:.0}s",
        status.status,
        if status.lm_studio_connected { "yes" } else { "no" },
        m.document_count,
        m.chunk_count,
        m.entity_count,
        m.relation_count,
        m.queries_total,
        m.queries_per_minute,
        m.avg_latency_ms,
        m.memory_usage_mb,
        m.uptime_seconds,
    )
}

/// Render a query answer with its sources as plain text.
pub fn render_query(result: &QueryResponse) -> String {
    let mut out = String::new();
    out.push_str(&result.answer);
    out.push('\n');

    if let Some(ref mode) = result.mode {
        out.push_str(&format!("\nMode: {}", mode));
    }
    if let Some(ms) = result.processing_time_ms {
        out.push_str(&format!("  ({:.0} ms)", ms));
    }

    if let Some(ref provenance) = result.provenance {
        if !provenance.chunks.is_empty() {
            out.push_str("\n\nSources:\n");
            for (i, chunk) in provenance.chunks.iter().enumerate() {
                let snippet: String = chunk.content.chars().take(120).collect();
                out.push_str(&format!(
                    "  {}. {} (score {:.2})\n     {}\n",
                    i + 1,
                    chunk.doc_title,
                    chunk.score,
                    snippet
                ));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parses_with_missing_fields() {
        let status: SystemStatus = serde_json::from_str(r#"{"status": "healthy"}"#).unwrap();
        assert_eq!(status.status, "healthy");
        assert_eq!(status.metrics.document_count, 0);
        assert!(!status.lm_studio_connected);
    }

    #[test]
    fn test_render_query_lists_sources() {
        let result = QueryResponse {
            answer: "42".to_string(),
            mode: Some("speed".to_string()),
            processing_time_ms: Some(12.0),
            provenance: Some(ProvenanceInfo {
                chunks: vec![ChunkInfo {
                    doc_title: "Guide".to_string(),
                    content: "...".to_string(),
                    score: 0.9,
                }],
            }),
        };

        let text = render_query(&result);
        assert!(text.starts_with("42"));
        assert!(text.contains("Mode: speed"));
        assert!(text.contains("1. Guide (score 0.90)"));
    }
}
