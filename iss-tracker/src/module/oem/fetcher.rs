//! Ephemeris sources: the upstream HTTP feed and an optional TTL cache in front of it
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

use super::document::OemDocument;
use super::xml::XmlError;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("failed to parse ephemeris XML: {0}")]
    Xml(#[from] XmlError),
}

/// Anything that can produce a fresh OEM document.
#[async_trait]
pub trait EphemerisSource: Send + Sync {
    async fn fetch(&self) -> Result<OemDocument, FetchError>;
}

/// Fetches the OEM XML over HTTP. No retries: every call is one GET.
pub struct HttpEphemerisSource {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpEphemerisSource {
    pub fn new(client: Client, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_attempt(&self) -> Result<OemDocument, FetchError> {
        let transport = |source| FetchError::Transport {
            url: self.url.clone(),
            source,
        };

        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(transport)?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: response.status(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        let document = OemDocument::from_xml(&body)?;
        Ok(document)
    }
}

#[async_trait]
impl EphemerisSource for HttpEphemerisSource {
    async fn fetch(&self) -> Result<OemDocument, FetchError> {
        tracing::debug!("Fetching ephemeris from {}", self.url);

        match self.fetch_attempt().await {
            Ok(document) => Ok(document),
            Err(e) => {
                tracing::error!("Error fetching ephemeris: {}", e);
                Err(e)
            }
        }
    }
}

/// Reuses the last successfully fetched document for `ttl`.
/// Failures are never cached.
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    cached: RwLock<Option<(Instant, OemDocument)>>,
}

impl<S: EphemerisSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: RwLock::new(None),
        }
    }
}

#[async_trait]
impl<S: EphemerisSource> EphemerisSource for CachedSource<S> {
    async fn fetch(&self) -> Result<OemDocument, FetchError> {
        if let Some((fetched_at, document)) = self.cached.read().await.as_ref() {
            if fetched_at.elapsed() < self.ttl {
                tracing::debug!("Serving cached ephemeris ({:?} old)", fetched_at.elapsed());
                return Ok(document.clone());
            }
        }

        let document = self.inner.fetch().await?;
        *self.cached.write().await = Some((Instant::now(), document.clone()));
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl EphemerisSource for CountingSource {
        async fn fetch(&self) -> Result<OemDocument, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FetchError::Xml(XmlError::NoRoot));
            }
            Ok(OemDocument::from_value(json!({ "call": call })))
        }
    }

    fn counting(fail: bool) -> CountingSource {
        CountingSource {
            calls: AtomicUsize::new(0),
            fail,
        }
    }

    #[tokio::test]
    async fn test_cache_hit_within_ttl() {
        let source = CachedSource::new(counting(false), Duration::from_secs(3600));

        let first = source.fetch().await.unwrap();
        let second = source.fetch().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refetches() {
        let source = CachedSource::new(counting(false), Duration::ZERO);

        source.fetch().await.unwrap();
        let second = source.fetch().await.unwrap();

        assert_eq!(second.as_value()["call"], 1);
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let source = CachedSource::new(counting(true), Duration::from_secs(3600));

        assert!(source.fetch().await.is_err());
        assert!(source.fetch().await.is_err());
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    #[ignore] // Requires network connection
    async fn test_fetch_live_feed() {
        let source = HttpEphemerisSource::new(
            Client::new(),
            crate::config::DEFAULT_SOURCE_URL,
            Duration::from_secs(60),
        );
        let document = source.fetch().await.unwrap();
        assert!(!document.records().is_empty());
    }
}
