use governor::{DefaultDirectRateLimiter, Jitter, Quota, RateLimiter};
use moka::future::Cache;
use reqwest::header::HeaderMap;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Basic-auth credentials for Atlassian Cloud (account email + API token)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub api_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Steady-state requests per second
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 5,
            burst_capacity: 20,
        }
    }
}

/// Status and raw body of a finished request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND.as_u16()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Rate-limited HTTP client shared by the tracker and wiki clients.
///
/// Successful GET responses are cached for the lifetime of the client so that
/// a sprint fetched twice in one run only costs one request.
#[derive(Debug, Clone)]
pub struct RateLimitedHttpClient {
    client: Client,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    cache: Cache<String, HttpResponse>,
    base_url: String,
    credentials: Option<Credentials>,
}

impl RateLimitedHttpClient {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Option<Credentials>,
        rate_limit: &RateLimitConfig,
    ) -> Result<Self, reqwest::Error> {
        let per_second = NonZeroU32::new(rate_limit.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(rate_limit.burst_capacity).unwrap_or(per_second);
        let quota = Quota::per_second(per_second).allow_burst(burst);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("sprint-velocity/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // 10 minute TTL is plenty for a single reporting run
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(600))
            .build();

        Ok(Self {
            client,
            rate_limiter,
            cache,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path relative to the base URL
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(credentials) => request.basic_auth(&credentials.email, Some(&credentials.api_token)),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<HttpResponse, reqwest::Error> {
        self.rate_limiter
            .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(50)))
            .await;

        let response = self.authorize(request).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<HttpResponse, reqwest::Error> {
        let request = self.client.get(self.url(path)).query(query).build()?;
        let cache_key = request.url().to_string();

        if let Some(cached) = self.cache.get(&cache_key).await {
            debug!("Cache hit for {}", cache_key);
            return Ok(cached);
        }

        debug!("GET {}", cache_key);
        let response = self
            .send(RequestBuilder::from_parts(self.client.clone(), request))
            .await?;

        if response.is_success() {
            self.cache.insert(cache_key, response.clone()).await;
        }
        Ok(response)
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<HttpResponse, reqwest::Error> {
        debug!("POST {}", path);
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    pub async fn put_json(&self, path: &str, body: &serde_json::Value) -> Result<HttpResponse, reqwest::Error> {
        debug!("PUT {}", path);
        let response = self.send(self.client.put(self.url(path)).json(body)).await?;
        self.invalidate_cache_pattern(path).await;
        Ok(response)
    }

    pub async fn post_multipart(
        &self,
        path: &str,
        form: Form,
        headers: HeaderMap,
    ) -> Result<HttpResponse, reqwest::Error> {
        debug!("POST multipart {}", path);
        let request = self.client.post(self.url(path)).headers(headers).multipart(form);
        let response = self.send(request).await?;
        self.invalidate_cache_pattern(path).await;
        Ok(response)
    }

    /// Invalidate cached entries whose URL contains the pattern
    pub async fn invalidate_cache_pattern(&self, pattern: &str) {
        let keys_to_remove: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| key.contains(pattern))
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        for key in keys_to_remove {
            self.cache.invalidate(&key).await;
        }

        debug!("Invalidated cache entries matching pattern: {}", pattern);
    }
}
