//! HTTP client for TMDB-compatible catalogs.

use crate::{CatalogApi, CatalogConfig, CatalogContext, SearchHit};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use marquee_core::{CallOutcome, MediaKind};
use marquee_error::{CatalogError, CatalogErrorKind, MarqueeResult};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::Value as JsonValue;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Longest error body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

/// Catalog client speaking the TMDB v3 REST API.
///
/// Requests are paced by a shared rate limiter and retried with jittered
/// exponential backoff on timeouts, transport failures, 408, 429 and 5xx.
/// Failures that survive the retries surface as
/// [`CallOutcome::Transient`]; a 404 surfaces as [`CallOutcome::NotFound`].
#[derive(Clone)]
pub struct TmdbClient {
    http: Client,
    base_url: String,
    image_base_url: String,
    limiter: Arc<DirectRateLimiter>,
    max_retries: usize,
    initial_backoff_ms: u64,
    max_backoff: Duration,
}

impl std::fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base_url", &self.base_url)
            .field("image_base_url", &self.image_base_url)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl TmdbClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(config: &CatalogConfig) -> MarqueeResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(*config.timeout_secs()))
            .gzip(true)
            .build()
            .map_err(|e| CatalogError::new(CatalogErrorKind::ClientCreation(e.to_string())))?;

        let rps = NonZeroU32::new(*config.requests_per_second()).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));

        debug!(
            base_url = %config.base_url(),
            requests_per_second = rps.get(),
            "Created catalog client"
        );

        Ok(Self {
            http,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            image_base_url: config.image_base_url().trim_end_matches('/').to_string(),
            limiter,
            max_retries: *config.max_retries(),
            initial_backoff_ms: *config.initial_backoff_ms(),
            max_backoff: Duration::from_secs(*config.max_backoff_secs()),
        })
    }

    /// Endpoint URL below the base URL, one percent-encoded segment each.
    fn url_for(&self, segments: &[&str]) -> Result<String, CatalogError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            CatalogError::new(CatalogErrorKind::ClientCreation(format!(
                "{}: {e}",
                self.base_url
            )))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                CatalogError::new(CatalogErrorKind::ClientCreation(self.base_url.clone()))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url.into())
    }

    /// GET a catalog endpoint and decode the JSON body, with retries.
    async fn get_json(
        &self,
        ctx: &CatalogContext,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<JsonValue, CatalogError> {
        let url = self.url_for(segments)?;
        let response = self
            .send_with_retry(&url, || {
                let request = self
                    .http
                    .get(&url)
                    .query(&[("language", ctx.locale.as_str())])
                    .query(query);
                ctx.auth.apply(request)
            })
            .await?;

        response
            .json::<JsonValue>()
            .await
            .map_err(|e| CatalogError::new(CatalogErrorKind::Parse(format!("{url}: {e}"))))
    }

    async fn send_with_retry<F>(&self, url: &str, build: F) -> Result<Response, CatalogError>
    where
        F: Fn() -> RequestBuilder,
    {
        use tokio_retry2::{Retry, RetryError, strategy::ExponentialBackoff, strategy::jitter};

        let strategy = ExponentialBackoff::from_millis(self.initial_backoff_ms)
            .factor(2)
            .max_delay(self.max_backoff)
            .map(jitter)
            .take(self.max_retries);

        let build = &build;
        Retry::spawn(strategy, move || async move {
            self.limiter.until_ready().await;
            match send_once(build()).await {
                Ok(response) => Ok(response),
                Err(e) if e.kind.is_retryable() => {
                    warn!(url, error = %e, "Catalog request failed, will retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => Err(RetryError::Permanent(e)),
            }
        })
        .await
    }
}

async fn send_once(request: RequestBuilder) -> Result<Response, CatalogError> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            CatalogError::new(CatalogErrorKind::Timeout(e.to_string()))
        } else {
            CatalogError::new(CatalogErrorKind::Transport(e.to_string()))
        }
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut message = response.text().await.unwrap_or_default();
    if message.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
    }
    Err(CatalogError::new(CatalogErrorKind::HttpStatus {
        status_code: status.as_u16(),
        message,
    }))
}

/// Collapse a client result into a call outcome, logging the failure.
fn into_outcome<T>(operation: &str, result: Result<T, CatalogError>) -> CallOutcome<T> {
    match result {
        Ok(value) => CallOutcome::Success(value),
        Err(e) if e.kind.is_not_found() => {
            debug!(operation, "Catalog reported not found");
            CallOutcome::NotFound
        }
        Err(e) => {
            warn!(operation, error = %e, "Catalog call failed");
            CallOutcome::Transient(e.kind.to_string())
        }
    }
}

/// Which external catalog an identifier belongs to.
fn external_source(cross_ref_id: &str) -> &'static str {
    if cross_ref_id.chars().all(|c| c.is_ascii_digit()) {
        "tvdb_id"
    } else {
        "imdb_id"
    }
}

fn media_segment(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Movie => "movie",
        MediaKind::Series => "tv",
    }
}

/// Ids from an array of result objects.
fn hits(payload: &JsonValue, key: &str, media_kind: MediaKind) -> Vec<SearchHit> {
    payload
        .get(key)
        .and_then(JsonValue::as_array)
        .map(|results| {
            results
                .iter()
                .filter_map(|entry| entry.get("id").and_then(JsonValue::as_u64))
                .map(|id| SearchHit { id, media_kind })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl CatalogApi for TmdbClient {
    #[instrument(skip(self, ctx), fields(locale = %ctx.locale))]
    async fn find_by_cross_ref(
        &self,
        ctx: &CatalogContext,
        cross_ref_id: &str,
    ) -> CallOutcome<Vec<SearchHit>> {
        let query = [(
            "external_source",
            external_source(cross_ref_id).to_string(),
        )];
        let result = self
            .get_json(ctx, &["find", cross_ref_id], &query)
            .await
            .map(|payload| {
                let mut found = hits(&payload, "movie_results", MediaKind::Movie);
                found.extend(hits(&payload, "tv_results", MediaKind::Series));
                found
            });
        into_outcome("find", result)
    }

    #[instrument(skip(self, ctx), fields(locale = %ctx.locale))]
    async fn fetch_record(
        &self,
        ctx: &CatalogContext,
        id: u64,
        kind: MediaKind,
    ) -> CallOutcome<JsonValue> {
        let id = id.to_string();
        let query = [("append_to_response", "external_ids".to_string())];
        let result = self
            .get_json(ctx, &[media_segment(kind), &id], &query)
            .await;
        into_outcome("fetch_record", result)
    }

    #[instrument(skip(self, ctx), fields(locale = %ctx.locale))]
    async fn search(
        &self,
        ctx: &CatalogContext,
        kind: MediaKind,
        query: &str,
        year: Option<&str>,
    ) -> CallOutcome<Vec<SearchHit>> {
        let mut params = vec![("query", query.to_string())];
        if let Some(year) = year {
            let key = match kind {
                MediaKind::Movie => "year",
                MediaKind::Series => "first_air_date_year",
            };
            params.push((key, year.to_string()));
        }

        let result = self
            .get_json(ctx, &["search", media_segment(kind)], &params)
            .await
            .map(|payload| hits(&payload, "results", kind));
        into_outcome("search", result)
    }

    #[instrument(skip(self))]
    async fn fetch_image(&self, relative_path: &str) -> CallOutcome<Vec<u8>> {
        let url = format!(
            "{}/{}",
            self.image_base_url,
            relative_path.trim_start_matches('/')
        );
        let result = match self.send_with_retry(&url, || self.http.get(&url)).await {
            Ok(response) => response.bytes().await.map(|b| b.to_vec()).map_err(|e| {
                CatalogError::new(CatalogErrorKind::Transport(format!("{url}: {e}")))
            }),
            Err(e) => Err(e),
        };
        into_outcome("fetch_image", result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_external_source_by_shape() {
        assert_eq!(external_source("tt1727587"), "imdb_id");
        assert_eq!(external_source("81189"), "tvdb_id");
    }

    #[test]
    fn test_hits_keep_order_and_skip_bad_ids() {
        let payload = json!({
            "results": [{"id": 3}, {"id": "x"}, {"id": 1}]
        });
        let found = hits(&payload, "results", MediaKind::Series);
        assert_eq!(
            found,
            vec![
                SearchHit { id: 3, media_kind: MediaKind::Series },
                SearchHit { id: 1, media_kind: MediaKind::Series },
            ]
        );
        assert!(hits(&payload, "movie_results", MediaKind::Movie).is_empty());
    }

    #[test]
    fn test_not_found_and_transient_outcomes() {
        let not_found: Result<(), _> = Err(CatalogError::new(CatalogErrorKind::HttpStatus {
            status_code: 404,
            message: String::new(),
        }));
        assert_eq!(into_outcome("t", not_found), CallOutcome::NotFound);

        let unavailable: Result<(), _> = Err(CatalogError::new(CatalogErrorKind::Transport(
            "connection refused".to_string(),
        )));
        assert!(matches!(into_outcome("t", unavailable), CallOutcome::Transient(_)));
    }

    #[test]
    fn test_base_urls_lose_trailing_slash() {
        let config = CatalogConfig::default()
            .with_base_url("http://localhost:9/3/".to_string())
            .with_image_base_url("http://localhost:9/img/".to_string());
        let client = TmdbClient::new(&config).expect("client builds");
        assert_eq!(client.base_url, "http://localhost:9/3");
        assert_eq!(client.image_base_url, "http://localhost:9/img");
    }

    #[test]
    fn test_cross_ref_ids_are_encoded_as_one_segment() {
        let config = CatalogConfig::default().with_base_url("http://localhost:9/3/".to_string());
        let client = TmdbClient::new(&config).expect("client builds");

        let url = client.url_for(&["find", "tt 1/2?x"]).expect("url builds");
        assert_eq!(url, "http://localhost:9/3/find/tt%201%2F2%3Fx");

        let url = client.url_for(&["tv", "81189"]).expect("url builds");
        assert_eq!(url, "http://localhost:9/3/tv/81189");
    }
}
