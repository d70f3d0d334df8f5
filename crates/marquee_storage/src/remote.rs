//! Remote byte source over a range-capable HTTP file server.

use crate::{ByteSource, FileStat};
use marquee_error::{MarqueeResult, StorageError, StorageErrorKind};
use reqwest::header::{AUTHORIZATION, CONTENT_LENGTH, LAST_MODIFIED, RANGE};
use reqwest::{Client, Response, StatusCode, Url};
use std::time::{Duration, SystemTime};
use tracing::{debug, instrument, warn};

/// Remote backend speaking plain HTTP: `HEAD` for stat and existence,
/// `GET` with a `Range` header for partial reads, `PUT` for writes.
///
/// Works against WebDAV shares and object stores that honour byte ranges.
#[derive(Debug, Clone)]
pub struct HttpRangeSource {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpRangeSource {
    /// Create a remote source rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the URL cannot serve as a base or the client cannot be built.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> MarqueeResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            StorageError::new(StorageErrorKind::InvalidConfig(format!(
                "invalid base URL {base_url}: {e}"
            )))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(StorageError::new(StorageErrorKind::InvalidConfig(format!(
                "{base_url} cannot be used as a base URL"
            )))
            .into());
        }

        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            StorageError::new(StorageErrorKind::InvalidConfig(format!(
                "failed to build HTTP client: {e}"
            )))
        })?;

        debug!(base_url = %base_url, "Created remote byte source");
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// URL of a backend path, one percent-encoded segment per path component.
    fn url_for(&self, path: &str) -> MarqueeResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                StorageError::new(StorageErrorKind::InvalidConfig(
                    self.base_url.to_string(),
                ))
            })?;
            segments.pop_if_empty();
            for segment in path.split('/').filter(|s| !s.is_empty()) {
                if segment == ".." {
                    return Err(
                        StorageError::new(StorageErrorKind::InvalidPath(path.to_string())).into(),
                    );
                }
                segments.push(segment);
            }
        }
        Ok(url)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    fn unavailable(path: &str, e: reqwest::Error) -> StorageError {
        warn!(path, error = %e, "Remote byte source unreachable");
        StorageError::new(StorageErrorKind::Unavailable(format!("{path}: {e}")))
    }

    fn status_error(path: &str, response: &Response) -> StorageError {
        match response.status() {
            StatusCode::NOT_FOUND => StorageError::new(StorageErrorKind::NotFound(path.to_string())),
            StatusCode::RANGE_NOT_SATISFIABLE => {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{path}: range not satisfiable"
                )))
            }
            status if status.is_server_error() => StorageError::new(
                StorageErrorKind::Unavailable(format!("{path}: HTTP {status}")),
            ),
            status => StorageError::new(StorageErrorKind::FileRead(format!(
                "{path}: HTTP {status}"
            ))),
        }
    }

    async fn body(path: &str, response: Response) -> MarqueeResult<Vec<u8>> {
        let bytes = response.bytes().await.map_err(|e| Self::unavailable(path, e))?;
        Ok(bytes.to_vec())
    }
}

fn parse_last_modified(response: &Response) -> Option<SystemTime> {
    let value = response.headers().get(LAST_MODIFIED)?.to_str().ok()?;
    let parsed = chrono::DateTime::parse_from_rfc2822(value).ok()?;
    Some(SystemTime::from(parsed.with_timezone(&chrono::Utc)))
}

#[async_trait::async_trait]
impl ByteSource for HttpRangeSource {
    fn backend_name(&self) -> &'static str {
        "http"
    }

    #[instrument(skip(self))]
    async fn stat(&self, path: &str) -> MarqueeResult<FileStat> {
        let url = self.url_for(path)?;
        let response = self
            .request(reqwest::Method::HEAD, url)
            .send()
            .await
            .map_err(|e| Self::unavailable(path, e))?;

        if !response.status().is_success() {
            return Err(Self::status_error(path, &response).into());
        }

        let size = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{path}: missing Content-Length"
                )))
            })?;

        Ok(FileStat {
            size,
            modified: parse_last_modified(&response),
        })
    }

    #[instrument(skip(self))]
    async fn read_range(&self, path: &str, start: u64, end: u64) -> MarqueeResult<Vec<u8>> {
        if end < start {
            return Err(StorageError::new(StorageErrorKind::InvalidRange {
                path: path.to_string(),
                start,
                end,
            })
            .into());
        }
        if end == start {
            return Ok(Vec::new());
        }

        let url = self.url_for(path)?;
        let response = self
            .request(reqwest::Method::GET, url)
            .header(RANGE, format!("bytes={}-{}", start, end - 1))
            .send()
            .await
            .map_err(|e| Self::unavailable(path, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(path, &response).into());
        }

        let body = Self::body(path, response).await?;
        let wanted = (end - start) as usize;

        // A server that ignores Range answers 200 with the whole file
        let slice = if status == StatusCode::PARTIAL_CONTENT {
            body
        } else {
            debug!(path, "Server ignored Range header, slicing full body");
            body.get(start as usize..end as usize)
                .map(<[u8]>::to_vec)
                .unwrap_or_default()
        };

        if slice.len() != wanted {
            return Err(StorageError::new(StorageErrorKind::InvalidRange {
                path: path.to_string(),
                start,
                end,
            })
            .into());
        }
        Ok(slice)
    }

    #[instrument(skip(self))]
    async fn read_all(&self, path: &str) -> MarqueeResult<Vec<u8>> {
        let url = self.url_for(path)?;
        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| Self::unavailable(path, e))?;

        if !response.status().is_success() {
            return Err(Self::status_error(path, &response).into());
        }
        Self::body(path, response).await
    }

    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn write_all(&self, path: &str, data: &[u8]) -> MarqueeResult<()> {
        let url = self.url_for(path)?;
        let response = self
            .request(reqwest::Method::PUT, url)
            .body(data.to_vec())
            .send()
            .await
            .map_err(|e| Self::unavailable(path, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "{path}: HTTP {status}: {body}"
            )))
            .into());
        }

        debug!(path, size = data.len(), "Uploaded file");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn exists(&self, path: &str) -> MarqueeResult<bool> {
        let url = self.url_for(path)?;
        let response = self
            .request(reqwest::Method::HEAD, url)
            .send()
            .await
            .map_err(|e| Self::unavailable(path, e))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(Self::status_error(path, &response).into()),
        }
    }
}
