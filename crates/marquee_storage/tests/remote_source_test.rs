//! Tests for the HTTP byte source against an in-process file server.

use marquee_error::MarqueeErrorKind;
use marquee_storage::{
    ByteSource, FileSystemSource, HttpRangeSource, SAMPLE_WINDOW, address_source,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Minimal range-capable file server: `HEAD`, `GET` with optional `Range`,
/// `PUT`. Paths are keyed as they appear on the request line.
#[derive(Clone, Default)]
struct FileServer {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    ranges: Arc<Mutex<Vec<String>>>,
    ignore_range: bool,
}

struct Request {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

impl FileServer {
    fn ignoring_range() -> Self {
        Self {
            ignore_range: true,
            ..Self::default()
        }
    }

    fn insert(&self, path: &str, data: Vec<u8>) {
        self.files
            .lock()
            .unwrap()
            .insert(format!("/share/{path}"), data);
    }

    fn stored(&self, path: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(&format!("/share/{path}"))
            .cloned()
    }

    fn ranges_seen(&self) -> Vec<String> {
        self.ranges.lock().unwrap().clone()
    }

    /// Bind to an ephemeral port and serve until the test ends.
    async fn start(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = self.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let server = server.clone();
                tokio::spawn(async move { server.handle(stream).await });
            }
        });
        format!("http://{addr}/share/")
    }

    async fn handle(&self, mut stream: TcpStream) {
        let Some(request) = read_request(&mut stream).await else {
            return;
        };

        let (status, headers, body) = self.respond(&request);
        let mut head = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n",
            body.len()
        );
        for (name, value) in headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str("\r\n");

        let _ = stream.write_all(head.as_bytes()).await;
        if request.method != "HEAD" {
            let _ = stream.write_all(&body).await;
        }
        let _ = stream.shutdown().await;
    }

    fn respond(&self, request: &Request) -> (&'static str, Vec<(String, String)>, Vec<u8>) {
        let mut files = self.files.lock().unwrap();

        if request.method == "PUT" {
            files.insert(request.path.clone(), request.body.clone());
            return ("201 Created", Vec::new(), Vec::new());
        }

        let Some(data) = files.get(&request.path) else {
            return ("404 Not Found", Vec::new(), b"no such file".to_vec());
        };
        let last_modified = (
            "Last-Modified".to_string(),
            "Thu, 30 Sep 2010 12:00:00 GMT".to_string(),
        );

        let range = request.headers.get("range");
        if let Some(range) = range {
            self.ranges.lock().unwrap().push(range.clone());
        }

        match range.and_then(|r| parse_range(r)) {
            Some((first, last)) if !self.ignore_range && request.method == "GET" => {
                let last = last.min(data.len() - 1);
                let content_range = format!("bytes {first}-{last}/{}", data.len());
                (
                    "206 Partial Content",
                    vec![
                        ("Content-Range".to_string(), content_range),
                        last_modified,
                    ],
                    data[first..=last].to_vec(),
                )
            }
            _ => ("200 OK", vec![last_modified], data.clone()),
        }
    }
}

/// `bytes=<first>-<last>`, both ends inclusive.
fn parse_range(value: &str) -> Option<(usize, usize)> {
    let (first, last) = value.strip_prefix("bytes=")?.split_once('-')?;
    Some((first.parse().ok()?, last.parse().ok()?))
}

async fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 8192];
    let header_end = loop {
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split(' ');
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    let length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = buffer[header_end..].to_vec();
    while body.len() < length {
        let read = stream.read(&mut chunk).await.ok()?;
        if read == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..read]);
    }

    Some(Request {
        method,
        path,
        headers,
        body,
    })
}

fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

fn remote(base_url: &str) -> HttpRangeSource {
    HttpRangeSource::new(base_url, None, Duration::from_secs(5)).unwrap()
}

/// Content id of `data` when stored on local disk.
async fn local_address(data: &[u8]) -> String {
    let temp_dir = TempDir::new().unwrap();
    let local = FileSystemSource::new(temp_dir.path()).unwrap();
    local.write_all("clip.mkv", data).await.unwrap();
    address_source(&local, "clip.mkv").await.unwrap().to_string()
}

#[tokio::test]
async fn test_remote_address_matches_local_for_small_file() {
    let data = patterned(10);
    let server = FileServer::default();
    server.insert("clip.mkv", data.clone());
    let source = remote(&server.start().await);

    let id = address_source(&source, "clip.mkv").await.unwrap();
    assert_eq!(id.to_string(), local_address(&data).await);
    assert_eq!(server.ranges_seen(), vec!["bytes=0-9".to_string()]);
}

#[tokio::test]
async fn test_remote_address_matches_local_for_sampled_file() {
    let size = SAMPLE_WINDOW as usize + 4099;
    let data = patterned(size);
    let server = FileServer::default();
    server.insert("clip.mkv", data.clone());
    let source = remote(&server.start().await);

    let id = address_source(&source, "clip.mkv").await.unwrap();
    assert_eq!(id.to_string(), local_address(&data).await);

    let start = (size - SAMPLE_WINDOW as usize) / 2;
    let last = start + SAMPLE_WINDOW as usize - 1;
    assert_eq!(server.ranges_seen(), vec![format!("bytes={start}-{last}")]);
}

#[tokio::test]
async fn test_server_ignoring_range_still_addresses_the_same() {
    let data = patterned(SAMPLE_WINDOW as usize + 4099);
    let server = FileServer::ignoring_range();
    server.insert("clip.mkv", data.clone());
    let source = remote(&server.start().await);

    let id = address_source(&source, "clip.mkv").await.unwrap();
    assert_eq!(id.to_string(), local_address(&data).await);
}

#[tokio::test]
async fn test_read_range_partial_and_full_responses() {
    let data = patterned(100);

    let honouring = FileServer::default();
    honouring.insert("a.bin", data.clone());
    let source = remote(&honouring.start().await);
    assert_eq!(source.read_range("a.bin", 10, 20).await.unwrap(), &data[10..20]);
    assert_eq!(honouring.ranges_seen(), vec!["bytes=10-19".to_string()]);

    let ignoring = FileServer::ignoring_range();
    ignoring.insert("a.bin", data.clone());
    let source = remote(&ignoring.start().await);
    assert_eq!(source.read_range("a.bin", 10, 20).await.unwrap(), &data[10..20]);
    assert_eq!(source.read_range("a.bin", 90, 100).await.unwrap(), &data[90..100]);
}

#[tokio::test]
async fn test_stat_reads_content_length() {
    let server = FileServer::default();
    server.insert("a.bin", patterned(4321));
    let source = remote(&server.start().await);

    let stat = source.stat("a.bin").await.unwrap();
    assert_eq!(stat.size, 4321);
    assert!(stat.modified.is_some());
    assert!(source.exists("a.bin").await.unwrap());
}

#[tokio::test]
async fn test_missing_file_is_not_found() {
    let server = FileServer::default();
    let source = remote(&server.start().await);

    assert!(!source.exists("missing.mkv").await.unwrap());

    let err = source.stat("missing.mkv").await.unwrap_err();
    assert!(matches!(err.kind(), MarqueeErrorKind::Storage(e) if e.is_not_found()));

    let err = source.read_all("missing.mkv").await.unwrap_err();
    assert!(matches!(err.kind(), MarqueeErrorKind::Storage(e) if e.is_not_found()));
}

#[tokio::test]
async fn test_write_all_uploads_with_put() {
    let server = FileServer::default();
    let source = remote(&server.start().await);

    source
        .write_all("Artwork/poster.jpg", b"jpeg bytes")
        .await
        .unwrap();

    assert_eq!(server.stored("Artwork/poster.jpg").unwrap(), b"jpeg bytes");
    assert_eq!(
        source.read_all("Artwork/poster.jpg").await.unwrap(),
        b"jpeg bytes"
    );
}
