//! Local HTTP responder standing in for the attestations API in tests

use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Canned response for one request path
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub link: Option<String>,
    pub body: String,
}

impl MockResponse {
    /// `200 OK` with a JSON body
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            link: None,
            body: body.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Add a `link` header
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    fn render(&self) -> String {
        let reason = StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown");
        let link = self
            .link
            .as_ref()
            .map(|link| format!("link: {}\r\n", link))
            .unwrap_or_default();
        format!(
            "HTTP/1.1 {} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\n{}connection: close\r\n\r\n{}",
            self.status,
            reason,
            self.body.len(),
            link,
            self.body
        )
    }
}

/// Minimal HTTP/1.1 server answering from a fixed route table
///
/// Unknown paths get a `404`. Every raw request head is recorded.
pub struct MockServer {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockServer {
    /// Bind to a free local port and serve `routes`
    ///
    /// `routes` receives the server's base URL so responses can link back to it.
    pub async fn start(
        routes: impl FnOnce(&str) -> HashMap<String, MockResponse>,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base = format!("http://{}", listener.local_addr()?);
        let routes = routes(&base);
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                if let Err(e) = respond(stream, &routes, &seen).await {
                    tracing::debug!("mock server connection failed: {}", e);
                }
            }
        });

        Ok(Self { base, requests })
    }

    /// Base URL, e.g. `http://127.0.0.1:40123`
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Raw request heads in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Request paths in arrival order
    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| request_path(request).to_string())
            .collect()
    }
}

async fn respond(
    mut stream: TcpStream,
    routes: &HashMap<String, MockResponse>,
    seen: &Mutex<Vec<String>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let request = String::from_utf8_lossy(&buf).to_string();
    let response = match routes.get(request_path(&request)) {
        Some(response) => response.render(),
        None => MockResponse::json("").with_status(404).render(),
    };
    if let Ok(mut seen) = seen.lock() {
        seen.push(request);
    }

    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn request_path(request: &str) -> &str {
    request.split_whitespace().nth(1).unwrap_or("")
}
