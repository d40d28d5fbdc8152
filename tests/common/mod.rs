use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Minimal HTTP/1.1 file server that answers `Range` requests with 206.
pub struct TestServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
}

struct ServerState {
    body: Vec<u8>,
    fail_first: usize,
    ignore_range: bool,
    truncate_ranges: bool,
    requests: AtomicUsize,
    range_requests: AtomicUsize,
}

pub struct TestServerBuilder {
    body: Vec<u8>,
    fail_first: usize,
    ignore_range: bool,
    truncate_ranges: bool,
}

impl TestServerBuilder {
    /// Answer the first `count` requests with 503.
    pub fn fail_first(mut self, count: usize) -> Self {
        self.fail_first = count;
        self
    }

    /// Answer range requests with a plain 200.
    pub fn ignore_range(mut self) -> Self {
        self.ignore_range = true;
        self
    }

    /// Send only half of every range body before closing the connection.
    pub fn truncate_ranges(mut self) -> Self {
        self.truncate_ranges = true;
        self
    }

    pub async fn start(self) -> TestServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(ServerState {
            body: self.body,
            fail_first: self.fail_first,
            ignore_range: self.ignore_range,
            truncate_ranges: self.truncate_ranges,
            requests: AtomicUsize::new(0),
            range_requests: AtomicUsize::new(0),
        });
        {
            let state = state.clone();
            tokio::spawn(async move {
                while let Ok((socket, _)) = listener.accept().await {
                    tokio::spawn(handle_connection(socket, state.clone()));
                }
            });
        }
        TestServer { addr, state }
    }
}

impl TestServer {
    pub fn builder(body: Vec<u8>) -> TestServerBuilder {
        TestServerBuilder {
            body,
            fail_first: 0,
            ignore_range: false,
            truncate_ranges: false,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path)
    }

    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn range_requests(&self) -> usize {
        self.state.range_requests.load(Ordering::SeqCst)
    }
}

pub fn pattern(length: usize) -> Vec<u8> {
    (0..length).map(|i| (i % 251) as u8 ^ (i / 251 % 256) as u8).collect()
}

fn parse_range(value: &str) -> Option<(usize, usize)> {
    let (start, end) = value.strip_prefix("bytes=")?.split_once('-')?;
    Some((start.trim().parse().ok()?, end.trim().parse().ok()?))
}

async fn handle_connection(mut socket: TcpStream, state: Arc<ServerState>) {
    let mut request = Vec::new();
    let mut buffer = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buffer).await {
            Ok(0) | Err(_) => return,
            Ok(length) => request.extend_from_slice(&buffer[..length]),
        }
    }

    let text = String::from_utf8_lossy(&request).to_string();
    let range = text.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("range") {
            parse_range(value.trim())
        } else {
            None
        }
    });
    if range.is_some() {
        state.range_requests.fetch_add(1, Ordering::SeqCst);
    }

    let attempt = state.requests.fetch_add(1, Ordering::SeqCst);
    let body = &state.body;
    let (head, payload): (String, &[u8]) = if attempt < state.fail_first {
        ("HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string(), &[])
    } else {
        match range.filter(|_| !state.ignore_range) {
            Some((start, end)) => {
                let end = end.min(body.len() - 1);
                let slice = &body[start..=end];
                let head = format!(
                    "HTTP/1.1 206 Partial Content\r\nContent-Length: {}\r\nContent-Range: bytes {}-{}/{}\r\nConnection: close\r\n\r\n",
                    slice.len(), start, end, body.len()
                );
                let payload = if state.truncate_ranges { &slice[..slice.len() / 2] } else { slice };
                (head, payload)
            }
            None => {
                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                (head, body.as_slice())
            }
        }
    };

    // Clients routinely hang up early, e.g. after reading the probe headers.
    if socket.write_all(head.as_bytes()).await.is_err() {
        return;
    }
    let _ = socket.write_all(payload).await;
    let _ = socket.shutdown().await;
}
