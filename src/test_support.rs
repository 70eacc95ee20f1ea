use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use crate::activity::ActivityLog;
use crate::speech::{SpeechClient, SpeechError, SpeechRequest};

#[derive(Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActivityLog for MemoryLog {
    async fn info(&self, message: &str) {
        self.lines.lock().unwrap().push(format!("info: {message}"));
    }

    async fn error(&self, message: &str) {
        self.lines.lock().unwrap().push(format!("error: {message}"));
    }
}

/// Answers every call with the same result and remembers the requests.
pub struct MockClient {
    response: Result<Vec<u8>, SpeechError>,
    requests: Mutex<Vec<SpeechRequest>>,
}

impl MockClient {
    pub fn returning(bytes: &[u8]) -> Self {
        Self {
            response: Ok(bytes.to_vec()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: SpeechError) -> Self {
        Self {
            response: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechClient for MockClient {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, SpeechError> {
        self.requests.lock().unwrap().push(request.clone());
        self.response.clone()
    }
}

/// Answers the first HTTP request on a local port with `status` and `body`,
/// then yields the raw request text. Returns the base URL to point a client at.
pub async fn serve_once(status: &'static str, body: Vec<u8>) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/v1", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let head = format!(
            "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
            body.len()
        );
        socket.write_all(head.as_bytes()).await.unwrap();
        socket.write_all(&body).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (base_url, handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}
