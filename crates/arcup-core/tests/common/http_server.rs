//! Minimal HTTP/1.1 GET server for integration tests.
//!
//! Serves per-path responses that tests can change between runs, and records
//! every request (path and `User-Agent`) so tests can assert on what was fetched.
//! A path can be given a queue of responses; the last one repeats.

use std::collections::{HashMap, VecDeque};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Request {
    pub path: String,
    pub user_agent: Option<String>,
}

#[derive(Default)]
struct State {
    routes: HashMap<String, VecDeque<Response>>,
    requests: Vec<Request>,
}

pub struct TestServer {
    base_url: String,
    state: Arc<Mutex<State>>,
}

impl TestServer {
    /// Starts a server in a background thread. It runs until the process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(State::default()));
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            base_url: format!("http://127.0.0.1:{}/arcdps/x64/", port),
            state,
        }
    }

    /// Base URL ending in `/`, e.g. "http://127.0.0.1:12345/arcdps/x64/".
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Serves `body` with `status` for `name` under the base path.
    pub fn set(&self, name: &str, status: u16, body: impl Into<Vec<u8>>) {
        self.set_sequence(
            name,
            vec![Response {
                status,
                body: body.into(),
            }],
        );
    }

    /// Serves the responses in order; the last one repeats.
    pub fn set_sequence(&self, name: &str, responses: Vec<Response>) {
        let mut state = self.state.lock().unwrap();
        state
            .routes
            .insert(format!("/arcdps/x64/{}", name), responses.into());
    }

    /// Number of requests received for `name`.
    pub fn hits(&self, name: &str) -> usize {
        let path = format!("/arcdps/x64/{}", name);
        let state = self.state.lock().unwrap();
        state.requests.iter().filter(|r| r.path == path).count()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.state.lock().unwrap().requests.clone()
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    while !raw.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => raw.extend_from_slice(&buf[..n]),
        }
    }
    let request = match std::str::from_utf8(&raw) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, req) = parse_request(request);

    let response = {
        let mut state = state.lock().unwrap();
        let path = req.path.clone();
        state.requests.push(req);
        match state.routes.get_mut(&path) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
    };
    let response = response.unwrap_or(Response {
        status: 404,
        body: b"not found".to_vec(),
    });

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
        response.status,
        reason(response.status),
        response.body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&response.body);
    let _ = stream.flush();
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

/// Returns the method and the recorded request (path + User-Agent).
fn parse_request(request: &str) -> (&str, Request) {
    let mut lines = request.lines();
    let mut parts = lines.next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("").to_string();
    let mut user_agent = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("user-agent") {
                user_agent = Some(value.trim().to_string());
            }
        }
    }
    (method, Request { path, user_agent })
}
