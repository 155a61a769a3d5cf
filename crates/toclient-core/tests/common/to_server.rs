//! Minimal HTTP/1.1 mock of the control-plane API for integration tests.
//!
//! Serves `/api/<version>/...` for a configurable set of versions (others get
//! 501), password login with a session cookie, `/ping`, and `/servers`
//! (304 when `If-Modified-Since` is sent). Every request path is logged.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "twelve";

#[derive(Default)]
struct State {
    versions: Vec<String>,
    session: Mutex<Option<String>>,
    logins: AtomicU32,
    log: Mutex<Vec<String>>,
}

/// Handle to a running mock server; it lives until the process exits.
#[derive(Clone)]
pub struct MockApi {
    pub url: String,
    state: Arc<State>,
}

impl MockApi {
    /// Paths of every request received so far, query included.
    pub fn paths(&self) -> Vec<String> {
        self.state.log.lock().unwrap().clone()
    }

    pub fn logins(&self) -> u32 {
        self.state.logins.load(Ordering::SeqCst)
    }

    /// Invalidate the current session so the next request gets 401.
    pub fn expire_session(&self) {
        *self.state.session.lock().unwrap() = None;
    }
}

/// Start a server that implements exactly `versions` (e.g. `["3.0"]`).
pub fn start(versions: &[&str]) -> MockApi {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(State {
        versions: versions.iter().map(|v| v.to_string()).collect(),
        ..State::default()
    });
    let server_state = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&server_state);
            thread::spawn(move || handle(stream, &state));
        }
    });
    MockApi {
        url: format!("http://127.0.0.1:{port}"),
        state,
    }
}

struct Request {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

fn read_request(stream: &TcpStream) -> Option<Request> {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    reader.read_line(&mut line).ok()?;
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.to_string();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).ok()? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }
    let len: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).ok()?;
    Some(Request {
        method,
        path,
        headers,
        body,
    })
}

fn handle(mut stream: TcpStream, state: &State) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let Some(req) = read_request(&stream) else {
        return;
    };
    state.log.lock().unwrap().push(req.path.clone());
    let (status, extra, body) = route(&req, state);
    let body = body.map(|b| b.to_string()).unwrap_or_default();
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n{extra}Connection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
}

fn alert(level: &str, text: &str) -> Option<Value> {
    Some(json!({ "alerts": [{ "level": level, "text": text }] }))
}

fn route(req: &Request, state: &State) -> (&'static str, String, Option<Value>) {
    let Some(rest) = req.path.strip_prefix("/api/") else {
        return ("404 Not Found", String::new(), None);
    };
    let (version, logical) = rest.split_once('/').unwrap_or((rest, ""));
    if !state.versions.iter().any(|v| v == version) {
        return ("501 Not Implemented", String::new(), alert("error", "not implemented"));
    }
    let logical = logical.split('?').next().unwrap_or("");

    if logical == "user/login" && req.method == "POST" {
        let creds: Value = serde_json::from_slice(&req.body).unwrap_or(Value::Null);
        if creds["u"] != USERNAME || creds["p"] != PASSWORD {
            return ("401 Unauthorized", String::new(), alert("error", "Invalid username or password."));
        }
        let n = state.logins.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("session{n}");
        *state.session.lock().unwrap() = Some(token.clone());
        let cookie = format!("Set-Cookie: mojolicious={token}; Path=/; Max-Age=3600; HttpOnly\r\n");
        return ("200 OK", cookie, alert("success", "Successfully logged in."));
    }

    let expected = state.session.lock().unwrap().clone();
    let presented = req.headers.get("cookie");
    let authorized = match (&expected, presented) {
        (Some(token), Some(cookie)) => cookie.contains(&format!("mojolicious={token}")),
        _ => false,
    };
    if !authorized {
        return ("401 Unauthorized", String::new(), alert("error", "Unauthorized, please log in."));
    }

    match logical {
        "ping" => ("200 OK", String::new(), Some(json!({ "ping": "pong" }))),
        "servers" if req.headers.contains_key("if-modified-since") => {
            ("304 Not Modified", String::new(), None)
        }
        "servers" => ("200 OK", String::new(), Some(json!({ "response": [{ "id": 1 }] }))),
        _ => ("404 Not Found", String::new(), alert("error", "Resource not found.")),
    }
}
