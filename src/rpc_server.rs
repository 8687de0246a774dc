//! planlector RPC server: JSON-RPC over stdin/stdout for front-end integration.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"books.add", "params":{"title":"...","category":"theory","pages":200}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Requests are handled one at a time, to completion, in arrival order.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use anyhow::Context;
use serde_json::{json, Value};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use planlector::app::{App, AppPaths};
use planlector::rpc_handler::handle_method;

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self {
            window_start: Instant::now(),
            request_count: 0,
            max_per_second,
        }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env("PLANLECTOR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

fn send(out: &mut impl Write, value: &Value) -> io::Result<()> {
    writeln!(out, "{}", value)?;
    out.flush()
}

/// `PLANLECTOR_CONFIG` and `PLANLECTOR_LOCALES` override the settings file and
/// the translation directory.
fn app_paths() -> AppPaths {
    AppPaths {
        settings_path: std::env::var("PLANLECTOR_CONFIG").ok(),
        locales_dir: std::env::var("PLANLECTOR_LOCALES").ok().map(PathBuf::from),
        content_store: None,
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing()?;

    let app = Mutex::new(App::new(app_paths()).context("failed to initialize planlector")?);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    send(&mut out, &json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}))?;

    let mut rate_limiter = RateLimiter::new(200);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                send(&mut out, &json!({"id": null, "error": format!("parse error: {}", e)}))?;
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            send(&mut out, &json!({"id": id, "error": "rate limit exceeded"}))?;
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        debug!(method, "rpc request");
        let response = match handle_method(&app, method, &params) {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => {
                debug!(method, error = %err, "rpc request failed");
                json!({"id": id, "error": err})
            }
        };
        send(&mut out, &response)?;
    }

    Ok(())
}
