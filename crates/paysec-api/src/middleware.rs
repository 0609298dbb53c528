//! Request middleware: bearer auth, rate limiting and HTTPS enforcement

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use paysec_config::RateLimitConfig;
use paysec_core::{CoreError, ErrorContext};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::ApiError;
use crate::AppState;

// ==================== Auth ====================

/// Verify the bearer token and attach the caller's `Identity` to the request
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let identity = state
        .bank
        .verify_token(header)
        .map_err(|e| ApiError::logged(e, ErrorContext::new(&format!("auth {}", req.uri().path()))))?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

// ==================== Rate limiting ====================

struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by client address
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_secs))
    }

    /// Count a request from `client`; false once the window's budget is spent
    pub async fn check(&self, client: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        if windows.len() > 10_000 {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }
        entry.count += 1;
        entry.count <= self.max_requests
    }

    /// Human wording of the window, used in the 429 message
    pub fn window_text(&self) -> String {
        let secs = self.window.as_secs();
        if secs % 60 == 0 && secs >= 60 {
            let minutes = secs / 60;
            format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" })
        } else {
            format!("{} second{}", secs, if secs == 1 { "" } else { "s" })
        }
    }
}

/// Socket address when the server was started with connect info, then the
/// first `X-Forwarded-For` hop
fn client_key(req: &Request) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Result<Response, ApiError> {
    let limiter = match &state.limiter {
        Some(limiter) => limiter,
        None => return Ok(next.run(req).await),
    };

    let client = client_key(&req);
    if !limiter.check(&client).await {
        log::warn!("Rate limit exceeded for {} on {}", client, req.uri().path());
        return Err(ApiError::from(CoreError::RateLimited {
            window: limiter.window_text(),
        }));
    }
    Ok(next.run(req).await)
}

// ==================== Transport ====================

fn is_secure(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("https"))
        .unwrap_or(false)
}

/// In production, send plaintext requests to the same URL over HTTPS
pub async fn enforce_https(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if !state.config.enforce_https() || is_secure(req.headers()) {
        return next.run(req).await;
    }

    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    Redirect::temporary(&format!("https://{}{}", host, path)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_window() {
        let limiter = RateLimiter::new(2, Duration::from_secs(900));
        assert!(limiter.check("1.2.3.4").await);
        assert!(limiter.check("1.2.3.4").await);
        assert!(!limiter.check("1.2.3.4").await);
        assert!(limiter.check("5.6.7.8").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_resets() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check("c").await);
        assert!(!limiter.check("c").await);
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(limiter.check("c").await);
    }

    #[test]
    fn test_window_text() {
        assert_eq!(RateLimiter::new(1, Duration::from_secs(900)).window_text(), "15 minutes");
        assert_eq!(RateLimiter::new(1, Duration::from_secs(60)).window_text(), "1 minute");
        assert_eq!(RateLimiter::new(1, Duration::from_secs(30)).window_text(), "30 seconds");
    }

    #[test]
    fn test_client_key_from_forwarded_header() {
        let req = axum::http::Request::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(client_key(&req), "203.0.113.9");

        let req = axum::http::Request::builder().body(axum::body::Body::empty()).unwrap();
        assert_eq!(client_key(&req), "unknown");
    }
}
