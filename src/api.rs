//! The Edo-AI JSON API: routing as a pure function plus a small blocking
//! HTTP server around it.

use crate::config::{HaikuLang, ServerConfig};
use crate::error::{Error, Result};
use crate::haiku;
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::Read;
use tiny_http::{Header, Request, Response, Server};

pub const GREETING: &str = "Hello from Edo-AI!";
/// Appended to the visitor's words to make them sound like an Edo samurai
pub const EDO_SUFFIX: &str = "でござる";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }
}

#[derive(Deserialize, Default)]
struct GrowRequest {
    #[serde(default)]
    text: String,
}

/// Dispatch one request. `body` is ignored except by `POST /api/grow`.
pub fn route<R: Rng + ?Sized>(method: &str, path: &str, body: &str, lang: HaikuLang, rng: &mut R) -> ApiResponse {
    let path = path.split('?').next().unwrap_or(path).trim_end_matches('/');

    let allowed = match path {
        "/api/hello" | "/api/haiku" => "GET",
        "/api/grow" => "POST",
        _ => return ApiResponse::error(404, "not found"),
    };
    if !method.eq_ignore_ascii_case(allowed) {
        return ApiResponse::error(405, "method not allowed");
    }

    match path {
        "/api/hello" => ApiResponse::ok(json!({ "message": GREETING })),
        "/api/haiku" => ApiResponse::ok(json!({ "haiku": haiku::local_haiku(lang, rng) })),
        _ => {
            // a missing or unparsable body counts as empty text
            let request: GrowRequest = serde_json::from_str(body).unwrap_or_default();
            ApiResponse::ok(grow_response(&request.text, rng))
        }
    }
}

/// Body of a `/api/grow` reply
pub fn grow_response<R: Rng + ?Sized>(text: &str, rng: &mut R) -> Value {
    json!({
        "original": text,
        "edoText": edo_text(text),
        "growth": {
            "branches": rng.gen_range(1..=3),
            "length": growth_length(text),
        },
    })
}

pub fn edo_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}{}", trimmed, EDO_SUFFIX)
    }
}

/// 10 plus up to 10 more for longer text, saturating at 20 characters
pub fn growth_length(text: &str) -> f64 {
    let chars = text.chars().count() as f64;
    10.0 + (chars / 10.0).min(2.0) * 5.0
}

pub fn bind(addr: &str) -> Result<Server> {
    Server::http(addr).map_err(|e| Error::Server {
        addr: addr.to_string(),
        reason: e.to_string(),
    })
}

/// Answer one HTTP request
pub fn handle<R: Rng + ?Sized>(mut request: Request, lang: HaikuLang, rng: &mut R) -> Result<()> {
    let mut body = String::new();
    if let Err(e) = request.as_reader().read_to_string(&mut body) {
        log::debug!("unreadable request body: {}", e);
        body.clear();
    }

    let method = request.method().to_string();
    let url = request.url().to_string();
    let reply = route(&method, &url, &body, lang, rng);
    log::info!("{} {} -> {}", method, url, reply.status);

    let mut response = Response::from_string(reply.body.to_string()).with_status_code(reply.status);
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], &b"application/json; charset=utf-8"[..]) {
        response = response.with_header(header);
    }
    request.respond(response)?;
    Ok(())
}

/// Serve until the process is killed
pub fn serve(config: &ServerConfig) -> Result<()> {
    let server = bind(&config.bind)?;
    log::info!("serving Edo-AI API on http://{}", config.bind);

    let mut rng = rand::thread_rng();
    for request in server.incoming_requests() {
        if let Err(e) = handle(request, config.lang, &mut rng) {
            log::warn!("failed to answer request: {}", e);
        }
    }
    Ok(())
}
