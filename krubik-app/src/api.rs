//! HTTP client for the external solve endpoint.
use std::sync::Arc;

use krubik_model::{SolveResult, Source};
use log::{debug, info, warn};
use reqwest::cookie::Jar;
use reqwest::header::{HeaderName, ACCEPT_LANGUAGE};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;
use crate::csrf::CsrfTokens;
use crate::i18n::Language;

/// Message used when a successful response has the wrong shape.
pub const MALFORMED_RESPONSE: &str = "malformed response";

/// Failure to obtain a solution from the solver.
#[derive(Debug, Error)]
pub enum SolveError {
    /// The HTTP client could not be constructed.
    #[error("could not set up HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// The request or response could not be transferred.
    #[error("network error: {0}")]
    Transport(#[source] reqwest::Error),
    /// The solver answered with a non-success status.
    #[error("{message}")]
    Solver {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
    /// The solver answered with success but the body has the wrong shape.
    #[error("{}", MALFORMED_RESPONSE)]
    Protocol,
}

impl SolveError {
    /// Machine readable code supplied by the solver, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            SolveError::Solver { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct SolveRequest<'a> {
    state: &'a str,
}

#[derive(Deserialize)]
struct SolveResponse {
    moves: Vec<String>,
    source: Source,
}

/// Error bodies come either wrapped in `detail` or flat.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the solve endpoint. Cookies, including the CSRF cookie, are
/// kept for the lifetime of the client.
pub struct SolveClient {
    http: Client,
    url: Url,
    csrf_header: HeaderName,
    csrf: CsrfTokens,
}

impl SolveClient {
    pub fn new(config: &Config) -> Result<Self, SolveError> {
        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.timeout)
            .build()
            .map_err(SolveError::Client)?;
        Ok(SolveClient {
            http,
            url: config.api_url.clone(),
            csrf_header: config.csrf_header.clone(),
            csrf: CsrfTokens::new(jar, config),
        })
    }

    /// Submit a serialized state and wait for the solver's answer.
    pub async fn solve(&self, state: &str, language: Language) -> Result<SolveResult, SolveError> {
        let token = self.csrf.ensure_token();
        info!(
            "Requesting solution for a {} facelet state from {}",
            state.len(),
            self.url
        );
        let response = self
            .http
            .post(self.url.clone())
            .header(self.csrf_header.clone(), token)
            .header(ACCEPT_LANGUAGE, language.tag())
            .json(&SolveRequest { state })
            .send()
            .await
            .map_err(|e| {
                warn!("Solve request failed: {}", e);
                SolveError::Transport(e)
            })?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            warn!("Reading solve response failed: {}", e);
            SolveError::Transport(e)
        })?;
        interpret_response(status, &body)
    }
}

/// Map a response status and body to a solution or an error.
pub fn interpret_response(status: StatusCode, body: &[u8]) -> Result<SolveResult, SolveError> {
    if status.is_success() {
        return match serde_json::from_slice::<SolveResponse>(body) {
            Ok(parsed) => {
                debug!("Solver returned {} moves", parsed.moves.len());
                Ok(SolveResult::new(parsed.moves, parsed.source))
            }
            Err(e) => {
                warn!("Malformed solve response: {}", e);
                Err(SolveError::Protocol)
            }
        };
    }

    let (code, message) = match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => error_detail(parsed),
        Err(_) => (None, None),
    };
    let message = message.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    });
    warn!(
        "Solver rejected request with {}: {}{}",
        status,
        message,
        code.as_deref()
            .map(|c| format!(" ({})", c))
            .unwrap_or_default()
    );
    Err(SolveError::Solver {
        status,
        code,
        message,
    })
}

fn error_detail(body: ErrorBody) -> (Option<String>, Option<String>) {
    match body.detail {
        Some(Value::String(message)) => (None, Some(message)),
        Some(detail @ Value::Object(_)) => match serde_json::from_value::<ErrorDetail>(detail) {
            Ok(detail) => (detail.code, detail.message),
            Err(_) => (body.code, body.message),
        },
        _ => (body.code, body.message),
    }
}
