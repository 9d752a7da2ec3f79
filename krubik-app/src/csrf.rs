//! Anti-forgery token kept in a cookie and echoed in a request header.
use std::sync::{Arc, Mutex};

use log::debug;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_DAY};

/// Reads and lazily creates the CSRF cookie for the solve endpoint.
#[derive(Debug)]
pub struct CsrfTokens {
    jar: Arc<Jar>,
    url: Url,
    cookie: String,
    max_age: u64,
    // Held while checking and creating so concurrent callers agree on one token.
    create: Mutex<()>,
}

impl CsrfTokens {
    pub fn new(jar: Arc<Jar>, config: &Config) -> Self {
        CsrfTokens {
            jar,
            url: config.api_url.clone(),
            cookie: config.csrf_cookie.clone(),
            max_age: config.cookie_days.saturating_mul(SECONDS_PER_DAY),
            create: Mutex::new(()),
        }
    }

    /// The token currently stored in the cookie jar, if any.
    pub fn current(&self) -> Option<String> {
        let header = self.jar.cookies(&self.url)?;
        let header = header.to_str().ok()?;
        cookie_value(header, &self.cookie).map(str::to_string)
    }

    /// Return the stored token, generating and storing a new one on first use.
    pub fn ensure_token(&self) -> String {
        let _guard = self.create.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = self.current() {
            return token;
        }
        let token = Uuid::new_v4().to_string();
        let cookie = format!(
            "{}={}; Max-Age={}; Path=/; SameSite=Lax",
            self.cookie, token, self.max_age
        );
        self.jar.add_cookie_str(&cookie, &self.url);
        debug!("Generated new CSRF token cookie {}", self.cookie);
        token
    }
}

/// Find `name` in a `Cookie` header value.
fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name && !value.is_empty() {
            Some(value)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(jar: Arc<Jar>) -> CsrfTokens {
        CsrfTokens::new(jar, &Config::default())
    }

    #[test]
    fn parses_cookie_header() {
        assert_eq!(cookie_value("a=1; csrf_token=xyz; b=2", "csrf_token"), Some("xyz"));
        assert_eq!(cookie_value("csrf_token=", "csrf_token"), None);
        assert_eq!(cookie_value("other=1", "csrf_token"), None);
        assert_eq!(cookie_value("xcsrf_token=1", "csrf_token"), None);
    }

    #[test]
    fn token_created_once() {
        crate::setup();

        let jar = Arc::new(Jar::default());
        let csrf = tokens(Arc::clone(&jar));
        assert_eq!(csrf.current(), None);

        let first = csrf.ensure_token();
        assert_eq!(first.len(), 36);
        assert_eq!(csrf.ensure_token(), first);
        assert_eq!(csrf.current().as_deref(), Some(first.as_str()));

        let url = Url::parse("http://localhost:8000/other/path").unwrap();
        let header = jar.cookies(&url).unwrap();
        assert_eq!(header.to_str().unwrap(), format!("csrf_token={}", first));
    }

    #[test]
    fn existing_cookie_reused() {
        crate::setup();

        let jar = Arc::new(Jar::default());
        let url = Url::parse("http://localhost:8000/").unwrap();
        jar.add_cookie_str("csrf_token=from-server; Path=/", &url);

        let csrf = tokens(jar);
        assert_eq!(csrf.ensure_token(), "from-server");
    }
}
