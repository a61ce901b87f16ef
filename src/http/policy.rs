//! # Política de conexiones persistentes
//! src/http/policy.rs
//!
//! Decide, después de cada request, si la conexión sigue abierta y qué
//! headers de conexión lleva la respuesta.
//!
//! | Versión  | Keep-alive si...                                             |
//! |----------|--------------------------------------------------------------|
//! | HTTP/1.1 | `Connection` no pide `close` y no se llegó al máximo         |
//! | HTTP/1.0 | `Connection` pide `keep-alive` y no se llegó al máximo       |

use super::{Request, ResponseBuilder, Version};
use crate::config::Config;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ConnectionPolicy {
    /// Timeout anunciado en el header Keep-Alive
    keep_alive_timeout: Duration,
    /// Requests por conexión antes de forzar el cierre
    max_requests: usize,
}

impl ConnectionPolicy {
    pub fn new(keep_alive_timeout: Duration, max_requests: usize) -> Self {
        Self {
            keep_alive_timeout,
            max_requests,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.keep_alive_timeout(), config.keep_alive_max_requests)
    }

    /// Decide si la conexión sigue abierta
    ///
    /// `requests_served` incluye el request actual.
    pub fn should_keep_alive(&self, request: &Request, requests_served: usize) -> bool {
        let under_cap = requests_served < self.max_requests;
        let connection = request.header("connection");

        match request.version() {
            Version::Http11 => !has_token(connection, "close") && under_cap,
            Version::Http10 => has_token(connection, "keep-alive") && under_cap,
        }
    }

    /// Agrega los headers de conexión a la respuesta
    pub fn annotate(&self, builder: &mut ResponseBuilder, keep_alive: bool) {
        if keep_alive {
            builder.set_header("Connection", "keep-alive");
            builder.set_header(
                "Keep-Alive",
                format!(
                    "timeout={}, max={}",
                    self.keep_alive_timeout.as_secs(),
                    self.max_requests
                ),
            );
        } else {
            builder.remove_header("Keep-Alive");
            builder.set_header("Connection", "close");
        }
    }
}

/// Busca un token en una lista separada por comas, sin distinguir mayúsculas
fn has_token(header: Option<&str>, token: &str) -> bool {
    header
        .map(|value| value.split(',').any(|t| t.trim().eq_ignore_ascii_case(token)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Headers, Response};

    fn policy() -> ConnectionPolicy {
        ConnectionPolicy::new(Duration::from_secs(15), 100)
    }

    fn request(version: Version, connection: Option<&str>) -> Request {
        let mut headers = Headers::new();
        headers.insert("host", "x");
        if let Some(value) = connection {
            headers.insert("connection", value);
        }
        Request::new("GET", "/", version, headers, Vec::new())
    }

    #[test]
    fn test_http11_default_keep_alive() {
        let req = request(Version::Http11, None);
        assert!(policy().should_keep_alive(&req, 1));
    }

    #[test]
    fn test_http11_close() {
        let req = request(Version::Http11, Some("close"));
        assert!(!policy().should_keep_alive(&req, 1));

        let req = request(Version::Http11, Some("Close"));
        assert!(!policy().should_keep_alive(&req, 1));
    }

    #[test]
    fn test_http11_cap_reached() {
        let req = request(Version::Http11, None);
        for served in 0..100 {
            assert!(policy().should_keep_alive(&req, served), "served={}", served);
        }
        assert!(!policy().should_keep_alive(&req, 100));
        assert!(!policy().should_keep_alive(&req, 150));
    }

    #[test]
    fn test_http10_default_close() {
        let req = request(Version::Http10, None);
        assert!(!policy().should_keep_alive(&req, 1));
    }

    #[test]
    fn test_http10_explicit_keep_alive() {
        let req = request(Version::Http10, Some("Keep-Alive"));
        assert!(policy().should_keep_alive(&req, 1));
        assert!(!policy().should_keep_alive(&req, 100));
    }

    #[test]
    fn test_connection_token_list() {
        let req = request(Version::Http11, Some("Upgrade, close"));
        assert!(!policy().should_keep_alive(&req, 1));

        let req = request(Version::Http10, Some("keep-alive, Upgrade"));
        assert!(policy().should_keep_alive(&req, 1));
    }

    #[test]
    fn test_annotate_keep_alive() {
        let mut builder = Response::builder(200, "OK");
        policy().annotate(&mut builder, true);
        let response = builder.build();

        assert_eq!(response.header("Connection"), Some("keep-alive"));
        assert_eq!(response.header("Keep-Alive"), Some("timeout=15, max=100"));
    }

    #[test]
    fn test_annotate_close_overrides_handler_header() {
        let mut builder = Response::builder(200, "OK")
            .header("connection", "keep-alive")
            .header("Keep-Alive", "timeout=1");
        policy().annotate(&mut builder, false);
        let response = builder.build();

        assert_eq!(response.header("Connection"), Some("close"));
        assert_eq!(response.header("Keep-Alive"), None);
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.keep_alive_max_requests = 2;
        config.keep_alive_timeout_ms = 3_500;
        let policy = ConnectionPolicy::from_config(&config);

        let mut builder = Response::builder(200, "OK");
        policy.annotate(&mut builder, true);
        assert_eq!(builder.build().header("keep-alive"), Some("timeout=3, max=2"));

        let req = request(Version::Http11, None);
        assert!(policy.should_keep_alive(&req, 1));
        assert!(!policy.should_keep_alive(&req, 2));
    }
}
