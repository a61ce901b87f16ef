//! # Request HTTP
//! src/http/request.rs
//!
//! Valor inmutable que produce el parser (`http::parser`). Una vez
//! construido no se modifica; los handlers solo lo leen.
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD target VERSION`
//! 2. **Headers**: nombres en minúsculas, la última aparición gana
//! 3. **Body**: exactamente `Content-Length` bytes (puede ser vacío)

use super::Headers;

/// Versiones HTTP aceptadas por el parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Http10,
    Http11,
}

impl Version {
    /// Reconoce el token de versión de la request line
    ///
    /// # Ejemplo
    /// ```
    /// use http_engine::http::Version;
    ///
    /// assert_eq!(Version::from_token("HTTP/1.1"), Some(Version::Http11));
    /// assert_eq!(Version::from_token("HTTP/2.0"), None);
    /// ```
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "HTTP/1.0" => Some(Version::Http10),
            "HTTP/1.1" => Some(Version::Http11),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representa un request HTTP ya parseado
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Método tal como llegó (GET, HEAD, POST, ...)
    method: String,

    /// Request-target crudo, puede incluir query string
    target: String,

    version: Version,

    /// Headers con nombres en minúsculas
    headers: Headers,

    body: Vec<u8>,
}

impl Request {
    pub fn new(
        method: impl Into<String>,
        target: impl Into<String>,
        version: Version,
        headers: Headers,
        body: Vec<u8>,
    ) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
            version,
            headers,
            body,
        }
    }

    // === Métodos públicos para acceder a los campos ===

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request-target completo (ej: "/search?q=rust")
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Parte del target antes del '?'
    ///
    /// # Ejemplo
    /// ```
    /// use http_engine::http::{Headers, Request, Version};
    ///
    /// let request = Request::new("GET", "/search?q=rust", Version::Http10, Headers::new(), Vec::new());
    /// assert_eq!(request.path(), "/search");
    /// assert_eq!(request.query(), Some("q=rust"));
    /// ```
    pub fn path(&self) -> &str {
        match self.target.find('?') {
            Some(idx) => &self.target[..idx],
            None => &self.target,
        }
    }

    /// Query string sin el '?', si existe
    pub fn query(&self) -> Option<&str> {
        self.target.find('?').map(|idx| &self.target[idx + 1..])
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Obtiene un header sin distinguir mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// `true` si el método es HEAD (el body de la respuesta no se envía)
    pub fn is_head(&self) -> bool {
        self.method.eq_ignore_ascii_case("HEAD")
    }
}
