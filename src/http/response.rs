//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Una `Response` es inmutable; se arma con `ResponseBuilder` y se congela
//! con `build()`. El `Content-Length` que ponga el handler no importa: el
//! writer (`http::writer`) lo recalcula siempre a partir del body.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use http_engine::http::{Response, StatusCode};
//!
//! let response = Response::builder(200, "OK")
//!     .header("Content-Type", "application/json")
//!     .body(r#"{"message": "Hello"}"#)
//!     .build();
//!
//! assert_eq!(response.status_code(), 200);
//! assert_eq!(Response::text(StatusCode::NotFound, "nope").status_code(), 404);
//! ```

use super::{Headers, StatusCode};

/// Respuesta HTTP congelada
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status_code: u16,
    reason_phrase: String,
    headers: Headers,
    body: Vec<u8>,
}

/// Acumula status, headers y body antes de congelar la respuesta
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    status_code: u16,
    reason_phrase: String,
    headers: Headers,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status_code: u16, reason_phrase: impl Into<String>) -> Self {
        Self {
            status_code,
            reason_phrase: reason_phrase.into(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header; si ya existe se sobrescribe
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Versión mutable de `header`, útil cuando el builder se pasa por referencia
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name, value);
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.remove(name);
    }

    /// Reemplaza el body completo
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Response {
        Response {
            status_code: self.status_code,
            reason_phrase: self.reason_phrase,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Inicia un builder con cualquier código y reason phrase
    pub fn builder(status_code: u16, reason_phrase: impl Into<String>) -> ResponseBuilder {
        ResponseBuilder::new(status_code, reason_phrase)
    }

    /// Builder para uno de los códigos conocidos
    pub fn with_status(status: StatusCode) -> ResponseBuilder {
        ResponseBuilder::new(status.as_u16(), status.reason_phrase())
    }

    /// Respuesta en texto plano UTF-8
    pub fn text(status: StatusCode, body: &str) -> Self {
        Self::with_status(status)
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .build()
    }

    /// Respuesta JSON exitosa (200 OK)
    ///
    /// # Ejemplo
    /// ```
    /// use http_engine::http::Response;
    ///
    /// let response = Response::json(r#"{"status": "ok"}"#);
    /// assert_eq!(response.header("content-type"), Some("application/json"));
    /// ```
    pub fn json(body: &str) -> Self {
        Self::with_status(StatusCode::Ok)
            .header("Content-Type", "application/json")
            .body(body)
            .build()
    }

    /// Respuesta de error con formato `{"error": "mensaje"}`
    pub fn error(status: StatusCode, message: &str) -> Self {
        let body = serde_json::json!({ "error": message }).to_string();
        Self::with_status(status)
            .header("Content-Type", "application/json")
            .body(body)
            .build()
    }

    /// Vuelve a abrir la respuesta como builder, conservando todo su contenido
    pub fn into_builder(self) -> ResponseBuilder {
        ResponseBuilder {
            status_code: self.status_code,
            reason_phrase: self.reason_phrase,
            headers: self.headers,
            body: self.body,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn reason_phrase(&self) -> &str {
        &self.reason_phrase
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_response_is_empty() {
        let response = Response::builder(204, "No Content").build();
        assert_eq!(response.status_code(), 204);
        assert_eq!(response.reason_phrase(), "No Content");
        assert!(response.headers().is_empty());
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_header_overwrite() {
        let response = Response::builder(200, "OK")
            .header("Content-Type", "text/plain")
            .header("content-type", "text/html")
            .build();

        assert_eq!(response.headers().len(), 1);
        assert_eq!(response.header("Content-Type"), Some("text/html"));
    }

    #[test]
    fn test_body_replaced_wholesale() {
        let response = Response::builder(200, "OK")
            .body("first body")
            .body(vec![0x00, 0xFF])
            .build();

        assert_eq!(response.body(), &[0x00, 0xFF]);
    }

    #[test]
    fn test_text_response() {
        let response = Response::text(StatusCode::BadRequest, "Too many headers");
        assert_eq!(response.status_code(), 400);
        assert_eq!(response.reason_phrase(), "Bad Request");
        assert_eq!(response.body(), b"Too many headers");
    }

    #[test]
    fn test_error_response_escapes_message() {
        let response = Response::error(StatusCode::NotFound, "no \"such\" route");
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"], "no \"such\" route");
    }

    #[test]
    fn test_into_builder_keeps_content() {
        let original = Response::json(r#"{"a": 1}"#);
        let rebuilt = original.clone().into_builder().header("Connection", "close").build();

        assert_eq!(rebuilt.status_code(), original.status_code());
        assert_eq!(rebuilt.body(), original.body());
        assert_eq!(rebuilt.header("content-type"), Some("application/json"));
        assert_eq!(rebuilt.header("connection"), Some("close"));
    }
}
