//! # Serialización de Respuestas
//! src/http/writer.rs
//!
//! Convierte una `Response` al formato del wire:
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Date: Sun, 06 Nov 1994 08:49:37 GMT\r\n
//! Server: http_engine/0.1\r\n
//! Content-Length: 5\r\n
//! \r\n
//! hello
//! ```
//!
//! `Content-Length` se recalcula siempre desde el body real y pisa lo que
//! haya puesto el handler; `Date` y `Server` solo se agregan si faltan.
//! Status line y headers se codifican en ISO-8859-1; el body se copia tal cual.
//! CR y LF dentro de reason phrase, nombres o valores salen como espacio, así
//! que un handler no puede inyectar líneas de header.

use super::{Headers, Response};
use std::io::{self, Write};
use std::time::SystemTime;

/// Serializa respuestas hacia un stream
#[derive(Debug, Clone)]
pub struct ResponseWriter {
    server_name: String,
}

impl ResponseWriter {
    pub fn new(server_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
        }
    }

    /// Escribe la respuesta completa y hace flush
    ///
    /// Con `include_body = false` (respuestas a HEAD) se omiten los bytes del
    /// body pero `Content-Length` sigue reflejando su tamaño real.
    ///
    /// # Ejemplo
    /// ```
    /// use http_engine::http::{Response, ResponseWriter};
    ///
    /// let writer = ResponseWriter::new("test/1.0");
    /// let response = Response::builder(200, "OK").body("hello").build();
    ///
    /// let mut out = Vec::new();
    /// writer.write(&mut out, &response, false).unwrap();
    ///
    /// let text = String::from_utf8(out).unwrap();
    /// assert!(text.contains("Content-Length: 5\r\n"));
    /// assert!(text.ends_with("\r\n\r\n"));
    /// ```
    pub fn write<W: Write>(&self, out: &mut W, response: &Response, include_body: bool) -> io::Result<()> {
        let bytes = self.to_bytes(response, include_body);
        out.write_all(&bytes)?;
        out.flush()
    }

    /// Arma el mensaje completo en memoria
    pub fn to_bytes(&self, response: &Response, include_body: bool) -> Vec<u8> {
        let headers = self.framing_headers(response);
        let mut result = Vec::with_capacity(256 + response.body().len());

        // 1. Status line
        let status_line = format!("HTTP/1.1 {} ", response.status_code());
        push_latin1(&mut result, &status_line);
        push_latin1(&mut result, response.reason_phrase());
        result.extend_from_slice(b"\r\n");

        // 2. Headers
        for (name, value) in headers.iter() {
            push_latin1(&mut result, name);
            result.extend_from_slice(b": ");
            push_latin1(&mut result, value);
            result.extend_from_slice(b"\r\n");
        }

        // 3. Línea vacía
        result.extend_from_slice(b"\r\n");

        // 4. Body
        if include_body {
            result.extend_from_slice(response.body());
        }

        result
    }

    /// Headers del handler más Date, Server y el Content-Length autoritativo
    fn framing_headers(&self, response: &Response) -> Headers {
        let mut headers = response.headers().clone();
        headers.insert_if_absent("Date", httpdate::fmt_http_date(SystemTime::now()));
        headers.insert_if_absent("Server", self.server_name.clone());

        headers.remove("Content-Length");
        headers.insert("Content-Length", response.body().len().to_string());
        headers
    }
}

/// Codifica texto en ISO-8859-1; lo que no cabe en un byte sale como '?'
fn push_latin1(out: &mut Vec<u8>, text: &str) {
    out.extend(text.chars().map(|c| match c {
        '\r' | '\n' => b' ',
        _ => u8::try_from(u32::from(c)).unwrap_or(b'?'),
    }));
}
