//! # Parser de Requests HTTP/1.0 - 1.1
//! src/http/parser.rs
//!
//! Lee un request directamente del stream del socket, byte a byte sobre un
//! `BufRead`, sin asumir que todo el request llegó en un solo `read`.
//!
//! ## Reglas de framing
//!
//! ```text
//! METHOD SP target SP HTTP/1.x CRLF     <- request line (3 tokens exactos)
//! name: value CRLF                      <- 0..N headers
//! CRLF                                  <- fin de headers
//! <Content-Length bytes>                <- body (solo Content-Length)
//! ```
//!
//! Cada violación produce una variante distinta de `ParseError`. Si el
//! stream se corta mientras se lee el body, el error es de transporte
//! (`ReadError::Transport`), no de protocolo. Un EOF limpio antes del
//! primer byte es el cierre normal de una conexión keep-alive
//! (`ParseOutcome::EndOfConnection`).
//!
//! No soporta chunked, trailers ni pipelining.

use super::{Headers, Request, Version};
use std::io::{self, BufRead, Read};
use thiserror::Error;

/// Límites que el parser aplica a cada request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserLimits {
    /// Largo máximo de la request line (sin CRLF)
    pub max_request_line: usize,
    /// Largo máximo de cada línea de header (sin CRLF)
    pub max_header_line: usize,
    /// Cantidad máxima de headers distintos
    pub max_headers: usize,
    /// Suma máxima del largo de todas las líneas de header
    pub max_header_section: usize,
    /// Content-Length máximo aceptado
    pub max_body_size: u64,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            max_request_line: 8 * 1024,
            max_header_line: 8 * 1024,
            max_headers: 100,
            max_header_section: 32 * 1024,
            max_body_size: 1024 * 1024,
        }
    }
}

/// Violaciones de protocolo detectadas al parsear
///
/// El mensaje de cada variante es el que recibe el cliente en el 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid request line")]
    InvalidRequestLine,

    #[error("Unsupported HTTP version")]
    UnsupportedVersion,

    #[error("Missing Host header")]
    MissingHost,

    #[error("Invalid header line")]
    InvalidHeader,

    #[error("Request line too long")]
    RequestLineTooLong,

    #[error("Header line too long")]
    HeaderLineTooLong,

    #[error("Too many headers")]
    TooManyHeaders,

    #[error("Header section too large")]
    HeaderSectionTooLarge,

    #[error("Invalid Content-Length")]
    InvalidContentLength,

    #[error("Request body too large")]
    BodyTooLarge,

    #[error("Unexpected EOF while reading headers")]
    UnexpectedEof,
}

impl ParseError {
    /// `true` para las violaciones de límites de tamaño o cantidad
    pub fn is_limit_exceeded(&self) -> bool {
        matches!(
            self,
            ParseError::RequestLineTooLong
                | ParseError::HeaderLineTooLong
                | ParseError::TooManyHeaders
                | ParseError::HeaderSectionTooLarge
                | ParseError::BodyTooLarge
        )
    }
}

/// Falla al leer un request: de protocolo o del socket
#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Malformed(#[from] ParseError),

    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
}

impl ReadError {
    /// `true` si el socket alcanzó el timeout de lectura
    pub fn is_timeout(&self) -> bool {
        match self {
            ReadError::Transport(err) => matches!(
                err.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
            ReadError::Malformed(_) => false,
        }
    }
}

/// Resultado exitoso de `RequestParser::parse`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Request(Request),
    /// El peer cerró la conexión antes de enviar otro request
    EndOfConnection,
}

/// Parser de requests con límites fijos
#[derive(Debug, Clone)]
pub struct RequestParser {
    limits: ParserLimits,
}

enum Scan {
    Done,
    More,
    TooLong,
}

impl RequestParser {
    pub fn new(limits: ParserLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &ParserLimits {
        &self.limits
    }

    /// Lee exactamente un request del stream
    ///
    /// Los bytes que sigan al body quedan sin consumir en el reader, listos
    /// para el siguiente ciclo keep-alive.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use http_engine::http::parser::{ParseOutcome, ParserLimits, RequestParser};
    /// use std::io::Cursor;
    ///
    /// let parser = RequestParser::new(ParserLimits::default());
    /// let mut input = Cursor::new(&b"GET / HTTP/1.1\r\nHost: x\r\n\r\n"[..]);
    ///
    /// match parser.parse(&mut input).unwrap() {
    ///     ParseOutcome::Request(request) => assert_eq!(request.header("host"), Some("x")),
    ///     ParseOutcome::EndOfConnection => unreachable!(),
    /// }
    /// ```
    pub fn parse<R: BufRead>(&self, reader: &mut R) -> Result<ParseOutcome, ReadError> {
        // 1. Request line
        let line = match read_line(reader, self.limits.max_request_line, ParseError::RequestLineTooLong)? {
            Some(line) => latin1(&line),
            None => return Ok(ParseOutcome::EndOfConnection),
        };
        let (method, target, version) = parse_request_line(&line)?;

        // 2. Headers
        let headers = self.read_headers(reader)?;
        if version == Version::Http11 && !headers.contains("host") {
            return Err(ParseError::MissingHost.into());
        }

        // 3. Body (solo Content-Length)
        let content_length = self.content_length(headers.get("content-length"))?;
        let mut body = vec![0u8; content_length];
        if content_length > 0 {
            reader.read_exact(&mut body)?;
        }

        Ok(ParseOutcome::Request(Request::new(
            method, target, version, headers, body,
        )))
    }

    fn read_headers<R: BufRead>(&self, reader: &mut R) -> Result<Headers, ReadError> {
        let mut headers = Headers::new();
        let mut total = 0usize;

        loop {
            let raw = read_line(reader, self.limits.max_header_line, ParseError::HeaderLineTooLong)?
                .ok_or(ParseError::UnexpectedEof)?;
            if raw.is_empty() {
                return Ok(headers);
            }

            total += raw.len();
            if total > self.limits.max_header_section {
                return Err(ParseError::HeaderSectionTooLarge.into());
            }

            let line = latin1(&raw);
            let colon = match line.find(':') {
                Some(idx) if idx > 0 => idx,
                _ => return Err(ParseError::InvalidHeader.into()),
            };
            let name = trim_ows(&line[..colon]).to_ascii_lowercase();
            if name.is_empty() {
                return Err(ParseError::InvalidHeader.into());
            }
            let value = trim_ows(&line[colon + 1..]);

            // Un nombre repetido sobrescribe y no cuenta contra el límite
            if headers.len() >= self.limits.max_headers && !headers.contains(&name) {
                return Err(ParseError::TooManyHeaders.into());
            }
            headers.insert(name, value);
        }
    }

    fn content_length(&self, value: Option<&str>) -> Result<usize, ParseError> {
        let value = match value {
            Some(v) if !v.is_empty() => v,
            _ => return Ok(0),
        };
        let length: u64 = value.parse().map_err(|_| ParseError::InvalidContentLength)?;
        if length > self.limits.max_body_size {
            return Err(ParseError::BodyTooLarge);
        }
        usize::try_from(length).map_err(|_| ParseError::BodyTooLarge)
    }
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new(ParserLimits::default())
    }
}

/// Separa la request line en método, target y versión
fn parse_request_line(line: &str) -> Result<(String, String, Version), ParseError> {
    let parts: Vec<&str> = line.split(' ').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(ParseError::InvalidRequestLine);
    }
    let version = Version::from_token(parts[2]).ok_or(ParseError::UnsupportedVersion)?;
    Ok((parts[0].to_string(), parts[1].to_string(), version))
}

/// Lee una línea terminada en CRLF
///
/// Retorna `None` si el stream termina antes de leer cualquier byte. Un CR
/// que no va seguido de LF se conserva como contenido.
fn read_line<R: BufRead>(
    reader: &mut R,
    max_len: usize,
    too_long: ParseError,
) -> Result<Option<Vec<u8>>, ReadError> {
    let mut line = Vec::new();
    let mut pending_cr = false;

    loop {
        let (consumed, scan) = {
            let available = match reader.fill_buf() {
                Ok(bytes) => bytes,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(ReadError::Transport(err)),
            };
            if available.is_empty() {
                if line.is_empty() && !pending_cr {
                    return Ok(None);
                }
                return Err(ParseError::UnexpectedEof.into());
            }
            scan_line(available, &mut line, &mut pending_cr, max_len)
        };
        reader.consume(consumed);

        match scan {
            Scan::Done => return Ok(Some(line)),
            Scan::TooLong => return Err(too_long.into()),
            Scan::More => {}
        }
    }
}

fn scan_line(available: &[u8], line: &mut Vec<u8>, pending_cr: &mut bool, max_len: usize) -> (usize, Scan) {
    for (idx, &byte) in available.iter().enumerate() {
        if *pending_cr {
            *pending_cr = false;
            if byte == b'\n' {
                return (idx + 1, Scan::Done);
            }
            line.push(b'\r');
        }
        if byte == b'\r' {
            *pending_cr = true;
        } else {
            line.push(byte);
        }
        if line.len() > max_len {
            return (idx + 1, Scan::TooLong);
        }
    }
    (available.len(), Scan::More)
}

/// Decodifica ISO-8859-1: cada byte es un char, sin pérdidas
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn trim_ows(s: &str) -> &str {
    s.trim_matches(|c| c == ' ' || c == '\t')
}
