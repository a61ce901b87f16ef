//! # Módulo HTTP
//!
//! Implementa el protocolo HTTP/1.0 - 1.1 desde cero, sin usar librerías de
//! alto nivel. Incluye:
//!
//! - Valores inmutables `Request` y `Response` (con su builder)
//! - Parser que lee requests directamente del socket
//! - Writer que serializa respuestas con framing correcto
//! - Política keep-alive por conexión
//!
//! ### Formato de Request
//!
//! ```text
//! POST /echo HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! Content-Length: 5\r\n
//! \r\n
//! hello
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: application/json\r\n
//! Connection: keep-alive\r\n
//! Keep-Alive: timeout=15, max=100\r\n
//! Date: Sun, 06 Nov 1994 08:49:37 GMT\r\n
//! Server: http_engine/0.1\r\n
//! Content-Length: 13\r\n
//! \r\n
//! {"ok": true}
//! ```

pub mod headers;   // Mapa ordenado de headers
pub mod parser;    // Parsing de requests desde el stream
pub mod policy;    // Decisión keep-alive
pub mod request;   // Request parseado
pub mod response;  // Response y su builder
pub mod status;    // Códigos de estado HTTP
pub mod writer;    // Serialización de responses

// Re-exportamos los tipos principales para facilitar su uso
pub use headers::Headers;
pub use parser::{ParseError, ParseOutcome, ParserLimits, ReadError, RequestParser};
pub use policy::ConnectionPolicy;
pub use request::{Request, Version};
pub use response::{Response, ResponseBuilder};
pub use status::StatusCode;
pub use writer::ResponseWriter;
