//! # http_engine
//! src/lib.rs
//!
//! Motor de servidor HTTP/1.0 - 1.1 implementado desde cero sobre sockets
//! bloqueantes: un thread de accept y un pool fijo de workers, cada uno
//! atendiendo una conexión completa (keep-alive incluido).
//!
//! ## Arquitectura
//!
//! - `http`: Request, Response, parser, writer y política keep-alive
//! - `server`: Acceptor, pool de workers y loop por conexión
//! - `router`: Trait `Handler` y enrutamiento por método y path
//! - `commands`: Handlers de demostración usados por el binario
//! - `config`: Configuración por CLI y variables de entorno
//! - `logging`: Inicialización de `tracing`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use http_engine::config::Config;
//! use http_engine::http::{Response, StatusCode};
//! use http_engine::router::{HandlerResult, Router};
//! use http_engine::server::Acceptor;
//! use std::sync::Arc;
//!
//! let mut router = Router::new();
//! router.get("/", |_req: &http_engine::http::Request| -> HandlerResult {
//!     Ok(Response::text(StatusCode::Ok, "hola"))
//! });
//!
//! let acceptor = Acceptor::new(Config::default(), Arc::new(router));
//! acceptor.start().expect("Error al iniciar servidor");
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod router;
pub mod server;

pub use error::{HandlerError, ServerError};
