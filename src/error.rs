//! # Errores del servidor
//! src/error.rs
//!
//! Errores que salen del motor hacia quien lo arranca, y el error que
//! pueden retornar los handlers. Los errores de parsing viven en
//! `http::parser` porque nunca escapan del worker.

use std::io;
use thiserror::Error;

/// Fallas al configurar o arrancar el servidor
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("worker pool is shut down")]
    PoolClosed,

    #[error("server I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Error que puede retornar un handler
///
/// El worker lo convierte siempre en un 500 genérico; el detalle solo
/// queda en el log.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("handler I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        HandlerError::Failed(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_message() {
        let err = ServerError::Bind {
            address: "127.0.0.1:80".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to bind 127.0.0.1:80: denied");
    }

    #[test]
    fn test_handler_error_from_io() {
        let err: HandlerError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, HandlerError::Io(_)));
        assert_eq!(HandlerError::failed("boom").to_string(), "boom");
    }
}
