//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración fija al arrancar (no se recarga). Cada opción se puede dar
//! por argumento CLI o por variable de entorno. Los componentes del motor
//! reciben una copia inmutable al construirse, así que se pueden levantar
//! varias instancias con configuraciones distintas (los tests lo hacen).
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./http_engine --port 8080 \
//!   --workers 8 \
//!   --socket-timeout-ms 15000 \
//!   --keep-alive-max-requests 100
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_HOST=0.0.0.0 ./http_engine
//! ```

use crate::error::ServerError;
use crate::http::parser::ParserLimits;
use clap::Parser;
use std::time::Duration;

/// Configuración del motor HTTP
#[derive(Debug, Clone, Parser)]
#[command(name = "http_engine")]
#[command(about = "Motor HTTP/1.0-1.1 con keep-alive y pool fijo de workers")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = puerto efímero)
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Tamaño de la cola de conexiones pendientes del sistema operativo
    #[arg(long, default_value = "128", env = "ACCEPT_BACKLOG")]
    pub backlog: u32,

    // === Workers ===

    /// Número fijo de threads que atienden conexiones
    #[arg(long = "workers", default_value_t = default_worker_threads(), env = "WORKERS")]
    pub worker_threads: usize,

    // === Timeouts ===

    /// Timeout de lectura por conexión en milisegundos (cierra conexiones ociosas)
    #[arg(long = "socket-timeout-ms", default_value = "15000", env = "SOCKET_TIMEOUT_MS")]
    pub socket_timeout_ms: u64,

    /// Timeout keep-alive anunciado al cliente en milisegundos
    #[arg(long = "keep-alive-timeout-ms", default_value = "15000", env = "KEEP_ALIVE_TIMEOUT_MS")]
    pub keep_alive_timeout_ms: u64,

    /// Máximo de requests atendidos en una misma conexión
    #[arg(long = "keep-alive-max-requests", default_value = "100", env = "KEEP_ALIVE_MAX_REQUESTS")]
    pub keep_alive_max_requests: usize,

    /// Tiempo de gracia para que terminen los workers al detener el servidor
    #[arg(long = "shutdown-grace-ms", default_value = "5000", env = "SHUTDOWN_GRACE_MS")]
    pub shutdown_grace_ms: u64,

    /// Intervalo con el que el loop de accept revisa si debe detenerse
    #[arg(long = "accept-poll-ms", default_value = "50", env = "ACCEPT_POLL_MS")]
    pub accept_poll_ms: u64,

    // === Límites del parser ===

    /// Largo máximo de la request line en bytes
    #[arg(long = "max-request-line", default_value = "8192", env = "MAX_REQUEST_LINE")]
    pub max_request_line: usize,

    /// Largo máximo de una línea de header en bytes
    #[arg(long = "max-header-line", default_value = "8192", env = "MAX_HEADER_LINE")]
    pub max_header_line: usize,

    /// Cantidad máxima de headers distintos
    #[arg(long = "max-headers", default_value = "100", env = "MAX_HEADERS")]
    pub max_headers: usize,

    /// Tamaño máximo de toda la sección de headers en bytes
    #[arg(long = "max-header-section", default_value = "32768", env = "MAX_HEADER_SECTION")]
    pub max_header_section: usize,

    /// Tamaño máximo del body (Content-Length) en bytes
    #[arg(long = "max-body-size", default_value = "1048576", env = "MAX_BODY_SIZE")]
    pub max_body_size: u64,

    /// Identificador que se envía en el header Server
    #[arg(long = "server-name", default_value = DEFAULT_SERVER_NAME, env = "SERVER_NAME")]
    pub server_name: String,
}

/// Valor por defecto del header `Server`
pub const DEFAULT_SERVER_NAME: &str = "http_engine/0.1";

/// Workers por defecto: el doble de los núcleos, mínimo 4
pub fn default_worker_threads() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cores * 2).max(4)
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use http_engine::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn socket_timeout(&self) -> Duration {
        Duration::from_millis(self.socket_timeout_ms)
    }

    pub fn keep_alive_timeout(&self) -> Duration {
        Duration::from_millis(self.keep_alive_timeout_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    pub fn accept_poll_interval(&self) -> Duration {
        Duration::from_millis(self.accept_poll_ms)
    }

    /// Límites que aplica el parser a cada request
    pub fn parser_limits(&self) -> ParserLimits {
        ParserLimits {
            max_request_line: self.max_request_line,
            max_header_line: self.max_header_line,
            max_headers: self.max_headers,
            max_header_section: self.max_header_section,
            max_body_size: self.max_body_size,
        }
    }

    /// Valida la configuración
    ///
    /// Retorna error si algún tamaño o timeout es cero
    pub fn validate(&self) -> Result<(), ServerError> {
        let checks: [(bool, &str); 10] = [
            (self.worker_threads == 0, "workers must be >= 1"),
            (self.backlog == 0, "backlog must be >= 1"),
            (self.socket_timeout_ms == 0, "socket timeout must be > 0"),
            (self.accept_poll_ms == 0, "accept poll interval must be > 0"),
            (self.keep_alive_max_requests == 0, "keep-alive max requests must be >= 1"),
            (self.max_request_line == 0, "max request line must be > 0"),
            (self.max_header_line == 0, "max header line must be > 0"),
            (self.max_headers == 0, "max headers must be >= 1"),
            (self.max_header_section == 0, "max header section must be > 0"),
            (self.server_name.trim().is_empty(), "server name must not be empty"),
        ];

        match checks.iter().find(|(failed, _)| *failed) {
            Some((_, message)) => Err(ServerError::Config(message.to_string())),
            None => Ok(()),
        }
    }

    /// Registra un resumen de la configuración efectiva
    pub fn log_summary(&self) {
        tracing::info!(
            address = %self.address(),
            backlog = self.backlog,
            workers = self.worker_threads,
            "network"
        );
        tracing::info!(
            socket_timeout_ms = self.socket_timeout_ms,
            keep_alive_timeout_ms = self.keep_alive_timeout_ms,
            keep_alive_max_requests = self.keep_alive_max_requests,
            shutdown_grace_ms = self.shutdown_grace_ms,
            "connections"
        );
        tracing::info!(
            max_request_line = self.max_request_line,
            max_header_line = self.max_header_line,
            max_headers = self.max_headers,
            max_header_section = self.max_header_section,
            max_body_size = self.max_body_size,
            "parser limits"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            backlog: 128,
            worker_threads: default_worker_threads(),
            socket_timeout_ms: 15_000,
            keep_alive_timeout_ms: 15_000,
            keep_alive_max_requests: 100,
            shutdown_grace_ms: 5_000,
            accept_poll_ms: 50,
            max_request_line: 8 * 1024,
            max_header_line: 8 * 1024,
            max_headers: 100,
            max_header_section: 32 * 1024,
            max_body_size: 1024 * 1024,
            server_name: DEFAULT_SERVER_NAME.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.backlog, 128);
        assert!(config.worker_threads >= 4);
        assert_eq!(config.keep_alive_max_requests, 100);
        assert_eq!(config.server_name, DEFAULT_SERVER_NAME);
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "0.0.0.0".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_durations() {
        let config = Config::default();
        assert_eq!(config.socket_timeout(), Duration::from_secs(15));
        assert_eq!(config.keep_alive_timeout(), Duration::from_secs(15));
        assert_eq!(config.shutdown_grace(), Duration::from_secs(5));
    }

    #[test]
    fn test_parser_limits_follow_config() {
        let mut config = Config::default();
        config.max_headers = 7;
        config.max_body_size = 10;
        let limits = config.parser_limits();
        assert_eq!(limits.max_headers, 7);
        assert_eq!(limits.max_body_size, 10);
        assert_eq!(limits.max_request_line, 8192);
    }

    #[test]
    fn test_validate_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_workers() {
        let mut config = Config::default();
        config.worker_threads = 0;
        assert_matches!(config.validate(), Err(ServerError::Config(msg)) if msg.contains("workers"));
    }

    #[test]
    fn test_validate_invalid_max_requests() {
        let mut config = Config::default();
        config.keep_alive_max_requests = 0;
        assert_matches!(config.validate(), Err(ServerError::Config(msg)) if msg.contains("keep-alive"));
    }

    #[test]
    fn test_validate_zero_header_section() {
        let mut config = Config::default();
        config.max_header_section = 0;
        assert_matches!(config.validate(), Err(ServerError::Config(msg)) if msg.contains("header section"));
    }

    #[test]
    fn test_validate_empty_server_name() {
        let mut config = Config::default();
        config.server_name = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_from_args() {
        let config = Config::try_parse_from([
            "http_engine",
            "--port",
            "9000",
            "--workers",
            "3",
            "--max-headers",
            "20",
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.worker_threads, 3);
        assert_eq!(config.max_headers, 20);
        assert_eq!(config.max_header_line, 8192);
    }

    #[test]
    fn test_default_worker_threads_minimum() {
        assert!(default_worker_threads() >= 4);
    }
}
