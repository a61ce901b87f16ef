//! # Worker de conexión
//! src/server/worker.rs
//!
//! Atiende un socket aceptado de punta a punta:
//!
//! ```text
//! ReadingRequest → Dispatching → WritingResponse ─┬─► ReadingRequest (keep-alive)
//!                                                 └─► Closed
//! ```
//!
//! - EOF limpio, timeout de inactividad o error de transporte: se cierra sin
//!   responder.
//! - Request mal formado: 400 en texto plano y se cierra.
//! - Error o panic del handler: 500 genérico; la conexión sigue según la
//!   política keep-alive.

use crate::config::Config;
use crate::http::{
    ConnectionPolicy, ParseError, ParseOutcome, ReadError, Request, RequestParser, Response,
    ResponseWriter, StatusCode,
};
use crate::router::Handler;
use std::io::{self, BufReader, Read};
use std::net::{Shutdown, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const LINGER_TIMEOUT: Duration = Duration::from_millis(500);
const LINGER_MAX_BYTES: u64 = 64 * 1024;

pub struct ConnectionWorker {
    stream: TcpStream,
    peer: String,
    handler: Arc<dyn Handler>,
    parser: RequestParser,
    writer: ResponseWriter,
    policy: ConnectionPolicy,
    idle_timeout: Duration,
}

impl ConnectionWorker {
    pub fn new(stream: TcpStream, handler: Arc<dyn Handler>, config: &Config) -> Self {
        let peer = stream
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        Self {
            stream,
            peer,
            handler,
            parser: RequestParser::new(config.parser_limits()),
            writer: ResponseWriter::new(config.server_name.clone()),
            policy: ConnectionPolicy::from_config(config),
            idle_timeout: config.socket_timeout(),
        }
    }

    /// Corre el loop de la conexión hasta cerrarla
    ///
    /// Retorna la cantidad de requests despachados al handler.
    pub fn run(self) -> usize {
        if let Err(e) = self.stream.set_read_timeout(Some(self.idle_timeout)) {
            warn!(peer = %self.peer, error = %e, "could not set read timeout");
            return 0;
        }

        // Un solo buffer por conexión: puede traer bytes del siguiente request
        let mut reader = BufReader::new(&self.stream);
        let mut served = 0;

        loop {
            let request = match self.parser.parse(&mut reader) {
                Ok(ParseOutcome::Request(request)) => request,
                Ok(ParseOutcome::EndOfConnection) => {
                    debug!(peer = %self.peer, "peer closed connection");
                    break;
                }
                Err(ReadError::Malformed(err)) => {
                    self.reject(&err);
                    break;
                }
                Err(err) if err.is_timeout() => {
                    debug!(peer = %self.peer, "idle timeout");
                    break;
                }
                Err(err) => {
                    debug!(peer = %self.peer, error = %err, "transport error while reading");
                    break;
                }
            };

            served += 1;
            let keep_alive = self.policy.should_keep_alive(&request, served);

            let mut builder = self.dispatch(&request).into_builder();
            self.policy.annotate(&mut builder, keep_alive);
            let response = builder.build();

            info!(
                peer = %self.peer,
                method = request.method(),
                target = request.target(),
                status = response.status_code(),
                keep_alive,
                "request served"
            );

            let mut out = &self.stream;
            if let Err(e) = self.writer.write(&mut out, &response, !request.is_head()) {
                debug!(peer = %self.peer, error = %e, "write failed");
                break;
            }

            if !keep_alive {
                break;
            }
        }

        debug!(peer = %self.peer, served, "connection closed");
        served
    }

    /// Invoca al handler; errores y panics se vuelven un 500 sin detalle
    fn dispatch(&self, request: &Request) -> Response {
        match panic::catch_unwind(AssertUnwindSafe(|| self.handler.handle(request))) {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                error!(peer = %self.peer, error = %err, "handler failed");
                internal_error()
            }
            Err(_) => {
                error!(peer = %self.peer, "handler panicked");
                internal_error()
            }
        }
    }

    /// Responde 400 si el socket sigue sano
    fn reject(&self, err: &ParseError) {
        match self.stream.take_error() {
            Ok(None) => {
                warn!(peer = %self.peer, reason = %err, "rejecting malformed request");
                let mut builder = Response::text(StatusCode::BadRequest, &err.to_string()).into_builder();
                self.policy.annotate(&mut builder, false);

                let mut out = &self.stream;
                match self.writer.write(&mut out, &builder.build(), true) {
                    Ok(()) => self.linger(),
                    Err(e) => debug!(peer = %self.peer, error = %e, "could not send 400"),
                }
            }
            Ok(Some(e)) | Err(e) => {
                debug!(peer = %self.peer, reason = %err, error = %e, "malformed request on broken socket");
            }
        }
    }

    /// Descarta lo que quede del request antes de cerrar
    ///
    /// Cerrar con bytes sin leer provoca un RST que puede borrar el 400 antes
    /// de que el cliente lo lea.
    fn linger(&self) {
        if self.stream.shutdown(Shutdown::Write).is_err() {
            return;
        }
        if self.stream.set_read_timeout(Some(LINGER_TIMEOUT)).is_err() {
            return;
        }
        let _ = io::copy(&mut (&self.stream).take(LINGER_MAX_BYTES), &mut io::sink());
    }
}

fn internal_error() -> Response {
    Response::text(StatusCode::InternalServerError, "Internal Server Error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::router::HandlerResult;
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread;

    fn ephemeral_listener() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").expect("bind")
    }

    fn echo_target(req: &Request) -> HandlerResult {
        Ok(Response::text(StatusCode::Ok, req.target()))
    }

    /// Acepta una conexión, corre el worker y retorna los requests servidos
    fn serve_one(
        config: Config,
        handler: Arc<dyn Handler>,
        client_bytes: &[u8],
        half_close: bool,
    ) -> (String, usize) {
        let listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            ConnectionWorker::new(stream, handler, &config).run()
        });

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(client_bytes).unwrap();
        if half_close {
            client.shutdown(Shutdown::Write).unwrap();
        }

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        let served = server.join().unwrap();
        (String::from_utf8_lossy(&buf).into_owned(), served)
    }

    #[test]
    fn test_http10_single_request_closes() {
        let (text, served) = serve_one(
            Config::default(),
            Arc::new(echo_target),
            b"GET /hello HTTP/1.0\r\n\r\n",
            false,
        );

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.ends_with("/hello"));
        assert_eq!(served, 1);
    }

    #[test]
    fn test_keep_alive_then_close() {
        let (text, served) = serve_one(
            Config::default(),
            Arc::new(echo_target),
            b"GET /a HTTP/1.1\r\nHost: x\r\n\r\nGET /b HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n",
            false,
        );

        assert_eq!(text.matches("HTTP/1.1 200 OK").count(), 2);
        assert!(text.contains("Keep-Alive: timeout=15, max=100\r\n"));
        assert!(text.ends_with("/b"));
        assert_eq!(served, 2);
    }

    #[test]
    fn test_missing_host_gets_400() {
        let (text, served) = serve_one(
            Config::default(),
            Arc::new(echo_target),
            b"GET / HTTP/1.1\r\n\r\n",
            false,
        );

        assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.ends_with("Missing Host header"));
        assert_eq!(served, 0);
    }

    #[test]
    fn test_truncated_body_gets_no_response() {
        let (text, served) = serve_one(
            Config::default(),
            Arc::new(echo_target),
            b"POST / HTTP/1.1\r\nHost: x\r\nContent-Length: 5\r\n\r\nabc",
            true,
        );

        assert!(text.is_empty());
        assert_eq!(served, 0);
    }

    #[test]
    fn test_handler_error_becomes_500_and_connection_continues() {
        let handler: Arc<dyn Handler> = Arc::new(|req: &Request| -> HandlerResult {
            if req.path() == "/fail" {
                Err(HandlerError::failed("secret detail"))
            } else {
                Ok(Response::text(StatusCode::Ok, "fine"))
            }
        });

        let (text, served) = serve_one(
            Config::default(),
            handler,
            b"GET /fail HTTP/1.1\r\nHost: x\r\n\r\nGET /ok HTTP/1.1\r\nHost: x\r\nConnection: close\r\n\r\n",
            false,
        );

        assert!(text.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(!text.contains("secret detail"));
        assert!(text.ends_with("fine"));
        assert_eq!(served, 2);
    }

    #[test]
    fn test_handler_panic_becomes_500() {
        let handler: Arc<dyn Handler> =
            Arc::new(|_req: &Request| -> HandlerResult { panic!("handler exploded") });

        let (text, _) = serve_one(
            Config::default(),
            handler,
            b"GET / HTTP/1.0\r\n\r\n",
            false,
        );

        assert!(text.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    }

    #[test]
    fn test_head_omits_body() {
        let (text, _) = serve_one(
            Config::default(),
            Arc::new(echo_target),
            b"HEAD /resource HTTP/1.0\r\n\r\n",
            false,
        );

        assert!(text.contains("Content-Length: 9\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_request_cap_closes_connection() {
        let mut config = Config::default();
        config.keep_alive_max_requests = 1;

        let (text, served) = serve_one(
            config,
            Arc::new(echo_target),
            b"GET /a HTTP/1.1\r\nHost: x\r\n\r\nGET /b HTTP/1.1\r\nHost: x\r\n\r\n",
            false,
        );

        assert_eq!(text.matches("HTTP/1.1 200 OK").count(), 1);
        assert!(text.contains("Connection: close\r\n"));
        assert_eq!(served, 1);
    }

    #[test]
    fn test_idle_timeout_closes_silently() {
        let mut config = Config::default();
        config.socket_timeout_ms = 100;

        let listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            ConnectionWorker::new(stream, Arc::new(echo_target), &config).run()
        });

        let mut client = TcpStream::connect(addr).unwrap();
        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();

        assert!(buf.is_empty());
        assert_eq!(server.join().unwrap(), 0);
    }
}
