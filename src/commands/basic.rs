//! # Comandos Básicos
//! src/commands/basic.rs
//!
//! - `GET /`: saludo en texto plano
//! - `GET /status`: estado del servidor en JSON
//! - `POST /echo`: devuelve el body recibido
//! - `GET /help`: lista de rutas disponibles

use crate::config::Config;
use crate::error::HandlerError;
use crate::http::{Request, Response, StatusCode};
use crate::router::{Handler, HandlerResult, Router};
use serde::Serialize;
use std::time::Instant;

/// Handler para `/`
pub fn root_handler(_req: &Request) -> HandlerResult {
    Ok(Response::text(StatusCode::Ok, "Hello from http_engine\n"))
}

/// Handler para `/echo`
///
/// Responde con el mismo body y el mismo `Content-Type` del request
/// (`application/octet-stream` si no vino ninguno).
pub fn echo_handler(req: &Request) -> HandlerResult {
    let content_type = req
        .header("content-type")
        .unwrap_or("application/octet-stream")
        .to_string();

    Ok(Response::with_status(StatusCode::Ok)
        .header("Content-Type", content_type)
        .body(req.body().to_vec())
        .build())
}

/// Handler para `/status`
///
/// # Ejemplo de response
/// ```json
/// {
///   "status": "running",
///   "server": "http_engine/0.1",
///   "version": "0.1.0",
///   "uptime_seconds": 123
/// }
/// ```
pub struct StatusCommand {
    started: Instant,
    server_name: String,
}

#[derive(Serialize)]
struct StatusBody<'a> {
    status: &'static str,
    server: &'a str,
    version: &'static str,
    uptime_seconds: u64,
}

impl StatusCommand {
    pub fn new(server_name: impl Into<String>) -> Self {
        Self {
            started: Instant::now(),
            server_name: server_name.into(),
        }
    }
}

impl Handler for StatusCommand {
    fn handle(&self, _req: &Request) -> HandlerResult {
        let body = StatusBody {
            status: "running",
            server: &self.server_name,
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds: self.started.elapsed().as_secs(),
        };
        json_response(&body)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

/// Handler para `/help`
pub struct HelpCommand {
    routes: Vec<RouteInfo>,
}

#[derive(Serialize)]
struct HelpBody<'a> {
    commands: &'a [RouteInfo],
}

impl HelpCommand {
    pub fn new(routes: Vec<RouteInfo>) -> Self {
        Self { routes }
    }
}

impl Handler for HelpCommand {
    fn handle(&self, _req: &Request) -> HandlerResult {
        json_response(&HelpBody {
            commands: &self.routes,
        })
    }
}

fn json_response<T: Serialize>(value: &T) -> HandlerResult {
    let body = serde_json::to_string_pretty(value)
        .map_err(|e| HandlerError::failed(format!("could not serialize response: {}", e)))?;
    Ok(Response::json(&body))
}

/// Rutas documentadas en `/help`
fn demo_routes() -> Vec<RouteInfo> {
    vec![
        RouteInfo {
            method: "GET",
            path: "/",
            description: "Plain-text greeting",
        },
        RouteInfo {
            method: "GET",
            path: "/status",
            description: "Server status and uptime",
        },
        RouteInfo {
            method: "POST",
            path: "/echo",
            description: "Echo the request body",
        },
        RouteInfo {
            method: "GET",
            path: "/help",
            description: "List available routes",
        },
    ]
}

/// Router con todos los comandos de demostración
pub fn demo_router(config: &Config) -> Router {
    let mut router = Router::new();
    router.get("/", root_handler);
    router.get("/status", StatusCommand::new(config.server_name.clone()));
    router.post("/echo", echo_handler);
    router.get("/help", HelpCommand::new(demo_routes()));
    router
}
