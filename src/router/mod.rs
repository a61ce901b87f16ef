//! # Handlers y Routing
//! src/router/mod.rs
//!
//! El motor solo conoce el trait `Handler`: recibe un `Request` y produce
//! una `Response` o un error. `Router` es una implementación que despacha
//! por método y path.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler → Response
//! ```
//!
//! Si el path no está registrado retorna 404; si está registrado para
//! otros métodos retorna 405 con el header `Allow`.

use crate::error::HandlerError;
use crate::http::{Request, Response, StatusCode};

/// Resultado de un handler
pub type HandlerResult = Result<Response, HandlerError>;

/// Capacidad inyectada en el servidor: Request → Response
///
/// Se invoca concurrentemente desde varios workers, por eso `Send + Sync`.
pub trait Handler: Send + Sync {
    fn handle(&self, request: &Request) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> HandlerResult + Send + Sync,
{
    fn handle(&self, request: &Request) -> HandlerResult {
        self(request)
    }
}

struct Route {
    method: String,
    path: String,
    handler: Box<dyn Handler>,
}

/// Router que mapea (método, path) a handlers
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta con su handler
    ///
    /// Registrar dos veces el mismo método y path reemplaza el handler.
    ///
    /// # Ejemplo
    /// ```
    /// use http_engine::router::{HandlerResult, Router};
    /// use http_engine::http::{Request, Response};
    ///
    /// fn hello_handler(_req: &Request) -> HandlerResult {
    ///     Ok(Response::json(r#"{"message": "Hello"}"#))
    /// }
    ///
    /// let mut router = Router::new();
    /// router.register("GET", "/hello", hello_handler);
    /// ```
    pub fn register<H: Handler + 'static>(&mut self, method: &str, path: &str, handler: H) {
        let method = method.to_ascii_uppercase();
        let path = normalize_path(path);
        let handler: Box<dyn Handler> = Box::new(handler);

        match self
            .routes
            .iter_mut()
            .find(|r| r.method == method && r.path == path)
        {
            Some(route) => route.handler = handler,
            None => self.routes.push(Route { method, path, handler }),
        }
    }

    pub fn get<H: Handler + 'static>(&mut self, path: &str, handler: H) {
        self.register("GET", path, handler);
    }

    pub fn post<H: Handler + 'static>(&mut self, path: &str, handler: H) {
        self.register("POST", path, handler);
    }

    /// Métodos registrados para un path, en orden de registro
    pub fn allowed_methods(&self, path: &str) -> Vec<&str> {
        let path = normalize_path(path);
        self.routes
            .iter()
            .filter(|r| r.path == path)
            .map(|r| r.method.as_str())
            .collect()
    }

    /// Cantidad de rutas registradas
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn find(&self, method: &str, path: &str) -> Option<&dyn Handler> {
        self.routes
            .iter()
            .find(|r| r.method.eq_ignore_ascii_case(method) && r.path == path)
            .map(|r| r.handler.as_ref())
    }
}

impl Handler for Router {
    fn handle(&self, request: &Request) -> HandlerResult {
        let path = normalize_path(request.path());

        let handler = self.find(request.method(), &path).or_else(|| {
            // HEAD usa la ruta GET; el writer no envía el body
            if request.is_head() {
                self.find("GET", &path)
            } else {
                None
            }
        });
        if let Some(handler) = handler {
            return handler.handle(request);
        }

        let allowed = self.allowed_methods(&path);
        if allowed.is_empty() {
            return Ok(Response::text(
                StatusCode::NotFound,
                &format!("Route not found: {}", path),
            ));
        }

        Ok(Response::with_status(StatusCode::MethodNotAllowed)
            .header("Allow", allowed.join(", "))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body("Method Not Allowed")
            .build())
    }
}

/// Agrega '/' inicial y quita el '/' final (excepto en la raíz)
fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    let mut normalized = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}
