//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Modelo de un thread por conexión con I/O bloqueante:
//!
//! 1. `Acceptor` escucha en un puerto y acepta conexiones
//! 2. Cada socket aceptado se encola en el `WorkerPool`
//! 3. Un `ConnectionWorker` atiende la conexión completa (keep-alive incluido)
//! 4. `ConnectionRegistry` permite cortar conexiones colgadas en el shutdown

pub mod acceptor;
pub mod pool;
pub mod registry;
pub mod worker;

// Re-exportar para facilitar el uso
pub use acceptor::Acceptor;
pub use pool::WorkerPool;
pub use registry::ConnectionRegistry;
pub use worker::ConnectionWorker;
