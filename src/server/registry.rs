//! # Registro de conexiones vivas
//! src/server/registry.rs
//!
//! Guarda un clon de cada socket aceptado mientras su worker lo atiende.
//! Al vencer el período de gracia del shutdown, `abort_all` cierra esos
//! sockets: el read bloqueado del worker retorna y el thread termina.

use std::collections::HashMap;
use std::io;
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

#[derive(Default)]
pub struct ConnectionRegistry {
    next_id: AtomicU64,
    sockets: Mutex<HashMap<u64, TcpStream>>,
}

/// Mantiene la conexión en el registro hasta que se suelta
pub struct Registration {
    id: u64,
    registry: Arc<ConnectionRegistry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(self: &Arc<Self>, stream: &TcpStream) -> io::Result<Registration> {
        let clone = stream.try_clone()?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.sockets().insert(id, clone);

        Ok(Registration {
            id,
            registry: Arc::clone(self),
        })
    }

    /// Conexiones que todavía están siendo atendidas
    pub fn len(&self) -> usize {
        self.sockets().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sockets().is_empty()
    }

    /// Cierra en ambos sentidos todos los sockets registrados
    ///
    /// Retorna cuántos sockets se cerraron.
    pub fn abort_all(&self) -> usize {
        let sockets = self.sockets();
        for (id, stream) in sockets.iter() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                trace!(connection = id, error = %e, "shutdown failed");
            }
        }
        sockets.len()
    }

    fn sockets(&self) -> MutexGuard<'_, HashMap<u64, TcpStream>> {
        self.sockets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.sockets().remove(&self.id);
    }
}
