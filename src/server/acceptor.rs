//! # Acceptor
//! src/server/acceptor.rs
//!
//! Dueño del socket que escucha y del pool de workers. El loop de accept
//! corre en el thread que llama a `start()`; `stop()` puede llamarse desde
//! cualquier otro thread.
//!
//! ## Shutdown
//!
//! 1. Se baja el flag `running` y se cierra el listener
//! 2. Se cierra la cola del pool
//! 3. Se espera el período de gracia
//! 4. Las conexiones que sigan abiertas se cortan con `shutdown(Both)`
//! 5. Los workers que aún no salen quedan desacoplados

use super::pool::WorkerPool;
use super::registry::ConnectionRegistry;
use super::worker::ConnectionWorker;
use crate::config::Config;
use crate::error::ServerError;
use crate::router::Handler;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Espera extra después de cortar los sockets
const FORCE_WAIT: Duration = Duration::from_secs(1);

#[derive(Default)]
struct Lifecycle {
    listener: Option<TcpListener>,
    pool: Option<WorkerPool>,
    local_addr: Option<SocketAddr>,
}

pub struct Acceptor {
    config: Config,
    handler: Arc<dyn Handler>,
    running: AtomicBool,
    lifecycle: Mutex<Lifecycle>,
    registry: Arc<ConnectionRegistry>,
}

impl Acceptor {
    pub fn new(config: Config, handler: Arc<dyn Handler>) -> Self {
        Self {
            config,
            handler,
            running: AtomicBool::new(false),
            lifecycle: Mutex::new(Lifecycle::default()),
            registry: Arc::new(ConnectionRegistry::new()),
        }
    }

    /// Hace bind y corre el loop de accept hasta que se llame a `stop()`
    ///
    /// Bloquea al thread que llama. Si el servidor ya está corriendo
    /// retorna `Ok(())` inmediatamente. Una configuración inválida se
    /// rechaza antes de abrir el socket.
    pub fn start(&self) -> Result<(), ServerError> {
        self.config.validate()?;

        if self.running.swap(true, Ordering::SeqCst) {
            debug!("start called on a running server");
            return Ok(());
        }

        let (listener, pool, local_addr) = match self.open() {
            Ok(resources) => resources,
            Err(e) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        {
            let mut state = self.lifecycle();
            state.local_addr = Some(local_addr);
            state.listener = Some(listener);
            state.pool = Some(pool);
        }

        info!(
            address = %local_addr,
            workers = self.config.worker_threads,
            backlog = self.config.backlog,
            "Server listening"
        );

        self.accept_loop();

        // Si el loop terminó sin pasar por stop(), drenamos aquí
        self.drain();
        Ok(())
    }

    /// Detiene el servidor; llamadas repetidas no hacen nada
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        info!("Stopping server");
        self.drain();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Dirección efectiva del listener (útil con puerto 0)
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.lifecycle().local_addr
    }

    /// Conexiones que algún worker está atendiendo o tiene en cola
    pub fn active_connections(&self) -> usize {
        self.registry.len()
    }

    fn open(&self) -> Result<(TcpListener, WorkerPool, SocketAddr), ServerError> {
        let listener = self.bind()?;
        let local_addr = listener.local_addr()?;
        let pool = WorkerPool::new(self.config.worker_threads)?;
        Ok((listener, pool, local_addr))
    }

    fn bind(&self) -> Result<TcpListener, ServerError> {
        let address = self.config.address();
        let bind_error = |source: io::Error| ServerError::Bind {
            address: address.clone(),
            source,
        };

        let addr = address
            .to_socket_addrs()
            .map_err(bind_error)?
            .next()
            .ok_or_else(|| bind_error(io::Error::new(io::ErrorKind::InvalidInput, "address did not resolve")))?;

        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
            .map_err(bind_error)?;
        socket.set_reuse_address(true).map_err(bind_error)?;
        socket.bind(&addr.into()).map_err(bind_error)?;
        socket
            .listen(i32::try_from(self.config.backlog).unwrap_or(i32::MAX))
            .map_err(bind_error)?;

        let listener: TcpListener = socket.into();
        // No bloqueante para que el loop revise el flag `running`
        listener.set_nonblocking(true).map_err(bind_error)?;
        Ok(listener)
    }

    fn accept_loop(&self) {
        let poll = self.config.accept_poll_interval();

        while self.running.load(Ordering::SeqCst) {
            let accepted = {
                let state = self.lifecycle();
                match state.listener.as_ref() {
                    Some(listener) => listener.accept(),
                    None => break,
                }
            };

            match accepted {
                Ok((stream, peer)) => self.hand_off(stream, peer),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => thread::sleep(poll),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    if self.running.load(Ordering::SeqCst) {
                        warn!(error = %e, "accept failed");
                    }
                    thread::sleep(poll);
                }
            }
        }
    }

    /// Entrega el socket aceptado al pool
    fn hand_off(&self, stream: TcpStream, peer: SocketAddr) {
        if let Err(e) = stream.set_nonblocking(false) {
            warn!(peer = %peer, error = %e, "could not configure accepted socket");
            return;
        }
        let registration = match self.registry.register(&stream) {
            Ok(registration) => registration,
            Err(e) => {
                warn!(peer = %peer, error = %e, "could not register connection");
                return;
            }
        };

        debug!(peer = %peer, "connection accepted");
        let worker = ConnectionWorker::new(stream, Arc::clone(&self.handler), &self.config);

        let state = self.lifecycle();
        let submitted = match state.pool.as_ref() {
            Some(pool) => pool.submit(move || {
                let _registration = registration;
                worker.run();
            }),
            None => Err(ServerError::PoolClosed),
        };
        if let Err(e) = submitted {
            debug!(peer = %peer, error = %e, "connection dropped");
        }
    }

    /// Cierra listener y pool, esperando a los workers
    fn drain(&self) {
        let (listener, pool) = {
            let mut state = self.lifecycle();
            state.local_addr = None;
            (state.listener.take(), state.pool.take())
        };
        drop(listener);

        let Some(mut pool) = pool else {
            return;
        };
        pool.close();

        if !pool.await_termination(self.config.shutdown_grace()) {
            let aborted = self.registry.abort_all();
            warn!(aborted, "shutdown grace period elapsed, closing open connections");

            if !pool.await_termination(FORCE_WAIT) {
                warn!("some workers did not terminate, detaching them");
            }
        }

        info!("Server stopped");
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Acceptor {
    fn drop(&mut self) {
        self.stop();
    }
}
