//! # Pool de Workers
//! src/server/pool.rs
//!
//! Cantidad fija de threads que sacan tareas de una cola sin límite
//! (`crossbeam_channel::unbounded`). Cada conexión aceptada es una tarea.
//!
//! ```text
//! Acceptor ──submit──► [ cola ] ──► http-worker-0
//!                               ──► http-worker-1
//!                               ──► ...
//! ```
//!
//! Cerrar el pool suelta el `Sender`: los workers terminan las tareas que
//! ya estaban encoladas y luego salen del loop.

use crate::error::ServerError;
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error};

type Task = Box<dyn FnOnce() + Send + 'static>;

pub struct WorkerPool {
    sender: Option<Sender<Task>>,
    /// Cada worker manda una señal al salir de su loop
    exited: Receiver<()>,
    handles: Vec<JoinHandle<()>>,
    finished: usize,
}

/// Avisa que el worker salió, incluso si el thread se cae
struct ExitSignal(Sender<()>);

impl Drop for ExitSignal {
    fn drop(&mut self) {
        let _ = self.0.send(());
    }
}

impl WorkerPool {
    /// Lanza `size` threads llamados `http-worker-{i}`
    pub fn new(size: usize) -> Result<Self, ServerError> {
        let (sender, receiver) = unbounded::<Task>();
        let (exit_tx, exited) = unbounded();
        let mut handles = Vec::with_capacity(size);

        for id in 0..size {
            let receiver = receiver.clone();
            let signal = ExitSignal(exit_tx.clone());
            let handle = thread::Builder::new()
                .name(format!("http-worker-{}", id))
                .spawn(move || worker_loop(id, receiver, signal))
                .map_err(ServerError::Spawn)?;
            handles.push(handle);
        }

        Ok(Self {
            sender: Some(sender),
            exited,
            handles,
            finished: 0,
        })
    }

    /// Encola una tarea; nunca bloquea
    pub fn submit<F>(&self, task: F) -> Result<(), ServerError>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(ServerError::PoolClosed)?;
        sender
            .send(Box::new(task))
            .map_err(|_| ServerError::PoolClosed)
    }

    /// Deja de aceptar tareas nuevas
    pub fn close(&mut self) {
        self.sender.take();
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Espera hasta `timeout` a que todos los workers salgan
    ///
    /// Retorna `true` si terminaron todos. Solo tiene sentido después de
    /// `close()`; se puede llamar varias veces con nuevos plazos.
    pub fn await_termination(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        while self.finished < self.handles.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.exited.recv_timeout(remaining) {
                Ok(()) => self.finished += 1,
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                error!("worker thread terminated abnormally");
            }
        }
        true
    }
}

impl Drop for WorkerPool {
    /// Los threads que sigan vivos quedan desacoplados
    fn drop(&mut self) {
        self.close();
    }
}

fn worker_loop(id: usize, receiver: Receiver<Task>, _signal: ExitSignal) {
    debug!(worker = id, "worker started");

    for task in receiver.iter() {
        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            error!(worker = id, "task panicked");
        }
    }

    debug!(worker = id, "worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_runs_all_submitted_tasks() {
        let mut pool = WorkerPool::new(4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..20 {
            let counter = Arc::clone(&counter);
            pool.submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        pool.close();
        assert!(pool.await_termination(Duration::from_secs(5)));
        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_submit_after_close_fails() {
        let mut pool = WorkerPool::new(1).unwrap();
        pool.close();
        assert_matches!(pool.submit(|| {}), Err(ServerError::PoolClosed));
    }

    #[test]
    fn test_panicking_task_keeps_worker_alive() {
        let mut pool = WorkerPool::new(1).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        pool.submit(|| panic!("boom")).unwrap();
        let c = Arc::clone(&counter);
        pool.submit(move || {
            c.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        pool.close();
        assert!(pool.await_termination(Duration::from_secs(5)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_await_times_out_while_task_blocked() {
        let mut pool = WorkerPool::new(2).unwrap();
        let (release_tx, release_rx) = unbounded::<()>();

        pool.submit(move || {
            let _ = release_rx.recv();
        })
        .unwrap();
        pool.close();

        assert!(!pool.await_termination(Duration::from_millis(50)));
        release_tx.send(()).unwrap();
        assert!(pool.await_termination(Duration::from_secs(5)));
    }

    #[test]
    fn test_worker_thread_names() {
        let mut pool = WorkerPool::new(1).unwrap();
        let (tx, rx) = unbounded();
        pool.submit(move || {
            let name = thread::current().name().map(str::to_string);
            tx.send(name).unwrap();
        })
        .unwrap();

        assert_eq!(rx.recv().unwrap().as_deref(), Some("http-worker-0"));
        assert_eq!(pool.size(), 1);
        pool.close();
        assert!(pool.await_termination(Duration::from_secs(5)));
    }
}
