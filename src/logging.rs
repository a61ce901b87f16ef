//! # Logging
//! src/logging.rs
//!
//! Subscriber de `tracing` para el binario. El filtro se toma de `RUST_LOG`;
//! si no está definido se usa `http_engine=info`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "http_engine=info";

/// Instala el subscriber global
///
/// Retorna `false` si ya había uno instalado (por ejemplo en tests).
pub fn init() -> bool {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .with(tracing_subscriber::fmt::layer().with_thread_names(true))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        init();
        assert!(!init());
    }
}
