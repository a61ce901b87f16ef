//! # http_engine - Entry Point
//! src/main.rs
//!
//! Lee la configuración (CLI + variables de entorno), arma el router de
//! demostración y corre el acceptor en el thread principal.

use http_engine::commands;
use http_engine::config::Config;
use http_engine::logging;
use http_engine::server::Acceptor;
use std::sync::Arc;

fn main() {
    let config = Config::new();
    logging::init();

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "invalid configuration");
        std::process::exit(2);
    }
    config.log_summary();

    let router = commands::demo_router(&config);
    let acceptor = Acceptor::new(config, Arc::new(router));

    if let Err(e) = acceptor.start() {
        tracing::error!(error = %e, "server failed");
        std::process::exit(1);
    }
}
