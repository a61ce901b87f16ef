//! # Comandos de demostración
//! src/commands/mod.rs
//!
//! Handlers que usa el binario para mostrar el motor funcionando. El motor
//! no depende de este módulo: cualquier `Handler` sirve.

pub mod basic;

pub use basic::{demo_router, echo_handler, root_handler, HelpCommand, StatusCommand};
