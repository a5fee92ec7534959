//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el supervisor que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes
//! 3. Crea un proceso worker por conexión
//! 4. Recoge a los workers que terminan (SIGCHLD)

pub mod reaper;
pub mod tcp;
pub mod worker;

// Re-exportar para facilitar el uso
pub use tcp::Server;
