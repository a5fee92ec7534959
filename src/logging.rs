//! # Logging
//! src/logging.rs
//!
//! Inicializa `tracing` con salida en texto a stdout. Los workers heredan
//! el subscriber del supervisor al hacer fork, así que sus líneas salen
//! por el mismo descriptor.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filtro usado si el configurado no se puede parsear
pub const DEFAULT_FILTER: &str = "info";

/// Instala el subscriber global
///
/// Llamadas repetidas no fallan; solo la primera tiene efecto.
pub fn init(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init();
}
