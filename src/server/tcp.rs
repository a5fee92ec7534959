//! # Servidor TCP con un Proceso por Conexión
//! src/server/tcp.rs
//!
//! El supervisor acepta conexiones en un loop y crea un proceso worker
//! con `fork` para cada una:
//!
//! ```text
//! supervisor                        worker (hijo)
//!   accept() ──▶ conexión
//!   fork() ───────────────────────▶ cierra su copia del listener
//!   cierra su copia de la conexión   atiende un request
//!   vuelve a accept()                cierra la conexión y termina
//!            ◀──── SIGCHLD ───────── (el reaper recoge su estado)
//! ```
//!
//! Un error de `accept` o de `fork` afecta solo a esa conexión; el loop
//! sigue.

use super::{reaper, worker};
use crate::config::Config;
use crate::error::ServerError;
use crate::router::Router;
use nix::unistd::{fork, ForkResult};
use std::io;
use std::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Servidor HTTP/1.0 con aislamiento por proceso
pub struct Server {
    config: Config,
    router: Router,
}

impl Server {
    pub fn new(config: Config) -> Self {
        let router = Router::from_config(&config);
        Self { config, router }
    }

    /// Crea el socket de escucha en la dirección configurada
    pub fn bind(&self) -> Result<TcpListener, ServerError> {
        let address = self.config.address();
        TcpListener::bind(&address).map_err(|source| ServerError::Bind { address, source })
    }

    /// Valida la configuración, hace bind y atiende conexiones
    /// indefinidamente
    pub fn run(&self) -> Result<(), ServerError> {
        self.config.validate().map_err(ServerError::Config)?;
        let listener = self.bind()?;
        let port = listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or(self.config.port);

        info!(
            address = %self.config.address(),
            root = %self.config.root.display(),
            tmp_dir = %self.config.tmp_dir.display(),
            "Listening on port: {}",
            port
        );

        self.serve(listener)
    }

    /// Loop de accept sobre un listener ya creado
    ///
    /// Instala el reaper de SIGCHLD antes de aceptar la primera conexión.
    pub fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        reaper::install()?;

        loop {
            let (stream, peer) = match listener.accept() {
                Ok(connection) => connection,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "accept failed");
                    continue;
                }
            };

            // SAFETY: el supervisor es de un solo thread; el hijo sigue
            // ejecutando código Rust normal hasta salir con exit.
            match unsafe { fork() } {
                Ok(ForkResult::Child) => worker::run(listener, stream, peer, &self.router),
                Ok(ForkResult::Parent { child }) => {
                    debug!(%peer, pid = child.as_raw(), "worker spawned");
                    drop(stream);
                }
                Err(errno) => {
                    error!(%peer, %errno, "fork failed, dropping connection");
                    drop(stream);
                }
            }
        }
    }
}
