//! # Worker de Conexión
//! src/server/worker.rs
//!
//! Un worker atiende exactamente una conexión:
//!
//! ```text
//! leer request line → router → handler → escribir respuesta → cerrar
//! ```
//!
//! [`handle_connection`] es genérico sobre el stream para poder probarlo
//! sin sockets. [`run`] es el punto de entrada del proceso hijo creado
//! por el supervisor y nunca retorna.

use super::reaper;
use crate::error::HttpError;
use crate::http::{RequestLine, Response, StatusCode};
use crate::router::Router;
use std::io::{self, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Atiende una conexión completa y la cierra
///
/// Un error de parsing produce un 400; los errores de los handlers ya
/// vienen convertidos en respuesta por el router. Solo falla si no se
/// puede escribir en la conexión.
pub fn handle_connection<S: Read + Write>(mut stream: S, router: &Router) -> io::Result<StatusCode> {
    let parsed = {
        let mut reader = BufReader::new(&mut stream);
        RequestLine::read_from(&mut reader)
    };

    let response = match parsed {
        Ok(request) => {
            info!(
                method = request.method(),
                request_target = %request.target_lossy(),
                version = request.version(),
                "Received request"
            );
            router.route(&request)
        }
        Err(e) => {
            warn!(error = %e, "bad request line");
            Response::from(HttpError::from(e))
        }
    };

    let status = response.status();
    let sent = response.write_to(&mut stream)?;
    debug!(%status, body_bytes = sent, "response sent");

    Ok(status)
}

/// Cuerpo del proceso worker
///
/// Libera su copia del listener antes de cualquier otra cosa, atiende la
/// conexión y termina el proceso.
pub fn run(listener: TcpListener, stream: TcpStream, peer: SocketAddr, router: &Router) -> ! {
    drop(listener);

    if let Err(errno) = reaper::restore_default() {
        warn!(%errno, "could not reset SIGCHLD in worker");
    }

    let code = match handle_connection(stream, router) {
        Ok(status) => {
            debug!(%peer, %status, "connection closed");
            0
        }
        Err(e) => {
            warn!(%peer, error = %e, "connection failed");
            1
        }
    };

    std::process::exit(code)
}
