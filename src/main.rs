//! # cgi_httpd - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor HTTP/1.0.

use cgi_httpd::config::Config;
use cgi_httpd::logging;
use cgi_httpd::server::Server;
use tracing::error;

fn main() {
    let config = Config::new();
    logging::init(&config.log_level);

    let server = Server::new(config);

    // Atiende conexiones hasta que el proceso sea terminado
    if let Err(e) = server.run() {
        error!("Error fatal: {}", e);
        std::process::exit(1);
    }
}
