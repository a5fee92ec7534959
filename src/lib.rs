//! # cgi_httpd
//! src/lib.rs
//!
//! Servidor HTTP/1.0 mínimo con un proceso por conexión. Atiende tres
//! tipos de petición:
//!
//! - `GET /archivo`: envía un archivo del document root
//! - `HEAD /archivo`: igual que GET pero sin body
//! - `/cgi-like/<programa>?<arg>&<arg>`: ejecuta el programa y envía su
//!   salida estándar
//!
//! ## Arquitectura
//!
//! - `http`: request line, responses y códigos de estado
//! - `router`: decisión de ruta y chequeo de traversal
//! - `handlers`: archivos estáticos y ejecución CGI
//! - `server`: loop de accept, workers con fork y reaper de SIGCHLD
//! - `config`: argumentos de línea de comandos
//! - `error`: errores por petición y errores fatales
//! - `logging`: inicialización de `tracing`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use cgi_httpd::config::Config;
//! use cgi_httpd::server::Server;
//!
//! let config = Config::default();
//! let server = Server::new(config);
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod logging;
pub mod router;
pub mod server;
