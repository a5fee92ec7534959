//! # Configuración del Servidor
//! src/config.rs
//!
//! Argumentos de línea de comandos, con variables de entorno como respaldo.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./cgi_httpd --port 8080 --root ./public --tmp-dir /tmp
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_ROOT=./public RUST_LOG=debug ./cgi_httpd
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Configuración del servidor HTTP/1.0
#[derive(Debug, Clone, Parser)]
#[command(name = "cgi_httpd")]
#[command(about = "Servidor HTTP/1.0 con un proceso por conexión y programas /cgi-like/")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Document root de los archivos estáticos
    #[arg(long, default_value = ".", env = "HTTP_ROOT")]
    pub root: PathBuf,

    /// Directorio para los archivos de captura de /cgi-like/
    #[arg(long = "tmp-dir", default_value = "/tmp", env = "CGI_TMP_DIR")]
    pub tmp_dir: PathBuf,

    /// Filtro de logs (ej: "info", "cgi_httpd=debug")
    #[arg(long = "log-level", default_value = "info", env = "RUST_LOG")]
    pub log_level: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use cgi_httpd::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }
        if !self.root.is_dir() {
            return Err(format!("Root {} is not a directory", self.root.display()));
        }
        if !self.tmp_dir.is_dir() {
            return Err(format!("Tmp dir {} is not a directory", self.tmp_dir.display()));
        }
        Ok(())
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            root: PathBuf::from("."),
            tmp_dir: PathBuf::from("/tmp"),
            log_level: "info".to_string(),
        }
    }
}
