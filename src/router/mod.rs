//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Decide qué handler atiende una request line ya parseada.
//!
//! ## Reglas (en orden)
//!
//! ```text
//! 1. target contiene ".." o "~"      → Forbidden (403)
//! 2. target empieza con /cgi-like/   → CgiExec
//! 3. método HEAD                     → StaticHead
//! 4. método GET                      → StaticGet
//! 5. cualquier otro método           → Unsupported (501)
//! ```
//!
//! La regla 1 se evalúa sobre el target crudo antes que cualquier otra,
//! así ni los programas CGI ni los archivos estáticos se alcanzan con
//! `..` o `~`.

use crate::config::Config;
use crate::error::HttpError;
use crate::handlers::{cgi_like, static_file};
use crate::http::{Method, RequestLine, Response};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Substrings prohibidos en cualquier target
pub const TRAVERSAL_MARKERS: [&[u8]; 2] = [b"..", b"~"];

/// Decisión de routing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// GET de un archivo; path relativo al document root
    StaticGet(Vec<u8>),

    /// HEAD de un archivo; path relativo al document root
    StaticHead(Vec<u8>),

    /// Ejecución de programa; guarda el target completo
    CgiExec(Vec<u8>),

    /// Target con marcador de traversal
    Forbidden,

    /// Método distinto de GET/HEAD
    Unsupported,
}

impl Route {
    /// Aplica las reglas de routing a una request line
    ///
    /// # Ejemplo
    /// ```
    /// use cgi_httpd::http::RequestLine;
    /// use cgi_httpd::router::Route;
    ///
    /// let request = RequestLine::parse("GET /index.html HTTP/1.0").unwrap();
    /// assert_eq!(Route::decide(&request), Route::StaticGet(b"index.html".to_vec()));
    ///
    /// let request = RequestLine::parse("GET /../etc/passwd HTTP/1.0").unwrap();
    /// assert_eq!(Route::decide(&request), Route::Forbidden);
    /// ```
    pub fn decide(request: &RequestLine) -> Route {
        let target = request.target();

        if TRAVERSAL_MARKERS.iter().any(|marker| contains(target, marker)) {
            return Route::Forbidden;
        }

        if target.starts_with(cgi_like::CGI_PREFIX.as_bytes()) {
            return Route::CgiExec(target.to_vec());
        }

        let path = target.strip_prefix(b"/").unwrap_or(target).to_vec();
        match request.known_method() {
            Some(Method::HEAD) => Route::StaticHead(path),
            Some(Method::GET) => Route::StaticGet(path),
            None => Route::Unsupported,
        }
    }
}

/// Router con los directorios que necesitan los handlers
#[derive(Debug, Clone)]
pub struct Router {
    /// Document root de los archivos estáticos
    root: PathBuf,

    /// Directorio de los archivos de captura CGI
    tmp_dir: PathBuf,
}

impl Router {
    /// Crea un router
    pub fn new(root: impl Into<PathBuf>, tmp_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tmp_dir: tmp_dir.into(),
        }
    }

    /// Crea un router desde la configuración del servidor
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.root, &config.tmp_dir)
    }

    /// Ejecuta el handler que corresponde y retorna siempre una respuesta
    ///
    /// Los errores se convierten en la página de error; el detalle solo
    /// queda en el log.
    pub fn route(&self, request: &RequestLine) -> Response {
        let route = Route::decide(request);
        debug!(?route, "route decided");

        let result = match route {
            Route::Forbidden => Err(HttpError::Access(format!(
                "traversal marker in {}",
                request.target_lossy()
            ))),
            Route::CgiExec(target) => cgi_like::execute(&target, &self.tmp_dir),
            Route::StaticHead(path) => static_file::serve(&self.root, &path, false),
            Route::StaticGet(path) => static_file::serve(&self.root, &path, true),
            Route::Unsupported => Err(HttpError::Unsupported(request.method().to_string())),
        };

        result.unwrap_or_else(|err| {
            warn!(request_target = %request.target_lossy(), error = %err, "request failed");
            err.into()
        })
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
