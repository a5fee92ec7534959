//! # Errores del Servidor
//! src/error.rs
//!
//! Dos familias de errores:
//!
//! - [`HttpError`]: errores de una petición. Cada uno se convierte en
//!   exactamente una respuesta HTTP dentro del worker que lo produjo.
//!   El detalle interno solo va a los logs; el cliente ve el código de
//!   estado y la página de error fija.
//! - [`ServerError`]: errores de arranque (bind, instalación de señales,
//!   configuración). Son los únicos que llegan a `main`.

use crate::http::{Response, StatusCode};
use crate::http::request::ParseError;
use thiserror::Error;

/// Error asociado a una única petición
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request line malformada o ilegible (400)
    #[error("malformed request: {0}")]
    Protocol(String),

    /// Path prohibido, archivo no regular o sin permiso de lectura (403)
    #[error("access denied: {0}")]
    Access(String),

    /// El recurso no existe (404)
    #[error("not found: {0}")]
    NotFound(String),

    /// Método no soportado (501)
    #[error("unsupported method: {0}")]
    Unsupported(String),

    /// Falla al adquirir recursos o crear procesos (500)
    #[error("internal error: {0}")]
    Internal(String),
}

impl HttpError {
    /// Código de estado que recibe el cliente para este error
    ///
    /// # Ejemplo
    /// ```
    /// use cgi_httpd::error::HttpError;
    /// use cgi_httpd::http::StatusCode;
    ///
    /// let err = HttpError::NotFound("index.html".to_string());
    /// assert_eq!(err.status(), StatusCode::NotFound);
    /// ```
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::Protocol(_) => StatusCode::BadRequest,
            HttpError::Access(_) => StatusCode::Forbidden,
            HttpError::NotFound(_) => StatusCode::NotFound,
            HttpError::Unsupported(_) => StatusCode::NotImplemented,
            HttpError::Internal(_) => StatusCode::InternalServerError,
        }
    }
}

impl From<ParseError> for HttpError {
    fn from(err: ParseError) -> Self {
        HttpError::Protocol(err.to_string())
    }
}

impl From<HttpError> for Response {
    /// La página de error nunca incluye el detalle interno
    fn from(err: HttpError) -> Self {
        Response::error(err.status())
    }
}

/// Errores fatales del proceso supervisor
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to create service on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install SIGCHLD handler: {0}")]
    Signal(#[from] nix::errno::Errno),
}
