//! # Parsing de la Request Line HTTP/1.0
//! src/http/request.rs
//!
//! El servidor solo lee la primera línea del request. Los headers que
//! vengan después se ignoran.
//!
//! ## Formato
//!
//! ```text
//! GET /index.html HTTP/1.0\r\n
//! ```
//!
//! Se aceptan tanto `\r\n` como `\n` al final de la línea.
//!
//! ## Límites
//!
//! Cada campo tiene un tamaño máximo en bytes: método 15, target 255 y
//! versión 15. Un campo más largo se trunca a su límite; nunca se copia
//! más allá.
//!
//! Los campos son bytes, no texto: un target con bytes no UTF-8 llega
//! intacto hasta el filesystem, igual que cualquier nombre de archivo Unix.

use std::borrow::Cow;
use std::io::{BufRead, Read};
use thiserror::Error;

/// Longitud máxima del método (ej: "GET")
pub const MAX_METHOD_LEN: usize = 15;

/// Longitud máxima del target (ej: "/cgi-like/ls?-l")
pub const MAX_TARGET_LEN: usize = 255;

/// Longitud máxima de la versión (ej: "HTTP/1.0")
pub const MAX_VERSION_LEN: usize = 15;

/// Máximo de bytes que se leen buscando el fin de línea
pub const MAX_REQUEST_LINE: usize = 8192;

/// Métodos HTTP que el servidor sabe atender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Obtener un recurso
    GET,

    /// HEAD - Como GET pero solo retorna headers
    HEAD,
}

impl Method {
    /// Reconoce un método; la comparación distingue mayúsculas
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "HEAD" => Some(Method::HEAD),
            _ => None,
        }
    }

}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// La conexión se cerró antes de enviar algún byte
    #[error("empty request")]
    EmptyRequest,

    /// No apareció un fin de línea dentro de `MAX_REQUEST_LINE` bytes
    #[error("request line longer than {0} bytes")]
    LineTooLong(usize),

    /// La línea no tiene exactamente tres campos
    #[error("invalid request line format")]
    InvalidRequestLine,

    /// Falla de lectura del socket
    #[error("read failed: {0:?}")]
    Io(std::io::ErrorKind),
}

/// Request line parseada: método, target y versión
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: String,
    target: Vec<u8>,
    version: String,
}

impl RequestLine {
    /// Lee exactamente una línea del reader y la parsea
    ///
    /// Consume como máximo `MAX_REQUEST_LINE` bytes. Si la conexión se
    /// cierra sin `\n`, se parsea lo que haya llegado.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use cgi_httpd::http::RequestLine;
    /// use std::io::Cursor;
    ///
    /// let mut input = Cursor::new(b"GET /index.html HTTP/1.0\r\nHost: x\r\n\r\n".to_vec());
    /// let request = RequestLine::read_from(&mut input).unwrap();
    ///
    /// assert_eq!(request.method(), "GET");
    /// assert_eq!(request.target(), b"/index.html");
    /// assert_eq!(request.version(), "HTTP/1.0");
    /// ```
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<Self, ParseError> {
        let mut line = Vec::new();
        let read = reader
            .by_ref()
            .take(MAX_REQUEST_LINE as u64)
            .read_until(b'\n', &mut line)
            .map_err(|e| ParseError::Io(e.kind()))?;

        if read == 0 {
            return Err(ParseError::EmptyRequest);
        }

        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        } else if read == MAX_REQUEST_LINE {
            return Err(ParseError::LineTooLong(MAX_REQUEST_LINE));
        }

        Self::parse(&line)
    }

    /// Parsea una request line ya separada (sin el fin de línea)
    ///
    /// Formato: `METHOD TARGET VERSION`, separados por espacios en blanco.
    /// Cada campo se trunca a su límite.
    pub fn parse(line: impl AsRef<[u8]>) -> Result<Self, ParseError> {
        let parts: Vec<&[u8]> = line
            .as_ref()
            .split(u8::is_ascii_whitespace)
            .filter(|part| !part.is_empty())
            .collect();

        // Debe tener exactamente 3 partes: METHOD TARGET VERSION
        let [method, target, version] = parts.as_slice() else {
            return Err(ParseError::InvalidRequestLine);
        };

        Ok(RequestLine {
            method: String::from_utf8_lossy(truncated(method, MAX_METHOD_LEN)).into_owned(),
            target: truncated(target, MAX_TARGET_LEN).to_vec(),
            version: String::from_utf8_lossy(truncated(version, MAX_VERSION_LEN)).into_owned(),
        })
    }

    /// Método tal como llegó (puede no ser GET/HEAD)
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Método reconocido, si es GET o HEAD
    pub fn known_method(&self) -> Option<Method> {
        Method::from_token(&self.method)
    }

    /// Target de la petición, en bytes (ej: b"/index.html")
    pub fn target(&self) -> &[u8] {
        &self.target
    }

    /// Target para logs; los bytes no UTF-8 se reemplazan
    pub fn target_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.target)
    }

    /// Versión HTTP declarada por el cliente
    pub fn version(&self) -> &str {
        &self.version
    }
}

fn truncated(token: &[u8], max: usize) -> &[u8] {
    &token[..token.len().min(max)]
}
