//! # Construcción y Envío de Respuestas HTTP
//!
//! Este módulo construye respuestas HTTP/1.0 y las escribe en la conexión.
//!
//! ## Formato de una respuesta HTTP/1.0
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 13\r\n
//! \r\n
//! <h1>hola</h1>
//! ```
//!
//! Solo se emiten `Content-Type` y `Content-Length`. El body puede estar
//! en memoria o ser un archivo abierto que se envía por bloques de
//! `CHUNK_SIZE` bytes, sin cargarlo completo.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use cgi_httpd::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/plain")
//!     .with_body("Hello");
//!
//! let mut wire = Vec::new();
//! response.write_to(&mut wire).unwrap();
//! assert!(wire.ends_with(b"\r\n\r\nHello"));
//! ```

use super::StatusCode;
use std::fs::File;
use std::io::{self, Read, Write};

/// Tamaño de los bloques al enviar archivos
pub const CHUNK_SIZE: usize = 1024;

/// Cuerpo de una respuesta
#[derive(Debug)]
pub enum Body {
    /// Sin body (HEAD, o respuesta vacía)
    Empty,

    /// Body completo en memoria
    Bytes(Vec<u8>),

    /// Archivo abierto; se transmite hasta agotarlo
    File(File),
}

/// Representa una respuesta HTTP/1.0 completa
#[derive(Debug)]
pub struct Response {
    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Headers en orden de inserción, sin nombres repetidos
    headers: Vec<(String, String)>,

    /// Cuerpo de la respuesta
    body: Body,
}

impl Response {
    /// Crea una nueva respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    /// Agrega un header a la respuesta
    ///
    /// Si el header ya existe, se sobrescribe.
    ///
    /// # Ejemplo
    /// ```
    /// use cgi_httpd::http::{Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok)
    ///     .with_header("Content-Type", "text/html");
    /// assert_eq!(response.header("Content-Type"), Some("text/html"));
    /// ```
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        match self.headers.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Establece el cuerpo desde un string y calcula `Content-Length`
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el cuerpo desde bytes y calcula `Content-Length`
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.add_header("Content-Length", &body.len().to_string());
        self.body = Body::Bytes(body);
        self
    }

    /// Usa un archivo abierto como cuerpo
    ///
    /// `len` debe ser el tamaño del archivo según sus metadatos.
    pub fn with_file(mut self, file: File, len: u64) -> Self {
        self.add_header("Content-Length", &len.to_string());
        self.body = Body::File(file);
        self
    }

    /// Declara `Content-Length` sin enviar body (respuestas a HEAD)
    pub fn with_content_length(mut self, len: u64) -> Self {
        self.add_header("Content-Length", &len.to_string());
        self.body = Body::Empty;
        self
    }

    /// Crea la respuesta de error con la página HTML fija
    ///
    /// `Content-Length` es el tamaño real de la página generada.
    ///
    /// # Ejemplo
    /// ```
    /// use cgi_httpd::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::NotFound);
    /// assert_eq!(
    ///     response.body_bytes(),
    ///     b"<html><body><h1>404 Not Found</h1></body></html>\r\n"
    /// );
    /// assert_eq!(response.header("Content-Length"), Some("50"));
    /// ```
    pub fn error(status: StatusCode) -> Self {
        Self::new(status)
            .with_header("Content-Type", "text/html")
            .with_body(&error_page(status))
    }

    /// Status line y headers, terminados por la línea vacía
    pub fn head_bytes(&self) -> Vec<u8> {
        let mut result = format!("HTTP/1.0 {}\r\n", self.status).into_bytes();

        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result
    }

    /// Escribe la respuesta completa en la conexión
    ///
    /// Retorna la cantidad de bytes de body enviados. Un archivo se envía
    /// por bloques y se cierra al terminar, haya error o no.
    pub fn write_to<W: Write>(self, out: &mut W) -> io::Result<u64> {
        out.write_all(&self.head_bytes())?;

        let sent = match self.body {
            Body::Empty => 0,
            Body::Bytes(bytes) => {
                out.write_all(&bytes)?;
                bytes.len() as u64
            }
            Body::File(mut file) => stream_file(&mut file, out)?,
        };

        out.flush()?;
        Ok(sent)
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene los headers en orden
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Obtiene un header específico
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Bytes del body si está en memoria; vacío en otro caso
    pub fn body_bytes(&self) -> &[u8] {
        match &self.body {
            Body::Bytes(bytes) => bytes,
            _ => &[],
        }
    }
}

/// Página HTML de error: `<html><body><h1>CODE MESSAGE</h1></body></html>`
pub fn error_page(status: StatusCode) -> String {
    format!("<html><body><h1>{}</h1></body></html>\r\n", status)
}

fn stream_file<W: Write>(file: &mut File, out: &mut W) -> io::Result<u64> {
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut sent = 0u64;

    loop {
        let n = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        out.write_all(&buffer[..n])?;
        sent += n as u64;
    }

    Ok(sent)
}
