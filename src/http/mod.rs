//! # Módulo HTTP
//!
//! Subconjunto de HTTP/1.0 que habla el servidor:
//!
//! - Lectura de la request line (no se leen headers)
//! - Construcción y envío de responses
//! - Códigos de estado
//!
//! ### Formato de Request
//!
//! ```text
//! GET /path HTTP/1.0\r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 12\r\n
//! \r\n
//! hello world
//! ```

pub mod request;   // Parsing de la request line
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{Method, RequestLine};
pub use response::{Body, Response};
pub use status::StatusCode;
