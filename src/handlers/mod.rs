//! # Handlers del Servidor
//!
//! Cada handler recibe lo que el router extrajo del target y retorna una
//! `Response` o un `HttpError` que el router convierte en página de error.
//!
//! - **static_file**: GET y HEAD sobre archivos del document root
//! - **cgi_like**: ejecución de programas bajo `/cgi-like/`

pub mod cgi_like;
pub mod static_file;
