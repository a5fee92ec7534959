//! # Archivos Estáticos
//! src/handlers/static_file.rs
//!
//! Sirve archivos del document root para GET y HEAD. El path llega en
//! bytes y se convierte directo a `OsStr`, sin pasar por UTF-8.
//!
//! Validaciones, en este orden:
//! 1. `stat` del path: si falla (o el path queda vacío) → 404
//! 2. Debe ser archivo regular → si no, 403
//! 3. Debe ser legible por "otros" (bit `S_IROTH`) → si no, 403
//! 4. Abrir para lectura: `PermissionDenied` → 403, cualquier otro error → 500

use crate::error::HttpError;
use crate::http::{Response, StatusCode};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::debug;

/// Content-Type fijo de los archivos estáticos
pub const STATIC_CONTENT_TYPE: &str = "text/html";

/// Resuelve `relative` dentro de `root` y construye la respuesta
///
/// Con `send_body == false` (HEAD) solo se declara `Content-Length`;
/// el contenido del archivo nunca se lee.
pub fn serve(root: &Path, relative: &[u8], send_body: bool) -> Result<Response, HttpError> {
    // Los '/' iniciales se quitan para que el path quede bajo root
    let start = relative.iter().position(|&b| b != b'/').unwrap_or(relative.len());
    let relative = &relative[start..];
    if relative.is_empty() {
        return Err(HttpError::NotFound("empty path".to_string()));
    }
    let path = root.join(OsStr::from_bytes(relative));

    let metadata = fs::metadata(&path)
        .map_err(|e| HttpError::NotFound(format!("{}: {}", path.display(), e)))?;

    if !metadata.is_file() {
        return Err(HttpError::Access(format!("{} is not a regular file", path.display())));
    }

    if metadata.permissions().mode() & (libc::S_IROTH as u32) == 0 {
        return Err(HttpError::Access(format!("{} is not world-readable", path.display())));
    }

    let file = File::open(&path).map_err(|e| match e.kind() {
        io::ErrorKind::PermissionDenied => {
            HttpError::Access(format!("{}: {}", path.display(), e))
        }
        _ => HttpError::Internal(format!("open {}: {}", path.display(), e)),
    })?;

    debug!(path = %path.display(), size = metadata.len(), send_body, "serving static file");

    let response = Response::new(StatusCode::Ok).with_header("Content-Type", STATIC_CONTENT_TYPE);

    if send_body {
        Ok(response.with_file(file, metadata.len()))
    } else {
        drop(file);
        Ok(response.with_content_length(metadata.len()))
    }
}
