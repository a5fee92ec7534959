//! # Ejecución estilo CGI
//! src/handlers/cgi_like.rs
//!
//! Un target de la forma
//!
//! ```text
//! /cgi-like/<programa>?<arg1>&<arg2>&...
//! ```
//!
//! ejecuta `<programa>` (buscado en el `PATH`) con los argumentos dados y
//! devuelve su salida estándar como `text/plain`.
//!
//! ## Protocolo
//!
//! ```text
//! worker                                   hijo
//!   │ reserva nombre de captura
//!   │ fork() ─────────────────────────────▶ │ open(captura, O_CREAT|O_EXCL)
//!   │                                       │ dup2(captura, stdout)
//!   │                                       │ execvp(programa, argv)
//!   │ waitpid(hijo) ◀────────── exit ────── │
//!   │ abre captura, la borra del disco
//!   │ 200 + contenido
//! ```
//!
//! Si el hijo no puede crear la captura o redirigir stdout termina con
//! estado 1 sin ejecutar nada. Si `execvp` falla también termina con 1 y
//! la captura queda vacía. El estado de salida del programa no cambia la
//! respuesta: la salida capturada se envía igual.

use crate::error::HttpError;
use crate::http::{Response, StatusCode};
use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{close, dup2, fork, ForkResult, Pid};
use std::ffi::{CStr, CString, OsStr, OsString};
use std::fs::{self, File};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::ptr;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Prefijo de los targets que se ejecutan como programa
pub const CGI_PREFIX: &str = "/cgi-like/";

/// Content-Type de la salida capturada
pub const CGI_CONTENT_TYPE: &str = "text/plain";

/// Máximo de argumentos que se pasan al programa
pub const MAX_ARGS: usize = 255;

/// Secuencia por proceso para los nombres de captura
static CAPTURE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Programa y argumentos extraídos del target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CgiInvocation {
    program: OsString,
    arguments: Vec<OsString>,
}

impl CgiInvocation {
    /// Separa programa y argumentos
    ///
    /// Los argumentos se separan por `&`, sin URL-decoding. Los tokens
    /// vacíos se descartan. Programa y argumentos se pasan a exec como
    /// bytes, sin exigir UTF-8.
    ///
    /// # Ejemplo
    /// ```
    /// use cgi_httpd::handlers::cgi_like::CgiInvocation;
    ///
    /// let invocation = CgiInvocation::parse("/cgi-like/echo?hello&world").unwrap();
    /// assert_eq!(invocation.program(), "echo");
    /// assert_eq!(invocation.arguments(), ["hello", "world"]);
    /// ```
    pub fn parse(target: impl AsRef<[u8]>) -> Result<Self, HttpError> {
        let target = target.as_ref();
        let rest = target.strip_prefix(CGI_PREFIX.as_bytes()).ok_or_else(|| {
            HttpError::Internal(format!(
                "{} is not a cgi-like target",
                String::from_utf8_lossy(target)
            ))
        })?;

        let (program, arguments) = match rest.iter().position(|&b| b == b'?') {
            Some(mark) => {
                let arguments = rest[mark + 1..]
                    .split(|&b| b == b'&')
                    .filter(|arg| !arg.is_empty())
                    .take(MAX_ARGS)
                    .map(|arg| OsStr::from_bytes(arg).to_os_string())
                    .collect();
                (&rest[..mark], arguments)
            }
            None => (rest, Vec::new()),
        };

        Ok(CgiInvocation {
            program: OsStr::from_bytes(program).to_os_string(),
            arguments,
        })
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.arguments
    }

    /// argv para `execvp`: `[programa, args...]`
    ///
    /// Se arma antes del fork; un byte NUL no se puede pasar a exec.
    fn argv(&self) -> Result<Vec<CString>, HttpError> {
        std::iter::once(&self.program)
            .chain(self.arguments.iter())
            .map(|arg| {
                CString::new(arg.as_bytes())
                    .map_err(|_| HttpError::Internal(format!("NUL byte in argument {:?}", arg)))
            })
            .collect()
    }
}

/// Archivo temporal que recibe la salida estándar del hijo
///
/// El archivo se borra cuando el guard se destruye, en cualquier camino.
#[derive(Debug)]
pub struct CaptureFile {
    path: PathBuf,
}

impl CaptureFile {
    /// Reserva un nombre único dentro de `dir`; no crea el archivo
    ///
    /// El nombre combina el pid, una secuencia monótona y un token
    /// aleatorio. El hijo lo crea con `O_EXCL`, así que un nombre nunca
    /// se reutiliza.
    pub fn reserve(dir: &Path) -> Self {
        let name = format!(
            "cgi_output_{}_{}_{:016x}.txt",
            std::process::id(),
            CAPTURE_SEQ.fetch_add(1, Ordering::Relaxed),
            fastrand::u64(..),
        );
        CaptureFile { path: dir.join(name) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn c_path(&self) -> Result<CString, HttpError> {
        CString::new(self.path.as_os_str().as_bytes())
            .map_err(|_| HttpError::Internal(format!("NUL byte in {}", self.path.display())))
    }
}

impl Drop for CaptureFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove capture file"),
        }
    }
}

/// Ejecuta el programa del target y construye la respuesta
///
/// `tmp_dir` es el directorio donde se crean los archivos de captura.
pub fn execute(target: &[u8], tmp_dir: &Path) -> Result<Response, HttpError> {
    let invocation = CgiInvocation::parse(target)?;
    let argv = invocation.argv()?;
    let capture = CaptureFile::reserve(tmp_dir);
    let capture_path = capture.c_path()?;

    // El arreglo de punteros se arma antes del fork: el hijo no reserva memoria
    let argv_ptrs: Vec<*const libc::c_char> = argv
        .iter()
        .map(|arg| arg.as_ptr())
        .chain(std::iter::once(ptr::null()))
        .collect();

    debug!(
        program = ?invocation.program(),
        args = ?invocation.arguments(),
        capture = %capture.path().display(),
        "running cgi-like program"
    );

    let child = spawn(&argv_ptrs, &capture_path)?;

    match wait_for(child) {
        Ok(WaitStatus::Exited(_, 0)) => {}
        Ok(status) => debug!(pid = child.as_raw(), ?status, "cgi-like child finished"),
        Err(Errno::ECHILD) => warn!(pid = child.as_raw(), "cgi-like child already reaped"),
        Err(errno) => {
            return Err(HttpError::Internal(format!("waitpid {}: {}", child, errno)));
        }
    }

    relay(capture)
}

/// Abre la captura y la borra del disco; el contenido sigue accesible
/// por el descriptor abierto hasta que termine el envío.
fn relay(capture: CaptureFile) -> Result<Response, HttpError> {
    let file = File::open(capture.path())
        .map_err(|e| HttpError::Internal(format!("open {}: {}", capture.path().display(), e)))?;
    let metadata = file
        .metadata()
        .map_err(|e| HttpError::Internal(format!("stat {}: {}", capture.path().display(), e)))?;
    drop(capture);

    Ok(Response::new(StatusCode::Ok)
        .with_header("Content-Type", CGI_CONTENT_TYPE)
        .with_file(file, metadata.len()))
}

/// `argv` termina en un puntero nulo y apunta a `CString`s que viven
/// mientras dura la llamada
fn spawn(argv: &[*const libc::c_char], capture: &CStr) -> Result<Pid, HttpError> {
    // SAFETY: el hijo solo usa open/dup2/close/execvp/_exit antes de
    // reemplazar su imagen o terminar; ninguno reserva memoria.
    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => Ok(child),
        Ok(ForkResult::Child) => exec_child(argv, capture),
        Err(errno) => Err(HttpError::Internal(format!("fork failed: {}", errno))),
    }
}

/// Lado del hijo: nunca retorna
fn exec_child(argv: &[*const libc::c_char], capture: &CStr) -> ! {
    let fd = match open(
        capture,
        OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_EXCL,
        Mode::S_IRUSR | Mode::S_IWUSR,
    ) {
        Ok(fd) => fd,
        Err(_) => child_exit(1),
    };

    // Con stdout cerrado, open ya devuelve el descriptor 1
    if fd != libc::STDOUT_FILENO {
        if dup2(fd, libc::STDOUT_FILENO).is_err() {
            child_exit(1);
        }
        let _ = close(fd);
    }

    // SAFETY: argv[0] es el programa y el arreglo termina en nulo
    unsafe { libc::execvp(argv[0], argv.as_ptr()) };
    child_exit(1)
}

/// Termina el hijo sin correr los handlers de salida heredados del padre
fn child_exit(code: libc::c_int) -> ! {
    // SAFETY: _exit no retorna ni toca estado del proceso
    unsafe { libc::_exit(code) }
}

/// Espera a un hijo específico, reintentando si una señal interrumpe
fn wait_for(child: Pid) -> Result<WaitStatus, Errno> {
    loop {
        match waitpid(child, None) {
            Err(Errno::EINTR) => continue,
            result => return result,
        }
    }
}
