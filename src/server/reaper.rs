//! # Reaper de Workers
//! src/server/reaper.rs
//!
//! Cada worker es un proceso hijo del supervisor. Cuando termina queda
//! como zombie hasta que alguien recoja su estado. El handler de SIGCHLD
//! recoge a todos los hijos que ya terminaron, sin bloquear, cada vez que
//! llega la señal.
//!
//! Se instala con `SA_RESTART` para que el `accept` del supervisor se
//! reanude solo, y con `SA_NOCLDSTOP` para ignorar hijos detenidos. El
//! handler deja `errno` como lo encontró.

use nix::errno::Errno;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

/// Recoge todos los hijos que ya terminaron; nunca bloquea
///
/// Retorna cuántos recogió. Solo usa `waitpid`, que es seguro dentro de
/// un handler de señales.
pub fn reap_exited() -> usize {
    let mut reaped = 0;
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(_) => break,
            Ok(_) => reaped += 1,
        }
    }
    reaped
}

/// Ejecuta `f` y restaura el `errno` del thread al terminar
fn preserving_errno<T>(f: impl FnOnce() -> T) -> T {
    let saved = Errno::last_raw();
    let result = f();
    Errno::set_raw(saved);
    result
}

extern "C" fn on_sigchld(_signal: libc::c_int) {
    preserving_errno(reap_exited);
}

/// Instala el handler de SIGCHLD en el proceso actual
pub fn install() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_sigchld),
        SaFlags::SA_RESTART | SaFlags::SA_NOCLDSTOP,
        SigSet::empty(),
    );
    // SAFETY: on_sigchld solo llama a waitpid.
    unsafe { sigaction(Signal::SIGCHLD, &action) }.map(|_| ())
}

/// Vuelve SIGCHLD a su disposición por defecto
///
/// Los workers lo llaman apenas nacen: el ejecutor CGI espera a su hijo
/// con un `waitpid` dirigido y el handler heredado se lo robaría.
pub fn restore_default() -> nix::Result<()> {
    let action = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
    // SAFETY: restaurar SIG_DFL no ejecuta código del proceso.
    unsafe { sigaction(Signal::SIGCHLD, &action) }.map(|_| ())
}
