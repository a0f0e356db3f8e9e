//! Ctrl-C handling.
//!
//! Masked prompts switch terminal echo off while they read. The default
//! SIGINT action would kill the process before echo is switched back on, so
//! [`install`] snapshots the terminal settings at startup and the handler
//! restores them, shows the cursor and exits with the abort status.

use crate::router::ExitStatus;

/// Exit status used when the operator presses Ctrl-C.
pub const INTERRUPT_EXIT_CODE: i32 = ExitStatus::Aborted.code();

#[cfg(unix)]
mod imp {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::OnceLock;

    use super::INTERRUPT_EXIT_CODE;

    static SAVED: OnceLock<libc::termios> = OnceLock::new();
    static STDERR_TTY: AtomicBool = AtomicBool::new(false);

    // Only async-signal-safe calls in here.
    extern "C" fn on_interrupt(_signal: libc::c_int) {
        unsafe {
            if let Some(termios) = SAVED.get() {
                libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, termios);
            }
            if STDERR_TTY.load(Ordering::Relaxed) {
                let show_cursor = b"\x1b[?25h\n";
                libc::write(libc::STDERR_FILENO, show_cursor.as_ptr().cast(), show_cursor.len());
            }
            libc::_exit(INTERRUPT_EXIT_CODE);
        }
    }

    pub fn install() {
        unsafe {
            if libc::isatty(libc::STDIN_FILENO) == 1 {
                let mut termios: libc::termios = std::mem::zeroed();
                if libc::tcgetattr(libc::STDIN_FILENO, &mut termios) == 0 {
                    let _ = SAVED.set(termios);
                }
            }
            STDERR_TTY.store(libc::isatty(libc::STDERR_FILENO) == 1, Ordering::Relaxed);
            let handler = on_interrupt as extern "C" fn(libc::c_int);
            libc::signal(libc::SIGINT, handler as libc::sighandler_t);
        }
    }
}

#[cfg(not(unix))]
mod imp {
    pub fn install() {}
}

/// Install the SIGINT handler. Call once, first thing in `main`.
pub fn install() {
    imp::install();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupt_matches_abort_status() {
        assert_eq!(INTERRUPT_EXIT_CODE, 130);
    }
}
