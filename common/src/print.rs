//! Printing system
//!
//! Status lines are printed to stderr so they never mix with
//! the report written to stdout.
use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);
static COLOR: AtomicBool = AtomicBool::new(true);

/// Enable verbose printing
pub fn verbose_on() {
    VERBOSE.store(true, Ordering::Relaxed);
}

/// Disable colored printing
pub fn color_off() {
    COLOR.store(false, Ordering::Relaxed);
}

/// Automatically disable colored printing if stderr is not a terminal
pub fn auto_color() {
    if !std::io::stderr().is_terminal() {
        color_off();
    }
}

/// Check if colored printing is enabled
#[inline]
pub fn is_colored() -> bool {
    COLOR.load(Ordering::Relaxed)
}

/// Check if verbose printing is enabled
#[inline]
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

#[doc(hidden)]
pub mod __priv {
    use std::fmt::{Arguments, Display};
    use std::io::Write;

    pub static RED: &str = "\x1b[1;31m";
    pub static GREEN: &str = "\x1b[1;32m";
    pub static YELLOW: &str = "\x1b[1;33m";
    pub static MAGENTA: &str = "\x1b[1;35m";
    pub static RESET: &str = "\x1b[0m";

    /// Write `status` right-aligned to 12 columns, followed by the message
    pub fn status_line(color: &str, status: impl Display, args: Arguments<'_>) {
        let mut s = std::io::stderr().lock();
        if super::is_colored() {
            let _ = write!(&mut s, "{}{:>12}{} ", color, status, RESET);
        } else {
            let _ = write!(&mut s, "{:>12} ", status);
        }
        let _ = writeln!(&mut s, "{}", args);
    }
}

/// Log a status line using info color
#[macro_export]
macro_rules! infoln {
    ($status:expr, $($args:tt)*) => {
        $crate::print::__priv::status_line(
            $crate::print::__priv::GREEN,
            $status,
            format_args!($($args)*),
        )
    };
}

/// Log a status line using error color
#[macro_export]
macro_rules! errorln {
    ($status:expr, $($args:tt)*) => {
        $crate::print::__priv::status_line(
            $crate::print::__priv::RED,
            $status,
            format_args!($($args)*),
        )
    };
}

/// Log a status line using hint color
#[macro_export]
macro_rules! hintln {
    ($status:expr, $($args:tt)*) => {
        $crate::print::__priv::status_line(
            $crate::print::__priv::YELLOW,
            $status,
            format_args!($($args)*),
        )
    };
}

/// Log a line using verbose color, if verbose is enabled
#[macro_export]
macro_rules! verboseln {
    ($($args:tt)*) => {
        if $crate::print::is_verbose() {
            $crate::print::__priv::status_line(
                $crate::print::__priv::MAGENTA,
                "VERBOSE",
                format_args!($($args)*),
            )
        }
    };
}
