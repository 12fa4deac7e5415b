//! Console output and terminal echo control.
//!
//! [`Console`] wraps any [`Write`] and knows how to print text and switch
//! the foreground color with crossterm commands.  Nothing is flushed until
//! [`Console::flush`]; the engine flushes before every pause so the reader
//! sees everything printed so far.
//!
//! [`EchoControl`] hides typed keys while a line is being revealed and shows
//! them again at the selection prompt.  [`TermiosEcho`] implements it on a
//! real terminal; [`echo_control`] falls back to [`NoEcho`] with a one-time
//! notice when stdin is not one.

use std::io::{self, Write};
use std::sync::OnceLock;

use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use regex::Regex;

use crate::script::error::{Result, ScriptError};

// ── Color ─────────────────────────────────────────────────────────────────────

/// A 24-bit foreground color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse a `#RRGGBB` color spec.
    pub fn parse(spec: &str) -> Result<Self> {
        static HEX: OnceLock<Regex> = OnceLock::new();
        let re = HEX.get_or_init(|| {
            Regex::new(r"^#([0-9A-Fa-f]{2})([0-9A-Fa-f]{2})([0-9A-Fa-f]{2})$")
                .expect("color pattern is valid")
        });
        let invalid = || ScriptError::InvalidColor(spec.to_owned());
        let caps = re.captures(spec.trim()).ok_or_else(invalid)?;
        let channel = |i: usize| u8::from_str_radix(&caps[i], 16).map_err(|_| invalid());
        Ok(Self { r: channel(1)?, g: channel(2)?, b: channel(3)? })
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb { r: c.r, g: c.g, b: c.b }
    }
}

// ── Console ───────────────────────────────────────────────────────────────────

/// Character-stream output with optional foreground color.
pub struct Console<W: Write> {
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn print(&mut self, text: &str) -> io::Result<()> {
        queue!(self.out, Print(text))
    }

    pub fn print_char(&mut self, ch: char) -> io::Result<()> {
        queue!(self.out, Print(ch))
    }

    pub fn set_color(&mut self, color: Rgb) -> io::Result<()> {
        queue!(self.out, SetForegroundColor(color.into()))
    }

    pub fn reset_color(&mut self) -> io::Result<()> {
        queue!(self.out, ResetColor)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

// ── Echo control ──────────────────────────────────────────────────────────────

/// Turn terminal echo of typed input on or off.
pub trait EchoControl {
    fn set_echo(&mut self, enabled: bool);
}

/// Leaves echo at whatever the host default is.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoEcho;

impl EchoControl for NoEcho {
    fn set_echo(&mut self, _enabled: bool) {}
}

/// Echo control through termios on stdin.
///
/// The terminal mode found at [`TermiosEcho::open`] is restored on drop.
pub struct TermiosEcho {
    fd: libc::c_int,
    original: libc::termios,
}

impl TermiosEcho {
    pub fn open() -> io::Result<Self> {
        let fd = libc::STDIN_FILENO;
        if unsafe { libc::isatty(fd) } == 0 {
            return Err(io::Error::new(io::ErrorKind::Unsupported, "stdin is not a terminal"));
        }
        let mut original = std::mem::MaybeUninit::<libc::termios>::uninit();
        if unsafe { libc::tcgetattr(fd, original.as_mut_ptr()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        // tcgetattr succeeded, so the struct is initialised.
        let original = unsafe { original.assume_init() };
        Ok(Self { fd, original })
    }

    fn apply(&self, mode: &libc::termios) {
        if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, mode) } != 0 {
            tracing::debug!(error = %io::Error::last_os_error(), "tcsetattr failed");
        }
    }
}

impl EchoControl for TermiosEcho {
    fn set_echo(&mut self, enabled: bool) {
        let mut mode = self.original;
        if enabled {
            mode.c_lflag |= libc::ECHO;
        } else {
            mode.c_lflag &= !libc::ECHO;
        }
        self.apply(&mode);
    }
}

impl Drop for TermiosEcho {
    fn drop(&mut self) {
        self.apply(&self.original);
    }
}

/// Notice printed once when echo cannot be controlled.
pub const NO_ECHO_NOTICE: &str = "== cannot use termios -> cannot turn off echo ==\n\n";

/// Open echo control on stdin, or print [`NO_ECHO_NOTICE`] to `out` and fall
/// back to [`NoEcho`].
pub fn echo_control<W: Write>(out: &mut W) -> Box<dyn EchoControl> {
    match TermiosEcho::open() {
        Ok(echo) => Box::new(echo),
        Err(e) => {
            tracing::warn!(error = %e, "terminal echo control unavailable");
            let _ = out.write_all(NO_ECHO_NOTICE.as_bytes());
            let _ = out.flush();
            Box::new(NoEcho)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
