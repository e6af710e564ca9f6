use std::{ffi::OsStr, fmt, io, num::NonZeroI32, process};

use itertools::Itertools;
use log::debug;

pub struct Command(process::Command);

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Renders the command the way it would be typed into a shell, e.g. `docker rm tulrex`.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            std::iter::once(self.0.get_program())
                .chain(self.0.get_args())
                .map(Quoted)
                .format(" ")
        )
    }
}

struct Quoted<'a>(&'a OsStr);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arg = self.0.to_string_lossy();
        if !arg.is_empty() && arg.bytes().all(is_shell_safe) {
            return f.write_str(&arg);
        }
        f.write_str("'")?;
        for (index, part) in arg.split('\'').enumerate() {
            if index > 0 {
                f.write_str(r"'\''")?;
            }
            f.write_str(part)?;
        }
        f.write_str("'")
    }
}

fn is_shell_safe(byte: u8) -> bool {
    matches!(byte, b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'/' | b':' | b'=' | b'@' | b',' | b'+')
}

impl Command {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self(process::Command::new(program))
    }

    pub fn args<'a, I>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = &'a OsStr>,
    {
        self.0.args(args);
        self
    }

    pub fn program(&self) -> &OsStr {
        self.0.get_program()
    }

    /// Runs the command to completion with inherited stdio. A non-zero exit status is not an error
    /// here, see [`ExitStatus::require_success`].
    pub fn try_status(mut self) -> Result<ExitStatus, Error> {
        if log::log_enabled!(log::Level::Debug) {
            debug!("spawning `{command:?}`...", command = &self.0);
        }

        match self.0.status() {
            Ok(status) => Ok(ExitStatus {
                command: self,
                code: status.code(),
            }),
            Err(error) => Err(Error {
                command: self,
                kind: error.into(),
            }),
        }
    }
}

#[derive(Debug)]
pub struct ExitStatus {
    command: Command,
    code: Option<i32>,
}

impl ExitStatus {
    /// A `code` of `None` means the process was terminated by a signal.
    pub fn new(command: Command, code: Option<i32>) -> Self {
        Self { command, code }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn require_success(self) -> Result<(), Error> {
        if self.success() {
            return Ok(());
        }
        let ExitStatus { command, code } = self;
        Err(Error {
            command,
            kind: ErrorKind::NonZeroExitStatus(code.and_then(NonZeroI32::new)),
        })
    }
}

/// Everything the deployment executes goes through a runner, so the order of commands and the
/// handling of their exit statuses can be exercised without a container runtime.
pub trait Runner {
    fn try_status(&self, command: Command) -> Result<ExitStatus, Error>;

    fn status(&self, command: Command) -> Result<(), Error> {
        self.try_status(command)
            .and_then(ExitStatus::require_success)
    }
}

/// Spawns real child processes.
pub struct System;

impl Runner for System {
    fn try_status(&self, command: Command) -> Result<ExitStatus, Error> {
        command.try_status()
    }
}

/// Pretends every command succeeded.
pub struct DryRun;

impl Runner for DryRun {
    fn try_status(&self, command: Command) -> Result<ExitStatus, Error> {
        debug!("dry run, not spawning `{command}`");
        Ok(ExitStatus::new(command, Some(0)))
    }
}

#[derive(Debug)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    NonZeroExitStatus(Option<NonZeroI32>),
    Io(io::Error),
}

impl From<io::Error> for ErrorKind {
    fn from(value: io::Error) -> Self {
        match value.kind() {
            io::ErrorKind::NotFound => ErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::Io(value),
        }
    }
}

#[derive(Debug)]
pub struct Error {
    pub command: Command,
    pub kind: ErrorKind,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to run `{command}`: ", command = &self.command)?;
        match &self.kind {
            ErrorKind::NotFound => {
                let program = self.command.program().to_string_lossy();
                write!(f, "the `{program}` command is required but not available on your system, please install it")
            }
            ErrorKind::PermissionDenied => {
                let program = self.command.program().to_string_lossy();
                write!(f, "the `{program}` command is available but does not have the right permissions, please make sure the binary is executable")
            }
            ErrorKind::NonZeroExitStatus(code) => {
                if let Some(code) = code {
                    write!(f, "exited with non-zero exit code `{code}`")
                } else {
                    write!(f, "did not run successfully")
                }
            }
            ErrorKind::Io(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(error) => Some(error),
            _ => None,
        }
    }
}

/// Calls [`Command::args`] on the provided [`Command`] while calling [`std::convert::AsRef::as_ref`]
/// on each argument.
macro_rules! args {
    ($program:expr, $($arg:expr),+ $(,)?) => {
        $program.args([
            $(($arg).as_ref(),)*
        ])
    }
}

pub(crate) use args;
