use std::{ffi::OsString, path::Path};

use crate::{port::PortMapping, process};

/// Builds command lines for a docker CLI compatible container runtime.
#[derive(Debug, Clone)]
pub struct Docker {
    program: OsString,
}

impl Default for Docker {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl Docker {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn docker(&self) -> process::Command {
        process::Command::new(&self.program)
    }

    pub fn build(&self, context: &Path, tag: &str) -> process::Command {
        process::args!(self.docker(), "build", "-t", tag, context)
    }

    pub fn stop(&self, name: &str) -> process::Command {
        process::args!(self.docker(), "stop", name)
    }

    pub fn rm(&self, name: &str) -> process::Command {
        process::args!(self.docker(), "rm", name)
    }

    /// Starts a detached container.
    pub fn run(&self, name: &str, publish: PortMapping, image: &str) -> process::Command {
        process::args!(
            self.docker(),
            "run",
            "-d",
            "--name",
            name,
            "-p",
            publish.to_string(),
            image,
        )
    }
}
