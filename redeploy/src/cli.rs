use std::{io, path::PathBuf};

use clap::Parser;

use crate::{
    deploy::{self, Deployment},
    docker::Docker,
    name::{is_container_name, is_plausible_image_reference},
    port::{self, PortMapping},
    process::{DryRun, Runner, System},
    Result,
};

/// Rebuilds the image and replaces the running container with a fresh one.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Directory to build the image from.
    #[arg(long = "context", default_value = deploy::DEFAULT_CONTEXT, value_parser = expect_context)]
    context: PathBuf,

    /// Tag of the built image, the container is started from it.
    #[arg(long = "image", default_value = deploy::DEFAULT_IMAGE, value_parser = expect_image)]
    image: String,

    /// Name of the container that is replaced.
    #[arg(long = "name", default_value = deploy::DEFAULT_CONTAINER, value_parser = expect_container_name)]
    name: String,

    /// Port on this machine that the container port is published on.
    #[arg(long = "host-port", default_value_t = deploy::DEFAULT_HOST_PORT, value_parser = port::parse_port)]
    host_port: u16,

    /// Port the service listens on inside the container.
    #[arg(long = "container-port", default_value_t = deploy::DEFAULT_CONTAINER_PORT, value_parser = port::parse_port)]
    container_port: u16,

    /// Container runtime to invoke, anything that accepts the docker command line works.
    #[arg(long = "runtime", default_value = "docker")]
    runtime: PathBuf,

    /// Log the commands instead of running them.
    #[arg(long = "dry-run", default_value_t)]
    dry_run: bool,
}

fn expect_context(value: &str) -> Result<PathBuf, &'static str> {
    if value.is_empty() || value.starts_with('-') {
        return Err("expected a non-empty path that does not start with a dash, prefix it with `./` if it does");
    }
    Ok(PathBuf::from(value))
}

fn expect_image(value: &str) -> Result<String, &'static str> {
    if !is_plausible_image_reference(value) {
        return Err("expected a non-empty image reference without whitespace that does not start with a dash");
    }
    Ok(value.to_string())
}

fn expect_container_name(value: &str) -> Result<String, &'static str> {
    if !is_container_name(value) {
        return Err("expected a container name matching regex /^[a-zA-Z0-9][a-zA-Z0-9_.-]*$/");
    }
    Ok(value.to_string())
}

impl Cli {
    fn deployment(&self) -> Deployment {
        Deployment {
            context: self.context.clone(),
            image: self.image.clone(),
            container: self.name.clone(),
            publish: PortMapping::new(self.host_port, self.container_port),
        }
    }

    /// Performs the deployment and reports completion to `out`.
    pub fn run(self, out: &mut impl io::Write) -> Result<()> {
        let deployment = self.deployment();
        let docker = Docker::new(self.runtime);
        let runner: &dyn Runner = if self.dry_run { &DryRun } else { &System };

        deploy::redeploy(runner, &docker, &deployment)?;

        writeln!(out, "Update complete!")?;
        Ok(())
    }
}
