use std::path::PathBuf;

use log::{debug, info};

use crate::{
    docker::Docker,
    port::PortMapping,
    process::{self, Runner},
};

pub const DEFAULT_CONTEXT: &str = ".";
pub const DEFAULT_IMAGE: &str = "tulrex";
pub const DEFAULT_CONTAINER: &str = "tulrex";
pub const DEFAULT_HOST_PORT: u16 = 8080;
pub const DEFAULT_CONTAINER_PORT: u16 = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    /// Directory handed to the image build.
    pub context: PathBuf,
    /// Tag of the built image, also the image the container is started from.
    pub image: String,
    pub container: String,
    pub publish: PortMapping,
}

impl Default for Deployment {
    fn default() -> Self {
        Self {
            context: PathBuf::from(DEFAULT_CONTEXT),
            image: DEFAULT_IMAGE.to_owned(),
            container: DEFAULT_CONTAINER.to_owned(),
            publish: PortMapping::new(DEFAULT_HOST_PORT, DEFAULT_CONTAINER_PORT),
        }
    }
}

/// Rebuilds the image and replaces the container. A failing build or run aborts, stopping and
/// removing the old container never does.
pub fn redeploy(
    runner: &dyn Runner,
    docker: &Docker,
    deployment: &Deployment,
) -> Result<(), process::Error> {
    let Deployment {
        context,
        image,
        container,
        publish,
    } = deployment;

    run(runner, docker.build(context, image))?;

    // Fails when there is no container to stop or remove, which is fine.
    ignore_failure(run_unchecked(runner, docker.stop(container)));
    ignore_failure(run_unchecked(runner, docker.rm(container)));

    run(runner, docker.run(container, *publish, image))?;

    Ok(())
}

fn run(runner: &dyn Runner, command: process::Command) -> Result<(), process::Error> {
    info!("running `{command}`");
    runner.status(command)
}

fn run_unchecked(
    runner: &dyn Runner,
    command: process::Command,
) -> Result<process::ExitStatus, process::Error> {
    info!("running `{command}`");
    runner.try_status(command)
}

fn ignore_failure(result: Result<process::ExitStatus, process::Error>) {
    match result.and_then(process::ExitStatus::require_success) {
        Ok(()) => {}
        Err(error) => debug!("ignoring: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::process::{Error, ErrorKind, ExitStatus};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Container {
        Running,
        Stopped,
    }

    /// Answers like docker would for a single container name, and records every command line.
    #[derive(Default)]
    struct FakeDocker {
        container: RefCell<Option<Container>>,
        build_fails: bool,
        run_fails: bool,
        program_missing_for_teardown: bool,
        log: RefCell<Vec<String>>,
    }

    impl FakeDocker {
        fn with_container(container: Container) -> Self {
            Self {
                container: RefCell::new(Some(container)),
                ..Default::default()
            }
        }

        fn log(&self) -> Vec<String> {
            self.log.borrow().clone()
        }

        fn container(&self) -> Option<Container> {
            *self.container.borrow()
        }
    }

    impl Runner for FakeDocker {
        fn try_status(&self, command: process::Command) -> Result<ExitStatus, Error> {
            let line = command.to_string();
            self.log.borrow_mut().push(line.clone());

            let subcommand = line.split(' ').nth(1).unwrap_or_default();
            let mut container = self.container.borrow_mut();

            if matches!(subcommand, "stop" | "rm") && self.program_missing_for_teardown {
                return Err(Error {
                    command,
                    kind: ErrorKind::NotFound,
                });
            }

            let code = match subcommand {
                "build" if self.build_fails => 1,
                "build" => 0,
                "stop" => match *container {
                    Some(_) => {
                        *container = Some(Container::Stopped);
                        0
                    }
                    None => 1,
                },
                "rm" => match *container {
                    Some(Container::Stopped) => {
                        *container = None;
                        0
                    }
                    _ => 1,
                },
                "run" if self.run_fails || container.is_some() => 125,
                "run" => {
                    *container = Some(Container::Running);
                    0
                }
                other => panic!("unexpected docker subcommand {other:?}"),
            };

            Ok(ExitStatus::new(command, Some(code)))
        }
    }

    const BUILD: &str = "docker build -t tulrex .";
    const STOP: &str = "docker stop tulrex";
    const RM: &str = "docker rm tulrex";
    const RUN: &str = "docker run -d --name tulrex -p 8080:80 tulrex";

    fn redeploy_default(runner: &FakeDocker) -> Result<(), process::Error> {
        redeploy(runner, &Docker::default(), &Deployment::default())
    }

    #[test]
    fn fresh_deploy_without_existing_container() {
        let docker = FakeDocker::default();
        redeploy_default(&docker).unwrap();
        assert_eq!(docker.log(), [BUILD, STOP, RM, RUN]);
        assert_eq!(docker.container(), Some(Container::Running));
    }

    #[test]
    fn replaces_running_container() {
        let docker = FakeDocker::with_container(Container::Running);
        redeploy_default(&docker).unwrap();
        assert_eq!(docker.log(), [BUILD, STOP, RM, RUN]);
        assert_eq!(docker.container(), Some(Container::Running));
    }

    #[test]
    fn replaces_stopped_container() {
        let docker = FakeDocker::with_container(Container::Stopped);
        redeploy_default(&docker).unwrap();
        assert_eq!(docker.log(), [BUILD, STOP, RM, RUN]);
        assert_eq!(docker.container(), Some(Container::Running));
    }

    #[test]
    fn failed_build_aborts_before_teardown() {
        let docker = FakeDocker {
            build_fails: true,
            ..FakeDocker::with_container(Container::Running)
        };
        let error = redeploy_default(&docker).unwrap_err();
        assert_eq!(docker.log(), [BUILD]);
        assert_eq!(docker.container(), Some(Container::Running));
        assert!(matches!(error.kind, ErrorKind::NonZeroExitStatus(_)));
        assert!(error.to_string().contains(BUILD));
    }

    #[test]
    fn failed_build_creates_nothing() {
        let docker = FakeDocker {
            build_fails: true,
            ..Default::default()
        };
        redeploy_default(&docker).unwrap_err();
        assert_eq!(docker.container(), None);
    }

    #[test]
    fn unavailable_teardown_still_starts() {
        let docker = FakeDocker {
            program_missing_for_teardown: true,
            ..Default::default()
        };
        redeploy_default(&docker).unwrap();
        assert_eq!(docker.log(), [BUILD, STOP, RM, RUN]);
        assert_eq!(docker.container(), Some(Container::Running));
    }

    #[test]
    fn failed_run_names_the_run_command() {
        let docker = FakeDocker {
            run_fails: true,
            ..Default::default()
        };
        let error = redeploy_default(&docker).unwrap_err();
        assert_eq!(docker.log(), [BUILD, STOP, RM, RUN]);
        assert_eq!(
            error.to_string(),
            format!("failed to run `{RUN}`: exited with non-zero exit code `125`")
        );
    }

    #[test]
    fn custom_deployment() {
        let docker = FakeDocker::default();
        let deployment = Deployment {
            context: PathBuf::from("services/web"),
            image: "web:dev".to_owned(),
            container: "web".to_owned(),
            publish: PortMapping::new(3000, 8080),
        };
        redeploy(&docker, &Docker::new("podman"), &deployment).unwrap();
        assert_eq!(
            docker.log(),
            [
                "podman build -t web:dev services/web",
                "podman stop web",
                "podman rm web",
                "podman run -d --name web -p 3000:8080 web:dev",
            ]
        );
    }

    #[test]
    #[ignore = "requires docker and replaces the `tulrex` container, run manually"]
    fn test_against_docker() {
        redeploy(&process::System, &Docker::default(), &Deployment::default()).unwrap();
    }
}
