pub(crate) mod deploy;
pub(crate) mod docker;
pub(crate) mod name;
pub(crate) mod port;
pub(crate) mod process;

pub mod cli;

pub(crate) type Result<T, E = Box<dyn std::error::Error + Send + Sync + 'static>> =
    std::result::Result<T, E>;
