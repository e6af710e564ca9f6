use std::{fmt, num::ParseIntError};

/// Publishes `container` port of a container on `host` port of the machine running it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMapping {
    pub host: u16,
    pub container: u16,
}

impl PortMapping {
    pub const fn new(host: u16, container: u16) -> Self {
        Self { host, container }
    }
}

impl fmt::Display for PortMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.container)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParsePortError {
    Invalid(ParseIntError),
    Zero,
}

impl fmt::Display for ParsePortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(error) => write!(f, "invalid port: {error}"),
            Self::Zero => f.write_str("port 0 can not be published"),
        }
    }
}

impl std::error::Error for ParsePortError {}

/// Parses a single port, rejecting 0.
pub fn parse_port(value: &str) -> Result<u16, ParsePortError> {
    match value.parse::<u16>().map_err(ParsePortError::Invalid)? {
        0 => Err(ParsePortError::Zero),
        port => Ok(port),
    }
}
