use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

/// The specific result type for the config module.
pub type Result<T> = std::result::Result<T, ConfigErr>;

/// Error returned whenever the server configuration can't be loaded.
#[derive(Debug)]
pub enum ConfigErr {
    /// The config file couldn't be read.
    Io { path: String, source: io::Error },
    /// The config file isn't valid JSON for a `ServerConfig`.
    Parse {
        path: String,
        source: serde_json::Error,
    },
    /// An environment variable holds an invalid value.
    InvalidVar { var: &'static str, value: String },
    /// The resulting configuration is not usable.
    Invalid(String),
}

impl Display for ConfigErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read config {path}: {source}"),
            Self::Parse { path, source } => write!(f, "failed to parse config {path}: {source}"),
            Self::InvalidVar { var, value } => write!(f, "invalid value for {var}: {value:?}"),
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for ConfigErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Boundary conversion for the binary.
impl From<ConfigErr> for io::Error {
    fn from(value: ConfigErr) -> Self {
        match value {
            ConfigErr::Io { source, .. } => source,
            other => io::Error::new(io::ErrorKind::InvalidInput, other),
        }
    }
}
