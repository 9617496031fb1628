use std::{env, fs, num::NonZeroUsize, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{ConfigErr, Result};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_QUORUM: NonZeroUsize = NonZeroUsize::new(3).unwrap();

/// Points to an optional JSON file holding a `ServerConfig`.
pub const CONFIG_PATH_VAR: &str = "FEDAVG_CONFIG";

/// How the placeholder global model is filled at startup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitSpec {
    Const { value: f32 },
    Uniform { low: f32, high: f32 },
    Normal { mean: f32, std_dev: f32 },
}

impl Default for InitSpec {
    fn default() -> Self {
        Self::Uniform { low: 0., high: 1. }
    }
}

/// Process wide settings of the aggregation server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Amount of client updates required to close a round.
    pub quorum_threshold: NonZeroUsize,
    /// Layer shapes of the placeholder model published as round 0.
    pub initial_model_shape: Vec<Vec<usize>>,
    pub init: InitSpec,
    pub seed: Option<u64>,
    /// Reject updates whose shapes differ from the global model before they join a round.
    pub validate_submissions: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            quorum_threshold: DEFAULT_QUORUM,
            initial_model_shape: vec![vec![10, 3], vec![3]],
            init: InitSpec::default(),
            seed: None,
            validate_submissions: true,
        }
    }
}

impl ServerConfig {
    /// Loads the configuration from the process environment.
    ///
    /// Starts from the defaults, then the JSON file at `FEDAVG_CONFIG` if set, then the
    /// `HOST`, `PORT`, `QUORUM_THRESHOLD`, `INITIAL_MODEL_SHAPE`, `MODEL_SEED` and
    /// `VALIDATE_SUBMISSIONS` variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Same as `from_env` but reading variables through `lookup`.
    ///
    /// # Arguments
    /// * `lookup` - Returns the value of an environment variable, if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_VAR) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = parse_var("PORT", &port)?;
        }
        if let Some(quorum) = lookup("QUORUM_THRESHOLD") {
            config.quorum_threshold = parse_var("QUORUM_THRESHOLD", &quorum)?;
        }
        if let Some(shape) = lookup("INITIAL_MODEL_SHAPE") {
            config.initial_model_shape = parse_shapes(&shape).ok_or(ConfigErr::InvalidVar {
                var: "INITIAL_MODEL_SHAPE",
                value: shape,
            })?;
        }
        if let Some(seed) = lookup("MODEL_SEED") {
            config.seed = Some(parse_var("MODEL_SEED", &seed)?);
        }
        if let Some(validate) = lookup("VALIDATE_SUBMISSIONS") {
            config.validate_submissions = parse_var("VALIDATE_SUBMISSIONS", &validate)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reads a `ServerConfig` from a JSON file, missing fields take their default.
    pub fn from_file(path: &str) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigErr::Io {
            path: path.to_string(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| ConfigErr::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Returns the address to bind to.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate(&self) -> Result<()> {
        if self.initial_model_shape.is_empty() {
            return Err(ConfigErr::Invalid(
                "initial_model_shape must have at least one layer".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_var<T: FromStr>(var: &'static str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| ConfigErr::InvalidVar {
        var,
        value: value.to_string(),
    })
}

/// Parses layer shapes written as `10x3,3`.
fn parse_shapes(raw: &str) -> Option<Vec<Vec<usize>>> {
    raw.split(',')
        .map(|layer| {
            layer
                .trim()
                .split('x')
                .map(|dim| dim.trim().parse().ok())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        move |var| vars.get(var).cloned()
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.quorum_threshold.get(), 3);
        assert_eq!(config.initial_model_shape, vec![vec![10, 3], vec![3]]);
        assert!(config.validate_submissions);
        assert_eq!(config.addr(), "127.0.0.1:8000");
    }

    #[test]
    fn env_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "9000"),
            ("QUORUM_THRESHOLD", "5"),
            ("INITIAL_MODEL_SHAPE", "4x2, 2"),
            ("MODEL_SEED", "42"),
            ("VALIDATE_SUBMISSIONS", "false"),
        ]))
        .unwrap();

        assert_eq!(config.addr(), "0.0.0.0:9000");
        assert_eq!(config.quorum_threshold.get(), 5);
        assert_eq!(config.initial_model_shape, vec![vec![4, 2], vec![2]]);
        assert_eq!(config.seed, Some(42));
        assert!(!config.validate_submissions);
    }

    #[test]
    fn zero_quorum_is_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[("QUORUM_THRESHOLD", "0")])).unwrap_err();
        assert!(matches!(err, ConfigErr::InvalidVar { var: "QUORUM_THRESHOLD", .. }));
    }

    #[test]
    fn malformed_shape_is_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[("INITIAL_MODEL_SHAPE", "10xa,3")]))
            .unwrap_err();
        assert!(matches!(err, ConfigErr::InvalidVar { var: "INITIAL_MODEL_SHAPE", .. }));
    }

    #[test]
    fn json_with_defaults() {
        let raw = r#"{ "quorum_threshold": 2, "init": { "normal": { "mean": 0.0, "std_dev": 0.1 } } }"#;
        let config: ServerConfig = serde_json::from_str(raw).unwrap();

        assert_eq!(config.quorum_threshold.get(), 2);
        assert_eq!(config.init, InitSpec::Normal { mean: 0., std_dev: 0.1 });
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn missing_file() {
        let err = ServerConfig::from_lookup(lookup(&[(CONFIG_PATH_VAR, "/nonexistent/fedavg.json")]))
            .unwrap_err();
        assert!(matches!(err, ConfigErr::Io { .. }));
    }
}
