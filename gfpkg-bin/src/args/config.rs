use std::path::{Path, PathBuf};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub env: Option<String>,
    pub build_dir: Option<PathBuf>,
}

impl Config {
    /// Load the config file. A relative `build_dir` is resolved against the
    /// directory containing the config file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let config = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&config)?;
        if let Some(build_dir) = config.build_dir.as_mut() {
            if build_dir.is_relative() {
                let base = path.parent().unwrap_or_else(|| Path::new(""));
                *build_dir = base.join(&*build_dir);
            }
        }
        Ok(config)
    }
}

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Toml(toml::de::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Toml(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "failed to read gfpkg config file: {e}"),
            Error::Toml(e) => write!(f, "gfpkg config file is not valid TOML: {e}"),
        }
    }
}

impl std::error::Error for Error {}
